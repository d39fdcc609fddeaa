//! The line-input collaborator: validated, reprompting reads from the
//! operator.  The reader and writer are injected, so tests drive the editor
//! with a scripted input source and capture everything it printed.

use std::io::{self, BufRead, Write};

use regex::Regex;

/// A prompt/response pair over any buffered reader and writer.  Every read
/// trims the line; the validated readers reprompt indefinitely until the
/// input satisfies their constraint.
#[derive(Debug)]
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Prompter { input, output }
    }

    /// Consumes the prompter, returning the underlying reader and writer.
    /// Scripted tests use this to inspect the conversation transcript.
    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }

    /// Prints `message` on its own line
    pub fn say(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "{}", message)
    }

    /// Prompts once and returns the trimmed response.  Running out of input
    /// is an error: the operator conversation has no natural end mid-prompt.
    pub fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input source closed mid-prompt",
            ));
        }
        Ok(line.trim().to_owned())
    }

    /// Reprompts until the response is non-empty
    pub fn nonempty(&mut self, prompt: &str) -> io::Result<String> {
        loop {
            let response = self.read_line(prompt)?;
            if !response.is_empty() {
                return Ok(response);
            }
        }
    }

    /// Reprompts until the response is an integer in `low..=high`
    pub fn ranged_int(&mut self, prompt: &str, low: usize, high: usize) -> io::Result<usize> {
        loop {
            let response = self.read_line(prompt)?;
            match response.parse::<usize>() {
                Ok(number) if number >= low && number <= high => return Ok(number),
                Ok(_) => self.say(&format!(
                    "Invalid number. Please enter a number between {} and {}.",
                    low, high
                ))?,
                Err(_) => self.say("Invalid input. Please enter a number.")?,
            }
        }
    }

    /// Reprompts until the response is an explicit yes or no token
    pub fn yes_no(&mut self, prompt: &str) -> io::Result<bool> {
        loop {
            let response = self.read_line(&format!("{} [Y/N] ", prompt))?;
            if response.eq_ignore_ascii_case("y") {
                return Ok(true);
            }
            if response.eq_ignore_ascii_case("n") {
                return Ok(false);
            }
            self.say(&format!("You must answer [Y/N]! {}", response))?;
        }
    }

    /// Reprompts until the response matches `pattern`.  Patterns are
    /// expected to be anchored; this is a full-line constraint, not a
    /// substring search.
    pub fn matching(&mut self, prompt: &str, pattern: &Regex) -> io::Result<String> {
        loop {
            let response = self.read_line(prompt)?;
            if pattern.is_match(&response) {
                return Ok(response);
            }
            self.say(&format!(
                "{} must match the pattern {}. Try again!",
                response, pattern
            ))?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(script: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(script.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn read_line_trims() {
        let mut p = prompter("  hello  \n");
        assert_eq!(p.read_line("> ").unwrap(), "hello");
    }

    #[test]
    fn read_line_at_eof_is_an_error() {
        let mut p = prompter("");
        assert_eq!(
            p.read_line("> ").unwrap_err().kind(),
            io::ErrorKind::UnexpectedEof
        );
    }

    #[test]
    fn ranged_int_reprompts_on_junk_and_out_of_range() {
        let mut p = prompter("abc\n99\n3\n");
        assert_eq!(p.ranged_int("n: ", 1, 5).unwrap(), 3);
        let transcript = String::from_utf8(p.output).unwrap();
        assert!(transcript.contains("Invalid input. Please enter a number."));
        assert!(transcript.contains("between 1 and 5"));
    }

    #[test]
    fn yes_no_accepts_either_case_and_reprompts_otherwise() {
        let mut p = prompter("maybe\ny\n");
        assert!(p.yes_no("Sure?").unwrap());
        let mut p = prompter("N\n");
        assert!(!p.yes_no("Sure?").unwrap());
    }

    #[test]
    fn matching_enforces_the_pattern() {
        let pattern = Regex::new("^(?i)(a|b)$").unwrap();
        let mut p = prompter("c\nab\nB\n");
        assert_eq!(p.matching("side: ", &pattern).unwrap(), "B");
    }

    #[test]
    fn nonempty_skips_blank_lines() {
        let mut p = prompter("\n   \nvalue\n");
        assert_eq!(p.nonempty("v: ").unwrap(), "value");
    }
}
