use std::fmt;
use std::io::{BufRead, Write};

use crate::error::RosterError;
use crate::pattern::{validate_pattern, PatternSpec};

/// Line-oriented operator console. The binary wires it to stdin/stdout;
/// tests drive it with a `Cursor` and a `Vec<u8>`.
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Next input line without its line terminator; `None` once input is closed.
    pub fn read_line(&mut self) -> Result<Option<String>, RosterError> {
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    pub fn say(&mut self, line: impl fmt::Display) -> Result<(), RosterError> {
        writeln!(self.output, "{line}")?;
        Ok(())
    }

    /// Ask for an address-number or unit pattern until a valid one is given.
    /// Closed input counts as "no restriction".
    pub fn obtain_pattern(&mut self) -> Result<PatternSpec, RosterError> {
        self.say("Input a range or a regex with slashes (the regex matches the full number).")?;
        self.say("Or just press Enter to use no restrictions.")?;
        loop {
            let line = self.read_line()?.unwrap_or_default();
            if let Some(spec) = validate_pattern(&line) {
                tracing::debug!(pattern = %spec, "pattern accepted");
                return Ok(spec);
            }
            self.say("Oops, that doesn't look valid. Try again.")?;
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn console(input: &str) -> Console<Cursor<Vec<u8>>, Vec<u8>> {
        Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn read_line_strips_terminators() {
        let mut c = console("12\r\n\nlast");
        assert_eq!(c.read_line().unwrap().as_deref(), Some("12"));
        assert_eq!(c.read_line().unwrap().as_deref(), Some(""));
        assert_eq!(c.read_line().unwrap().as_deref(), Some("last"));
        assert_eq!(c.read_line().unwrap(), None);
    }

    #[test]
    fn obtain_pattern_reprompts_until_valid() {
        let mut c = console("abc\n/[/\n3-5\n");
        let spec = c.obtain_pattern().unwrap();
        assert_eq!(spec.to_string(), "3\u{2013}5");
        let out = String::from_utf8(c.into_output()).unwrap();
        assert_eq!(out.matches("Oops, that doesn't look valid").count(), 2);
    }

    #[test]
    fn obtain_pattern_on_closed_input_is_unrestricted() {
        let mut c = console("");
        assert!(c.obtain_pattern().unwrap().is_match_all());
    }

    #[test]
    fn obtain_pattern_does_not_trim_input() {
        let mut c = console(" 
/4A/ 
/4A/
");
        let spec = c.obtain_pattern().unwrap();
        assert!(spec.matches("4A"));
        let out = String::from_utf8(c.into_output()).unwrap();
        assert_eq!(out.matches("Oops, that doesn't look valid").count(), 2);
    }
}
