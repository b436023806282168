//! CLI utilities for icicle.
//!
//! The utilities present in this module can be used to create an
//! interactive shell around a [`Client`](crate::Client).
use std::io::{BufRead, Write};

/// A line of user input destined for the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Exit command `.exit`
    Exit,
    /// Raw command text, forwarded to the server as-is
    Raw(String),
}

/// Prompt the user for the next command.
///
/// `.exit` (or end of input) ends the session; any other line that does not
/// start with `.` is raw command text for the server.
///
/// # Panics
/// If the prompt cannot be written or the input cannot be read.
pub fn prompt<R, W>(mut reader: R, mut writer: W) -> Result<Command, String>
where
    R: BufRead,
    W: Write,
{
    let mut s = String::default();
    write!(&mut writer, "> ").expect("failed to write to writer.");

    let read = reader
        .read_line(&mut s)
        .expect("failed to read from reader.");
    if read == 0 {
        return Ok(Command::Exit);
    }

    match s.trim_end() {
        ".exit" => Ok(Command::Exit),
        s if !s.starts_with('.') => Ok(Command::Raw(s.to_string())),
        s => Err(format!("unrecognized command '{}'", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_prints_correctly() {
        let input = b".exit\n";
        let mut output = Vec::new();

        prompt(&input[..], &mut output).unwrap();

        let output = String::from_utf8(output).expect("not valid UTF-8");
        assert_eq!("> ", output);
    }

    #[test]
    fn prompt_passes_raw_commands_through() {
        let input = b"GET bookA\n";
        let mut output = Vec::new();

        let res = prompt(&input[..], &mut output).unwrap();
        assert_eq!(Command::Raw("GET bookA".to_string()), res);
    }

    #[test]
    fn prompt_exits_at_end_of_input() {
        let input = b"";
        let mut output = Vec::new();

        let res = prompt(&input[..], &mut output).unwrap();
        assert_eq!(Command::Exit, res);
    }

    #[test]
    fn prompt_unrecognized_command() {
        let input = b".something_wrong\n";
        let mut output = Vec::new();

        let res = prompt(&input[..], &mut output).unwrap_err();
        assert_eq!("unrecognized command '.something_wrong'", res);
    }
}
