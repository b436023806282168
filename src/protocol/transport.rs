use std::io::{self, Read, Write};

use thiserror::Error;

use super::response::{Status, classify_server_error};

/// List of possible errors while exchanging frames with the server.
///
/// [`Io`](WireError::Io) and [`Frame`](WireError::Frame) mean the connection
/// itself is suspect; [`Server`](WireError::Server) and
/// [`DbNotFound`](WireError::DbNotFound) are well-formed replies and leave
/// the connection usable.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("transport failure: {0}")]
    Io(#[from] io::Error),

    #[error("malformed frame: {0}")]
    Frame(String),

    #[error("server error: {0}")]
    Server(String),

    #[error("database not found: {0}")]
    DbNotFound(String),
}

impl WireError {
    /// Whether this error poisons the connection it occurred on.
    pub fn is_connection_fault(&self) -> bool {
        matches!(self, WireError::Io(_) | WireError::Frame(_))
    }
}

/// Frame codec over a bidirectional byte stream.
///
/// Requests are framed as `{decimal byte length}{payload}` with no delimiter
/// or terminator. Responses carry one extra leading status byte, then the
/// same frame shape.
#[derive(Debug)]
pub struct ProtocolTransport<T: Read + Write> {
    stream: T,
}

impl<T: Read + Write> ProtocolTransport<T> {
    pub fn new(stream: T) -> Self {
        Self { stream }
    }

    pub fn get_ref(&self) -> &T {
        &self.stream
    }

    /// Frames `command` and writes it out, flushing so nothing stays
    /// buffered on our side.
    pub fn send_command(&mut self, command: &str) -> Result<(), WireError> {
        let frame = format!("{}{}", command.len(), command);
        self.stream.write_all(frame.as_bytes())?;
        self.stream.flush()?;
        Ok(())
    }

    /// Reads one complete response: status byte, length prefix, payload.
    ///
    /// A failure status routes the payload through
    /// [`classify_server_error`]; a success status yields the payload text.
    pub fn read_response(&mut self) -> Result<String, WireError> {
        let status = self.read_status()?;
        let payload = self.read_frame()?;
        let payload = String::from_utf8(payload)
            .map_err(|_| WireError::Frame("payload is not valid UTF-8".to_string()))?;

        match status {
            Status::Success => Ok(payload),
            Status::Failure => Err(classify_server_error(&payload)),
        }
    }

    fn read_status(&mut self) -> Result<Status, WireError> {
        let mut byte = [0_u8; 1];
        match self.stream.read(&mut byte) {
            // Stream ended before a status arrived; the server signals
            // failure by anything other than the success marker.
            Ok(0) => Ok(Status::Failure),
            Ok(_) => Ok(Status::from(byte[0])),
            Err(e) => Err(WireError::Io(e)),
        }
    }

    /// Accumulates length digits one byte at a time, stopping at the first
    /// non-digit or end of stream, then parses the run.
    ///
    /// The frame has no delimiter, so the stopping byte is the first byte
    /// of the payload and is handed back alongside the length. Only a
    /// non-digit or end of stream ends the run: a zero-length frame on a
    /// connection the peer holds open blocks here until the next frame's
    /// bytes (or a close) arrive.
    fn read_length(&mut self) -> Result<(usize, Option<u8>), WireError> {
        let mut digits = String::new();
        let stop = loop {
            let mut byte = [0_u8; 1];
            match self.stream.read(&mut byte) {
                Ok(0) => break None,
                Ok(_) if byte[0].is_ascii_digit() => digits.push(char::from(byte[0])),
                Ok(_) => break Some(byte[0]),
                Err(e) => return Err(WireError::Io(e)),
            }
        };

        if digits.is_empty() {
            return Err(WireError::Frame("missing length prefix".to_string()));
        }
        let length = digits
            .parse::<usize>()
            .map_err(|_| WireError::Frame(format!("length prefix '{digits}' out of range")))?;

        Ok((length, stop))
    }

    fn read_frame(&mut self) -> Result<Vec<u8>, WireError> {
        let (length, first) = self.read_length()?;
        let mut payload = vec![0_u8; length];

        let mut filled = 0;
        if length > 0 {
            if let Some(byte) = first {
                payload[0] = byte;
                filled = 1;
            }
        }

        if let Err(e) = self.stream.read_exact(&mut payload[filled..]) {
            return match e.kind() {
                io::ErrorKind::UnexpectedEof => Err(WireError::Frame(format!(
                    "payload truncated before {length} declared bytes"
                ))),
                _ => Err(WireError::Io(e)),
            };
        }
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn transport(input: &[u8]) -> ProtocolTransport<Cursor<Vec<u8>>> {
        ProtocolTransport::new(Cursor::new(input.to_vec()))
    }

    #[test]
    fn send_command_frames_byte_length() {
        let mut transport = ProtocolTransport::new(Cursor::new(Vec::new()));

        transport.send_command("INFO").unwrap();
        assert_eq!(transport.stream.get_ref(), b"4INFO");
    }

    #[test]
    fn send_command_counts_bytes_not_chars() {
        let mut transport = ProtocolTransport::new(Cursor::new(Vec::new()));

        transport.send_command("é").unwrap();
        assert_eq!(transport.stream.get_ref(), "2é".as_bytes());
    }

    #[test]
    fn read_response_success() {
        let mut transport = transport(b"\x015hello");

        let payload = transport.read_response().unwrap();
        assert_eq!(payload, "hello");
    }

    #[test]
    fn read_response_failure_status_is_classified() {
        let mut transport = transport(b"\x004boom");

        let err = transport.read_response().unwrap_err();
        assert!(matches!(err, WireError::Server(msg) if msg == "boom"));
    }

    #[test]
    fn read_response_db_not_found() {
        let mut transport = transport(b"\x0018ERR: DB read bookA");

        let err = transport.read_response().unwrap_err();
        assert!(matches!(err, WireError::DbNotFound(name) if name == "bookA"));
    }

    #[test]
    fn read_response_truncated_payload() {
        let mut transport = transport(b"\x015he");

        let err = transport.read_response().unwrap_err();
        assert!(matches!(err, WireError::Frame(_)));
        assert!(err.is_connection_fault());
    }

    #[test]
    fn read_response_missing_length_prefix() {
        let mut transport = transport(b"\x01boom");

        let err = transport.read_response().unwrap_err();
        assert!(matches!(err, WireError::Frame(_)));
    }

    #[test]
    fn read_response_empty_stream() {
        let mut transport = transport(b"");

        let err = transport.read_response().unwrap_err();
        assert!(matches!(err, WireError::Frame(_)));
    }

    #[test]
    fn read_response_empty_payload() {
        let mut transport = transport(b"\x010");

        let payload = transport.read_response().unwrap();
        assert_eq!(payload, "");
    }

    #[test]
    fn server_errors_are_not_connection_faults() {
        let mut transport = transport(b"\x004boom");

        let err = transport.read_response().unwrap_err();
        assert!(!err.is_connection_fault());
    }
}
