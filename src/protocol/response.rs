use super::transport::WireError;

/// Marker byte the server prepends to a successful response frame.
pub const SUCCESS_BYTE: u8 = 0x1;

/// Outcome tag decoded from the leading status byte of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Failure,
}

impl From<u8> for Status {
    fn from(byte: u8) -> Self {
        if byte == SUCCESS_BYTE {
            Status::Success
        } else {
            Status::Failure
        }
    }
}

/// Maps a failure payload onto a structured error.
///
/// The server reports a missing database as `ERR: DB <op> <name>`; the name
/// becomes a [`WireError::DbNotFound`]. A `ERR: DB` reply with the name
/// missing degrades to a generic server error, as does any payload without
/// the marker, carried verbatim.
pub fn classify_server_error(payload: &str) -> WireError {
    match payload.strip_prefix("ERR: DB") {
        Some(rest) => match rest.split_whitespace().nth(1) {
            Some(name) => WireError::DbNotFound(name.to_string()),
            None => WireError::Server("DB error without identifier".to_string()),
        },
        None => WireError::Server(payload.to_string()),
    }
}
