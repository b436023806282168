//! Wire protocol between an icicle client and the database server.
//!
//! This module defines how commands and responses travel over the stream
//! connection. The format is deliberately minimal:
//!
//! - A request is a single frame: the decimal ASCII byte length of the
//!   command, immediately followed by the command text. No delimiter, no
//!   terminator.
//! - A response is one status byte ([`SUCCESS_BYTE`] for success, anything
//!   else for failure) followed by a frame in the same shape.
//!
//! Failure payloads are plain text and are mapped onto structured errors by
//! [`classify_server_error`]; everything else about a command's meaning is
//! between the caller and the server.
//!
//! # Key Components
//!
//! - [`ProtocolTransport`]: frame codec over any `Read + Write` stream.
//! - [`Status`]: two-variant tag decoded from the status byte.
//! - [`WireError`]: errors raised while framing or by the server.
//!
//! # See Also
//!
//! - [`client`](crate::client): connection lifecycle built on this codec.
mod response;
mod transport;

pub use response::{SUCCESS_BYTE, Status, classify_server_error};
pub use transport::{ProtocolTransport, WireError};
