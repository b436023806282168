pub mod cli;
pub mod client;
pub mod protocol;

pub use cli::{Command, prompt};
pub use client::{Client, ClientError, Endpoint, RetryPolicy};
pub use protocol::{ProtocolTransport, Status, WireError};
