//! TSIP: Trimble Standard Interface Protocol client
//!
//! This library reassembles DLE/ETX framed TSIP reports from a byte stream, decodes them into
//! typed packets, and frames commands to send back to the receiver. It targets GPS timing
//! receivers reached through a serial-to-network bridge.
pub mod core;

pub mod network;
pub mod protocol;
pub mod util;

// Re-export commonly used items
pub use crate::core::{Config, Error, Result};
pub use crate::network::{CommandSender, Scheduler, Session};
pub use crate::protocol::{Command, Packet, Registry, TsipCodec};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
