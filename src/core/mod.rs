//! Core types for the TSIP client
//!
//! This module contains errors, configuration and the wire constants used throughout the library.

pub mod error;
pub mod types;
pub mod serde;

pub use self::error::{Error, Result};
pub use self::types::{
    Config,
    FramingErrorPolicy,
    OverflowPolicy,
};

/// Data Link Escape: frame delimiter and escape byte
pub const DLE: u8 = 0x10;

/// End of Text: terminates a frame after a DLE
pub const ETX: u8 = 0x03;

/// Default maximum de-stuffed frame length in bytes
pub const MAX_FRAME_LEN: usize = 256;

/// Default capacity of the outgoing command queue
pub const DEFAULT_COMMAND_QUEUE: usize = 16;
