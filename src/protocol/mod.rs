//! Protocol implementation module
//!
//! This module defines TSIP framing, the report registry, report and command encoding/decoding,
//! and the tokio codec tying them to a byte stream.

pub mod codec;
pub mod command;
pub mod display;
pub mod frame;
pub mod packet;
pub mod registry;
pub mod variable;

pub use self::codec::TsipCodec;
pub use self::command::Command;
pub use self::frame::{frame_command, AssemblerState, BoundedBuffer, Frame, FrameAssembler};
pub use self::packet::{
    FixedLayout,
    Packet,
    PpsCharacteristics,
    PrimaryTiming,
    SatelliteTrackingStatus,
    SecondaryTiming,
    SoftwareVersion,
};
pub use self::registry::{MatchEntry, PacketKind, Registry};
pub use self::variable::{SignalLevel, SignalReport};
