//! Outgoing TSIP commands

use bytes::{BufMut, BytesMut};

use super::frame::frame_command;

/// A command packet sent to the receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// 0x1F, answered by a software version report (0x45)
    RequestSoftwareVersion,
    /// 0x27, answered by a satellite signal report (0x47)
    RequestSignalLevels,
    /// 0x3C, answered by satellite tracking status reports (0x5C).
    /// Satellite 0 requests every tracked satellite.
    RequestSatelliteTrackingStatus {
        satellite: u8,
    },
}

impl Command {
    /// Command id, written unstuffed on the wire
    pub fn id(&self) -> &'static [u8] {
        match self {
            Command::RequestSoftwareVersion => &[0x1f],
            Command::RequestSignalLevels => &[0x27],
            Command::RequestSatelliteTrackingStatus { .. } => &[0x3c],
        }
    }

    /// Writes the command fields, before stuffing
    pub fn write_body(&self, buf: &mut BytesMut) {
        match *self {
            Command::RequestSoftwareVersion | Command::RequestSignalLevels => {}
            Command::RequestSatelliteTrackingStatus { satellite } => buf.put_u8(satellite),
        }
    }

    /// Appends the complete wire frame to `dst`
    pub fn encode_into(&self, dst: &mut BytesMut) {
        let mut body = BytesMut::new();
        self.write_body(&mut body);
        frame_command(self.id(), &body, dst);
    }

    /// The complete wire frame
    pub fn to_bytes(&self) -> BytesMut {
        let mut dst = BytesMut::new();
        self.encode_into(&mut dst);
        dst
    }
}
