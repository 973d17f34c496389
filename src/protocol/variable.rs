//! Count-prefixed reports
//!
//! These do not fit the prefix registry since their length depends on a count byte. The only one
//! handled is the satellite signal report (0x47): `count`, then `count` records of PRN (u8) and
//! signal level (f32).

use bytes::{Buf, BufMut, BytesMut};

use crate::core::{Error, Result};

/// Report id of the satellite signal report
pub const SIGNAL_REPORT_ID: u8 = 0x47;

const RECORD_SIZE: usize = 5;

/// Signal level of one satellite
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalLevel {
    pub prn: u8,
    /// AMU or dBHz depending on receiver configuration
    pub level: f32,
}

/// Satellite signal report (0x47), records in the order received
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SignalReport {
    pub records: Vec<SignalLevel>,
}

impl SignalReport {
    /// Decodes the body following the id byte
    pub fn decode(body: &[u8]) -> Result<Self> {
        let Some((&count, mut rest)) = body.split_first() else {
            return Err(Error::truncated("Satellite Signal Report", 1, 0));
        };

        let needed = 1 + count as usize * RECORD_SIZE;
        if body.len() < needed {
            return Err(Error::truncated("Satellite Signal Report", needed, body.len()));
        }

        let records = (0..count)
            .map(|_| SignalLevel {
                prn: rest.get_u8(),
                level: rest.get_f32(),
            })
            .collect();

        Ok(SignalReport { records })
    }

    /// Encodes the count and records, without the id byte.
    ///
    /// At most 255 records fit the count byte; any beyond that are not written.
    pub fn encode(&self) -> BytesMut {
        let count = self.records.len().min(u8::MAX as usize);
        let mut buf = BytesMut::with_capacity(1 + count * RECORD_SIZE);
        buf.put_u8(count as u8);
        for record in &self.records[..count] {
            buf.put_u8(record.prn);
            buf.put_f32(record.level);
        }
        buf
    }

    /// Satellites with a usable signal, by ascending PRN
    ///
    /// Levels are compared by their integer part, so anything below 1.0 is left out.
    pub fn visible(&self) -> Vec<(u8, i32)> {
        let mut visible: Vec<_> = self
            .records
            .iter()
            .map(|r| (r.prn, r.level as i32))
            .filter(|&(_, level)| level > 0)
            .collect();
        visible.sort_by_key(|&(prn, _)| prn);
        visible
    }
}

/// Decodes a frame the registry did not match, keyed on its first byte
pub fn decode(frame: &[u8]) -> Result<SignalReport> {
    match frame.split_first() {
        Some((&SIGNAL_REPORT_ID, body)) => SignalReport::decode(body),
        _ => Err(Error::unmatched(frame)),
    }
}
