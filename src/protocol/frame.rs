//! DLE/ETX frame assembly and byte stuffing
//!
//! TSIP frames look like `DLE <id> <data> DLE ETX` on the wire. Any DLE inside `<data>` is
//! doubled. The assembler below is a push parser: bytes go in one at a time and complete,
//! de-stuffed frames come out.

use std::ops::Deref;

use bytes::{BufMut, Bytes, BytesMut};
use tracing::{debug, warn};

use crate::core::{Error, FramingErrorPolicy, OverflowPolicy, Result, DLE, ETX};

/// A complete de-stuffed message body, starting with its type byte(s)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    body: Bytes,
    dropped: usize,
}

impl Frame {
    /// Creates a frame from an already de-stuffed body
    pub fn new(body: impl Into<Bytes>) -> Self {
        Frame {
            body: body.into(),
            dropped: 0,
        }
    }

    /// Number of payload bytes dropped because the frame exceeded the limit
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl Deref for Frame {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.body
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.body
    }
}

/// Accumulation buffer with a hard length limit
#[derive(Debug)]
pub struct BoundedBuffer {
    buf: BytesMut,
    limit: usize,
    dropped: usize,
}

impl BoundedBuffer {
    /// Creates an empty buffer holding at most `limit` bytes
    pub fn new(limit: usize) -> Self {
        BoundedBuffer {
            buf: BytesMut::with_capacity(limit),
            limit,
            dropped: 0,
        }
    }

    /// Appends a byte, or counts it as dropped once the limit is reached
    pub fn push(&mut self, byte: u8) {
        if self.buf.len() < self.limit {
            self.buf.put_u8(byte);
        } else {
            self.dropped += 1;
        }
    }

    /// Bytes dropped since the last reset
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Empties the buffer
    pub fn reset(&mut self) {
        self.buf.clear();
        self.dropped = 0;
    }

    /// Takes the contents, leaving the buffer empty
    pub fn take(&mut self) -> Frame {
        let frame = Frame {
            body: self.buf.split().freeze(),
            dropped: self.dropped,
        };
        self.dropped = 0;
        frame
    }
}

/// Position of the assembler relative to frame boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblerState {
    /// Discarding input until the first DLE ETX
    Synchronizing {
        /// A DLE was the last byte seen
        dle: bool,
    },
    /// Between frames
    AwaitingStart,
    /// Saw a DLE between frames, the next byte decides whether it opens a frame
    StartMarker,
    /// Collecting payload
    InMessage,
    /// Saw a DLE inside a frame: either an escaped DLE or the end marker follows
    AwaitingTerminator,
}

/// Reassembles de-stuffed frames from a TSIP byte stream
#[derive(Debug)]
pub struct FrameAssembler {
    state: AssemblerState,
    buffer: BoundedBuffer,
    overflow: OverflowPolicy,
    on_error: FramingErrorPolicy,
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new(
            crate::core::MAX_FRAME_LEN,
            OverflowPolicy::default(),
            FramingErrorPolicy::default(),
        )
    }
}

impl FrameAssembler {
    /// Creates an assembler that starts directly between frames
    pub fn new(limit: usize, overflow: OverflowPolicy, on_error: FramingErrorPolicy) -> Self {
        FrameAssembler {
            state: AssemblerState::AwaitingStart,
            buffer: BoundedBuffer::new(limit),
            overflow,
            on_error,
        }
    }

    /// Discard everything up to and including the first DLE ETX
    pub fn synchronizing(mut self) -> Self {
        self.state = AssemblerState::Synchronizing { dle: false };
        self
    }

    pub fn state(&self) -> AssemblerState {
        self.state
    }

    /// Feeds one byte.
    ///
    /// Returns a frame when `byte` completes one. Frames rejected by the overflow policy come back
    /// as [`Error::Overflow`], which leaves the assembler ready for the next frame. A framing
    /// error is returned under [`FramingErrorPolicy::Halt`]; under `Resync` it is logged and the
    /// assembler goes back to synchronizing.
    pub fn push(&mut self, byte: u8) -> Result<Option<Frame>> {
        use AssemblerState::*;

        match self.state {
            Synchronizing { dle } => {
                self.state = match (dle, byte) {
                    (true, ETX) => AwaitingStart,
                    (false, DLE) => Synchronizing { dle: true },
                    _ => Synchronizing { dle: false },
                };
            }
            AwaitingStart => {
                if byte == DLE {
                    self.state = StartMarker;
                }
            }
            StartMarker => {
                if byte == DLE {
                    // escaped DLE outside any frame
                    self.state = AwaitingStart;
                } else {
                    self.buffer.reset();
                    self.buffer.push(byte);
                    self.state = InMessage;
                }
            }
            InMessage => {
                if byte == DLE {
                    self.state = AwaitingTerminator;
                } else {
                    self.buffer.push(byte);
                }
            }
            AwaitingTerminator => match byte {
                DLE => {
                    self.buffer.push(DLE);
                    self.state = InMessage;
                }
                ETX => {
                    self.state = AwaitingStart;
                    return self.finish();
                }
                other => return self.framing_error(other),
            },
        }

        Ok(None)
    }

    fn finish(&mut self) -> Result<Option<Frame>> {
        let frame = self.buffer.take();

        if frame.dropped > 0 {
            let length = frame.len() + frame.dropped;
            match self.overflow {
                OverflowPolicy::Truncate => {
                    debug!(length, limit = self.buffer.limit(), "truncated oversized frame");
                }
                OverflowPolicy::Reject => {
                    return Err(Error::overflow(length, self.buffer.limit()));
                }
            }
        }

        Ok(Some(frame))
    }

    fn framing_error(&mut self, got: u8) -> Result<Option<Frame>> {
        self.buffer.reset();

        match self.on_error {
            FramingErrorPolicy::Halt => {
                self.state = AssemblerState::AwaitingStart;
                Err(Error::framing(got))
            }
            FramingErrorPolicy::Resync => {
                warn!(got, "expected ETX after DLE, resynchronizing");
                self.state = AssemblerState::Synchronizing { dle: false };
                Ok(None)
            }
        }
    }
}

/// Appends `data` to `dst`, doubling every DLE
pub fn stuff_into(data: &[u8], dst: &mut BytesMut) {
    dst.reserve(data.len());
    for &byte in data {
        if byte == DLE {
            dst.put_u8(DLE);
        }
        dst.put_u8(byte);
    }
}

/// Writes a complete frame, `DLE <id> stuffed(body) DLE ETX`
///
/// `id` is written as is. Packet and command ids never contain DLE.
pub fn frame_command(id: &[u8], body: &[u8], dst: &mut BytesMut) {
    dst.reserve(id.len() + body.len() + 3);
    dst.put_u8(DLE);
    dst.put_slice(id);
    stuff_into(body, dst);
    dst.put_u8(DLE);
    dst.put_u8(ETX);
}
