use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, warn};

use crate::core::{Config, Error};
use super::command::Command;
use super::frame::{frame_command, AssemblerState, Frame, FrameAssembler};
use super::packet::Packet;

/// TSIP codec: de-stuffed frames in, framed commands out
#[derive(Debug, Default)]
pub struct TsipCodec {
    assembler: FrameAssembler,
}

impl TsipCodec {
    /// Creates a codec that starts between frames, with default limits
    pub fn new() -> Self {
        TsipCodec::default()
    }

    /// Creates a codec using the frame settings of `config`
    pub fn from_config(config: &Config) -> Self {
        let assembler = FrameAssembler::new(
            config.max_frame_len,
            config.overflow,
            config.on_framing_error,
        );

        TsipCodec {
            assembler: if config.synchronize {
                assembler.synchronizing()
            } else {
                assembler
            },
        }
    }
}

impl Decoder for TsipCodec {
    type Item = Frame;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let mut consumed = 0;

        let result = loop {
            let Some(&byte) = src.get(consumed) else {
                break Ok(None);
            };
            consumed += 1;

            match self.assembler.push(byte) {
                Ok(Some(frame)) => break Ok(Some(frame)),
                Ok(None) => {}
                Err(e) if e.is_recoverable() => warn!(error = %e, "dropping frame"),
                Err(e) => break Err(e),
            }
        };

        // bytes are copied into the assembler, never left for a later call
        src.advance(consumed);
        result
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let frame = self.decode(src)?;
        if frame.is_none() {
            match self.assembler.state() {
                AssemblerState::InMessage | AssemblerState::AwaitingTerminator => {
                    debug!("stream ended inside a frame");
                }
                _ => {}
            }
        }
        Ok(frame)
    }
}

impl Encoder<Command> for TsipCodec {
    type Error = Error;

    fn encode(&mut self, item: Command, dst: &mut BytesMut) -> Result<(), Self::Error> {
        item.encode_into(dst);
        Ok(())
    }
}

impl Encoder<Packet> for TsipCodec {
    type Error = Error;

    fn encode(&mut self, item: Packet, dst: &mut BytesMut) -> Result<(), Self::Error> {
        frame_command(item.id(), &item.encode_body(), dst);
        Ok(())
    }
}
