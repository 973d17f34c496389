use std::time::Duration;

use futures::StreamExt;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::codec::FramedRead;
use tracing::{debug, info, warn};

use crate::core::{Config, Error, Result};
use crate::protocol::{Frame, Packet, Registry, TsipCodec};
use super::{spawn_writer, CommandSender};

/// Read side of a receiver connection: bytes in, decoded packets out
pub struct PacketReader<R> {
    /// Frames from the transport
    frames: FramedRead<R, TsipCodec>,
    /// Report prefix table
    registry: Registry,
    /// Longest wait for a complete frame
    read_timeout: Option<Duration>,
}

impl<R> PacketReader<R>
where
    R: AsyncRead + Unpin,
{
    /// Creates a reader using the frame settings of `config`
    pub fn new(reader: R, config: &Config) -> Result<Self> {
        Ok(PacketReader {
            frames: FramedRead::new(reader, TsipCodec::from_config(config)),
            registry: Registry::standard()?,
            read_timeout: config.read_timeout,
        })
    }

    /// Waits for the next de-stuffed frame
    ///
    /// `None` means the transport closed. Errors are fatal: the stream yields nothing after one.
    pub async fn next_frame(&mut self) -> Option<Result<Frame>> {
        match self.read_timeout {
            Some(limit) => match timeout(limit, self.frames.next()).await {
                Ok(frame) => frame,
                Err(_) => Some(Err(Error::Timeout(limit))),
            },
            None => self.frames.next().await,
        }
    }

    /// Waits for the next packet, skipping frames that fail to decode
    pub async fn next_packet(&mut self) -> Option<Result<Packet>> {
        loop {
            let frame = match self.next_frame().await? {
                Ok(frame) => frame,
                Err(e) => return Some(Err(e)),
            };

            match Packet::decode(&self.registry, &frame) {
                Ok(packet) => {
                    debug!(id = ?packet.id(), len = frame.len(), "decoded packet");
                    return Some(Ok(packet));
                }
                Err(e) if e.is_recoverable() => warn!(error = %e, "dropping packet"),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// A connection to a TSIP receiver
pub struct Session<R> {
    /// Read side
    reader: PacketReader<R>,
    /// Handle to the writer task
    commands: CommandSender,
    /// Writer task, owning the write side
    writer: JoinHandle<Result<()>>,
}

impl Session<OwnedReadHalf> {
    /// Connects to the serial-to-network bridge at `config.addr`
    pub async fn connect(config: &Config) -> Result<Self> {
        config.validate()?;

        info!(addr = %config.addr, "connecting to serial server");
        let stream = TcpStream::connect(&config.addr)
            .await
            .map_err(|e| Error::network(format!("Could not connect to {}: {}", config.addr, e)))?;
        stream.set_nodelay(true)?;

        let (reader, writer) = stream.into_split();
        Session::new(reader, writer, config)
    }
}

impl<R> Session<R>
where
    R: AsyncRead + Unpin,
{
    /// Creates a session over an already open transport
    ///
    /// Spawns the writer task, so this must run inside a tokio runtime.
    pub fn new<W>(reader: R, writer: W, config: &Config) -> Result<Self>
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        config.validate()?;

        let reader = PacketReader::new(reader, config)?;
        let (commands, writer) = spawn_writer(writer, config.command_queue);

        Ok(Session {
            reader,
            commands,
            writer,
        })
    }

    /// Returns a handle for sending commands
    pub fn commands(&self) -> CommandSender {
        self.commands.clone()
    }

    /// Waits for the next packet; see [`PacketReader::next_packet`]
    pub async fn next_packet(&mut self) -> Option<Result<Packet>> {
        self.reader.next_packet().await
    }

    /// Hands every packet to `on_packet` until the receiver disconnects
    ///
    /// Returns `Ok` when the transport closes cleanly, or the first fatal error from either
    /// direction.
    pub async fn run<F>(mut self, mut on_packet: F) -> Result<()>
    where
        F: FnMut(Packet),
    {
        loop {
            tokio::select! {
                packet = self.reader.next_packet() => match packet {
                    Some(packet) => on_packet(packet?),
                    None => {
                        info!("receiver closed the connection");
                        self.writer.abort();
                        return Ok(());
                    }
                },

                result = &mut self.writer => {
                    // the session holds a sender, so the writer only stops on failure
                    return match result {
                        Ok(Ok(())) => Err(Error::network("Writer task stopped")),
                        Ok(Err(e)) => Err(e),
                        Err(e) => Err(Error::network(format!("Writer task failed: {}", e))),
                    };
                }
            }
        }
    }
}

impl<R> Drop for Session<R> {
    fn drop(&mut self) {
        self.writer.abort();
    }
}
