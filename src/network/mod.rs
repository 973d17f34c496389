//! Receiver connection module
//!
//! This module handles the byte transport to the receiver: the read loop, the single task that
//! writes commands, and scheduled command requests.

mod connection;
mod scheduler;

pub use self::connection::{PacketReader, Session};
pub use self::scheduler::{ScheduleEntry, Scheduler};

use futures::SinkExt;
use tokio::io::AsyncWrite;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::codec::FramedWrite;
use tracing::{debug, info};

use crate::core::{Error, Result};
use crate::protocol::{Command, TsipCodec};

/// Handle for sending commands to the receiver
///
/// Every clone feeds the same writer task, so framed commands never interleave on the wire.
#[derive(Clone, Debug)]
pub struct CommandSender {
    command_tx: mpsc::Sender<Command>,
}

impl CommandSender {
    /// Queues a command for the writer task
    pub async fn send(&self, command: Command) -> Result<()> {
        self.command_tx.send(command).await
            .map_err(|e| Error::network(format!("Failed to queue command: {}", e)))
    }
}

/// Spawns the task that owns the outgoing half of the transport
///
/// The task exits with `Ok` once every [`CommandSender`] is dropped, or with the first write
/// error.
pub fn spawn_writer<W>(writer: W, capacity: usize) -> (CommandSender, JoinHandle<Result<()>>)
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (command_tx, mut command_rx) = mpsc::channel::<Command>(capacity);

    let handle = tokio::spawn(async move {
        let mut sink = FramedWrite::new(writer, TsipCodec::new());

        while let Some(command) = command_rx.recv().await {
            debug!(?command, "writing command");
            sink.send(command).await?;
        }

        info!("command queue closed, writer exiting");
        Ok(())
    });

    (CommandSender { command_tx }, handle)
}
