use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep_until, Instant, MissedTickBehavior};
use tracing::info;

use crate::core::{Config, Error, Result};
use crate::protocol::Command;
use super::CommandSender;

/// A command sent after `delay`, then every `period` if set
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleEntry {
    pub command: Command,
    pub delay: Duration,
    pub period: Option<Duration>,
}

/// Periodic and one-shot requests to the receiver
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    entries: Vec<ScheduleEntry>,
}

impl Scheduler {
    /// Creates an empty schedule
    pub fn new() -> Self {
        Scheduler::default()
    }

    /// Builds the schedule described by `config`
    ///
    /// The software version is requested once, tracking status and signal levels are polled.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let mut scheduler = Scheduler::new();

        if let Some(delay) = config.version_request_delay {
            scheduler = scheduler.once(Command::RequestSoftwareVersion, delay);
        }
        if let Some(period) = config.tracking_status_interval {
            scheduler = scheduler.every(Command::RequestSatelliteTrackingStatus { satellite: 0 }, period);
        }
        if let Some(period) = config.signal_levels_interval {
            scheduler = scheduler.every(Command::RequestSignalLevels, period);
        }

        Ok(scheduler)
    }

    /// Sends `command` once, after `delay`
    pub fn once(mut self, command: Command, delay: Duration) -> Self {
        self.entries.push(ScheduleEntry {
            command,
            delay,
            period: None,
        });
        self
    }

    /// Sends `command` every `period`, starting one period from now
    pub fn every(mut self, command: Command, period: Duration) -> Self {
        self.entries.push(ScheduleEntry {
            command,
            delay: period,
            period: Some(period),
        });
        self
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    /// Spawns one task per entry
    ///
    /// Fails without spawning anything if an entry has a zero period. A task ends after its last
    /// send, or with an error once the writer is gone.
    pub fn spawn(self, commands: CommandSender) -> Result<Vec<JoinHandle<Result<()>>>> {
        if let Some(entry) = self.entries.iter().find(|e| e.period == Some(Duration::ZERO)) {
            return Err(Error::config(format!(
                "period of {:?} must be non-zero",
                entry.command
            )));
        }

        Ok(self
            .entries
            .into_iter()
            .map(|entry| tokio::spawn(run_entry(entry, commands.clone())))
            .collect())
    }
}

async fn run_entry(entry: ScheduleEntry, commands: CommandSender) -> Result<()> {
    let start = Instant::now() + entry.delay;

    let Some(period) = entry.period else {
        sleep_until(start).await;
        info!(command = ?entry.command, "sending scheduled command");
        return commands.send(entry.command).await;
    };

    let mut ticker = interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        info!(command = ?entry.command, "sending periodic command");
        commands.send(entry.command).await?;
    }
}
