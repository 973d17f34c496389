use std::time::Duration;

use serde::{Serialize, Deserialize};

use super::{Error, Result};

/// What the frame assembler does with bytes beyond the frame limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Drop the excess bytes and still emit the frame, cut at the limit
    #[default]
    Truncate,
    /// Drop the whole frame and report it
    Reject,
}

/// What the frame assembler does when a DLE is not followed by ETX
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FramingErrorPolicy {
    /// Fail the stream
    #[default]
    Halt,
    /// Discard the partial frame and wait for the next DLE ETX
    Resync,
}

/// Configuration for a TSIP receiver session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address of the serial-to-network bridge, `host:port`
    pub addr: String,
    /// Maximum de-stuffed frame length
    pub max_frame_len: usize,
    /// Policy for frames longer than `max_frame_len`
    pub overflow: OverflowPolicy,
    /// Policy for framing errors
    pub on_framing_error: FramingErrorPolicy,
    /// Discard input until the first DLE ETX before assembling frames
    pub synchronize: bool,
    /// Give up if no complete frame arrives for this long
    #[serde(serialize_with = "super::serde::serialize_opt_duration")]
    #[serde(deserialize_with = "super::serde::deserialize_opt_duration")]
    pub read_timeout: Option<Duration>,
    /// Capacity of the outgoing command queue
    pub command_queue: usize,
    /// Delay before the one-shot software version request
    #[serde(serialize_with = "super::serde::serialize_opt_duration")]
    #[serde(deserialize_with = "super::serde::deserialize_opt_duration")]
    pub version_request_delay: Option<Duration>,
    /// Period of the satellite tracking status request
    #[serde(serialize_with = "super::serde::serialize_opt_duration")]
    #[serde(deserialize_with = "super::serde::deserialize_opt_duration")]
    pub tracking_status_interval: Option<Duration>,
    /// Period of the signal level request
    #[serde(serialize_with = "super::serde::serialize_opt_duration")]
    #[serde(deserialize_with = "super::serde::deserialize_opt_duration")]
    pub signal_levels_interval: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            addr: String::new(),
            max_frame_len: super::MAX_FRAME_LEN,
            overflow: OverflowPolicy::default(),
            on_framing_error: FramingErrorPolicy::default(),
            synchronize: true,
            read_timeout: None,
            command_queue: super::DEFAULT_COMMAND_QUEUE,
            version_request_delay: Some(Duration::from_secs(1)),
            tracking_status_interval: Some(Duration::from_secs(30)),
            signal_levels_interval: None,
        }
    }
}

impl Config {
    /// Creates a default configuration for the given bridge address
    pub fn with_addr(addr: impl Into<String>) -> Self {
        Config {
            addr: addr.into(),
            ..Default::default()
        }
    }

    /// Checks that the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if self.max_frame_len == 0 {
            return Err(Error::config("max_frame_len must be non-zero"));
        }
        if self.command_queue == 0 {
            return Err(Error::config("command_queue must be non-zero"));
        }

        let periods = [
            ("read_timeout", self.read_timeout),
            ("tracking_status_interval", self.tracking_status_interval),
            ("signal_levels_interval", self.signal_levels_interval),
        ];
        for (name, period) in periods {
            if period == Some(Duration::ZERO) {
                return Err(Error::config(format!("{} must be non-zero", name)));
            }
        }

        Ok(())
    }
}
