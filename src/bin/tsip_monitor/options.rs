use std::time::Duration;

use structopt::StructOpt;

use tsip::core::{Config, FramingErrorPolicy, OverflowPolicy};

#[derive(Debug, Clone, PartialEq, StructOpt)]
#[structopt(name = "tsip-monitor", about = "Print reports from a TSIP receiver behind a serial server")]
pub struct Options {
    /// Serial server host
    #[structopt(required = true)]
    pub address: String,

    /// Serial server port
    #[structopt(required = true)]
    pub port: u16,

    /// Seconds between satellite tracking status requests, 0 to disable
    #[structopt(long = "tracking-interval", default_value = "30", parse(try_from_str = seconds))]
    pub tracking_interval: f64,

    /// Seconds between signal level requests, 0 to disable
    #[structopt(long = "signal-interval", default_value = "0", parse(try_from_str = seconds))]
    pub signal_interval: f64,

    /// Do not request the software version on connect
    #[structopt(long = "no-version")]
    pub no_version: bool,

    /// Give up after this many seconds without a complete frame
    #[structopt(long = "read-timeout", parse(try_from_str = seconds))]
    pub read_timeout: Option<f64>,

    /// Largest accepted frame, in bytes after de-stuffing
    #[structopt(long = "max-frame-len", default_value = "256")]
    pub max_frame_len: usize,

    /// Drop oversized frames instead of truncating them
    #[structopt(long = "reject-oversized")]
    pub reject_oversized: bool,

    /// Resynchronize on framing errors instead of exiting
    #[structopt(long)]
    pub resync: bool,

    /// Multi-line log output
    #[structopt(long)]
    pub pretty: bool,
}

fn seconds(s: &str) -> Result<f64, String> {
    let secs: f64 = s.parse().map_err(|e| format!("{}", e))?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(format!("expected a non-negative number of seconds, got {}", s));
    }
    Ok(secs)
}

fn period(secs: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(secs).ok().filter(|d| !d.is_zero())
}

impl Options {
    pub fn config(&self) -> Config {
        Config {
            addr: format!("{}:{}", self.address, self.port),
            max_frame_len: self.max_frame_len,
            overflow: if self.reject_oversized {
                OverflowPolicy::Reject
            } else {
                OverflowPolicy::Truncate
            },
            on_framing_error: if self.resync {
                FramingErrorPolicy::Resync
            } else {
                FramingErrorPolicy::Halt
            },
            read_timeout: self.read_timeout.and_then(period),
            version_request_delay: if self.no_version {
                None
            } else {
                Some(Duration::from_secs(1))
            },
            tracking_status_interval: period(self.tracking_interval),
            signal_levels_interval: period(self.signal_interval),
            ..Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsip::core::MAX_FRAME_LEN;

    #[test]
    fn test_defaults_match_library() {
        let opts = Options::from_iter(&["tsip-monitor", "192.168.1.20", "4001"]);
        let config = opts.config();
        assert_eq!(config.addr, "192.168.1.20:4001");
        assert_eq!(config.max_frame_len, MAX_FRAME_LEN);
        assert_eq!(config.tracking_status_interval, Some(Duration::from_secs(30)));
        assert_eq!(config.signal_levels_interval, None);
        assert_eq!(config.on_framing_error, FramingErrorPolicy::Halt);
    }

    #[test]
    fn test_flags() {
        let opts = Options::from_iter(&[
            "tsip-monitor",
            "gps.local",
            "5000",
            "--tracking-interval",
            "0",
            "--signal-interval",
            "15",
            "--no-version",
            "--resync",
            "--reject-oversized",
        ]);
        let config = opts.config();
        assert_eq!(config.tracking_status_interval, None);
        assert_eq!(config.signal_levels_interval, Some(Duration::from_secs(15)));
        assert_eq!(config.version_request_delay, None);
        assert_eq!(config.on_framing_error, FramingErrorPolicy::Resync);
        assert_eq!(config.overflow, OverflowPolicy::Reject);
    }

    #[test]
    fn test_rejects_bad_durations() {
        for args in [
            ["--tracking-interval", "-5"],
            ["--signal-interval", "inf"],
            ["--read-timeout", "NaN"],
            ["--read-timeout", "soon"],
        ] {
            let result = Options::from_iter_safe(
                ["tsip-monitor", "gps.local", "5000"].iter().chain(args.iter()),
            );
            assert!(result.is_err(), "accepted {:?}", args);
        }
    }

    #[test]
    fn test_fractional_read_timeout() {
        let opts = Options::from_iter(&["tsip-monitor", "gps.local", "5000", "--read-timeout", "2.5"]);
        assert_eq!(opts.config().read_timeout, Some(Duration::from_millis(2500)));
    }
}
