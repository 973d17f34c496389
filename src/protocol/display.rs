//! Human readable rendering of decoded reports
//!
//! Angles are shown in degrees and software version years as full years. A tracking status for a
//! satellite without signal renders as an empty string.

use std::fmt;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::util::{full_year, rad_to_deg32, rad_to_deg64, round_to_int};
use super::packet::{
    Packet, PpsCharacteristics, PrimaryTiming, SatelliteTrackingStatus, SecondaryTiming,
    SoftwareVersion,
};
use super::variable::SignalReport;

impl PrimaryTiming {
    /// Calendar time of the report, if the calendar fields form a valid date
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        let date = NaiveDate::from_ymd_opt(
            self.year.into(),
            self.month.into(),
            self.day_of_month.into(),
        )?;
        let time = date.and_hms_opt(self.hours.into(), self.minutes.into(), self.seconds.into())?;
        Some(Utc.from_utc_datetime(&time))
    }
}

impl fmt::Display for PrimaryTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Primary Timing Packet:  {:04}/{:02}/{:02} {:02}:{:02}:{:02}  (GPS offset {})",
            self.year,
            self.month,
            self.day_of_month,
            self.hours,
            self.minutes,
            self.seconds,
            self.utc_offset
        )
    }
}

impl fmt::Display for SecondaryTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Secondary packet:  RCV {}, DIS {}, SUR {} PPS-OFFSET: {:.6} CriticalAlarm: {:x} \
             MinorAlarm: {:x} DecodeStatus: {:x} Temp: {:.6} Lat: {:.6} Long: {:.6} Alt: {:.6}",
            self.receiver_mode,
            self.disciplining_mode,
            self.self_survey_progress,
            self.pps_offset,
            self.critical_alarms,
            self.minor_alarms,
            self.gps_decode_status,
            self.temperature,
            rad_to_deg64(self.latitude),
            rad_to_deg64(self.longitude),
            self.altitude
        )
    }
}

impl fmt::Display for PpsCharacteristics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PPS Characteristics packet: Output-enable {}, Polarity {}, PPS Offset: {:.6}, \
             Bias Threshold: {:.6}",
            self.pps_output_enable, self.pps_polarity, self.pps_offset, self.bias_threshold
        )
    }
}

impl fmt::Display for SatelliteTrackingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let signal = self.signal_level as i32;
        if signal <= 0 {
            return Ok(());
        }

        write!(
            f,
            "Satellite Tracking Status:  PRN: {}, Signal: {}, Elev: {}, Azi: {}",
            self.prn,
            signal,
            round_to_int(rad_to_deg32(self.elevation)),
            round_to_int(rad_to_deg32(self.azimuth))
        )
    }
}

impl fmt::Display for SoftwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Software Version Response:  App: {}.{} {:04}/{:02}/{:02}  GPS: {}.{} {:04}/{:02}/{:02}",
            self.app_major,
            self.app_minor,
            full_year(self.app_year_from_2000),
            self.app_month,
            self.app_day,
            self.gps_major,
            self.gps_minor,
            full_year(self.gps_year_from_2000),
            self.gps_month,
            self.gps_day
        )
    }
}

impl fmt::Display for SignalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Satellite Signal Report PRN/Signal:")?;
        for (prn, level) in self.visible() {
            write!(f, " {}/{}", prn, level)?;
        }
        Ok(())
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Packet::PrimaryTiming(p) => fmt::Display::fmt(p, f),
            Packet::SecondaryTiming(p) => fmt::Display::fmt(p, f),
            Packet::PpsCharacteristics(p) => fmt::Display::fmt(p, f),
            Packet::SatelliteTrackingStatus(p) => fmt::Display::fmt(p, f),
            Packet::SoftwareVersion(p) => fmt::Display::fmt(p, f),
            Packet::SatelliteSignalReport(p) => fmt::Display::fmt(p, f),
        }
    }
}
