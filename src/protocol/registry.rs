//! Prefix table mapping frames to packet kinds

use std::fmt;

use crate::core::{Error, Result};

/// Fixed-layout packet kinds known to the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketKind {
    PrimaryTiming,
    SecondaryTiming,
    PpsCharacteristics,
    SatelliteTrackingStatus,
    SoftwareVersion,
}

impl PacketKind {
    /// The report id (and subcode) this kind is sent with
    pub fn id(&self) -> &'static [u8] {
        match self {
            PacketKind::PrimaryTiming => &[0x8f, 0xab],
            PacketKind::SecondaryTiming => &[0x8f, 0xac],
            PacketKind::PpsCharacteristics => &[0x8f, 0x4a],
            PacketKind::SatelliteTrackingStatus => &[0x5c],
            PacketKind::SoftwareVersion => &[0x45],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PacketKind::PrimaryTiming => "Primary Timing",
            PacketKind::SecondaryTiming => "Secondary Timing",
            PacketKind::PpsCharacteristics => "PPS Characteristics",
            PacketKind::SatelliteTrackingStatus => "Satellite Tracking Status",
            PacketKind::SoftwareVersion => "Software Version",
        }
    }
}

impl fmt::Display for PacketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One row of the prefix table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchEntry {
    pub prefix: Vec<u8>,
    pub kind: PacketKind,
}

impl MatchEntry {
    pub fn new(prefix: &[u8], kind: PacketKind) -> Self {
        MatchEntry {
            prefix: prefix.to_vec(),
            kind,
        }
    }

    fn matches(&self, frame: &[u8]) -> bool {
        frame.starts_with(&self.prefix)
    }
}

/// Ordered prefix table; the first matching entry wins
#[derive(Debug, Clone)]
pub struct Registry {
    entries: Vec<MatchEntry>,
}

impl Registry {
    /// Builds a registry, checking that no entry is shadowed by an earlier one.
    ///
    /// Entries are tried in order, so an entry whose prefix extends an earlier prefix could
    /// never match. Such tables are rejected, as are duplicate prefixes and prefixes that are
    /// not one or two bytes long.
    pub fn new(entries: Vec<MatchEntry>) -> Result<Self> {
        for (i, entry) in entries.iter().enumerate() {
            if !(1..=2).contains(&entry.prefix.len()) {
                return Err(Error::registry(format!(
                    "{} prefix must be 1 or 2 bytes, got {}",
                    entry.kind,
                    entry.prefix.len()
                )));
            }

            if let Some(earlier) = entries[..i].iter().find(|e| entry.prefix.starts_with(&e.prefix)) {
                return Err(Error::registry(format!(
                    "{} prefix {:02x?} is shadowed by earlier {} prefix {:02x?}",
                    entry.kind, entry.prefix, earlier.kind, earlier.prefix
                )));
            }
        }

        Ok(Registry { entries })
    }

    /// The TSIP reports this crate decodes, longest prefixes first
    pub fn standard() -> Result<Self> {
        use PacketKind::*;

        Self::new(
            [PrimaryTiming, SecondaryTiming, PpsCharacteristics, SatelliteTrackingStatus, SoftwareVersion]
                .into_iter()
                .map(|kind| MatchEntry::new(kind.id(), kind))
                .collect(),
        )
    }

    /// Finds the kind of `frame` and the offset at which its fields start
    pub fn classify(&self, frame: &[u8]) -> Option<(PacketKind, usize)> {
        self.entries
            .iter()
            .find(|entry| entry.matches(frame))
            .map(|entry| (entry.kind, entry.prefix.len()))
    }

    pub fn entries(&self) -> &[MatchEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry() {
        let registry = Registry::standard().unwrap();
        assert_eq!(registry.entries().len(), 5);
    }

    #[test]
    fn test_classify_subcodes() {
        let registry = Registry::standard().unwrap();
        assert_eq!(
            registry.classify(&[0x8f, 0xab, 0x00]),
            Some((PacketKind::PrimaryTiming, 2))
        );
        assert_eq!(
            registry.classify(&[0x8f, 0xac]),
            Some((PacketKind::SecondaryTiming, 2))
        );
        assert_eq!(
            registry.classify(&[0x8f, 0x4a, 0x01]),
            Some((PacketKind::PpsCharacteristics, 2))
        );
        assert_eq!(registry.classify(&[0x45, 0x01]), Some((PacketKind::SoftwareVersion, 1)));
        assert_eq!(registry.classify(&[0x5c]), Some((PacketKind::SatelliteTrackingStatus, 1)));
    }

    #[test]
    fn test_classify_never_reads_past_frame() {
        let registry = Registry::standard().unwrap();
        assert_eq!(registry.classify(&[0x8f]), None);
        assert_eq!(registry.classify(&[]), None);
        assert_eq!(registry.classify(&[0x8f, 0x41]), None);
        assert_eq!(registry.classify(&[0x47, 0x00]), None);
    }

    #[test]
    fn test_rejects_shadowed_entry() {
        let entries = vec![
            MatchEntry::new(&[0x8f], PacketKind::SecondaryTiming),
            MatchEntry::new(&[0x8f, 0xab], PacketKind::PrimaryTiming),
        ];
        let err = Registry::new(entries).unwrap_err();
        assert!(matches!(err, Error::Registry(_)));
    }

    #[test]
    fn test_longer_prefix_first_wins() {
        let registry = Registry::new(vec![
            MatchEntry::new(&[0x8f, 0xab], PacketKind::PrimaryTiming),
            MatchEntry::new(&[0x8f], PacketKind::SecondaryTiming),
        ])
        .unwrap();

        assert_eq!(
            registry.classify(&[0x8f, 0xab, 0x01]),
            Some((PacketKind::PrimaryTiming, 2))
        );
        assert_eq!(
            registry.classify(&[0x8f, 0xac, 0x01]),
            Some((PacketKind::SecondaryTiming, 1))
        );
    }

    #[test]
    fn test_rejects_duplicates_and_bad_lengths() {
        assert!(Registry::new(vec![
            MatchEntry::new(&[0x45], PacketKind::SoftwareVersion),
            MatchEntry::new(&[0x45], PacketKind::SatelliteTrackingStatus),
        ])
        .is_err());
        assert!(Registry::new(vec![MatchEntry::new(&[], PacketKind::SoftwareVersion)]).is_err());
        assert!(Registry::new(vec![MatchEntry::new(&[1, 2, 3], PacketKind::SoftwareVersion)]).is_err());
    }
}
