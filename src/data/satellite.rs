//! Tracked satellites ready for propagation

use super::allowlist::CatalogMatch;
use super::catalog::TleRecord;

/// An allow-listed catalog record with its parsed element set
#[derive(Clone)]
pub struct TrackedSatellite {
    pub cospar_id: String,
    pub display_name: String,
    pub record: TleRecord,
    pub tle: satkit::TLE,
}

impl std::fmt::Debug for TrackedSatellite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackedSatellite")
            .field("cospar_id", &self.cospar_id)
            .field("display_name", &self.display_name)
            .field("name", &self.record.name)
            .finish()
    }
}

impl TrackedSatellite {
    /// Parse the element lines of a match; `None` if they are not a valid TLE
    pub fn from_match(matched: CatalogMatch) -> Option<Self> {
        match satkit::TLE::load_2line(&matched.record.line1, &matched.record.line2) {
            Ok(tle) => Some(Self {
                cospar_id: matched.cospar_id,
                display_name: matched.display_name,
                record: matched.record,
                tle,
            }),
            Err(e) => {
                log::warn!(
                    "Skipping {} ({}): failed to parse TLE: {}",
                    matched.display_name,
                    matched.cospar_id,
                    e
                );
                None
            }
        }
    }
}
