//! Built-in allow-list of tracked objects

use std::collections::HashMap;

use super::catalog::TleRecord;

/// COSPAR identifier -> display name
const TRACKED_OBJECTS: &[(&str, &str)] = &[
    ("98067A", "ISS"),
    ("21035A", "Tiangong"),
    ("90037B", "Hubble Space Telescope"),
    ("98030A", "NOAA 15"),
    ("99068A", "Terra"),
    ("02022A", "Aqua"),
    ("13008A", "Landsat 8"),
    ("21088A", "Landsat 9"),
];

/// Records whose name contains one of these are dropped
const BLOCKED_NAME_SUBSTRINGS: &[&str] = &["DEB", "R/B"];

/// A catalog record that passed the allow-list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogMatch {
    pub cospar_id: String,
    pub display_name: String,
    pub record: TleRecord,
}

/// Exact-match lookup keyed by COSPAR identifier
#[derive(Debug, Clone)]
pub struct AllowList {
    names: HashMap<&'static str, &'static str>,
    blocked: &'static [&'static str],
}

impl Default for AllowList {
    fn default() -> Self {
        Self::builtin()
    }
}

impl AllowList {
    pub fn builtin() -> Self {
        Self {
            names: TRACKED_OBJECTS.iter().copied().collect(),
            blocked: BLOCKED_NAME_SUBSTRINGS,
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn display_name(&self, cospar_id: &str) -> Option<&'static str> {
        self.names.get(cospar_id).copied()
    }

    pub fn is_blocked(&self, name: &str) -> bool {
        let upper = name.to_uppercase();
        self.blocked.iter().any(|pattern| upper.contains(pattern))
    }

    /// Keep allow-listed, non-blocked records
    pub fn filter(&self, records: &[TleRecord]) -> Vec<CatalogMatch> {
        let mut matches = Vec::new();
        for record in records {
            if self.is_blocked(&record.name) {
                log::debug!("Ignoring blocked object {:?}", record.name);
                continue;
            }
            let Some(cospar_id) = record.cospar_id() else {
                continue;
            };
            if let Some(display_name) = self.display_name(cospar_id) {
                matches.push(CatalogMatch {
                    cospar_id: cospar_id.to_string(),
                    display_name: display_name.to_string(),
                    record: record.clone(),
                });
            }
        }
        log::info!(
            "Matched {} of {} catalog records against the allow-list",
            matches.len(),
            records.len()
        );
        matches
    }
}
