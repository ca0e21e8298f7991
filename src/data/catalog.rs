//! Three-line TLE catalog parsing

use serde::{Deserialize, Serialize};

/// Columns 10-17 of data line 1 (international designator)
const COSPAR_COLUMNS: std::ops::Range<usize> = 9..17;

/// One catalog entry: a name line followed by the two element lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TleRecord {
    pub name: String,
    pub line1: String,
    pub line2: String,
}

impl TleRecord {
    /// Short COSPAR identifier, e.g. `98067A`
    pub fn cospar_id(&self) -> Option<&str> {
        let id = self.line1.get(COSPAR_COLUMNS)?.trim();
        if id.is_empty() {
            None
        } else {
            Some(id)
        }
    }

    /// NORAD catalog number from columns 3-7
    pub fn norad_id(&self) -> Option<u32> {
        self.line1.get(2..7)?.trim().parse().ok()
    }
}

fn is_data_line(line: &str, number: char) -> bool {
    let mut chars = line.chars();
    chars.next() == Some(number) && chars.next() == Some(' ')
}

/// Parse a plain-text catalog of name/line1/line2 triples.
///
/// Records missing one of their three lines are logged and skipped; parsing
/// carries on with the next name line.
pub fn parse_catalog(text: &str) -> Vec<TleRecord> {
    let mut records = Vec::new();
    let mut name: Option<String> = None;
    let mut line1: Option<String> = None;

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let line_no = index + 1;

        if is_data_line(line, '1') {
            if name.is_none() {
                log::warn!("Skipping element line 1 without a name (line {})", line_no);
                continue;
            }
            if line1.is_some() {
                log::warn!(
                    "Skipping record {:?}: repeated element line 1 (line {})",
                    name.as_deref().unwrap_or_default(),
                    line_no
                );
                name = None;
                line1 = None;
                continue;
            }
            line1 = Some(line.to_string());
        } else if is_data_line(line, '2') {
            match (name.take(), line1.take()) {
                (Some(name), Some(line1)) => records.push(TleRecord {
                    name,
                    line1,
                    line2: line.to_string(),
                }),
                (name, _) => log::warn!(
                    "Skipping record {:?}: element line 2 without line 1 (line {})",
                    name.unwrap_or_default(),
                    line_no
                ),
            }
        } else {
            if let Some(previous) = name.take() {
                log::warn!(
                    "Skipping record {:?}: missing element lines (line {})",
                    previous,
                    line_no
                );
            }
            line1 = None;
            // 3LE files prefix the name with "0 "
            let cleaned = line.strip_prefix("0 ").unwrap_or(line).trim();
            name = Some(cleaned.to_string());
        }
    }

    if let Some(previous) = name {
        log::warn!("Skipping record {:?}: catalog ended mid-record", previous);
    }

    log::debug!("Parsed {} catalog records", records.len());
    records
}
