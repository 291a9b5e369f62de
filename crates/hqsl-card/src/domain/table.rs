//! # ADIF Table Mapping
//!
//! Conversion between a [`Card`] and a flat ADIF record. Export is strict
//! (the card must be signable, since the full card text travels along as
//! `APP_HQSL_DATA`). Import is lenient and falls back to caller defaults.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::card::Card;
use super::date::{adif_date, adif_time, from_ham_date};
use super::errors::CardError;
use super::frequency::band_freq;

/// Longest grid sent as `GRIDSQUARE`; the rest goes to `GRIDSQUARE_EXT`.
const GRIDSQUARE_LEN: usize = 8;

/// Time assumed when a record has no `TIME_ON`.
const MIDNIGHT: &str = "0000";

/// One ADIF record: field name/value pairs in insertion order.
///
/// Names are stored as given; lookups ignore case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdifRecord {
    fields: Vec<(String, String)>,
}

impl AdifRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// First non-empty value of `name`, ignoring case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, v)| n.eq_ignore_ascii_case(name) && !v.is_empty())
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over fields in order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for AdifRecord {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        }
    }
}

impl Card {
    /// Export as an ADIF record, from the receiving station's point of view.
    ///
    /// # Errors
    /// Anything [`Card::to_text`] rejects.
    pub fn to_table(&self) -> Result<AdifRecord, CardError> {
        let full_text = self.to_text()?;
        let grid = self.grid.as_deref().unwrap_or_default();
        let when = self.when.as_ref();

        let mut record = AdifRecord::new();
        record.push("CALL", self.from.as_deref().unwrap_or_default());
        record.push("OPERATOR", self.to.as_deref().unwrap_or_default());
        record.push("QSO_DATE", when.map(adif_date).unwrap_or_default());
        record.push("TIME_ON", when.map(adif_time).unwrap_or_default());
        record.push("GRIDSQUARE", grid.get(..GRIDSQUARE_LEN).unwrap_or(grid));
        if let Some(signal) = self.signal.as_deref().filter(|s| !s.is_empty()) {
            record.push("RST_RCVD", signal);
        }
        record.push("MODE", self.mode.as_deref().unwrap_or_default());
        record.push(
            "FREQ",
            self.freq.map(|f| f.to_string()).unwrap_or_default(),
        );
        record.push("BAND", self.band());
        record.push("QSL_RCVD", "Y");
        record.push("APP_HQSL_DATA", full_text);
        if let Some(ext) = grid.get(GRIDSQUARE_LEN..).filter(|ext| !ext.is_empty()) {
            record.push("GRIDSQUARE_EXT", ext);
        }
        if let Some(extra) = self.extra.as_deref().filter(|s| !s.is_empty()) {
            record.push("COMMENT", extra.replacen('_', " ", 1));
        }
        Ok(record)
    }

    /// Build a card from an ADIF record, from the logging station's point of
    /// view. The result is not necessarily signable: a record without a usable
    /// `QSO_DATE`/`TIME_ON` gives a card with no `when`.
    pub fn from_table(record: &AdifRecord, default_call: &str, default_grid: &str) -> Card {
        let from = record
            .get("OPERATOR")
            .or_else(|| record.get("STATION_CALLSIGN"))
            .unwrap_or(default_call)
            .to_ascii_uppercase();

        let grid = match record.get("MY_GRIDSQUARE") {
            Some(square) => format!("{square}{}", record.get("MY_GRIDSQUARE_EXT").unwrap_or("")),
            None => default_grid.to_string(),
        };

        let when = contact_time(record);
        if when.is_none() {
            debug!(call = ?record.get("CALL"), "[hqsl] ADIF record has no usable contact time");
        }

        let freq = record
            .get("FREQ")
            .and_then(|f| f.trim().parse::<f64>().ok())
            .filter(|f| f.is_finite() && *f != 0.0)
            .or_else(|| record.get("BAND").and_then(band_freq));

        Card {
            from: Some(from),
            grid: Some(grid),
            to: record.get("CALL").map(str::to_string),
            when,
            signal: record.get("RST_SENT").map(str::to_string),
            freq,
            mode: record.get("MODE").map(str::to_string),
            extra: record.get("COMMENT").map(str::to_string),
            reserved: None,
            signature: None,
        }
    }
}

/// `QSO_DATE` plus the first four characters of `TIME_ON` (midnight if absent).
fn contact_time(record: &AdifRecord) -> Option<DateTime<Utc>> {
    let date = record.get("QSO_DATE")?;
    let time = record.get("TIME_ON").unwrap_or(MIDNIGHT);
    from_ham_date(&format!("{date}{}", time.get(..4).unwrap_or(time))).ok()
}
