//! # Frequency and Band Utilities
//!
//! Mapping between frequencies in MHz and ADIF band names, and the canonical
//! frequency text used inside signable card text.

use super::errors::FrequencyError;

/// Band name returned when a frequency cannot be classified.
pub const UNKNOWN_BAND: &str = "??";

/// ADIF band names and the midpoint of each band in MHz.
///
/// Order matters: classification ties go to the band listed first.
pub const BAND_MIDPOINTS: &[(&str, f64)] = &[
    ("2190m", 0.13675),
    ("630m", 0.4755),
    ("560m", 0.5025),
    ("160m", 1.9),
    ("80m", 3.75),
    ("60m", 5.255),
    ("40m", 7.15),
    ("30m", 10.125),
    ("20m", 14.175),
    ("17m", 18.118),
    ("15m", 21.225),
    ("12m", 24.94),
    ("10m", 28.85),
    ("8m", 42.5),
    ("6m", 52.0),
    ("5m", 61.950001),
    ("4m", 70.5),
    ("2m", 146.0),
    ("1.25m", 223.5),
    ("70cm", 435.0),
    ("33cm", 915.0),
    ("23cm", 1270.0),
    ("13cm", 2375.0),
    ("9cm", 3400.0),
    ("6cm", 5787.5),
    ("3cm", 10250.0),
    ("1.25cm", 24125.0),
    ("6mm", 47100.0),
    ("4mm", 78250.0),
    ("2.5mm", 121490.0),
    ("2mm", 141500.0),
    ("1mm", 245500.0),
    ("submm", 3900000.0),
];

/// Classify a frequency (MHz) into the band with the nearest midpoint.
///
/// Returns [`UNKNOWN_BAND`] for NaN or infinite input.
pub fn freq_band(mhz: f64) -> &'static str {
    let mut distance = f64::INFINITY;
    let mut known = UNKNOWN_BAND;
    for &(band, midpoint) in BAND_MIDPOINTS {
        let candidate = (mhz - midpoint).abs();
        // Strict comparison keeps the first band on ties and skips NaN.
        if candidate < distance {
            distance = candidate;
            known = band;
        }
    }
    known
}

/// Representative frequency (MHz) for a band name, ignoring case.
///
/// Best-effort backfill only: an unknown band is `None`, not an error.
pub fn band_freq(band: &str) -> Option<f64> {
    BAND_MIDPOINTS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(band))
        .map(|(_, midpoint)| *midpoint)
}

/// Render a frequency in MHz in the canonical card form.
///
/// 1. `.` is the decimal separator.
/// 2. With a whole part of 2 or more, at most 3 fractional digits are kept
///    (truncated, not rounded).
/// 3. Trailing fractional zeroes and a leading `0` whole part are dropped,
///    so sub-1 MHz values start with the decimal point.
/// 4. A bare trailing decimal point is removed.
///
/// # Errors
/// * `FrequencyError::NotFinite` - NaN or infinite input
pub fn normalize_freq(mhz: f64) -> Result<String, FrequencyError> {
    if !mhz.is_finite() {
        return Err(FrequencyError::NotFinite);
    }

    // f64's Display is the shortest round-trip form and never uses exponents.
    let textual = mhz.to_string();
    let (whole, fractional) = textual
        .split_once('.')
        .unwrap_or((textual.as_str(), ""));

    let fractional = if mhz.trunc() > 1.0 {
        &fractional[..fractional.len().min(3)]
    } else {
        fractional
    };
    let fractional = fractional.trim_end_matches('0');
    let whole = if whole == "0" { "" } else { whole };

    if fractional.is_empty() {
        Ok(whole.to_string())
    } else {
        Ok(format!("{whole}.{fractional}"))
    }
}
