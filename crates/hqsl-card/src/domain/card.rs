//! # Card
//!
//! The signable contact confirmation and its canonical text form.
//!
//! ```text
//! from,where,to,yyyyMMddHHmm,signal,freq,mode,extra,reserved,sig
//! ```
//!
//! The first nine fields are the *signable text*: the exact bytes covered by
//! the detached signature. The tenth is the signature in the base-36
//! alphabet, or `UNSIGNED`. Card text may be prefixed by anything ending in
//! `#` (usually a deep-link URL); only what follows the last `#` is parsed.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::date::{display_ham_date, from_ham_date, to_ham_date, truncate_to_minute};
use super::errors::CardError;
use super::frequency::{freq_band, normalize_freq};
use super::grammar::{is_callsign, is_card_text, is_field_text, is_grid, FIELD_SEPARATOR};
use super::sigcode;

/// Signature field value of a card that carries no signature.
pub const UNSIGNED: &str = "UNSIGNED";

/// Number of fields in full card text.
pub const FIELD_COUNT: usize = 10;

/// Separator between an optional prefix (such as a URL) and card text.
pub const HEADER_SEPARATOR: char = '#';

/// An HQSL card: one confirmed contact.
///
/// Every field is optional so a card can be assembled piecemeal (for example
/// from an ADIF log). Completeness is enforced only when signable text is
/// requested.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Card {
    /// Originator callsign
    pub from: Option<String>,
    /// Originator Maidenhead locator (the `where` field)
    pub grid: Option<String>,
    /// Correspondent callsign
    pub to: Option<String>,
    /// Contact instant, UTC, minute precision
    pub when: Option<DateTime<Utc>>,
    /// Signal report
    pub signal: Option<String>,
    /// Frequency in MHz
    pub freq: Option<f64>,
    /// Mode token
    pub mode: Option<String>,
    /// Free text
    pub extra: Option<String>,
    /// Reserved, carried but not interpreted
    pub reserved: Option<String>,
    /// Raw detached signature bytes
    pub signature: Option<Vec<u8>>,
}

// =============================================================================
// FIELD RULES
// =============================================================================

type FieldRule = (&'static str, fn(&Card) -> bool);

/// Fields that must be present before a card can be signed, in check order.
const REQUIRED_FIELDS: &[FieldRule] = &[
    ("from", has_from),
    ("to", has_to),
    ("where", has_grid),
    ("when", has_when),
    ("mode", has_mode),
    ("freq", has_freq),
];

/// Grammar of each textual field. Optional fields may be absent or empty.
const FIELD_GRAMMAR: &[FieldRule] = &[
    ("from", from_is_callsign),
    ("to", to_is_callsign),
    ("where", grid_is_locator),
    ("mode", mode_is_field),
    ("signal", signal_is_field),
    ("extra", extra_is_field),
    ("reserved", reserved_is_field),
];

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

fn optional_field_ok(field: &Option<String>) -> bool {
    non_empty(field).map_or(true, is_field_text)
}

fn has_from(card: &Card) -> bool {
    non_empty(&card.from).is_some()
}

fn has_to(card: &Card) -> bool {
    non_empty(&card.to).is_some()
}

fn has_grid(card: &Card) -> bool {
    non_empty(&card.grid).is_some()
}

fn has_when(card: &Card) -> bool {
    card.when.is_some()
}

fn has_mode(card: &Card) -> bool {
    non_empty(&card.mode).is_some()
}

fn has_freq(card: &Card) -> bool {
    card.freq.is_some_and(|f| f.is_finite() && f != 0.0)
}

fn from_is_callsign(card: &Card) -> bool {
    non_empty(&card.from).is_some_and(is_callsign)
}

fn to_is_callsign(card: &Card) -> bool {
    non_empty(&card.to).is_some_and(is_callsign)
}

fn grid_is_locator(card: &Card) -> bool {
    non_empty(&card.grid).is_some_and(is_grid)
}

fn mode_is_field(card: &Card) -> bool {
    non_empty(&card.mode).is_some_and(is_field_text)
}

fn signal_is_field(card: &Card) -> bool {
    optional_field_ok(&card.signal)
}

fn extra_is_field(card: &Card) -> bool {
    optional_field_ok(&card.extra)
}

fn reserved_is_field(card: &Card) -> bool {
    optional_field_ok(&card.reserved)
}

fn text_or_none(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

// =============================================================================
// CARD
// =============================================================================

impl Card {
    /// Create a card with every field required for signing.
    ///
    /// No syntax checking happens here; it happens when the signable text is
    /// requested. `when` is truncated to the minute.
    pub fn new(
        from: impl Into<String>,
        grid: impl Into<String>,
        to: impl Into<String>,
        when: DateTime<Utc>,
        freq: f64,
        mode: impl Into<String>,
    ) -> Self {
        Self {
            from: Some(from.into()),
            grid: Some(grid.into()),
            to: Some(to.into()),
            when: Some(truncate_to_minute(when)),
            freq: Some(freq),
            mode: Some(mode.into()),
            ..Self::default()
        }
    }

    /// Set the signal report.
    #[must_use]
    pub fn with_signal(mut self, signal: impl Into<String>) -> Self {
        self.signal = Some(signal.into());
        self
    }

    /// Set the free-text field.
    #[must_use]
    pub fn with_extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = Some(extra.into());
        self
    }

    /// Parse full card text, optionally prefixed by `...#`.
    ///
    /// # Errors
    /// Returns the first `CardError` found, checking in this order:
    /// emptiness, alphabet, field count, callsigns, grid, date-time,
    /// frequency, signature.
    pub fn parse(text: &str) -> Result<Self, CardError> {
        if text.is_empty() {
            return Err(CardError::Empty);
        }

        let src = text.rsplit(HEADER_SEPARATOR).next().unwrap_or(text);
        if !is_card_text(src) {
            return Err(CardError::InvalidCharacters);
        }

        let fields: Vec<&str> = src.split(FIELD_SEPARATOR).collect();
        let [from, grid, to, when, signal, freq, mode, extra, reserved, signature] =
            fields.as_slice()
        else {
            return Err(CardError::FieldCount { got: fields.len() });
        };

        if !is_callsign(from) || !is_callsign(to) {
            return Err(CardError::MalformedCallsign);
        }
        if !is_grid(grid) {
            return Err(CardError::MalformedGrid);
        }
        let when = from_ham_date(when)?;
        let freq = freq
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .ok_or(CardError::MalformedFrequency)?;

        let signature = if *signature == UNSIGNED {
            None
        } else if sigcode::is_alphabet(signature) {
            Some(sigcode::decode(signature)?)
        } else {
            return Err(CardError::MalformedSignature);
        };

        Ok(Self {
            from: Some(from.to_string()),
            grid: Some(grid.to_string()),
            to: Some(to.to_string()),
            when: Some(when),
            signal: text_or_none(signal),
            freq: Some(freq),
            mode: text_or_none(mode),
            extra: text_or_none(extra),
            reserved: text_or_none(reserved),
            signature,
        })
    }

    /// The nine-field text covered by the signature.
    ///
    /// # Errors
    /// * `CardError::MissingField` - `from`, `to`, `where`, `when`, `mode` or `freq` absent
    /// * `CardError::NotSignable` - a present field breaks its grammar
    pub fn signable_text(&self) -> Result<String, CardError> {
        for &(name, present) in REQUIRED_FIELDS {
            if !present(self) {
                return Err(CardError::MissingField(name));
            }
        }
        for &(name, valid) in FIELD_GRAMMAR {
            if !valid(self) {
                return Err(CardError::NotSignable(name));
            }
        }

        let freq = normalize_freq(self.freq.unwrap_or(f64::NAN))?;
        let when = self.ham_date();
        let fields: [&str; 9] = [
            self.from.as_deref().unwrap_or_default(),
            self.grid.as_deref().unwrap_or_default(),
            self.to.as_deref().unwrap_or_default(),
            &when,
            self.signal.as_deref().unwrap_or_default(),
            &freq,
            self.mode.as_deref().unwrap_or_default(),
            self.extra.as_deref().unwrap_or_default(),
            self.reserved.as_deref().unwrap_or_default(),
        ];
        Ok(fields.join(","))
    }

    /// Full card text: signable text plus the encoded signature or `UNSIGNED`.
    ///
    /// # Errors
    /// Same as [`Card::signable_text`].
    pub fn to_text(&self) -> Result<String, CardError> {
        let signature = match &self.signature {
            Some(bytes) => sigcode::encode(bytes),
            None => UNSIGNED.to_string(),
        };
        Ok(format!(
            "{}{FIELD_SEPARATOR}{signature}",
            self.signable_text()?
        ))
    }

    /// ADIF band name derived from `freq`, empty when no frequency is known.
    pub fn band(&self) -> &'static str {
        if has_freq(self) {
            self.freq.map_or("", freq_band)
        } else {
            ""
        }
    }

    /// `when` as `yyyyMMddHHmm`, empty when unknown.
    pub fn ham_date(&self) -> String {
        self.when.as_ref().map(to_ham_date).unwrap_or_default()
    }

    /// `when` as `yyyy-MM-dd HH:mm`, empty when unknown.
    pub fn display_date(&self) -> String {
        self.when.as_ref().map(display_ham_date).unwrap_or_default()
    }

    /// True if a signature (possibly malformed) is attached.
    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }
}

impl FromStr for Card {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Card::parse(s)
    }
}

// =============================================================================
// TESTS
// =============================================================================
