//! # Card Errors
//!
//! Error types for card parsing, serialization and table conversion.
//!
//! All of these describe malformed input. They surface synchronously to the
//! caller and are never coerced into a "best effort" card.

use thiserror::Error;

/// Syntax errors raised while parsing or serializing a card.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CardError {
    /// Nothing to parse.
    #[error("Empty string")]
    Empty,

    /// A character outside the card alphabet was found.
    #[error("Wrong characters in HQSL text")]
    InvalidCharacters,

    /// The card text did not split into exactly ten fields.
    #[error("Incorrect number of fields: expected 10, got {got}")]
    FieldCount {
        /// Number of fields found
        got: usize,
    },

    /// `from` or `to` does not match the callsign grammar.
    #[error("Malformed callsign")]
    MalformedCallsign,

    /// `where` is not a Maidenhead locator of even length between 4 and 12.
    #[error("Malformed grid square")]
    MalformedGrid,

    /// The date-time field is not a valid `yyyyMMddHHmm` UTC instant.
    #[error("Malformed datetime")]
    MalformedDateTime,

    /// The frequency field is not a finite number.
    #[error("Malformed frequency")]
    MalformedFrequency,

    /// The signature field holds characters outside the signature alphabet.
    #[error("Malformed signature")]
    MalformedSignature,

    /// A field required for signing is absent.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// A present field fails its grammar, so the card cannot be signed.
    #[error("Incomplete or malformed HQSL cannot be signed: bad {0}")]
    NotSignable(&'static str),
}

/// Frequency normalization error.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum FrequencyError {
    /// NaN or infinite frequency.
    #[error("Bogus frequency")]
    NotFinite,
}

impl From<FrequencyError> for CardError {
    fn from(_: FrequencyError) -> Self {
        CardError::MalformedFrequency
    }
}

/// Errors raised while reading ADI text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AdifError {
    /// A `<` tag was never closed with `>`.
    #[error("Unterminated tag at offset {0}")]
    UnterminatedTag(usize),

    /// A data specifier had no usable length.
    #[error("Malformed data specifier: {0}")]
    MalformedSpecifier(String),

    /// The declared length runs past the end of input.
    #[error("Field {name} declares {declared} characters, only {available} available")]
    Truncated {
        /// Field name
        name: String,
        /// Declared value length
        declared: usize,
        /// Characters left in the input
        available: usize,
    },
}
