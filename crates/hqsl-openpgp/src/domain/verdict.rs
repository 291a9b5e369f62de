//! # Verification Results
//!
//! A verdict is a value, not an error: "this card does not check out" is an
//! ordinary outcome.

use std::fmt;

use hqsl_card::Card;
use serde::{Deserialize, Serialize};

use super::keys::PublicKey;

/// Outcome of verifying a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    /// The card carries no signature, though it may be valid otherwise.
    NotSigned,
    /// Signature, signer key and certification all check out.
    Valid,
    /// The signature is unparsable, does not verify, or breaks the protocol.
    Invalid,
    /// No configured key directory returned the signer key.
    KeyNotFound,
    /// A valid signature by a key no trusted root certified for this contact.
    KeyNotCertified,
}

impl Verdict {
    /// Stable human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            Verdict::NotSigned => "The card is not signed.",
            Verdict::Valid => "The card is signed by a key certified for this callsign and time.",
            Verdict::Invalid => {
                "The signature is malformed, does not verify, or does not follow the protocol."
            }
            Verdict::KeyNotFound => "The signer key could not be found on any key server.",
            Verdict::KeyNotCertified => {
                "The signer key is not certified by a trusted key for this callsign and time."
            }
        }
    }

    /// True only for [`Verdict::Valid`].
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Verdict::NotSigned => "NotSigned",
            Verdict::Valid => "Valid",
            Verdict::Invalid => "Invalid",
            Verdict::KeyNotFound => "KeyNotFound",
            Verdict::KeyNotCertified => "KeyNotCertified",
        };
        f.write_str(name)
    }
}

/// A verdict plus the keys that produced it.
///
/// `signer_key` is set for `Valid` and `KeyNotCertified`; `certifier_key`
/// only for `Valid`.
#[derive(Debug, Clone, PartialEq)]
pub struct Verification {
    /// The verdict
    pub verdict: Verdict,
    /// Key whose signature verified
    pub signer_key: Option<PublicKey>,
    /// Trusted root whose certification covered the contact
    pub certifier_key: Option<PublicKey>,
}

impl Verification {
    /// A verdict with no keys attached.
    pub fn bare(verdict: Verdict) -> Self {
        Self {
            verdict,
            signer_key: None,
            certifier_key: None,
        }
    }

    /// A `Valid` verification.
    pub fn valid(signer: PublicKey, certifier: PublicKey) -> Self {
        Self {
            verdict: Verdict::Valid,
            signer_key: Some(signer),
            certifier_key: Some(certifier),
        }
    }

    /// A `KeyNotCertified` verification.
    pub fn not_certified(signer: PublicKey) -> Self {
        Self {
            verdict: Verdict::KeyNotCertified,
            signer_key: Some(signer),
            certifier_key: None,
        }
    }
}

/// A card together with the result of its latest verification.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedCard {
    /// The card as verified
    pub card: Card,
    /// Result of verifying it
    pub verification: Verification,
}

impl VerifiedCard {
    /// Shorthand for `self.verification.verdict`.
    pub fn verdict(&self) -> Verdict {
        self.verification.verdict
    }
}
