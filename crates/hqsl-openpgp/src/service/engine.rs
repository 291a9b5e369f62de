//! # Verification Engine
//!
//! Decides the verdict for one card, in this order:
//!
//! 1. no `from` or `when` → `Invalid`
//! 2. no signature → `NotSigned`
//! 3. unparsable signature, card not signable, or not exactly one issuer
//!    across all signature packets → `Invalid`
//! 4. issuer key not obtainable → `KeyNotFound`
//! 5. first candidate key that verifies the signature is the signer;
//!    none verifies → `Invalid`
//! 6. a certification range of the signer matches one `/`-separated token of
//!    `from` and strictly contains `when` → `Valid`, otherwise `KeyNotCertified`
//!
//! Several keys may share a key ID, so every candidate is tried.

use std::time::SystemTime;

use chrono::{DateTime, Utc};
use hqsl_card::Card;
use tracing::debug;

use crate::domain::{
    certification_ranges, sign_detached, DetachedSignature, PrivateKey, PublicKey,
    SigningError, Verdict, Verification,
};
use crate::ports::outbound::KeyLookup;

/// Verify `card` against keys from `lookup` and the `trusted` roots.
///
/// Pure with respect to the card: the result is returned, never stored.
pub async fn verify<L>(card: &Card, lookup: &L, trusted: &[PublicKey]) -> Verification
where
    L: KeyLookup + ?Sized,
{
    let verification = run(card, lookup, trusted).await;
    debug!(
        from = card.from.as_deref().unwrap_or_default(),
        verdict = %verification.verdict,
        "[hqsl] card verified"
    );
    verification
}

async fn run<L>(card: &Card, lookup: &L, trusted: &[PublicKey]) -> Verification
where
    L: KeyLookup + ?Sized,
{
    let (Some(from), Some(when)) = (card.from.as_deref().filter(|f| !f.is_empty()), card.when)
    else {
        return Verification::bare(Verdict::Invalid);
    };

    let Some(bytes) = card.signature.as_deref() else {
        return Verification::bare(Verdict::NotSigned);
    };

    let signature = match DetachedSignature::parse(bytes) {
        Ok(signature) => signature,
        Err(e) => {
            debug!(error = %e, "[hqsl] unparsable signature");
            return Verification::bare(Verdict::Invalid);
        }
    };

    let Ok(message) = card.signable_text() else {
        return Verification::bare(Verdict::Invalid);
    };

    let issuers = signature.issuer_key_ids();
    let [key_id] = issuers.as_slice() else {
        debug!(issuers = issuers.len(), "[hqsl] signature must name exactly one issuer");
        return Verification::bare(Verdict::Invalid);
    };

    let candidates = match lookup.lookup(&format!("0x{key_id}")).await {
        Ok(keys) => keys,
        Err(e) => {
            debug!(key_id = %key_id, error = %e, "[hqsl] signer key unavailable");
            return Verification::bare(Verdict::KeyNotFound);
        }
    };

    let Some(signer) = candidates
        .into_iter()
        .find(|key| signature.verify(message.as_bytes(), key))
    else {
        return Verification::bare(Verdict::Invalid);
    };

    let tokens: Vec<&str> = from.split('/').collect();
    let covering = certification_ranges(&signer, trusted)
        .into_iter()
        .find(|range| tokens.contains(&range.call.as_str()) && range.covers(when));

    match covering {
        Some(range) => Verification::valid(signer, range.certifier),
        None => Verification::not_certified(signer),
    }
}

/// Sign `card` with `key` at `at` (default: now), replacing any signature.
///
/// # Errors
/// * `SigningError::Card` - the card is not signable
/// * anything [`sign_detached`] rejects
pub fn sign(
    mut card: Card,
    key: &PrivateKey,
    passphrase: Option<&str>,
    at: Option<DateTime<Utc>>,
) -> Result<Card, SigningError> {
    let message = card.signable_text()?;
    let at = SystemTime::from(at.unwrap_or_else(Utc::now));
    card.signature = Some(sign_detached(message.as_bytes(), key, passphrase, at)?);
    Ok(card)
}
