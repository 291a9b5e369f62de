//! # Certification Ranges
//!
//! A signer key is authorized by a trusted root through a third-party
//! certification on one of its user IDs:
//!
//! ```text
//! user ID:   "Amateur Radio Callsign: AC1PZ"
//! notation:  qsl@hqsl.net = "AC1PZ,202309181900,203009181900[,start,end...]"
//! ```
//!
//! Each start/end pair becomes one [`CertificationRange`]. Per root and user
//! ID only the latest valid, non-revoked certification counts.

use std::time::SystemTime;

use chrono::{DateTime, Utc};
use hqsl_card::from_ham_date;
use sequoia_openpgp as openpgp;
use tracing::debug;

use openpgp::cert::prelude::*;
use openpgp::packet::key::{PrimaryRole, PublicParts};
use openpgp::packet::{Key, Signature};
use openpgp::types::RevocationStatus;
use openpgp::KeyHandle;

use super::keys::{PublicKey, POLICY};

/// User ID prefix that marks a callsign identity.
pub const CALLSIGN_USERID_PREFIX: &str = "Amateur Radio Callsign: ";

/// Notation name carrying certified time windows.
pub const NOTATION_NAME: &str = "qsl@hqsl.net";

/// A window during which a root vouches that a signer key speaks for `call`.
#[derive(Debug, Clone, PartialEq)]
pub struct CertificationRange {
    /// Callsign, with no prefixes or suffixes
    pub call: String,
    /// Window start, exclusive
    pub start: DateTime<Utc>,
    /// Window end, exclusive
    pub end: DateTime<Utc>,
    /// The trusted root that issued the certification
    pub certifier: PublicKey,
}

impl CertificationRange {
    /// True if `when` falls strictly inside the window.
    pub fn covers(&self, when: DateTime<Utc>) -> bool {
        self.start < when && when < self.end
    }
}

/// Callsign token of a callsign user ID, if `userid` is one.
pub fn callsign_from_userid(userid: &[u8]) -> Option<String> {
    let text = std::str::from_utf8(userid).ok()?;
    let (_, rest) = text.split_once(CALLSIGN_USERID_PREFIX)?;
    let call: String = rest
        .chars()
        .take_while(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
        .collect();
    (!call.is_empty()).then_some(call)
}

/// Time windows of a notation value certifying `call`.
///
/// The value is `call,start,end[,start,end...]`. A value for another call or
/// with an unpaired date yields nothing. Individual pairs that fail to parse
/// or do not have `end` after `start` are dropped.
pub fn parse_notation(call: &str, value: &str) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    let tokens: Vec<&str> = value.split(',').collect();
    let Some((first, dates)) = tokens.split_first() else {
        return Vec::new();
    };
    if *first != call || dates.len() % 2 != 0 {
        return Vec::new();
    }

    dates
        .chunks(2)
        .filter_map(|pair| {
            let start = from_ham_date(pair[0]).ok()?;
            let end = from_ham_date(pair[1]).ok()?;
            (end > start).then_some((start, end))
        })
        .collect()
}

/// Every certification range of `key` issued by any of `trusted`.
///
/// A key that is revoked, expired or otherwise invalid today has no ranges.
/// Ranges are not deduplicated across roots.
pub fn certification_ranges(key: &PublicKey, trusted: &[PublicKey]) -> Vec<CertificationRange> {
    let cert = key.cert();
    if !primary_key_is_sound(cert) {
        debug!(key = %key.fingerprint(), "[hqsl] key failed integrity check, no certifications");
        return Vec::new();
    }

    let signer_primary = cert.primary_key();
    let signer = signer_primary.key();
    let mut ranges = Vec::new();

    for ua in cert.userids() {
        let Some(call) = callsign_from_userid(ua.userid().value()) else {
            continue;
        };
        if !is_self_signed(&ua) {
            debug!(key = %key.fingerprint(), call = %call, "[hqsl] skipping user ID without valid self-signature");
            continue;
        }

        for root in trusted {
            let Some(certification) = latest_certification(&ua, signer, root) else {
                continue;
            };

            let notations: Vec<_> = certification
                .notation_data()
                .filter(|n| n.name() == NOTATION_NAME)
                .collect();
            let [notation] = notations.as_slice() else {
                debug!(
                    key = %key.fingerprint(),
                    root = %root.fingerprint(),
                    count = notations.len(),
                    "[hqsl] certification needs exactly one {} notation",
                    NOTATION_NAME
                );
                continue;
            };
            let Ok(value) = std::str::from_utf8(notation.value()) else {
                continue;
            };

            ranges.extend(
                parse_notation(&call, value)
                    .into_iter()
                    .map(|(start, end)| CertificationRange {
                        call: call.clone(),
                        start,
                        end,
                        certifier: root.clone(),
                    }),
            );
        }
    }

    ranges
}

fn primary_key_is_sound(cert: &Cert) -> bool {
    match cert.with_policy(&POLICY, None) {
        Ok(valid) => valid.alive().is_ok() && !self_revoked(valid.revocation_status()),
        Err(_) => false,
    }
}

/// Third-party revocations (`CouldBe`) are judged per root in [`is_revoked`].
fn self_revoked(status: RevocationStatus<'_>) -> bool {
    matches!(status, RevocationStatus::Revoked(_))
}

fn is_self_signed(ua: &UserIDAmalgamation<'_>) -> bool {
    match ua.clone().with_policy(&POLICY, None) {
        Ok(valid) => !self_revoked(valid.revocation_status()),
        Err(_) => false,
    }
}

fn issued_by(sig: &Signature, root: &KeyHandle) -> bool {
    sig.get_issuers().iter().any(|issuer| issuer.aliases(root))
}

/// Latest certification of `ua` by `root` that verifies and is not revoked.
fn latest_certification(
    ua: &UserIDAmalgamation<'_>,
    signer: &Key<PublicParts, PrimaryRole>,
    root: &PublicKey,
) -> Option<Signature> {
    let root_handle = root.cert().key_handle();
    let root_ka = root.cert().primary_key();
    let root_primary = root_ka.key();
    let userid = ua.userid();

    let mut latest: Option<(SystemTime, Signature)> = None;
    for certification in ua.certifications() {
        if !issued_by(certification, &root_handle) {
            continue;
        }
        let Some(created) = certification.signature_creation_time() else {
            continue;
        };
        if latest.as_ref().is_some_and(|(t, _)| created <= *t) {
            continue;
        }
        if is_revoked(ua, created, signer, &root_handle, root_primary) {
            continue;
        }

        let confirmed = certification
            .verify_userid_binding(root_primary, signer, userid)
            .is_ok()
            && certification
                .signature_alive(SystemTime::now(), std::time::Duration::ZERO)
                .is_ok();
        if confirmed {
            latest = Some((created, certification.clone()));
        }
    }
    latest.map(|(_, sig)| sig)
}

/// True if `root` revoked its certifications of `ua` at or after `created`.
fn is_revoked(
    ua: &UserIDAmalgamation<'_>,
    created: SystemTime,
    signer: &Key<PublicParts, PrimaryRole>,
    root_handle: &KeyHandle,
    root_primary: &Key<PublicParts, PrimaryRole>,
) -> bool {
    ua.other_revocations().into_iter().any(|revocation| {
        issued_by(revocation, root_handle)
            && revocation
                .signature_creation_time()
                .is_some_and(|t| t >= created)
            && revocation
                .verify_userid_revocation(root_primary, signer, ua.userid())
                .is_ok()
    })
}
