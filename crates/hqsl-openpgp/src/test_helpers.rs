//! Key fixtures shared by unit tests.
//!
//! Keys are created 2024-02-08 10:00 UTC without expiry; cards are signed at
//! 10:01 for a contact at 10:23.

use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use hqsl_card::Card;
use sequoia_openpgp as openpgp;

use openpgp::cert::prelude::*;
use openpgp::cert::UserIDRevocationBuilder;
use openpgp::packet::signature::SignatureBuilder;
use openpgp::packet::UserID;
use openpgp::types::{ReasonForRevocation, SignatureType};
use openpgp::Packet;

use crate::domain::{DirectoryError, PrivateKey, PublicKey, NOTATION_NAME};
use crate::ports::outbound::{KeyLookup, StaticKeyLookup};
use crate::service::engine;

pub const KEY_CREATED: u64 = 1_707_386_400;
pub const WINDOW: &str = "AC1PZ,202309181900,203009181900";

pub fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

pub fn key_created() -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(KEY_CREATED)
}

pub fn signing_time() -> DateTime<Utc> {
    utc(2024, 2, 8, 10, 1)
}

pub fn sample_card() -> Card {
    Card::new("AC1PZ", "FN42gv", "EA2ESK", utc(2024, 2, 8, 10, 23), 28.074, "FT8")
        .with_signal("-10")
}

pub fn generate_root() -> Cert {
    let (cert, _) = CertBuilder::new()
        .add_userid("HQSL Test Root <root@example.org>")
        .set_creation_time(key_created())
        .set_validity_period(None)
        .generate()
        .unwrap();
    cert
}

pub fn generate_signer(call: &str) -> Cert {
    let (cert, _) = CertBuilder::new()
        .add_userid(format!("Amateur Radio Callsign: {call}"))
        .add_signing_subkey()
        .set_creation_time(key_created())
        .set_validity_period(None)
        .generate()
        .unwrap();
    cert
}

/// `root` certifies the callsign user ID of `signer` at `at`.
pub fn certify(root: &Cert, signer: Cert, call: &str, notation: Option<&str>, at: SystemTime) -> Cert {
    certify_with_notations(root, signer, call, notation.as_slice(), at)
}

/// Like [`certify`], with one `qsl@hqsl.net` notation per entry of `notations`.
pub fn certify_with_notations(
    root: &Cert,
    signer: Cert,
    call: &str,
    notations: &[&str],
    at: SystemTime,
) -> Cert {
    let mut root_keypair = root
        .primary_key()
        .key()
        .clone()
        .parts_into_secret()
        .unwrap()
        .into_keypair()
        .unwrap();
    let userid = UserID::from(format!("Amateur Radio Callsign: {call}"));

    let mut builder = SignatureBuilder::new(SignatureType::GenericCertification)
        .set_signature_creation_time(at)
        .unwrap();
    for value in notations {
        builder = builder
            .add_notation(NOTATION_NAME, value.as_bytes(), None, false)
            .unwrap();
    }
    let primary = signer.primary_key();
    let certification = builder
        .sign_userid_binding(&mut root_keypair, primary.key(), &userid)
        .unwrap();
    signer
        .clone()
        .insert_packets(vec![Packet::from(userid), certification.into()])
        .unwrap()
}

/// `root` revokes its certifications of the callsign user ID at `at`.
pub fn revoke_certification(root: &Cert, signer: Cert, call: &str, at: SystemTime) -> Cert {
    let mut root_keypair = root
        .primary_key()
        .key()
        .clone()
        .parts_into_secret()
        .unwrap()
        .into_keypair()
        .unwrap();
    let userid = UserID::from(format!("Amateur Radio Callsign: {call}"));
    let revocation = UserIDRevocationBuilder::new()
        .set_reason_for_revocation(ReasonForRevocation::UIDRetired, b"")
        .unwrap()
        .set_signature_creation_time(at)
        .unwrap()
        .build(&mut root_keypair, &signer, &userid, None)
        .unwrap();
    signer
        .insert_packets(vec![Packet::from(userid), revocation.into()])
        .unwrap()
}

pub struct Fixture {
    pub root: Cert,
    pub signer: PrivateKey,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_notation(Some(WINDOW))
    }

    pub fn with_notation(notation: Option<&str>) -> Self {
        Self::with_notations(notation.as_slice())
    }

    pub fn with_notations(notations: &[&str]) -> Self {
        let root = generate_root();
        let signer = certify_with_notations(
            &root,
            generate_signer("AC1PZ"),
            "AC1PZ",
            notations,
            key_created() + Duration::from_secs(30),
        );
        Self {
            root,
            signer: PrivateKey::from_cert(signer).unwrap(),
        }
    }

    pub fn root_public(&self) -> PublicKey {
        PublicKey::from_cert(self.root.clone())
    }

    pub fn signer_public(&self) -> PublicKey {
        self.signer.public_key()
    }

    pub fn trusted(&self) -> Vec<PublicKey> {
        vec![self.root_public()]
    }

    pub fn lookup(&self) -> StaticKeyLookup {
        StaticKeyLookup::serving([self.signer_public()])
    }

    pub fn signed_card(&self, card: Card) -> Card {
        engine::sign(card, &self.signer, None, Some(signing_time())).unwrap()
    }
}

/// Serves every key for one key ID, the way a directory answers a collision.
pub struct CollidingLookup {
    pub keys: Vec<PublicKey>,
    pub key_id: String,
}

#[async_trait]
impl KeyLookup for CollidingLookup {
    async fn lookup(&self, query: &str) -> Result<Vec<PublicKey>, DirectoryError> {
        if query.eq_ignore_ascii_case(&format!("0x{}", self.key_id)) {
            Ok(self.keys.clone())
        } else {
            Err(DirectoryError::NotFound)
        }
    }
}
