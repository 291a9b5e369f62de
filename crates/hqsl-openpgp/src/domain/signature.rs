//! # Detached Signatures
//!
//! Card signatures are binary OpenPGP detached signatures over the exact
//! bytes of the signable text (signature type `Binary`, no canonicalization).

use std::time::SystemTime;

use sequoia_openpgp as openpgp;

use openpgp::crypto::Password;
use openpgp::packet::signature::SignatureBuilder;
use openpgp::packet::Signature;
use openpgp::parse::Parse;
use openpgp::serialize::SerializeInto;
use openpgp::types::SignatureType;
use openpgp::{KeyID, Packet, PacketPile};
use tracing::debug;

use super::errors::{OpenPgpError, SigningError};
use super::keys::{PrivateKey, PublicKey, POLICY};

/// A parsed detached signature.
#[derive(Debug, Clone)]
pub struct DetachedSignature {
    packets: Vec<Signature>,
}

impl DetachedSignature {
    /// Parse raw signature bytes.
    ///
    /// # Errors
    /// * `OpenPgpError::Backend` - not a sequence of signature packets
    pub fn parse(bytes: &[u8]) -> Result<Self, OpenPgpError> {
        let pile = PacketPile::from_bytes(bytes)?;
        let mut packets = Vec::new();
        for packet in pile.into_children() {
            match packet {
                Packet::Signature(sig) => packets.push(sig),
                other => {
                    return Err(OpenPgpError::Backend(format!(
                        "unexpected {} packet in detached signature",
                        other.tag()
                    )))
                }
            }
        }
        if packets.is_empty() {
            return Err(OpenPgpError::Backend("no signature packet".into()));
        }
        Ok(Self { packets })
    }

    /// Issuer key IDs, upper-case hex, in packet order.
    ///
    /// Issuer and issuer-fingerprint subpackets of one packet count once;
    /// two packets by the same key count twice.
    pub fn issuer_key_ids(&self) -> Vec<String> {
        let mut ids = Vec::new();
        for sig in &self.packets {
            let mut packet_ids: Vec<String> = Vec::new();
            for issuer in sig.get_issuers() {
                let id = KeyID::from(issuer).to_hex();
                if !packet_ids.contains(&id) {
                    packet_ids.push(id);
                }
            }
            ids.extend(packet_ids);
        }
        ids
    }

    /// True if `key` has a signing-capable key that produced this signature
    /// over `message`.
    ///
    /// Only the first signature packet is checked. Key validity is judged at
    /// the signature's creation time.
    pub fn verify(&self, message: &[u8], key: &PublicKey) -> bool {
        let Some(sig) = self.packets.first() else {
            return false;
        };
        let valid = match key.cert().with_policy(&POLICY, sig.signature_creation_time()) {
            Ok(valid) => valid,
            Err(e) => {
                debug!(key = %key.fingerprint(), error = %e, "[hqsl] key not valid at signing time");
                return false;
            }
        };

        for issuer in sig.get_issuers() {
            for ka in valid.keys().for_signing().key_handle(issuer) {
                if sig.verify_message(ka.key(), message).is_ok() {
                    return true;
                }
            }
        }
        false
    }
}

/// Produce a binary detached signature over `message`.
///
/// The key is unlocked with `passphrase` (empty if absent) only if its
/// secret material is encrypted.
///
/// # Errors
/// * `SigningError::NoSigningKey` - no valid signing-capable secret key at `at`
/// * `SigningError::Decrypt` - wrong passphrase
/// * `SigningError::Crypto` - signature creation or serialization failed
pub fn sign_detached(
    message: &[u8],
    key: &PrivateKey,
    passphrase: Option<&str>,
    at: SystemTime,
) -> Result<Vec<u8>, SigningError> {
    let crypto = |e: anyhow::Error| SigningError::Crypto(e.to_string());

    let ka = key
        .cert()
        .keys()
        .with_policy(&POLICY, at)
        .secret()
        .for_signing()
        .alive()
        .revoked(false)
        .next()
        .ok_or(SigningError::NoSigningKey)?;

    let mut secret = ka.key().clone();
    if secret.secret().is_encrypted() {
        let password = Password::from(passphrase.unwrap_or_default());
        secret = secret
            .decrypt_secret(&password)
            .map_err(|e| SigningError::Decrypt(e.to_string()))?;
    }

    let mut keypair = secret.into_keypair().map_err(crypto)?;
    let sig = SignatureBuilder::new(SignatureType::Binary)
        .set_signature_creation_time(at)
        .map_err(crypto)?
        .sign_message(&mut keypair, message)
        .map_err(crypto)?;

    Packet::from(sig).to_vec().map_err(crypto)
}
