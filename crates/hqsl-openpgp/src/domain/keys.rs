//! # OpenPGP Keys
//!
//! Thin wrappers over `sequoia_openpgp::Cert` that keep public and private
//! material apart, plus the parsing entry points used for trusted roots,
//! directory responses and signing keys.

use std::fmt;

use sequoia_openpgp as openpgp;

use openpgp::cert::prelude::*;
use openpgp::parse::Parse;
use openpgp::policy::StandardPolicy;
use openpgp::serialize::SerializeInto;

use super::errors::OpenPgpError;

/// Policy used for every validity decision.
pub(crate) static POLICY: StandardPolicy<'static> = StandardPolicy::new();

/// Parse every certificate in `data`, armored or binary.
///
/// Secret key material, if any, is stripped.
///
/// # Errors
/// * `OpenPgpError::Backend` - the data is not an OpenPGP keyring
/// * `OpenPgpError::NoKeys` - the data parsed but held no certificates
pub fn parse_keys(data: &[u8]) -> Result<Vec<PublicKey>, OpenPgpError> {
    let certs = CertParser::from_bytes(data)?.collect::<openpgp::Result<Vec<Cert>>>()?;
    if certs.is_empty() {
        return Err(OpenPgpError::NoKeys);
    }
    Ok(certs.into_iter().map(PublicKey::from_cert).collect())
}

/// A public OpenPGP certificate.
#[derive(Clone, PartialEq)]
pub struct PublicKey {
    cert: Cert,
}

impl PublicKey {
    /// Wrap a certificate, dropping any secret key material.
    pub fn from_cert(cert: Cert) -> Self {
        Self {
            cert: cert.strip_secret_key_material(),
        }
    }

    /// Parse exactly one certificate.
    ///
    /// # Errors
    /// * `OpenPgpError::NoKeys` - no certificate in `data`
    /// * `OpenPgpError::Backend` - malformed data or more than one certificate
    pub fn parse(data: &[u8]) -> Result<Self, OpenPgpError> {
        let mut keys = parse_keys(data)?;
        match keys.len() {
            1 => keys.pop().ok_or(OpenPgpError::NoKeys),
            n => Err(OpenPgpError::Backend(format!(
                "expected one certificate, found {n}"
            ))),
        }
    }

    /// The underlying certificate.
    pub fn cert(&self) -> &Cert {
        &self.cert
    }

    /// Upper-case hex fingerprint of the primary key.
    pub fn fingerprint(&self) -> String {
        self.cert.fingerprint().to_hex()
    }

    /// Upper-case hex key ID of the primary key.
    pub fn key_id(&self) -> String {
        self.cert.keyid().to_hex()
    }

    /// ASCII-armored transferable public key.
    ///
    /// # Errors
    /// * `OpenPgpError::Backend` - serialization failed
    pub fn armored(&self) -> Result<String, OpenPgpError> {
        let bytes = self.cert.armored().to_vec()?;
        String::from_utf8(bytes).map_err(|e| OpenPgpError::Backend(e.to_string()))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublicKey").field(&self.fingerprint()).finish()
    }
}

impl From<Cert> for PublicKey {
    fn from(cert: Cert) -> Self {
        Self::from_cert(cert)
    }
}

/// A certificate carrying secret key material, used for signing.
#[derive(Clone)]
pub struct PrivateKey {
    cert: Cert,
}

impl PrivateKey {
    /// Wrap a certificate that holds secret key material.
    ///
    /// # Errors
    /// * `OpenPgpError::NotPrivate` - public-only certificate
    pub fn from_cert(cert: Cert) -> Result<Self, OpenPgpError> {
        if !cert.is_tsk() {
            return Err(OpenPgpError::NotPrivate(cert.fingerprint().to_hex()));
        }
        Ok(Self { cert })
    }

    /// Parse the first certificate with secret key material in `data`.
    ///
    /// # Errors
    /// * `OpenPgpError::Backend` - malformed data
    /// * `OpenPgpError::NoKeys` - no certificate with secret key material
    pub fn parse(data: &[u8]) -> Result<Self, OpenPgpError> {
        for cert in CertParser::from_bytes(data)? {
            let cert = cert?;
            if cert.is_tsk() {
                return Ok(Self { cert });
            }
        }
        Err(OpenPgpError::NoKeys)
    }

    /// The underlying certificate, secrets included.
    pub fn cert(&self) -> &Cert {
        &self.cert
    }

    /// The public half.
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_cert(self.cert.clone())
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PrivateKey")
            .field(&self.cert.fingerprint().to_hex())
            .finish()
    }
}

/// A trusted root key in any of the accepted forms.
#[derive(Debug, Clone)]
pub enum KeySource {
    /// ASCII-armored key block; may hold several keys
    Armored(String),
    /// Binary keyring; may hold several keys
    Binary(Vec<u8>),
    /// Already parsed
    Parsed(PublicKey),
}

impl KeySource {
    /// Resolve into parsed keys.
    ///
    /// # Errors
    /// Anything [`parse_keys`] rejects.
    pub fn into_keys(self) -> Result<Vec<PublicKey>, OpenPgpError> {
        match self {
            KeySource::Armored(text) => parse_keys(text.as_bytes()),
            KeySource::Binary(bytes) => parse_keys(&bytes),
            KeySource::Parsed(key) => Ok(vec![key]),
        }
    }
}

impl From<&str> for KeySource {
    fn from(text: &str) -> Self {
        KeySource::Armored(text.to_string())
    }
}

impl From<String> for KeySource {
    fn from(text: String) -> Self {
        KeySource::Armored(text)
    }
}

impl From<Vec<u8>> for KeySource {
    fn from(bytes: Vec<u8>) -> Self {
        KeySource::Binary(bytes)
    }
}

impl From<PublicKey> for KeySource {
    fn from(key: PublicKey) -> Self {
        KeySource::Parsed(key)
    }
}
