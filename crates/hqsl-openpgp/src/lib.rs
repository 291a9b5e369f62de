//! # HQSL OpenPGP
//!
//! Signs HQSL cards and verifies them against a set of trusted root keys.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): keys, detached signatures, certification
//!   ranges, verdicts. No network I/O.
//! - **Ports Layer** (`ports/`): the public API and the HKP transport / key
//!   lookup it depends on, with mock implementations
//! - **Adapters Layer** (`adapters/`): `reqwest` transport
//! - **Service Layer** (`service/`): key directory client, verification
//!   engine, and [`HqslOpenPgp`] wiring them together
//!
//! ## Trust Model
//!
//! A card is `Valid` when its detached signature verifies with a key fetched
//! from a key server, and a trusted root has certified that key's
//! `Amateur Radio Callsign: <CALL>` user ID with a `qsl@hqsl.net` notation
//! whose time window strictly contains the contact time.
//!
//! ## Example
//!
//! ```no_run
//! use hqsl_card::Card;
//! use hqsl_openpgp::{HqslOpenPgp, QslVerificationApi};
//!
//! # async fn run(root: String, card_text: &str) -> Result<(), Box<dyn std::error::Error>> {
//! let hqsl = HqslOpenPgp::setup([root], &["https://hqsl.net"], None)?;
//! let card: Card = card_text.parse()?;
//! let verification = hqsl.verify(&card).await;
//! println!("{}", verification.verdict.description());
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

#[cfg(test)]
mod test_helpers;

// Re-export public API
pub use adapters::ReqwestTransport;
pub use config::{ConfigError, HqslConfig, DEFAULT_KEY_SERVER, DEFAULT_TIMEOUT_MS};
pub use domain::certification::{callsign_from_userid, CALLSIGN_USERID_PREFIX};
pub use domain::url::{normalize_url, HKP_DEFAULT_PORT};
pub use domain::{
    certification_ranges, parse_keys, sign_detached, CertificationRange, DetachedSignature,
    DirectoryError, KeySource, OpenPgpError, PrivateKey, PublicKey, PublishError, SigningError,
    Verdict, VerifiedCard, Verification, NOTATION_NAME,
};
pub use ports::inbound::QslVerificationApi;
pub use ports::outbound::{
    HkpTransport, HttpResponse, KeyLookup, MockRequest, MockTransport, StaticKeyLookup,
    TransportError,
};
pub use service::engine::{sign, verify};
pub use service::{HqslOpenPgp, KeyDirectoryClient, PUBLIC_KEY_BLOCK_END};
