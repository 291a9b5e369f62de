//! # Domain Layer
//!
//! OpenPGP primitives and the certification rules of the protocol.
//! No network I/O.

pub mod certification;
pub mod errors;
pub mod keys;
pub mod signature;
pub mod url;
pub mod verdict;

pub use certification::{certification_ranges, CertificationRange, NOTATION_NAME};
pub use errors::{DirectoryError, OpenPgpError, PublishError, SigningError};
pub use keys::{parse_keys, KeySource, PrivateKey, PublicKey};
pub use signature::{sign_detached, DetachedSignature};
pub use verdict::{Verdict, VerifiedCard, Verification};
