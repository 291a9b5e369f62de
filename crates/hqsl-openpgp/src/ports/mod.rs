//! # Ports Layer
//!
//! - **Inbound**: the public API of the HQSL verifier and signer
//! - **Outbound**: the key server transport and key lookup it depends on

pub mod inbound;
pub mod outbound;

pub use inbound::QslVerificationApi;
pub use outbound::{
    HkpTransport, HttpResponse, KeyLookup, MockRequest, MockTransport, StaticKeyLookup,
    TransportError,
};
