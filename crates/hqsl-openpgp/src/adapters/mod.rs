//! # Adapters
//!
//! Concrete implementations of outbound ports.

pub mod http;

pub use http::ReqwestTransport;
