//! # Adapters
//!
//! Text formats layered over the domain types.

pub mod adi;
