//! # Domain Layer
//!
//! Card codec rules with no I/O dependencies.

pub mod card;
pub mod date;
pub mod errors;
pub mod frequency;
pub mod grammar;
pub mod sigcode;
pub mod table;

pub use card::{Card, FIELD_COUNT, HEADER_SEPARATOR, UNSIGNED};
pub use errors::{AdifError, CardError, FrequencyError};
pub use table::AdifRecord;
