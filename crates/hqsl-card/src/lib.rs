//! # HQSL Card Codec
//!
//! The portable, signable text record of an amateur-radio contact
//! confirmation, and its mapping to ADIF logs.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): card text grammar, frequency/band mapping,
//!   date-time codec, signature alphabet, ADIF table mapping
//! - **Adapters Layer** (`adapters/`): the `.adi` text format
//!
//! Nothing here touches the network or cryptography. Signing and
//! verification live in `hqsl-openpgp`, which signs the bytes returned by
//! [`Card::signable_text`] and stores the result in [`Card::signature`].
//!
//! ## Example
//!
//! ```
//! use hqsl_card::Card;
//!
//! let card: Card = "AC1PZ,FN42gv,EA2ESK,202309241038,-06,28.075,FT8,,,UNSIGNED"
//!     .parse()
//!     .unwrap();
//! assert_eq!(card.band(), "10m");
//! assert_eq!(
//!     card.signable_text().unwrap(),
//!     "AC1PZ,FN42gv,EA2ESK,202309241038,-06,28.075,FT8,,"
//! );
//! ```

pub mod adapters;
pub mod domain;

// Re-export public API
pub use adapters::adi::{format_adi, parse_adi, ADIF_VERSION, HQSL_ADIF_HEADER};
pub use domain::card::{Card, UNSIGNED};
pub use domain::date::{adif_date, adif_time, display_ham_date, from_ham_date, to_ham_date};
pub use domain::errors::{AdifError, CardError, FrequencyError};
pub use domain::frequency::{band_freq, freq_band, normalize_freq, UNKNOWN_BAND};
pub use domain::table::AdifRecord;
