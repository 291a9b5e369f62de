//! # ADI Text Format
//!
//! Reader and writer for the tagged ADIF text format (`.adi`):
//!
//! ```text
//! free-form header text
//! <adif_ver:5>3.1.4
//! <eoh>
//!
//! <CALL:5>AC1PZ
//! ...
//! <eor>
//! ```
//!
//! Field lengths count characters. Text before the first tag and between
//! fields is ignored.

use tracing::debug;

use crate::domain::{AdifError, AdifRecord, Card, CardError};

/// ADIF version written into generated headers.
pub const ADIF_VERSION: &str = "3.1.4";

/// Header text of documents produced by [`Card::to_adif`].
pub const HQSL_ADIF_HEADER: &str = "Cryptographically signed QSO delivered in HQSL format";

fn write_field(out: &mut String, name: &str, value: &str) {
    out.push_str(&format!("<{name}:{}>{value}\n", value.chars().count()));
}

/// Write an ADI document with one header and the given records.
pub fn format_adi(header_text: &str, records: &[AdifRecord]) -> String {
    let mut out = String::new();
    out.push_str(header_text);
    out.push('\n');
    write_field(&mut out, "adif_ver", ADIF_VERSION);
    out.push_str("<eoh>\n");

    for record in records {
        out.push('\n');
        for (name, value) in record.fields() {
            write_field(&mut out, name, value);
        }
        out.push_str("<eor>\n");
    }
    out
}

/// Read every complete record from an ADI document.
///
/// Fields seen before `<eoh>` belong to the header and are discarded.
/// Fields after the last `<eor>` are discarded as well.
///
/// # Errors
/// * `AdifError::UnterminatedTag` - `<` without a closing `>`
/// * `AdifError::MalformedSpecifier` - a tag that is neither a marker nor `name:length[:type]`
/// * `AdifError::Truncated` - a value shorter than its declared length
pub fn parse_adi(text: &str) -> Result<Vec<AdifRecord>, AdifError> {
    let mut records = Vec::new();
    let mut current = AdifRecord::new();
    let mut rest = text;
    let mut offset = 0;

    while let Some(open) = rest.find('<') {
        let tag_start = offset + open;
        let after_open = &rest[open + 1..];
        let close = after_open
            .find('>')
            .ok_or(AdifError::UnterminatedTag(tag_start))?;
        let tag = &after_open[..close];
        let body = &after_open[close + 1..];
        let consumed = open + 1 + close + 1;

        if tag.eq_ignore_ascii_case("eoh") {
            current = AdifRecord::new();
            rest = body;
            offset += consumed;
            continue;
        }
        if tag.eq_ignore_ascii_case("eor") {
            records.push(std::mem::take(&mut current));
            rest = body;
            offset += consumed;
            continue;
        }

        let mut parts = tag.split(':');
        let name = parts.next().unwrap_or_default();
        let declared = parts
            .next()
            .and_then(|len| len.trim().parse::<usize>().ok())
            .filter(|_| !name.is_empty())
            .ok_or_else(|| AdifError::MalformedSpecifier(tag.to_string()))?;

        let value_end = match body.char_indices().nth(declared) {
            Some((idx, _)) => idx,
            None => {
                let available = body.chars().count();
                if available < declared {
                    return Err(AdifError::Truncated {
                        name: name.to_string(),
                        declared,
                        available,
                    });
                }
                body.len()
            }
        };
        current.push(name, &body[..value_end]);

        rest = &body[value_end..];
        offset += consumed + value_end;
    }

    debug!(records = records.len(), "[hqsl] parsed ADI document");
    Ok(records)
}

impl Card {
    /// A complete single-record ADI document for this card.
    ///
    /// # Errors
    /// Anything [`Card::to_table`] rejects.
    pub fn to_adif(&self) -> Result<String, CardError> {
        Ok(format_adi(HQSL_ADIF_HEADER, &[self.to_table()?]))
    }

    /// Cards for every record of an ADI document.
    ///
    /// `default_call` and `default_grid` stand in for the logging station
    /// when a record does not name it. Every record yields a card, signable
    /// or not.
    ///
    /// # Errors
    /// * `AdifError` - the document is malformed
    pub fn from_adif(
        text: &str,
        default_call: &str,
        default_grid: &str,
    ) -> Result<Vec<Card>, AdifError> {
        Ok(parse_adi(text)?
            .iter()
            .map(|record| Card::from_table(record, default_call, default_grid))
            .collect())
    }
}
