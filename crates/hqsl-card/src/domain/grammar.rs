//! # Field Grammars
//!
//! Character-level rules for card text. Card text must survive being the
//! fragment of a URL, so only unreserved and sub-delimiter characters are
//! allowed, and the comma is reserved as the field separator.

/// Field separator in card text.
pub const FIELD_SEPARATOR: char = ',';

/// Characters allowed inside a single card field, besides ASCII alphanumerics.
const FIELD_PUNCTUATION: &[u8] = b"?:@._~!$&'()*+;=-/";

/// True for characters allowed inside one field (no comma, no whitespace).
pub fn is_field_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || (c.is_ascii() && FIELD_PUNCTUATION.contains(&(c as u8)))
}

/// True if `s` is non-empty and every character is a field character.
pub fn is_field_text(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_field_char)
}

/// True if `s` is non-empty card text: field characters and separators.
pub fn is_card_text(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c == FIELD_SEPARATOR || is_field_char(c))
}

/// Callsigns: upper-case letters, digits, `/` and `-`.
///
/// Portable prefixes and suffixes (`EA8/AC1PZ/P`) and SWL identifiers
/// (`R62-SWL`) are both valid.
pub fn is_callsign(s: &str) -> bool {
    !s.is_empty()
        && s
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'/' || b == b'-')
}

/// Minimum and maximum Maidenhead locator lengths.
pub const GRID_MIN_LEN: usize = 4;
/// See [`GRID_MIN_LEN`].
pub const GRID_MAX_LEN: usize = 12;

/// Maidenhead locators: a field pair `A-R`, a square pair of digits, then any
/// number of letter pairs `A-X`, digit pairs, and letter pairs, in that order.
/// Case-insensitive, even length, 4 to 12 characters.
pub fn is_grid(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() < GRID_MIN_LEN || bytes.len() > GRID_MAX_LEN || bytes.len() % 2 != 0 {
        return false;
    }

    let field = |b: u8| matches!(b.to_ascii_uppercase(), b'A'..=b'R');
    let letter = |b: u8| matches!(b.to_ascii_uppercase(), b'A'..=b'X');
    let digit = |b: u8| b.is_ascii_digit();

    if !(field(bytes[0]) && field(bytes[1]) && digit(bytes[2]) && digit(bytes[3])) {
        return false;
    }

    // 0: leading letter pairs, 1: digit pairs, 2: trailing letter pairs.
    let mut phase = 0;
    for pair in bytes[4..].chunks(2) {
        if letter(pair[0]) && letter(pair[1]) {
            if phase == 1 {
                phase = 2;
            }
        } else if digit(pair[0]) && digit(pair[1]) {
            match phase {
                0 | 1 => phase = 1,
                _ => return false,
            }
        } else {
            return false;
        }
    }
    true
}
