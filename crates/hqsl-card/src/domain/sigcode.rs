//! # Signature Text Encoding
//!
//! Raw detached-signature bytes travel inside card text as a base-36 number
//! over the alphabet `0-9A-Z`, which survives URL fragments and QR codes
//! unchanged. Each leading zero byte is written as one leading `0`.

use super::errors::CardError;

/// The signature alphabet, in digit order.
pub const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

const BASE: u32 = 36;

/// True if every character of `s` belongs to the signature alphabet.
pub fn is_alphabet(s: &str) -> bool {
    s.bytes().all(|b| digit_value(b).is_some())
}

fn digit_value(b: u8) -> Option<u32> {
    match b {
        b'0'..=b'9' => Some(u32::from(b - b'0')),
        b'A'..=b'Z' => Some(u32::from(b - b'A') + 10),
        _ => None,
    }
}

/// Encode raw bytes as signature text.
pub fn encode(bytes: &[u8]) -> String {
    let zeroes = bytes.iter().take_while(|&&b| b == 0).count();

    // Little-endian base-36 digits of the big-endian number in `bytes`.
    let mut digits: Vec<u8> = Vec::with_capacity(bytes.len() * 8 / 5 + 1);
    for &byte in &bytes[zeroes..] {
        let mut carry = u32::from(byte);
        for digit in digits.iter_mut() {
            carry += u32::from(*digit) << 8;
            *digit = (carry % BASE) as u8;
            carry /= BASE;
        }
        while carry > 0 {
            digits.push((carry % BASE) as u8);
            carry /= BASE;
        }
    }

    let mut out = String::with_capacity(zeroes + digits.len());
    out.extend(std::iter::repeat(ALPHABET[0] as char).take(zeroes));
    out.extend(digits.iter().rev().map(|&d| ALPHABET[d as usize] as char));
    out
}

/// Decode signature text back into raw bytes.
///
/// # Errors
/// * `CardError::MalformedSignature` - a character outside the alphabet
pub fn decode(text: &str) -> Result<Vec<u8>, CardError> {
    let raw = text.as_bytes();
    let zeroes = raw.iter().take_while(|&&b| b == ALPHABET[0]).count();

    // Little-endian base-256 digits.
    let mut bytes: Vec<u8> = Vec::with_capacity(raw.len() * 5 / 8 + 1);
    for &ch in &raw[zeroes..] {
        let mut carry = digit_value(ch).ok_or(CardError::MalformedSignature)?;
        for byte in bytes.iter_mut() {
            carry += u32::from(*byte) * BASE;
            *byte = (carry & 0xff) as u8;
            carry >>= 8;
        }
        while carry > 0 {
            bytes.push((carry & 0xff) as u8);
            carry >>= 8;
        }
    }

    let mut out = vec![0u8; zeroes];
    out.extend(bytes.iter().rev());
    Ok(out)
}
