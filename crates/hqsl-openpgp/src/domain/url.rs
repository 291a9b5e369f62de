//! # Key Server URLs
//!
//! HKP key servers are often given with the `hkp://` and `hkps://` schemes,
//! which HTTP clients do not speak. They are rewritten to `http://` (port
//! 11371 unless one is given) and `https://`. Every base URL ends in `/` so
//! request paths can be appended directly.

use reqwest::Url;

use super::errors::DirectoryError;

/// Port assumed for `hkp://` URLs without an explicit port.
pub const HKP_DEFAULT_PORT: u16 = 11371;

/// Normalize a key server URL into an HTTP(S) base URL ending in `/`.
///
/// # Errors
/// * `DirectoryError::InvalidUrl` - unparsable, or an HKP URL without a host
pub fn normalize_url(url: &str) -> Result<String, DirectoryError> {
    let invalid = |reason: String| DirectoryError::InvalidUrl {
        url: url.to_string(),
        reason,
    };

    let parsed = Url::parse(url).map_err(|e| invalid(e.to_string()))?;
    let hkp_host = || {
        parsed
            .host_str()
            .ok_or_else(|| invalid("missing host".to_string()))
    };

    let mut base = match parsed.scheme() {
        "hkp" => format!(
            "http://{}:{}{}",
            hkp_host()?,
            parsed.port().unwrap_or(HKP_DEFAULT_PORT),
            parsed.path()
        ),
        "hkps" => match parsed.port() {
            Some(port) => format!("https://{}:{port}{}", hkp_host()?, parsed.path()),
            None => format!("https://{}{}", hkp_host()?, parsed.path()),
        },
        _ => parsed.to_string(),
    };

    if !base.ends_with('/') {
        base.push('/');
    }
    Ok(base)
}
