//! Subcommand implementations. Each returns the text to print.

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use hqsl_card::{from_ham_date, Card};
use hqsl_openpgp::{
    certification_ranges, parse_keys, sign, HkpTransport, HqslOpenPgp, PrivateKey, PublicKey,
    QslVerificationApi, Verdict, Verification,
};
use serde::Serialize;
use tracing::{info, warn};

/// Card text from an argument; `-` reads standard input.
pub fn read_card(arg: &str) -> Result<Card> {
    let text = if arg == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("reading card from stdin")?;
        text
    } else {
        arg.to_string()
    };
    Ok(Card::parse(text.trim())?)
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("reading {}", path.display()))
}

/// Outcome of `verify`, as printed.
#[derive(Debug, Serialize)]
pub struct VerifyReport {
    pub verdict: Verdict,
    pub description: &'static str,
    pub from: Option<String>,
    pub to: Option<String>,
    pub when: String,
    pub band: &'static str,
    pub signer: Option<String>,
    pub certifier: Option<String>,
}

impl VerifyReport {
    pub fn new(card: &Card, verification: &Verification) -> Self {
        Self {
            verdict: verification.verdict,
            description: verification.verdict.description(),
            from: card.from.clone(),
            to: card.to.clone(),
            when: card.display_date(),
            band: card.band(),
            signer: verification.signer_key.as_ref().map(PublicKey::fingerprint),
            certifier: verification.certifier_key.as_ref().map(PublicKey::fingerprint),
        }
    }

    pub fn render(&self, json: bool) -> Result<String> {
        if json {
            return Ok(serde_json::to_string_pretty(self)?);
        }
        let mut lines = vec![
            format!("{}: {}", self.verdict, self.description),
            format!(
                "  {} -> {}  {}  {}",
                self.from.as_deref().unwrap_or("?"),
                self.to.as_deref().unwrap_or("?"),
                self.when,
                self.band
            ),
        ];
        if let Some(signer) = &self.signer {
            lines.push(format!("  signer:    {signer}"));
        }
        if let Some(certifier) = &self.certifier {
            lines.push(format!("  certifier: {certifier}"));
        }
        Ok(lines.join("\n"))
    }
}

pub async fn verify<T: HkpTransport + 'static>(
    hqsl: &HqslOpenPgp<T>,
    card: &Card,
) -> VerifyReport {
    let verification = hqsl.verify(card).await;
    VerifyReport::new(card, &verification)
}

/// Sign a card; `at` is `yyyyMMddHHmm` UTC, default now.
pub fn sign_card(
    card: Card,
    key_path: &Path,
    passphrase: Option<&str>,
    at: Option<&str>,
) -> Result<String> {
    let key = PrivateKey::parse(&read_file(key_path)?)
        .with_context(|| format!("loading private key {}", key_path.display()))?;
    let at = at.map(from_ham_date).transpose()?;
    let signed = sign(card, &key, passphrase, at)?;
    Ok(signed.to_text()?)
}

/// Certification windows of every key in a key file.
pub fn certifications(key_path: &Path, trusted: &[PublicKey]) -> Result<String> {
    let keys = parse_keys(&read_file(key_path)?)
        .with_context(|| format!("loading {}", key_path.display()))?;

    let mut lines = Vec::new();
    for key in &keys {
        lines.push(key.fingerprint());
        let ranges = certification_ranges(key, trusted);
        if ranges.is_empty() {
            lines.push("  no certifications by trusted keys".to_string());
        }
        for range in ranges {
            lines.push(format!(
                "  {}  {} .. {}  by {}",
                range.call,
                range.start.format("%Y-%m-%d %H:%M"),
                range.end.format("%Y-%m-%d %H:%M"),
                range.certifier.fingerprint()
            ));
        }
    }
    Ok(lines.join("\n"))
}

pub async fn lookup<T: HkpTransport + 'static>(hqsl: &HqslOpenPgp<T>, query: &str) -> Result<String> {
    let keys = hqsl.lookup(query).await?;
    let armored = keys
        .iter()
        .map(PublicKey::armored)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(armored.join("\n"))
}

/// Upload every key in a key file and wait for the uploads.
pub async fn publish<T: HkpTransport + 'static>(
    hqsl: &HqslOpenPgp<T>,
    key_path: &Path,
    server: Option<&str>,
) -> Result<String> {
    let keys = parse_keys(&read_file(key_path)?)
        .with_context(|| format!("loading {}", key_path.display()))?;
    let mut uploads = 0;
    for key in &keys {
        for handle in hqsl.publish(key, server)? {
            handle.await.map_err(|e| anyhow!("upload task failed: {e}"))?;
            uploads += 1;
        }
        info!(key = %key.fingerprint(), "[hqsl] key submitted");
    }
    Ok(format!(
        "submitted {} key(s) in {uploads} upload(s); see the log for results",
        keys.len()
    ))
}

pub fn adif_export(card: &Card) -> Result<String> {
    Ok(card.to_adif()?)
}

/// Card text of every contact in an ADI file, from the logging station's side.
///
/// Contacts that cannot form a card are logged and skipped.
pub fn adif_import(path: &Path, call: &str, grid: &str) -> Result<String> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let cards = Card::from_adif(&text, call, grid)
        .with_context(|| format!("parsing {}", path.display()))?;

    let mut lines = Vec::new();
    for (index, card) in cards.iter().enumerate() {
        match card.to_text() {
            Ok(line) => lines.push(line),
            Err(e) => warn!(record = index, to = ?card.to, error = %e, "[hqsl] skipping ADIF record"),
        }
    }
    Ok(lines.join("\n"))
}
