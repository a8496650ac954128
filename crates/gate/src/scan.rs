//! Normalization of raw scan input into credentials.

use crate::error::CredentialError;
use focusgate_policy::CredentialId;
use serde::{Deserialize, Serialize};

/// Maximum length of a tag identifier rendered as hex.
///
/// NFC UIDs are 4, 7 or 10 bytes; 8 bytes of hex covers the common cases.
pub const MAX_TAG_HEX_LEN: usize = 16;

/// A decoded scan from one of the two credential sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scan {
    /// Raw identifier bytes read from a tag.
    Tag(Vec<u8>),
    /// A tag identifier already rendered as text, e.g. `04:A1:B2:C3`.
    TagHex(String),
    /// Decoded payload of a QR code.
    Qr(String),
}

impl Scan {
    /// Normalize into the credential form stored in the policy.
    ///
    /// Two scans of the same physical tag produce the same credential no
    /// matter which source reported them.
    pub fn normalize(&self) -> Result<CredentialId, CredentialError> {
        let normalized = match self {
            Scan::Tag(bytes) => hex::encode(bytes),
            Scan::TagHex(text) => text
                .chars()
                .filter(|c| !matches!(c, ':' | '-') && !c.is_whitespace())
                .collect::<String>()
                .to_ascii_lowercase(),
            Scan::Qr(payload) => payload.trim().to_string(),
        };

        if normalized.is_empty() {
            return Err(CredentialError::Empty);
        }
        Ok(CredentialId::new(normalized))
    }
}

/// Display classification of a stored credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialKind {
    Tag,
    Qr,
}

impl CredentialKind {
    /// Short hex strings look like tag identifiers; anything else came from
    /// a QR code.
    pub fn classify(credential: &CredentialId) -> Self {
        let s = credential.as_str();
        if s.len() <= MAX_TAG_HEX_LEN && s.chars().all(|c| c.is_ascii_hexdigit()) {
            CredentialKind::Tag
        } else {
            CredentialKind::Qr
        }
    }
}
