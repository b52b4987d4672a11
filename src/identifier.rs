//! Canonical Steam profile identifiers
//!
//! A profile is identified by its SteamID64: exactly 17 ASCII digits. Vanity
//! handles (custom profile URLs) are never identities on their own and must be
//! resolved first, see [`crate::fetcher::resolver`].

use std::fmt;
use std::str::FromStr;

/// Number of digits in a SteamID64
pub const STEAM_ID_LEN: usize = 17;

/// Check whether `s` is a canonical SteamID64 (exactly 17 ASCII digits)
///
/// # Examples
///
/// ```
/// use steam_family_aggregator::identifier::is_canonical;
///
/// assert!(is_canonical("76561197960287930"));
/// assert!(!is_canonical("gabelogannewell"));
/// assert!(!is_canonical("7656119796028793"));
/// ```
pub fn is_canonical(s: &str) -> bool {
    s.len() == STEAM_ID_LEN && s.bytes().all(|b| b.is_ascii_digit())
}

/// Canonical profile identity (SteamID64)
///
/// Can only be built from a validated string, so every `SteamId` in the
/// program is canonical. Equality, hashing and ordering use the digits only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SteamId(String);

impl SteamId {
    /// Parse a canonical SteamID64
    ///
    /// Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is not exactly 17 digits.
    pub fn parse(s: &str) -> Result<Self, IdentifierError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(IdentifierError::InvalidFormat(
                "identifier cannot be empty".to_string(),
            ));
        }
        if !is_canonical(trimmed) {
            return Err(IdentifierError::InvalidFormat(format!(
                "expected {STEAM_ID_LEN} digits, got '{trimmed}'"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Borrow the canonical digits
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for SteamId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SteamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SteamId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Convert free text into a filesystem-safe slug
///
/// Lowercases, collapses every run of non `[a-z0-9]` characters into `-`
/// and trims dashes. Falls back to `"seed"` when nothing is left.
///
/// ```
/// use steam_family_aggregator::identifier::slugify;
///
/// assert_eq!(slugify("  Gabe Newell! "), "gabe-newell");
/// assert_eq!(slugify("***"), "seed");
/// ```
pub fn slugify(s: &str) -> String {
    let mut slug = String::with_capacity(s.len());
    let mut pending_dash = false;

    for c in s.trim().to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        "seed".to_string()
    } else {
        slug
    }
}

/// Errors that can occur during identifier parsing
#[derive(Debug, thiserror::Error)]
pub enum IdentifierError {
    /// Invalid identifier format
    #[error("identifier error: {0}")]
    InvalidFormat(String),
}
