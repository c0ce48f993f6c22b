//! Redemption codes handed to winners.

use std::fmt;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Number of characters in a redemption code.
pub const REDEMPTION_CODE_LENGTH: usize = 8;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Validation errors for [`RedemptionCode`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RedemptionCodeError {
    #[error("redemption code must be {expected} characters, got {actual}")]
    WrongLength { expected: usize, actual: usize },
    #[error("redemption code may only contain A-Z and 0-9, found {character:?}")]
    InvalidCharacter { character: char },
}

/// Opaque code exchanged for a prize, unique across every recorded outcome.
///
/// ## Invariants
/// - Exactly [`REDEMPTION_CODE_LENGTH`] characters from `A-Z0-9`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RedemptionCode(String);

impl RedemptionCode {
    /// Validate an existing code.
    ///
    /// # Examples
    /// ```
    /// use spinwin::domain::RedemptionCode;
    ///
    /// assert!(RedemptionCode::new("AB12CD34").is_ok());
    /// assert!(RedemptionCode::new("ab12cd34").is_err());
    /// ```
    pub fn new(code: impl Into<String>) -> Result<Self, RedemptionCodeError> {
        let code = code.into();
        let actual = code.chars().count();
        if actual != REDEMPTION_CODE_LENGTH {
            return Err(RedemptionCodeError::WrongLength {
                expected: REDEMPTION_CODE_LENGTH,
                actual,
            });
        }
        if let Some(character) = code
            .chars()
            .find(|c| !(c.is_ascii_uppercase() || c.is_ascii_digit()))
        {
            return Err(RedemptionCodeError::InvalidCharacter { character });
        }
        Ok(Self(code))
    }

    /// Draw a fresh code from `rng`.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let code = (0..REDEMPTION_CODE_LENGTH)
            .filter_map(|_| ALPHABET.choose(rng).copied().map(char::from))
            .collect();
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for RedemptionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<RedemptionCode> for String {
    fn from(value: RedemptionCode) -> Self {
        value.0
    }
}

impl TryFrom<String> for RedemptionCode {
    type Error = RedemptionCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Produces candidate codes; uniqueness is checked by the caller.
pub trait RedemptionCodeGenerator: Send + Sync {
    fn generate(&self) -> RedemptionCode;
}

/// Generator backed by the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomCodeGenerator;

impl RedemptionCodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> RedemptionCode {
        RedemptionCode::random(&mut rand::thread_rng())
    }
}
