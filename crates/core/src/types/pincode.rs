//! Indian postal code (PIN code) type.
//!
//! Serviceability and rates are quoted pincode-to-pincode, so an invalid
//! pincode is rejected at the API boundary instead of inside each courier
//! adapter.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Pincode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PincodeError {
    /// The input is not exactly six characters.
    #[error("pincode must be exactly 6 digits")]
    WrongLength,
    /// The input contains a non-digit character.
    #[error("pincode must contain only digits")]
    NotNumeric,
    /// PIN codes never start with 0.
    #[error("pincode cannot start with 0")]
    LeadingZero,
}

/// A 6-digit Indian postal code.
///
/// ## Constraints
///
/// - Exactly six ASCII digits
/// - First digit is 1-9 (the postal zone; zone 0 does not exist)
///
/// ## Examples
///
/// ```
/// use shiplane_core::Pincode;
///
/// assert!(Pincode::parse("110001").is_ok()); // New Delhi GPO
/// assert!(Pincode::parse("560037").is_ok()); // Bengaluru
///
/// assert!(Pincode::parse("11001").is_err());  // too short
/// assert!(Pincode::parse("1100A1").is_err()); // non-digit
/// assert!(Pincode::parse("010001").is_err()); // leading zero
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Pincode(String);

impl Pincode {
    /// Parse a `Pincode` from a string, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not six digits or starts with 0.
    pub fn parse(s: &str) -> Result<Self, PincodeError> {
        let s = s.trim();
        if s.len() != 6 {
            return Err(PincodeError::WrongLength);
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PincodeError::NotNumeric);
        }
        if s.starts_with('0') {
            return Err(PincodeError::LeadingZero);
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the pincode as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The postal zone (first digit, 1-9).
    #[must_use]
    pub fn zone(&self) -> u8 {
        self.0.bytes().next().map_or(0, |b| b - b'0')
    }
}

impl fmt::Display for Pincode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Pincode {
    type Err = PincodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Pincode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Pincode {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Pincode {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Pincode {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
