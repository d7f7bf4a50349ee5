//! Indian mobile number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The number (after stripping the country prefix) is not 10 digits.
    #[error("phone number must be 10 digits")]
    WrongLength,
    /// The input contains a non-digit character.
    #[error("phone number must contain only digits")]
    NotNumeric,
    /// Indian mobile numbers start with 6-9.
    #[error("phone number must start with 6, 7, 8 or 9")]
    InvalidPrefix,
}

/// A 10-digit Indian mobile number, stored without the country code.
///
/// Accepts `+91` / `91` / `0` prefixes on input and normalizes them away.
///
/// ## Examples
///
/// ```
/// use shiplane_core::Phone;
///
/// let a = Phone::parse("9876543210").unwrap();
/// let b = Phone::parse("+91 98765 43210").unwrap();
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Parse a `Phone` from a string, normalizing spaces, dashes, and the
    /// `+91`/`91`/`0` prefixes.
    ///
    /// # Errors
    ///
    /// Returns an error if the normalized number is not a valid 10-digit
    /// Indian mobile number.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let compact: String = s.chars().filter(|c| !matches!(c, ' ' | '-')).collect();

        let digits = compact
            .strip_prefix("+91")
            .or_else(|| compact.strip_prefix("91").filter(|rest| rest.len() == 10))
            .or_else(|| compact.strip_prefix('0').filter(|rest| rest.len() == 10))
            .unwrap_or(&compact);

        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PhoneError::NotNumeric);
        }
        if digits.len() != 10 {
            return Err(PhoneError::WrongLength);
        }
        if !matches!(digits.as_bytes().first(), Some(b'6'..=b'9')) {
            return Err(PhoneError::InvalidPrefix);
        }

        Ok(Self(digits.to_owned()))
    }

    /// Returns the 10-digit number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The number in E.164 format (`+91XXXXXXXXXX`).
    #[must_use]
    pub fn e164(&self) -> String {
        format!("+91{}", self.0)
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Phone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Phone {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Phone {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Phone {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain() {
        assert_eq!(Phone::parse("9876543210").unwrap().as_str(), "9876543210");
    }

    #[test]
    fn test_parse_prefixes_normalized() {
        let expected = Phone::parse("9876543210").unwrap();
        assert_eq!(Phone::parse("+919876543210").unwrap(), expected);
        assert_eq!(Phone::parse("919876543210").unwrap(), expected);
        assert_eq!(Phone::parse("09876543210").unwrap(), expected);
        assert_eq!(Phone::parse("+91 98765 43210").unwrap(), expected);
        assert_eq!(Phone::parse("98765-43210").unwrap(), expected);
    }

    #[test]
    fn test_parse_wrong_length() {
        assert_eq!(Phone::parse("98765"), Err(PhoneError::WrongLength));
        assert_eq!(Phone::parse("98765432101"), Err(PhoneError::WrongLength));
    }

    #[test]
    fn test_parse_invalid_prefix() {
        assert_eq!(Phone::parse("1234567890"), Err(PhoneError::InvalidPrefix));
        assert_eq!(Phone::parse("5876543210"), Err(PhoneError::InvalidPrefix));
    }

    #[test]
    fn test_parse_not_numeric() {
        assert_eq!(Phone::parse("98765A3210"), Err(PhoneError::NotNumeric));
    }

    #[test]
    fn test_e164() {
        assert_eq!(Phone::parse("9876543210").unwrap().e164(), "+919876543210");
    }
}
