//! Validated value types stored on teacher records.
//!
//! - [`Email`]: a syntactically valid email address
//! - [`Subject`]: the closed set of subjects a teacher can be assigned
//!
//! Both are stored as `TEXT` columns and decoded without re-validation, since
//! every write goes through the validating constructors.

use serde::{Deserialize, Serialize};
use sqlx::{Database, Decode, Encode, Type, postgres::PgTypeInfo};
use std::fmt;
use std::str::FromStr;
use validator::ValidateEmail;

/// Error type for value type parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueTypeError {
    InvalidEmail(String),
    InvalidSubject(String),
}

impl std::error::Error for ValueTypeError {}

impl fmt::Display for ValueTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmail(msg) => write!(f, "Invalid email: {}", msg),
            Self::InvalidSubject(msg) => write!(f, "Invalid subject: {}", msg),
        }
    }
}

// ============================================================================
// Email
// ============================================================================

/// A validated email address.
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Email(String);

impl Email {
    pub fn new(email: impl Into<String>) -> Result<Self, ValueTypeError> {
        let email = email.into().trim().to_string();
        Self::validate(&email)?;
        Ok(Self(email))
    }

    /// Wrap a value read back from the database.
    #[inline]
    pub fn new_unchecked(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }

    fn validate(email: &str) -> Result<(), ValueTypeError> {
        if email.is_empty() {
            return Err(ValueTypeError::InvalidEmail("email cannot be empty".into()));
        }

        if !email.validate_email() {
            return Err(ValueTypeError::InvalidEmail(format!(
                "'{}' is not a valid email address",
                email
            )));
        }

        Ok(())
    }
}

impl fmt::Debug for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Email({})", self.0)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Email {
    type Err = ValueTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for Email {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Type<sqlx::Postgres> for Email {
    fn type_info() -> PgTypeInfo {
        <String as Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <String as Type<sqlx::Postgres>>::compatible(ty)
    }
}

impl<'q> Encode<'q, sqlx::Postgres> for Email {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

impl<'r> Decode<'r, sqlx::Postgres> for Email {
    fn decode(
        value: <sqlx::Postgres as Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as Decode<'r, sqlx::Postgres>>::decode(value)?;
        Ok(Self::new_unchecked(s))
    }
}

impl<'de> Deserialize<'de> for Email {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Subject
// ============================================================================

/// Subject a teacher is assigned to. Stored as its short code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subject {
    #[serde(rename = "Math")]
    Math,
    #[serde(rename = "Sci")]
    Science,
    #[serde(rename = "Eng")]
    English,
    #[serde(rename = "Hist")]
    History,
}

impl Subject {
    pub const ALL: [Subject; 4] = [
        Subject::Math,
        Subject::Science,
        Subject::English,
        Subject::History,
    ];

    /// Short code stored in the database.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Math => "Math",
            Self::Science => "Sci",
            Self::English => "Eng",
            Self::History => "Hist",
        }
    }

    /// Human-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Math => "Mathematics",
            Self::Science => "Science",
            Self::English => "English",
            Self::History => "History",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts either the stored code or the label, case-insensitively.
impl FromStr for Subject {
    type Err = ValueTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|subject| {
                subject.code().eq_ignore_ascii_case(wanted)
                    || subject.label().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| ValueTypeError::InvalidSubject(format!("'{}' is not a subject", s)))
    }
}

impl Type<sqlx::Postgres> for Subject {
    fn type_info() -> PgTypeInfo {
        <String as Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <String as Type<sqlx::Postgres>>::compatible(ty)
    }
}

impl<'q> Encode<'q, sqlx::Postgres> for Subject {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.code(), buf)
    }
}

impl<'r> Decode<'r, sqlx::Postgres> for Subject {
    fn decode(
        value: <sqlx::Postgres as Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as Decode<'r, sqlx::Postgres>>::decode(value)?;
        Ok(s.parse()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod email_tests {
        use super::*;

        #[test]
        fn test_valid_email_is_trimmed() {
            let email = Email::new("  jane@school.edu ").unwrap();
            assert_eq!(email.as_str(), "jane@school.edu");
        }

        #[test]
        fn test_invalid_email() {
            assert!(Email::new("").is_err());
            assert!(Email::new("not-an-email").is_err());
            assert!("missing-domain@".parse::<Email>().is_err());
        }

        #[test]
        fn test_email_deserialize_invalid() {
            let result: Result<Email, _> = serde_json::from_str(r#""nope""#);
            assert!(result.is_err());
        }
    }

    mod subject_tests {
        use super::*;

        #[test]
        fn test_codes_and_labels() {
            assert_eq!(Subject::Science.code(), "Sci");
            assert_eq!(Subject::Science.label(), "Science");
            assert_eq!(Subject::History.to_string(), "History");
        }

        #[test]
        fn test_parse_accepts_code_or_label() {
            assert_eq!("Math".parse::<Subject>().unwrap(), Subject::Math);
            assert_eq!("mathematics".parse::<Subject>().unwrap(), Subject::Math);
            assert_eq!("eng".parse::<Subject>().unwrap(), Subject::English);
            assert_eq!(" History ".parse::<Subject>().unwrap(), Subject::History);
        }

        #[test]
        fn test_parse_rejects_unknown() {
            assert!(matches!(
                "Art".parse::<Subject>(),
                Err(ValueTypeError::InvalidSubject(_))
            ));
        }

        #[test]
        fn test_serializes_as_code() {
            assert_eq!(serde_json::to_string(&Subject::English).unwrap(), r#""Eng""#);
        }
    }
}
