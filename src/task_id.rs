use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Canonical task identifier: a random UUID rendered as 32 lowercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(Uuid);

impl TaskId {
    pub const HEX_LEN: usize = 32;

    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Lowercase simple-hex form, the only form written to storage and output.
    pub fn to_hex(&self) -> String {
        self.0.simple().to_string()
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.to_hex().starts_with(prefix)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for TaskId {
    type Err = TaskIdParseError;

    /// Accepts the simple 32-hex form as well as the hyphenated UUID form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(TaskIdParseError::Empty);
        }
        Uuid::parse_str(trimmed)
            .map(Self)
            .map_err(|e| TaskIdParseError::Invalid(e.to_string()))
    }
}

impl From<Uuid> for TaskId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl Serialize for TaskId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskIdParseError {
    Empty,
    Invalid(String),
}

impl fmt::Display for TaskIdParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "task id cannot be empty"),
            Self::Invalid(reason) => write!(f, "invalid task id: {reason}"),
        }
    }
}

impl std::error::Error for TaskIdParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_distinct_lowercase_hex() {
        let a = TaskId::generate();
        let b = TaskId::generate();
        assert_ne!(a, b);
        let hex = a.to_string();
        assert_eq!(hex.len(), TaskId::HEX_LEN);
        assert!(hex.bytes().all(|c| c.is_ascii_digit() || (b'a'..=b'f').contains(&c)));
    }

    #[test]
    fn parses_simple_and_hyphenated_forms() {
        let simple: TaskId = "67e5504410b1426f9247bb680e5fe0c8".parse().unwrap();
        let hyphenated: TaskId = "67e55044-10b1-426f-9247-bb680e5fe0c8".parse().unwrap();
        assert_eq!(simple, hyphenated);
        assert_eq!(simple.to_string(), "67e5504410b1426f9247bb680e5fe0c8");
    }

    #[test]
    fn rejects_empty_and_garbage() {
        assert_eq!("  ".parse::<TaskId>(), Err(TaskIdParseError::Empty));
        assert!(matches!(
            "not-an-id".parse::<TaskId>(),
            Err(TaskIdParseError::Invalid(_))
        ));
    }

    #[test]
    fn serializes_as_simple_hex_string() {
        let id: TaskId = "67e55044-10b1-426f-9247-bb680e5fe0c8".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#""67e5504410b1426f9247bb680e5fe0c8""#);
        let back: TaskId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
