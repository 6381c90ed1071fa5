//! Subject identity.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Opaque identifier of a tracked individual.
///
/// Always trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubjectId(String);

/// Returned when a subject identifier is blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptySubjectId;

impl Display for EmptySubjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "subject id cannot be empty")
    }
}

impl Error for EmptySubjectId {}

impl SubjectId {
    /// Builds a subject id from caller input, trimming surrounding whitespace.
    pub fn parse(value: impl AsRef<str>) -> Result<Self, EmptySubjectId> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(EmptySubjectId);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SubjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SubjectId {
    type Error = EmptySubjectId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<SubjectId> for String {
    fn from(value: SubjectId) -> Self {
        value.0
    }
}
