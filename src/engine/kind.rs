//! Small closed vocabularies used by the engine API

use std::fmt;
use std::str::FromStr;

use crate::error::BrainError;

/// Stored shape of a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    Scalar,
    List,
    Set,
    Hash,
}

impl KeyKind {
    /// Classify a key from its structural signals
    ///
    /// Any row with a subkey makes the key a hash; otherwise the set flag
    /// wins over a plain array value, and anything else is a scalar.
    pub fn classify(has_subkey: bool, is_set: bool, is_array: bool) -> Self {
        if has_subkey {
            KeyKind::Hash
        } else if is_set {
            KeyKind::Set
        } else if is_array {
            KeyKind::List
        } else {
            KeyKind::Scalar
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KeyKind::Scalar => "scalar",
            KeyKind::List => "list",
            KeyKind::Set => "set",
            KeyKind::Hash => "hash",
        }
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where `linsert` puts the new element relative to the pivot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Before,
    After,
}

impl FromStr for Placement {
    type Err = BrainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("before") {
            Ok(Placement::Before)
        } else if s.eq_ignore_ascii_case("after") {
            Ok(Placement::After)
        } else {
            Err(BrainError::Config(format!(
                "placement must be BEFORE or AFTER, got '{}'",
                s
            )))
        }
    }
}
