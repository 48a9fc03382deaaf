use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PolicyParseError;

/// How a single field is folded from an incoming record onto a base record.
///
/// Exactly one variant applies to a field during a merge. Fields that declare
/// no policy resolve to [`MergePolicy::Required`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergePolicy {
    /// The incoming value always overwrites the base, even when absent.
    Mandatory,
    /// The incoming value overwrites the base only when present.
    #[default]
    Required,
    /// The field is never touched by a merge.
    Ignored,
}

impl MergePolicy {
    /// All variants in declaration order.
    pub const ALL: [MergePolicy; 3] = [Self::Mandatory, Self::Required, Self::Ignored];

    /// Returns `true` if this is `Mandatory`.
    pub fn is_mandatory(&self) -> bool {
        matches!(self, Self::Mandatory)
    }

    /// Returns `true` if this is `Required`.
    pub fn is_required(&self) -> bool {
        matches!(self, Self::Required)
    }

    /// Returns `true` if this is `Ignored`.
    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored)
    }

    /// Resolve an optional declaration, falling back to the default policy.
    pub fn resolve(declared: Option<MergePolicy>) -> MergePolicy {
        declared.unwrap_or_default()
    }

    /// Lowercase name used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mandatory => "mandatory",
            Self::Required => "required",
            Self::Ignored => "ignored",
        }
    }
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mandatory => write!(f, "Mandatory"),
            Self::Required => write!(f, "Required"),
            Self::Ignored => write!(f, "Ignored"),
        }
    }
}

impl FromStr for MergePolicy {
    type Err = PolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| PolicyParseError::Unknown(s.to_string()))
    }
}
