use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Retention policy governing how much ancestry a snapshot dump includes.
///
/// The mode shapes the dump pipeline only — the tree store itself retains
/// whatever has been committed, regardless of mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistoryMode {
    /// Retain everything; dumps carry full block data for the whole walk.
    Archive,
    /// Retain full blocks but allow operation data to be pruned; dumps may
    /// substitute pruned-block summaries where full contents are gone.
    Full,
    /// Retain only a recent window; dumps stop at the window boundary.
    Rolling,
}

impl HistoryMode {
    /// All modes, for iteration in tests and tooling.
    pub const ALL: [HistoryMode; 3] = [Self::Archive, Self::Full, Self::Rolling];
}

impl Default for HistoryMode {
    fn default() -> Self {
        Self::Full
    }
}

impl fmt::Display for HistoryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Archive => write!(f, "archive"),
            Self::Full => write!(f, "full"),
            Self::Rolling => write!(f, "rolling"),
        }
    }
}

impl FromStr for HistoryMode {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "archive" => Ok(Self::Archive),
            "full" => Ok(Self::Full),
            "rolling" => Ok(Self::Rolling),
            other => Err(TypeError::UnknownHistoryMode(other.to_string())),
        }
    }
}
