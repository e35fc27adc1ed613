//! Stage-gated validation.
//!
//! A submission moves through a fixed journey. Each stage carries entry
//! requirements; the current stage is the first one whose requirements
//! are unmet.

mod engine;
mod rule;


use crate::error::{Error, ErrorKind, ErrorOrigin};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error as ThisError;

// re-exports
pub use engine::{AnswerSource, StageEngine};
pub use rule::StageRule;

///
/// Stage
///

#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Likegate,
    Landing,
    Login,
    Loggedin,
    Details,
    Share,
}

impl Stage {
    /// Journey order.
    pub const ALL: [Self; 6] = [
        Self::Likegate,
        Self::Landing,
        Self::Login,
        Self::Loggedin,
        Self::Details,
        Self::Share,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Following stage; `None` after `Share`.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    /// Preceding stage; `None` before `Likegate`.
    #[must_use]
    pub fn previous(self) -> Option<Self> {
        self.index()
            .checked_sub(1)
            .and_then(|i| Self::ALL.get(i).copied())
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Likegate => "likegate",
            Self::Landing => "landing",
            Self::Login => "login",
            Self::Loggedin => "loggedin",
            Self::Details => "details",
            Self::Share => "share",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Stage {
    type Err = StageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StageParseError::Unknown(s.to_string()))
    }
}

///
/// StageParseError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum StageParseError {
    #[error("unknown stage '{0}'")]
    Unknown(String),
}

impl From<StageParseError> for Error {
    fn from(err: StageParseError) -> Self {
        Self::new(ErrorKind::InvalidPayload, ErrorOrigin::Submission, err.to_string())
    }
}
