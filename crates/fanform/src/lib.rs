//! ## Crate layout
//! - `campaign`: campaign facade over the record graph and its collections.
//! - `config`: TOML form configuration.
//! - `error`: public error taxonomy.
//! - `message`: validation message lookup.
//! - `schema`: typed view of a campaign's questions and fields.
//! - `stage`: stage order and the rule engine that gates it.
//! - `submission`: one consumer's answers, stage and session snapshot.
//!
//! Runtime plumbing (records, payloads, reconciliation, the gateway) lives
//! in `fanform-core`, re-exported as [`core`].

pub use fanform_core as core;

pub mod campaign;
pub mod config;
pub mod error;
pub mod message;
pub mod schema;
pub mod stage;
pub mod submission;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

pub use error::{Error, ErrorKind, ErrorOrigin};

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        campaign::CampaignFacade,
        config::FormConfig,
        core::prelude::*,
        message::{DefaultMessages, MessageProvider},
        stage::{AnswerSource as _, Stage},
        submission::{Submission, SubmissionSnapshot},
    };
}
