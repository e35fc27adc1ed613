use super::{Submission, Target};
use crate::{
    campaign::CampaignFacade,
    config::FormConfig,
    error::{Error, ErrorKind, ErrorOrigin},
    message::MessageProvider,
    stage::Stage,
};
use fanform_core::{
    db::{Gateway, ensure_loaded},
    model::catalog,
    record::{Record, RecordId},
    value::Value,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

///
/// SubmissionSnapshot
///
/// Serializable session state: ids plus every non-null answer by
/// accessor key. Records are re-resolved on restore.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct SubmissionSnapshot {
    pub campaign_id: Option<RecordId>,
    pub consumer_id: Option<RecordId>,
    pub stage: Option<Stage>,
    #[serde(default)]
    pub values: BTreeMap<String, Value>,
}

impl SubmissionSnapshot {
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string(self).map_err(|err| {
            Error::new(ErrorKind::Internal, ErrorOrigin::Submission, err.to_string())
        })
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(|err| {
            Error::new(
                ErrorKind::InvalidPayload,
                ErrorOrigin::Submission,
                format!("invalid submission snapshot: {err}"),
            )
        })
    }
}

impl Submission {
    /// Capture the session state.
    #[must_use]
    pub fn snapshot(&self) -> SubmissionSnapshot {
        let values = self
            .accessors
            .iter()
            .filter(|(_, target)| match target {
                Target::Detail { label, .. } => self.detail(label).is_some(),
                _ => true,
            })
            .filter_map(|(key, _)| {
                let value = self.get(key).ok()?;
                (!value.is_null()).then(|| (key.to_string(), value))
            })
            .collect();

        SubmissionSnapshot {
            campaign_id: self.campaign.id(),
            consumer_id: self.id(),
            stage: self.stage,
            values,
        }
    }

    /// Rebuild a submission against the current schema.
    ///
    /// Ids that no longer resolve and values whose key no longer exists are
    /// dropped and listed in [`dropped`](Self::dropped); store failures are
    /// still errors.
    pub fn restore<G: Gateway + ?Sized>(
        gateway: &G,
        snapshot: SubmissionSnapshot,
        config: FormConfig,
        messages: &dyn MessageProvider,
    ) -> Result<Self, Error> {
        let mut dropped = Vec::new();

        let campaign = match snapshot.campaign_id {
            Some(id) => match CampaignFacade::find(gateway, id, config.clone()) {
                Ok(campaign) => campaign,
                Err(err) if err.is_not_found() => {
                    dropped.push(restore_failure(format!("campaign {id} no longer exists")));
                    CampaignFacade::with_config(config)
                }
                Err(err) => return Err(err),
            },
            None => CampaignFacade::with_config(config),
        };

        let consumer = match snapshot.consumer_id {
            Some(id) => {
                if let Some(mut consumer) = gateway.find_by_id(&catalog::CONSUMER, id)? {
                    ensure_loaded(gateway, &mut consumer, super::DETAILS)?;
                    consumer
                } else {
                    dropped.push(restore_failure(format!("consumer {id} no longer exists")));
                    Record::new(&catalog::CONSUMER)
                }
            }
            None => Record::new(&catalog::CONSUMER),
        };

        let mut submission = Self::with_consumer(campaign, consumer, messages)?;
        for (key, value) in snapshot.values {
            if let Err(err) = submission.set(&key, value) {
                dropped.push(restore_failure(format!("value '{key}' dropped: {err}")));
            }
        }
        submission.stage = snapshot.stage;

        for entry in &dropped {
            warn!(reason = %entry, "submission restore dropped state");
        }
        submission.dropped = dropped;

        Ok(submission)
    }
}

fn restore_failure(message: String) -> Error {
    Error::new(ErrorKind::RestoreFailure, ErrorOrigin::Submission, message)
}
