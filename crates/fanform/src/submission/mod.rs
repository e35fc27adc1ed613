//! Submission facade.
//!
//! One consumer's progress through a campaign's form. Answers are read and
//! written through an explicit accessor table; the stage is derived from
//! the campaign's synthesized rules.

mod accessor;
mod snapshot;


use crate::{
    campaign::CampaignFacade,
    config::FormConfig,
    error::{Error, ErrorKind, ErrorOrigin},
    message::MessageProvider,
    stage::{AnswerSource, Stage, StageEngine},
};
use fanform_core::{
    NAME_FIELD,
    db::{Filter, Gateway, SaveError, ensure_loaded, save_association, save_record, unit_of_work},
    model::catalog,
    record::{Record, RecordId},
    validate::collect_issues,
    value::Value,
    visitor::Issues,
};
use std::collections::BTreeMap;
use tracing::{debug, info};

// re-exports
pub use accessor::{AccessorTable, NATIVE_KEYS, TRANSIENT_KEYS, Target};
pub use snapshot::SubmissionSnapshot;

const DETAILS: &str = "details";
const DETAIL_VALUE: &str = "value";

///
/// Submission
///

#[derive(Debug)]
pub struct Submission {
    campaign: CampaignFacade,
    consumer: Record,
    engine: StageEngine,
    accessors: AccessorTable,
    transient: BTreeMap<String, Value>,
    stage: Option<Stage>,
    issues: Issues,
    dropped: Vec<Error>,
}

impl Submission {
    /// Fresh submission with a new consumer for `campaign`.
    pub fn new(campaign: CampaignFacade, messages: &dyn MessageProvider) -> Result<Self, Error> {
        let consumer = Record::new(&catalog::CONSUMER);

        Self::with_consumer(campaign, consumer, messages)
    }

    /// Bind an existing consumer. Its details must already be loaded
    /// when it is a stored record.
    pub fn with_consumer(
        campaign: CampaignFacade,
        mut consumer: Record,
        messages: &dyn MessageProvider,
    ) -> Result<Self, Error> {
        if consumer.model() != &catalog::CONSUMER {
            return Err(Error::new(
                ErrorKind::InvalidPayload,
                ErrorOrigin::Submission,
                format!("expected a consumer record, found {}", consumer.entity_name()),
            ));
        }
        if let Some(campaign_id) = campaign.id()
            && consumer.get("campaign_id").is_null()
        {
            consumer.set("campaign_id", campaign_id)?;
        }

        let schema = campaign.schema();
        let engine = StageEngine::new(&schema, campaign.config(), messages);
        let accessors = AccessorTable::build(&schema);

        let mut transient = BTreeMap::new();
        if campaign.config().assume_page_like {
            transient.insert("page_like".to_string(), Value::Bool(true));
        }

        Ok(Self {
            campaign,
            consumer,
            engine,
            accessors,
            transient,
            stage: None,
            issues: Issues::new(),
            dropped: Vec::new(),
        })
    }

    /// Build, fill and save in one call. The submission is returned even
    /// when validation keeps it from being stored.
    pub fn create<G, K, V>(
        gateway: &mut G,
        campaign: CampaignFacade,
        attrs: impl IntoIterator<Item = (K, V)>,
        messages: &dyn MessageProvider,
    ) -> Result<Self, Error>
    where
        G: Gateway + ?Sized,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut submission = Self::new(campaign, messages)?;
        submission.fill(attrs, false)?;
        submission.save(gateway)?;

        Ok(submission)
    }

    /// Fill and save.
    pub fn update<G, K, V>(
        &mut self,
        gateway: &mut G,
        attrs: impl IntoIterator<Item = (K, V)>,
    ) -> Result<bool, Error>
    where
        G: Gateway + ?Sized,
        K: AsRef<str>,
        V: Into<Value>,
    {
        self.fill(attrs, false)?;

        self.save(gateway)
    }

    /// Soft search: a fresh submission for `campaign` when no consumer
    /// matches.
    pub fn find_by<G: Gateway + ?Sized>(
        gateway: &G,
        campaign: CampaignFacade,
        filter: &Filter,
        messages: &dyn MessageProvider,
    ) -> Result<Self, Error> {
        let config = campaign.config().clone();
        match Self::find_by_strict(gateway, filter, config, messages) {
            Err(err) if err.is_not_found() => Self::new(campaign, messages),
            other => other,
        }
    }

    /// Hard search: the first matching consumer, bound to its own campaign.
    pub fn find_by_strict<G: Gateway + ?Sized>(
        gateway: &G,
        filter: &Filter,
        config: FormConfig,
        messages: &dyn MessageProvider,
    ) -> Result<Self, Error> {
        let mut consumer = gateway
            .find_first_by(&catalog::CONSUMER, filter)?
            .ok_or_else(|| {
                Error::not_found(ErrorOrigin::Submission, "no consumer matches the filter")
            })?;
        ensure_loaded(gateway, &mut consumer, DETAILS)?;

        let campaign = match RecordId::from_value(consumer.get("campaign_id")) {
            Some(id) => CampaignFacade::find(gateway, id, config)?,
            None => CampaignFacade::with_config(config),
        };

        Self::with_consumer(campaign, consumer, messages)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Read one answer by accessor key.
    pub fn get(&self, key: &str) -> Result<Value, Error> {
        let target = self
            .accessors
            .get(key)
            .ok_or_else(|| Error::unknown_attribute(ErrorOrigin::Submission, key))?;

        Ok(match target {
            Target::Native(column) => self.consumer.get(column).clone(),
            Target::Detail { label, checkbox } => {
                let value = self
                    .detail(label)
                    .map_or(Value::Null, |detail| detail.get(DETAIL_VALUE).clone());
                if *checkbox {
                    Value::Bool(value.to_bool())
                } else if value.is_null() {
                    Value::Null
                } else {
                    Value::Text(value.to_text())
                }
            }
            Target::Transient => self.transient.get(key).cloned().unwrap_or_default(),
        })
    }

    /// Write one answer by accessor key. Detail rows are created on first
    /// write.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<(), Error> {
        let target = self
            .accessors
            .get(key)
            .cloned()
            .ok_or_else(|| Error::unknown_attribute(ErrorOrigin::Submission, key))?;
        let value = value.into();

        match target {
            Target::Native(column) => self.consumer.set(column, value)?,
            Target::Detail { label, .. } => {
                self.detail_mut(&label)?.set(DETAIL_VALUE, value)?;
            }
            Target::Transient => {
                self.transient.insert(key.to_string(), value);
            }
        }

        Ok(())
    }

    /// Write several answers. With `skip_unknown`, keys that name no
    /// accessor are ignored instead of failing.
    pub fn fill<K, V>(
        &mut self,
        attrs: impl IntoIterator<Item = (K, V)>,
        skip_unknown: bool,
    ) -> Result<(), Error>
    where
        K: AsRef<str>,
        V: Into<Value>,
    {
        for (key, value) in attrs {
            match self.set(key.as_ref(), value) {
                Err(err) if skip_unknown && matches!(err.kind, ErrorKind::UnknownAttribute) => {
                    debug!(key = key.as_ref(), "unknown submission key skipped");
                }
                other => other?,
            }
        }

        Ok(())
    }

    fn detail(&self, label: &str) -> Option<&Record> {
        self.consumer
            .records(DETAILS)
            .iter()
            .find(|detail| detail.name() == Some(label))
    }

    fn detail_mut(&mut self, label: &str) -> Result<&mut Record, Error> {
        let details = self.consumer.association_mut(DETAILS).ok_or_else(|| {
            Error::new(
                ErrorKind::Internal,
                ErrorOrigin::Submission,
                "consumer has no details association",
            )
        })?;

        let index = match details.records().iter().position(|d| d.name() == Some(label)) {
            Some(index) => index,
            None => {
                let mut detail = Record::new(&catalog::DETAIL);
                detail.set(NAME_FIELD, label)?;
                details.attach(detail)
            }
        };

        Ok(&mut details.records_mut()[index])
    }

    #[must_use]
    pub const fn accessors(&self) -> &AccessorTable {
        &self.accessors
    }

    #[must_use]
    pub const fn campaign(&self) -> &CampaignFacade {
        &self.campaign
    }

    #[must_use]
    pub const fn consumer(&self) -> &Record {
        &self.consumer
    }

    #[must_use]
    pub const fn engine(&self) -> &StageEngine {
        &self.engine
    }

    #[must_use]
    pub fn id(&self) -> Option<RecordId> {
        self.consumer.id()
    }

    #[must_use]
    pub fn is_persisted(&self) -> bool {
        self.consumer.is_persisted()
    }

    /// Values that could not be carried over by `restore`.
    #[must_use]
    pub fn dropped(&self) -> &[Error] {
        &self.dropped
    }

    // ------------------------------------------------------------------
    // Stages
    // ------------------------------------------------------------------

    /// Stage last declared or computed; `None` for a fresh submission.
    #[must_use]
    pub const fn declared_stage(&self) -> Option<Stage> {
        self.stage
    }

    /// Declare the stage the next `save` validates against.
    pub const fn set_stage(&mut self, stage: Stage) {
        self.stage = Some(stage);
    }

    /// First stage whose requirements are unmet, without recording it.
    #[must_use]
    pub fn current_stage(&self) -> Stage {
        self.engine.current_stage(self)
    }

    /// Compute the current stage and record it as declared.
    pub fn stage(&mut self) -> Stage {
        let stage = self.current_stage();
        self.stage = Some(stage);

        stage
    }

    /// Stage after the current one; `None` at `Share`.
    pub fn next_stage(&mut self) -> Option<Stage> {
        self.stage().next()
    }

    /// Stage before the current one; `None` at `Likegate`.
    pub fn previous_stage(&mut self) -> Option<Stage> {
        self.stage().previous()
    }

    // ------------------------------------------------------------------
    // Validation and persistence
    // ------------------------------------------------------------------

    /// Rules of the declared stage, plus model-level checks on the consumer
    /// and its details. Stage messages win where both report a path.
    pub fn validate(&mut self) -> Result<(), Error> {
        let mut issues = match self.stage {
            Some(stage) => self.engine.validate_at(self, stage),
            None => Issues::new(),
        };
        for (path, messages) in collect_issues(&self.consumer)?.iter() {
            if issues.at(path).is_empty() {
                for message in messages {
                    issues.add(path.clone(), message.clone());
                }
            }
        }
        self.issues = issues;

        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(Error::new(
                ErrorKind::ValidationFailed(self.issues.clone()),
                ErrorOrigin::Submission,
                "submission validation failed",
            ))
        }
    }

    pub fn is_valid(&mut self) -> bool {
        self.validate().is_ok()
    }

    /// Issues from the last validation.
    #[must_use]
    pub const fn errors(&self) -> &Issues {
        &self.issues
    }

    /// Validate at the declared stage, then store the consumer and its
    /// details as one unit of work.
    ///
    /// Returns `Ok(false)` when validation fails; store failures are errors.
    pub fn save<G: Gateway + ?Sized>(&mut self, gateway: &mut G) -> Result<bool, Error> {
        if !self.is_valid() {
            debug!(issues = self.issues.count(), "submission not saved");
            return Ok(false);
        }
        let stage = self.stage();

        if let Some(campaign_id) = self.campaign.id()
            && self.consumer.get("campaign_id").is_null()
        {
            self.consumer.set("campaign_id", campaign_id)?;
        }

        let before = self.consumer.clone();
        let result = unit_of_work(gateway, |gateway| -> Result<(), Error> {
            let mut failures = Vec::new();
            if let Err(err) = save_record(gateway, &mut self.consumer) {
                failures.extend(err.failures);
            }
            if let Err(err) = save_association(gateway, &mut self.consumer, DETAILS) {
                failures.extend(err.failures);
            }

            if failures.is_empty() {
                Ok(())
            } else {
                Err(SaveError { failures }.into())
            }
        });
        if let Err(err) = result {
            self.consumer = before;
            return Err(err);
        }

        info!(
            consumer = %self.id().map_or_else(String::new, |id| id.to_string()),
            stage = %stage,
            "submission saved"
        );

        Ok(true)
    }
}

impl AnswerSource for Submission {
    fn answer(&self, key: &str) -> Value {
        self.get(key).unwrap_or_default()
    }
}
