//! Campaign facade.
//!
//! Wraps the campaign record and its managed collections. Nested payloads
//! are merged through the reconciler; nothing is deleted by assignment.

use crate::{
    config::FormConfig,
    error::{Error, ErrorKind, ErrorOrigin},
    schema::{DataType, FieldDef, Schema},
};
use fanform_core::{
    ID_FIELD,
    db::{Filter, Gateway, SaveError, ensure_loaded, save_association, save_record, unit_of_work},
    model::catalog,
    name::slugify,
    payload::{AttributeMap, Payload, PayloadValue},
    reconcile::reconcile,
    record::{Record, RecordId, by_name},
    validate::collect_issues,
    visitor::Issues,
};
use tracing::{debug, info};

/// Collections saved and validated with the campaign.
pub const MANAGED: [&str; 7] = [
    "questions",
    "answers",
    "tags",
    "contents",
    "fields",
    "options",
    "subscriptions",
];

/// Payload key carrying the campaign's own attributes in `create`.
pub const CAMPAIGN_KEY: &str = "campaign";

const SLUG_FIELD: &str = "slug";
const TEMPLATES: &str = "templates";
const CLIENT: &str = "client";

///
/// CampaignFacade
///

#[derive(Clone, Debug)]
pub struct CampaignFacade {
    record: Record,
    config: FormConfig,
    issues: Issues,
}

impl Default for CampaignFacade {
    fn default() -> Self {
        Self::new()
    }
}

impl CampaignFacade {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(FormConfig::default())
    }

    #[must_use]
    pub fn with_config(config: FormConfig) -> Self {
        Self {
            record: Record::new(&catalog::CAMPAIGN),
            config,
            issues: Issues::new(),
        }
    }

    /// Wrap an existing campaign record; its loaded state is kept as-is.
    pub fn from_record(record: Record, config: FormConfig) -> Result<Self, Error> {
        if record.model() != &catalog::CAMPAIGN {
            return Err(Error::new(
                ErrorKind::InvalidPayload,
                ErrorOrigin::Campaign,
                format!("expected a campaign record, found {}", record.entity_name()),
            ));
        }

        Ok(Self {
            record,
            config,
            issues: Issues::new(),
        })
    }

    // ------------------------------------------------------------------
    // Finders
    // ------------------------------------------------------------------

    /// Load a campaign and its managed collections by id.
    pub fn find<G: Gateway + ?Sized>(
        gateway: &G,
        id: RecordId,
        config: FormConfig,
    ) -> Result<Self, Error> {
        let record = gateway
            .find_by_id(&catalog::CAMPAIGN, id)?
            .ok_or_else(|| {
                Error::not_found(ErrorOrigin::Campaign, format!("campaign not found: {id}"))
            })?;

        Self::loaded(gateway, record, config)
    }

    /// Soft search: a fresh, unsaved facade when nothing matches.
    pub fn find_by<G: Gateway + ?Sized>(
        gateway: &G,
        filter: &Filter,
        config: FormConfig,
    ) -> Result<Self, Error> {
        match Self::find_by_strict(gateway, filter, config.clone()) {
            Err(err) if err.is_not_found() => Ok(Self::with_config(config)),
            other => other,
        }
    }

    /// Hard search: `NotFound` when nothing matches.
    pub fn find_by_strict<G: Gateway + ?Sized>(
        gateway: &G,
        filter: &Filter,
        config: FormConfig,
    ) -> Result<Self, Error> {
        let record = gateway
            .find_first_by(&catalog::CAMPAIGN, filter)?
            .ok_or_else(|| {
                Error::not_found(ErrorOrigin::Campaign, "no campaign matches the filter")
            })?;

        Self::loaded(gateway, record, config)
    }

    fn loaded<G: Gateway + ?Sized>(
        gateway: &G,
        record: Record,
        config: FormConfig,
    ) -> Result<Self, Error> {
        let mut facade = Self::from_record(record, config)?;
        facade.load_all(gateway)?;

        Ok(facade)
    }

    /// Fetch every managed collection, the templates and the client, once.
    ///
    /// A campaign without a client inherits its first template's client
    /// here; the inherited id is written on the next save.
    pub fn load_all<G: Gateway + ?Sized>(&mut self, gateway: &G) -> Result<(), Error> {
        for name in MANAGED.iter().chain(&[TEMPLATES]) {
            ensure_loaded(gateway, &mut self.record, name)?;
        }
        inherit_client(&mut self.record)?;
        ensure_loaded(gateway, &mut self.record, CLIENT)?;

        Ok(())
    }

    // ------------------------------------------------------------------
    // Creation and assignment
    // ------------------------------------------------------------------

    /// Build a campaign from one payload and save it.
    ///
    /// `campaign` holds the root attributes; every other key names an
    /// association. Top-level scalars are treated as root attributes.
    pub fn create<G: Gateway + ?Sized>(
        gateway: &mut G,
        payload: AttributeMap,
        config: FormConfig,
    ) -> Result<Self, Error> {
        let mut facade = Self::with_config(config);

        for (key, value) in payload {
            match value {
                PayloadValue::Nested(items) if key == CAMPAIGN_KEY => {
                    for item in items {
                        let Payload::Attributes(attrs) = item else {
                            return Err(Error::new(
                                ErrorKind::InvalidPayload,
                                ErrorOrigin::Campaign,
                                "campaign attributes must be a map",
                            ));
                        };
                        facade.set_campaign(gateway, attrs)?;
                    }
                }
                PayloadValue::Nested(items) => {
                    facade.assign(gateway, &key, items)?;
                }
                PayloadValue::Scalar(value) => {
                    facade.set_campaign(gateway, AttributeMap::new().with(key, value))?;
                }
            }
        }

        facade.save(gateway)?;

        Ok(facade)
    }

    /// Same as [`create`](Self::create) from a JSON object.
    pub fn create_json<G: Gateway + ?Sized>(
        gateway: &mut G,
        json: &serde_json::Value,
        config: FormConfig,
    ) -> Result<Self, Error> {
        Self::create(gateway, AttributeMap::from_json(json)?, config)
    }

    /// Merge root attributes. `slug` is derived, never assigned, and an
    /// `id` is only honoured before the first save.
    pub fn set_campaign<G: Gateway + ?Sized>(
        &mut self,
        gateway: &G,
        attrs: AttributeMap,
    ) -> Result<(), Error> {
        for (key, value) in attrs {
            match value {
                PayloadValue::Scalar(_) if key == SLUG_FIELD => {}
                PayloadValue::Scalar(_) if key == ID_FIELD && self.record.is_persisted() => {}
                PayloadValue::Scalar(value) => self.record.set(&key, value)?,
                PayloadValue::Nested(items) => {
                    self.assign(gateway, &key, items)?;
                }
            }
        }

        Ok(())
    }

    /// Merge payload items into one managed association and return the
    /// records the items produced or touched, in item order.
    ///
    /// Only [`MANAGED`] collections are assignable, since no other
    /// collection is written by [`save`](Self::save).
    pub fn assign<G: Gateway + ?Sized>(
        &mut self,
        gateway: &G,
        association: &str,
        payloads: Vec<Payload>,
    ) -> Result<Vec<&Record>, Error> {
        if !MANAGED.iter().any(|name| *name == association) {
            return Err(Error::new(
                ErrorKind::InvalidPayload,
                ErrorOrigin::Campaign,
                format!("'{association}' is not an assignable campaign collection"),
            ));
        }

        let count = payloads.len();
        let handles = reconcile(gateway, &mut self.record, association, payloads)?;
        debug!(association, items = count, "campaign association assigned");

        let records = self.record.records(association);
        Ok(handles
            .into_iter()
            .filter_map(|handle| records.iter().find(|r| r.handle() == handle))
            .collect())
    }

    /// [`assign`](Self::assign) from a JSON object or array.
    pub fn assign_json<G: Gateway + ?Sized>(
        &mut self,
        gateway: &G,
        association: &str,
        json: &serde_json::Value,
    ) -> Result<Vec<&Record>, Error> {
        let payloads = Payload::from_json(json)?;

        self.assign(gateway, association, payloads)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[must_use]
    pub const fn record(&self) -> &Record {
        &self.record
    }

    pub const fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }

    #[must_use]
    pub const fn config(&self) -> &FormConfig {
        &self.config
    }

    #[must_use]
    pub fn id(&self) -> Option<RecordId> {
        self.record.id()
    }

    #[must_use]
    pub fn is_persisted(&self) -> bool {
        self.record.is_persisted()
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.record.name()
    }

    #[must_use]
    pub fn slug(&self) -> Option<&str> {
        self.record.get(SLUG_FIELD).as_text()
    }

    #[must_use]
    pub fn questions(&self) -> &[Record] {
        self.record.records("questions")
    }

    #[must_use]
    pub fn answers(&self) -> &[Record] {
        self.record.records("answers")
    }

    #[must_use]
    pub fn tags(&self) -> &[Record] {
        self.record.records("tags")
    }

    #[must_use]
    pub fn contents(&self) -> &[Record] {
        self.record.records("contents")
    }

    #[must_use]
    pub fn fields(&self) -> &[Record] {
        self.record.records("fields")
    }

    #[must_use]
    pub fn options(&self) -> &[Record] {
        self.record.records("options")
    }

    #[must_use]
    pub fn subscriptions(&self) -> &[Record] {
        self.record.records("subscriptions")
    }

    #[must_use]
    pub fn templates(&self) -> &[Record] {
        self.record.records(TEMPLATES)
    }

    /// First template, if any.
    #[must_use]
    pub fn template(&self) -> Option<&Record> {
        self.templates().first()
    }

    #[must_use]
    pub fn client(&self) -> Option<&Record> {
        self.record.records(CLIENT).first()
    }

    /// First record named `name` in one association.
    #[must_use]
    pub fn by_name(&self, association: &str, name: &str) -> Option<&Record> {
        by_name(self.record.records(association), name)
    }

    /// Fields whose `data_type` parses to `data_type`.
    #[must_use]
    pub fn fields_of_type(&self, data_type: &DataType) -> Vec<&Record> {
        self.fields()
            .iter()
            .filter(|field| DataType::parse(&field.get("data_type").to_text()) == *data_type)
            .collect()
    }

    /// Typed view of the dynamic form schema.
    #[must_use]
    pub fn schema(&self) -> Schema {
        Schema::from_records(self.questions(), self.fields())
    }

    /// Schema entries in question-then-field order.
    #[must_use]
    pub fn field_defs(&self) -> Vec<FieldDef> {
        let schema = self.schema();
        schema.questions.into_iter().chain(schema.fields).collect()
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    /// Validate the campaign and every loaded collection.
    pub fn validate(&mut self) -> Result<(), Error> {
        self.issues = collect_issues(&self.record)?;

        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(Error::new(
                ErrorKind::ValidationFailed(self.issues.clone()),
                ErrorOrigin::Campaign,
                "campaign validation failed",
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

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Validate, then write the campaign and its managed collections as one
    /// unit of work. Every collection is attempted and all failures are
    /// reported together; on failure the in-memory graph is left as it was.
    ///
    /// The slug is derived here, so stored campaigns always carry one.
    pub fn save<G: Gateway + ?Sized>(&mut self, gateway: &mut G) -> Result<(), Error> {
        self.validate()?;

        let before = self.record.clone();
        let limit = self.config.slug_suffix_limit;
        let result = unit_of_work(gateway, |gateway| -> Result<(), Error> {
            assign_slug(gateway, &mut self.record, limit)?;
            ensure_loaded(&*gateway, &mut self.record, TEMPLATES)?;
            inherit_client(&mut self.record)?;

            let mut failures = Vec::new();
            if let Err(err) = save_record(gateway, &mut self.record) {
                failures.extend(err.failures);
            }
            for name in MANAGED {
                if let Err(err) = save_association(gateway, &mut self.record, name) {
                    failures.extend(err.failures);
                }
            }

            if failures.is_empty() {
                Ok(())
            } else {
                Err(SaveError { failures }.into())
            }
        });

        if let Err(err) = result {
            self.record = before;
            return Err(err);
        }

        info!(
            campaign = %self.id().map_or_else(String::new, |id| id.to_string()),
            slug = self.slug().unwrap_or_default(),
            "campaign saved"
        );

        Ok(())
    }
}

// Unique slug from the name: `biggestfan`, then `biggestfan2`, `biggestfan3`...
fn assign_slug<G: Gateway + ?Sized>(
    gateway: &G,
    record: &mut Record,
    limit: u32,
) -> Result<(), Error> {
    if !record.get(SLUG_FIELD).is_blank() {
        return Ok(());
    }
    let Some(base) = record.name().map(slugify).filter(|s| !s.is_empty()) else {
        return Ok(());
    };

    let own_id = record.id();
    for n in 1..=limit.max(1) {
        let candidate = if n == 1 {
            base.clone()
        } else {
            format!("{base}{n}")
        };

        let taken = gateway
            .find_first_by(
                &catalog::CAMPAIGN,
                &Filter::new().eq(SLUG_FIELD, candidate.as_str()),
            )?
            .is_some_and(|other| other.id() != own_id);
        if !taken {
            record.set(SLUG_FIELD, candidate)?;
            return Ok(());
        }
    }

    Err(Error::new(
        ErrorKind::Internal,
        ErrorOrigin::Campaign,
        format!("no free slug for '{base}' within {limit} attempts"),
    ))
}

// A campaign without a client inherits its first template's client.
fn inherit_client(record: &mut Record) -> Result<(), Error> {
    if !record.get("client_id").is_null() {
        return Ok(());
    }

    let client_id = record
        .records(TEMPLATES)
        .first()
        .and_then(|template| RecordId::from_value(template.get("client_id")));

    if let Some(client_id) = client_id {
        record.set("client_id", client_id)?;
        debug!(client = %client_id, "campaign client inherited from template");
    }

    Ok(())
}

///
/// TESTS
///
