use crate::{campaign::CampaignFacade, config::FormConfig};
use fanform_core::db::MemoryStore;
use serde_json::json;

/// Campaign payload with one long-answer question, an email field and a
/// mandatory checkbox.
pub(crate) fn journey_payload() -> serde_json::Value {
    json!({
        "campaign": {"name": "Biggest Fan"},
        "questions": [
            {"name": "Why do you love us?", "data_type": "LongText", "mandatory": true}
        ],
        "fields": [
            {"name": "Email", "data_type": "Email", "mandatory": true},
            {"name": "Subscribe", "data_type": "CheckBox", "mandatory": true}
        ]
    })
}

/// Stored journey campaign.
pub(crate) fn journey_campaign(store: &mut MemoryStore) -> CampaignFacade {
    CampaignFacade::create_json(store, &journey_payload(), FormConfig::default())
        .expect("campaign create should succeed")
}
