//! Model-level record validation.
//!
//! Rules come from the static entity model only: `required` fields must be
//! present and `Email` fields must be well formed when set. Records are
//! visited together with every loaded association, so a campaign graph is
//! validated in one pass with issues keyed by path (`fields[2].name`).

use crate::{
    model::FieldKind,
    record::Record,
    validator::{EmailFormat, Presence, Validator},
    visitor::{
        Issues, PathSegment, ScopedContext, VisitorAdapter, VisitorContext,
        perform_visit,
        validate::{ValidateError, ValidateVisitor},
    },
};

///
/// validate_record
/// Validate a record graph, failing with every issue found.
///

pub fn validate_record(record: &Record) -> Result<(), ValidateError> {
    let issues = collect_issues(record)?;

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidateError::ValidationFailed(issues))
    }
}

/// Walk a record graph and return its issues without failing.
pub fn collect_issues(record: &Record) -> Result<Issues, ValidateError> {
    let mut adapter = VisitorAdapter::new(ValidateVisitor::new());
    perform_visit(&mut adapter, record, PathSegment::Empty);

    adapter.finish()
}

/// Apply the model-level field rules of one record.
pub fn validate_fields(record: &Record, ctx: &mut dyn VisitorContext) {
    for field in record.model().fields {
        let value = record.get(field.name);
        let mut scoped = ScopedContext::new(ctx, PathSegment::from(field.name));

        if field.required {
            Presence::new().validate(value, &mut scoped);
        }
        if matches!(field.kind, FieldKind::Email) {
            EmailFormat::new().validate(value, &mut scoped);
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{model::catalog, record::Record};

    #[test]
    fn required_fields_report_by_name() {
        let record = Record::new(&catalog::CAMPAIGN);
        let err = validate_record(&record).expect_err("nameless campaign should fail");

        let issues = err.issues();
        assert_eq!(issues.at("name"), ["can't be blank"]);
        assert_eq!(issues.count(), 1);
    }

    #[test]
    fn nested_issues_carry_their_path() {
        let mut campaign = Record::new(&catalog::CAMPAIGN);
        campaign.set("name", "Biggest Fan").expect("set should succeed");

        let fields = campaign
            .association_mut("fields")
            .expect("fields association should exist");
        let mut good = Record::new(&catalog::FIELD);
        good.set("name", "Email").expect("set should succeed");
        fields.attach(good);
        fields.attach(Record::new(&catalog::FIELD));

        let issues = collect_issues(&campaign).expect("visit should succeed");
        assert_eq!(issues.at("fields[1].name"), ["can't be blank"]);
        assert_eq!(issues.count(), 1);
    }

    #[test]
    fn email_kind_checks_format_only_when_set() {
        let mut consumer = Record::new(&catalog::CONSUMER);
        validate_record(&consumer).expect("empty consumer should pass");

        consumer.set("email", "nope").expect("set should succeed");
        let issues = collect_issues(&consumer).expect("visit should succeed");
        assert_eq!(issues.at("email").len(), 1);
    }
}
