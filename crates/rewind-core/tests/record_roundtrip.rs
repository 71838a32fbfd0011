//! Serde roundtrip and JsonSchema validation tests for audit records.

use pretty_assertions::assert_eq;
use schemars::schema_for;
use serde_json::json;

use rewind_core::changes::{AuditedChanges, Change, ChangeSet};
use rewind_core::entities::{Actor, AuditRecord, EntityRef};
use rewind_core::enums::AuditAction;
use rewind_core::timestamp;

fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

macro_rules! roundtrip_and_validate {
    ($name:ident, $instance:expr) => {
        #[test]
        fn $name() {
            let record: AuditRecord = $instance;

            let json_str = serde_json::to_string_pretty(&record).unwrap();
            let recovered: AuditRecord = serde_json::from_str(&json_str).unwrap();
            assert_eq!(recovered, record, "serde roundtrip failed");

            let schema = serde_json::to_value(schema_for!(AuditRecord)).unwrap();
            let instance = serde_json::to_value(&record).unwrap();
            let errors = validate_against_schema(&schema, &instance);
            assert!(errors.is_empty(), "Schema validation failed: {errors:?}");
        }
    };
}

fn written(mut record: AuditRecord, version: u32) -> AuditRecord {
    record.version = version;
    record.created_at = Some(timestamp::parse("2026-02-08 12:00:00").unwrap());
    record.correlation_id = Some("2f1d8e1c-5d0b-4a57-9d43-3a0c5f7e8b10".into());
    record
}

roundtrip_and_validate!(
    create_record_roundtrip,
    written(
        AuditRecord::new(
            &EntityRef::new("Company", 42),
            AuditAction::Create,
            ChangeSet::new()
                .with("name", Change::created("W"))
                .with("employees", Change::created(12)),
        )
        .with_actor(Actor::Entity(EntityRef::new("User", 1))),
        1,
    )
);

roundtrip_and_validate!(
    associated_update_roundtrip,
    written(
        AuditRecord::new(
            &EntityRef::new("Admin::Address", 9),
            AuditAction::Update,
            ChangeSet::new().with("street", Change::updated("Main", "High")),
        )
        .with_associated(&EntityRef::new("Company", 42))
        .with_comment("moved office")
        .with_actor(Actor::Label("import-job".into())),
        3,
    )
);

roundtrip_and_validate!(
    destroy_record_roundtrip,
    written(
        AuditRecord::new(
            &EntityRef::new("Company", 42),
            AuditAction::Destroy,
            ChangeSet::new().with("name", Change::destroyed("WW")),
        ),
        4,
    )
);

roundtrip_and_validate!(
    custom_action_roundtrip,
    written(
        AuditRecord::new(
            &EntityRef::new("Company", 42),
            AuditAction::Custom("exported".into()),
            ChangeSet::new(),
        ),
        5,
    )
);

#[test]
fn encoded_changes_survive_roundtrip_verbatim() {
    let mut record = written(
        AuditRecord::new(&EntityRef::new("Company", 1), AuditAction::Update, ChangeSet::new()),
        2,
    );
    record.changes = AuditedChanges::Encoded(r#"{"name":["a","b"]}"#.into());

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["changes"], json!(r#"{"name":["a","b"]}"#));

    let back: AuditRecord = serde_json::from_value(json).unwrap();
    assert_eq!(back, record);
    assert_eq!(
        back.new_attributes().unwrap().get("name"),
        Some(&json!("b"))
    );
}

#[test]
fn minimal_legacy_record_deserializes_with_defaults() {
    let legacy = json!({
        "subject_type": "Company",
        "subject_id": 3,
        "action": "create",
        "version": 1,
        "created_at": "2019-05-01 08:00:00"
    });
    let record: AuditRecord = serde_json::from_value(legacy).unwrap();
    assert_eq!(record.associated(), None);
    assert_eq!(record.actor, None);
    assert!(record.changes.decode().unwrap().is_empty());
    assert_eq!(
        record.created_at,
        Some(timestamp::parse("2019-05-01T08:00:00Z").unwrap())
    );
}
