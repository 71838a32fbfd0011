//! Object store integration tests over the in-memory backend.
//!
//! - Construction: configuration rejection, stubbed client
//! - Versioning and blob layout
//! - Relocation between auditable and associated keys
//! - Delete removes empty blobs
//! - Repeated reads are identical
//! - Count and clear across blobs

use pretty_assertions::assert_eq;

use rewind_config::StorageOptions;
use rewind_core::{
    Actor, AuditAction, AuditContext, AuditRecord, AuditStore, Change, ChangeSet, Criteria,
    EntityRef, RecordUpdateBuilder, StorageMechanism, StoreError,
};
use rewind_lake::{KeyBase, KeyLayout, RewindLake};

fn lake() -> RewindLake {
    RewindLake::in_memory(KeyLayout::default().with_prefix("audits"))
}

fn company(id: i64) -> EntityRef {
    EntityRef::new("Company", id)
}

fn rename(subject: &EntityRef, old: &str, new: &str) -> AuditRecord {
    AuditRecord::new(
        subject,
        AuditAction::Update,
        ChangeSet::new().with("name", Change::updated(old, new)),
    )
}

fn stub_options() -> StorageOptions {
    StorageOptions {
        bucket: "audits".into(),
        access_key: "key".into(),
        secret_key: "secret".into(),
        stub_responses: true,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

#[test]
fn missing_credentials_are_rejected_even_when_stubbed() {
    let options = StorageOptions {
        access_key: String::new(),
        ..stub_options()
    };
    let err = RewindLake::from_options(&options).err().map(StoreError::from);
    assert!(
        matches!(err, Some(StoreError::Configuration(ref msg)) if msg.contains("access_key")),
        "{err:?}"
    );
}

#[tokio::test]
async fn stubbed_options_serve_from_memory() {
    let lake = RewindLake::from_options(&stub_options()).unwrap();
    assert!(lake.is_stubbed());
    assert_eq!(lake.mechanism(), StorageMechanism::ObjectStore);

    lake.create(rename(&company(1), "a", "b"), &AuditContext::new())
        .await
        .unwrap();
    assert_eq!(
        lake.keys().await.unwrap(),
        vec!["auditable_type_audits/company/1.audits"]
    );
}

#[test]
fn real_client_builds_without_network() {
    let options = StorageOptions {
        stub_responses: false,
        endpoint: "http://localhost:9000".into(),
        ..stub_options()
    };
    let lake = RewindLake::from_options(&options).unwrap();
    assert!(!lake.is_stubbed());
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn versions_are_gapless_and_blob_is_per_subject() {
    let lake = lake();
    let ctx = AuditContext::new().with_actor(Actor::Label("importer".into()));

    for i in 0..3 {
        let stored = lake
            .create(rename(&company(1), &i.to_string(), &(i + 1).to_string()), &ctx)
            .await
            .unwrap();
        assert_eq!(stored.version, i + 1);
        assert_eq!(stored.actor, Some(Actor::Label("importer".into())));
    }
    lake.create(rename(&company(2), "x", "y"), &ctx).await.unwrap();

    assert_eq!(
        lake.keys().await.unwrap(),
        vec![
            "audits/auditable_type_audits/company/1.audits",
            "audits/auditable_type_audits/company/2.audits",
        ]
    );
    let versions: Vec<u32> = lake
        .own_audits(&company(1), None)
        .await
        .unwrap()
        .iter()
        .map(|r| r.version)
        .collect();
    assert_eq!(versions, vec![1, 2, 3]);
}

#[tokio::test]
async fn partitioned_layout_writes_range_directory() {
    let lake = RewindLake::in_memory(KeyLayout::default().partitioned());
    lake.create(rename(&company(42), "a", "b"), &AuditContext::new())
        .await
        .unwrap();
    assert_eq!(
        lake.keys().await.unwrap(),
        vec!["auditable_type_audits/company/0_9999/42.audits"]
    );
}

#[tokio::test]
async fn own_audits_include_records_filed_under_parent() {
    let lake = lake();
    let ctx = AuditContext::new();
    let owner = company(7);
    let address = EntityRef::new("Address", 1);

    lake.create(rename(&address, "a", "b"), &ctx).await.unwrap();
    lake.create(rename(&address, "b", "c").with_associated(&owner), &ctx)
        .await
        .unwrap();
    lake.create(rename(&EntityRef::new("Address", 2), "q", "r").with_associated(&owner), &ctx)
        .await
        .unwrap();

    assert_eq!(lake.own_audits(&address, None).await.unwrap().len(), 1);
    assert_eq!(lake.own_audits(&address, Some(&owner)).await.unwrap().len(), 2);
    assert_eq!(lake.associated_audits(&owner).await.unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Modify and delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn associating_a_record_relocates_it() {
    let lake = lake();
    let owner = company(7);
    let address = EntityRef::new("Address", 1);
    let stored = lake
        .create(rename(&address, "a", "b"), &AuditContext::new())
        .await
        .unwrap();

    let update = RecordUpdateBuilder::new()
        .associated(Some(owner.clone()))
        .build();
    let moved = lake.update(&stored, &update).await.unwrap();

    assert_eq!(moved.version, stored.version);
    assert_eq!(moved.created_at, stored.created_at);

    let own_key = lake.layout().key_for(KeyBase::Auditable, &address);
    let parent_key = lake.layout().key_for(KeyBase::Associated, &owner);
    assert!(!lake.exists(&own_key).await.unwrap());
    assert_eq!(lake.read(&parent_key, None).await.unwrap(), vec![moved]);
}

#[tokio::test]
async fn in_place_update_rewrites_the_blob() {
    let lake = lake();
    let ctx = AuditContext::new();
    let first = lake.create(rename(&company(1), "a", "b"), &ctx).await.unwrap();
    let second = lake.create(rename(&company(1), "b", "c"), &ctx).await.unwrap();

    let update = RecordUpdateBuilder::new()
        .comment(Some("backfilled".into()))
        .build();
    let corrected = lake.update(&first, &update).await.unwrap();

    let records = lake.own_audits(&company(1), None).await.unwrap();
    assert_eq!(records, vec![corrected, second]);
}

#[tokio::test]
async fn deleting_the_last_record_removes_the_blob() {
    let lake = lake();
    let ctx = AuditContext::new();
    let first = lake.create(rename(&company(1), "a", "b"), &ctx).await.unwrap();
    let second = lake.create(rename(&company(1), "b", "c"), &ctx).await.unwrap();
    let key = lake.resolve_key(&first);

    lake.delete(&first).await.unwrap();
    assert!(lake.exists(&key).await.unwrap());

    lake.delete(&second).await.unwrap();
    assert!(!lake.exists(&key).await.unwrap());
}

#[tokio::test]
async fn modifying_an_unknown_record_fails() {
    let lake = lake();
    let ghost = rename(&company(1), "a", "b");
    let update = RecordUpdateBuilder::new().comment(Some("x".into())).build();

    assert!(matches!(
        lake.update(&ghost, &update).await,
        Err(StoreError::RecordNotFound { .. })
    ));
    assert!(matches!(
        lake.delete(&ghost).await,
        Err(StoreError::RecordNotFound { .. })
    ));
}

// ---------------------------------------------------------------------------
// Reads, count, clear
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reading_twice_is_identical() {
    let lake = lake();
    lake.create(rename(&company(1), "a", "b"), &AuditContext::new())
        .await
        .unwrap();
    let key = lake.layout().key_for(KeyBase::Auditable, &company(1));

    let first = lake.read(&key, None).await.unwrap();
    let second = lake.read(&key, None).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn count_scans_every_blob_and_clear_empties() {
    let lake = lake();
    let ctx = AuditContext::new();
    lake.create(
        AuditRecord::new(&company(1), AuditAction::Create, ChangeSet::new()),
        &ctx,
    )
    .await
    .unwrap();
    lake.create(rename(&company(1), "a", "b"), &ctx).await.unwrap();
    lake.create(rename(&company(2), "a", "b"), &ctx).await.unwrap();

    assert_eq!(lake.count(&Criteria::new()).await.unwrap(), 3);
    assert_eq!(
        lake.count(&Criteria::new().field("action", "update")).await.unwrap(),
        2
    );
    assert_eq!(
        lake.count(&Criteria::new().field("version", 1)).await.unwrap(),
        2
    );

    lake.destroy_all().await.unwrap();
    assert!(lake.keys().await.unwrap().is_empty());
    assert_eq!(lake.count(&Criteria::new()).await.unwrap(), 0);
}
