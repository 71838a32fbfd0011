//! Storage key layout.
//!
//! Every record lives in exactly one blob:
//!
//! ```text
//! {prefix}/auditable_type_audits/{type}[/{partition}]/{id}.audits
//! {prefix}/associated_type_audits/{type}[/{partition}]/{id}.audits
//! ```
//!
//! The associated form is used iff the record has an associated type. The
//! partition segment buckets ids into ranges of 10 000 (`0_9999`,
//! `10000_19999`, …) and is `?` for an entity without an id.

use rewind_config::StorageOptions;
use rewind_core::{AuditRecord, EntityRef};

const PARTITION_SIZE: i64 = 10_000;

/// Which directory a blob is filed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyBase {
    Auditable,
    Associated,
}

impl KeyBase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auditable => "auditable_type_audits",
            Self::Associated => "associated_type_audits",
        }
    }
}

/// Prefix and partitioning rules shared by every key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyLayout {
    pub prefix: String,
    pub partition: bool,
    pub unpartitioned_types: Vec<String>,
}

impl KeyLayout {
    #[must_use]
    pub fn from_options(options: &StorageOptions) -> Self {
        Self {
            prefix: options.key_prefix.trim_matches('/').to_string(),
            partition: options.partition,
            unpartitioned_types: options.unpartitioned_types.clone(),
        }
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into().trim_matches('/').to_string();
        self
    }

    #[must_use]
    pub const fn partitioned(mut self) -> Self {
        self.partition = true;
        self
    }

    fn partitions(&self, type_name: &str) -> bool {
        self.partition && !self.unpartitioned_types.iter().any(|t| t == type_name)
    }

    /// Key of the blob holding `record` as it is filed now.
    #[must_use]
    pub fn resolve_key(&self, record: &AuditRecord) -> String {
        match record.associated() {
            Some(associated) => self.key_for(KeyBase::Associated, &associated),
            None => self.key_for(KeyBase::Auditable, &record.subject()),
        }
    }

    /// Key of `entity`'s blob under `base`.
    #[must_use]
    pub fn key_for(&self, base: KeyBase, entity: &EntityRef) -> String {
        let mut segments = Vec::with_capacity(5);
        if !self.prefix.is_empty() {
            segments.push(self.prefix.clone());
        }
        segments.push(base.as_str().to_string());
        segments.push(underscore(&entity.entity_type));
        if self.partitions(&entity.entity_type) {
            segments.push(partition_segment(entity.id));
        }
        let id = entity.id.map(|id| id.to_string()).unwrap_or_default();
        segments.push(format!("{id}.audits"));
        segments.join("/")
    }

    /// Directory holding every blob of this layout.
    #[must_use]
    pub fn root(&self) -> &str {
        &self.prefix
    }
}

/// `start_end` range label for `id`.
#[must_use]
pub fn partition_segment(id: Option<i64>) -> String {
    id.map_or_else(
        || "?".to_string(),
        |id| {
            let start = id.div_euclid(PARTITION_SIZE) * PARTITION_SIZE;
            format!("{start}_{}", start + PARTITION_SIZE - 1)
        },
    )
}

/// Normalise a type name into a path: `Admin::UserProfile` -> `admin/user_profile`.
#[must_use]
pub fn underscore(type_name: &str) -> String {
    let chars: Vec<char> = type_name.replace("::", "/").chars().collect();
    let mut out = String::with_capacity(chars.len() + 4);

    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_ascii_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_ascii_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_ascii_uppercase() => next.is_some_and(|n| n.is_ascii_lowercase()),
                _ => false,
            };
            if boundary {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else if ch == '-' {
            out.push('_');
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rewind_core::{AuditAction, ChangeSet};
    use rstest::rstest;

    fn record_for(subject: &EntityRef) -> AuditRecord {
        AuditRecord::new(subject, AuditAction::Update, ChangeSet::new())
    }

    #[rstest]
    #[case("Company", "company")]
    #[case("UserProfile", "user_profile")]
    #[case("Admin::UserProfile", "admin/user_profile")]
    #[case("HTMLParser", "html_parser")]
    #[case("Version2Thing", "version2_thing")]
    fn underscores_type_names(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(underscore(input), expected);
    }

    #[rstest]
    #[case(Some(42), "0_9999")]
    #[case(Some(9999), "0_9999")]
    #[case(Some(10_005), "10000_19999")]
    #[case(None, "?")]
    fn partition_ranges(#[case] id: Option<i64>, #[case] expected: &str) {
        assert_eq!(partition_segment(id), expected);
    }

    #[test]
    fn unassociated_record_uses_auditable_key() {
        let layout = KeyLayout::default();
        let key = layout.resolve_key(&record_for(&EntityRef::new("Company", 42)));
        assert_eq!(key, "auditable_type_audits/company/42.audits");
    }

    #[test]
    fn associated_record_uses_associated_key() {
        let layout = KeyLayout::default().with_prefix("audits/production/");
        let record =
            record_for(&EntityRef::new("Address", 1)).with_associated(&EntityRef::new("Company", 7));
        assert_eq!(
            layout.resolve_key(&record),
            "audits/production/associated_type_audits/company/7.audits"
        );
    }

    #[test]
    fn partitioned_keys_and_opt_out() {
        let layout = KeyLayout {
            unpartitioned_types: vec!["Setting".into()],
            ..KeyLayout::default().partitioned()
        };
        assert_eq!(
            layout.key_for(KeyBase::Auditable, &EntityRef::new("Company", 10_005)),
            "auditable_type_audits/company/10000_19999/10005.audits"
        );
        assert_eq!(
            layout.key_for(KeyBase::Auditable, &EntityRef::new("Setting", 10_005)),
            "auditable_type_audits/setting/10005.audits"
        );
        assert_eq!(
            layout.key_for(KeyBase::Auditable, &EntityRef::unsaved("Company")),
            "auditable_type_audits/company/?/.audits"
        );
    }

    #[test]
    fn layout_reads_storage_options() {
        let options = StorageOptions {
            key_prefix: "/tenant-a/".into(),
            partition: true,
            ..Default::default()
        };
        let layout = KeyLayout::from_options(&options);
        assert_eq!(layout.root(), "tenant-a");
        assert!(layout.partition);
    }
}
