//! Audit record repository.
//!
//! Implements [`AuditStore`] over the `audits` table plus scoped reads for
//! callers that want the database to do the filtering.

use async_trait::async_trait;
use rewind_core::{
    AuditContext, AuditRecord, AuditStore, Criteria, EntityRef, RecordUpdate, StorageMechanism,
    StoreError, timestamp,
};

use crate::RewindDb;
use crate::error::DatabaseError;
use crate::helpers::{actor_columns, encode_changes, row_to_record};
use crate::repos::criteria::criteria_to_sql;
use crate::scope::{AuditScope, opt_integer, opt_text};

impl RewindDb {
    /// Records matching `scope`, in the scope's version order.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or a row cannot be parsed.
    pub async fn scoped(&self, scope: &AuditScope) -> Result<Vec<AuditRecord>, DatabaseError> {
        let (sql, params) = scope.to_sql();
        let mut rows = self
            .conn
            .query(&sql, libsql::params_from_iter(params))
            .await?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(row_to_record(&row)?);
        }
        Ok(records)
    }

    /// Insert `record`, assigning the next version of its subject.
    ///
    /// `max(version)` and the insert run as one `INSERT … SELECT`, so they
    /// share the statement's implicit transaction. A second process racing on
    /// the same subject trips the unique index instead.
    async fn insert_next_version(&self, record: &AuditRecord) -> Result<(i64, u32), DatabaseError> {
        let (actor_type, actor_id, actor_label) = actor_columns(record.actor.as_ref());
        let created_at = record
            .created_at
            .map(|ts| timestamp::format(&ts))
            .ok_or_else(|| DatabaseError::Query("record has no created_at".into()))?;

        let params = vec![
            libsql::Value::Text(record.subject_type.clone()),
            opt_integer(record.subject_id),
            opt_text(record.associated_type.as_deref()),
            opt_integer(record.associated_id),
            opt_text(actor_type.as_deref()),
            opt_integer(actor_id),
            opt_text(actor_label.as_deref()),
            libsql::Value::Text(record.action.as_str().to_string()),
            libsql::Value::Text(encode_changes(&record.changes)?),
            opt_text(record.comment.as_deref()),
            opt_text(record.correlation_id.as_deref()),
            opt_text(record.origin_address.as_deref()),
            libsql::Value::Text(created_at),
        ];

        let mut rows = self
            .conn
            .query(
                "INSERT INTO audits (subject_type, subject_id, associated_type, associated_id,
                     actor_type, actor_id, actor_label, action, changes, comment, version,
                     correlation_id, origin_address, created_at)
                 SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, COALESCE(MAX(version), 0) + 1,
                     ?11, ?12, ?13
                 FROM audits WHERE subject_type = ?1 AND subject_id IS ?2
                 RETURNING id, version",
                libsql::params_from_iter(params),
            )
            .await?;

        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let version = row.get::<i64>(1)?;
        Ok((
            row.get::<i64>(0)?,
            u32::try_from(version)
                .map_err(|_| DatabaseError::Query(format!("Invalid version {version}")))?,
        ))
    }

    async fn rewrite_row(&self, id: i64, record: &AuditRecord) -> Result<u64, DatabaseError> {
        let (actor_type, actor_id, actor_label) = actor_columns(record.actor.as_ref());
        let params = vec![
            opt_text(record.associated_type.as_deref()),
            opt_integer(record.associated_id),
            opt_text(actor_type.as_deref()),
            opt_integer(actor_id),
            opt_text(actor_label.as_deref()),
            libsql::Value::Text(record.action.as_str().to_string()),
            libsql::Value::Text(encode_changes(&record.changes)?),
            opt_text(record.comment.as_deref()),
            opt_text(record.correlation_id.as_deref()),
            opt_text(record.origin_address.as_deref()),
            libsql::Value::Integer(id),
        ];

        Ok(self
            .conn
            .execute(
                "UPDATE audits SET associated_type = ?1, associated_id = ?2,
                     actor_type = ?3, actor_id = ?4, actor_label = ?5, action = ?6,
                     changes = ?7, comment = ?8, correlation_id = ?9, origin_address = ?10
                 WHERE id = ?11",
                libsql::params_from_iter(params),
            )
            .await?)
    }
}

fn row_key(record: &AuditRecord) -> String {
    record.id.map_or_else(
        || format!("audits/{}", record.subject()),
        |id| format!("audits#{id}"),
    )
}

#[async_trait]
impl AuditStore for RewindDb {
    async fn create(
        &self,
        mut record: AuditRecord,
        ctx: &AuditContext,
    ) -> Result<AuditRecord, StoreError> {
        record.stamp(ctx);

        match self.insert_next_version(&record).await {
            Ok((id, version)) => {
                record.id = Some(id);
                record.version = version;
                tracing::debug!(subject = %record.subject(), version, "audit row inserted");
                Ok(record)
            }
            Err(e) if e.is_unique_violation() => {
                tracing::warn!(subject = %record.subject(), "version taken by a concurrent writer");
                let taken = self
                    .scoped(&AuditScope::subject(&record.subject()).descending().limit(1))
                    .await?
                    .first()
                    .map_or(1, |last| last.version);
                Err(StoreError::VersionConflict {
                    subject_type: record.subject_type,
                    subject_id: record.subject_id,
                    version: taken,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update(
        &self,
        record: &AuditRecord,
        update: &RecordUpdate,
    ) -> Result<AuditRecord, StoreError> {
        let id = record.id.ok_or_else(|| StoreError::RecordNotFound {
            key: row_key(record),
        })?;

        let mut updated = record.clone();
        update.apply_to(&mut updated);
        if self.rewrite_row(id, &updated).await? == 0 {
            return Err(StoreError::RecordNotFound {
                key: row_key(record),
            });
        }
        Ok(updated)
    }

    async fn delete(&self, record: &AuditRecord) -> Result<(), StoreError> {
        let id = record.id.ok_or_else(|| StoreError::RecordNotFound {
            key: row_key(record),
        })?;

        let affected = self
            .conn
            .execute("DELETE FROM audits WHERE id = ?1", [id])
            .await
            .map_err(DatabaseError::from)?;
        if affected == 0 {
            return Err(StoreError::RecordNotFound {
                key: row_key(record),
            });
        }
        Ok(())
    }

    async fn destroy_all(&self) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM audits", ())
            .await
            .map_err(DatabaseError::from)?;
        Ok(())
    }

    async fn count(&self, criteria: &Criteria) -> Result<usize, StoreError> {
        let Some((conditions, params)) = criteria_to_sql(criteria)? else {
            return Ok(0);
        };
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let mut rows = self
            .conn
            .query(
                &format!("SELECT COUNT(*) FROM audits{where_clause}"),
                libsql::params_from_iter(params),
            )
            .await
            .map_err(DatabaseError::from)?;
        let row = rows
            .next()
            .await
            .map_err(DatabaseError::from)?
            .ok_or(DatabaseError::NoResult)?;
        let count = row.get::<i64>(0).map_err(DatabaseError::from)?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    async fn own_audits(
        &self,
        subject: &EntityRef,
        _filed_under: Option<&EntityRef>,
    ) -> Result<Vec<AuditRecord>, StoreError> {
        // Rows carry their subject columns wherever they are filed.
        Ok(self.scoped(&AuditScope::subject(subject)).await?)
    }

    async fn associated_audits(
        &self,
        entity: &EntityRef,
    ) -> Result<Vec<AuditRecord>, StoreError> {
        Ok(self.scoped(&AuditScope::associated(entity)).await?)
    }

    fn mechanism(&self) -> StorageMechanism {
        StorageMechanism::Relational
    }
}
