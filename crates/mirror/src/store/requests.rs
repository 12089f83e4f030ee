//! Transfer request registry table

use landchain_ledger::{ApprovalRole, Ledger, RequestStatus};
use sea_orm::{ConnectionTrait, DatabaseBackend, QueryResult, SqlErr, Statement};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{MirrorError, MirrorResult};
use crate::records::TransferRequestRecord;
use crate::store::{MirrorDb, TableKind};

const COLUMNS: &str = r#"
    request_id BIGINT PRIMARY KEY,
    plot_id BIGINT NOT NULL,
    is_plot_transfer BOOLEAN NOT NULL,
    land_authority_approved BOOLEAN NOT NULL DEFAULT FALSE,
    lawyer_approved BOOLEAN NOT NULL DEFAULT FALSE,
    bank_approved BOOLEAN NOT NULL DEFAULT FALSE,
    current_status VARCHAR(16) NOT NULL DEFAULT 'PENDING',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
"#;

const SELECT_COLUMNS: &str = "request_id, plot_id, is_plot_transfer, \
     land_authority_approved, lawyer_approved, bank_approved, current_status";

/// Handle for the `transfer_request_registry` table.
#[derive(Clone)]
pub struct RequestTable {
    db: MirrorDb,
    pub(crate) ledger: Arc<dyn Ledger>,
}

impl RequestTable {
    pub fn new(db: MirrorDb, ledger: Arc<dyn Ledger>) -> Self {
        Self { db, ledger }
    }

    pub async fn exists(&self) -> MirrorResult<bool> {
        self.db.table_exists(TableKind::Request.table_name()).await
    }

    pub async fn ensure_schema(&self) -> MirrorResult<()> {
        self.db
            .create_table(TableKind::Request.table_name(), COLUMNS)
            .await
    }

    pub async fn row_count(&self) -> MirrorResult<u64> {
        self.db.row_count(TableKind::Request.table_name()).await
    }

    /// Drop the table. Returns false when it did not exist.
    pub async fn drop_table(&self) -> MirrorResult<bool> {
        self.db.drop_table(TableKind::Request.table_name()).await
    }

    /// Insert a fresh request row. A duplicate request id means the row is
    /// already mirrored (resync raced the write-through); the duplicate is
    /// swallowed and `Ok(None)` returned.
    pub async fn insert_one(
        &self,
        record: &TransferRequestRecord,
    ) -> MirrorResult<Option<TransferRequestRecord>> {
        let stmt = Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            &format!(
                "INSERT INTO transfer_request_registry \
                 (request_id, plot_id, is_plot_transfer, \
                  land_authority_approved, lawyer_approved, bank_approved, \
                  current_status) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) \
                 RETURNING {}",
                SELECT_COLUMNS
            ),
            [
                record.request_id.into(),
                record.plot_id.into(),
                record.is_plot_transfer.into(),
                record.land_authority_approved.into(),
                record.lawyer_approved.into(),
                record.bank_approved.into(),
                record.current_status.as_str().into(),
            ],
        );

        match self.db.connection().query_one(stmt).await {
            Ok(Some(row)) => {
                debug!("Inserted transfer request row {}", record.request_id);
                map_row(&row).map(Some)
            }
            Ok(None) => Err(MirrorError::not_found("transfer request", record.request_id)),
            Err(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    warn!(
                        "Transfer request {} already mirrored, skipping insert",
                        record.request_id
                    );
                    Ok(None)
                }
                _ => Err(MirrorError::Database(e)),
            },
        }
    }

    /// Look up a request by id.
    pub async fn find(&self, request_id: i64) -> MirrorResult<Option<TransferRequestRecord>> {
        let stmt = Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            &format!(
                "SELECT {} FROM transfer_request_registry WHERE request_id = $1",
                SELECT_COLUMNS
            ),
            [request_id.into()],
        );
        let row = self.db.connection().query_one(stmt).await?;
        row.as_ref().map(map_row).transpose()
    }

    /// Flip one role's approval flag to true and recompute the aggregate
    /// status in the same statement.
    ///
    /// SET expressions in Postgres see pre-update column values, so the
    /// approved role's column is inlined as TRUE in the status CASE rather
    /// than read back.
    pub async fn apply_approval(
        &self,
        request_id: i64,
        role: ApprovalRole,
    ) -> MirrorResult<TransferRequestRecord> {
        let (role_col, other_a, other_b) = match role {
            ApprovalRole::LandAuthority => {
                ("land_authority_approved", "lawyer_approved", "bank_approved")
            }
            ApprovalRole::Bank => {
                ("bank_approved", "land_authority_approved", "lawyer_approved")
            }
            ApprovalRole::Lawyer => {
                ("lawyer_approved", "land_authority_approved", "bank_approved")
            }
        };

        let stmt = Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            &format!(
                "UPDATE transfer_request_registry \
                 SET {role_col} = TRUE, \
                     current_status = CASE \
                         WHEN {other_a} AND {other_b} THEN 'COMPLETED' \
                         ELSE 'IN_PROGRESS' \
                     END \
                 WHERE request_id = $1 \
                 RETURNING {SELECT_COLUMNS}"
            ),
            [request_id.into()],
        );

        let row = self
            .db
            .connection()
            .query_one(stmt)
            .await?
            .ok_or_else(|| MirrorError::not_found("transfer request", request_id))?;

        debug!("Applied {} approval to request {}", role, request_id);
        map_row(&row)
    }

    /// Bulk upsert used only by full resync.
    pub async fn upsert_from_ledger(&self, records: &[TransferRequestRecord]) -> MirrorResult<()> {
        for record in records {
            let stmt = Statement::from_sql_and_values(
                DatabaseBackend::Postgres,
                "INSERT INTO transfer_request_registry \
                 (request_id, plot_id, is_plot_transfer, \
                  land_authority_approved, lawyer_approved, bank_approved, \
                  current_status) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) \
                 ON CONFLICT (request_id) DO UPDATE SET \
                   plot_id = EXCLUDED.plot_id, \
                   is_plot_transfer = EXCLUDED.is_plot_transfer, \
                   land_authority_approved = EXCLUDED.land_authority_approved, \
                   lawyer_approved = EXCLUDED.lawyer_approved, \
                   bank_approved = EXCLUDED.bank_approved, \
                   current_status = EXCLUDED.current_status",
                [
                    record.request_id.into(),
                    record.plot_id.into(),
                    record.is_plot_transfer.into(),
                    record.land_authority_approved.into(),
                    record.lawyer_approved.into(),
                    record.bank_approved.into(),
                    record.current_status.as_str().into(),
                ],
            );
            self.db.connection().execute(stmt).await?;
        }
        Ok(())
    }

    /// All rows ordered by request id.
    pub async fn fetch_all(&self) -> MirrorResult<Vec<TransferRequestRecord>> {
        let stmt = Statement::from_string(
            DatabaseBackend::Postgres,
            format!(
                "SELECT {} FROM transfer_request_registry ORDER BY request_id ASC",
                SELECT_COLUMNS
            ),
        );
        let rows = self.db.connection().query_all(stmt).await?;
        rows.iter().map(map_row).collect()
    }
}

fn map_row(row: &QueryResult) -> MirrorResult<TransferRequestRecord> {
    let status: String = row.try_get("", "current_status")?;
    Ok(TransferRequestRecord {
        request_id: row.try_get("", "request_id")?,
        plot_id: row.try_get("", "plot_id")?,
        is_plot_transfer: row.try_get("", "is_plot_transfer")?,
        land_authority_approved: row.try_get("", "land_authority_approved")?,
        lawyer_approved: row.try_get("", "lawyer_approved")?,
        bank_approved: row.try_get("", "bank_approved")?,
        current_status: RequestStatus::parse(&status),
    })
}
