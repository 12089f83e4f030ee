//! Land parcel registry table

use landchain_ledger::Ledger;
use sea_orm::{ConnectionTrait, DatabaseBackend, QueryResult, SqlErr, Statement};
use std::sync::Arc;
use tracing::debug;

use crate::error::{MirrorError, MirrorResult};
use crate::records::LandParcelRecord;
use crate::store::{MirrorDb, TableKind};

const COLUMNS: &str = r#"
    token_id BIGINT PRIMARY KEY,
    parcel_name VARCHAR(255) NOT NULL,
    block_name VARCHAR(255) NOT NULL,
    total_supply TEXT NOT NULL,
    metadata_uri TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
"#;

const SELECT_COLUMNS: &str = "token_id, parcel_name, block_name, total_supply, metadata_uri";

/// Handle for the `land_parcel_registry` table.
#[derive(Clone)]
pub struct LandTable {
    db: MirrorDb,
    pub(crate) ledger: Arc<dyn Ledger>,
}

impl LandTable {
    pub fn new(db: MirrorDb, ledger: Arc<dyn Ledger>) -> Self {
        Self { db, ledger }
    }

    pub async fn exists(&self) -> MirrorResult<bool> {
        self.db.table_exists(TableKind::Land.table_name()).await
    }

    pub async fn ensure_schema(&self) -> MirrorResult<()> {
        self.db
            .create_table(TableKind::Land.table_name(), COLUMNS)
            .await
    }

    pub async fn row_count(&self) -> MirrorResult<u64> {
        self.db.row_count(TableKind::Land.table_name()).await
    }

    /// Drop the table. Returns false when it did not exist.
    pub async fn drop_table(&self) -> MirrorResult<bool> {
        self.db.drop_table(TableKind::Land.table_name()).await
    }

    /// Insert a single row. A primary-key collision surfaces as
    /// `DuplicateKey`.
    pub async fn insert_one(&self, record: &LandParcelRecord) -> MirrorResult<LandParcelRecord> {
        let stmt = Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            &format!(
                "INSERT INTO land_parcel_registry \
                 (token_id, parcel_name, block_name, total_supply, metadata_uri) \
                 VALUES ($1, $2, $3, $4, $5) \
                 RETURNING {}",
                SELECT_COLUMNS
            ),
            [
                record.token_id.into(),
                record.parcel_name.clone().into(),
                record.block_name.clone().into(),
                record.total_supply.clone().into(),
                record.metadata_uri.clone().into(),
            ],
        );

        let row = self
            .db
            .connection()
            .query_one(stmt)
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => MirrorError::DuplicateKey {
                    table: TableKind::Land.table_name().to_string(),
                    id: record.token_id,
                },
                _ => MirrorError::Database(e),
            })?
            .ok_or_else(|| MirrorError::not_found("land parcel", record.token_id))?;

        debug!("Inserted land parcel row for token {}", record.token_id);
        map_row(&row)
    }

    /// Bulk upsert used only by full resync. Each row is an independent
    /// statement; conflicts on the primary key overwrite all non-key
    /// columns.
    pub async fn upsert_from_ledger(&self, records: &[LandParcelRecord]) -> MirrorResult<()> {
        for record in records {
            let stmt = Statement::from_sql_and_values(
                DatabaseBackend::Postgres,
                "INSERT INTO land_parcel_registry \
                 (token_id, parcel_name, block_name, total_supply, metadata_uri) \
                 VALUES ($1, $2, $3, $4, $5) \
                 ON CONFLICT (token_id) DO UPDATE SET \
                   parcel_name = EXCLUDED.parcel_name, \
                   block_name = EXCLUDED.block_name, \
                   total_supply = EXCLUDED.total_supply, \
                   metadata_uri = EXCLUDED.metadata_uri",
                [
                    record.token_id.into(),
                    record.parcel_name.clone().into(),
                    record.block_name.clone().into(),
                    record.total_supply.clone().into(),
                    record.metadata_uri.clone().into(),
                ],
            );
            self.db.connection().execute(stmt).await?;
        }
        Ok(())
    }

    /// All rows ordered by token id.
    pub async fn fetch_all(&self) -> MirrorResult<Vec<LandParcelRecord>> {
        let stmt = Statement::from_string(
            DatabaseBackend::Postgres,
            format!(
                "SELECT {} FROM land_parcel_registry ORDER BY token_id ASC",
                SELECT_COLUMNS
            ),
        );
        let rows = self.db.connection().query_all(stmt).await?;
        rows.iter().map(map_row).collect()
    }

    /// Look up a parcel by its block and parcel names.
    pub async fn find_by_names(
        &self,
        block_name: &str,
        parcel_name: &str,
    ) -> MirrorResult<Option<LandParcelRecord>> {
        let stmt = Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            &format!(
                "SELECT {} FROM land_parcel_registry \
                 WHERE block_name = $1 AND parcel_name = $2",
                SELECT_COLUMNS
            ),
            [block_name.into(), parcel_name.into()],
        );
        let row = self.db.connection().query_one(stmt).await?;
        row.as_ref().map(map_row).transpose()
    }
}

fn map_row(row: &QueryResult) -> MirrorResult<LandParcelRecord> {
    Ok(LandParcelRecord {
        token_id: row.try_get("", "token_id")?,
        parcel_name: row.try_get("", "parcel_name")?,
        block_name: row.try_get("", "block_name")?,
        total_supply: row.try_get("", "total_supply")?,
        metadata_uri: row.try_get("", "metadata_uri")?,
    })
}
