//! Plot registry table

use landchain_ledger::Ledger;
use sea_orm::{ConnectionTrait, DatabaseBackend, QueryResult, SqlErr, Statement};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{MirrorError, MirrorResult};
use crate::records::PlotRecord;
use crate::store::{MirrorDb, TableKind};

const COLUMNS: &str = r#"
    plot_id BIGINT PRIMARY KEY,
    plot_name VARCHAR(255) NOT NULL UNIQUE,
    current_holder VARCHAR(255) NOT NULL,
    parcel_ids BIGINT[] NOT NULL,
    parcel_amounts BIGINT[] NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
"#;

const SELECT_COLUMNS: &str = "plot_id, plot_name, current_holder, parcel_ids, parcel_amounts";

/// Handle for the `plot_registry` table.
#[derive(Clone)]
pub struct PlotTable {
    db: MirrorDb,
    pub(crate) ledger: Arc<dyn Ledger>,
}

impl PlotTable {
    pub fn new(db: MirrorDb, ledger: Arc<dyn Ledger>) -> Self {
        Self { db, ledger }
    }

    pub async fn exists(&self) -> MirrorResult<bool> {
        self.db.table_exists(TableKind::Plot.table_name()).await
    }

    /// Create the table if absent. An existing table missing the
    /// `parcel_amounts` column (schema drift from an older layout) is
    /// dropped and recreated - the mirror is rebuildable from the ledger,
    /// so the data loss is accepted.
    pub async fn ensure_schema(&self) -> MirrorResult<()> {
        let table = TableKind::Plot.table_name();
        if self.db.table_exists(table).await?
            && !self.db.column_exists(table, "parcel_amounts").await?
        {
            warn!("Plot table schema drift detected, dropping and recreating '{}'", table);
            self.db.drop_table(table).await?;
        }
        self.db.create_table(table, COLUMNS).await
    }

    pub async fn row_count(&self) -> MirrorResult<u64> {
        self.db.row_count(TableKind::Plot.table_name()).await
    }

    /// Drop the table. Returns false when it did not exist.
    pub async fn drop_table(&self) -> MirrorResult<bool> {
        self.db.drop_table(TableKind::Plot.table_name()).await
    }

    /// Insert a single row. A collision on the plot id or the unique plot
    /// name surfaces as `DuplicateKey`.
    pub async fn insert_one(&self, record: &PlotRecord) -> MirrorResult<PlotRecord> {
        if record.parcel_ids.len() != record.parcel_amounts.len() {
            return Err(MirrorError::invalid_input(
                "parcel_amounts",
                "parcel_ids and parcel_amounts must be the same length",
            ));
        }

        let stmt = Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            &format!(
                "INSERT INTO plot_registry \
                 (plot_id, plot_name, current_holder, parcel_ids, parcel_amounts) \
                 VALUES ($1, $2, $3, $4, $5) \
                 RETURNING {}",
                SELECT_COLUMNS
            ),
            [
                record.plot_id.into(),
                record.plot_name.clone().into(),
                record.current_holder.clone().into(),
                record.parcel_ids.clone().into(),
                record.parcel_amounts.clone().into(),
            ],
        );

        let row = self
            .db
            .connection()
            .query_one(stmt)
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => MirrorError::DuplicateKey {
                    table: TableKind::Plot.table_name().to_string(),
                    id: record.plot_id,
                },
                _ => MirrorError::Database(e),
            })?
            .ok_or_else(|| MirrorError::not_found("plot", record.plot_id))?;

        debug!("Inserted plot row {} ('{}')", record.plot_id, record.plot_name);
        map_row(&row)
    }

    /// Bulk upsert used only by full resync.
    pub async fn upsert_from_ledger(&self, records: &[PlotRecord]) -> MirrorResult<()> {
        for record in records {
            let stmt = Statement::from_sql_and_values(
                DatabaseBackend::Postgres,
                "INSERT INTO plot_registry \
                 (plot_id, plot_name, current_holder, parcel_ids, parcel_amounts) \
                 VALUES ($1, $2, $3, $4, $5) \
                 ON CONFLICT (plot_id) DO UPDATE SET \
                   plot_name = EXCLUDED.plot_name, \
                   current_holder = EXCLUDED.current_holder, \
                   parcel_ids = EXCLUDED.parcel_ids, \
                   parcel_amounts = EXCLUDED.parcel_amounts",
                [
                    record.plot_id.into(),
                    record.plot_name.clone().into(),
                    record.current_holder.clone().into(),
                    record.parcel_ids.clone().into(),
                    record.parcel_amounts.clone().into(),
                ],
            );
            self.db.connection().execute(stmt).await?;
        }
        Ok(())
    }

    /// Update the holder of a plot. Fails with `NotFound` when no row
    /// matches.
    pub async fn update_holder(&self, plot_id: i64, new_holder: &str) -> MirrorResult<PlotRecord> {
        let stmt = Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            &format!(
                "UPDATE plot_registry SET current_holder = $1 \
                 WHERE plot_id = $2 RETURNING {}",
                SELECT_COLUMNS
            ),
            [new_holder.into(), plot_id.into()],
        );

        let row = self
            .db
            .connection()
            .query_one(stmt)
            .await?
            .ok_or_else(|| MirrorError::not_found("plot", plot_id))?;

        debug!("Plot {} holder updated to {}", plot_id, new_holder);
        map_row(&row)
    }

    /// All rows ordered by plot id.
    pub async fn fetch_all(&self) -> MirrorResult<Vec<PlotRecord>> {
        let stmt = Statement::from_string(
            DatabaseBackend::Postgres,
            format!("SELECT {} FROM plot_registry ORDER BY plot_id ASC", SELECT_COLUMNS),
        );
        let rows = self.db.connection().query_all(stmt).await?;
        rows.iter().map(map_row).collect()
    }

    /// Look up a plot by its unique name.
    pub async fn find_by_name(&self, plot_name: &str) -> MirrorResult<Option<PlotRecord>> {
        let stmt = Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            &format!("SELECT {} FROM plot_registry WHERE plot_name = $1", SELECT_COLUMNS),
            [plot_name.into()],
        );
        let row = self.db.connection().query_one(stmt).await?;
        row.as_ref().map(map_row).transpose()
    }

    /// Look up a plot by id.
    pub async fn find(&self, plot_id: i64) -> MirrorResult<Option<PlotRecord>> {
        let stmt = Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            &format!("SELECT {} FROM plot_registry WHERE plot_id = $1", SELECT_COLUMNS),
            [plot_id.into()],
        );
        let row = self.db.connection().query_one(stmt).await?;
        row.as_ref().map(map_row).transpose()
    }
}

fn map_row(row: &QueryResult) -> MirrorResult<PlotRecord> {
    Ok(PlotRecord {
        plot_id: row.try_get("", "plot_id")?,
        plot_name: row.try_get("", "plot_name")?,
        current_holder: row.try_get("", "current_holder")?,
        parcel_ids: row.try_get("", "parcel_ids")?,
        parcel_amounts: row.try_get("", "parcel_amounts")?,
    })
}
