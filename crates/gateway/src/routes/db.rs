//! Mirror endpoints: table snapshots, administrative drops and name lookups.
//!
//! Reads run `ensure_synced` first, so a wiped or never-initialized table is
//! rebuilt from the ledger before rows are returned.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use landchain_mirror::{MirrorError, SyncOutcome, TableKind};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::response::ok;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/table/:name", get(fetch_table).delete(drop_table))
        .route("/plot/:plot_name", get(plot_by_name))
        .route("/blockparcel/:block_name/:parcel_name", get(land_by_names))
}

fn sync_message(sync: &SyncOutcome) -> String {
    match sync {
        SyncOutcome::Created(report) => format!(
            "Table created and synced from ledger ({} rows, {} skipped)",
            report.synced, report.skipped
        ),
        SyncOutcome::Repopulated(report) => format!(
            "Table repopulated from ledger ({} rows, {} skipped)",
            report.synced, report.skipped
        ),
        SyncOutcome::AlreadyPopulated { rows } => {
            format!("Table already populated ({} rows)", rows)
        }
    }
}

async fn fetch_table(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let kind = TableKind::from_name(&name)?;
    let snapshot = state.reconciler.fetch_table(kind).await?;
    let message = sync_message(&snapshot.sync);
    Ok(ok(
        json!({
            "table": kind.table_name(),
            "rowCount": snapshot.rows.len(),
            "rows": snapshot.rows,
        }),
        message,
    ))
}

async fn drop_table(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let kind = TableKind::from_name(&name)?;
    let dropped = state.reconciler.drop_table(kind).await?;
    let message = if dropped {
        "Table dropped; next read rebuilds it from the ledger"
    } else {
        "Table did not exist"
    };
    Ok(ok(
        json!({ "table": kind.table_name(), "dropped": dropped }),
        message,
    ))
}

async fn plot_by_name(
    State(state): State<AppState>,
    Path(plot_name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let record = state
        .reconciler
        .find_plot_by_name(&plot_name)
        .await?
        .ok_or_else(|| MirrorError::not_found("plot", &plot_name))?;
    Ok(ok(record, "Plot fetched"))
}

async fn land_by_names(
    State(state): State<AppState>,
    Path((block_name, parcel_name)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let record = state
        .reconciler
        .find_land_by_names(&block_name, &parcel_name)
        .await?
        .ok_or_else(|| {
            MirrorError::not_found("land parcel", format!("{}/{}", block_name, parcel_name))
        })?;
    Ok(ok(record, "Land parcel fetched"))
}
