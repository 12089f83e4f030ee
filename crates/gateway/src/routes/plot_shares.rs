//! Per-parcel shareholding read-throughs: who holds shares of a parcel
//! inside a plot, how many, and a user's overall stake in the plot.

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::response::ok;
use crate::routes::setter::require_address;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/plot/:plot_id/parcel/:parcel_id/shareholders",
            get(parcel_shareholders),
        )
        .route(
            "/plot/:plot_id/parcel/:parcel_id/user/:user_address/shares",
            get(user_parcel_shares),
        )
        .route(
            "/plot/:plot_id/parcel/:parcel_id/total-shares",
            get(parcel_total_shares),
        )
        .route("/plot/:plot_id/user/:user_address/parcels", get(user_parcels))
        .route("/plot/:plot_id/user/:user_address/ownership", get(ownership))
}

fn require_positive_id(field: &str, value: u64) -> Result<(), ApiError> {
    if value == 0 {
        return Err(ApiError::invalid_input(format!(
            "{} must be a positive integer",
            field
        )));
    }
    Ok(())
}

async fn parcel_shareholders(
    State(state): State<AppState>,
    Path((plot_id, parcel_id)): Path<(u64, u64)>,
) -> Result<Json<Value>, ApiError> {
    require_positive_id("plotId", plot_id)?;
    require_positive_id("parcelId", parcel_id)?;

    let shareholders = state.ledger.get_parcel_shareholders(plot_id, parcel_id).await?;
    let total = shareholders.len();
    Ok(ok(
        json!({
            "plotId": plot_id,
            "parcelId": parcel_id,
            "shareholders": shareholders,
            "totalShareholders": total,
        }),
        "Parcel shareholders fetched",
    ))
}

async fn user_parcel_shares(
    State(state): State<AppState>,
    Path((plot_id, parcel_id, user_address)): Path<(u64, u64, String)>,
) -> Result<Json<Value>, ApiError> {
    require_positive_id("plotId", plot_id)?;
    require_positive_id("parcelId", parcel_id)?;
    require_address("userAddress", &user_address)?;

    let shares = state
        .ledger
        .get_user_parcel_shares(plot_id, parcel_id, &user_address)
        .await?;
    Ok(ok(
        json!({
            "plotId": plot_id,
            "parcelId": parcel_id,
            "userAddress": user_address,
            "shares": shares,
        }),
        "User parcel shares fetched",
    ))
}

async fn parcel_total_shares(
    State(state): State<AppState>,
    Path((plot_id, parcel_id)): Path<(u64, u64)>,
) -> Result<Json<Value>, ApiError> {
    require_positive_id("plotId", plot_id)?;
    require_positive_id("parcelId", parcel_id)?;

    let total_shares = state.ledger.get_parcel_total_shares(plot_id, parcel_id).await?;
    Ok(ok(
        json!({
            "plotId": plot_id,
            "parcelId": parcel_id,
            "totalShares": total_shares,
        }),
        "Parcel total shares fetched",
    ))
}

#[derive(Debug, Deserialize)]
pub struct ParcelFilter {
    /// Restrict the result to one parcel id; absent means all
    pub parcel: Option<u64>,
}

async fn user_parcels(
    State(state): State<AppState>,
    Path((plot_id, user_address)): Path<(u64, String)>,
    Query(filter): Query<ParcelFilter>,
) -> Result<Json<Value>, ApiError> {
    require_positive_id("plotId", plot_id)?;
    require_address("userAddress", &user_address)?;

    let parcel_filter = filter.parcel.unwrap_or(0);
    let parcels = state
        .ledger
        .get_user_parcels(plot_id, &user_address, parcel_filter)
        .await?;
    let total = parcels.len();
    Ok(ok(
        json!({
            "plotId": plot_id,
            "userAddress": user_address,
            "parcelFilter": parcel_filter,
            "parcels": parcels,
            "totalParcels": total,
        }),
        "User parcels fetched",
    ))
}

async fn ownership(
    State(state): State<AppState>,
    Path((plot_id, user_address)): Path<(u64, String)>,
) -> Result<Json<Value>, ApiError> {
    require_positive_id("plotId", plot_id)?;
    require_address("userAddress", &user_address)?;

    let basis_points = state
        .ledger
        .get_ownership_basis_points(plot_id, &user_address)
        .await?;
    Ok(ok(
        json!({
            "plotId": plot_id,
            "userAddress": user_address,
            "ownershipPercentage": basis_points,
            "ownershipPercent": format_basis_points(basis_points),
        }),
        "Ownership percentage fetched",
    ))
}

/// Basis points to a human-readable percentage (10000 = "100.00%").
fn format_basis_points(basis_points: u64) -> String {
    format!("{:.2}%", basis_points as f64 / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basis_point_formatting() {
        assert_eq!(format_basis_points(10_000), "100.00%");
        assert_eq!(format_basis_points(2_550), "25.50%");
        assert_eq!(format_basis_points(1), "0.01%");
        assert_eq!(format_basis_points(0), "0.00%");
    }
}
