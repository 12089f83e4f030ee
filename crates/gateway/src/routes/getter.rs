//! Read-through endpoints: straight to the ledger, bypassing the mirror.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use landchain_ledger::RequestStatus;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::response::ok;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/land/:token_id", get(land_info))
        .route("/plot/:plot_id/info", get(plot_info))
        .route("/plots", get(all_plots))
        .route("/transfer/:request_id/status", get(transfer_status))
        .route("/plot-and-token-id-info", get(counters))
        .route("/get-treasury", get(treasury))
        .route("/token/:token_id/uri", get(token_uri))
}

async fn land_info(
    State(state): State<AppState>,
    Path(token_id): Path<u64>,
) -> Result<Json<Value>, ApiError> {
    if token_id == 0 {
        return Err(ApiError::invalid_input("tokenId must be a positive integer"));
    }
    let info = state.ledger.get_land_info(token_id).await?;
    Ok(ok(info, "Land token fetched"))
}

async fn plot_info(
    State(state): State<AppState>,
    Path(plot_id): Path<u64>,
) -> Result<Json<Value>, ApiError> {
    if plot_id == 0 {
        return Err(ApiError::invalid_input("plotId must be a positive integer"));
    }
    let info = state.ledger.get_plot_info(plot_id).await?;
    Ok(ok(info, "Plot account fetched"))
}

async fn transfer_status(
    State(state): State<AppState>,
    Path(request_id): Path<u64>,
) -> Result<Json<Value>, ApiError> {
    if request_id == 0 {
        return Err(ApiError::invalid_input("requestId must be a positive integer"));
    }
    let approvals = state.ledger.get_request_status(request_id).await?;
    let status = RequestStatus::from_approvals(
        approvals.land_authority_approved,
        approvals.bank_approved,
        approvals.lawyer_approved,
    );
    Ok(ok(
        json!({
            "requestId": request_id,
            "approvals": approvals,
            "currentStatus": status.as_str(),
        }),
        "Transfer request status fetched",
    ))
}

async fn all_plots(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let plots = state.ledger.get_all_plot_info().await?;
    let total = plots.len();
    Ok(ok(
        json!({
            "plots": plots,
            "totalPlots": total,
        }),
        "Plot accounts fetched",
    ))
}

async fn treasury(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let wallet = state.ledger.get_treasury_wallet().await?;
    Ok(ok(
        json!({ "treasuryWallet": wallet }),
        "Treasury wallet fetched",
    ))
}

async fn token_uri(
    State(state): State<AppState>,
    Path(token_id): Path<u64>,
) -> Result<Json<Value>, ApiError> {
    if token_id == 0 {
        return Err(ApiError::invalid_input("tokenId must be a positive integer"));
    }
    let uri = state.ledger.get_token_uri(token_id).await?;
    Ok(ok(
        json!({ "tokenId": token_id, "uri": uri }),
        "Token URI fetched",
    ))
}

async fn counters(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let counters = state.ledger.get_current_counters().await?;
    Ok(ok(
        json!({
            "plotCounter": counters.plot_counter,
            "tokenCounter": counters.token_counter,
        }),
        "Current id counters fetched",
    ))
}
