//! Write endpoints: ledger transaction first, mirror write-through second.
//!
//! A confirmed ledger transaction is never reported as a failure; when the
//! mirror write-back lags, the response carries a `warning` instead.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use landchain_ledger::is_well_formed_address;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::response::ok_with_warning;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/create-token", post(create_token))
        .route("/plot-initiate", post(plot_initiate))
        .route("/request-plot-transfer", post(request_plot_transfer))
        .route("/request-parcel-transfer", post(request_parcel_transfer))
        .route("/approve-transfer-execution", post(approve_transfer_execution))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTokenRequest {
    pub block_name: String,
    pub parcel_name: String,
    pub metadata_uri: String,
    pub total_supply: String,
}

async fn create_token(
    State(state): State<AppState>,
    Json(body): Json<CreateTokenRequest>,
) -> Result<Json<Value>, ApiError> {
    require_non_empty("blockName", &body.block_name)?;
    require_non_empty("parcelName", &body.parcel_name)?;
    require_non_empty("metadataUri", &body.metadata_uri)?;
    require_decimal("totalSupply", &body.total_supply)?;

    let receipt = state
        .ledger
        .create_token(
            &body.block_name,
            &body.parcel_name,
            &body.metadata_uri,
            &body.total_supply,
        )
        .await?;

    let (record, warning) = state
        .reconciler
        .record_token(
            &receipt,
            &body.block_name,
            &body.parcel_name,
            &body.metadata_uri,
            &body.total_supply,
        )
        .await
        .into_parts();

    Ok(ok_with_warning(
        json!({
            "txHash": receipt.tx_hash,
            "gasUsed": receipt.gas_used,
            "tokenId": receipt.token_id(),
            "record": record,
            "confirmedAt": confirmed_at(),
        }),
        "Token created successfully",
        warning,
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotInitiateRequest {
    pub plot_name: String,
    pub parcel_ids: Vec<u64>,
    pub parcel_amounts: Vec<u64>,
}

async fn plot_initiate(
    State(state): State<AppState>,
    Json(body): Json<PlotInitiateRequest>,
) -> Result<Json<Value>, ApiError> {
    require_non_empty("plotName", &body.plot_name)?;
    if body.parcel_ids.is_empty() {
        return Err(ApiError::invalid_input("parcelIds must not be empty"));
    }
    if body.parcel_ids.len() != body.parcel_amounts.len() {
        return Err(ApiError::invalid_input(
            "parcelIds and parcelAmounts must be the same length",
        ));
    }
    if body.parcel_ids.iter().any(|&id| id == 0) {
        return Err(ApiError::invalid_input("parcelIds must be positive"));
    }

    let receipt = state
        .ledger
        .create_plot(&body.plot_name, &body.parcel_ids, &body.parcel_amounts)
        .await?;

    let (record, warning) = state.reconciler.record_plot(&receipt).await.into_parts();

    Ok(ok_with_warning(
        json!({
            "txHash": receipt.tx_hash,
            "gasUsed": receipt.gas_used,
            "plotId": receipt.plot_id(),
            "record": record,
            "confirmedAt": confirmed_at(),
        }),
        "Plot initiated successfully",
        warning,
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotTransferRequest {
    pub plot_id: u64,
    pub to: String,
}

async fn request_plot_transfer(
    State(state): State<AppState>,
    Json(body): Json<PlotTransferRequest>,
) -> Result<Json<Value>, ApiError> {
    require_positive("plotId", body.plot_id)?;
    require_address("to", &body.to)?;

    let receipt = state
        .ledger
        .request_plot_transfer(body.plot_id, &body.to)
        .await?;

    let (record, warning) = state
        .reconciler
        .record_request(&receipt, body.plot_id, true)
        .await
        .into_parts();

    Ok(ok_with_warning(
        json!({
            "txHash": receipt.tx_hash,
            "gasUsed": receipt.gas_used,
            "requestId": receipt.request_id(),
            "record": record,
            "confirmedAt": confirmed_at(),
        }),
        "Plot transfer requested",
        warning,
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParcelTransferRequest {
    pub parcel_id: u64,
    pub amount: u64,
    pub to: String,
    pub plot_id: u64,
}

async fn request_parcel_transfer(
    State(state): State<AppState>,
    Json(body): Json<ParcelTransferRequest>,
) -> Result<Json<Value>, ApiError> {
    require_positive("parcelId", body.parcel_id)?;
    require_positive("amount", body.amount)?;
    require_positive("plotId", body.plot_id)?;
    require_address("to", &body.to)?;

    let receipt = state
        .ledger
        .request_parcel_transfer(body.parcel_id, body.amount, &body.to, body.plot_id)
        .await?;

    let (record, warning) = state
        .reconciler
        .record_request(&receipt, body.plot_id, false)
        .await
        .into_parts();

    Ok(ok_with_warning(
        json!({
            "txHash": receipt.tx_hash,
            "gasUsed": receipt.gas_used,
            "requestId": receipt.request_id(),
            "record": record,
            "confirmedAt": confirmed_at(),
        }),
        "Parcel transfer requested",
        warning,
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveRequest {
    pub request_id: u64,
    pub signer_address: String,
    pub role: u8,
}

async fn approve_transfer_execution(
    State(state): State<AppState>,
    Json(body): Json<ApproveRequest>,
) -> Result<Json<Value>, ApiError> {
    let (approval, warning) = state
        .coordinator
        .approve(body.request_id, &body.signer_address, body.role)
        .await?
        .into_parts();

    let status = approval
        .request
        .as_ref()
        .map(|r| r.current_status.as_str());
    Ok(ok_with_warning(
        json!({
            "txHash": approval.receipt.tx_hash,
            "gasUsed": approval.receipt.gas_used,
            "role": approval.role.code(),
            "roleName": approval.role.display_name(),
            "request": approval.request,
            "currentStatus": status,
            "holderUpdated": approval.holder_updated,
            "confirmedAt": confirmed_at(),
        }),
        format!("{} approval recorded", approval.role.display_name()),
        warning,
    ))
}

/// UTC confirmation timestamp stamped on every write response.
fn confirmed_at() -> String {
    Utc::now().to_rfc3339()
}

fn require_non_empty(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::invalid_input(format!("{} must not be empty", field)));
    }
    Ok(())
}

fn require_positive(field: &str, value: u64) -> Result<(), ApiError> {
    if value == 0 {
        return Err(ApiError::invalid_input(format!(
            "{} must be a positive integer",
            field
        )));
    }
    Ok(())
}

pub(crate) fn require_address(field: &str, value: &str) -> Result<(), ApiError> {
    if !is_well_formed_address(value) {
        return Err(ApiError::invalid_input(format!(
            "{} must be a 0x-prefixed 40-hex-digit address",
            field
        )));
    }
    Ok(())
}

/// Non-negative decimal string (uint256-width; no sign, no separators).
fn require_decimal(field: &str, value: &str) -> Result<(), ApiError> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::invalid_input(format!(
            "{} must be a non-negative decimal integer string",
            field
        )));
    }
    Ok(())
}
