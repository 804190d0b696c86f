//! HTTP handlers for the ledger engine
//!
//! This module maps the engine's command/response model onto HTTP:
//!
//! - `POST /accounts` - create an account under a freshly minted id
//! - `GET /accounts/{id}` - read an account snapshot
//! - `POST /accounts/{id}/adjustments` - credit or debit the balance
//!
//! Malformed input is rejected here with 400 before any command is
//! dispatched, so a bad request never touches entity state or the log.
//! Domain rejections map to 400, unknown identifiers to 404, and
//! storage/routing faults to 500.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response as HttpResponse};
use axum::Json;
use rust_decimal::Decimal;
use tracing::{error, warn};

use crate::api::dto::{AccountDto, AdjustBalanceRequest, CreateAccountRequest, ErrorBody};
use crate::core::EntityRegistry;
use crate::types::{AdjustOutcome, Command, LedgerError, Response};

/// Error half of every handler: an HTTP status plus a JSON error body
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code,
            message: message.into(),
        }
    }

    fn not_found(account_id: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: "ACCOUNT_NOT_FOUND",
            message: format!("No account exists under identifier {account_id}"),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL",
            message: message.into(),
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(error: LedgerError) -> Self {
        error!(%error, "command failed on infrastructure fault");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "COMMAND_FAILED",
            message: error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> HttpResponse {
        let body = ErrorBody {
            error: self.code.to_string(),
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Reject a create request with blank fields or a negative opening balance
fn validate_create(request: &CreateAccountRequest) -> Result<(), ApiError> {
    if request.owner.trim().is_empty() {
        return Err(ApiError::bad_request("INVALID_OWNER", "owner must not be blank"));
    }
    if request.currency.trim().is_empty() {
        return Err(ApiError::bad_request(
            "INVALID_CURRENCY",
            "currency must not be blank",
        ));
    }
    if request.initial_amount < Decimal::ZERO {
        return Err(ApiError::bad_request(
            "INVALID_INITIAL_AMOUNT",
            "initial_amount must not be negative",
        ));
    }
    Ok(())
}

/// POST /accounts - create a new account
///
/// # Response
///
/// - `201 Created` with the new account snapshot
/// - `400 Bad Request` on blank owner/currency or negative opening balance
pub async fn create_account(
    State(registry): State<Arc<EntityRegistry>>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<AccountDto>), ApiError> {
    validate_create(&request)?;

    let response = registry
        .create_account(
            request.owner.clone(),
            request.currency.clone(),
            request.initial_amount,
        )
        .await?;

    match response {
        Response::AccountCreated { account_id } => {
            let dto = AccountDto {
                account_id,
                owner: request.owner,
                currency: request.currency,
                balance: request.initial_amount,
            };
            Ok((StatusCode::CREATED, Json(dto)))
        }
        other => {
            error!(?other, "create dispatch produced a non-create response");
            Err(ApiError::internal("unexpected engine response"))
        }
    }
}

/// GET /accounts/{id} - read an account snapshot
///
/// # Response
///
/// - `200 OK` with the account snapshot
/// - `404 Not Found` if the identifier has no account
pub async fn get_account(
    State(registry): State<Arc<EntityRegistry>>,
    Path(account_id): Path<String>,
) -> Result<Json<AccountDto>, ApiError> {
    let response = registry.dispatch(&account_id, Command::GetAccount).await?;

    match response {
        Response::AccountQuery(Some(account)) => Ok(Json(account.into())),
        Response::AccountQuery(None) => Err(ApiError::not_found(&account_id)),
        other => {
            error!(?other, "query dispatch produced a non-query response");
            Err(ApiError::internal("unexpected engine response"))
        }
    }
}

/// POST /accounts/{id}/adjustments - credit or debit the balance
///
/// # Response
///
/// - `200 OK` with the updated account snapshot
/// - `400 Bad Request` if the resulting balance would be negative
/// - `404 Not Found` if the identifier has no account
pub async fn adjust_balance(
    State(registry): State<Arc<EntityRegistry>>,
    Path(account_id): Path<String>,
    Json(request): Json<AdjustBalanceRequest>,
) -> Result<Json<AccountDto>, ApiError> {
    if request.currency.trim().is_empty() {
        return Err(ApiError::bad_request(
            "INVALID_CURRENCY",
            "currency must not be blank",
        ));
    }

    let response = registry
        .dispatch(
            &account_id,
            Command::AdjustBalance {
                currency: request.currency,
                delta: request.delta,
            },
        )
        .await?;

    match response {
        Response::BalanceAdjusted(AdjustOutcome::Updated(account)) => Ok(Json(account.into())),
        Response::BalanceAdjusted(AdjustOutcome::Rejected { balance, delta }) => {
            warn!(%account_id, %balance, %delta, "adjustment rejected");
            Err(ApiError::bad_request(
                "INSUFFICIENT_FUNDS",
                format!("balance {balance} cannot absorb delta {delta}"),
            ))
        }
        Response::BalanceAdjusted(AdjustOutcome::NotFound) => {
            Err(ApiError::not_found(&account_id))
        }
        other => {
            error!(?other, "adjust dispatch produced a non-adjust response");
            Err(ApiError::internal("unexpected engine response"))
        }
    }
}
