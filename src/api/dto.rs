//! Request and response DTOs for the HTTP surface
//!
//! JSON shapes at the API boundary. Monetary amounts ride through
//! `rust_decimal::Decimal`, which serializes as a JSON string and accepts
//! both string and number on input — binary floating point never touches
//! a balance.

use crate::types::Account;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Body of `POST /accounts`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAccountRequest {
    /// Name of the account owner; must be non-blank
    pub owner: String,

    /// Currency code; must be non-blank
    pub currency: String,

    /// Opening balance; must be non-negative
    pub initial_amount: Decimal,
}

/// Body of `POST /accounts/{id}/adjustments`
#[derive(Debug, Clone, Deserialize)]
pub struct AdjustBalanceRequest {
    /// Currency code; must be non-blank
    pub currency: String,

    /// Signed balance change; positive credits, negative debits
    pub delta: Decimal,
}

/// Account snapshot returned by create, get, and adjust
#[derive(Debug, Clone, Serialize)]
pub struct AccountDto {
    /// The account identifier
    pub account_id: String,

    /// Name of the account owner
    pub owner: String,

    /// Currency code the account is denominated in
    pub currency: String,

    /// Current balance
    pub balance: Decimal,
}

impl From<Account> for AccountDto {
    fn from(account: Account) -> Self {
        Self {
            account_id: account.account_id,
            owner: account.owner,
            currency: account.currency,
            balance: account.balance,
        }
    }
}

/// Error body returned on every non-2xx response
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    /// Stable machine-readable code (e.g. "INSUFFICIENT_FUNDS")
    pub error: String,

    /// Human-readable description
    pub message: String,
}

/// Body of `GET /health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status, always "healthy" when the handler answers
    pub status: String,

    /// Crate version
    pub version: String,
}
