//! Response and request shapes of the endpoint registry.
//!
//! Field names follow the wire format (camelCase) so cached payloads and
//! transport responses share one JSON representation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Employee record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
  pub id: String,
  pub first_name: String,
  pub last_name: String,
}

impl Employee {
  pub fn full_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
  }
}

/// Card transaction, embeds the employee it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
  pub id: String,
  pub amount: f64,
  pub employee: Employee,
  pub merchant: String,
  pub date: NaiveDate,
  pub approved: bool,
}

/// One page of results plus the index of the page after it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
  pub data: T,
  pub next_page: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedRequestParams {
  pub page: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestByEmployeeParams {
  pub employee_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTransactionApprovalParams {
  pub transaction_id: String,
  pub value: bool,
}
