//! In-memory stand-in for the remote API.
//!
//! Serves every endpoint from a fixed data set with an artificial delay, and
//! applies approval mutations to that data set so later reads observe them.

use chrono::NaiveDate;
use color_eyre::{eyre::eyre, Result};
use futures::future::{BoxFuture, FutureExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::debug;

use super::types::{
  Employee, PaginatedRequestParams, PaginatedResponse, RequestByEmployeeParams,
  SetTransactionApprovalParams, Transaction,
};
use super::{Endpoint, Transport};
use crate::config::MockConfig;

struct MockData {
  employees: Vec<Employee>,
  transactions: Vec<Transaction>,
}

pub struct MockTransport {
  data: Mutex<MockData>,
  calls: Mutex<HashMap<Endpoint, usize>>,
  latency: Duration,
  page_size: usize,
}

impl MockTransport {
  /// Create a transport over the built-in data set.
  pub fn new(latency: Duration, page_size: usize) -> Self {
    let employees = seed_employees();
    let transactions = seed_transactions(&employees);
    Self::with_data(employees, transactions, latency, page_size)
  }

  pub fn with_data(
    employees: Vec<Employee>,
    transactions: Vec<Transaction>,
    latency: Duration,
    page_size: usize,
  ) -> Self {
    Self {
      data: Mutex::new(MockData {
        employees,
        transactions,
      }),
      calls: Mutex::new(HashMap::new()),
      latency,
      page_size: page_size.max(1),
    }
  }

  pub fn from_config(config: &MockConfig) -> Self {
    Self::new(Duration::from_millis(config.latency_ms), config.page_size)
  }

  /// Number of calls received for one endpoint.
  pub fn calls(&self, endpoint: Endpoint) -> usize {
    let calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
    calls.get(&endpoint).copied().unwrap_or(0)
  }

  fn record_call(&self, endpoint: Endpoint) {
    let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
    *calls.entry(endpoint).or_insert(0) += 1;
  }

  fn respond(&self, endpoint: Endpoint, params: Option<Value>) -> Result<Value> {
    let mut data = self
      .data
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let response = match endpoint {
      Endpoint::Employees => serde_json::to_value(&data.employees),

      Endpoint::PaginatedTransactions => {
        let params: PaginatedRequestParams = parse_params(endpoint, params)?;
        let page = params.page.ok_or_else(|| eyre!("Page cannot be null"))? as usize;

        let start = page
          .checked_mul(self.page_size)
          .filter(|start| *start <= data.transactions.len())
          .ok_or_else(|| eyre!("Invalid page {}", page))?;
        let end = start.saturating_add(self.page_size).min(data.transactions.len());
        let next_page = (end < data.transactions.len()).then(|| page as u32 + 1);

        serde_json::to_value(PaginatedResponse {
          data: &data.transactions[start..end],
          next_page,
        })
      }

      Endpoint::TransactionsByEmployee => {
        let params: RequestByEmployeeParams = parse_params(endpoint, params)?;
        if !data.employees.iter().any(|e| e.id == params.employee_id) {
          return Err(eyre!("Invalid employee id {}", params.employee_id));
        }

        let transactions: Vec<&Transaction> = data
          .transactions
          .iter()
          .filter(|t| t.employee.id == params.employee_id)
          .collect();
        serde_json::to_value(transactions)
      }

      Endpoint::SetTransactionApproval => {
        let params: SetTransactionApprovalParams = parse_params(endpoint, params)?;
        let transaction = data
          .transactions
          .iter_mut()
          .find(|t| t.id == params.transaction_id)
          .ok_or_else(|| eyre!("Invalid transaction to update: {}", params.transaction_id))?;

        transaction.approved = params.value;
        Ok(Value::Null)
      }
    };

    response.map_err(|e| eyre!("Failed to encode {} response: {}", endpoint, e))
  }
}

impl Transport for MockTransport {
  fn call(&self, endpoint: Endpoint, params: Option<Value>) -> BoxFuture<'_, Result<Value>> {
    async move {
      self.record_call(endpoint);
      debug!(%endpoint, ?params, "mock request");

      if !self.latency.is_zero() {
        tokio::time::sleep(self.latency).await;
      }

      self.respond(endpoint, params)
    }
    .boxed()
  }
}

fn parse_params<P: DeserializeOwned>(endpoint: Endpoint, params: Option<Value>) -> Result<P> {
  let params = params.ok_or_else(|| eyre!("{} requires parameters", endpoint))?;
  serde_json::from_value(params).map_err(|e| eyre!("Invalid {} parameters: {}", endpoint, e))
}

fn seed_employees() -> Vec<Employee> {
  [
    ("emp-1", "James", "Smith"),
    ("emp-2", "Mary", "Johnson"),
    ("emp-3", "Robert", "Williams"),
    ("emp-4", "Patricia", "Brown"),
  ]
  .into_iter()
  .map(|(id, first, last)| Employee {
    id: id.to_string(),
    first_name: first.to_string(),
    last_name: last.to_string(),
  })
  .collect()
}

fn seed_transactions(employees: &[Employee]) -> Vec<Transaction> {
  const MERCHANTS: &[&str] = &[
    "Social Media Ads Inc",
    "Blue Bottle Coffee",
    "Figma",
    "United Airlines",
    "Staples",
    "Uber",
  ];

  (0..14)
    .map(|i| Transaction {
      id: format!("txn-{:02}", i + 1),
      amount: 12.5 + (i as f64) * 37.25,
      employee: employees[i % employees.len()].clone(),
      merchant: MERCHANTS[i % MERCHANTS.len()].to_string(),
      date: NaiveDate::from_ymd_opt(2024, 1 + (i as u32 % 12), 1 + (i as u32 * 2) % 28)
        .unwrap_or_default(),
      approved: i % 3 == 0,
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn transport() -> MockTransport {
    MockTransport::new(Duration::ZERO, 5)
  }

  async fn page(transport: &MockTransport, page: u32) -> PaginatedResponse<Vec<Transaction>> {
    let value = transport
      .call(Endpoint::PaginatedTransactions, Some(json!({ "page": page })))
      .await
      .unwrap();
    serde_json::from_value(value).unwrap()
  }

  #[tokio::test]
  async fn test_employees() {
    let transport = transport();
    let value = transport.call(Endpoint::Employees, None).await.unwrap();
    let employees: Vec<Employee> = serde_json::from_value(value).unwrap();

    assert_eq!(employees.len(), 4);
    assert_eq!(transport.calls(Endpoint::Employees), 1);
  }

  #[tokio::test]
  async fn test_pages_chain_until_exhausted() {
    let transport = transport();

    let first = page(&transport, 0).await;
    assert_eq!(first.data.len(), 5);
    assert_eq!(first.next_page, Some(1));

    let last = page(&transport, 2).await;
    assert_eq!(last.data.len(), 4);
    assert_eq!(last.next_page, None);
    assert_eq!(transport.calls(Endpoint::PaginatedTransactions), 2);
  }

  #[tokio::test]
  async fn test_page_is_required() {
    let transport = transport();
    let result = transport
      .call(Endpoint::PaginatedTransactions, Some(json!({ "page": null })))
      .await;
    assert!(result.is_err());

    let result = transport.call(Endpoint::PaginatedTransactions, None).await;
    assert!(result.is_err());
  }

  #[tokio::test]
  async fn test_page_out_of_range() {
    let transport = transport();
    let result = transport
      .call(Endpoint::PaginatedTransactions, Some(json!({ "page": 9 })))
      .await;
    assert!(result.is_err());
  }

  #[tokio::test]
  async fn test_huge_page_size_does_not_overflow() {
    let transport = MockTransport::new(Duration::ZERO, usize::MAX);

    let first = page(&transport, 0).await;
    assert_eq!(first.data.len(), 14);
    assert_eq!(first.next_page, None);

    let result = transport
      .call(Endpoint::PaginatedTransactions, Some(json!({ "page": 2 })))
      .await;
    assert_eq!(result.unwrap_err().to_string(), "Invalid page 2");
  }

  #[tokio::test]
  async fn test_transactions_by_employee_filters() {
    let transport = transport();
    let value = transport
      .call(
        Endpoint::TransactionsByEmployee,
        Some(json!({ "employeeId": "emp-2" })),
      )
      .await
      .unwrap();
    let transactions: Vec<Transaction> = serde_json::from_value(value).unwrap();

    assert!(!transactions.is_empty());
    assert!(transactions.iter().all(|t| t.employee.id == "emp-2"));
  }

  #[tokio::test]
  async fn test_unknown_employee_fails() {
    let transport = transport();
    let result = transport
      .call(
        Endpoint::TransactionsByEmployee,
        Some(json!({ "employeeId": "emp-99" })),
      )
      .await;
    assert!(result.is_err());
  }

  #[tokio::test]
  async fn test_approval_is_visible_to_later_reads() {
    let transport = transport();
    let response = transport
      .call(
        Endpoint::SetTransactionApproval,
        Some(json!({ "transactionId": "txn-02", "value": true })),
      )
      .await
      .unwrap();
    assert_eq!(response, Value::Null);

    let first = page(&transport, 0).await;
    let updated = first.data.iter().find(|t| t.id == "txn-02").unwrap();
    assert!(updated.approved);
    assert_eq!(transport.calls(Endpoint::SetTransactionApproval), 1);
    assert_eq!(transport.calls(Endpoint::PaginatedTransactions), 1);
  }

  #[tokio::test(start_paused = true)]
  async fn test_latency_is_applied() {
    let transport = MockTransport::new(Duration::from_millis(300), 5);
    let started = tokio::time::Instant::now();
    transport.call(Endpoint::Employees, None).await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(300));
  }
}
