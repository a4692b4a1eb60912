//! Typed resource queries over [`CustomFetch`].
//!
//! Each query owns the last data it loaded. A failed request leaves that
//! data untouched; the failure has already gone to the session's error sink.

use crate::api::types::{
  Employee, PaginatedRequestParams, PaginatedResponse, RequestByEmployeeParams,
  SetTransactionApprovalParams, Transaction,
};
use crate::api::Endpoint;
use crate::fetch::{CustomFetch, NO_PARAMS};

/// All employees.
pub struct EmployeesQuery {
  fetch: CustomFetch,
  data: Option<Vec<Employee>>,
}

impl EmployeesQuery {
  pub fn new(fetch: CustomFetch) -> Self {
    Self { fetch, data: None }
  }

  pub fn data(&self) -> Option<&[Employee]> {
    self.data.as_deref()
  }

  pub fn loading(&self) -> bool {
    self.fetch.loading()
  }

  pub async fn fetch_all(&mut self) {
    if let Some(employees) = self
      .fetch
      .fetch_cached::<Vec<Employee>, _>(Endpoint::Employees, NO_PARAMS)
      .await
    {
      self.data = Some(employees);
    }
  }

  pub fn invalidate(&mut self) {
    self.data = None;
  }
}

/// Transactions across all employees, accumulated page by page.
pub struct PaginatedTransactionsQuery {
  fetch: CustomFetch,
  data: Option<PaginatedResponse<Vec<Transaction>>>,
}

impl PaginatedTransactionsQuery {
  pub fn new(fetch: CustomFetch) -> Self {
    Self { fetch, data: None }
  }

  /// Every transaction loaded so far, plus the page that would come next.
  pub fn data(&self) -> Option<&PaginatedResponse<Vec<Transaction>>> {
    self.data.as_ref()
  }

  pub fn loading(&self) -> bool {
    self.fetch.loading()
  }

  /// Whether `fetch_all` would load anything.
  pub fn has_next_page(&self) -> bool {
    match &self.data {
      None => true,
      Some(loaded) => loaded.next_page.is_some(),
    }
  }

  /// Load the next page (the first one when nothing is loaded) and append it.
  pub async fn fetch_all(&mut self) {
    let page = match &self.data {
      None => 0,
      Some(loaded) => match loaded.next_page {
        Some(page) => page,
        None => return,
      },
    };

    let params = PaginatedRequestParams { page: Some(page) };
    let Some(response) = self
      .fetch
      .fetch_cached::<PaginatedResponse<Vec<Transaction>>, _>(
        Endpoint::PaginatedTransactions,
        Some(&params),
      )
      .await
    else {
      return;
    };

    self.data = Some(match self.data.take() {
      None => response,
      Some(mut loaded) => {
        loaded.data.extend(response.data);
        loaded.next_page = response.next_page;
        loaded
      }
    });
  }

  pub fn invalidate(&mut self) {
    self.data = None;
  }
}

/// Transactions of one employee.
pub struct TransactionsByEmployeeQuery {
  fetch: CustomFetch,
  data: Option<Vec<Transaction>>,
}

impl TransactionsByEmployeeQuery {
  pub fn new(fetch: CustomFetch) -> Self {
    Self { fetch, data: None }
  }

  pub fn data(&self) -> Option<&[Transaction]> {
    self.data.as_deref()
  }

  pub fn loading(&self) -> bool {
    self.fetch.loading()
  }

  pub async fn fetch_by_id(&mut self, employee_id: &str) {
    let params = RequestByEmployeeParams {
      employee_id: employee_id.to_string(),
    };

    if let Some(transactions) = self
      .fetch
      .fetch_cached::<Vec<Transaction>, _>(Endpoint::TransactionsByEmployee, Some(&params))
      .await
    {
      self.data = Some(transactions);
    }
  }

  pub fn invalidate(&mut self) {
    self.data = None;
  }
}

/// Approve or reject a transaction.
///
/// On success the transaction is marked dirty, so every cached list that
/// embeds it is re-fetched on its next read. Returns whether the mutation
/// went through.
pub async fn set_transaction_approval(
  fetch: &CustomFetch,
  transaction_id: &str,
  value: bool,
) -> bool {
  let params = SetTransactionApprovalParams {
    transaction_id: transaction_id.to_string(),
    value,
  };

  let done = fetch
    .fetch_uncached::<(), _>(Endpoint::SetTransactionApproval, Some(&params))
    .await
    .is_some();

  if done {
    fetch.mark_dirty(transaction_id);
  }
  done
}
