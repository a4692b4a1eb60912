use color_eyre::{eyre::eyre, Report};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::cache::PayloadShape;

/// Registry of remote operations the client knows how to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Endpoint {
  /// All employees, `Vec<Employee>`
  Employees,
  /// One page of transactions, `PaginatedResponse<Vec<Transaction>>`
  PaginatedTransactions,
  /// Every transaction of one employee, `Vec<Transaction>`
  TransactionsByEmployee,
  /// Approve or reject a transaction (mutation, never cached)
  SetTransactionApproval,
}

impl Endpoint {
  pub const ALL: &'static [Endpoint] = &[
    Endpoint::Employees,
    Endpoint::PaginatedTransactions,
    Endpoint::TransactionsByEmployee,
    Endpoint::SetTransactionApproval,
  ];

  /// Wire name, also the prefix of every cache key for this endpoint.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Employees => "employees",
      Self::PaginatedTransactions => "paginatedTransactions",
      Self::TransactionsByEmployee => "transactionsByEmployee",
      Self::SetTransactionApproval => "setTransactionApproval",
    }
  }

  /// Shape of the response, which decides how a cached copy is checked for staleness.
  pub fn shape(&self) -> PayloadShape {
    match self {
      // Employees are never mutated through this client
      Self::Employees => PayloadShape::Opaque,
      Self::PaginatedTransactions => PayloadShape::Paginated,
      Self::TransactionsByEmployee => PayloadShape::FlatList,
      Self::SetTransactionApproval => PayloadShape::Opaque,
    }
  }
}

impl fmt::Display for Endpoint {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Endpoint {
  type Err = Report;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .iter()
      .copied()
      .find(|endpoint| endpoint.as_str().eq_ignore_ascii_case(s.trim()))
      .ok_or_else(|| eyre!("Unknown endpoint: {}", s))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_is_case_insensitive() {
    assert_eq!(
      "transactionsbyemployee".parse::<Endpoint>().unwrap(),
      Endpoint::TransactionsByEmployee
    );
    assert_eq!(" employees ".parse::<Endpoint>().unwrap(), Endpoint::Employees);
  }

  #[test]
  fn test_parse_unknown() {
    assert!("transactions".parse::<Endpoint>().is_err());
  }

  #[test]
  fn test_display_matches_wire_name() {
    for endpoint in Endpoint::ALL {
      assert_eq!(endpoint.to_string().parse::<Endpoint>().unwrap(), *endpoint);
      assert_eq!(
        serde_json::to_value(endpoint).unwrap(),
        serde_json::Value::String(endpoint.as_str().to_string())
      );
    }
  }

  #[test]
  fn test_shapes() {
    assert_eq!(Endpoint::Employees.shape(), PayloadShape::Opaque);
    assert_eq!(Endpoint::PaginatedTransactions.shape(), PayloadShape::Paginated);
    assert_eq!(Endpoint::TransactionsByEmployee.shape(), PayloadShape::FlatList);
  }
}
