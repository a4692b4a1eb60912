//! Cache key scheme.
//!
//! A key is the endpoint name, optionally followed by `@` and the request
//! parameters as JSON with object keys sorted at every depth. Structurally
//! equal parameters therefore always map to the same key.

use serde_json::Value;

use crate::api::Endpoint;

const PARAMS_SEPARATOR: char = '@';

/// Compute the cache key for a call.
pub fn build_key(endpoint: Endpoint, params: Option<&Value>) -> String {
  match params {
    Some(params) => format!(
      "{}{}{}",
      endpoint.as_str(),
      PARAMS_SEPARATOR,
      canonicalize(params)
    ),
    None => endpoint.as_str().to_string(),
  }
}

/// Whether `key` was produced by [`build_key`] for `endpoint`.
pub fn key_belongs_to(key: &str, endpoint: Endpoint) -> bool {
  match key.strip_prefix(endpoint.as_str()) {
    Some(rest) => rest.is_empty() || rest.starts_with(PARAMS_SEPARATOR),
    None => false,
  }
}

/// Rebuild `value` with object entries inserted in key order, so the output
/// does not depend on how serde_json's map is configured.
fn canonicalize(value: &Value) -> Value {
  match value {
    Value::Object(map) => {
      let mut entries: Vec<(&String, &Value)> = map.iter().collect();
      entries.sort_by(|a, b| a.0.cmp(b.0));
      Value::Object(
        entries
          .into_iter()
          .map(|(k, v)| (k.clone(), canonicalize(v)))
          .collect(),
      )
    }
    Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
    other => other.clone(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_no_params_is_bare_endpoint() {
    assert_eq!(build_key(Endpoint::Employees, None), "employees");
  }

  #[test]
  fn test_params_are_appended() {
    let key = build_key(
      Endpoint::TransactionsByEmployee,
      Some(&json!({ "employeeId": "emp-42" })),
    );
    assert_eq!(key, r#"transactionsByEmployee@{"employeeId":"emp-42"}"#);
  }

  #[test]
  fn test_field_order_does_not_matter() {
    let a: Value = serde_json::from_str(r#"{"b":1,"a":{"y":true,"x":[{"d":1,"c":2}]}}"#).unwrap();
    let b: Value = serde_json::from_str(r#"{"a":{"x":[{"c":2,"d":1}],"y":true},"b":1}"#).unwrap();

    assert_eq!(
      build_key(Endpoint::PaginatedTransactions, Some(&a)),
      build_key(Endpoint::PaginatedTransactions, Some(&b))
    );
  }

  #[test]
  fn test_distinct_inputs_do_not_collide() {
    let inputs = [
      (Endpoint::Employees, None),
      (Endpoint::Employees, Some(json!({}))),
      (Endpoint::PaginatedTransactions, Some(json!({ "page": 0 }))),
      (Endpoint::PaginatedTransactions, Some(json!({ "page": 1 }))),
      (Endpoint::PaginatedTransactions, Some(json!({ "page": null }))),
      (Endpoint::PaginatedTransactions, Some(json!({ "page": "0" }))),
      (Endpoint::TransactionsByEmployee, Some(json!({ "employeeId": "emp-1" }))),
      (Endpoint::TransactionsByEmployee, Some(json!({ "employeeId": "emp-2" }))),
      (Endpoint::TransactionsByEmployee, Some(json!({ "employee_id": "emp-1" }))),
      (Endpoint::TransactionsByEmployee, Some(json!(["emp-1"]))),
    ];

    let keys: std::collections::HashSet<String> = inputs
      .iter()
      .map(|(endpoint, params)| build_key(*endpoint, params.as_ref()))
      .collect();
    assert_eq!(keys.len(), inputs.len());
  }

  #[test]
  fn test_key_belongs_to() {
    let key = build_key(
      Endpoint::TransactionsByEmployee,
      Some(&json!({ "employeeId": "emp-1" })),
    );
    assert!(key_belongs_to(&key, Endpoint::TransactionsByEmployee));
    assert!(!key_belongs_to(&key, Endpoint::PaginatedTransactions));

    assert!(key_belongs_to("employees", Endpoint::Employees));
    assert!(!key_belongs_to("employeesArchive", Endpoint::Employees));
  }
}
