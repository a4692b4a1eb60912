//! Console commands, argument parsing and name resolution

use color_eyre::{eyre::eyre, Result};

use crate::api::Endpoint;

#[derive(Debug, Clone)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub usage: &'static str,
  pub description: &'static str,
}

/// All available commands
pub const COMMANDS: &[Command] = &[
  Command {
    name: "employees",
    aliases: &["e", "emp"],
    usage: "employees",
    description: "List employees",
  },
  Command {
    name: "transactions",
    aliases: &["t", "txns", "more"],
    usage: "transactions",
    description: "Load the next page of transactions",
  },
  Command {
    name: "by-employee",
    aliases: &["b", "employee"],
    usage: "by-employee <employee-id>",
    description: "List transactions of one employee",
  },
  Command {
    name: "approve",
    aliases: &["a", "set"],
    usage: "approve <transaction-id> [true|false]",
    description: "Approve (or reject) a transaction",
  },
  Command {
    name: "dirty",
    aliases: &["d", "mark"],
    usage: "dirty <record-id>",
    description: "Mark a record as changed remotely",
  },
  Command {
    name: "invalidate",
    aliases: &["i", "clear"],
    usage: "invalidate [endpoint...]",
    description: "Drop cached entries (all, or of the given endpoints)",
  },
  Command {
    name: "keys",
    aliases: &["k", "cache"],
    usage: "keys",
    description: "Show cached keys",
  },
  Command {
    name: "stats",
    aliases: &["s", "status"],
    usage: "stats",
    description: "Show cache size, dirty records and loading state",
  },
  Command {
    name: "help",
    aliases: &["h", "?"],
    usage: "help",
    description: "Show this help",
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    usage: "quit",
    description: "Exit txcache",
  },
];

/// A parsed console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
  Employees,
  Transactions,
  ByEmployee(String),
  Approve { transaction_id: String, value: bool },
  Dirty(String),
  Invalidate(Vec<Endpoint>),
  Keys,
  Stats,
  Help,
  Quit,
}

/// Get autocomplete suggestions for a given input
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let input_lower = input.to_lowercase();

  if input_lower.is_empty() {
    return COMMANDS.iter().collect();
  }

  let mut matches: Vec<(&Command, u32)> = Vec::new();

  for cmd in COMMANDS {
    // Exact match on name
    if cmd.name == input_lower {
      matches.push((cmd, 0)); // Highest priority
      continue;
    }

    // Exact match on alias
    if cmd.aliases.contains(&input_lower.as_str()) {
      matches.push((cmd, 1));
      continue;
    }

    // Prefix match on name
    if cmd.name.starts_with(&input_lower) {
      matches.push((cmd, 2));
      continue;
    }

    // Prefix match on alias
    if cmd.aliases.iter().any(|a| a.starts_with(&input_lower)) {
      matches.push((cmd, 3));
      continue;
    }

    // Fuzzy match (contains)
    if cmd.name.contains(&input_lower) {
      matches.push((cmd, 4));
      continue;
    }

    // What the command is about, e.g. "record" or "endpoint"
    if cmd.usage.contains(&input_lower) || cmd.description.to_lowercase().contains(&input_lower) {
      matches.push((cmd, 5));
    }
  }

  // Sort by priority
  matches.sort_by_key(|(_, priority)| *priority);

  matches.into_iter().map(|(cmd, _)| cmd).collect()
}

/// Parse one console line.
///
/// The first word picks the best suggestion, the rest are its arguments.
/// Blank lines parse to `None`.
pub fn parse(line: &str) -> Result<Option<Action>> {
  let mut words = line.split_whitespace();
  let Some(word) = words.next() else {
    return Ok(None);
  };
  let args: Vec<&str> = words.collect();

  let cmd = get_suggestions(word)
    .first()
    .copied()
    .ok_or_else(|| eyre!("Unknown command: {} (try help)", word))?;

  let action = match cmd.name {
    "employees" => Action::Employees,
    "transactions" => Action::Transactions,
    "by-employee" => Action::ByEmployee(single_arg(cmd, &args)?),
    "approve" => {
      let (transaction_id, value) = match args.as_slice() {
        [id] => (id.to_string(), true),
        [id, value] => (id.to_string(), parse_bool(value)?),
        _ => return Err(usage_error(cmd)),
      };
      Action::Approve {
        transaction_id,
        value,
      }
    }
    "dirty" => Action::Dirty(single_arg(cmd, &args)?),
    "invalidate" => Action::Invalidate(
      args
        .iter()
        .map(|a| a.parse())
        .collect::<Result<Vec<Endpoint>>>()?,
    ),
    "keys" => Action::Keys,
    "stats" => Action::Stats,
    "help" => Action::Help,
    "quit" => Action::Quit,
    other => return Err(eyre!("Command {} is not handled", other)),
  };

  Ok(Some(action))
}

fn single_arg(cmd: &Command, args: &[&str]) -> Result<String> {
  match args {
    [arg] => Ok(arg.to_string()),
    _ => Err(usage_error(cmd)),
  }
}

fn parse_bool(value: &str) -> Result<bool> {
  match value.to_lowercase().as_str() {
    "true" | "yes" | "y" | "1" => Ok(true),
    "false" | "no" | "n" | "0" => Ok(false),
    _ => Err(eyre!("Expected true or false, got {}", value)),
  }
}

fn usage_error(cmd: &Command) -> color_eyre::Report {
  eyre!("Usage: {}", cmd.usage)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_input_returns_all() {
    let suggestions = get_suggestions("");
    assert_eq!(suggestions.len(), COMMANDS.len());
  }

  #[test]
  fn test_exact_match() {
    let suggestions = get_suggestions("employees");
    assert_eq!(suggestions[0].name, "employees");
  }

  #[test]
  fn test_alias_beats_prefix() {
    // "employee" is an alias of by-employee and a prefix of employees
    let suggestions = get_suggestions("employee");
    assert_eq!(suggestions[0].name, "by-employee");
    assert_eq!(suggestions[1].name, "employees");
  }

  #[test]
  fn test_prefix_match() {
    let suggestions = get_suggestions("inv");
    assert_eq!(suggestions[0].name, "invalidate");
  }

  #[test]
  fn test_fuzzy_match() {
    let suggestions = get_suggestions("sact");
    assert_eq!(suggestions[0].name, "transactions");
  }

  #[test]
  fn test_match_on_usage_and_description() {
    let suggestions = get_suggestions("record");
    assert_eq!(suggestions.len(), 2);
    assert_eq!(suggestions[0].name, "dirty");
    assert_eq!(suggestions[1].name, "stats");

    // Name matches rank above description matches
    let suggestions = get_suggestions("sact");
    assert_eq!(suggestions[0].name, "transactions");
    assert_eq!(suggestions[1].name, "by-employee");

    assert_eq!(parse("endpoint").unwrap(), Some(Action::Invalidate(vec![])));
  }

  #[test]
  fn test_parse_blank_line() {
    assert_eq!(parse("   ").unwrap(), None);
  }

  #[test]
  fn test_parse_arguments() {
    assert_eq!(
      parse("b emp-2").unwrap(),
      Some(Action::ByEmployee("emp-2".to_string()))
    );
    assert_eq!(
      parse("approve txn-03").unwrap(),
      Some(Action::Approve {
        transaction_id: "txn-03".to_string(),
        value: true
      })
    );
    assert_eq!(
      parse("approve txn-03 no").unwrap(),
      Some(Action::Approve {
        transaction_id: "txn-03".to_string(),
        value: false
      })
    );
    assert_eq!(
      parse("invalidate transactionsByEmployee employees").unwrap(),
      Some(Action::Invalidate(vec![
        Endpoint::TransactionsByEmployee,
        Endpoint::Employees
      ]))
    );
    assert_eq!(parse("clear").unwrap(), Some(Action::Invalidate(vec![])));
    assert_eq!(parse("stat").unwrap(), Some(Action::Stats));
  }

  #[test]
  fn test_parse_errors() {
    assert!(parse("by-employee").is_err());
    assert!(parse("approve txn-1 maybe").is_err());
    assert!(parse("invalidate nothing").is_err());
    assert!(parse("zzz").is_err());
  }
}
