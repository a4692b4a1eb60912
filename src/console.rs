use color_eyre::{eyre::eyre, Result};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::api::types::Transaction;
use crate::api::Transport;
use crate::commands::{self, Action, COMMANDS};
use crate::context::SessionContext;
use crate::fetch::{CustomFetch, LastError};
use crate::queries::{
  set_transaction_approval, EmployeesQuery, PaginatedTransactionsQuery,
  TransactionsByEmployeeQuery,
};

/// Line-oriented driver: reads commands, runs them through the cache, prints results.
pub struct Console<W: Write> {
  context: SessionContext,
  fetch: CustomFetch,
  errors: Arc<LastError>,

  employees: EmployeesQuery,
  transactions: PaginatedTransactionsQuery,
  by_employee: TransactionsByEmployeeQuery,

  out: W,
  should_quit: bool,
}

impl<W: Write> Console<W> {
  pub fn new(context: SessionContext, transport: Arc<dyn Transport>, out: W) -> Self {
    // Failed requests are shown after the command that caused them
    let errors = Arc::new(LastError::new());
    let context = context.with_errors(errors.clone());
    let fetch = CustomFetch::new(&context, transport);

    Self {
      employees: EmployeesQuery::new(fetch.clone()),
      transactions: PaginatedTransactionsQuery::new(fetch.clone()),
      by_employee: TransactionsByEmployeeQuery::new(fetch.clone()),
      context,
      fetch,
      errors,
      out,
      should_quit: false,
    }
  }

  pub fn into_inner(self) -> W {
    self.out
  }

  pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> Result<()> {
    let mut lines = input.lines();

    self.prompt()?;
    while !self.should_quit {
      let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| eyre!("Failed to read input: {}", e))?
      else {
        break;
      };

      match commands::parse(&line) {
        Ok(Some(action)) => self.execute(action).await?,
        Ok(None) => {}
        Err(e) => writeln!(self.out, "{}", e)?,
      }

      if let Some(message) = self.errors.take() {
        writeln!(self.out, "error: {}", message)?;
      }
      if !self.should_quit {
        self.prompt()?;
      }
    }

    Ok(())
  }

  fn prompt(&mut self) -> Result<()> {
    write!(self.out, "> ")?;
    self.out.flush()?;
    Ok(())
  }

  async fn execute(&mut self, action: Action) -> Result<()> {
    match action {
      Action::Employees => {
        self.employees.fetch_all().await;
        if let Some(employees) = self.employees.data() {
          for employee in employees {
            writeln!(self.out, "{:<8} {}", employee.id, employee.full_name())?;
          }
        }
      }

      Action::Transactions => {
        if !self.transactions.has_next_page() {
          writeln!(self.out, "no more transactions")?;
          return Ok(());
        }
        self.transactions.fetch_all().await;
        if let Some(loaded) = self.transactions.data() {
          write_transactions(&mut self.out, &loaded.data)?;
          match loaded.next_page {
            Some(page) => writeln!(self.out, "-- more available (page {})", page)?,
            None => writeln!(self.out, "-- end of transactions")?,
          }
        }
      }

      Action::ByEmployee(employee_id) => {
        self.by_employee.fetch_by_id(&employee_id).await;
        if let Some(transactions) = self.by_employee.data() {
          write_transactions(&mut self.out, transactions)?;
        }
      }

      Action::Approve {
        transaction_id,
        value,
      } => {
        if set_transaction_approval(&self.fetch, &transaction_id, value).await {
          let verb = if value { "approved" } else { "rejected" };
          writeln!(self.out, "{} {}", transaction_id, verb)?;
          // Accumulated pages would be mixed old and new; start over
          self.transactions.invalidate();
        }
      }

      Action::Dirty(record_id) => {
        self.fetch.mark_dirty(&record_id);
        writeln!(self.out, "{} marked dirty", record_id)?;
      }

      Action::Invalidate(endpoints) => {
        if endpoints.is_empty() {
          self.fetch.invalidate_all();
          writeln!(self.out, "cache cleared")?;
        } else {
          let removed = self.fetch.invalidate_by_endpoints(&endpoints);
          writeln!(self.out, "{} entries removed", removed)?;
        }
        self.employees.invalidate();
        self.transactions.invalidate();
        self.by_employee.invalidate();
      }

      Action::Keys => match &self.context.cache {
        Some(cache) => {
          let mut keys = cache.keys();
          keys.sort();
          for key in &keys {
            writeln!(self.out, "{}", key)?;
          }
          writeln!(self.out, "({} cached)", keys.len())?;
        }
        None => writeln!(self.out, "caching disabled")?,
      },

      Action::Stats => {
        match &self.context.cache {
          Some(_) => writeln!(self.out, "cached entries: {}", self.context.cached_entries())?,
          None => writeln!(self.out, "cached entries: caching disabled")?,
        }
        match &self.context.dirty {
          Some(_) => writeln!(self.out, "dirty records:  {}", self.context.dirty_records())?,
          None => writeln!(self.out, "dirty records:  tracking disabled")?,
        }
        writeln!(self.out, "loading:        {}", self.fetch.loading())?;
      }

      Action::Help => {
        for cmd in COMMANDS {
          writeln!(self.out, "{:<40} {}", cmd.usage, cmd.description)?;
        }
      }

      Action::Quit => self.should_quit = true,
    }

    Ok(())
  }
}

fn write_transactions<W: Write>(out: &mut W, transactions: &[Transaction]) -> Result<()> {
  for t in transactions {
    writeln!(
      out,
      "{:<8} {:>10.2}  {:<22} {:<18} {}  {}",
      t.id,
      t.amount,
      t.merchant,
      t.employee.full_name(),
      t.date,
      if t.approved { "approved" } else { "pending" }
    )?;
  }
  Ok(())
}
