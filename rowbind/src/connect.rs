//! Connection and cursor surface over a driver session.
//!
//! The driver lifecycle itself lives behind [`DriverSession`] and
//! [`StatementExecutor`]; this module only guarantees that every executed
//! parameter row passes through the classifier/writer pair exactly once per
//! value before the bound buffers reach the executor.

use crate::batch::ParameterSet;
use crate::error::BindResult;
use crate::value::Value;

/// Rows a cursor buffers per batch before handing them to the executor.
const DEFAULT_ROWS_PER_BATCH: usize = 1000;

/// Executes a prepared statement against buffers bound by a [`ParameterSet`].
pub trait StatementExecutor {
    /// Runs the statement once per bound row and reports the affected row
    /// count.
    fn execute(&mut self, parameters: &ParameterSet) -> BindResult<u64>;
}

/// An open driver connection.
pub trait DriverSession {
    /// Finalizes pending work. Driver-reported failures surface as
    /// [`BindError::Driver`](crate::error::BindError::Driver).
    fn commit(&mut self) -> BindResult<()>;

    /// Produces a fresh statement bound to this connection.
    fn new_statement(&mut self) -> BindResult<Box<dyn StatementExecutor>>;
}

/// Connection-like object of the binding surface.
pub struct Connection {
    session: Box<dyn DriverSession>,
}

impl Connection {
    pub fn new(session: Box<dyn DriverSession>) -> Self {
        Self { session }
    }

    pub fn commit(&mut self) -> BindResult<()> {
        self.session.commit()
    }

    pub fn make_cursor(&mut self) -> BindResult<Cursor> {
        Ok(Cursor {
            statement: self.session.new_statement()?,
            parameters: None,
            rows_per_batch: DEFAULT_ROWS_PER_BATCH,
            row_count: 0,
        })
    }
}

/// Cursor-like statement handle. Parameter buffers are created lazily from
/// the first executed row's arity and kept across executions.
pub struct Cursor {
    statement: Box<dyn StatementExecutor>,
    parameters: Option<ParameterSet>,
    rows_per_batch: usize,
    row_count: u64,
}

impl Cursor {
    /// Executes the statement with one parameter row.
    pub fn execute(&mut self, row: &[Value]) -> BindResult<u64> {
        let rows = [row.to_vec()];
        self.execute_many(&rows)
    }

    /// Executes the statement once per parameter row, flushing full batches
    /// as it goes. Returns the total affected row count.
    pub fn execute_many(&mut self, rows: &[Vec<Value>]) -> BindResult<u64> {
        let Some(first) = rows.first() else {
            self.row_count = 0;
            return Ok(0);
        };

        let needs_new_set = self
            .parameters
            .as_ref()
            .is_none_or(|set| set.parameter_count() != first.len());
        if needs_new_set {
            self.parameters = Some(ParameterSet::new(first.len(), self.rows_per_batch));
        }
        let set = self
            .parameters
            .as_mut()
            .expect("parameter set exists after initialization");
        set.clear();

        let mut total = 0;
        for row in rows {
            if set.is_full() {
                total += self.statement.execute(&*set)?;
                set.clear();
            }
            set.bind_row(row)?;
        }
        if set.rows_bound() > 0 {
            total += self.statement.execute(&*set)?;
            set.clear();
        }

        self.row_count = total;
        Ok(total)
    }

    /// Affected row count of the last execution.
    #[inline]
    pub fn row_count(&self) -> u64 {
        self.row_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::TypeCode;
    use crate::testing::RecordingSession;

    #[test]
    fn execute_reaches_the_statement_with_bound_buffers() {
        let session = RecordingSession::new();
        let mut connection = Connection::new(Box::new(session.clone()));
        let mut cursor = connection.make_cursor().expect("cursor");

        cursor
            .execute(&[Value::Int(42), Value::from("ab")])
            .expect("execution succeeds");
        assert_eq!(cursor.row_count(), 1);

        let log = session.log();
        let log = log.lock().unwrap();
        assert_eq!(log.batches.len(), 1);
        let batch = &log.batches[0];
        assert_eq!(batch.rows, 1);
        assert_eq!(batch.columns[0].type_code, Some(TypeCode::Integer));
        assert_eq!(batch.columns[1].type_code, Some(TypeCode::String));
        assert_eq!(batch.columns[1].elements[0].indicator, 2);
    }

    #[test]
    fn execute_many_flushes_full_batches() {
        let session = RecordingSession::new();
        let mut connection = Connection::new(Box::new(session.clone()));
        let mut cursor = connection.make_cursor().expect("cursor");

        let rows: Vec<Vec<Value>> = (0..2500).map(|i| vec![Value::Int(i)]).collect();
        let total = cursor.execute_many(&rows).expect("execution succeeds");
        assert_eq!(total, 2500);

        let log = session.log();
        let log = log.lock().unwrap();
        assert_eq!(log.batches.len(), 3, "1000 + 1000 + 500");
        assert_eq!(log.batches[2].rows, 500);
    }

    #[test]
    fn commit_passes_through_driver_errors() {
        let failing = RecordingSession::failing_commit("deadlock detected");
        let mut connection = Connection::new(Box::new(failing));
        let err = connection.commit().expect_err("commit must fail");
        assert!(err.to_string().contains("deadlock detected"));
    }

    #[test]
    fn commit_is_counted_on_success() {
        let session = RecordingSession::new();
        let mut connection = Connection::new(Box::new(session.clone()));
        connection.commit().expect("commit succeeds");
        connection.commit().expect("commit succeeds");
        assert_eq!(session.log().lock().unwrap().commits, 2);
    }

    #[test]
    fn empty_execute_many_touches_nothing() {
        let session = RecordingSession::new();
        let mut connection = Connection::new(Box::new(session.clone()));
        let mut cursor = connection.make_cursor().expect("cursor");
        assert_eq!(cursor.execute_many(&[]).expect("no-op"), 0);
        assert!(session.log().lock().unwrap().batches.is_empty());
    }
}
