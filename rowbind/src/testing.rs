//! Recording driver doubles for tests of code built on the binding surface.
//!
//! [`RecordingSession`] satisfies [`DriverSession`] without any live driver:
//! statements capture a byte-level copy of every executed batch, and commits
//! are counted (or made to fail, for error-path tests).

use std::sync::{Arc, Mutex};

use crate::batch::ParameterSet;
use crate::connect::{DriverSession, StatementExecutor};
use crate::error::{BindError, BindResult};
use crate::params::TypeCode;
use rowbuf::buffer::SqlLen;

/// One captured buffer slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedElement {
    pub bytes: Vec<u8>,
    pub indicator: SqlLen,
}

/// One captured parameter column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedColumn {
    pub type_code: Option<TypeCode>,
    pub elements: Vec<CapturedElement>,
}

/// Byte-level copy of one executed batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedBatch {
    pub rows: usize,
    pub columns: Vec<CapturedColumn>,
}

impl ExecutedBatch {
    fn capture(parameters: &ParameterSet) -> Self {
        let rows = parameters.rows_bound();
        let columns = (0..parameters.parameter_count())
            .map(|index| {
                let column = parameters.column(index);
                CapturedColumn {
                    type_code: parameters.parameter_info(index).map(|info| info.type_code),
                    elements: (0..rows)
                        .map(|row| CapturedElement {
                            bytes: column.data_at(row).to_vec(),
                            indicator: column.indicator_at(row),
                        })
                        .collect(),
                }
            })
            .collect();
        Self { rows, columns }
    }
}

/// Everything a [`RecordingSession`] observed.
#[derive(Debug, Default)]
pub struct SessionLog {
    pub commits: usize,
    pub batches: Vec<ExecutedBatch>,
}

/// Driver session double that records instead of talking to a driver.
#[derive(Debug, Clone, Default)]
pub struct RecordingSession {
    log: Arc<Mutex<SessionLog>>,
    commit_error: Option<String>,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// A session whose commits fail with the given driver message.
    pub fn failing_commit(message: impl Into<String>) -> Self {
        Self {
            log: Arc::default(),
            commit_error: Some(message.into()),
        }
    }

    /// Shared view of the recorded activity; clones of this session (and the
    /// statements they hand out) feed the same log.
    pub fn log(&self) -> Arc<Mutex<SessionLog>> {
        Arc::clone(&self.log)
    }
}

impl DriverSession for RecordingSession {
    fn commit(&mut self) -> BindResult<()> {
        if let Some(message) = &self.commit_error {
            return Err(BindError::Driver {
                message: message.clone(),
            });
        }
        self.log.lock().unwrap().commits += 1;
        Ok(())
    }

    fn new_statement(&mut self) -> BindResult<Box<dyn StatementExecutor>> {
        Ok(Box::new(RecordingStatement {
            log: Arc::clone(&self.log),
        }))
    }
}

/// Statement double handed out by [`RecordingSession`].
#[derive(Debug)]
pub struct RecordingStatement {
    log: Arc<Mutex<SessionLog>>,
}

impl StatementExecutor for RecordingStatement {
    fn execute(&mut self, parameters: &ParameterSet) -> BindResult<u64> {
        let rows = parameters.rows_bound() as u64;
        self.log
            .lock()
            .unwrap()
            .batches
            .push(ExecutedBatch::capture(parameters));
        Ok(rows)
    }
}
