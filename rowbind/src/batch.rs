//! Batch-side parameter binding.
//!
//! [`ParameterSet`] owns one column buffer per parameter across a batch of
//! rows and drives the classifier/writer pair once per value per bound row.
//! Descriptors are cached while a parameter's wire type stays stable; a value
//! that no longer fits (or classifies differently) triggers a rebind of that
//! parameter's buffer.

use rowbuf::buffer::ColumnBuffer;

use crate::error::{BindError, BindResult};
use crate::params::{ParameterInfo, determine_parameter_type};
use crate::value::Value;

/// Element capacity parameters start out with, before the first
/// classification establishes a real requirement.
const INITIAL_ELEMENT_SIZE: usize = 8;

#[derive(Debug)]
struct Parameter {
    buffer: ColumnBuffer,
    /// Last classification of this parameter. Its type code is fed back into
    /// the classifier as the hint for subsequent rows.
    info: Option<ParameterInfo>,
}

impl Parameter {
    fn new(rows: usize) -> Self {
        Self {
            buffer: ColumnBuffer::new(INITIAL_ELEMENT_SIZE, rows),
            info: None,
        }
    }

    /// Replaces the buffer with a larger-element one, carrying over the rows
    /// already bound in this batch.
    fn grow(&mut self, element_size: usize, rows_bound: usize) {
        let mut grown = ColumnBuffer::new(element_size, self.buffer.rows());
        for row in 0..rows_bound {
            let source = self.buffer.data_at(row);
            let destination = grown.element_at(row);
            destination.data[..source.len()].copy_from_slice(source);
            *destination.indicator = self.buffer.indicator_at(row);
        }
        self.buffer = grown;
    }
}

/// Parameter buffers for one statement, bound row by row.
#[derive(Debug)]
pub struct ParameterSet {
    parameters: Vec<Parameter>,
    rows_per_batch: usize,
    rows_bound: usize,
}

impl ParameterSet {
    /// Creates buffers for `parameter_count` parameters, each holding up to
    /// `rows_per_batch` rows.
    pub fn new(parameter_count: usize, rows_per_batch: usize) -> Self {
        Self {
            parameters: (0..parameter_count).map(|_| Parameter::new(rows_per_batch)).collect(),
            rows_per_batch,
            rows_bound: 0,
        }
    }

    #[inline]
    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    #[inline]
    pub fn rows_per_batch(&self) -> usize {
        self.rows_per_batch
    }

    /// Rows bound since the last [`clear`](Self::clear).
    #[inline]
    pub fn rows_bound(&self) -> usize {
        self.rows_bound
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.rows_bound == self.rows_per_batch
    }

    /// Forgets the bound rows. Buffers and cached descriptors survive, so a
    /// type-stable column keeps its binding across batches.
    pub fn clear(&mut self) {
        self.rows_bound = 0;
    }

    /// Column buffer of one parameter, for the executor to hand to the
    /// driver.
    pub fn column(&self, parameter: usize) -> &ColumnBuffer {
        &self.parameters[parameter].buffer
    }

    /// Last classification of one parameter, if any value was bound to it.
    pub fn parameter_info(&self, parameter: usize) -> Option<ParameterInfo> {
        self.parameters[parameter].info
    }

    /// Binds one row of values into the next free row slot.
    ///
    /// Null values set the slot's no-data indicator without classification;
    /// every other value is classified (hinted by the parameter's previous
    /// type code) and encoded by the selected writer.
    ///
    /// # Panics
    ///
    /// Panics if the batch is already full; callers flush via their executor
    /// and [`clear`](Self::clear) first.
    pub fn bind_row(&mut self, row: &[Value]) -> BindResult<()> {
        assert!(!self.is_full(), "parameter batch is full");
        if row.len() != self.parameters.len() {
            return Err(BindError::ParameterCountMismatch {
                expected: self.parameters.len(),
                actual: row.len(),
            });
        }

        let row_index = self.rows_bound;
        for (index, (parameter, value)) in self.parameters.iter_mut().zip(row).enumerate() {
            bind_value(parameter, index, row_index, value)?;
        }
        self.rows_bound += 1;
        Ok(())
    }
}

fn bind_value(
    parameter: &mut Parameter,
    index: usize,
    row_index: usize,
    value: &Value,
) -> BindResult<()> {
    if value.is_null() {
        parameter.buffer.element_at(row_index).set_null();
        return Ok(());
    }

    let hint = parameter.info.map(|info| info.type_code);
    let info = determine_parameter_type(value, hint)?;

    let type_changed = parameter
        .info
        .is_some_and(|cached| cached.type_code != info.type_code);
    let capacity = info.buffer_capacity();
    if type_changed || parameter.buffer.element_size() < capacity {
        let element_size = parameter.buffer.element_size().max(capacity);
        log::debug!(
            "rebinding parameter {} as `{}` with {}-byte elements",
            index,
            info.type_code,
            element_size
        );
        parameter.grow(element_size, row_index);
    }

    parameter.info = Some(info);
    let mut element = parameter.buffer.element_at(row_index);
    info.writer.write(value, &mut element);
    Ok(())
}
