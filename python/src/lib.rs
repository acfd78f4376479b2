use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime};
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyBytes, PyDate, PyDateTime, PyFloat, PyInt, PyString};

use rowbind::testing::RecordingSession;
use rowbind::{BindError, Value, connect as rowbind_connect};

static DATETIME_MACHINERY: OnceLock<()> = OnceLock::new();

/// Loads Python's datetime machinery once per process, before the first
/// calendar extraction. Idempotent; never torn down.
fn ensure_datetime_loaded(py: Python<'_>) -> PyResult<()> {
    if DATETIME_MACHINERY.get().is_some() {
        return Ok(());
    }
    py.import("datetime")?;
    let _ = DATETIME_MACHINERY.set(());
    Ok(())
}

fn bind_error_to_py(error: BindError) -> PyErr {
    match &error {
        BindError::UnsupportedType { .. } => {
            PyErr::new::<pyo3::exceptions::PyTypeError, _>(error.to_string())
        }
        _ => PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(error.to_string()),
    }
}

/// Maps one Python object onto the dynamic value model of the binding core.
fn extract_value(any: &Bound<'_, PyAny>) -> PyResult<Value> {
    if any.is_none() {
        return Ok(Value::Null);
    }
    // bool is a subtype of int in Python; check it first.
    if any.is_instance_of::<PyBool>() {
        return Ok(Value::Bool(any.extract()?));
    }
    if any.is_instance_of::<PyInt>() {
        if let Ok(int) = any.extract::<i64>() {
            return Ok(Value::Int(int));
        }
        // Integers beyond i64 still bind, as doubles.
        return Ok(Value::Float(any.extract::<f64>()?));
    }
    if any.is_instance_of::<PyFloat>() {
        return Ok(Value::Float(any.extract()?));
    }
    if any.is_instance_of::<PyString>() {
        return Ok(Value::Text(any.extract()?));
    }
    if any.is_instance_of::<PyBytes>() {
        return Ok(Value::Bytes(any.extract()?));
    }
    ensure_datetime_loaded(any.py())?;
    // datetime is a subclass of date; check the more specific type first.
    if any.is_instance_of::<PyDateTime>() {
        return Ok(Value::DateTime(any.extract::<NaiveDateTime>()?));
    }
    if any.is_instance_of::<PyDate>() {
        return Ok(Value::Date(any.extract::<NaiveDate>()?));
    }
    Err(PyErr::new::<pyo3::exceptions::PyTypeError, _>(format!(
        "cannot bind Python value of type '{}'",
        any.get_type().name()?
    )))
}

fn extract_row(row: &Bound<'_, PyAny>) -> PyResult<Vec<Value>> {
    row.try_iter()?
        .map(|item| extract_value(&item?))
        .collect()
}

#[pyclass(unsendable)]
pub struct Connection {
    inner: rowbind_connect::Connection,
}

#[pymethods]
impl Connection {
    fn commit(&mut self) -> PyResult<()> {
        self.inner.commit().map_err(bind_error_to_py)
    }

    fn cursor(&mut self) -> PyResult<Cursor> {
        let inner = self.inner.make_cursor().map_err(bind_error_to_py)?;
        Ok(Cursor { inner })
    }
}

#[pyclass(unsendable)]
pub struct Cursor {
    inner: rowbind_connect::Cursor,
}

#[pymethods]
impl Cursor {
    fn execute(&mut self, parameters: &Bound<'_, PyAny>) -> PyResult<u64> {
        let row = extract_row(parameters)?;
        self.inner.execute(&row).map_err(bind_error_to_py)
    }

    fn executemany(&mut self, parameter_rows: &Bound<'_, PyAny>) -> PyResult<u64> {
        let rows: Vec<Vec<Value>> = parameter_rows
            .try_iter()?
            .map(|row| extract_row(&row?))
            .collect::<PyResult<_>>()?;
        self.inner.execute_many(&rows).map_err(bind_error_to_py)
    }

    #[getter]
    fn rowcount(&self) -> u64 {
        self.inner.row_count()
    }
}

/// Creates a connection backed by a recording driver session; no live driver
/// is linked into this module.
#[pyfunction]
fn connect() -> PyResult<Connection> {
    Ok(Connection {
        inner: rowbind_connect::Connection::new(Box::new(RecordingSession::new())),
    })
}

#[pymodule]
#[pyo3(name = "_sys")]
fn rowpy_sys(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Connection>()?;
    m.add_class::<Cursor>()?;

    m.add_function(wrap_pyfunction!(connect, m)?)?;
    Ok(())
}
