//! rowbind: marshalling of dynamically typed host values into fixed-layout
//! driver parameter buffers.
//!
//! The crate centers on two operations:
//! - [`determine_parameter_type`]: classify one host [`Value`] (optionally
//!   disambiguated by a [`TypeCode`] hint from column metadata) into a
//!   [`ParameterInfo`] descriptor naming the wire type, the writer for it,
//!   and the byte length a buffer slot must provide; and
//! - [`params::WireWriter::write`]: encode that value into a caller-owned
//!   buffer slot together with its length indicator.
//!
//! [`ParameterSet`] is the batch-side caller of the pair: it owns one column
//! buffer per parameter, caches descriptors across type-stable rows, and
//! rebinds when a value no longer fits. [`connect`] holds the thin
//! connection/cursor surface that drives a parameter set against a driver
//! session.

pub mod batch;
pub mod connect;
pub mod error;
pub mod params;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;
pub mod value;

pub use batch::ParameterSet;
pub use connect::{Connection, Cursor, DriverSession, StatementExecutor};
pub use error::{BindError, BindResult};
pub use params::{ParameterInfo, TypeCode, WireWriter, determine_parameter_type};
pub use value::Value;
