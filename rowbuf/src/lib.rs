pub mod buffer;
pub mod wire;

pub use buffer::{ColumnBuffer, NULL_DATA, SqlLen, WritableBufferElement};
pub use wire::{DateWire, TimestampWire};
