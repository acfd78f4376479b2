//! Fixed binary layouts for calendar values on the driver wire.
//!
//! Field order and widths replicate the ODBC `SQL_DATE_STRUCT` and
//! `SQL_TIMESTAMP_STRUCT` layouts byte for byte; drivers reinterpret the
//! buffer contents as these structs, so the `repr(C)` image and the
//! serialized bytes must agree exactly.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

/// On-the-wire calendar date (`SQL_DATE_STRUCT`): 6 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWire {
    pub year: i16,
    /// 1-12
    pub month: u16,
    /// 1-31
    pub day: u16,
}

/// On-the-wire timestamp (`SQL_TIMESTAMP_STRUCT`): 16 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampWire {
    pub year: i16,
    pub month: u16,
    pub day: u16,
    pub hour: u16,
    pub minute: u16,
    pub second: u16,
    /// Fractional seconds in nanoseconds. The host calendar type carries
    /// microsecond precision; the wire field is that value times 1000.
    pub fraction: u32,
}

impl DateWire {
    /// Serialized size in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Writes the native-endian field sequence into the head of `dest`.
    ///
    /// Panics if `dest` is shorter than [`DateWire::SIZE`].
    pub fn write_into(&self, dest: &mut [u8]) {
        dest[0..2].copy_from_slice(&self.year.to_ne_bytes());
        dest[2..4].copy_from_slice(&self.month.to_ne_bytes());
        dest[4..6].copy_from_slice(&self.day.to_ne_bytes());
    }
}

impl TimestampWire {
    /// Serialized size in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Writes the native-endian field sequence into the head of `dest`.
    ///
    /// Panics if `dest` is shorter than [`TimestampWire::SIZE`].
    pub fn write_into(&self, dest: &mut [u8]) {
        dest[0..2].copy_from_slice(&self.year.to_ne_bytes());
        dest[2..4].copy_from_slice(&self.month.to_ne_bytes());
        dest[4..6].copy_from_slice(&self.day.to_ne_bytes());
        dest[6..8].copy_from_slice(&self.hour.to_ne_bytes());
        dest[8..10].copy_from_slice(&self.minute.to_ne_bytes());
        dest[10..12].copy_from_slice(&self.second.to_ne_bytes());
        dest[12..16].copy_from_slice(&self.fraction.to_ne_bytes());
    }
}

impl From<NaiveDate> for DateWire {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year() as i16,
            month: date.month() as u16,
            day: date.day() as u16,
        }
    }
}

impl From<NaiveDateTime> for TimestampWire {
    fn from(datetime: NaiveDateTime) -> Self {
        // Truncate to whole microseconds before mapping to the nanosecond
        // wire field.
        let micros = datetime.nanosecond() / 1000;
        Self {
            year: datetime.year() as i16,
            month: datetime.month() as u16,
            day: datetime.day() as u16,
            hour: datetime.hour() as u16,
            minute: datetime.minute() as u16,
            second: datetime.second() as u16,
            fraction: micros * 1000,
        }
    }
}
