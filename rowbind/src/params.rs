//! Parameter type determination and the wire writer set.
//!
//! [`determine_parameter_type`] maps one host value onto the wire type the
//! driver must receive it as, returning a [`ParameterInfo`] descriptor that
//! bundles the chosen [`WireWriter`], the [`TypeCode`], and the payload
//! length a buffer slot must provide. The writer performs the actual binary
//! encoding later, against a caller-owned buffer element.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::EnumIs;

use rowbuf::buffer::{SqlLen, WritableBufferElement};
use rowbuf::wire::{DateWire, TimestampWire};

use crate::error::{BindError, BindResult};
use crate::value::Value;

const BOOLEAN_SIZE: usize = 1;
const INTEGER_SIZE: usize = std::mem::size_of::<i64>();
const DOUBLE_SIZE: usize = std::mem::size_of::<f64>();

/// Closed enumeration of the wire types a value can be classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIs)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TypeCode {
    Boolean,
    Integer,
    FloatingPoint,
    String,
    Unicode,
    Date,
    Timestamp,
}

impl std::fmt::Display for TypeCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TypeCode::Boolean => "boolean",
            TypeCode::Integer => "integer",
            TypeCode::FloatingPoint => "floating_point",
            TypeCode::String => "string",
            TypeCode::Unicode => "unicode",
            TypeCode::Date => "date",
            TypeCode::Timestamp => "timestamp",
        };
        write!(f, "{}", s)
    }
}

/// One of the seven binary encoders, selected at classification time.
///
/// The same value that was classified must be handed back to [`write`];
/// passing a value of a different shape violates the caller contract and
/// panics.
///
/// [`write`]: WireWriter::write
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIs)]
pub enum WireWriter {
    Boolean,
    Integer,
    FloatingPoint,
    NarrowText,
    WideText,
    Date,
    Timestamp,
}

const SHAPE_MISMATCH: &str = "value does not match the shape it was classified with";

impl WireWriter {
    /// Encodes `value` into the slot and stores the payload length in the
    /// slot's indicator.
    ///
    /// Text writers additionally emit a terminating zero byte (narrow) or
    /// zero code unit (wide) past the reported payload length; the slot must
    /// have been allocated with [`ParameterInfo::buffer_capacity`] bytes.
    ///
    /// # Panics
    ///
    /// Panics if `value` has a different shape than the value this writer was
    /// selected for, or if the slot is smaller than the classified capacity.
    pub fn write(&self, value: &Value, dest: &mut WritableBufferElement<'_>) {
        match self {
            WireWriter::Boolean => {
                let flag = value.try_as_bool().expect(SHAPE_MISMATCH);
                dest.data[0] = u8::from(flag);
                *dest.indicator = BOOLEAN_SIZE as SqlLen;
            }
            WireWriter::Integer => {
                let int = value.try_as_int64().expect(SHAPE_MISMATCH);
                dest.data[..INTEGER_SIZE].copy_from_slice(&int.to_ne_bytes());
                *dest.indicator = INTEGER_SIZE as SqlLen;
            }
            WireWriter::FloatingPoint => {
                let float = value.try_as_double().expect(SHAPE_MISMATCH);
                dest.data[..DOUBLE_SIZE].copy_from_slice(&float.to_ne_bytes());
                *dest.indicator = DOUBLE_SIZE as SqlLen;
            }
            WireWriter::NarrowText => {
                let bytes = value.try_as_narrow().expect(SHAPE_MISMATCH);
                dest.data[..bytes.len()].copy_from_slice(bytes);
                dest.data[bytes.len()] = 0;
                *dest.indicator = bytes.len() as SqlLen;
            }
            WireWriter::WideText => {
                let units = value.try_as_wide().expect(SHAPE_MISMATCH);
                let mut offset = 0;
                for unit in units {
                    dest.data[offset..offset + 2].copy_from_slice(&unit.to_ne_bytes());
                    offset += 2;
                }
                dest.data[offset..offset + 2].copy_from_slice(&0u16.to_ne_bytes());
                *dest.indicator = offset as SqlLen;
            }
            WireWriter::Date => {
                let date = value.try_as_date().expect(SHAPE_MISMATCH);
                DateWire::from(date).write_into(dest.data);
                *dest.indicator = DateWire::SIZE as SqlLen;
            }
            WireWriter::Timestamp => {
                let datetime = value.try_as_datetime().expect(SHAPE_MISMATCH);
                TimestampWire::from(datetime).write_into(dest.data);
                *dest.indicator = TimestampWire::SIZE as SqlLen;
            }
        }
    }
}

/// Classifier output: which writer to use, which wire type the driver sees,
/// and how many payload bytes a buffer slot needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterInfo {
    pub writer: WireWriter,
    pub type_code: TypeCode,
    /// Payload bytes, excluding the text terminator. For fixed-size codes
    /// this is the wire struct size.
    pub required_length: usize,
}

impl ParameterInfo {
    /// Bytes a buffer slot must be allocated with: the payload length, plus
    /// room for the physically written terminator of the text codes.
    pub fn buffer_capacity(&self) -> usize {
        match self.type_code {
            TypeCode::String => self.required_length + 1,
            TypeCode::Unicode => self.required_length + 2,
            _ => self.required_length,
        }
    }
}

/// Determines the wire type of one host value.
///
/// Classification is ordered and first-match-wins; the order resolves the
/// ambiguities among mutually convertible types. `hint` is the wire type a
/// previous classification (or column metadata) established for this
/// parameter; it decides between the narrow and wide text encodings, which a
/// text value's own runtime type cannot distinguish.
///
/// Fails with [`BindError::UnsupportedType`] when no branch matches.
pub fn determine_parameter_type(
    value: &Value,
    hint: Option<TypeCode>,
) -> BindResult<ParameterInfo> {
    let info = classify(value, hint)?;
    log::trace!(
        "classified host `{}` as `{}` ({} bytes)",
        value.type_name(),
        info.type_code,
        info.required_length
    );
    Ok(info)
}

fn classify(value: &Value, hint: Option<TypeCode>) -> BindResult<ParameterInfo> {
    // Order matters: host booleans are also int-convertible, and a datetime
    // also satisfies the plain-date check.
    if value.is_bool() {
        return Ok(ParameterInfo {
            writer: WireWriter::Boolean,
            type_code: TypeCode::Boolean,
            required_length: BOOLEAN_SIZE,
        });
    }
    if value.try_as_int64().is_some() {
        return Ok(ParameterInfo {
            writer: WireWriter::Integer,
            type_code: TypeCode::Integer,
            required_length: INTEGER_SIZE,
        });
    }
    if value.try_as_double().is_some() {
        return Ok(ParameterInfo {
            writer: WireWriter::FloatingPoint,
            type_code: TypeCode::FloatingPoint,
            required_length: DOUBLE_SIZE,
        });
    }
    if hint == Some(TypeCode::Unicode) {
        if let Some(units) = value.try_as_wide() {
            return Ok(ParameterInfo {
                writer: WireWriter::WideText,
                type_code: TypeCode::Unicode,
                required_length: 2 * units.count(),
            });
        }
    } else if let Some(bytes) = value.try_as_narrow() {
        return Ok(ParameterInfo {
            writer: WireWriter::NarrowText,
            type_code: TypeCode::String,
            required_length: bytes.len(),
        });
    }
    if value.is_date_time() {
        return Ok(ParameterInfo {
            writer: WireWriter::Timestamp,
            type_code: TypeCode::Timestamp,
            required_length: TimestampWire::SIZE,
        });
    }
    if value.is_date() {
        return Ok(ParameterInfo {
            writer: WireWriter::Date,
            type_code: TypeCode::Date,
            required_length: DateWire::SIZE,
        });
    }
    Err(BindError::UnsupportedType {
        type_name: value.type_name(),
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use rowbuf::buffer::ColumnBuffer;

    fn classify_ok(value: &Value, hint: Option<TypeCode>) -> ParameterInfo {
        determine_parameter_type(value, hint).expect("classification should succeed")
    }

    fn write_one(info: ParameterInfo, value: &Value) -> (Vec<u8>, SqlLen) {
        let mut buffer = ColumnBuffer::new(info.buffer_capacity(), 1);
        {
            let mut element = buffer.element_at(0);
            info.writer.write(value, &mut element);
        }
        (buffer.data_at(0).to_vec(), buffer.indicator_at(0))
    }

    #[test]
    fn booleans_classify_as_boolean_despite_int_convertibility() {
        for flag in [true, false] {
            let info = classify_ok(&Value::Bool(flag), None);
            assert_eq!(info.type_code, TypeCode::Boolean);
            assert_eq!(info.writer, WireWriter::Boolean);
            assert_eq!(info.required_length, 1);
        }
    }

    #[test]
    fn int_convertible_non_booleans_classify_as_integer() {
        let info = classify_ok(&Value::Int(-17), None);
        assert_eq!(info.type_code, TypeCode::Integer);
        assert_eq!(info.required_length, 8);

        // An integral double is losslessly int-representable.
        let info = classify_ok(&Value::Float(4.0), None);
        assert_eq!(info.type_code, TypeCode::Integer);
    }

    #[test]
    fn lossy_doubles_classify_as_floating_point() {
        let info = classify_ok(&Value::Float(2.5), None);
        assert_eq!(info.type_code, TypeCode::FloatingPoint);
        assert_eq!(info.writer, WireWriter::FloatingPoint);
        assert_eq!(info.required_length, 8);
    }

    #[test]
    fn text_without_hint_classifies_narrow() {
        let info = classify_ok(&Value::from("héllo"), None);
        assert_eq!(info.type_code, TypeCode::String);
        assert_eq!(info.required_length, "héllo".len());
        assert_eq!(info.buffer_capacity(), "héllo".len() + 1);
    }

    #[test]
    fn text_with_string_hint_still_classifies_narrow() {
        let info = classify_ok(&Value::from("ab"), Some(TypeCode::String));
        assert_eq!(info.type_code, TypeCode::String);
        assert_eq!(info.required_length, 2);
    }

    #[test]
    fn text_with_unicode_hint_classifies_wide() {
        // U+1F600 needs a surrogate pair: 6 code units total for "ab😀".
        let info = classify_ok(&Value::from("ab\u{1F600}"), Some(TypeCode::Unicode));
        assert_eq!(info.type_code, TypeCode::Unicode);
        assert_eq!(info.writer, WireWriter::WideText);
        assert_eq!(info.required_length, 8);
        assert_eq!(info.buffer_capacity(), 10);
    }

    #[test]
    fn datetimes_classify_as_timestamp_never_date() {
        let datetime = NaiveDate::from_ymd_opt(2020, 1, 2)
            .expect("valid date")
            .and_hms_opt(3, 4, 5)
            .expect("valid time");
        let info = classify_ok(&Value::from(datetime), None);
        assert_eq!(info.type_code, TypeCode::Timestamp);
        assert_eq!(info.required_length, TimestampWire::SIZE);
    }

    #[test]
    fn pure_dates_classify_as_date() {
        let date = NaiveDate::from_ymd_opt(2020, 1, 2).expect("valid date");
        let info = classify_ok(&Value::from(date), None);
        assert_eq!(info.type_code, TypeCode::Date);
        assert_eq!(info.required_length, DateWire::SIZE);
    }

    #[test]
    fn unmatched_values_report_unsupported_type() {
        let err = determine_parameter_type(&Value::Null, None)
            .expect_err("null has no wire representation");
        match err {
            BindError::UnsupportedType { type_name } => assert_eq!(type_name, "none"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn integer_write_roundtrips_bit_exact() {
        let value = Value::Int(-123_456_789_012_345);
        let info = classify_ok(&value, None);
        let (bytes, indicator) = write_one(info, &value);
        assert_eq!(indicator, 8);
        let restored = i64::from_ne_bytes(bytes[..8].try_into().expect("8 bytes"));
        assert_eq!(restored, -123_456_789_012_345);
    }

    #[test]
    fn double_write_roundtrips_bit_exact() {
        let value = Value::Float(std::f64::consts::PI);
        let info = classify_ok(&value, None);
        let (bytes, indicator) = write_one(info, &value);
        assert_eq!(indicator, 8);
        let restored = f64::from_ne_bytes(bytes[..8].try_into().expect("8 bytes"));
        assert_eq!(restored.to_bits(), std::f64::consts::PI.to_bits());
    }

    #[test]
    fn boolean_write_emits_single_byte_flag() {
        for (flag, expected) in [(true, 1u8), (false, 0u8)] {
            let value = Value::Bool(flag);
            let info = classify_ok(&value, None);
            let (bytes, indicator) = write_one(info, &value);
            assert_eq!(indicator, 1);
            assert_eq!(bytes[0], expected);
        }
    }

    #[test]
    fn narrow_write_appends_terminator_past_indicator() {
        let value = Value::from("ab");
        let info = classify_ok(&value, None);
        let (bytes, indicator) = write_one(info, &value);
        assert_eq!(indicator, 2);
        assert_eq!(&bytes[..3], &[b'a', b'b', 0]);
    }

    #[test]
    fn wide_write_appends_zero_code_unit_past_indicator() {
        let value = Value::from("ab");
        let info = classify_ok(&value, Some(TypeCode::Unicode));
        let (bytes, indicator) = write_one(info, &value);
        assert_eq!(indicator, 4);

        let mut expected = Vec::new();
        for unit in [b'a' as u16, b'b' as u16, 0u16] {
            expected.extend_from_slice(&unit.to_ne_bytes());
        }
        assert_eq!(&bytes[..6], &expected[..]);
    }

    #[test]
    fn date_write_emits_wire_struct() {
        let date = NaiveDate::from_ymd_opt(1999, 12, 31).expect("valid date");
        let value = Value::from(date);
        let info = classify_ok(&value, None);
        let (bytes, indicator) = write_one(info, &value);
        assert_eq!(indicator, DateWire::SIZE as SqlLen);

        let mut expected = [0u8; DateWire::SIZE];
        DateWire::from(date).write_into(&mut expected);
        assert_eq!(&bytes[..], &expected[..]);
    }

    #[test]
    fn timestamp_write_maps_microseconds_to_nanoseconds() {
        let datetime = NaiveDate::from_ymd_opt(2015, 6, 7)
            .expect("valid date")
            .and_hms_micro_opt(20, 21, 22, 500_000)
            .expect("valid time");
        let value = Value::from(datetime);
        let info = classify_ok(&value, None);
        let (bytes, indicator) = write_one(info, &value);
        assert_eq!(indicator, TimestampWire::SIZE as SqlLen);

        let fraction = u32::from_ne_bytes(bytes[12..16].try_into().expect("4 bytes"));
        assert_eq!(fraction, 500_000_000);
    }

    #[test]
    #[should_panic(expected = "value does not match")]
    fn writer_rejects_value_of_different_shape() {
        let info = classify_ok(&Value::Int(1), None);
        let mut buffer = ColumnBuffer::new(8, 1);
        let mut element = buffer.element_at(0);
        info.writer.write(&Value::from("not an int"), &mut element);
    }
}
