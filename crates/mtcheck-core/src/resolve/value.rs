//! Typed property values.
//!
//! Overrides arrive as strings, declared defaults as JSON scalars. Both are
//! turned into a [`PropValue`] using the device type's declared metadata so
//! that `"on"`, `true` and `"true"` compare equal for a boolean property and
//! `"0x10"` equals `16` for an integer one.

use crate::snapshot::model::DeclaredProperty;
use serde_json::Value;
use std::fmt;

/// Value type derived from a declared property's metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropType {
    Bool,
    Int,
    /// Integer that also accepts `K`/`M`/`G`/`T` binary suffixes
    Size,
    Str,
    Enum,
    /// No usable type metadata
    Unknown,
}

impl PropType {
    /// Derive the type of a declared property
    ///
    /// `info.enum_table` wins, then `info.name`, then the JSON type of the
    /// declared default.
    pub fn of_declared(prop: &DeclaredProperty) -> PropType {
        let info = prop.info.as_ref();
        if info
            .and_then(|i| i.enum_table.as_ref())
            .is_some_and(|t| !t.is_null() && t != &Value::Bool(false))
        {
            return PropType::Enum;
        }
        let from_name = info
            .and_then(|i| i.name.as_deref())
            .map(PropType::from_type_name)
            .unwrap_or(PropType::Unknown);
        if from_name != PropType::Unknown {
            return from_name;
        }
        match &prop.defval {
            Some(Value::Bool(_)) => PropType::Bool,
            Some(Value::Number(_)) => PropType::Int,
            Some(Value::String(_)) => PropType::Enum,
            _ => PropType::Unknown,
        }
    }

    /// Map a qdev/QOM type name to a value type
    pub fn from_type_name(name: &str) -> PropType {
        match name {
            "bool" => PropType::Bool,
            "size" => PropType::Size,
            "str" | "string" => PropType::Str,
            n if is_integer_type(n) => PropType::Int,
            n if n.contains('/') => PropType::Enum,
            _ => PropType::Unknown,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PropType::Bool => "bool",
            PropType::Int => "integer",
            PropType::Size => "size",
            PropType::Str => "string",
            PropType::Enum => "enum",
            PropType::Unknown => "untyped",
        }
    }
}

fn is_unsigned_64(prop: &DeclaredProperty) -> bool {
    matches!(
        prop.info.as_ref().and_then(|i| i.name.as_deref()),
        Some("uint64" | "hex64" | "size")
    )
}

fn is_integer_type(name: &str) -> bool {
    let digits = name
        .strip_prefix("uint")
        .or_else(|| name.strip_prefix("int"))
        .or_else(|| name.strip_prefix("hex"));
    matches!(digits, Some("" | "8" | "16" | "32" | "64"))
}

/// A resolved property value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropValue {
    Bool(bool),
    Int(i128),
    Str(String),
    Enum(String),
    /// Raw text whose type is not known
    Untyped(String),
}

/// A string that does not parse as its declared type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueParseError {
    pub raw: String,
    pub expected: PropType,
}

impl PropValue {
    /// Parse override text according to a declared type
    ///
    /// # Errors
    ///
    /// Returns [`ValueParseError`] when `raw` is not a valid `ty` value.
    pub fn parse(raw: &str, ty: PropType) -> Result<PropValue, ValueParseError> {
        let fail = || ValueParseError {
            raw: raw.to_string(),
            expected: ty,
        };
        match ty {
            PropType::Bool => parse_bool(raw).map(PropValue::Bool).ok_or_else(fail),
            PropType::Int => parse_int(raw).map(PropValue::Int).ok_or_else(fail),
            PropType::Size => parse_size(raw).map(PropValue::Int).ok_or_else(fail),
            PropType::Str => Ok(PropValue::Str(raw.to_string())),
            PropType::Enum => Ok(PropValue::Enum(raw.to_string())),
            PropType::Unknown => Ok(PropValue::Untyped(raw.to_string())),
        }
    }

    /// Convert an extracted JSON scalar (declared default or live value)
    pub fn from_json(value: &Value, ty: PropType) -> PropValue {
        match (value, ty) {
            (Value::Bool(b), _) => PropValue::Bool(*b),
            (Value::Number(n), PropType::Bool) => PropValue::Bool(n.as_i64() != Some(0)),
            (Value::Number(n), _) => n
                .as_i64()
                .map(i128::from)
                .or_else(|| n.as_u64().map(i128::from))
                .map(PropValue::Int)
                .unwrap_or_else(|| PropValue::Untyped(n.to_string())),
            (Value::String(s), ty) => {
                PropValue::parse(s, ty).unwrap_or_else(|_| PropValue::Untyped(s.clone()))
            }
            (other, _) => PropValue::Untyped(other.to_string()),
        }
    }

    /// Convert a declared default using the property's metadata
    ///
    /// The extractor writes every integer default as a signed 64-bit value,
    /// so a negative default of an unsigned 64-bit property is read back as
    /// its two's complement.
    pub fn from_declared(prop: &DeclaredProperty, defval: &Value) -> PropValue {
        let ty = PropType::of_declared(prop);
        match PropValue::from_json(defval, ty) {
            PropValue::Int(n) if n < 0 && is_unsigned_64(prop) => PropValue::Int(n + (1i128 << 64)),
            other => other,
        }
    }

    /// The type this value carries
    pub fn prop_type(&self) -> PropType {
        match self {
            PropValue::Bool(_) => PropType::Bool,
            PropValue::Int(_) => PropType::Int,
            PropValue::Str(_) => PropType::Str,
            PropValue::Enum(_) => PropType::Enum,
            PropValue::Untyped(_) => PropType::Unknown,
        }
    }

    /// Typed equality across builds
    ///
    /// A side without type metadata (or a string side facing a typed one) is
    /// reparsed with the other side's type before comparing.
    pub fn matches(&self, other: &PropValue) -> bool {
        match (self, other) {
            (PropValue::Untyped(a), PropValue::Untyped(b)) => a == b,
            (PropValue::Str(a) | PropValue::Enum(a), PropValue::Str(b) | PropValue::Enum(b)) => {
                a == b
            }
            (PropValue::Untyped(raw) | PropValue::Str(raw) | PropValue::Enum(raw), typed)
            | (typed, PropValue::Untyped(raw) | PropValue::Str(raw) | PropValue::Enum(raw)) => {
                PropValue::parse(raw, typed.prop_type()).is_ok_and(|v| &v == typed)
            }
            (a, b) => a == b,
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Bool(b) => write!(f, "{}", b),
            PropValue::Int(i) => write!(f, "{}", i),
            PropValue::Str(s) | PropValue::Enum(s) | PropValue::Untyped(s) => write!(f, "{}", s),
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "on" | "true" | "yes" => Some(true),
        "off" | "false" | "no" => Some(false),
        _ => None,
    }
}

fn parse_int(raw: &str) -> Option<i128> {
    let (negative, body) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };
    let (radix, digits) = match body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        Some(hex) => (16, hex),
        None => (10, body),
    };
    // from_str_radix takes its own sign; only one leading '-' is allowed
    if !digits.chars().next().is_some_and(|c| c.is_digit(radix)) {
        return None;
    }
    let magnitude = i128::from_str_radix(digits, radix).ok()?;
    if negative {
        magnitude.checked_neg()
    } else {
        Some(magnitude)
    }
}

fn parse_size(raw: &str) -> Option<i128> {
    let shift = match raw.chars().last()? {
        'k' | 'K' => 10,
        'M' => 20,
        'G' => 30,
        'T' => 40,
        _ => return parse_int(raw),
    };
    let base = parse_int(&raw[..raw.len() - 1])?;
    base.checked_mul(1i128 << shift)
}
