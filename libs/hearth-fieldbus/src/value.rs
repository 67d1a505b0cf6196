//! Typed Point Values
//!
//! Value type points report to the platform.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Value type for point data exchange
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum PointValue {
    Text(Cow<'static, str>),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl From<f64> for PointValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<i64> for PointValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<&str> for PointValue {
    fn from(v: &str) -> Self {
        Self::Text(Cow::Owned(v.to_string()))
    }
}

impl From<String> for PointValue {
    fn from(v: String) -> Self {
        Self::Text(Cow::Owned(v))
    }
}

impl From<bool> for PointValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<u16> for PointValue {
    fn from(v: u16) -> Self {
        Self::Integer(v as i64)
    }
}

impl PointValue {
    /// Try to convert to f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Integer(i) => Some(*i as f64),
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Text(s) => s.parse().ok(),
            Self::Null => None,
        }
    }

    /// Try to convert to bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Integer(i) => Some(*i != 0),
            Self::Float(f) => Some(*f != 0.0),
            Self::Text(s) => match s.to_lowercase().as_str() {
                "true" | "1" | "on" => Some(true),
                "false" | "0" | "off" => Some(false),
                _ => None,
            },
            Self::Null => None,
        }
    }

    /// Convert to String
    pub fn as_string(&self) -> String {
        match self {
            Self::Text(s) => s.to_string(),
            Self::Integer(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Null => String::new(),
        }
    }

    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}
