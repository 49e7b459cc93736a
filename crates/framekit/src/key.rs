//! Lookup keys for frame members.

use crate::{FrameError, FrameResult};
use serde_json::Value as JsonValue;
use std::fmt;

/// A frame lookup key: a user-facing offset or a member name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FrameKey {
    /// Signed offset relative to the return-address slot.
    Offset(i64),
    /// Exact member name.
    Name(String),
}

impl fmt::Display for FrameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameKey::Offset(offset) => write!(f, "{}", offset),
            FrameKey::Name(name) => f.write_str(name),
        }
    }
}

impl From<i64> for FrameKey {
    fn from(offset: i64) -> Self {
        FrameKey::Offset(offset)
    }
}

impl From<&str> for FrameKey {
    fn from(name: &str) -> Self {
        FrameKey::Name(name.to_string())
    }
}

impl From<String> for FrameKey {
    fn from(name: String) -> Self {
        FrameKey::Name(name)
    }
}

/// Anything that can be used to look up a frame member.
///
/// Static integer and string types always convert. Dynamic values are checked
/// and rejected with [`FrameError::InvalidKeyType`] when they are neither.
pub trait AsFrameKey {
    fn to_frame_key(&self) -> FrameResult<FrameKey>;
}

impl AsFrameKey for FrameKey {
    fn to_frame_key(&self) -> FrameResult<FrameKey> {
        Ok(self.clone())
    }
}

impl AsFrameKey for i64 {
    fn to_frame_key(&self) -> FrameResult<FrameKey> {
        Ok(FrameKey::Offset(*self))
    }
}

impl AsFrameKey for i32 {
    fn to_frame_key(&self) -> FrameResult<FrameKey> {
        Ok(FrameKey::Offset(i64::from(*self)))
    }
}

impl AsFrameKey for isize {
    fn to_frame_key(&self) -> FrameResult<FrameKey> {
        Ok(FrameKey::Offset(*self as i64))
    }
}

impl AsFrameKey for str {
    fn to_frame_key(&self) -> FrameResult<FrameKey> {
        Ok(FrameKey::Name(self.to_string()))
    }
}

impl AsFrameKey for String {
    fn to_frame_key(&self) -> FrameResult<FrameKey> {
        Ok(FrameKey::Name(self.clone()))
    }
}

impl AsFrameKey for JsonValue {
    fn to_frame_key(&self) -> FrameResult<FrameKey> {
        match self {
            JsonValue::Number(n) => match n.as_i64() {
                Some(offset) => Ok(FrameKey::Offset(offset)),
                None if n.is_u64() => Err(FrameError::InvalidKeyType(
                    "integer out of offset range".to_string(),
                )),
                None => Err(FrameError::InvalidKeyType("float".to_string())),
            },
            JsonValue::String(name) => Ok(FrameKey::Name(name.clone())),
            JsonValue::Null => Err(FrameError::InvalidKeyType("null".to_string())),
            JsonValue::Bool(_) => Err(FrameError::InvalidKeyType("bool".to_string())),
            JsonValue::Array(_) => Err(FrameError::InvalidKeyType("array".to_string())),
            JsonValue::Object(_) => Err(FrameError::InvalidKeyType("object".to_string())),
        }
    }
}

impl<T: AsFrameKey + ?Sized> AsFrameKey for &T {
    fn to_frame_key(&self) -> FrameResult<FrameKey> {
        (**self).to_frame_key()
    }
}
