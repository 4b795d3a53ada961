//! Explicit "unset vs. set" wrapper for optional request fields.
//!
//! The Responses API treats an omitted field and a `null` field
//! differently, so request structs never use a bare `Option` for settings
//! the caller may leave to the provider. [`Omittable::Unset`] fields are
//! skipped during serialization; [`Omittable::Explicit`] fields are always
//! written, even when the value is falsy (`false`, `0`, `"none"`).

use serde::{Serialize, Serializer};

/// A request field that is either left to the provider or explicitly set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Omittable<T> {
    /// No preference; the field is omitted from the request.
    #[default]
    Unset,
    /// An explicit value, serialized as-is.
    Explicit(T),
}

impl<T> Omittable<T> {
    /// Returns `true` if no value was given.
    ///
    /// Used as `#[serde(skip_serializing_if = "Omittable::is_unset")]`.
    #[must_use]
    pub const fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// Returns `true` if a value was given.
    #[must_use]
    pub const fn is_explicit(&self) -> bool {
        matches!(self, Self::Explicit(_))
    }

    /// Borrow the explicit value, if any.
    #[must_use]
    pub const fn as_ref(&self) -> Omittable<&T> {
        match self {
            Self::Unset => Omittable::Unset,
            Self::Explicit(v) => Omittable::Explicit(v),
        }
    }

    /// Convert into an `Option`, losing the distinction from `null`.
    #[must_use]
    pub fn explicit(self) -> Option<T> {
        match self {
            Self::Unset => None,
            Self::Explicit(v) => Some(v),
        }
    }

    /// Map the explicit value.
    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Omittable<U> {
        match self {
            Self::Unset => Omittable::Unset,
            Self::Explicit(v) => Omittable::Explicit(f(v)),
        }
    }
}

/// `None` means "no preference", never "explicitly null".
impl<T> From<Option<T>> for Omittable<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Unset, Self::Explicit)
    }
}

impl<T: Serialize> Serialize for Omittable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Explicit(v) => v.serialize(serializer),
            // Only reached when a field forgets `skip_serializing_if`.
            Self::Unset => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Params {
        #[serde(skip_serializing_if = "Omittable::is_unset")]
        parallel_tool_calls: Omittable<bool>,
        #[serde(skip_serializing_if = "Omittable::is_unset")]
        temperature: Omittable<f32>,
    }

    #[test]
    fn test_unset_is_omitted() {
        let params = Params {
            parallel_tool_calls: Omittable::Unset,
            temperature: Omittable::Unset,
        };
        assert_eq!(serde_json::to_value(&params).unwrap(), json!({}));
    }

    #[test]
    fn test_explicit_falsy_is_kept() {
        let params = Params {
            parallel_tool_calls: Omittable::Explicit(false),
            temperature: Omittable::Explicit(0.0),
        };
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({"parallel_tool_calls": false, "temperature": 0.0})
        );
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Omittable::<u32>::from(None), Omittable::Unset);
        assert_eq!(Omittable::from(Some(7)), Omittable::Explicit(7));
        assert_eq!(Omittable::Explicit(3).map(|v| v * 2).explicit(), Some(6));
    }
}
