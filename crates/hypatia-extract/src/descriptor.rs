//! Parameter descriptors.
//!
//! A [`ParameterDescriptor`] records where one field of a composite parameter
//! type arrives from and under which transport name. Descriptors are derived
//! from a type's declaration once, at route registration, and drive both
//! binding and documentation.

use serde::de::DeserializeOwned;

use hypatia_schema::Reflect;

/// The request location a parameter is extracted from.
///
/// The source determines the extraction and case-sensitivity rules: header
/// names fold case-insensitively, query and body field names match exactly,
/// path parameters are matched by URL template slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterSource {
    /// A URL template slot (`/users/{user_id}`).
    Path,
    /// A query-string key.
    Query,
    /// An HTTP header.
    Header,
    /// A field of the decoded request body.
    Body,
}

impl std::fmt::Display for ParameterSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path => write!(f, "path"),
            Self::Query => write!(f, "query"),
            Self::Header => write!(f, "header"),
            Self::Body => write!(f, "body"),
        }
    }
}

/// Where one declared field of a composite parameter type comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDescriptor {
    /// The field name in the declared type.
    pub field: &'static str,
    /// The name as it appears in the transport (header name, query key,
    /// template slot, body field). Often equal to `field`.
    pub raw_name: &'static str,
    /// Which request location supplies the value.
    pub source: ParameterSource,
    /// Whether binding fails when the value is absent.
    pub required: bool,
}

/// A composite parameter type: deserializable, reflectable, and carrying a
/// descriptor per declared field.
///
/// A single type may aggregate fields from several sources simultaneously;
/// the binder merges all of them into one constructed value. Implemented via
/// [`parameter_object!`](crate::parameter_object).
pub trait ParameterObject: DeserializeOwned + Reflect {
    /// The per-field descriptors, in declaration order.
    fn descriptors() -> Vec<ParameterDescriptor>;
}

impl ParameterObject for () {
    fn descriptors() -> Vec<ParameterDescriptor> {
        Vec::new()
    }
}

/// Implements [`ParameterObject`] (and [`Reflect`]) for a struct by listing
/// each field with its source, with an optional transport name when it
/// differs from the field name.
///
/// Requiredness is derived from the field type: `Option<T>` fields are
/// optional, everything else is required.
///
/// # Example
///
/// ```rust
/// use hypatia_extract::{parameter_object, ParameterObject, ParameterSource};
/// use serde::Deserialize;
///
/// #[derive(Debug, Deserialize)]
/// struct AuditParams {
///     actor_id: u64,
///     trace: Option<String>,
/// }
///
/// parameter_object!(AuditParams {
///     "actor_id": u64 => path,
///     "trace": Option<String> => header("X-Trace-Id"),
/// });
///
/// let descriptors = AuditParams::descriptors();
/// assert_eq!(descriptors[1].raw_name, "X-Trace-Id");
/// assert_eq!(descriptors[1].source, ParameterSource::Header);
/// assert!(!descriptors[1].required);
/// ```
#[macro_export]
macro_rules! parameter_object {
    ($ty:ident { $( $fname:literal : $fty:ty => $source:ident $(( $raw:literal ))? ),* $(,)? }) => {
        $crate::__schema::reflect_object!($ty {
            $( $fname : $fty ),*
        });

        impl $crate::ParameterObject for $ty {
            fn descriptors() -> Vec<$crate::ParameterDescriptor> {
                vec![
                    $(
                        $crate::ParameterDescriptor {
                            field: $fname,
                            raw_name: $crate::parameter_object!(@raw $fname $(, $raw)?),
                            source: $crate::parameter_object!(@source $source),
                            required: !<$fty as $crate::__schema::Reflect>::descriptor()
                                .is_optional(),
                        }
                    ),*
                ]
            }
        }
    };
    (@raw $fname:literal) => { $fname };
    (@raw $fname:literal, $raw:literal) => { $raw };
    (@source path) => { $crate::ParameterSource::Path };
    (@source query) => { $crate::ParameterSource::Query };
    (@source header) => { $crate::ParameterSource::Header };
    (@source body) => { $crate::ParameterSource::Body };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct MixedParams {
        item_id: u64,
        page: Option<u32>,
        trace: String,
    }

    crate::parameter_object!(MixedParams {
        "item_id": u64 => path,
        "page": Option<u32> => query,
        "trace": String => header("X-Trace-Id"),
    });

    #[test]
    fn test_descriptors_in_declaration_order() {
        let descriptors = MixedParams::descriptors();
        let fields: Vec<&str> = descriptors.iter().map(|d| d.field).collect();
        assert_eq!(fields, ["item_id", "page", "trace"]);
    }

    #[test]
    fn test_sources_and_raw_names() {
        let descriptors = MixedParams::descriptors();
        assert_eq!(descriptors[0].source, ParameterSource::Path);
        assert_eq!(descriptors[0].raw_name, "item_id");
        assert_eq!(descriptors[1].source, ParameterSource::Query);
        assert_eq!(descriptors[2].source, ParameterSource::Header);
        assert_eq!(descriptors[2].raw_name, "X-Trace-Id");
    }

    #[test]
    fn test_requiredness_follows_optionality() {
        let descriptors = MixedParams::descriptors();
        assert!(descriptors[0].required);
        assert!(!descriptors[1].required);
        assert!(descriptors[2].required);
    }

    #[test]
    fn test_unit_type_has_no_descriptors() {
        assert!(<() as ParameterObject>::descriptors().is_empty());
    }

    #[test]
    fn test_source_display() {
        assert_eq!(ParameterSource::Path.to_string(), "path");
        assert_eq!(ParameterSource::Query.to_string(), "query");
        assert_eq!(ParameterSource::Header.to_string(), "header");
        assert_eq!(ParameterSource::Body.to_string(), "body");
    }
}
