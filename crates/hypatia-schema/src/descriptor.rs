//! Type descriptors.
//!
//! A [`TypeDescriptor`] is a language-agnostic representation of a Rust type:
//! its primitive kind, its declared fields (with names and constraint
//! annotations), its element types, and its nullability. Descriptors are the
//! input to the [`Introspector`](crate::Introspector) and are advertised by
//! types through the [`Reflect`] trait.
//!
//! Object and enum descriptors hold their members behind a `fn()` thunk so
//! that building a descriptor never recurses: a self-referential type only
//! expands when the introspector walks it, which is where cycles are detected
//! and cut.

use std::collections::{BTreeMap, HashMap};

/// The primitive kinds a scalar value can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    /// `true` / `false`.
    Boolean,
    /// Whole numbers, signed or unsigned.
    Integer,
    /// Floating-point numbers.
    Float,
    /// UTF-8 text.
    String,
}

/// Language-agnostic representation of a type's shape.
///
/// Built once per distinct type (see [`Reflect`]) and cached by type identity
/// in the [`SchemaCatalog`](crate::SchemaCatalog). Two structurally identical
/// but separately declared types produce distinct descriptors.
#[derive(Debug, Clone)]
pub enum TypeDescriptor {
    /// A scalar.
    Primitive(PrimitiveKind),
    /// A named struct with declared fields.
    Object(ObjectDescriptor),
    /// An ordered sequence with a single element type.
    Sequence(Box<TypeDescriptor>),
    /// A string-keyed map with a single value type.
    Map(Box<TypeDescriptor>),
    /// A closed set of literal values.
    Enum(EnumDescriptor),
    /// A nullable wrapper around another type (`Option<T>`).
    Optional(Box<TypeDescriptor>),
    /// A type that cannot be represented in a schema (function types,
    /// platform handles). Introspecting it is a [`SchemaError`](crate::SchemaError).
    Opaque(&'static str),
}

impl TypeDescriptor {
    /// Returns the declared name of this descriptor, if it has one.
    #[must_use]
    pub fn name(&self) -> Option<&'static str> {
        match self {
            Self::Object(o) => Some(o.name),
            Self::Enum(e) => Some(e.name),
            _ => None,
        }
    }

    /// Returns `true` if this descriptor is the nullable wrapper.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }
}

/// Descriptor of a named struct.
///
/// `fields` is a thunk rather than a `Vec` so that descriptor construction
/// never recurses into field types.
#[derive(Debug, Clone, Copy)]
pub struct ObjectDescriptor {
    /// The declared type name, used for references and documentation.
    pub name: &'static str,
    /// Thunk producing the declared fields in declaration order.
    pub fields: fn() -> Vec<FieldDescriptor>,
}

/// A single declared field of an object type.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Field name as declared.
    pub name: &'static str,
    /// Descriptor of the field's type.
    pub ty: TypeDescriptor,
    /// Constraint annotations attached to the field.
    pub constraints: Constraints,
    /// Human-readable description for documentation.
    pub description: Option<&'static str>,
}

/// Descriptor of a closed enum.
#[derive(Debug, Clone, Copy)]
pub struct EnumDescriptor {
    /// The declared type name.
    pub name: &'static str,
    /// Thunk producing the declared variants in declaration order.
    pub variants: fn() -> Vec<VariantDescriptor>,
}

/// A single enum variant: its wire value and an optional descriptive label
/// (the Described capability).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantDescriptor {
    /// The literal wire value.
    pub value: &'static str,
    /// Human-readable label rendered next to the value in documentation.
    pub label: Option<&'static str>,
}

/// Constraint annotations consulted for schema metadata.
///
/// Numeric bounds apply to integer/float nodes; length and pattern apply to
/// string nodes. Constraints never change a node's kind; inapplicable
/// constraints are discarded during introspection.
///
/// # Example
///
/// ```rust
/// use hypatia_schema::Constraints;
///
/// let c = Constraints::new().min_length(1).max_length(64);
/// assert_eq!(c.min_length, Some(1));
/// assert!(!c.is_empty());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Constraints {
    /// Inclusive lower bound for numeric values.
    pub minimum: Option<f64>,
    /// Inclusive upper bound for numeric values.
    pub maximum: Option<f64>,
    /// Minimum length for strings.
    pub min_length: Option<u64>,
    /// Maximum length for strings.
    pub max_length: Option<u64>,
    /// Regular expression a string must match.
    pub pattern: Option<&'static str>,
    /// Format hint (`"uuid"`, `"date-time"`, ...).
    pub format: Option<&'static str>,
}

impl Constraints {
    /// Creates an empty constraint set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the inclusive numeric lower bound.
    #[must_use]
    pub fn minimum(mut self, value: f64) -> Self {
        self.minimum = Some(value);
        self
    }

    /// Sets the inclusive numeric upper bound.
    #[must_use]
    pub fn maximum(mut self, value: f64) -> Self {
        self.maximum = Some(value);
        self
    }

    /// Sets the minimum string length.
    #[must_use]
    pub fn min_length(mut self, value: u64) -> Self {
        self.min_length = Some(value);
        self
    }

    /// Sets the maximum string length.
    #[must_use]
    pub fn max_length(mut self, value: u64) -> Self {
        self.max_length = Some(value);
        self
    }

    /// Sets the string pattern.
    #[must_use]
    pub fn pattern(mut self, value: &'static str) -> Self {
        self.pattern = Some(value);
        self
    }

    /// Sets the format hint.
    #[must_use]
    pub fn format(mut self, value: &'static str) -> Self {
        self.format = Some(value);
        self
    }

    /// Returns `true` when no constraint is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.minimum.is_none()
            && self.maximum.is_none()
            && self.min_length.is_none()
            && self.max_length.is_none()
            && self.pattern.is_none()
            && self.format.is_none()
    }

    /// Returns `true` when any numeric bound is set.
    #[must_use]
    pub fn has_numeric(&self) -> bool {
        self.minimum.is_some() || self.maximum.is_some()
    }

    /// Returns `true` when any textual constraint is set.
    #[must_use]
    pub fn has_textual(&self) -> bool {
        self.min_length.is_some() || self.max_length.is_some() || self.pattern.is_some()
    }
}

/// Trait advertising a type's [`TypeDescriptor`].
///
/// Primitives, `Option<T>`, `Vec<T>` and string-keyed maps are covered by
/// blanket implementations; user types implement it through
/// [`reflect_object!`](crate::reflect_object) and
/// [`reflect_enum!`](crate::reflect_enum), which build the explicit
/// descriptor table once per type.
pub trait Reflect: 'static {
    /// Returns the descriptor for this type.
    ///
    /// Must be deterministic: every call returns a structurally identical
    /// descriptor.
    fn descriptor() -> TypeDescriptor;
}

macro_rules! impl_reflect_primitive {
    ($kind:ident => $($ty:ty),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn descriptor() -> TypeDescriptor {
                    TypeDescriptor::Primitive(PrimitiveKind::$kind)
                }
            }
        )*
    };
}

impl_reflect_primitive!(Boolean => bool);
impl_reflect_primitive!(Integer => i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
impl_reflect_primitive!(Float => f32, f64);
impl_reflect_primitive!(String => String);

impl Reflect for () {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Object(ObjectDescriptor {
            name: "Unit",
            fields: Vec::new,
        })
    }
}

impl<T: Reflect> Reflect for Option<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Optional(Box::new(T::descriptor()))
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Sequence(Box::new(T::descriptor()))
    }
}

impl<T: Reflect> Reflect for HashMap<String, T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Map(Box::new(T::descriptor()))
    }
}

impl<T: Reflect> Reflect for BTreeMap<String, T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Map(Box::new(T::descriptor()))
    }
}

impl<T: Reflect> Reflect for indexmap::IndexMap<String, T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Map(Box::new(T::descriptor()))
    }
}

/// Implements [`Reflect`] for a struct by listing its fields in declaration
/// order, with optional per-field constraints in brackets.
///
/// # Example
///
/// ```rust
/// use hypatia_schema::{reflect_object, Constraints, Reflect};
///
/// struct Customer {
///     id: u64,
///     email: String,
///     tags: Vec<String>,
/// }
///
/// reflect_object!(Customer {
///     "id": u64,
///     "email": String [Constraints::new().pattern("^[^@]+@[^@]+$")],
///     "tags": Vec<String>,
/// });
///
/// assert_eq!(Customer::descriptor().name(), Some("Customer"));
/// ```
#[macro_export]
macro_rules! reflect_object {
    ($ty:ident { $( $fname:literal : $fty:ty $([ $constraints:expr ])? ),* $(,)? }) => {
        impl $crate::Reflect for $ty {
            fn descriptor() -> $crate::TypeDescriptor {
                $crate::TypeDescriptor::Object($crate::ObjectDescriptor {
                    name: stringify!($ty),
                    fields: || vec![
                        $(
                            $crate::FieldDescriptor {
                                name: $fname,
                                ty: <$fty as $crate::Reflect>::descriptor(),
                                constraints: $crate::reflect_object!(@constraints $($constraints)?),
                                description: None,
                            }
                        ),*
                    ],
                })
            }
        }
    };
    (@constraints) => { $crate::Constraints::new() };
    (@constraints $c:expr) => { $c };
}

/// Implements [`Reflect`] for a closed enum by listing its wire values in
/// declaration order, each with an optional descriptive label.
///
/// # Example
///
/// ```rust
/// use hypatia_schema::{reflect_enum, Reflect, TypeDescriptor};
///
/// enum Tier {
///     Free,
///     Pro,
/// }
///
/// reflect_enum!(Tier {
///     "free" => "No subscription",
///     "pro" => "Paid subscription",
/// });
///
/// assert!(matches!(Tier::descriptor(), TypeDescriptor::Enum(_)));
/// ```
#[macro_export]
macro_rules! reflect_enum {
    ($ty:ident { $( $value:literal $(=> $label:literal)? ),* $(,)? }) => {
        impl $crate::Reflect for $ty {
            fn descriptor() -> $crate::TypeDescriptor {
                $crate::TypeDescriptor::Enum($crate::EnumDescriptor {
                    name: stringify!($ty),
                    variants: || vec![
                        $(
                            $crate::VariantDescriptor {
                                value: $value,
                                label: $crate::reflect_enum!(@label $($label)?),
                            }
                        ),*
                    ],
                })
            }
        }
    };
    (@label) => { None };
    (@label $l:literal) => { Some($l) };
}
