//! Helper macro for closed string-backed enums parsed at the boundary.

use std::fmt;

/// Raised when a string does not name any variant of a closed enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariantError {
    kind: &'static str,
    value: String,
}

impl UnknownVariantError {
    pub(crate) fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    /// Name of the enum that rejected the input, e.g. `currency`.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// The rejected input.
    pub fn value(&self) -> &str {
        self.value.as_str()
    }
}

impl fmt::Display for UnknownVariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} `{}`", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariantError {}

/// Declare an enum whose wire form is a fixed label per variant.
///
/// Parsing is case-insensitive, trims whitespace and accepts optional
/// aliases (`Variant => "label" | "alias"`). Serialisation always emits the
/// canonical label.
macro_rules! closed_enum {
    (
        $(#[$outer:meta])*
        pub enum $name:ident as $kind:literal {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $label:literal $(| $alias:literal)*
            ),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            ::serde::Serialize, ::serde::Deserialize,
        )]
        #[serde(try_from = "String", into = "String")]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                $variant,
            )+
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Canonical wire label.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::domain::UnknownVariantError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let value = value.trim();
                $(
                    if value.eq_ignore_ascii_case($label)
                        $(|| value.eq_ignore_ascii_case($alias))*
                    {
                        return Ok(Self::$variant);
                    }
                )+
                Err($crate::domain::UnknownVariantError::new($kind, value))
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::domain::UnknownVariantError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_owned()
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use closed_enum;
