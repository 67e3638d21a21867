//! Macros for reducing boilerplate in buffer-coded enums.
//!
//! Provides `coded_enum!`, which defines a fieldless enum carried through the
//! numeric input and pose buffers as an integer-valued `f64`.
//!
//! The macro expands to the enum itself plus `from_code`, `code`, `ALL` and a
//! `Default` implementation pointing at the named fallback variant. Decoding
//! rounds to the nearest integer; anything unknown or non-finite decodes to
//! the fallback instead of wrapping around.
macro_rules! coded_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $code:literal ),+ $(,)?
        }
        fallback = $fallback:ident;
    ) => {
        $(#[$meta])*
        #[derive(
            Clone,
            Copy,
            Debug,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize,
        )]
        $vis enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Every variant in code order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Decodes a buffer value, falling back to the default variant for
            /// unknown or non-finite codes.
            #[must_use]
            pub fn from_code(value: f64) -> Self {
                match $crate::numeric::code_from_f64(value) {
                    $( Some($code) => Self::$variant, )+
                    _ => Self::$fallback,
                }
            }

            /// Numeric code written into buffers.
            #[must_use]
            pub const fn code(self) -> f64 {
                match self {
                    $( Self::$variant => $code as f64, )+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$fallback
            }
        }
    };
}
