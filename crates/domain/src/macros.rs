//! Display/FromStr generation for unit-variant enums
//!
//! ```rust
//! use storefront_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Phase {
//!     Loading,
//!     Ready,
//! }
//!
//! impl_domain_status_conversions!(Phase {
//!     Loading => "loading",
//!     Ready => "ready",
//! });
//!
//! assert_eq!(Phase::Ready.to_string(), "ready");
//! assert_eq!("LOADING".parse::<Phase>(), Ok(Phase::Loading));
//! ```

/// Implements `Display` and case-insensitive `FromStr` for a unit-variant
/// enum. The string literals must be lowercase.
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl ::std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => ::std::result::Result::Ok(Self::$variant),)+
                    _ => ::std::result::Result::Err(::std::format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
