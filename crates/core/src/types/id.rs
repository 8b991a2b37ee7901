//! Newtype IDs for type-safe entity references.
//!
//! Remote rows are keyed by UUID strings and local fallback records reuse the
//! same shape, so every ID wraps a `String`. Use the `define_id!` macro to
//! create wrappers that prevent mixing IDs from different entity types.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - `new()`, `generate()` (UUID v4), `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>`, `AsRef<str>` and `Display`
///
/// # Example
///
/// ```rust
/// # use pawmilya_core::define_id;
/// define_id!(VisitId);
/// define_id!(ClinicId);
///
/// let visit = VisitId::new("abc");
/// let clinic = ClinicId::new("abc");
///
/// // These are different types, so this won't compile:
/// // let _: VisitId = clinic;
/// # let _ = (visit, clinic);
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing identifier.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a fresh random identifier.
            #[must_use]
            pub fn generate() -> Self {
                Self($crate::__private::Uuid::new_v4().to_string())
            }

            /// Get the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(ProfileId);
define_id!(PetId);
define_id!(AppointmentId);
define_id!(FeedbackId);

impl FeedbackId {
    /// Feedback entries are keyed by their submission time in unix millis.
    #[must_use]
    pub fn from_millis(millis: i64) -> Self {
        Self(format!("feedback-{millis}"))
    }
}
