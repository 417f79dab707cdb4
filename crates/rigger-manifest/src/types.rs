//! Newtype wrappers for the open tag sets used in a deployment manifest.
//!
//! Network kinds, job lifecycles and default-routing roles are open string sets:
//! providers and consumers may add values this crate has never heard of, so they
//! are kept as strings with a distinct type instead of closed enums.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

macro_rules! string_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new instance from a string.
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// Return the inner string as a slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume self and return the inner `String`.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Deref for $name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl PartialEq<String> for $name {
            fn eq(&self, other: &String) -> bool {
                self.0 == *other
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }
    };
}

string_newtype!(
    /// Network kind tag such as `dynamic`, `manual` or `vip`.
    NetworkType
);

string_newtype!(
    /// Job lifecycle tag such as `service` or `errand`.
    JobLifecycle
);

string_newtype!(
    /// Default-routing role a job takes from one of its networks (`gateway`, `dns`).
    NetworkDefault
);

impl NetworkType {
    pub const DYNAMIC: &'static str = "dynamic";
    pub const MANUAL: &'static str = "manual";
    pub const VIP: &'static str = "vip";
}

impl JobLifecycle {
    pub const SERVICE: &'static str = "service";
    pub const ERRAND: &'static str = "errand";

    pub fn is_errand(&self) -> bool {
        self.0 == Self::ERRAND
    }
}

/// Jobs that do not declare a lifecycle are long-running services.
impl Default for JobLifecycle {
    fn default() -> Self {
        Self::new(Self::SERVICE)
    }
}

impl NetworkDefault {
    pub const GATEWAY: &'static str = "gateway";
    pub const DNS: &'static str = "dns";
}
