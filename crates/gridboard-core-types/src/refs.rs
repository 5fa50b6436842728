//! Object references and id newtypes used across the dashboard state tree

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reference to a catalog object (display form, measure, insight, ...)
///
/// Objects are addressed either by a workspace-scoped identifier or by a
/// backend URI. The textual `as_key()` form is stable and used as part of
/// derived cache keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObjRef {
    /// Workspace-scoped identifier
    Identifier(String),
    /// Backend URI
    Uri(String),
}

impl ObjRef {
    /// Stable textual form suitable for cache key derivation
    pub fn as_key(&self) -> String {
        match self {
            ObjRef::Identifier(id) => format!("id:{id}"),
            ObjRef::Uri(uri) => format!("uri:{uri}"),
        }
    }

    /// Convenience constructor for identifier refs
    pub fn identifier(id: impl Into<String>) -> Self {
        ObjRef::Identifier(id.into())
    }

    /// Convenience constructor for URI refs
    pub fn uri(uri: impl Into<String>) -> Self {
        ObjRef::Uri(uri.into())
    }
}

impl std::fmt::Display for ObjRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_key())
    }
}

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Generate a new random id using UUIDv7
            pub fn new() -> Self {
                Self(Uuid::now_v7().to_string())
            }

            /// Get the string representation
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Create from an existing string
            pub fn from_string(s: String) -> Self {
                Self(s)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id! {
    /// Identifier of a dashboard tab
    TabId
}

string_id! {
    /// Identifier of a widget placed on a layout
    WidgetId
}

string_id! {
    /// Identifier under which removed layout items are stashed
    ///
    /// Removing a section or item may stash its contents; a subsequent
    /// add-items command can reference the stash id to restore them.
    StashId
}
