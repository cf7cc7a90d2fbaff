//! API entity records.
//!
//! An [`EntityRecord`] is one named element of an API snapshot. Records are
//! produced by whatever extracts the API surface from source code and are
//! read-only to the detection and evaluation phases.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type tag of an API entity, used to dispatch constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Module,
    Class,
    Function,
    Attribute,
}

impl EntityKind {
    /// All entity kinds in dispatch order.
    pub const ALL: [Self; 4] = [Self::Module, Self::Class, Self::Function, Self::Attribute];

    /// Name used when building difference kinds (`"Add" + name`).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Module => "Module",
            Self::Class => "Class",
            Self::Function => "Function",
            Self::Attribute => "Attribute",
        }
    }

    /// Lowercase label used in human-readable messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::Class => "class",
            Self::Function => "function",
            Self::Attribute => "attribute",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Binding scope of a function or attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemScope {
    /// Module-level or static member
    #[default]
    Static,
    /// Bound to the class object
    Class,
    /// Bound to instances
    Instance,
}

/// One element of an API snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Unique qualified name, e.g. `pkg.mod.Class.method`
    pub id: String,
    /// Short name, e.g. `method`
    pub name: String,
    /// Entity type tag
    pub kind: EntityKind,
    /// Whether the entity is private / internal
    #[serde(default)]
    pub private: bool,
    /// Qualified name of the enclosing entity
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub scope: ItemScope,
}

impl EntityRecord {
    /// Create a public, static entity.
    ///
    /// The short name and parent are derived from the qualified id by
    /// splitting on the last `.`.
    pub fn new(id: impl Into<String>, kind: EntityKind) -> Self {
        let id = id.into();
        let (parent, name) = match id.rsplit_once('.') {
            Some((parent, name)) => (Some(parent.to_string()), name.to_string()),
            None => (None, id.clone()),
        };
        Self {
            id,
            name,
            kind,
            private: false,
            parent,
            scope: ItemScope::Static,
        }
    }

    #[must_use]
    pub fn module(id: impl Into<String>) -> Self {
        Self::new(id, EntityKind::Module)
    }

    #[must_use]
    pub fn class(id: impl Into<String>) -> Self {
        Self::new(id, EntityKind::Class)
    }

    #[must_use]
    pub fn function(id: impl Into<String>) -> Self {
        Self::new(id, EntityKind::Function)
    }

    #[must_use]
    pub fn attribute(id: impl Into<String>) -> Self {
        Self::new(id, EntityKind::Attribute)
    }

    /// Mark the entity private or public
    #[must_use]
    pub fn with_private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }

    #[must_use]
    pub fn with_scope(mut self, scope: ItemScope) -> Self {
        self.scope = scope;
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Label of the enclosing entity for messages (the id prefix, or the id itself).
    #[must_use]
    pub fn parent_label(&self) -> &str {
        self.parent.as_deref().unwrap_or(&self.id)
    }
}

/// Whether a name is private by convention: a leading underscore that is
/// not a dunder name such as `__init__`.
#[must_use]
pub fn is_private_name(name: &str) -> bool {
    name.starts_with('_') && !(name.starts_with("__") && name.ends_with("__") && name.len() > 4)
}
