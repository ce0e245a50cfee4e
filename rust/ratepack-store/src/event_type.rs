//! Named event kinds that a rating store can be queried for.

use ahash::AHashMap;
use ratepack_common::{Result, error::Error, verify_arg};

/// The kinds of user events known to the store.
///
/// Packed rating files only hold [`EventKind::Rating`] events. Queries for other kinds
/// are valid and return empty results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Rating,
    Like,
    LikeBatch,
}

impl EventKind {
    /// The name under which the kind is registered by default.
    pub fn default_name(self) -> &'static str {
        match self {
            EventKind::Rating => "rating",
            EventKind::Like => "like",
            EventKind::LikeBatch => "like-batch",
        }
    }
}

/// Maps event type names to [`EventKind`]s.
///
/// Kinds are registered explicitly at startup; [`EventTypeRegistry::with_defaults`]
/// registers every built-in kind under its default name.
#[derive(Clone, Debug, Default)]
pub struct EventTypeRegistry {
    kinds: AHashMap<String, EventKind>,
}

impl EventTypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> EventTypeRegistry {
        EventTypeRegistry::default()
    }

    /// Creates a registry holding `rating`, `like` and `like-batch`.
    pub fn with_defaults() -> EventTypeRegistry {
        let mut registry = EventTypeRegistry::new();
        for kind in [EventKind::Rating, EventKind::Like, EventKind::LikeBatch] {
            registry
                .kinds
                .insert(kind.default_name().to_string(), kind);
        }
        registry
    }

    /// Registers `kind` under `name`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the name is empty or already registered.
    pub fn register(&mut self, name: impl Into<String>, kind: EventKind) -> Result<()> {
        let name = name.into();
        verify_arg!(name, !name.is_empty());
        if self.kinds.contains_key(&name) {
            return Err(Error::invalid_arg(
                "name",
                format!("event type '{name}' is already registered"),
            ));
        }
        self.kinds.insert(name, kind);
        Ok(())
    }

    /// Looks up the kind registered under `name`.
    pub fn lookup(&self, name: &str) -> Result<EventKind> {
        self.kinds
            .get(name)
            .copied()
            .ok_or_else(|| Error::unknown_event_type(name))
    }

    /// Returns the registered names in lexicographic order.
    pub fn names(&self) -> Vec<&str> {
        let mut names = self.kinds.keys().map(String::as_str).collect::<Vec<_>>();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}
