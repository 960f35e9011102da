//! ID generation utilities.

use uuid::Uuid;

/// ID generator for entities that are not keyed by a database sequence.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a trip identifier (random UUID v4).
    #[must_use]
    pub fn trip_id(&self) -> Uuid {
        Uuid::new_v4()
    }
}
