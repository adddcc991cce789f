use super::EntityId;
use uuid::Uuid;

/// A deterministic ID generator that produces a sequence of EntityIds
/// based on a seed namespace and a counter.
///
/// Each plane owns its own generator, so two planes built with the same seed
/// and the same construction sequence hand out the same ids. That is what lets
/// exported attributes find their items again after a reload.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    namespace: Uuid,
    counter: u64,
}

impl IdGenerator {
    /// Create a new generator from a string seed (e.g. "Plane", "Session1").
    pub fn new(seed: &str) -> Self {
        let namespace = Uuid::new_v5(&Uuid::NAMESPACE_OID, seed.as_bytes());
        Self { namespace, counter: 0 }
    }

    /// Generate the next deterministic ID in the sequence.
    pub fn next_id(&mut self) -> EntityId {
        let count = self.counter;
        self.counter += 1;
        let uuid = Uuid::new_v5(&self.namespace, &count.to_be_bytes());
        EntityId::from_uuid(uuid)
    }
}
