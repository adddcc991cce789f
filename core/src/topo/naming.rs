use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Display-name context threaded through item construction.
///
/// Every plane carries its own sequence, so names like `P1` or `L3` restart per plane
/// instead of coming from process-wide state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NameSequence {
    counters: HashMap<String, usize>,
}

impl NameSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next name for the given prefix: `P1`, `P2`, ... per prefix.
    pub fn next(&mut self, prefix: &str) -> String {
        let counter = self.counters.entry(prefix.to_string()).or_insert(0);
        *counter += 1;
        format!("{}{}", prefix, counter)
    }

    /// Make sure later names never collide with a restored one, e.g. `L7` bumps `L` to 7.
    pub fn observe(&mut self, name: &str) {
        let split = name
            .char_indices()
            .find(|(_, c)| c.is_ascii_digit())
            .map(|(i, _)| i);
        if let Some(i) = split {
            let (prefix, digits) = name.split_at(i);
            if let Ok(n) = digits.parse::<usize>() {
                let counter = self.counters.entry(prefix.to_string()).or_insert(0);
                *counter = (*counter).max(n);
            }
        }
    }
}
