//! Bounded jar state machine
//!
//! The jar holds at most `capacity` fruits in insertion order. Adding to a
//! full jar never mutates it directly: the fruit is parked as the pending
//! selection until the caller confirms (oldest fruit is evicted) or cancels.
//!
//! Transitions consume the state and hand back the next one with an outcome,
//! so the store is the only owner of live state.

use std::collections::VecDeque;

use tracing::debug;

use crate::interface::{AddOutcome, ConfirmOutcome, Fruit};

pub const DEFAULT_JAR_CAPACITY: usize = 15;

#[derive(Debug, Clone, PartialEq)]
pub struct JarState {
    fruits: VecDeque<Fruit>,
    capacity: usize,
    pending: Option<Fruit>,
}

impl Default for JarState {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_JAR_CAPACITY)
    }
}

impl JarState {
    /// Empty jar. A zero capacity is raised to 1.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            fruits: VecDeque::with_capacity(capacity),
            capacity,
            pending: None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.fruits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fruits.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.fruits.len() >= self.capacity
    }

    pub fn pending(&self) -> Option<&Fruit> {
        self.pending.as_ref()
    }

    /// Fruits oldest first
    pub fn fruits(&self) -> impl Iterator<Item = &Fruit> {
        self.fruits.iter()
    }

    pub fn to_vec(&self) -> Vec<Fruit> {
        self.fruits.iter().cloned().collect()
    }

    /// Append when there is room, otherwise park the fruit as pending.
    pub fn request_add(mut self, fruit: Fruit) -> (Self, AddOutcome) {
        if self.is_full() {
            debug!(fruit = %fruit.name, capacity = self.capacity, "jar full, confirmation required");
            self.pending = Some(fruit.clone());
            return (self, AddOutcome::ConfirmationRequired { pending: fruit });
        }

        self.pending = None;
        self.fruits.push_back(fruit.clone());
        debug!(fruit = %fruit.name, len = self.fruits.len(), "added to jar");
        (self, AddOutcome::Added { fruit })
    }

    /// Evict the oldest fruit and append the pending one. No-op without a pending fruit.
    pub fn confirm_pending_add(mut self) -> (Self, ConfirmOutcome) {
        let Some(fruit) = self.pending.take() else {
            return (self, ConfirmOutcome::NothingPending);
        };

        // Only reachable through a full jar, but keep the bound regardless
        let evicted = if self.is_full() {
            self.fruits.pop_front()
        } else {
            None
        };
        self.fruits.push_back(fruit.clone());

        match evicted {
            Some(evicted) => {
                debug!(evicted = %evicted.name, added = %fruit.name, "displaced oldest fruit");
                (self, ConfirmOutcome::Displaced { evicted, added: fruit })
            }
            None => (self, ConfirmOutcome::Added { fruit }),
        }
    }

    /// Drop the pending fruit, leaving the jar untouched. Idempotent.
    pub fn cancel_pending_add(mut self) -> (Self, Option<Fruit>) {
        let cleared = self.pending.take();
        if let Some(fruit) = &cleared {
            debug!(fruit = %fruit.name, "pending add cancelled");
        }
        (self, cleared)
    }

    /// Empty jar with the same capacity
    pub fn cleared(self) -> Self {
        Self::with_capacity(self.capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::Nutritions;

    fn fruit(id: i64, name: &str) -> Fruit {
        Fruit {
            id,
            name: name.to_string(),
            family: "Rosaceae".to_string(),
            order: "Rosales".to_string(),
            genus: "Malus".to_string(),
            nutritions: Nutritions {
                calories: 10.0 * id as f64,
                ..Nutritions::default()
            },
        }
    }

    fn filled(capacity: usize) -> JarState {
        (0..capacity as i64).fold(JarState::with_capacity(capacity), |jar, i| {
            jar.request_add(fruit(i, &format!("f{i}"))).0
        })
    }

    fn names(jar: &JarState) -> Vec<&str> {
        jar.fruits().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_default_capacity() {
        let jar = JarState::default();
        assert_eq!(jar.capacity(), 15);
        assert!(jar.is_empty());
        assert!(jar.pending().is_none());
    }

    #[test]
    fn test_zero_capacity_is_raised_to_one() {
        assert_eq!(JarState::with_capacity(0).capacity(), 1);
    }

    #[test]
    fn test_fill_to_capacity_without_pending() {
        let jar = filled(DEFAULT_JAR_CAPACITY);
        assert_eq!(jar.len(), DEFAULT_JAR_CAPACITY);
        assert!(jar.is_full());
        assert!(jar.pending().is_none());
    }

    #[test]
    fn test_overflow_requires_confirmation_and_leaves_jar_unchanged() {
        let jar = filled(3);
        let before = jar.clone();

        let (jar, outcome) = jar.request_add(fruit(99, "extra"));
        assert_eq!(
            outcome,
            AddOutcome::ConfirmationRequired { pending: fruit(99, "extra") }
        );
        assert_eq!(jar.to_vec(), before.to_vec());
        assert_eq!(jar.pending().map(|f| f.id), Some(99));
    }

    #[test]
    fn test_confirm_evicts_oldest_and_appends() {
        let (jar, _) = filled(3).request_add(fruit(99, "extra"));
        let (jar, outcome) = jar.confirm_pending_add();

        assert_eq!(
            outcome,
            ConfirmOutcome::Displaced { evicted: fruit(0, "f0"), added: fruit(99, "extra") }
        );
        assert_eq!(names(&jar), vec!["f1", "f2", "extra"]);
        assert_eq!(jar.len(), 3);
        assert!(jar.pending().is_none());
    }

    #[test]
    fn test_cancel_restores_previous_state() {
        let before = filled(3);
        let (jar, _) = before.clone().request_add(fruit(99, "extra"));
        let (jar, cleared) = jar.cancel_pending_add();

        assert_eq!(cleared.map(|f| f.id), Some(99));
        assert_eq!(jar, before);
    }

    #[test]
    fn test_confirm_and_cancel_without_pending_are_noops() {
        let jar = filled(2);
        let (jar, outcome) = jar.clone().confirm_pending_add();
        assert_eq!(outcome, ConfirmOutcome::NothingPending);
        assert_eq!(jar, filled(2));

        let (jar, cleared) = jar.cancel_pending_add();
        assert!(cleared.is_none());
        let (jar, cleared) = jar.cancel_pending_add();
        assert!(cleared.is_none());
        assert_eq!(jar, filled(2));
    }

    #[test]
    fn test_capacity_two_walkthrough() {
        let jar = JarState::with_capacity(2);
        let (jar, _) = jar.request_add(fruit(1, "A"));
        let (jar, _) = jar.request_add(fruit(2, "B"));
        assert_eq!(names(&jar), vec!["A", "B"]);
        assert!(jar.pending().is_none());

        let (jar, _) = jar.request_add(fruit(3, "C"));
        assert_eq!(names(&jar), vec!["A", "B"]);
        assert_eq!(jar.pending().map(|f| f.name.as_str()), Some("C"));

        let (jar, _) = jar.confirm_pending_add();
        assert_eq!(names(&jar), vec!["B", "C"]);
    }

    #[test]
    fn test_newer_overflow_replaces_pending() {
        let (jar, _) = filled(1).request_add(fruit(7, "first"));
        let (jar, _) = jar.request_add(fruit(8, "second"));
        assert_eq!(jar.pending().map(|f| f.id), Some(8));
    }

    #[test]
    fn test_duplicates_are_kept() {
        let jar = JarState::with_capacity(4);
        let (jar, _) = jar.request_add(fruit(1, "apple"));
        let (jar, _) = jar.request_add(fruit(1, "apple"));
        assert_eq!(names(&jar), vec!["apple", "apple"]);
    }

    #[test]
    fn test_length_never_exceeds_capacity() {
        let mut jar = JarState::with_capacity(4);
        for i in 0..40 {
            let (next, outcome) = jar.request_add(fruit(i, "x"));
            jar = next;
            if i % 3 == 0 && matches!(outcome, AddOutcome::ConfirmationRequired { .. }) {
                jar = jar.confirm_pending_add().0;
            }
            assert!(jar.len() <= jar.capacity());
        }
    }

    #[test]
    fn test_cleared_keeps_capacity() {
        let jar = filled(5).cleared();
        assert!(jar.is_empty());
        assert_eq!(jar.capacity(), 5);
    }
}
