//! Goal checklist.
//!
//! Goals keep insertion order; the list is rendered top to bottom in the
//! order they were added.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::storage::{KeyValueStore, StoreExt, StoreKey};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalRecord {
    pub id: i64,
    pub text: String,
    pub completed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GoalList {
    goals: Vec<GoalRecord>,
}

impl GoalList {
    pub fn new(goals: Vec<GoalRecord>) -> Self {
        Self { goals }
    }

    /// Goals seeded on first install.
    pub fn seed() -> Self {
        Self::new(vec![
            GoalRecord {
                id: 1,
                text: "Complete project proposal".into(),
                completed: false,
            },
            GoalRecord {
                id: 2,
                text: "Review feedback from team".into(),
                completed: true,
            },
            GoalRecord {
                id: 3,
                text: "Set up client meeting".into(),
                completed: false,
            },
        ])
    }

    pub fn load(store: &(impl KeyValueStore + ?Sized)) -> Result<Self, StoreError> {
        store.load_or_default(StoreKey::Goals)
    }

    pub fn save(&self, store: &(impl KeyValueStore + ?Sized)) -> Result<(), StoreError> {
        store.save(StoreKey::Goals, self)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GoalRecord> {
        self.goals.iter()
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    /// Append a goal. Blank text is ignored.
    pub fn add(&mut self, text: &str) -> Option<&GoalRecord> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let max_id = self.goals.iter().map(|g| g.id).max().unwrap_or(0);
        let id = Utc::now().timestamp_millis().max(max_id + 1);
        self.goals.push(GoalRecord {
            id,
            text: text.to_string(),
            completed: false,
        });
        self.goals.last()
    }

    /// Flip completion. Returns the new state, or `None` for an unknown id.
    pub fn toggle(&mut self, id: i64) -> Option<bool> {
        let goal = self.goals.iter_mut().find(|g| g.id == id)?;
        goal.completed = !goal.completed;
        Some(goal.completed)
    }

    pub fn remove(&mut self, id: i64) -> bool {
        let before = self.goals.len();
        self.goals.retain(|g| g.id != id);
        self.goals.len() != before
    }

    pub fn completed_count(&self) -> usize {
        self.goals.iter().filter(|g| g.completed).count()
    }

    /// Whole-percent completion, 0 for an empty list.
    pub fn progress_pct(&self) -> u32 {
        if self.goals.is_empty() {
            return 0;
        }
        let pct = self.completed_count() as f64 / self.goals.len() as f64 * 100.0;
        pct.round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn add_appends_in_order_with_unique_ids() {
        let mut goals = GoalList::default();
        let a = goals.add("write report").unwrap().id;
        let b = goals.add("  call bank ").unwrap().id;
        assert!(b > a);
        let texts: Vec<_> = goals.iter().map(|g| g.text.as_str()).collect();
        assert_eq!(texts, ["write report", "call bank"]);
    }

    #[test]
    fn add_ignores_blank_text() {
        let mut goals = GoalList::default();
        assert!(goals.add("   ").is_none());
        assert!(goals.is_empty());
    }

    #[test]
    fn toggle_and_remove() {
        let mut goals = GoalList::seed();
        assert_eq!(goals.toggle(1), Some(true));
        assert_eq!(goals.toggle(1), Some(false));
        assert_eq!(goals.toggle(99), None);
        assert!(goals.remove(2));
        assert!(!goals.remove(2));
        assert_eq!(goals.len(), 2);
    }

    #[test]
    fn progress_rounds_to_whole_percent() {
        let goals = GoalList::seed();
        assert_eq!(goals.progress_pct(), 33);
        assert_eq!(GoalList::default().progress_pct(), 0);
    }

    #[test]
    fn persists_as_plain_array() {
        let store = MemoryStore::new();
        GoalList::seed().save(&store).unwrap();
        let raw = store.get_raw(StoreKey::Goals).unwrap().unwrap();
        assert!(raw.starts_with('['));
        assert_eq!(GoalList::load(&store).unwrap(), GoalList::seed());
    }
}
