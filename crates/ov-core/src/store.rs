//! Ordered label collection.
//!
//! Insertion order is z-order: the last label is painted on top and wins
//! hit tests. Every mutation is addressed by id and touches exactly one
//! label; an unknown id is reported (`false` / `None`) and otherwise ignored.

use crate::id::{IdGenerator, LabelId};
use crate::model::{LabelDefaults, TextLabel};
use kurbo::Point;
use std::collections::HashMap;

/// A single store edit, as produced by the interaction controller.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelMutation {
    Add { label: Box<TextLabel> },
    SetContent { id: LabelId, content: String },
    MoveTo { id: LabelId, position: Point },
    Remove { id: LabelId },
}

impl LabelMutation {
    pub fn target(&self) -> LabelId {
        match self {
            Self::Add { label } => label.id,
            Self::SetContent { id, .. } | Self::MoveTo { id, .. } | Self::Remove { id } => *id,
        }
    }
}

pub struct TextLabelStore {
    labels: Vec<TextLabel>,
    /// Id → position in `labels`. Rebuilt whenever positions shift.
    index: HashMap<LabelId, usize>,
    ids: IdGenerator,
}

impl Default for TextLabelStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLabelStore {
    pub fn new() -> Self {
        Self::with_generator(IdGenerator::new())
    }

    pub fn with_generator(ids: IdGenerator) -> Self {
        Self {
            labels: Vec::new(),
            index: HashMap::new(),
            ids,
        }
    }

    /// Create a label at `position` on top of the stack.
    pub fn add(&mut self, position: Point, defaults: &LabelDefaults) -> LabelId {
        let id = loop {
            let id = self.ids.next_id();
            if !self.index.contains_key(&id) {
                break id;
            }
            log::debug!("id collision on {id}, drawing again");
        };
        self.push(TextLabel::new(id, position, defaults));
        id
    }

    /// Insert a fully built label. Rejected if its id is already present.
    pub fn insert(&mut self, label: TextLabel) -> bool {
        if self.index.contains_key(&label.id) {
            return false;
        }
        self.push(label);
        true
    }

    fn push(&mut self, label: TextLabel) {
        self.index.insert(label.id, self.labels.len());
        self.labels.push(label);
    }

    pub fn update_content(&mut self, id: LabelId, content: impl Into<String>) -> bool {
        match self.find_mut(id) {
            Some(label) => {
                label.content = content.into();
                true
            }
            None => false,
        }
    }

    pub fn update_position(&mut self, id: LabelId, position: Point) -> bool {
        match self.find_mut(id) {
            Some(label) => {
                label.position = position;
                true
            }
            None => false,
        }
    }

    /// Remove a label, keeping the relative order of the rest.
    pub fn remove(&mut self, id: LabelId) -> Option<TextLabel> {
        let idx = self.index.remove(&id)?;
        let label = self.labels.remove(idx);
        self.rebuild_index();
        Some(label)
    }

    pub fn find(&self, id: LabelId) -> Option<&TextLabel> {
        self.index.get(&id).map(|&i| &self.labels[i])
    }

    fn find_mut(&mut self, id: LabelId) -> Option<&mut TextLabel> {
        let i = *self.index.get(&id)?;
        self.labels.get_mut(i)
    }

    pub fn contains(&self, id: LabelId) -> bool {
        self.index.contains_key(&id)
    }

    /// Apply a mutation value. Returns `false` when it targets a missing id
    /// (or, for `Add`, an id that already exists).
    pub fn apply(&mut self, mutation: LabelMutation) -> bool {
        match mutation {
            LabelMutation::Add { label } => self.insert(*label),
            LabelMutation::SetContent { id, content } => self.update_content(id, content),
            LabelMutation::MoveTo { id, position } => self.update_position(id, position),
            LabelMutation::Remove { id } => self.remove(id).is_some(),
        }
    }

    /// Labels bottom to top.
    pub fn iter(&self) -> std::slice::Iter<'_, TextLabel> {
        self.labels.iter()
    }

    pub fn as_slice(&self) -> &[TextLabel] {
        &self.labels
    }

    pub fn ids(&self) -> impl Iterator<Item = LabelId> + '_ {
        self.labels.iter().map(|l| l.id)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (i, label) in self.labels.iter().enumerate() {
            self.index.insert(label.id, i);
        }
    }
}

impl<'a> IntoIterator for &'a TextLabelStore {
    type Item = &'a TextLabel;
    type IntoIter = std::slice::Iter<'a, TextLabel>;

    fn into_iter(self) -> Self::IntoIter {
        self.labels.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn store_with(n: usize) -> (TextLabelStore, Vec<LabelId>) {
        let mut store = TextLabelStore::with_generator(IdGenerator::seeded(1));
        let ids = (0..n)
            .map(|i| store.add(Point::new(i as f64 * 10.0, 5.0), &LabelDefaults::default()))
            .collect();
        (store, ids)
    }

    #[test]
    fn add_appends_on_top() {
        let (store, ids) = store_with(3);
        assert_eq!(store.ids().collect::<Vec<_>>(), ids);
        let top = store.find(ids[2]).unwrap();
        assert_eq!(top.position, Point::new(20.0, 5.0));
        assert_eq!(top.content, "New Text");
    }

    #[test]
    fn add_ids_are_pairwise_distinct() {
        let (_, ids) = store_with(200);
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn update_content_leaves_others_alone() {
        let (mut store, ids) = store_with(3);
        let before: Vec<TextLabel> = store.iter().cloned().collect();

        assert!(store.update_content(ids[1], "Hello"));
        assert_eq!(store.find(ids[1]).unwrap().content, "Hello");
        assert_eq!(store.find(ids[0]), Some(&before[0]));
        assert_eq!(store.find(ids[2]), Some(&before[2]));
    }

    #[test]
    fn update_position_is_idempotent() {
        let (mut store, ids) = store_with(1);
        let p = Point::new(42.5, -3.0);
        assert!(store.update_position(ids[0], p));
        let once = store.find(ids[0]).cloned();
        assert!(store.update_position(ids[0], p));
        assert_eq!(store.find(ids[0]).cloned(), once);
    }

    #[test]
    fn unknown_ids_are_reported() {
        let (mut store, _) = store_with(2);
        let ghost = LabelId::intern("ghost");
        assert!(!store.update_content(ghost, "x"));
        assert!(!store.update_position(ghost, Point::ZERO));
        assert!(store.remove(ghost).is_none());
        assert!(store.find(ghost).is_none());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn remove_keeps_order_and_index() {
        let (mut store, ids) = store_with(4);
        let removed = store.remove(ids[1]).unwrap();
        assert_eq!(removed.id, ids[1]);
        assert_eq!(store.ids().collect::<Vec<_>>(), vec![ids[0], ids[2], ids[3]]);
        // Index still resolves the shifted labels
        assert!(store.update_content(ids[3], "last"));
        assert_eq!(store.as_slice()[2].content, "last");
    }

    #[test]
    fn apply_mirrors_direct_calls() {
        let (mut store, ids) = store_with(2);
        assert!(store.apply(LabelMutation::MoveTo {
            id: ids[0],
            position: Point::new(1.0, 2.0),
        }));
        assert!(store.apply(LabelMutation::SetContent {
            id: ids[1],
            content: "Hi".into(),
        }));
        let dup = store.find(ids[0]).cloned().unwrap();
        assert!(!store.apply(LabelMutation::Add {
            label: Box::new(dup)
        }));
        assert!(store.apply(LabelMutation::Remove { id: ids[0] }));
        assert_eq!(store.len(), 1);
        assert_eq!(store.as_slice()[0].content, "Hi");
    }
}
