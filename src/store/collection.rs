//! Ordered entity arena with an id index

use crate::core::entity::{Entity, EntityId};
use std::collections::HashMap;

/// The rows a store owns, in server response order
///
/// Lookups by id go through an index kept in step with the vector, so
/// merge-by-id replacement does not scan the list.
#[derive(Debug, Clone)]
pub struct EntityCollection<T> {
    items: Vec<T>,
    index: HashMap<EntityId, usize>,
}

impl<T> Default for EntityCollection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Entity> EntityCollection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every row with `items`, keeping their order
    pub fn replace_all(&mut self, items: Vec<T>) {
        self.items = items;
        self.reindex();
    }

    /// Append `entity`, or replace the row already holding its id
    pub fn push(&mut self, entity: T) {
        match self.index.get(&entity.id()) {
            Some(&pos) => self.items[pos] = entity,
            None => {
                self.index.insert(entity.id(), self.items.len());
                self.items.push(entity);
            }
        }
    }

    /// Replace the row with `entity`'s id; returns false when no row matches
    pub fn replace(&mut self, entity: T) -> bool {
        match self.index.get(&entity.id()) {
            Some(&pos) => {
                self.items[pos] = entity;
                true
            }
            None => false,
        }
    }

    /// Remove the row with `id`, preserving the order of the rest
    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        let pos = self.index.remove(&id)?;
        let removed = self.items.remove(pos);
        for slot in self.index.values_mut() {
            if *slot > pos {
                *slot -= 1;
            }
        }
        Some(removed)
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.index.get(&id).map(|&pos| &self.items[pos])
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.items.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.index.clear();
    }

    fn reindex(&mut self) {
        self.index = self
            .items
            .iter()
            .enumerate()
            .map(|(pos, item)| (item.id(), pos))
            .collect();
    }
}
