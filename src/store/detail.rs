//! Secondary data slots (histories, reports) kept beside a store's collection

use super::flag::LoadingFlag;
use std::sync::{Arc, PoisonError, RwLock};

/// What a read-only related-data panel should render
#[derive(Debug, Clone, PartialEq)]
pub enum PanelContent<D> {
    Loading,
    Empty,
    Loaded(D),
}

impl<D> PanelContent<D> {
    pub fn is_loading(&self) -> bool {
        matches!(self, PanelContent::Loading)
    }

    pub fn loaded(&self) -> Option<&D> {
        match self {
            PanelContent::Loaded(data) => Some(data),
            _ => None,
        }
    }
}

/// A single value fetched on demand, with its own loading flag
///
/// The slot is independent of the store's main collection: loading a history
/// never touches the list, and the store's main loading flag stays down.
#[derive(Debug)]
pub struct DetailSlot<D> {
    value: Arc<RwLock<Option<D>>>,
    loading: LoadingFlag,
}

impl<D> Clone for DetailSlot<D> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            loading: self.loading.clone(),
        }
    }
}

impl<D> Default for DetailSlot<D> {
    fn default() -> Self {
        Self {
            value: Arc::new(RwLock::new(None)),
            loading: LoadingFlag::new(),
        }
    }
}

impl<D: Clone> DetailSlot<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<D> {
        self.value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set(&self, value: D) {
        *self.value.write().unwrap_or_else(PoisonError::into_inner) = Some(value);
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }

    pub fn loading_flag(&self) -> &LoadingFlag {
        &self.loading
    }

    /// Drop the value and lower the flag
    pub fn clear(&self) {
        *self.value.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.loading.reset();
    }

    /// Panel state: loading while the flag is up, then data or empty
    ///
    /// `is_empty` decides when a loaded value should render the empty state.
    pub fn panel<F>(&self, is_empty: F) -> PanelContent<D>
    where
        F: Fn(&D) -> bool,
    {
        if self.is_loading() {
            return PanelContent::Loading;
        }
        match self.get() {
            Some(data) if !is_empty(&data) => PanelContent::Loaded(data),
            _ => PanelContent::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_states() {
        let slot: DetailSlot<Vec<u32>> = DetailSlot::new();
        assert_eq!(slot.panel(Vec::is_empty), PanelContent::Empty);

        let guard = slot.loading_flag().raise();
        assert!(slot.panel(Vec::is_empty).is_loading());
        drop(guard);

        slot.set(vec![]);
        assert_eq!(slot.panel(Vec::is_empty), PanelContent::Empty);

        slot.set(vec![3, 4]);
        assert_eq!(slot.panel(Vec::is_empty).loaded(), Some(&vec![3, 4]));
    }

    #[test]
    fn test_clear() {
        let slot = DetailSlot::new();
        slot.set(5_u8);
        let _guard = slot.loading_flag().raise();
        slot.clear();
        assert_eq!(slot.get(), None);
        assert!(!slot.is_loading());
    }

    #[test]
    fn test_clones_share_value() {
        let slot = DetailSlot::new();
        let other = slot.clone();
        other.set("history".to_string());
        assert_eq!(slot.get().as_deref(), Some("history"));
    }
}
