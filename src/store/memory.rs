//! In-memory item store
//!
//! Items live in a `Vec` in creation order, next to the id counter.

use std::sync::{Mutex, MutexGuard};

use super::{Item, ItemFields, ItemStore, StoreError};

#[derive(Debug)]
struct MemoryState {
    items: Vec<Item>,
    next_id: i64,
}

impl MemoryState {
    const fn new() -> Self {
        Self {
            items: Vec::new(),
            next_id: 1,
        }
    }

    fn position(&self, id: i64) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }
}

/// Item store backed by process memory. Contents are lost on exit.
#[derive(Debug)]
pub struct MemoryItemStore {
    /// `None` once disposed
    state: Mutex<Option<MemoryState>>,
}

impl MemoryItemStore {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(Some(MemoryState::new())),
        }
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut MemoryState) -> T) -> Result<T, StoreError> {
        let mut guard: MutexGuard<'_, Option<MemoryState>> =
            self.state.lock().map_err(|_| StoreError::Poisoned)?;
        let state = guard.as_mut().ok_or(StoreError::Disposed)?;
        Ok(f(state))
    }
}

impl Default for MemoryItemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemStore for MemoryItemStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn list_all(&self) -> Result<Vec<Item>, StoreError> {
        self.with_state(|state| state.items.clone())
    }

    fn get_by_id(&self, id: i64) -> Result<Option<Item>, StoreError> {
        self.with_state(|state| state.items.iter().find(|item| item.id == id).cloned())
    }

    fn insert(&self, fields: ItemFields) -> Result<Item, StoreError> {
        self.with_state(|state| {
            let item = fields.into_item(state.next_id);
            state.next_id += 1;
            state.items.push(item.clone());
            item
        })
    }

    fn update(&self, id: i64, fields: ItemFields) -> Result<Option<Item>, StoreError> {
        self.with_state(|state| {
            let index = state.position(id)?;
            let item = &mut state.items[index];
            item.name = fields.name;
            item.description = fields.description;
            Some(item.clone())
        })
    }

    fn delete_by_id(&self, id: i64) -> Result<Option<Item>, StoreError> {
        self.with_state(|state| {
            let index = state.position(id)?;
            // remove, not swap_remove: creation order must survive
            Some(state.items.remove(index))
        })
    }

    fn reset_all(&self) -> Result<(), StoreError> {
        self.with_state(|state| *state = MemoryState::new())
    }

    fn dispose(&self) -> Result<(), StoreError> {
        let mut guard = self.state.lock().map_err(|_| StoreError::Poisoned)?;
        *guard = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(name: &str, description: &str) -> ItemFields {
        ItemFields {
            name: name.to_string(),
            description: description.to_string(),
        }
    }

    #[test]
    fn test_insert_assigns_sequential_ids() {
        let store = MemoryItemStore::new();
        let a = store.insert(fields("a", "first")).unwrap();
        let b = store.insert(fields("b", "second")).unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(store.list_all().unwrap(), vec![a, b]);
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let store = MemoryItemStore::new();
        store.insert(fields("a", "x")).unwrap();
        let b = store.insert(fields("b", "x")).unwrap();
        store.delete_by_id(b.id).unwrap();
        let c = store.insert(fields("c", "x")).unwrap();
        assert_eq!(c.id, 3);
    }

    #[test]
    fn test_delete_middle_preserves_order() {
        let store = MemoryItemStore::new();
        let a = store.insert(fields("a", "x")).unwrap();
        let b = store.insert(fields("b", "x")).unwrap();
        let c = store.insert(fields("c", "x")).unwrap();

        let removed = store.delete_by_id(b.id).unwrap();
        assert_eq!(removed, Some(b));
        assert_eq!(store.list_all().unwrap(), vec![a, c]);
    }

    #[test]
    fn test_update_keeps_id_and_position() {
        let store = MemoryItemStore::new();
        store.insert(fields("a", "x")).unwrap();
        let b = store.insert(fields("b", "x")).unwrap();
        store.insert(fields("c", "x")).unwrap();

        let updated = store.update(b.id, fields("bee", "changed")).unwrap().unwrap();
        assert_eq!(updated.id, b.id);
        assert_eq!(updated.name, "bee");

        let names: Vec<_> = store
            .list_all()
            .unwrap()
            .into_iter()
            .map(|item| item.name)
            .collect();
        assert_eq!(names, ["a", "bee", "c"]);
    }

    #[test]
    fn test_missing_ids() {
        let store = MemoryItemStore::new();
        assert_eq!(store.get_by_id(999).unwrap(), None);
        assert_eq!(store.update(999, fields("a", "b")).unwrap(), None);
        assert_eq!(store.delete_by_id(999).unwrap(), None);
    }

    #[test]
    fn test_reset_restarts_ids() {
        let store = MemoryItemStore::new();
        store.insert(fields("a", "x")).unwrap();
        store.insert(fields("b", "x")).unwrap();

        store.reset_all().unwrap();
        assert!(store.list_all().unwrap().is_empty());
        assert_eq!(store.insert(fields("c", "x")).unwrap().id, 1);
    }

    #[test]
    fn test_dispose_rejects_further_use() {
        let store = MemoryItemStore::new();
        store.dispose().unwrap();
        assert!(matches!(store.list_all(), Err(StoreError::Disposed)));
        assert!(matches!(
            store.insert(fields("a", "x")),
            Err(StoreError::Disposed)
        ));
    }
}
