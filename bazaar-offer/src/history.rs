use bazaar_store::{keys, Collections, StoreResult};

/// Put `product_id` at the front, dropping any earlier occurrence and
/// anything beyond `capacity`.
pub fn push_recent(history: &mut Vec<String>, product_id: &str, capacity: usize) {
    history.retain(|id| id != product_id);
    history.insert(0, product_id.to_string());
    history.truncate(capacity);
}

/// Per-user list of recently viewed product ids, most recent first.
#[derive(Clone)]
pub struct ViewHistory {
    collections: Collections,
    capacity: usize,
}

impl ViewHistory {
    pub fn new(collections: Collections, capacity: usize) -> Self {
        Self {
            collections,
            capacity,
        }
    }

    pub fn get(&self, user_id: &str) -> StoreResult<Vec<String>> {
        self.collections.load(&keys::view_history(user_id))
    }

    /// Record a product view and return the updated history.
    pub fn record(&self, user_id: &str, product_id: &str) -> StoreResult<Vec<String>> {
        let key = keys::view_history(user_id);
        let mut history: Vec<String> = self.collections.load(&key)?;
        push_recent(&mut history, product_id, self.capacity);
        self.collections.save(&key, &history)?;
        Ok(history)
    }
}
