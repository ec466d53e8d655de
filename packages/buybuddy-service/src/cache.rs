use std::{
	collections::HashMap,
	sync::{PoisonError, RwLock},
};

use time::Date;
use uuid::Uuid;

/// Read-through cache of each user's earliest purchase date.
///
/// Entries are filled lazily on first lookup and live for the life of the service. A cached
/// `None` means the user had no dated receipts when first asked. Lookup failures are never
/// cached.
#[derive(Debug, Default)]
pub struct FirstPurchaseCache {
	entries: RwLock<HashMap<Uuid, Option<Date>>>,
}
impl FirstPurchaseCache {
	/// The outer `Option` tells whether the user is cached at all.
	pub fn get(&self, user_id: Uuid) -> Option<Option<Date>> {
		self.entries.read().unwrap_or_else(PoisonError::into_inner).get(&user_id).copied()
	}

	pub fn set(&self, user_id: Uuid, date: Option<Date>) {
		self.entries.write().unwrap_or_else(PoisonError::into_inner).insert(user_id, date);
	}

	pub fn invalidate(&self, user_id: Uuid) {
		self.entries.write().unwrap_or_else(PoisonError::into_inner).remove(&user_id);
	}
}
