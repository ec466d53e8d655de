use serde::{Deserialize, Serialize};

/// A category name and the subcategory names filed under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
	pub name: String,
	pub subcategories: Vec<String>,
}
