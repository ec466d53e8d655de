use buybuddy_domain::Category;

use crate::{Result, db::Db, models::CategoryPairRow};

/// Live categories with their live subcategories, both ordered by name.
pub async fn list_vocabulary(db: &Db) -> Result<Vec<Category>> {
	let rows = sqlx::query_as::<_, CategoryPairRow>(
		"\
SELECT c.name AS category, s.name AS subcategory
FROM categories c
LEFT JOIN subcategories s
	ON s.category_id = c.category_id
	AND s.deleted_at IS NULL
WHERE c.deleted_at IS NULL
ORDER BY c.name, s.name",
	)
	.fetch_all(&db.pool)
	.await?;

	Ok(group_pairs(rows))
}

fn group_pairs(rows: Vec<CategoryPairRow>) -> Vec<Category> {
	let mut categories: Vec<Category> = Vec::new();

	for row in rows {
		let is_same = categories.last().is_some_and(|last| last.name == row.category);

		if !is_same {
			categories.push(Category { name: row.category, subcategories: Vec::new() });
		}
		if let (Some(subcategory), Some(current)) = (row.subcategory, categories.last_mut()) {
			current.subcategories.push(subcategory);
		}
	}

	categories
}
