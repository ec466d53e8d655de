pub fn render_schema() -> String {
	let init = include_str!("../../../sql/init.sql");

	expand_includes(init)
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"00_extensions.sql" => out.push_str(include_str!("../../../sql/00_extensions.sql")),
				"tables/001_categories.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_categories.sql")),
				"tables/002_subcategories.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_subcategories.sql")),
				"tables/003_receipts.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_receipts.sql")),
				"tables/004_receipt_items.sql" =>
					out.push_str(include_str!("../../../sql/tables/004_receipt_items.sql")),
				"tables/005_chat_messages.sql" =>
					out.push_str(include_str!("../../../sql/tables/005_chat_messages.sql")),
				"tables/006_user_preferences.sql" =>
					out.push_str(include_str!("../../../sql/tables/006_user_preferences.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}
