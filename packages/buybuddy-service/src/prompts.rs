//! Prompt text for the two generation calls of a turn.

use std::fmt::Write;

use time::{Date, OffsetDateTime};

use buybuddy_domain::{Category, ChatRole, ChatTurn};

const SCHEMA_DESCRIPTION: &str = "\
Database schema for user receipts:

RECEIPTS table:
- id: unique identifier
- company: store/company name where purchase was made
- date: purchase date (YYYY-MM-DD format)
- total: total amount paid

RECEIPT_ITEMS table (each receipt has multiple items):
- name: cleaned product name
- raw_name: original product name from receipt
- brand: product brand (may be empty)
- quantity: amount purchased
- unit: unit of measurement (un, kg, L, etc.)
- unit_price: price per unit
- total_price: total price for this item
- category: product category name
- subcategory: product subcategory name
- barcode: product barcode (may be empty)";

const RESPONSE_CONTRACT: &str = r#"Analyze if this question requires querying the receipt database or can be answered directly.

RESPOND WITH JSON ONLY. Choose one of these formats:

OPTION A - Direct answer (for greetings, general questions, or questions answerable from conversation history):
{
  "type": "direct",
  "answer": "Your helpful response here"
}

OPTION B - Query needed (for questions about purchases, prices, products, spending):
{
  "type": "query",
  "specific": {
    "productName": ["exact product name or 1-2 close variations"],
    "company": ["store name if mentioned"],
    "brand": ["brand if mentioned"],
    "category": ["category if relevant"],
    "subcategory": ["subcategory if relevant"],
    "dateFrom": "YYYY-MM-DD if date range mentioned",
    "dateTo": "YYYY-MM-DD if date range mentioned",
    "minPrice": null or number,
    "maxPrice": null or number,
    "limit": number (how many results needed, e.g., 1 for "last purchase", 5 for "last 5", null for all),
    "orderBy": "date_desc" | "date_asc" | "total_desc" | "total_asc" (default: date_desc),
    "returnFullReceipt": false (true ONLY if the user needs ALL items from matching receipts)
  },
  "general": {
    "productName": ["broader variations, synonyms, related terms - 3-5 options"],
    "company": ["if mentioned, keep same"],
    "brand": ["if mentioned, keep same or add variations"],
    "category": ["broader category if relevant"],
    "subcategory": [],
    "dateFrom": "wider date range or null",
    "dateTo": "wider date range or null",
    "minPrice": null,
    "maxPrice": null,
    "limit": null or larger number than specific,
    "orderBy": same as specific or null
  }
}

IMPORTANT NOTES:
- When searching for multiple product names, the category filter is ignored automatically since the products span multiple categories
- Use returnFullReceipt: true only when the user asks something like "what else did I buy with X" or "show me the full receipt"

LIMIT AND ORDER EXAMPLES:
- "last purchase" -> limit: 1, orderBy: "date_desc"
- "first time I bought" -> limit: 1, orderBy: "date_asc"
- "last 3 times" -> limit: 3, orderBy: "date_desc"
- "most expensive purchase" -> limit: 1, orderBy: "total_desc"
- "cheapest milk" -> limit: 1, orderBy: "total_asc"
- Recipe or cost estimation with several ingredients -> limit: 10-20
- Price comparison questions -> limit: 5-10

For the general query, make it less restrictive than specific:
- Add more product name variations and synonyms
- Widen or remove date constraints
- Remove price constraints
- Keep only essential filters

Only include non-empty fields. Omit fields with empty arrays or null values."#;

const ANSWER_GUIDELINES: &str = "\
IMPORTANT GUIDELINES:
- Show prices in Brazilian Reais (R$) with exact values
- Include store name and date when discussing purchases
- If no relevant data is found, tell the user you don't have that information
- Use conversation context for references like \"that product\" or \"the last one\"
- When counting how many times the user bought something, count RECEIPTS (separate purchases), not line items
- Each receipt id is one purchase occasion, even if a product appears several times in it

WHEN PROVIDING PRODUCT HISTORY:
- Product name and brand (if available)
- Store name and purchase date
- Quantity and unit (kg, un, L, etc.)
- Unit price and total price
- Category/subcategory if available
- Use markdown formatting (bold, lists)
- Show price comparisons for repeat purchases
- Highlight the most recent purchase

Respond in the same language as the user's question. Be concise but informative.";

pub struct IntentPromptArgs<'a> {
	pub question: &'a str,
	pub history: &'a [ChatTurn],
	pub first_purchase: Option<Date>,
	pub vocabulary: &'a [Category],
	/// The user's local wall clock.
	pub now: OffsetDateTime,
}

pub fn intent_prompt(args: &IntentPromptArgs<'_>) -> String {
	let first_purchase = match args.first_purchase {
		Some(date) => format!("User's first receipt date: {date}"),
		None => "No receipts yet.".to_string(),
	};

	format!(
		"You are a shopping assistant that helps users query their purchase history.

{SCHEMA_DESCRIPTION}

{vocabulary}
Current context:
- Current date: {date}
- Day of week: {weekday}
- Timezone: {offset}
- {first_purchase}
{conversation}
User's question: {question}

{RESPONSE_CONTRACT}",
		vocabulary = vocabulary_block(args.vocabulary),
		date = args.now.date(),
		weekday = args.now.weekday(),
		offset = format_offset(args.now),
		conversation = conversation_block(args.history),
		question = args.question,
	)
}

pub fn answer_prompt(question: &str, history: &[ChatTurn], payload_json: &str) -> String {
	format!(
		"You are a helpful shopping assistant for a Brazilian user.

The JSON below contains the user's relevant purchase history. The \"legend\" field explains \
the abbreviated keys:
{payload_json}
{conversation}
User's question: {question}

{ANSWER_GUIDELINES}",
		conversation = conversation_block(history),
	)
}

fn conversation_block(history: &[ChatTurn]) -> String {
	if history.is_empty() {
		return String::new();
	}

	let mut out = String::from("\nPrevious conversation:\n");

	for turn in history {
		let speaker = match turn.role {
			ChatRole::User => "User",
			ChatRole::Assistant => "Assistant",
		};
		let _ = writeln!(out, "{speaker}: {}", turn.content);
	}

	out
}

fn vocabulary_block(vocabulary: &[Category]) -> String {
	if vocabulary.is_empty() {
		return "No categories available.\n".to_string();
	}

	let mut out = String::from("Available categories and subcategories:\n");

	for category in vocabulary {
		if category.subcategories.is_empty() {
			let _ = writeln!(out, "- {}", category.name);
		} else {
			let _ = writeln!(out, "- {}: {}", category.name, category.subcategories.join(", "));
		}
	}

	out
}

fn format_offset(now: OffsetDateTime) -> String {
	let offset = now.offset();
	let sign = if offset.is_negative() { '-' } else { '+' };

	format!(
		"UTC{sign}{:02}:{:02}",
		offset.whole_hours().unsigned_abs(),
		offset.minutes_past_hour().unsigned_abs()
	)
}
