use std::collections::HashSet;

use serde_json::Value;
use time::{Date, Month};
use uuid::Uuid;

use buybuddy_domain::{QueryFilter, Receipt, ReceiptItem, compact};

fn item(item_id: i64, name: &str, raw_name: &str) -> ReceiptItem {
	ReceiptItem {
		item_id,
		name: name.to_string(),
		raw_name: raw_name.to_string(),
		brand: None,
		quantity: 1.0,
		unit: "un".to_string(),
		unit_price: 4.5,
		total_price: 4.5,
		category: None,
		subcategory: None,
		barcode: None,
	}
}

fn receipt(company: &str, items: Vec<ReceiptItem>) -> Receipt {
	Receipt {
		receipt_id: Uuid::new_v4(),
		user_id: Uuid::nil(),
		company: company.to_string(),
		purchase_date: Date::from_calendar_date(2025, Month::June, 14).ok(),
		total: 21.3,
		items,
	}
}

fn product_filter(terms: &[&str], full: bool) -> QueryFilter {
	QueryFilter {
		product_name: terms.iter().map(|term| term.to_string()).collect(),
		return_full_receipt: full,
		..Default::default()
	}
}

fn collect_keys(value: &Value, keys: &mut HashSet<String>) {
	match value {
		Value::Object(map) =>
			for (key, inner) in map {
				keys.insert(key.clone());
				collect_keys(inner, keys);
			},
		Value::Array(values) =>
			for inner in values {
				collect_keys(inner, keys);
			},
		_ => {},
	}
}

#[test]
fn trims_to_matching_items() {
	let items = vec![item(1, "milk 1L", "LEITE 1L"), item(2, "bread", "PAO")];
	let receipts = vec![receipt("Mercado", items)];
	let payload = compact::encode(&receipts, Some(&product_filter(&["milk"], false)));

	assert_eq!(payload.receipts.len(), 1);
	assert_eq!(payload.receipts[0].items.len(), 1);
	assert_eq!(payload.receipts[0].items[0].n, "milk 1L");
}

#[test]
fn raw_name_matches_count() {
	let receipts = vec![receipt("Mercado", vec![item(1, "whole milk", "LEITE INTEGRAL")])];
	let payload = compact::encode(&receipts, Some(&product_filter(&["leite"], false)));

	assert_eq!(payload.receipts[0].items.len(), 1);
}

#[test]
fn receipts_without_matching_items_are_dropped() {
	let receipts = vec![
		receipt("Bakery", vec![item(1, "bread", "PAO"), item(2, "cake", "BOLO")]),
		receipt("Mercado", vec![item(3, "milk", "LEITE")]),
	];
	let payload = compact::encode(&receipts, Some(&product_filter(&["milk"], false)));

	assert_eq!(payload.receipts.len(), 1);
	assert_eq!(payload.receipts[0].co, "Mercado");
}

#[test]
fn full_receipt_flag_keeps_every_item() {
	let items = vec![item(1, "milk", "LEITE"), item(2, "bread", "PAO")];
	let receipts = vec![receipt("Mercado", items)];
	let payload = compact::encode(&receipts, Some(&product_filter(&["milk"], true)));

	assert_eq!(payload.receipts[0].items.len(), 2);
}

#[test]
fn no_product_terms_keeps_everything() {
	let receipts =
		vec![receipt("Mercado", vec![item(1, "milk", "LEITE")]), receipt("Empty", Vec::new())];
	let filter = QueryFilter { company: vec!["Mercado".to_string()], ..Default::default() };

	assert_eq!(compact::encode(&receipts, Some(&filter)).receipts.len(), 2);
	assert_eq!(compact::encode(&receipts, None).receipts.len(), 2);
}

#[test]
fn empty_optional_fields_are_omitted() {
	let mut sparse = item(1, " milk ", " LEITE ");

	sparse.brand = Some("  ".to_string());
	sparse.barcode = Some(String::new());

	let mut rich = item(2, "cheese", "QUEIJO");

	rich.brand = Some("Tirolez".to_string());
	rich.category = Some("Alimentos".to_string());
	rich.subcategory = Some("Laticinios".to_string());
	rich.barcode = Some("7891234567890".to_string());

	let mut undated = receipt("  Mercado Central ", vec![sparse, rich]);

	undated.purchase_date = None;

	let payload = compact::encode(&[undated], None);
	let value = serde_json::to_value(&payload).expect("Failed to serialize payload.");
	let receipt = &value["receipts"][0];

	assert_eq!(receipt["co"], "Mercado Central");
	assert!(receipt.get("d").is_none());
	assert_eq!(receipt["items"][0]["n"], "milk");
	assert_eq!(receipt["items"][0]["rn"], "LEITE");

	for key in ["b", "cat", "sc", "bc"] {
		assert!(receipt["items"][0].get(key).is_none(), "Expected {key} to be omitted.");
	}

	assert_eq!(receipt["items"][1]["b"], "Tirolez");
	assert_eq!(receipt["items"][1]["cat"], "Alimentos");
	assert_eq!(receipt["items"][1]["sc"], "Laticinios");
	assert_eq!(receipt["items"][1]["bc"], "7891234567890");
}

#[test]
fn dates_are_iso_days() {
	let payload = compact::encode(&[receipt("Mercado", Vec::new())], None);

	assert_eq!(payload.receipts[0].d.as_deref(), Some("2025-06-14"));
}

#[test]
fn encoding_is_byte_stable() {
	let receipts = vec![
		receipt("Mercado", vec![item(1, "milk", "LEITE"), item(2, "bread", "PAO")]),
		receipt("Feira", vec![item(3, "banana", "BANANA PRATA")]),
	];
	let filter = product_filter(&["milk", "banana"], false);
	let first = serde_json::to_string(&compact::encode(&receipts, Some(&filter)))
		.expect("Failed to serialize payload.");
	let second = serde_json::to_string(&compact::encode(&receipts, Some(&filter)))
		.expect("Failed to serialize payload.");

	assert_eq!(first, second);
}

#[test]
fn every_emitted_key_is_in_the_legend() {
	let mut rich = item(1, "cheese", "QUEIJO");

	rich.brand = Some("Tirolez".to_string());
	rich.category = Some("Alimentos".to_string());
	rich.subcategory = Some("Laticinios".to_string());
	rich.barcode = Some("789".to_string());

	let payload = compact::encode(&[receipt("Mercado", vec![rich])], None);
	let legend: HashSet<&str> = payload.legend.keys().copied().collect();
	let mut keys = HashSet::new();

	for receipt in &payload.receipts {
		let value = serde_json::to_value(receipt).expect("Failed to serialize receipt.");

		collect_keys(&value, &mut keys);
	}

	keys.remove("items");

	for key in keys {
		assert!(legend.contains(key.as_str()), "Key {key} is missing from the legend.");
	}
}

#[test]
fn payload_keys_are_legend_and_receipts() {
	let value = serde_json::to_value(compact::encode(&[], None)).expect("Failed to serialize.");
	let keys: Vec<&str> = value
		.as_object()
		.expect("Payload must be an object.")
		.keys()
		.map(String::as_str)
		.collect();

	assert_eq!(keys, ["legend", "receipts"]);
	assert_eq!(value["legend"]["co"], "company");
	assert_eq!(value["legend"]["bc"], "barcode");
	assert_eq!(value["receipts"], Value::Array(Vec::new()));
}
