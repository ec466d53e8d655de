//! Bounded receipt retrieval criteria.
//!
//! Term lists are OR-matched within a dimension and AND-matched across dimensions. Absent or
//! blank values impose no constraint. Deserialization is lenient because filters are produced by
//! a text-generation model: `null` stands for "unset", a lone string is accepted where a list is
//! expected, and an unparseable date or ordering key falls back to its default.

use std::{collections::HashSet, fmt::Formatter};

use serde::{
	Deserialize, Deserializer, Serialize, Serializer,
	de::{self, SeqAccess, Visitor},
};
use time::{Date, macros::format_description};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QueryFilter {
	#[serde(deserialize_with = "deserialize_terms", skip_serializing_if = "Vec::is_empty")]
	pub product_name: Vec<String>,
	#[serde(deserialize_with = "deserialize_terms", skip_serializing_if = "Vec::is_empty")]
	pub company: Vec<String>,
	#[serde(deserialize_with = "deserialize_terms", skip_serializing_if = "Vec::is_empty")]
	pub brand: Vec<String>,
	#[serde(deserialize_with = "deserialize_terms", skip_serializing_if = "Vec::is_empty")]
	pub category: Vec<String>,
	#[serde(deserialize_with = "deserialize_terms", skip_serializing_if = "Vec::is_empty")]
	pub subcategory: Vec<String>,
	#[serde(
		deserialize_with = "deserialize_date",
		serialize_with = "serialize_date",
		skip_serializing_if = "Option::is_none"
	)]
	pub date_from: Option<Date>,
	#[serde(
		deserialize_with = "deserialize_date",
		serialize_with = "serialize_date",
		skip_serializing_if = "Option::is_none"
	)]
	pub date_to: Option<Date>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub min_price: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_price: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub limit: Option<i64>,
	pub order_by: OrderBy,
	#[serde(deserialize_with = "deserialize_flag")]
	pub return_full_receipt: bool,
}
impl QueryFilter {
	pub fn product_terms(&self) -> Vec<&str> {
		active_terms(&self.product_name)
	}

	pub fn company_terms(&self) -> Vec<&str> {
		active_terms(&self.company)
	}

	pub fn brand_terms(&self) -> Vec<&str> {
		active_terms(&self.brand)
	}

	pub fn category_terms(&self) -> Vec<&str> {
		active_terms(&self.category)
	}

	pub fn subcategory_terms(&self) -> Vec<&str> {
		active_terms(&self.subcategory)
	}

	/// Number of product terms that differ after trimming and case folding.
	pub fn distinct_product_terms(&self) -> usize {
		self.product_terms().into_iter().map(str::to_lowercase).collect::<HashSet<_>>().len()
	}

	/// True when any constraint lives on line items rather than on the receipt itself.
	pub fn needs_item_join(&self) -> bool {
		!self.product_terms().is_empty()
			|| !self.brand_terms().is_empty()
			|| !self.category_terms().is_empty()
			|| !self.subcategory_terms().is_empty()
			|| self.min_price.is_some()
			|| self.max_price.is_some()
	}

	/// Category and subcategory constraints only hold while at most one product is named.
	///
	/// Several named products usually span several categories, so a single category constraint
	/// would hide valid matches for some of them. The constraints are dropped, not rejected.
	pub fn applies_category_filters(&self) -> bool {
		self.distinct_product_terms() <= 1
	}

	/// The caller's limit when it is positive and below `ceiling`, otherwise `ceiling`.
	pub fn effective_limit(&self, ceiling: u32) -> u32 {
		match self.limit {
			Some(limit) if limit > 0 && limit < i64::from(ceiling) => limit as u32,
			_ => ceiling,
		}
	}

	/// Whether compact encoding keeps only the items that match a product term.
	pub fn trims_items(&self) -> bool {
		!self.return_full_receipt && !self.product_terms().is_empty()
	}

	/// Case-insensitive substring match of any product term against either item name.
	pub fn matches_item_name(&self, name: &str, raw_name: &str) -> bool {
		let name = name.to_lowercase();
		let raw_name = raw_name.to_lowercase();

		self.product_terms().into_iter().any(|term| {
			let term = term.to_lowercase();

			name.contains(&term) || raw_name.contains(&term)
		})
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderBy {
	DateAsc,
	#[default]
	DateDesc,
	TotalAsc,
	TotalDesc,
}
impl OrderBy {
	/// Unknown keys fall back to the default, newest purchase first.
	pub fn parse(raw: &str) -> Self {
		match raw.trim().to_ascii_lowercase().as_str() {
			"date_asc" => Self::DateAsc,
			"total_asc" => Self::TotalAsc,
			"total_desc" => Self::TotalDesc,
			_ => Self::DateDesc,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::DateAsc => "date_asc",
			Self::DateDesc => "date_desc",
			Self::TotalAsc => "total_asc",
			Self::TotalDesc => "total_desc",
		}
	}
}
impl Serialize for OrderBy {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(self.as_str())
	}
}
impl<'de> Deserialize<'de> for OrderBy {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = Option::<String>::deserialize(deserializer)?;

		Ok(raw.as_deref().map(Self::parse).unwrap_or_default())
	}
}

fn active_terms(terms: &[String]) -> Vec<&str> {
	terms.iter().map(|term| term.trim()).filter(|term| !term.is_empty()).collect()
}

fn deserialize_terms<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
	D: Deserializer<'de>,
{
	struct TermsVisitor;
	impl<'de> Visitor<'de> for TermsVisitor {
		type Value = Vec<String>;

		fn expecting(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
			f.write_str("a string, a list of strings, or null")
		}

		fn visit_unit<E>(self) -> Result<Self::Value, E>
		where
			E: de::Error,
		{
			Ok(Vec::new())
		}

		fn visit_none<E>(self) -> Result<Self::Value, E>
		where
			E: de::Error,
		{
			Ok(Vec::new())
		}

		fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
		where
			E: de::Error,
		{
			Ok(vec![value.to_string()])
		}

		fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
		where
			A: SeqAccess<'de>,
		{
			let mut terms = Vec::new();

			while let Some(term) = seq.next_element::<Option<String>>()? {
				if let Some(term) = term {
					terms.push(term);
				}
			}

			Ok(terms)
		}
	}

	deserializer.deserialize_any(TermsVisitor)
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = Option::<String>::deserialize(deserializer)?;

	Ok(raw.as_deref().and_then(parse_date))
}

fn serialize_date<S>(value: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	match value {
		Some(date) => serializer.serialize_str(&date.to_string()),
		None => serializer.serialize_none(),
	}
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time part that is ignored.
fn parse_date(raw: &str) -> Option<Date> {
	let raw = raw.trim();
	let day = raw.get(..10)?;

	Date::parse(day, format_description!("[year]-[month]-[day]")).ok()
}
