use std::collections::HashSet;

use uuid::Uuid;

use crate::receipt::Receipt;

/// Size budget for merging precise and broad retrieval results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FusionPolicy {
	/// A specific list at least this long is returned as-is.
	pub min_specific: usize,
	/// Upper bound on general entries appended to a short specific list.
	pub max_backfill: usize,
}
impl Default for FusionPolicy {
	fn default() -> Self {
		Self { min_specific: 10, max_backfill: 5 }
	}
}

/// Merges `specific` and `general` into one list, specific entries first.
///
/// General entries fill in only while the specific list is shorter than `min_specific`, in
/// their given order, skipping receipts already present, up to `max_backfill` additions.
pub fn fuse(specific: Vec<Receipt>, general: Vec<Receipt>, policy: FusionPolicy) -> Vec<Receipt> {
	if specific.len() >= policy.min_specific {
		return specific;
	}

	let mut seen: HashSet<Uuid> = specific.iter().map(|receipt| receipt.receipt_id).collect();
	let mut fused = specific;
	let mut added = 0;

	for receipt in general {
		if added >= policy.max_backfill {
			break;
		}
		if !seen.insert(receipt.receipt_id) {
			continue;
		}

		fused.push(receipt);

		added += 1;
	}

	fused
}
