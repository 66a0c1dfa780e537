//! Inverted-index blocking over the reference account set. Reduces the
//! O(n) "compare query row against every account" problem to O(1) lookups
//! on a handful of high-selectivity keys before the expensive TF-IDF/
//! scoring stages run.

use std::collections::HashMap;

use crate::row::Row;

pub struct Blocker {
	by_postal: HashMap<String, Vec<usize>>,
	by_state: HashMap<String, Vec<usize>>,
	by_domain: HashMap<String, Vec<usize>>,
	by_phone: HashMap<String, Vec<usize>>,
	total_accounts: usize,
}

fn build_index(accounts: &[Row], column: &str) -> HashMap<String, Vec<usize>> {
	let mut index: HashMap<String, Vec<usize>> = HashMap::new();
	for (position, account) in accounts.iter().enumerate() {
		let key = account.get_str(column);
		if key.is_empty() {
			continue;
		}
		index.entry(key).or_default().push(position);
	}
	index
}

impl Blocker {
	/// Build the four inverted indexes from a normalized account reference
	/// set. Positions are indexes into `accounts`, the same slice the
	/// caller will later index into for candidate rows.
	pub fn build(accounts: &[Row]) -> Self {
		Self {
			by_postal: build_index(accounts, "normalizedpostal"),
			by_state: build_index(accounts, "state"),
			by_domain: build_index(accounts, "normalizeddomain"),
			by_phone: build_index(accounts, "normalizedphone"),
			total_accounts: accounts.len(),
		}
	}

	/// Candidate account positions for a query row, in priority order:
	/// postal, state, domain, phone, falling back to every account if none
	/// of those keys produce a hit.
	pub fn candidates(&self, query: &Row) -> Vec<usize> {
		for (index, column) in [
			(&self.by_postal, "normalizedpostal"),
			(&self.by_state, "state"),
			(&self.by_domain, "normalizeddomain"),
			(&self.by_phone, "normalizedphone"),
		] {
			let key = query.get_str(column);
			if key.is_empty() {
				continue;
			}
			if let Some(positions) = index.get(&key) {
				return positions.clone();
			}
		}
		(0..self.total_accounts).collect()
	}
}
