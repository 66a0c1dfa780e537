//! The three-strategy account resolution pipeline: email pivot, blocked
//! fuzzy match, deterministic ID fallback. Strategies run in that priority
//! order over whatever rows the previous strategy left unmatched; the
//! three result sets are disjoint by construction (keyed on
//! `original_index`) and are unioned, then left-joined back onto the
//! original input so output order always matches input order.

use std::collections::HashMap;
use std::path::Path;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::blocker::Blocker;
use crate::cache;
use crate::configuration::Configuration;
use crate::row::{Cell, Row};
use crate::scorer;
use crate::tfidf::{self, Vectorizer};

pub const ORIGINAL_INDEX_COLUMN: &str = "original_index";

/// Assign a stable `original_index` to each row, in load order.
pub fn assign_original_indexes(rows: &mut [Row]) {
	for (index, row) in rows.iter_mut().enumerate() {
		row.set(ORIGINAL_INDEX_COLUMN, Cell::Number(index as f64));
	}
}

fn account_id_of(accounts: &[Row], position: usize) -> String {
	accounts[position].get_str("account_id")
}

fn original_index(row: &Row) -> usize {
	row.get_str(ORIGINAL_INDEX_COLUMN).parse().unwrap_or(0)
}

struct AccountMatch {
	/// The `account_id` the match resolved to. Always populated, even when
	/// `account_position` is `None` — an email-pivot hit whose contact
	/// points at an `account_id` absent from the accounts reference is
	/// still a hit (spec's account-reference left-join yields a blank
	/// account row, not a dropped match).
	account_id: String,
	/// Position into `accounts`, when the match resolved to an actual
	/// account row. `None` only arises from Stage 1's dangling-FK case;
	/// Stages 2 and 3 always resolve through an accounts lookup.
	account_position: Option<usize>,
	score: f64,
	match_type: String,
}

/// Run the full account pipeline, returning `(matched_output,
/// manual_review)`. Both preserve the original input row order.
pub fn run(
	config: &Configuration,
	input: &[Row],
	accounts: &[Row],
	contacts: &[Row],
	cache_dir: &Path,
) -> (Vec<Row>, Vec<Row>) {
	let mut matches: HashMap<usize, AccountMatch> = HashMap::new();

	stage1_email_pivot(input, accounts, contacts, &mut matches);
	info!(matched = matches.len(), "stage 1 email pivot complete");

	stage2_blocked_fuzzy_match(config, input, accounts, cache_dir, &mut matches);
	info!(matched = matches.len(), "stage 2 blocked fuzzy match complete");

	stage3_deterministic_id_fallback(input, accounts, &mut matches);
	info!(matched = matches.len(), "stage 3 deterministic id fallback complete");

	join_back(input, accounts, matches)
}

fn account_by_id(accounts: &[Row]) -> HashMap<String, usize> {
	let mut index = HashMap::new();
	for (position, account) in accounts.iter().enumerate() {
		let id = account.get_str("account_id");
		if !id.is_empty() {
			index.entry(id).or_insert(position);
		}
	}
	index
}

/// Stage 1: inner-join input on `email` against contacts, then left-join
/// the result to accounts on `accountid == account_id`. A dangling foreign
/// key (a contact whose `account_id` has no matching account row) is still
/// a hit per the left-join semantics — it's recorded with `account_position
/// = None` and flows through `join_back` with blank `Matched *` fields
/// rather than being dropped.
fn stage1_email_pivot(
	input: &[Row],
	accounts: &[Row],
	contacts: &[Row],
	matches: &mut HashMap<usize, AccountMatch>,
) {
	let mut contact_by_email: HashMap<String, &Row> = HashMap::new();
	for contact in contacts {
		let email = contact.get_str("email");
		if email.is_empty() {
			continue;
		}
		contact_by_email.entry(email).or_insert(contact);
	}

	let accounts_by_id = account_by_id(accounts);

	for row in input {
		let email = row.get_str("email");
		if email.is_empty() {
			continue;
		}
		let Some(contact) = contact_by_email.get(&email) else { continue };
		let account_id = contact.get_str("account_id");
		if account_id.is_empty() {
			continue;
		}
		let account_position = accounts_by_id.get(&account_id).copied();

		matches.insert(
			original_index(row),
			AccountMatch { account_id, account_position, score: 100.0, match_type: "Email Match".to_string() },
		);
	}
}

fn stage2_blocked_fuzzy_match(
	config: &Configuration,
	input: &[Row],
	accounts: &[Row],
	cache_dir: &Path,
	matches: &mut HashMap<usize, AccountMatch>,
) {
	let account_search_strings: Vec<String> = accounts.iter().map(tfidf::search_string).collect();
	let key = cache::cache_key(&account_search_strings);

	let (vectorizer, account_vectors) = match cache::load(cache_dir, &key) {
		Some(cached) => cached,
		None => {
			let vectorizer = Vectorizer::fit(&account_search_strings);
			let account_vectors: Vec<_> = account_search_strings
				.iter()
				.map(|s| vectorizer.transform(s))
				.collect();
			cache::save(cache_dir, &key, &vectorizer, &account_vectors);
			(vectorizer, account_vectors)
		}
	};

	let blocker = Blocker::build(accounts);
	let minimum_final_score = config.fuzzy_matching_thresholds.minimum_final_score;

	let unmatched: Vec<&Row> = input.iter().filter(|row| !matches.contains_key(&original_index(row))).collect();

	let found: Vec<(usize, AccountMatch)> = unmatched
		.par_iter()
		.filter_map(|row| {
			let search_string = tfidf::search_string(row);
			if search_string.is_empty() {
				return None;
			}

			let candidates = blocker.candidates(row);
			if candidates.is_empty() {
				return None;
			}

			let query_vector = vectorizer.transform(&search_string);
			let ranked = tfidf::rank_top_25(&query_vector, &candidates, &account_vectors);

			let mut best: Option<(usize, f64, String)> = None;
			for (position, _similarity) in ranked {
				let result = scorer::score(row, &accounts[position], &config.scoring_weights, &config.scoring_penalties);
				let better = match &best {
					Some((_, best_score, _)) => result.score > *best_score,
					None => true,
				};
				if better {
					best = Some((position, result.score, result.details));
				}
			}

			let (position, score, details) = best?;
			if score < minimum_final_score {
				return None;
			}

			Some((
				original_index(row),
				AccountMatch {
					account_id: account_id_of(accounts, position),
					account_position: Some(position),
					score,
					match_type: details,
				},
			))
		})
		.collect();

	for (index, account_match) in found {
		matches.insert(index, account_match);
	}
}

fn stage3_deterministic_id_fallback(input: &[Row], accounts: &[Row], matches: &mut HashMap<usize, AccountMatch>) {
	let mut by_ccn: HashMap<String, usize> = HashMap::new();
	let mut by_dhc: HashMap<String, usize> = HashMap::new();
	for (position, account) in accounts.iter().enumerate() {
		let ccn = account.get_str("normalizedccn");
		if !ccn.is_empty() {
			by_ccn.entry(ccn).or_insert(position);
		}
		let dhc = account.get_str("normalizeddhc");
		if !dhc.is_empty() {
			by_dhc.entry(dhc).or_insert(position);
		}
	}

	for row in input {
		let index = original_index(row);
		if matches.contains_key(&index) {
			continue;
		}

		let ccn = row.get_str("normalizedccn");
		if !ccn.is_empty()
			&& let Some(&position) = by_ccn.get(&ccn)
		{
			matches.insert(
				index,
				AccountMatch {
					account_id: account_id_of(accounts, position),
					account_position: Some(position),
					score: 99.0,
					match_type: "CCN Match".to_string(),
				},
			);
			continue;
		}

		let dhc = row.get_str("normalizeddhc");
		if !dhc.is_empty()
			&& let Some(&position) = by_dhc.get(&dhc)
		{
			matches.insert(
				index,
				AccountMatch {
					account_id: account_id_of(accounts, position),
					account_position: Some(position),
					score: 99.0,
					match_type: "DHC Match".to_string(),
				},
			);
		}
	}
}

fn join_back(input: &[Row], accounts: &[Row], matches: HashMap<usize, AccountMatch>) -> (Vec<Row>, Vec<Row>) {
	let mut output = Vec::new();
	let mut manual_review = Vec::new();

	for row in input {
		let index = original_index(row);
		match matches.get(&index) {
			Some(account_match) => {
				let account = account_match.account_position.map(|position| &accounts[position]);
				let mut result = row.clone();
				result.set("matched_accountid", account_match.account_id.clone());
				result.set("match_score", Cell::Number(account_match.score));
				result.set("match_type", account_match.match_type.clone());
				result.set("Matched Company Name", account.map(|a| a.get_str("company")).unwrap_or_default());
				result.set("Matched Primary LOB", account.map(|a| a.get_str("lob")).unwrap_or_default());
				result.set("Matched Owner Name", account.map(|a| a.get_str("owner_name")).unwrap_or_default());
				result.set("Matched Owner ID", account.map(|a| a.get_str("owner_id")).unwrap_or_default());
				result.set("Matched Account Status", account.map(|a| a.get_str("account_status")).unwrap_or_default());
				result.set("Matched Total Open Opps", account.map(|a| a.get_str("total_open_opps")).unwrap_or_default());
				output.push(result);
			}
			None => {
				debug!(original_index = index, "no account match; routed to manual review");
				manual_review.push(row.clone());
			}
		}
	}

	(output, manual_review)
}
