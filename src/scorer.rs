//! Weighted multi-signal scorer. Given a query row and a candidate account
//! row, accumulates a score and an explainability string out of the
//! signals that fired.

use crate::configuration::{ScoringPenaltiesConfig, ScoringWeightsConfig};
use crate::fuzzy::{ratio, token_set_ratio};
use crate::row::Row;

/// Signals whose fuzzy contribution is below this floor are dropped
/// entirely rather than appearing as a near-zero detail fragment. Carried
/// over unchanged from the reference implementation even though its
/// origin looks like leftover noise-floor tuning rather than intentional
/// design.
const ACCOUNT_SCORE_FLOOR: f64 = 1.0;

pub struct ScoredMatch {
	pub score: f64,
	pub details: String,
}

/// Score a query row against one candidate account row.
pub fn score(query: &Row, candidate: &Row, weights: &ScoringWeightsConfig, penalties: &ScoringPenaltiesConfig) -> ScoredMatch {
	let mut total = 0.0;
	let mut details: Vec<String> = Vec::new();

	let country_a = query.get_str("country");
	let country_b = candidate.get_str("country");
	if !country_a.is_empty() && !country_b.is_empty() && country_a != country_b {
		total -= penalties.location_mismatch_penalty;
		details.push(format!("CountryMismatch(-{})", penalties.location_mismatch_penalty));
	}

	let state_a = query.get_str("state");
	let state_b = candidate.get_str("state");
	if !state_a.is_empty() && !state_b.is_empty() && state_a != state_b {
		total -= penalties.location_mismatch_penalty;
		details.push(format!("StateMismatch(-{})", penalties.location_mismatch_penalty));
	}

	let company_a = query.get_str("normalizedcompany");
	let company_b = candidate.get_str("normalizedcompany");
	if !company_a.is_empty() && !company_b.is_empty() {
		let contribution = weights.company_name * (token_set_ratio(&company_a, &company_b) as f64) / 100.0;
		if contribution > ACCOUNT_SCORE_FLOOR {
			total += contribution;
			details.push(format!("Name({})", contribution.round() as i64));
		}
	}

	let website_a = query.get_str("normalizedwebsite");
	let website_b = candidate.get_str("normalizedwebsite");
	if !website_a.is_empty() && !website_b.is_empty() {
		if website_a == website_b {
			total += weights.website;
			details.push(format!("Website({})", weights.website.round() as i64));
		} else if penalties.conflicting_website_penalty > 0.0 {
			total -= penalties.conflicting_website_penalty;
			details.push(format!("WebsiteConflict(-{})", penalties.conflicting_website_penalty));
		}
	}

	let phone_a = query.get_str("normalizedphone");
	let phone_b = candidate.get_str("normalizedphone");
	if !phone_a.is_empty() && !phone_b.is_empty() && phone_a == phone_b {
		total += weights.phone;
		details.push(format!("Phone({})", weights.phone.round() as i64));
	}

	let street_a = query.get_str("normalizedstreet");
	let street_b = candidate.get_str("normalizedstreet");
	if !street_a.is_empty() && !street_b.is_empty() {
		let contribution = weights.street * (ratio(&street_a, &street_b) as f64) / 100.0;
		if contribution > ACCOUNT_SCORE_FLOOR {
			total += contribution;
			details.push(format!("Street({})", contribution.round() as i64));
		}
	}

	let city_a = query.get_str("city");
	let city_b = candidate.get_str("city");
	if !city_a.is_empty() && !city_b.is_empty() {
		let contribution = weights.city * (ratio(&city_a, &city_b) as f64) / 100.0;
		if contribution > ACCOUNT_SCORE_FLOOR {
			total += contribution;
			details.push(format!("City({})", contribution.round() as i64));
		}
	}

	let postal_a = query.get_str("normalizedpostal");
	let postal_b = candidate.get_str("normalizedpostal");
	if !postal_a.is_empty() && !postal_b.is_empty() && postal_a == postal_b {
		total += weights.postal_code;
		details.push(format!("Postal({})", weights.postal_code.round() as i64));
	}

	let lob_a = query.get_str("normalized_lob");
	let lob_b = candidate.get_str("normalized_lob");
	if !lob_a.is_empty() && !lob_b.is_empty() {
		let contribution = weights.primary_lob * (token_set_ratio(&lob_a, &lob_b) as f64) / 100.0;
		if contribution > ACCOUNT_SCORE_FLOOR {
			total += contribution;
			details.push(format!("LOB({})", contribution.round() as i64));
		}
	}

	ScoredMatch { score: total, details: details.join(",") }
}

#[cfg(test)]
mod tests {
	use super::*;

	fn weights() -> ScoringWeightsConfig {
		ScoringWeightsConfig {
			company_name: 40.0,
			website: 40.0,
			phone: 30.0,
			street: 10.0,
			postal_code: 15.0,
			city: 5.0,
			primary_lob: 10.0,
		}
	}

	fn penalties() -> ScoringPenaltiesConfig {
		ScoringPenaltiesConfig { location_mismatch_penalty: 20.0, conflicting_website_penalty: 10.0 }
	}

	#[test]
	fn exact_matches_on_all_signals_accumulate() {
		let mut query = Row::new();
		query.set("normalizedwebsite", "acme.com");
		query.set("normalizedphone", "5125550100");
		query.set("normalizedpostal", "78701");

		let mut candidate = Row::new();
		candidate.set("normalizedwebsite", "acme.com");
		candidate.set("normalizedphone", "5125550100");
		candidate.set("normalizedpostal", "78701");

		let result = score(&query, &candidate, &weights(), &penalties());
		assert_eq!(result.score, 40.0 + 30.0 + 15.0);
		assert!(result.details.contains("Website(40)"));
		assert!(result.details.contains("Postal(15)"));
	}

	#[test]
	fn state_mismatch_applies_penalty_and_detail() {
		let mut query = Row::new();
		query.set("state", "ca");
		let mut candidate = Row::new();
		candidate.set("state", "tx");

		let result = score(&query, &candidate, &weights(), &penalties());
		assert_eq!(result.score, -20.0);
		assert!(result.details.contains("StateMismatch(-20)"));
	}

	#[test]
	fn below_floor_contributions_are_silently_dropped() {
		let mut query = Row::new();
		query.set("normalizedcompany", "a");
		let mut candidate = Row::new();
		candidate.set("normalizedcompany", "b");

		let result = score(&query, &candidate, &weights(), &penalties());
		assert_eq!(result.score, 0.0);
		assert!(result.details.is_empty());
	}
}
