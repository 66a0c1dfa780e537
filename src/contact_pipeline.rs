//! Per-account contact resolution, run after the account pipeline. Reads
//! the account pipeline's own output, keeps the rows it actually matched,
//! and picks the best-scoring contact within each matched account.

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::configuration::{Configuration, ScoringContactConfig};
use crate::fuzzy::{ratio, token_set_ratio};
use crate::row::{Cell, Row};

/// Signals below this floor are dropped from the details string entirely,
/// mirroring the account scorer's `ACCOUNT_SCORE_FLOOR` but at a lower
/// cutoff, since contact-level fuzzy signals (first/last name, title)
/// naturally produce smaller weighted contributions than account-level
/// ones.
const CONTACT_SCORE_FLOOR: f64 = 0.1;

struct ScoredContact {
	score: f64,
	details: String,
}

fn score_contact(query: &Row, contact: &Row, weights: &ScoringContactConfig) -> ScoredContact {
	let mut total = 0.0;
	let mut details: Vec<String> = Vec::new();

	let email_a = query.get_str("email");
	let email_b = contact.get_str("email");
	if !email_a.is_empty() && !email_b.is_empty() && email_a == email_b {
		total += weights.email;
		details.push(format!("Email({})", weights.email.round() as i64));
	}

	let first_a = query.get_str("firstname");
	let first_b = contact.get_str("firstname");
	if !first_a.is_empty() && !first_b.is_empty() {
		let contribution = weights.first_name * (ratio(&first_a, &first_b) as f64) / 100.0;
		if contribution > CONTACT_SCORE_FLOOR {
			total += contribution;
			details.push(format!("FirstName({})", contribution.round() as i64));
		}
	}

	let last_a = query.get_str("lastname");
	let last_b = contact.get_str("lastname");
	if !last_a.is_empty() && !last_b.is_empty() {
		let contribution = weights.last_name * (ratio(&last_a, &last_b) as f64) / 100.0;
		if contribution > CONTACT_SCORE_FLOOR {
			total += contribution;
			details.push(format!("LastName({})", contribution.round() as i64));
		}
	}

	let title_a = query.get_str("title");
	let title_b = contact.get_str("title");
	if !title_a.is_empty() && !title_b.is_empty() {
		let contribution = weights.title * (token_set_ratio(&title_a, &title_b) as f64) / 100.0;
		if contribution > CONTACT_SCORE_FLOOR {
			total += contribution;
			details.push(format!("Title({})", contribution.round() as i64));
		}
	}

	ScoredContact { score: total, details: details.join(",") }
}

/// Run the contact pipeline over the account pipeline's output. Rows with
/// an empty `matched_accountid` are passed through untouched (no contact
/// columns added); rows whose best contact falls below
/// `minimum_contact_score` are likewise passed through untouched.
pub fn run(config: &Configuration, account_output: &[Row], contacts: &[Row]) -> Vec<Row> {
	let mut contacts_by_account: HashMap<String, Vec<&Row>> = HashMap::new();
	for contact in contacts {
		let account_id = contact.get_str("account_id");
		if account_id.is_empty() {
			continue;
		}
		contacts_by_account.entry(account_id).or_default().push(contact);
	}

	let minimum_contact_score = config.fuzzy_matching_thresholds.minimum_contact_score;
	let weights = &config.scoring_contact;

	let results: Vec<Row> = account_output
		.par_iter()
		.map(|row| {
			let account_id = row.get_str("matched_accountid");
			if account_id.is_empty() {
				return row.clone();
			}

			let Some(candidates) = contacts_by_account.get(&account_id) else {
				return row.clone();
			};

			let mut best: Option<(&Row, ScoredContact)> = None;
			for candidate in candidates {
				let scored = score_contact(row, candidate, weights);
				let better = match &best {
					Some((_, current_best)) => scored.score > current_best.score,
					None => true,
				};
				if better {
					best = Some((candidate, scored));
				}
			}

			let Some((contact, scored)) = best else { return row.clone() };
			if scored.score < minimum_contact_score {
				return row.clone();
			}

			let mut result = row.clone();
			result.set("Matched_ContactID", contact.get_str("contact_id"));
			result.set("Matched_FirstName", contact.get_str("firstname"));
			result.set("Matched_LastName", contact.get_str("lastname"));
			result.set("Matched_Title", contact.get_str("title"));
			result.set("Matched_Email", contact.get_str("email"));
			result.set("Matched_ContactPhone", contact.get_str("phone"));
			result.set("ContactMatchScore", Cell::Number(scored.score));
			result.set("ContactMatchType", scored.details);
			result
		})
		.collect();

	let matched = results.iter().filter(|r| r.has("Matched_ContactID")).count();
	info!(input_rows = account_output.len(), contact_matches = matched, "contact pipeline complete");
	debug!(accounts_with_contacts = contacts_by_account.len(), "contact pipeline grouped reference contacts");

	results
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::configuration::{FuzzyMatchingThresholdsConfig, PathsConfig, ScoringPenaltiesConfig, ScoringWeightsConfig};

	fn test_config(minimum_contact_score: f64, weights: ScoringContactConfig) -> Configuration {
		Configuration {
			paths: PathsConfig {
				input_directory: "/tmp".into(),
				output_directory: "/tmp".into(),
				account_list_path: "/tmp/accounts.csv".into(),
				contact_list_path: "/tmp/contacts.csv".into(),
			},
			fuzzy_matching_thresholds: FuzzyMatchingThresholdsConfig { minimum_final_score: 60.0, minimum_contact_score },
			scoring_weights: ScoringWeightsConfig {
				company_name: 40.0,
				website: 40.0,
				phone: 30.0,
				street: 10.0,
				postal_code: 15.0,
				city: 5.0,
				primary_lob: 10.0,
			},
			scoring_penalties: ScoringPenaltiesConfig { location_mismatch_penalty: 20.0, conflicting_website_penalty: 10.0 },
			scoring_contact: weights,
		}
	}

	fn contact(id: &str, account_id: &str, firstname: &str, lastname: &str, email: &str) -> Row {
		let mut row = Row::new();
		row.set("contact_id", id);
		row.set("account_id", account_id);
		row.set("firstname", firstname);
		row.set("lastname", lastname);
		row.set("email", email);
		row
	}

	#[test]
	fn matches_contact_on_exact_email_within_matched_account() {
		let mut row = Row::new();
		row.set("matched_accountid", "A001");
		row.set("email", "info@acme.com");
		let account_output = vec![row];

		let contacts = vec![contact("C1", "A001", "Jane", "Doe", "info@acme.com")];

		let weights = ScoringContactConfig { email: 50.0, first_name: 10.0, last_name: 10.0, title: 5.0 };
		let config = test_config(5.0, weights);

		let results = run(&config, &account_output, &contacts);
		assert_eq!(results[0].get_str("Matched_ContactID"), "C1");
		assert_eq!(results[0].get_str("Matched_FirstName"), "Jane");
		assert_eq!(results[0].get_str("ContactMatchScore"), "50");
		assert_eq!(results[0].get_str("ContactMatchType"), "Email(50)");
	}

	#[test]
	fn rows_without_a_matched_account_pass_through_unchanged() {
		let mut row = Row::new();
		row.set("company", "Acme");
		let account_output = vec![row.clone()];

		let weights = ScoringContactConfig { email: 50.0, first_name: 10.0, last_name: 10.0, title: 5.0 };
		let config = test_config(5.0, weights);

		let results = run(&config, &account_output, &[]);
		assert_eq!(results[0], row);
		assert!(!results[0].has("Matched_ContactID"));
	}

	#[test]
	fn below_threshold_contact_is_omitted() {
		let mut row = Row::new();
		row.set("matched_accountid", "A001");
		row.set("firstname", "Zzz");
		let account_output = vec![row];

		let contacts = vec![contact("C1", "A001", "Bob", "Smith", "")];

		let weights = ScoringContactConfig { email: 50.0, first_name: 10.0, last_name: 10.0, title: 5.0 };
		let config = test_config(5.0, weights);

		let results = run(&config, &account_output, &contacts);
		assert!(!results[0].has("Matched_ContactID"));
	}
}
