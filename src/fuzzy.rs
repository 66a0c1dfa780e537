//! Fuzzy string similarity producing the same integer scores as Python's
//! `thefuzz` library, so that scoring thresholds tuned against that
//! library carry over unchanged. No available crate reproduces
//! `thefuzz`'s exact `ratio`/`token_set_ratio` semantics (the closest
//! candidate, `strsim`, is a different algorithm family), so this module
//! hand-rolls them against the matching-blocks/indel algorithm `thefuzz`
//! itself uses (`difflib.SequenceMatcher.ratio`, `2*M/T`), not
//! substitution-cost Levenshtein; behavior is only guaranteed to match on
//! ASCII input.

/// Length of the longest common subsequence of two `char` slices; the `M`
/// term in `difflib`'s `2*M/T` ratio formula.
fn longest_common_subsequence(a: &[char], b: &[char]) -> usize {
	let (m, n) = (a.len(), b.len());
	if m == 0 || n == 0 {
		return 0;
	}

	let mut prev = vec![0usize; n + 1];
	let mut curr = vec![0usize; n + 1];

	for &ca in a {
		for (j, &cb) in b.iter().enumerate() {
			curr[j + 1] = if ca == cb { prev[j] + 1 } else { prev[j + 1].max(curr[j]) };
		}
		std::mem::swap(&mut prev, &mut curr);
	}

	prev[n]
}

/// `thefuzz.fuzz.ratio` equivalent: `round(100 * 2 * M / (len_a + len_b))`
/// where `M` is the length of the longest common subsequence, matching
/// `difflib.SequenceMatcher.ratio`'s matching-blocks semantics rather than
/// plain substitution-cost edit distance.
pub fn ratio(a: &str, b: &str) -> u8 {
	let ca: Vec<char> = a.chars().collect();
	let cb: Vec<char> = b.chars().collect();

	let total = ca.len() + cb.len();
	if total == 0 {
		return 100;
	}

	let matches = longest_common_subsequence(&ca, &cb);
	let score = 100.0 * (2.0 * matches as f64) / (total as f64);
	score.round().clamp(0.0, 100.0) as u8
}

fn tokenize_sorted_unique(s: &str) -> Vec<&str> {
	let mut tokens: Vec<&str> = s.split_whitespace().collect();
	tokens.sort_unstable();
	tokens.dedup();
	tokens
}

/// `thefuzz.fuzz.token_set_ratio` equivalent: tokenize both strings,
/// compute the intersection and each side's unique remainder, then take
/// the best `ratio` among the three pairwise string reconstructions
/// (intersection vs intersection+remainder, both directions).
pub fn token_set_ratio(a: &str, b: &str) -> u8 {
	let tokens_a = tokenize_sorted_unique(a);
	let tokens_b = tokenize_sorted_unique(b);

	let intersection: Vec<&str> = tokens_a
		.iter()
		.filter(|t| tokens_b.contains(t))
		.copied()
		.collect();
	let only_a: Vec<&str> = tokens_a
		.iter()
		.filter(|t| !intersection.contains(t))
		.copied()
		.collect();
	let only_b: Vec<&str> = tokens_b
		.iter()
		.filter(|t| !intersection.contains(t))
		.copied()
		.collect();

	let sorted_intersection = intersection.join(" ");
	let combined_a = if only_a.is_empty() {
		sorted_intersection.clone()
	} else {
		format!("{} {}", sorted_intersection, only_a.join(" ")).trim().to_string()
	};
	let combined_b = if only_b.is_empty() {
		sorted_intersection.clone()
	} else {
		format!("{} {}", sorted_intersection, only_b.join(" ")).trim().to_string()
	};

	ratio(&sorted_intersection, &combined_a)
		.max(ratio(&sorted_intersection, &combined_b))
		.max(ratio(&combined_a, &combined_b))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn ratio_is_100_for_identical_strings() {
		assert_eq!(ratio("acme corp", "acme corp"), 100);
	}

	#[test]
	fn ratio_is_0_for_fully_disjoint_strings_of_equal_length() {
		assert_eq!(ratio("aaaa", "bbbb"), 0);
	}

	#[test]
	fn ratio_handles_empty_strings() {
		assert_eq!(ratio("", ""), 100);
		assert_eq!(ratio("abc", ""), 0);
	}

	#[test]
	fn token_set_ratio_ignores_word_order_and_duplicates() {
		assert_eq!(token_set_ratio("acme corp inc", "inc corp acme"), 100);
	}

	#[test]
	fn token_set_ratio_rewards_shared_subset() {
		let score = token_set_ratio("acme corp of texas", "acme corp");
		assert!(score >= 90, "expected a high score, got {score}");
	}
}
