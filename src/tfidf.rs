//! Character n-gram TF-IDF vectorizer and cosine-similarity ranker over the
//! `search_string` projection, used to pre-rank a blocked candidate set
//! before the Scorer runs.

use std::collections::HashMap;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::row::Row;

const FACILITY_WORDS: [&str; 11] = [
	"hospital",
	"clinic",
	"center",
	"centre",
	"rehab",
	"rehabilitation",
	"care",
	"nursing",
	"facility",
	"facilities",
	"health",
	"healthcare",
];

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Remove whole-word occurrences of generic healthcare-facility terms so
/// that two unrelated facilities don't look similar purely because they
/// both say "hospital".
pub fn facility_stripped(input: &str) -> String {
	let facility_pattern: &Regex = {
		static PATTERN: LazyLock<Regex> = LazyLock::new(|| {
			let alternation = FACILITY_WORDS.join("|");
			Regex::new(&format!(r"\b(?:{alternation})\b")).unwrap()
		});
		&PATTERN
	};
	let stripped = facility_pattern.replace_all(input, "");
	WHITESPACE.replace_all(stripped.trim(), " ").to_string()
}

/// Build the reference `search_string` for a normalized account/input row:
/// `facility_stripped(normalizedcompany) + " " + normalizedwebsite + " " +
/// normalizedpostal`, trimmed.
pub fn search_string(row: &Row) -> String {
	let company = facility_stripped(&row.get_str("normalizedcompany"));
	let website = row.get_str("normalizedwebsite");
	let postal = row.get_str("normalizedpostal");
	format!("{company} {website} {postal}").trim().to_string()
}

/// Character n-grams (length 3 to 5 inclusive) within word boundaries: each
/// whitespace-delimited word is padded with a single boundary space on
/// each side, mirroring scikit-learn's `analyzer="char_wb"`.
fn char_wb_ngrams(text: &str) -> Vec<String> {
	let mut ngrams = Vec::new();
	for word in text.split_whitespace() {
		let padded: Vec<char> = format!(" {word} ").chars().collect();
		for n in 3..=5usize {
			if padded.len() < n {
				continue;
			}
			for start in 0..=(padded.len() - n) {
				ngrams.push(padded[start..start + n].iter().collect());
			}
		}
	}
	ngrams
}

pub type SparseVector = HashMap<usize, f64>;

#[derive(Clone, Serialize, Deserialize)]
pub struct Vectorizer {
	vocabulary: HashMap<String, usize>,
	idf: Vec<f64>,
}

impl Vectorizer {
	/// Fit vocabulary and IDF weights over a corpus of documents. With
	/// `min_df = 1` every observed n-gram is retained.
	pub fn fit(documents: &[String]) -> Self {
		let mut vocabulary: HashMap<String, usize> = HashMap::new();
		let mut document_frequency: Vec<usize> = Vec::new();

		for document in documents {
			let mut seen_in_doc: std::collections::HashSet<usize> = std::collections::HashSet::new();
			for gram in char_wb_ngrams(document) {
				let next_index = vocabulary.len();
				let index = *vocabulary.entry(gram).or_insert(next_index);
				if index == document_frequency.len() {
					document_frequency.push(0);
				}
				seen_in_doc.insert(index);
			}
			for index in seen_in_doc {
				document_frequency[index] += 1;
			}
		}

		let n = documents.len() as f64;
		let idf = document_frequency
			.iter()
			.map(|&df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
			.collect();

		Self { vocabulary, idf }
	}

	/// Vectorize `document` against this vectorizer's fitted vocabulary,
	/// L2-normalized so cosine similarity reduces to a dot product.
	/// N-grams absent from the fitted vocabulary are dropped, as is
	/// standard for out-of-vocabulary terms at transform time.
	pub fn transform(&self, document: &str) -> SparseVector {
		let mut counts: HashMap<usize, f64> = HashMap::new();
		for gram in char_wb_ngrams(document) {
			if let Some(&index) = self.vocabulary.get(&gram) {
				*counts.entry(index).or_insert(0.0) += 1.0;
			}
		}

		let mut weighted: SparseVector = counts
			.into_iter()
			.map(|(index, count)| (index, count * self.idf[index]))
			.collect();

		let norm: f64 = weighted.values().map(|v| v * v).sum::<f64>().sqrt();
		if norm > 0.0 {
			for value in weighted.values_mut() {
				*value /= norm;
			}
		}
		weighted
	}
}

pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f64 {
	let (smaller, larger) = if a.len() <= b.len() { (a, b) } else { (b, a) };
	smaller
		.iter()
		.filter_map(|(index, value)| larger.get(index).map(|other| value * other))
		.sum()
}

/// Rank candidate account positions by cosine similarity to `query`,
/// descending, returning at most the top 25. Ties are broken by ascending
/// position (stable, first-seen wins) for reproducible output.
pub fn rank_top_25(
	query: &SparseVector,
	candidate_positions: &[usize],
	account_vectors: &[SparseVector],
) -> Vec<(usize, f64)> {
	let mut scored: Vec<(usize, f64)> = candidate_positions
		.iter()
		.map(|&position| (position, cosine_similarity(query, &account_vectors[position])))
		.collect();

	scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap().then(a.0.cmp(&b.0)));
	scored.truncate(25);
	scored
}
