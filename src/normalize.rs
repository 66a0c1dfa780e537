//! Deterministic field normalization. Every function here is total and
//! infallible: malformed input normalizes to the empty string rather than
//! erroring, because a normalization failure must never abort a batch run
//! — a single bad row just scores low and falls to manual review.
//!
//! The base text fold (NFKC + full Unicode case folding) stands in for
//! "lowercase" everywhere below, since full case folding is a strict
//! superset of ASCII lowercasing and handles the accented and
//! multi-script company/contact names these exports actually contain.

use std::sync::LazyLock;

use icu_casemap::CaseMapperBorrowed;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static CASE_MAPPER: CaseMapperBorrowed<'static> = CaseMapperBorrowed::new();

const NULL_SENTINELS: [&str; 6] = ["nan", "none", "null", "n/a", "na", "-"];

/// Trim, fold to NFKC, case-fold, and collapse interior whitespace.
fn fold(input: &str) -> String {
	let s = input.trim();
	let nfkc: String = s.nfkc().collect();
	let folded = CASE_MAPPER.fold_string(&nfkc);

	let mut out = String::with_capacity(folded.len());
	let mut last_was_space = false;
	for ch in folded.chars() {
		if ch.is_whitespace() {
			if !last_was_space {
				out.push(' ');
				last_was_space = true;
			}
		} else {
			out.push(ch);
			last_was_space = false;
		}
	}
	out.trim().to_string()
}

fn is_null_sentinel(s: &str) -> bool {
	NULL_SENTINELS.contains(&s)
}

fn coerce_null(folded: String) -> String {
	if is_null_sentinel(&folded) { String::new() } else { folded }
}

/// Generic text normalization used for free-text columns (line of
/// business, city): fold, then coerce known null sentinels to the empty
/// string.
pub fn normalize_text(input: &str) -> String {
	coerce_null(fold(input))
}

pub fn normalize_lob(input: &str) -> String {
	normalize_text(input)
}

pub fn normalize_city(input: &str) -> String {
	normalize_text(input)
}

/// Strip everything except Unicode word characters and spaces, mirroring
/// Python's Unicode-aware `\w` (`s.str.replace(r'[^\w\s]', '', regex=True)`
/// in `original_source`) rather than an ASCII-only character class — an
/// ASCII regex would also strip accented letters that `fold`'s case-fold
/// leaves intact.
fn strip_non_word(s: &str) -> String {
	s.chars().filter(|c| c.is_alphanumeric() || *c == ' ').collect()
}

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static GEOGRAPHIC_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" - .*$").unwrap());
static CORPORATE_SUFFIX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\b(llc|inc|corp|ltd|lp|co)\b").unwrap());

/// Company name normalization, applied in the exact order: lowercase,
/// strip a trailing `" - <anything>"` geographic suffix, strip
/// punctuation, remove whole-word corporate suffixes, collapse whitespace,
/// trim, then remove all remaining spaces. The result is a single
/// unbroken token — that's deliberate, not a bug, and downstream
/// `facility_stripped` word-removal only bites at the very ends of it as
/// a consequence.
pub fn normalize_company(input: &str) -> String {
	let folded = fold(input);
	let no_geo = GEOGRAPHIC_SUFFIX.replace(&folded, "");
	let alnum = strip_non_word(&no_geo);
	let no_suffix = CORPORATE_SUFFIX.replace_all(&alnum, "");
	let collapsed = WHITESPACE.replace_all(no_suffix.trim(), " ");
	collapsed.replace(' ', "")
}

static SCHEME_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z]+://").unwrap());

/// Website normalization: lowercase/trim, coerce null-likes to "", strip
/// scheme and leading `www.`, truncate at the first `/` or `?`.
pub fn normalize_website(input: &str) -> String {
	let folded = coerce_null(fold(input));
	if folded.is_empty() {
		return String::new();
	}
	let no_scheme = SCHEME_PREFIX.replace(&folded, "");
	let truncated = no_scheme.split(['/', '?']).next().unwrap_or("");
	truncated.strip_prefix("www.").unwrap_or(truncated).to_string()
}

/// Public suffixes requiring three labels to form the registrable domain.
const TWO_LABEL_SUFFIXES: [&str; 6] = ["co.uk", "org.uk", "ac.uk", "com.au", "net.au", "co.jp"];

/// Registrable domain derived from the normalized website value: split on
/// `.`; two or fewer labels pass through unchanged; otherwise join the
/// last two labels, except for the listed two-label public suffixes with
/// at least three labels present, where the last three are joined.
pub fn normalize_domain(input: &str) -> String {
	let host = normalize_website(input);
	if host.is_empty() {
		return String::new();
	}

	let labels: Vec<&str> = host.split('.').collect();
	if labels.len() <= 2 {
		return host;
	}

	let last_two = format!("{}.{}", labels[labels.len() - 2], labels[labels.len() - 1]);
	if TWO_LABEL_SUFFIXES.contains(&last_two.as_str()) && labels.len() >= 3 {
		format!("{}.{}", labels[labels.len() - 3], last_two)
	} else {
		last_two
	}
}

/// Digits-only phone normalization: concatenate every ASCII digit in
/// order. No country-code stripping — deliberately literal.
pub fn normalize_phone(input: &str) -> String {
	input.chars().filter(|c| c.is_ascii_digit()).collect()
}

static UNIT_SUFFIX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\s(#|apt|suite|ste)\s?\w*").unwrap());

/// Street normalization: lowercase, null-like -> "", truncate at the
/// first unit/suite marker, strip punctuation, remove all whitespace.
pub fn normalize_street(input: &str) -> String {
	let folded = coerce_null(fold(input));
	if folded.is_empty() {
		return String::new();
	}
	let truncated = match UNIT_SUFFIX.find(&folded) {
		Some(m) => &folded[..m.start()],
		None => &folded,
	};
	let alnum = strip_non_word(truncated);
	alnum.replace(' ', "")
}

/// First 5 digits of the input once all digits are concatenated; empty if
/// fewer than 5 digits are present (the source's zero-padding beyond 5 is
/// dead code given the length precondition).
pub fn normalize_postal(input: &str) -> String {
	let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();
	if digits.len() >= 5 { digits[..5].to_string() } else { String::new() }
}

const US_STATE_CODES: [&str; 51] = [
	"al", "ak", "az", "ar", "ca", "co", "ct", "de", "fl", "ga", "hi", "id", "il", "in", "ia", "ks",
	"ky", "la", "me", "md", "ma", "mi", "mn", "ms", "mo", "mt", "ne", "nv", "nh", "nj", "nm", "ny",
	"nc", "nd", "oh", "ok", "or", "pa", "ri", "sc", "sd", "tn", "tx", "ut", "vt", "va", "wa", "wv",
	"wi", "wy", "dc",
];

/// US state lookup: a known two-letter code passes through unchanged; a
/// recognized full state name maps to its code; anything else passes
/// through lowercased/trimmed (best-effort).
pub fn normalize_state(input: &str) -> String {
	let folded = fold(input);
	if US_STATE_CODES.contains(&folded.as_str()) {
		return folded;
	}
	us_state_code(&folded).map(str::to_string).unwrap_or(folded)
}

fn us_state_code(name: &str) -> Option<&'static str> {
	Some(match name {
		"alabama" => "al",
		"alaska" => "ak",
		"arizona" => "az",
		"arkansas" => "ar",
		"california" => "ca",
		"colorado" => "co",
		"connecticut" => "ct",
		"delaware" => "de",
		"florida" => "fl",
		"georgia" => "ga",
		"hawaii" => "hi",
		"idaho" => "id",
		"illinois" => "il",
		"indiana" => "in",
		"iowa" => "ia",
		"kansas" => "ks",
		"kentucky" => "ky",
		"louisiana" => "la",
		"maine" => "me",
		"maryland" => "md",
		"massachusetts" => "ma",
		"michigan" => "mi",
		"minnesota" => "mn",
		"mississippi" => "ms",
		"missouri" => "mo",
		"montana" => "mt",
		"nebraska" => "ne",
		"nevada" => "nv",
		"new hampshire" => "nh",
		"new jersey" => "nj",
		"new mexico" => "nm",
		"new york" => "ny",
		"north carolina" => "nc",
		"north dakota" => "nd",
		"ohio" => "oh",
		"oklahoma" => "ok",
		"oregon" => "or",
		"pennsylvania" => "pa",
		"rhode island" => "ri",
		"south carolina" => "sc",
		"south dakota" => "sd",
		"tennessee" => "tn",
		"texas" => "tx",
		"utah" => "ut",
		"vermont" => "vt",
		"virginia" => "va",
		"washington" => "wa",
		"west virginia" => "wv",
		"wisconsin" => "wi",
		"wyoming" => "wy",
		"district of columbia" => "dc",
		_ => return None,
	})
}

/// Country lookup against the fixed mapping: US/USA variants -> `us`,
/// Canada/CA -> `ca`, UK/Great Britain -> `gb`, Australia/AU -> `au`;
/// anything else passes through lowercased/trimmed.
pub fn normalize_country(input: &str) -> String {
	let folded = fold(input);
	match folded.as_str() {
		"united states" | "usa" | "us" => "us".to_string(),
		"canada" | "ca" => "ca".to_string(),
		"united kingdom" | "uk" | "great britain" => "gb".to_string(),
		"australia" | "au" => "au".to_string(),
		_ => folded,
	}
}

/// CCN identifier: digits only, valid only at length 5 or 6. Invalid
/// values normalize to the empty string so they can never spuriously
/// match.
pub fn normalize_ccn(input: &str) -> String {
	let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();
	if digits.len() == 5 || digits.len() == 6 { digits } else { String::new() }
}

/// DHC identifier: lowercase/trim, valid only at length >= 5.
pub fn normalize_dhc(input: &str) -> String {
	let folded = input.trim().to_lowercase();
	if folded.len() >= 5 { folded } else { String::new() }
}

/// Add every normalized projection to `row` in place, reading from
/// whichever raw columns are present. Safe to call on input, account, or
/// contact rows alike — missing raw columns simply yield empty projections.
pub fn apply_projections(row: &mut crate::row::Row) {
	row.set("normalizedcompany", normalize_company(&row.get_str("company")));
	row.set("normalizedwebsite", normalize_website(&row.get_str("website")));
	row.set("normalizeddomain", normalize_domain(&row.get_str("website")));
	row.set("normalizedphone", normalize_phone(&row.get_str("phone")));
	row.set("normalizedstreet", normalize_street(&row.get_str("street")));
	row.set("normalizedpostal", normalize_postal(&row.get_str("postal")));
	row.set("state", normalize_state(&row.get_str("state")));
	row.set("country", normalize_country(&row.get_str("country")));
	row.set("normalized_lob", normalize_lob(&row.get_str("lob")));
	row.set("city", normalize_city(&row.get_str("city")));
	row.set("normalizedccn", normalize_ccn(&row.get_str("ccn")));
	row.set("normalizeddhc", normalize_dhc(&row.get_str("dhc")));
}
