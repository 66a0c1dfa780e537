//! Property-based coverage of the Normalizer's idempotence invariant
//! (spec: `normalize(normalize(x)) == normalize(x)` for every rule),
//! run against arbitrary strings rather than hand-picked fixtures.

use proptest::prelude::*;
use reclink::normalize::{
	normalize_ccn, normalize_city, normalize_company, normalize_country, normalize_dhc,
	normalize_domain, normalize_lob, normalize_phone, normalize_postal, normalize_state,
	normalize_street, normalize_website,
};

proptest! {
	#[test]
	fn company_normalization_is_idempotent(s in any::<String>()) {
		let once = normalize_company(&s);
		let twice = normalize_company(&once);
		prop_assert_eq!(once, twice);
	}

	#[test]
	fn company_normalization_has_no_interior_spaces(s in any::<String>()) {
		let out = normalize_company(&s);
		prop_assert!(!out.contains(' '));
	}

	#[test]
	fn website_normalization_is_idempotent(s in any::<String>()) {
		let once = normalize_website(&s);
		let twice = normalize_website(&once);
		prop_assert_eq!(once, twice);
	}

	#[test]
	fn domain_normalization_is_idempotent(s in any::<String>()) {
		let once = normalize_domain(&s);
		let twice = normalize_domain(&once);
		prop_assert_eq!(once, twice);
	}

	#[test]
	fn phone_normalization_is_idempotent_and_digits_only(s in any::<String>()) {
		let once = normalize_phone(&s);
		let twice = normalize_phone(&once);
		prop_assert_eq!(&once, &twice);
		prop_assert!(once.chars().all(|c| c.is_ascii_digit()));
	}

	#[test]
	fn street_normalization_is_idempotent(s in any::<String>()) {
		let once = normalize_street(&s);
		let twice = normalize_street(&once);
		prop_assert_eq!(once, twice);
	}

	#[test]
	fn postal_normalization_is_idempotent_and_five_digits_or_empty(s in any::<String>()) {
		let once = normalize_postal(&s);
		let twice = normalize_postal(&once);
		prop_assert_eq!(&once, &twice);
		prop_assert!(once.is_empty() || once.len() == 5);
	}

	#[test]
	fn state_normalization_is_idempotent(s in any::<String>()) {
		let once = normalize_state(&s);
		let twice = normalize_state(&once);
		prop_assert_eq!(once, twice);
	}

	#[test]
	fn country_normalization_is_idempotent(s in any::<String>()) {
		let once = normalize_country(&s);
		let twice = normalize_country(&once);
		prop_assert_eq!(once, twice);
	}

	#[test]
	fn lob_and_city_normalization_are_idempotent(s in any::<String>()) {
		let once_lob = normalize_lob(&s);
		prop_assert_eq!(normalize_lob(&once_lob), once_lob.clone());

		let once_city = normalize_city(&s);
		prop_assert_eq!(normalize_city(&once_city), once_city);
	}

	#[test]
	fn ccn_normalization_is_idempotent_and_valid_length(s in any::<String>()) {
		let once = normalize_ccn(&s);
		let twice = normalize_ccn(&once);
		prop_assert_eq!(&once, &twice);
		prop_assert!(once.is_empty() || once.len() == 5 || once.len() == 6);
	}

	#[test]
	fn dhc_normalization_is_idempotent(s in any::<String>()) {
		let once = normalize_dhc(&s);
		let twice = normalize_dhc(&once);
		prop_assert_eq!(once, twice);
	}
}
