//! Column rename maps and required-column sets for the three input files
//! (input batch, account reference, contact reference). Renaming happens
//! once, right after load, so every downstream module works against a
//! single stable vocabulary regardless of the source export's column
//! names.

use crate::row::Row;

/// Salesforce account-export column names, mapped to the engine's internal
/// vocabulary.
pub const ACCOUNT_RENAMES: &[(&str, &str)] = &[
	("id", "account_id"),
	("name", "company"),
	("billingstreet", "street"),
	("billingcity", "city"),
	("billingstate", "state"),
	("billingpostalcode", "postal"),
	("billingcountry", "country"),
	("primary_line_of_business__c", "lob"),
	("owner.name", "owner_name"),
	("ownerid", "owner_id"),
	("account_status__c", "account_status"),
	("total_open_opps__c", "total_open_opps"),
	("ccn__c", "ccn"),
	("dhcsf__dhcsf_definitive_id__c", "dhc"),
];

pub const ACCOUNT_REQUIRED_COLUMNS: &[&str] = &["account_id", "company"];

pub const CONTACT_RENAMES: &[(&str, &str)] = &[("id", "contact_id"), ("accountid", "account_id")];

pub const CONTACT_REQUIRED_COLUMNS: &[&str] = &["account_id", "email"];

/// Raw input-batch header names, mapped onto the same internal vocabulary
/// the account/contact renames target. Export tools spell a handful of
/// these columns several different ways (CCN and DHC identifiers
/// especially), so several aliases are listed for the same destination;
/// apply this table with [`apply_first_available_renames`], not
/// [`apply_renames`], so the first alias present in a row wins instead of
/// the last one silently clobbering it.
pub const INPUT_RENAMES: &[(&str, &str)] = &[
	("company name", "company"),
	("street address", "street"),
	("postalcode", "postal"),
	("website domain", "website"),
	("primary lob", "lob"),
	("ccn", "ccn"),
	("cms certification number (ccn)", "ccn"),
	("cms certification number", "ccn"),
	("ccn number", "ccn"),
	("dhc", "dhc"),
	("definitive id", "dhc"),
	("dhc id", "dhc"),
];

pub const INPUT_REQUIRED_COLUMNS: &[&str] = &["company"];

/// Apply a rename table to every row in place.
pub fn apply_renames(rows: &mut [Row], renames: &[(&str, &str)]) {
	for row in rows.iter_mut() {
		for (from, to) in renames {
			row.rename(from, to);
		}
	}
}

/// Apply a rename table where several source columns can target the same
/// destination. Once a destination column has a value, later aliases for
/// it are left untouched rather than overwriting it, so the table's
/// ordering doubles as an alias-priority list.
pub fn apply_first_available_renames(rows: &mut [Row], renames: &[(&str, &str)]) {
	for row in rows.iter_mut() {
		for (from, to) in renames {
			if row.has(to) {
				continue;
			}
			row.rename(from, to);
		}
	}
}
