//! End-to-end CLI coverage: `account` and `contact` subcommands driven
//! against small CSV fixtures, verifying the full load -> normalize ->
//! match -> write round trip and the conservation property that every
//! input row appears in exactly one of `{_OUTPUT, _MANUAL_REVIEW}`.

use std::fs;
use std::io::Write;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;

#[test]
fn prints_usage_without_a_subcommand() {
	let bin = assert_cmd::cargo::cargo_bin!("reclink");
	let mut cmd = Command::new(bin);
	cmd.assert()
		.failure()
		.stderr(predicate::str::contains("Usage:").or(predicate::str::contains("Commands:")));
}

fn write_config(dir: &std::path::Path, input_dir: &std::path::Path, output_dir: &std::path::Path, accounts: &std::path::Path, contacts: &std::path::Path) -> std::path::PathBuf {
	let config_path = dir.join("config.toml");
	let mut f = fs::File::create(&config_path).unwrap();
	writeln!(
		f,
		r#"
[paths]
input_directory = "{input}"
output_directory = "{output}"
account_list_path = "{accounts}"
contact_list_path = "{contacts}"

[fuzzy_matching_thresholds]
minimum_final_score = 50.0
minimum_contact_score = 5.0

[scoring_weights]
company_name = 40.0
website = 40.0
phone = 30.0
street = 10.0
postal_code = 15.0
city = 5.0
primary_lob = 10.0

[scoring_penalties]
location_mismatch_penalty = 20.0
conflicting_website_penalty = 10.0

[scoring_contact]
email = 50.0
first_name = 10.0
last_name = 10.0
title = 5.0
"#,
		input = input_dir.display(),
		output = output_dir.display(),
		accounts = accounts.display(),
		contacts = contacts.display(),
	)
	.unwrap();
	config_path
}

#[test]
fn account_then_contact_pipeline_round_trip() {
	let dir = tempfile::tempdir().unwrap();
	let input_dir = dir.path().join("in");
	let output_dir = dir.path().join("out");
	fs::create_dir_all(&input_dir).unwrap();

	let accounts_path = dir.path().join("accounts.csv");
	fs::write(
		&accounts_path,
		"id,name,billingstreet,billingcity,billingstate,billingpostalcode,billingcountry,website,primary_line_of_business__c,owner.name,ownerid,account_status__c,total_open_opps__c,ccn__c,dhcsf__dhcsf_definitive_id__c\n\
		 A001,Acme Incorporated,123 Main St,Austin,TX,78701,US,https://www.acme.com,Acute Care,Pat Owner,O1,Active,3,12345,DHC00001\n\
		 A002,Unrelated Business,9 Other Rd,Denver,CO,80202,US,unrelated.example,Senior Living,Sam Owner,O2,Active,1,54321,DHC00002\n",
	)
	.unwrap();

	let contacts_path = dir.path().join("contacts.csv");
	fs::write(
		&contacts_path,
		"id,accountid,email,firstname,lastname,title,phone\n\
		 C1,A001,info@acme.com,Jane,Doe,Director of Operations,5125550100\n",
	)
	.unwrap();

	let input_path = input_dir.join("batch.csv");
	fs::write(
		&input_path,
		"company,street,city,state,postal,country,website,email\n\
		 Acme LLC,123 Main St,Austin,TX,78701,US,acme.com,info@acme.com\n\
		 Zzzqx Nonmatching Co,1 Nowhere Ave,Fargo,ND,99999,US,,\n",
	)
	.unwrap();

	let config_path = write_config(dir.path(), &input_dir, &output_dir, &accounts_path, &contacts_path);

	let bin = assert_cmd::cargo::cargo_bin!("reclink");
	let mut account_cmd = Command::new(bin);
	account_cmd.arg("-c").arg(&config_path).arg("account").arg("batch");
	account_cmd.assert().success();

	let output_csv = fs::read_to_string(output_dir.join("batch_OUTPUT.csv")).unwrap();
	let manual_review_csv = fs::read_to_string(output_dir.join("batch_MANUAL_REVIEW.csv")).unwrap();

	assert!(output_csv.contains("A001"), "expected the email-pivot match to reach OUTPUT: {output_csv}");
	assert_eq!(manual_review_csv.lines().count(), 2, "header + one unmatched row: {manual_review_csv}");

	let bin = assert_cmd::cargo::cargo_bin!("reclink");
	let mut contact_cmd = Command::new(bin);
	contact_cmd.arg("-c").arg(&config_path).arg("contact").arg("batch");
	contact_cmd.assert().success();

	let contact_output = fs::read_to_string(output_dir.join("batch_C_OUTPUT.csv")).unwrap();
	assert!(contact_output.contains("Jane"), "expected contact pass to surface Jane Doe: {contact_output}");
	assert!(contact_output.contains("C1"));
}

#[test]
fn account_pipeline_renames_raw_input_headers_before_matching() {
	let dir = tempfile::tempdir().unwrap();
	let input_dir = dir.path().join("in");
	let output_dir = dir.path().join("out");
	fs::create_dir_all(&input_dir).unwrap();

	let accounts_path = dir.path().join("accounts.csv");
	fs::write(
		&accounts_path,
		"id,name,billingstreet,billingcity,billingstate,billingpostalcode,billingcountry,website,primary_line_of_business__c,owner.name,ownerid,account_status__c,total_open_opps__c,ccn__c,dhcsf__dhcsf_definitive_id__c\n\
		 A001,Acme Incorporated,123 Main St,Austin,TX,78701,US,https://www.acme.com,Acute Care,Pat Owner,O1,Active,3,12345,DHC00001\n",
	)
	.unwrap();

	let contacts_path = dir.path().join("contacts.csv");
	fs::write(&contacts_path, "id,accountid,email\nC1,A001,info@acme.com\n").unwrap();

	// Header uses the raw export spelling ("company name", "website domain")
	// rather than the already-renamed internal vocabulary, to exercise
	// INPUT_RENAMES rather than a fixture that happens to need no renaming.
	let input_path = input_dir.join("batch.csv");
	fs::write(
		&input_path,
		"company name,street,city,state,postal,country,website domain,email\n\
		 Acme LLC,123 Main St,Austin,TX,78701,US,acme.com,info@acme.com\n",
	)
	.unwrap();

	let config_path = write_config(dir.path(), &input_dir, &output_dir, &accounts_path, &contacts_path);

	let bin = assert_cmd::cargo::cargo_bin!("reclink");
	let mut cmd = Command::new(bin);
	cmd.arg("-c").arg(&config_path).arg("account").arg("batch");
	cmd.assert().success();

	let output_csv = fs::read_to_string(output_dir.join("batch_OUTPUT.csv")).unwrap();
	assert!(output_csv.contains("A001"), "expected the renamed 'company name' column to drive a real match: {output_csv}");
}

#[test]
fn account_command_fails_fast_on_missing_input_file() {
	let dir = tempfile::tempdir().unwrap();
	let input_dir = dir.path().join("in");
	let output_dir = dir.path().join("out");
	fs::create_dir_all(&input_dir).unwrap();

	let accounts_path = dir.path().join("accounts.csv");
	fs::write(&accounts_path, "id,name\nA001,Acme\n").unwrap();
	let contacts_path = dir.path().join("contacts.csv");
	fs::write(&contacts_path, "id,accountid,email\nC1,A001,info@acme.com\n").unwrap();

	let config_path = write_config(dir.path(), &input_dir, &output_dir, &accounts_path, &contacts_path);

	let bin = assert_cmd::cargo::cargo_bin!("reclink");
	let mut cmd = Command::new(bin);
	cmd.arg("-c").arg(&config_path).arg("account").arg("does_not_exist");
	cmd.assert().failure();
}
