//! Batch record-linkage engine: matches business records against an
//! authoritative account/contact reference with weighted multi-signal
//! scoring.
//!
//! The library exposes each pipeline stage as an independent module so the
//! matching core can be exercised in isolation from the CLI/config/I-O
//! shell that `run()` wires together.

pub mod account_pipeline;
pub mod blocker;
pub mod cache;
pub mod cli;
pub mod configuration;
pub mod contact_pipeline;
pub mod error;
pub mod fuzzy;
pub mod normalize;
pub mod row;
pub mod rowio;
pub mod schema;
pub mod scorer;
pub mod tfidf;

use std::path::PathBuf;

use clap::Parser;
use tracing::{info, warn};

use cli::{Cli, Commands};
use configuration::Configuration;
use error::RunError;
use row::Row;

/// Parse CLI arguments, initialize logging, load configuration, and
/// dispatch to the requested subcommand. The single entry point `main`
/// calls into.
pub fn run() -> Result<(), RunError> {
	let cli = Cli::parse();
	init_logging(cli.verbose);

	let configuration = Configuration::load(cli.config.as_deref())?;

	match cli.command {
		Commands::Account(args) => run_account(&configuration, &args.stem),
		Commands::Contact(args) => run_contact(&configuration, &args.stem),
	}
}

fn init_logging(verbosity: u8) {
	let default_level = match verbosity {
		0 => "info",
		1 => "debug",
		_ => "trace",
	};
	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
	tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_and_prepare(
	configuration: &Configuration,
	stem: &str,
) -> Result<(Vec<Row>, Vec<Row>, Vec<Row>), RunError> {
	let input_path = find_input_file(&configuration.paths.input_directory, stem)?;

	let mut input = rowio::load_rows(&input_path)?;
	let mut accounts = rowio::load_rows(&configuration.paths.account_list_path)?;
	let mut contacts = rowio::load_rows(&configuration.paths.contact_list_path)?;

	schema::apply_first_available_renames(&mut input, schema::INPUT_RENAMES);
	schema::apply_renames(&mut accounts, schema::ACCOUNT_RENAMES);
	schema::apply_renames(&mut contacts, schema::CONTACT_RENAMES);

	check_schema(&input_path.display().to_string(), input.iter(), schema::INPUT_REQUIRED_COLUMNS)?;
	check_schema(
		&configuration.paths.account_list_path.display().to_string(),
		accounts.iter(),
		schema::ACCOUNT_REQUIRED_COLUMNS,
	)?;
	check_schema(
		&configuration.paths.contact_list_path.display().to_string(),
		contacts.iter(),
		schema::CONTACT_REQUIRED_COLUMNS,
	)?;

	for row in input.iter_mut() {
		normalize::apply_projections(row);
	}
	for row in accounts.iter_mut() {
		normalize::apply_projections(row);
	}
	for row in contacts.iter_mut() {
		normalize::apply_projections(row);
	}

	account_pipeline::assign_original_indexes(&mut input);

	Ok((input, accounts, contacts))
}

fn check_schema<'a>(
	file: &str,
	rows: impl Iterator<Item = &'a Row>,
	required: &[&str],
) -> Result<(), RunError> {
	let mut rows = rows.peekable();
	let Some(first) = rows.peek() else { return Ok(()) };
	let missing = rowio::missing_required_columns(first.columns(), required);
	if missing.is_empty() {
		Ok(())
	} else {
		Err(RunError::Schema { file: file.to_string(), missing })
	}
}

/// Locate the stem's input file in `input_directory`, trying the common
/// tabular extensions in turn since callers only provide a bare stem and
/// the export format (CSV/TSV/PSV) varies by source system.
fn find_input_file(input_directory: &std::path::Path, stem: &str) -> Result<PathBuf, RunError> {
	for extension in ["csv", "tsv", "psv"] {
		let candidate = input_directory.join(format!("{stem}.{extension}"));
		if candidate.exists() {
			return Ok(candidate);
		}
	}
	Err(RunError::RowIo(rowio::RowIoError::Open(
		format!("{stem}.(csv|tsv|psv)"),
		format!("no input file found in {}", input_directory.display()),
	)))
}

fn run_account(configuration: &Configuration, stem: &str) -> Result<(), RunError> {
	let (input, accounts, contacts) = load_and_prepare(configuration, stem)?;
	info!(stem, rows = input.len(), accounts = accounts.len(), contacts = contacts.len(), "starting account pipeline");

	let cache_dir = configuration.cache_dir();
	let (matched, manual_review) =
		account_pipeline::run(configuration, &input, &accounts, &contacts, &cache_dir);

	let output_path = configuration.paths.output_directory.join(format!("{stem}_OUTPUT.csv"));
	let manual_review_path = configuration.paths.output_directory.join(format!("{stem}_MANUAL_REVIEW.csv"));

	rowio::save_rows(&matched, &output_path)?;
	rowio::save_rows(&manual_review, &manual_review_path)?;

	info!(
		matched = matched.len(),
		manual_review = manual_review.len(),
		output = %output_path.display(),
		"account pipeline complete"
	);
	Ok(())
}

fn run_contact(configuration: &Configuration, stem: &str) -> Result<(), RunError> {
	let output_path = configuration.paths.output_directory.join(format!("{stem}_OUTPUT.csv"));
	let mut account_output = rowio::load_rows(&output_path)?;
	let mut contacts = rowio::load_rows(&configuration.paths.contact_list_path)?;

	schema::apply_renames(&mut contacts, schema::CONTACT_RENAMES);
	check_schema(
		&configuration.paths.contact_list_path.display().to_string(),
		contacts.iter(),
		schema::CONTACT_REQUIRED_COLUMNS,
	)?;

	for row in account_output.iter_mut() {
		if !row.has("matched_accountid") {
			warn!("account output row missing matched_accountid; treated as unmatched for the contact pass");
		}
	}

	let results = contact_pipeline::run(configuration, &account_output, &contacts);

	let contact_output_path = configuration.paths.output_directory.join(format!("{stem}_C_OUTPUT.csv"));
	rowio::save_rows(&results, &contact_output_path)?;

	info!(rows = results.len(), output = %contact_output_path.display(), "contact pipeline complete");
	Ok(())
}
