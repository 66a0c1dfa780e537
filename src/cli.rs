//! Command-line interface for the matching engine: two subcommands,
//! `account <stem>` and `contact <stem>`, each taking a filename stem with
//! no extension, since the concrete extension is resolved later against
//! whichever tabular format is actually present in `input_directory`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// reclink: batch record-linkage against an authoritative account/contact
/// reference.
#[derive(Parser, Debug)]
#[command(name = "reclink")]
#[command(about = "Match business records against an authoritative account/contact reference", long_about = None)]
pub struct Cli {
	#[command(subcommand)]
	pub command: Commands,

	/// Configuration file path (overrides the default search cascade)
	#[arg(short, long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Verbosity level (repeat for more verbose: -v, -vv)
	#[arg(short, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Run the account resolution pipeline over an input file stem
	Account(AccountArgs),
	/// Run the contact resolution pass over a previously matched output
	Contact(ContactArgs),
}

/// Arguments for the `account` subcommand.
#[derive(Parser, Debug)]
pub struct AccountArgs {
	/// Input file stem (no extension), resolved under `Paths.input_directory`
	pub stem: String,
}

/// Arguments for the `contact` subcommand.
#[derive(Parser, Debug)]
pub struct ContactArgs {
	/// Stem shared with a prior `account` run, used to locate `<stem>_OUTPUT`
	pub stem: String,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_account_subcommand_with_stem() {
		let cli = Cli::try_parse_from(["reclink", "account", "acme_batch"]).unwrap();
		match cli.command {
			Commands::Account(args) => assert_eq!(args.stem, "acme_batch"),
			_ => panic!("expected Account subcommand"),
		}
	}

	#[test]
	fn parses_contact_subcommand_with_verbosity() {
		let cli = Cli::try_parse_from(["reclink", "-vv", "contact", "acme_batch"]).unwrap();
		assert_eq!(cli.verbose, 2);
		match cli.command {
			Commands::Contact(args) => assert_eq!(args.stem, "acme_batch"),
			_ => panic!("expected Contact subcommand"),
		}
	}
}
