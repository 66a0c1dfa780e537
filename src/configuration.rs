//! Configuration loading for the matching engine.
//!
//! A flat key/value store with a `[paths]` section of required
//! directories, `[fuzzy_matching_thresholds]`, `[scoring_weights]`, and the
//! optional `[scoring_penalties]` / `[scoring_contact]` sections (each key
//! defaults to `0.0` when the section is absent, so a deployment that
//! doesn't care about location or website penalties can just omit them).
//! Loading cascades over several candidate locations: an explicit path is
//! required if given, otherwise `./config`, `/etc/<bin>/config`, and the
//! user config directory are probed in order, all `required(false)`, so
//! the same binary works whether it's run from a project checkout or
//! installed system-wide.
use std::path::{Path, PathBuf};

use config::File;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const APP_NAME: &str = "reclink";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
	pub input_directory: PathBuf,
	pub output_directory: PathBuf,
	pub account_list_path: PathBuf,
	pub contact_list_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuzzyMatchingThresholdsConfig {
	pub minimum_final_score: f64,
	pub minimum_contact_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringWeightsConfig {
	pub company_name: f64,
	pub website: f64,
	pub phone: f64,
	pub street: f64,
	pub postal_code: f64,
	pub city: f64,
	pub primary_lob: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringPenaltiesConfig {
	#[serde(default)]
	pub location_mismatch_penalty: f64,
	#[serde(default)]
	pub conflicting_website_penalty: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoringContactConfig {
	#[serde(default)]
	pub email: f64,
	#[serde(default)]
	pub first_name: f64,
	#[serde(default)]
	pub last_name: f64,
	#[serde(default)]
	pub title: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configuration {
	pub paths: PathsConfig,
	pub fuzzy_matching_thresholds: FuzzyMatchingThresholdsConfig,
	pub scoring_weights: ScoringWeightsConfig,
	#[serde(default = "default_penalties")]
	pub scoring_penalties: ScoringPenaltiesConfig,
	#[serde(default)]
	pub scoring_contact: ScoringContactConfig,
}

fn default_penalties() -> ScoringPenaltiesConfig {
	ScoringPenaltiesConfig {
		location_mismatch_penalty: 0.0,
		conflicting_website_penalty: 0.0,
	}
}

impl Configuration {
	/// Load configuration, resolving all four `[Paths]` entries to absolute
	/// paths and requiring each (except `output_directory`, which is created
	/// if missing) to exist.
	pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigurationError> {
		let builder = if let Some(path) = explicit_path {
			debug!("Loading configuration from user specified path: {:?}", path);
			config::Config::builder().add_source(
				File::with_name(
					path.to_str()
						.ok_or_else(|| ConfigurationError::InvalidPath(path.display().to_string()))?,
				)
				.required(true),
			)
		} else {
			let mut builder = config::Config::builder()
				.add_source(File::with_name("./config").required(false));

			builder = builder.add_source(
				File::with_name(&format!("/etc/{APP_NAME}/config")).required(false),
			);

			if let Some(dir) = dirs::config_dir() {
				let user_path = dir.join(APP_NAME).join("config");
				if let Some(user_path) = user_path.to_str() {
					builder = builder.add_source(File::with_name(user_path).required(false));
				}
			}

			builder
		};

		let raw = builder
			.build()
			.map_err(|e| ConfigurationError::Load(e.to_string()))?;
		let mut config: Configuration = raw
			.try_deserialize()
			.map_err(|e| ConfigurationError::Load(e.to_string()))?;

		config.resolve_and_validate_paths()?;
		Ok(config)
	}

	fn resolve_and_validate_paths(&mut self) -> Result<(), ConfigurationError> {
		self.paths.input_directory = absolute(&self.paths.input_directory)?;
		self.paths.account_list_path = absolute(&self.paths.account_list_path)?;
		self.paths.contact_list_path = absolute(&self.paths.contact_list_path)?;
		self.paths.output_directory = absolute(&self.paths.output_directory)?;

		for (path, label) in [
			(&self.paths.input_directory, "Paths.input_directory"),
			(&self.paths.account_list_path, "Paths.account_list_path"),
			(&self.paths.contact_list_path, "Paths.contact_list_path"),
		] {
			if !path.exists() {
				return Err(ConfigurationError::PathNotFound {
					label: label.to_string(),
					path: path.clone(),
				});
			}
		}

		std::fs::create_dir_all(&self.paths.output_directory)
			.map_err(|e| ConfigurationError::Io(self.paths.output_directory.clone(), e.to_string()))?;

		Ok(())
	}

	/// Content-addressed vectorizer cache directory, alongside outputs so
	/// it's cleaned up the same way a run's other scratch output would be.
	pub fn cache_dir(&self) -> PathBuf {
		self.paths.output_directory.join("_cache")
	}
}

fn absolute(path: &Path) -> Result<PathBuf, ConfigurationError> {
	let expanded = shellexpand_home(path);
	std::fs::canonicalize(&expanded).or_else(|_| {
		// The path may not exist yet (output_directory); fall back to a
		// lexical absolute form so validation can still report a useful path.
		if expanded.is_absolute() {
			Ok(expanded)
		} else {
			std::env::current_dir()
				.map(|cwd| cwd.join(&expanded))
				.map_err(|e| ConfigurationError::Io(expanded.clone(), e.to_string()))
		}
	})
}

fn shellexpand_home(path: &Path) -> PathBuf {
	if let Ok(stripped) = path.strip_prefix("~")
		&& let Some(home) = dirs::home_dir()
	{
		return home.join(stripped);
	}
	path.to_path_buf()
}

#[derive(Debug, Error)]
pub enum ConfigurationError {
	#[error("failed to load configuration: {0}")]
	Load(String),
	#[error("configuration path is not valid UTF-8: {0}")]
	InvalidPath(String),
	#[error("{label} does not exist: {path}", path = path.display())]
	PathNotFound { label: String, path: PathBuf },
	#[error("I/O error resolving {0}: {1}", path.display())]
	Io(PathBuf, String),
}
