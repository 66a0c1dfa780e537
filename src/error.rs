//! Top-level error taxonomy. Setup-time failures (configuration, schema, I/O
//! on the three input streams or the final writes) abort the process; the
//! hot matching loop never returns an error per row — a malformed row
//! simply normalizes to empty fields and scores low, since one bad row in
//! a multi-thousand-row batch shouldn't abort the whole run.

use thiserror::Error;

use crate::{configuration::ConfigurationError, rowio::RowIoError};

#[derive(Debug, Error)]
pub enum RunError {
	#[error("configuration error: {0}")]
	Configuration(#[from] ConfigurationError),

	#[error("row I/O error: {0}")]
	RowIo(#[from] RowIoError),

	#[error("schema error in {file}: missing required column(s) {missing:?}")]
	Schema { file: String, missing: Vec<String> },
}
