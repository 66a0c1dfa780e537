//! Content-addressed persistence of the fitted vectorizer and account
//! matrix. Keyed on `sha1` of the joined reference `search_string` column,
//! so the cache is a pure function of the reference data: deleting it and
//! rerunning always reproduces the same outputs. Every failure here is a
//! warning, never a fatal error — refitting the vectorizer is slow, not
//! impossible, so a corrupt or unreadable cache entry should degrade to a
//! cache miss rather than abort the run.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use tracing::warn;

use crate::tfidf::{SparseVector, Vectorizer};

#[derive(Serialize, Deserialize)]
struct CachedMatrix {
	vectorizer: Vectorizer,
	account_vectors: Vec<SparseVector>,
}

/// Cache key for a set of reference search strings: `sha1` of the strings
/// joined with `|`.
pub fn cache_key(search_strings: &[String]) -> String {
	let joined = search_strings.join("|");
	let mut hasher = Sha1::new();
	hasher.update(joined.as_bytes());
	hex::encode(hasher.finalize())
}

fn cache_path(cache_dir: &Path, key: &str) -> std::path::PathBuf {
	cache_dir.join(format!("{key}.json"))
}

/// Best-effort cache load. Any failure (missing file, corrupt JSON, stale
/// schema) is logged and treated as a cache miss, never propagated.
pub fn load(cache_dir: &Path, key: &str) -> Option<(Vectorizer, Vec<SparseVector>)> {
	let path = cache_path(cache_dir, key);
	let bytes = match std::fs::read(&path) {
		Ok(bytes) => bytes,
		Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
		Err(e) => {
			warn!(cache_path = %path.display(), error = %e, "failed to read vectorizer cache");
			return None;
		}
	};

	match serde_json::from_slice::<CachedMatrix>(&bytes) {
		Ok(cached) => Some((cached.vectorizer, cached.account_vectors)),
		Err(e) => {
			warn!(cache_path = %path.display(), error = %e, "vectorizer cache is corrupt; rebuilding");
			None
		}
	}
}

/// Best-effort cache save. Write failures are logged and otherwise
/// ignored; a missed save just means the next run rebuilds the vectorizer.
pub fn save(cache_dir: &Path, key: &str, vectorizer: &Vectorizer, account_vectors: &[SparseVector]) {
	if let Err(e) = std::fs::create_dir_all(cache_dir) {
		warn!(cache_dir = %cache_dir.display(), error = %e, "failed to create vectorizer cache directory");
		return;
	}

	let path = cache_path(cache_dir, key);
	let payload = CachedMatrix {
		vectorizer: vectorizer.clone(),
		account_vectors: account_vectors.to_vec(),
	};

	let bytes = match serde_json::to_vec(&payload) {
		Ok(bytes) => bytes,
		Err(e) => {
			warn!(error = %e, "failed to serialize vectorizer cache");
			return;
		}
	};

	if let Err(e) = std::fs::write(&path, bytes) {
		warn!(cache_path = %path.display(), error = %e, "failed to write vectorizer cache");
	}
}
