use std::{fs, path::Path};

use branchline_domain::chunk::Chunk;

use crate::{Error, Result};

/// Reads the preprocessed chunk feed written by the offline ingestion step: a
/// JSON array of chunk records in document order.
pub fn load_chunks(path: &Path) -> Result<Vec<Chunk>> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadChunks { path: path.to_path_buf(), source: err })?;
	let chunks: Vec<Chunk> = serde_json::from_str(&raw)
		.map_err(|err| Error::ParseChunks { path: path.to_path_buf(), source: err })?;

	for chunk in &chunks {
		if chunk.id.trim().is_empty() {
			return Err(Error::InvalidArgument(format!(
				"Chunk on page {} has an empty id.",
				chunk.page
			)));
		}
	}

	Ok(chunks)
}

#[cfg(test)]
mod tests {
	use super::*;

	use std::env;

	use branchline_domain::branch::Branch;

	fn write_feed(name: &str, payload: &str) -> std::path::PathBuf {
		let mut path = env::temp_dir();

		path.push(format!("branchline_chunk_feed_{}_{name}.json", std::process::id()));

		fs::write(&path, payload).expect("Failed to write test feed.");

		path
	}

	#[test]
	fn loads_ordered_chunk_records() {
		let path = write_feed(
			"ordered",
			r#"[
				{ "id": "chunk_0", "text": "Mid 2025 opens quietly.", "page": 3, "branch": "shared", "chunk_index": 0 },
				{ "id": "chunk_1", "text": "Takeover unfolds by 2030.", "page": 29, "branch": "race", "chunk_index": 0 }
			]"#,
		);
		let chunks = load_chunks(&path).expect("Failed to load feed.");

		fs::remove_file(&path).expect("Failed to remove test feed.");

		assert_eq!(chunks.len(), 2);
		assert_eq!(chunks[0].id, "chunk_0");
		assert_eq!(chunks[1].branch, Branch::Race);
	}

	#[test]
	fn rejects_unknown_branch_labels() {
		let path = write_feed(
			"unknown_branch",
			r#"[{ "id": "chunk_0", "text": "x", "page": 1, "branch": "mystery", "chunk_index": 0 }]"#,
		);
		let result = load_chunks(&path);

		fs::remove_file(&path).expect("Failed to remove test feed.");

		assert!(matches!(result, Err(Error::ParseChunks { .. })));
	}
}
