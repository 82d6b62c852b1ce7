use std::{collections::HashMap, path::Path};

use branchline_domain::{branch::Branch, chunk::Chunk};

use crate::Result;

/// Ordered, read-only view of the preprocessed corpus, loaded once at
/// startup.
pub struct ChunkStore {
	chunks: Vec<Chunk>,
	by_id: HashMap<String, usize>,
}

impl ChunkStore {
	pub fn load(path: &Path) -> Result<Self> {
		Ok(Self::from_chunks(branchline_storage::chunks::load_chunks(path)?))
	}

	pub fn from_chunks(chunks: Vec<Chunk>) -> Self {
		let mut by_id = HashMap::with_capacity(chunks.len());

		for (index, chunk) in chunks.iter().enumerate() {
			if by_id.insert(chunk.id.clone(), index).is_some() {
				tracing::warn!(chunk_id = %chunk.id, "Duplicate chunk id in feed. Keeping the last occurrence.");
			}
		}

		Self { chunks, by_id }
	}

	pub fn len(&self) -> usize {
		self.chunks.len()
	}

	pub fn is_empty(&self) -> bool {
		self.chunks.is_empty()
	}

	pub fn get(&self, index: usize) -> Option<&Chunk> {
		self.chunks.get(index)
	}

	pub fn by_id(&self, id: &str) -> Option<&Chunk> {
		self.by_id.get(id).and_then(|index| self.chunks.get(*index))
	}

	pub fn iter(&self) -> std::slice::Iter<'_, Chunk> {
		self.chunks.iter()
	}

	/// Distinct branch labels present in the corpus, in first-seen order.
	pub fn branches(&self) -> Vec<Branch> {
		let mut out = Vec::new();

		for chunk in &self.chunks {
			if !out.contains(&chunk.branch) {
				out.push(chunk.branch);
			}
		}

		out
	}
}
