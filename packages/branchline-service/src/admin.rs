use serde::{Deserialize, Serialize};

use crate::{Error, IndexedChunk, Result, ScenarioService};

const EMBED_BATCH_SIZE: usize = 100;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RebuildReport {
	pub indexed_count: u64,
	pub skipped_count: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Stats {
	pub status: String,
	pub total_chunks: u64,
	pub branches: Vec<String>,
	pub sparse_ready: bool,
}

impl ScenarioService {
	/// Re-embeds the corpus and rebuilds the vector collection from scratch.
	/// Chunks below the configured minimum length are skipped, the same rule
	/// the offline ingestion applies.
	pub async fn rebuild_index(&self) -> Result<RebuildReport> {
		self.vector
			.reset(self.cfg.storage.qdrant.vector_dim)
			.await
			.map_err(|err| Error::Vector { message: err.to_string() })?;

		let min_chars = self.cfg.corpus.min_chunk_chars as usize;
		let mut eligible = Vec::new();
		let mut skipped_count = 0_u64;

		for chunk in self.chunks.iter() {
			if chunk.text.trim().chars().count() < min_chars {
				skipped_count += 1;

				continue;
			}

			eligible.push(chunk);
		}

		let mut indexed_count = 0_u64;

		for batch in eligible.chunks(EMBED_BATCH_SIZE) {
			let texts: Vec<String> = batch.iter().map(|chunk| chunk.text.clone()).collect();
			let vectors =
				self.providers.embedding.embed(&self.cfg.providers.embedding, &texts).await?;

			if vectors.len() != batch.len() {
				return Err(Error::Provider {
					message: "Embedding provider returned mismatched vector count.".to_string(),
				});
			}

			for vector in &vectors {
				if vector.len() != self.cfg.storage.qdrant.vector_dim as usize {
					return Err(Error::Provider {
						message: "Embedding vector dimension mismatch.".to_string(),
					});
				}
			}

			let items: Vec<IndexedChunk> = batch
				.iter()
				.zip(vectors)
				.map(|(chunk, vector)| IndexedChunk { chunk: (*chunk).clone(), vector })
				.collect();

			self.vector
				.upsert(items)
				.await
				.map_err(|err| Error::Vector { message: err.to_string() })?;

			indexed_count += batch.len() as u64;
		}

		tracing::info!(indexed_count, skipped_count, "Rebuilt the vector index.");

		Ok(RebuildReport { indexed_count, skipped_count })
	}

	pub async fn stats(&self) -> Result<Stats> {
		let total_chunks = self
			.vector
			.count()
			.await
			.map_err(|err| Error::Vector { message: err.to_string() })?;
		let status = if total_chunks == 0 { "not_initialized" } else { "ready" };

		Ok(Stats {
			status: status.to_string(),
			total_chunks,
			branches: self
				.chunks
				.branches()
				.iter()
				.map(|branch| branch.as_str().to_string())
				.collect(),
			sparse_ready: !self.sparse.is_empty(),
		})
	}
}
