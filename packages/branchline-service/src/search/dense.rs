use branchline_domain::branch::BranchFilter;

use crate::{
	Error, Result, ScenarioService,
	search::{RetrievalSource, ScoredPassage},
};

/// Semantic search: one embedding call for the query, then a filtered
/// nearest-neighbor query. Fails fast with `NotInitialized` when the index
/// holds no points, instead of silently answering from nothing.
pub(crate) async fn dense_search(
	service: &ScenarioService,
	query: &str,
	filter: BranchFilter,
	limit: u64,
) -> Result<Vec<ScoredPassage>> {
	let indexed = service
		.vector
		.count()
		.await
		.map_err(|err| Error::Vector { message: err.to_string() })?;

	if indexed == 0 {
		return Err(Error::NotInitialized);
	}

	let vector = embed_query(service, query).await?;
	let hits = service
		.vector
		.query(vector, filter, limit)
		.await
		.map_err(|err| Error::Vector { message: err.to_string() })?;
	let mut out = Vec::with_capacity(hits.len());

	for hit in hits {
		let Some(chunk) = service.chunks.by_id(&hit.chunk_id) else {
			tracing::warn!(chunk_id = %hit.chunk_id, "Dense hit references a chunk missing from the store.");

			continue;
		};

		out.push(ScoredPassage {
			id: chunk.id.clone(),
			text: chunk.text.clone(),
			page: chunk.page,
			branch: chunk.branch,
			score: 1.0 - hit.distance,
			normalized_score: 0.0,
			source: RetrievalSource::Dense,
		});
	}

	Ok(out)
}

async fn embed_query(service: &ScenarioService, query: &str) -> Result<Vec<f32>> {
	let text = query.to_string();
	let embeddings = service
		.providers
		.embedding
		.embed(&service.cfg.providers.embedding, std::slice::from_ref(&text))
		.await?;
	let vector = embeddings.into_iter().next().ok_or_else(|| Error::Provider {
		message: "Embedding provider returned no vectors.".to_string(),
	})?;

	if vector.len() != service.cfg.storage.qdrant.vector_dim as usize {
		return Err(Error::Provider {
			message: "Embedding vector dimension mismatch.".to_string(),
		});
	}

	Ok(vector)
}
