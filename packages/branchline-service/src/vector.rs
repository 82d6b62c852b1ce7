use std::collections::HashMap;

use qdrant_client::{
	client::Payload,
	qdrant::{
		Condition, CountPointsBuilder, CreateCollectionBuilder, Distance, Filter, PointStruct,
		Query, QueryPointsBuilder, UpsertPointsBuilder, Value, VectorParamsBuilder, value::Kind,
	},
};
use uuid::Uuid;

use branchline_domain::{branch::BranchFilter, chunk::Chunk};
use branchline_storage::qdrant::{
	BRANCH_PAYLOAD_KEY, CHUNK_ID_PAYLOAD_KEY, CHUNK_INDEX_PAYLOAD_KEY, PAGE_PAYLOAD_KEY,
	VectorStore,
};

use crate::{BoxFuture, VectorIndex};

/// A chunk paired with its embedding, ready for indexing.
#[derive(Clone, Debug)]
pub struct IndexedChunk {
	pub chunk: Chunk,
	pub vector: Vec<f32>,
}

/// One nearest-neighbor hit, carrying a cosine distance in [0, 2].
#[derive(Clone, Debug)]
pub struct VectorHit {
	pub chunk_id: String,
	pub distance: f32,
}

pub struct QdrantVectorIndex {
	store: VectorStore,
}

impl QdrantVectorIndex {
	pub fn new(store: VectorStore) -> Self {
		Self { store }
	}
}

impl VectorIndex for QdrantVectorIndex {
	fn count<'a>(&'a self) -> BoxFuture<'a, color_eyre::Result<u64>> {
		Box::pin(async move {
			if !self.store.client.collection_exists(self.store.collection.clone()).await? {
				return Ok(0);
			}

			let response = self
				.store
				.client
				.count(CountPointsBuilder::new(self.store.collection.clone()).exact(true))
				.await?;

			Ok(response.result.map(|result| result.count).unwrap_or(0))
		})
	}

	fn query<'a>(
		&'a self,
		vector: Vec<f32>,
		filter: BranchFilter,
		limit: u64,
	) -> BoxFuture<'a, color_eyre::Result<Vec<VectorHit>>> {
		Box::pin(async move {
			let mut builder = QueryPointsBuilder::new(self.store.collection.clone())
				.query(Query::new_nearest(vector))
				.limit(limit)
				.with_payload(true);

			if let Some(branch_filter) = branch_condition(filter) {
				builder = builder.filter(branch_filter);
			}

			let response = self.store.client.query(builder).await?;
			let mut hits = Vec::with_capacity(response.result.len());

			for point in response.result {
				let Some(chunk_id) = payload_string(&point.payload, CHUNK_ID_PAYLOAD_KEY) else {
					tracing::warn!("Vector hit is missing the chunk_id payload field.");

					continue;
				};

				// Qdrant reports cosine similarity; the index contract speaks
				// distance.
				hits.push(VectorHit { chunk_id, distance: 1.0 - point.score });
			}

			Ok(hits)
		})
	}

	fn reset<'a>(&'a self, vector_dim: u32) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(async move {
			if self.store.client.collection_exists(self.store.collection.clone()).await? {
				self.store.client.delete_collection(self.store.collection.clone()).await?;
			}

			self.store
				.client
				.create_collection(
					CreateCollectionBuilder::new(self.store.collection.clone()).vectors_config(
						VectorParamsBuilder::new(vector_dim as u64, Distance::Cosine),
					),
				)
				.await?;

			Ok(())
		})
	}

	fn upsert<'a>(&'a self, batch: Vec<IndexedChunk>) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(async move {
			let mut points = Vec::with_capacity(batch.len());

			for item in batch {
				let mut payload = Payload::new();

				payload.insert(CHUNK_ID_PAYLOAD_KEY, item.chunk.id.clone());
				payload.insert(PAGE_PAYLOAD_KEY, Value::from(item.chunk.page as i64));
				payload.insert(BRANCH_PAYLOAD_KEY, item.chunk.branch.as_str());
				payload.insert(CHUNK_INDEX_PAYLOAD_KEY, Value::from(item.chunk.chunk_index as i64));

				points.push(PointStruct::new(point_id_for(&item.chunk.id), item.vector, payload));
			}

			self.store
				.client
				.upsert_points(
					UpsertPointsBuilder::new(self.store.collection.clone(), points).wait(true),
				)
				.await?;

			Ok(())
		})
	}
}

/// Qdrant point ids must be integers or UUIDs, while feed chunk ids are
/// free-form strings. Points get a stable UUIDv5 derived from the chunk id;
/// the original id stays in the payload.
pub fn point_id_for(chunk_id: &str) -> String {
	Uuid::new_v5(&Uuid::NAMESPACE_OID, chunk_id.as_bytes()).to_string()
}

fn branch_condition(filter: BranchFilter) -> Option<Filter> {
	let admitted = filter.admitted()?;
	let labels: Vec<String> = admitted.iter().map(|branch| branch.as_str().to_string()).collect();

	Some(Filter::must([Condition::matches(BRANCH_PAYLOAD_KEY, labels)]))
}

fn payload_string(payload: &HashMap<String, Value>, key: &str) -> Option<String> {
	let value = payload.get(key)?;

	match &value.kind {
		Some(Kind::StringValue(text)) => Some(text.to_string()),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn point_ids_are_stable_uuids() {
		let left = point_id_for("chunk_42");
		let right = point_id_for("chunk_42");

		assert_eq!(left, right);
		assert!(Uuid::parse_str(&left).is_ok());
		assert_ne!(point_id_for("chunk_43"), left);
	}

	#[test]
	fn unrestricted_filter_builds_no_condition() {
		assert!(branch_condition(BranchFilter::All).is_none());
	}

	#[test]
	fn admitted_branches_become_keyword_conditions() {
		use branchline_domain::branch::{BranchChoice, resolve_filter};

		let filter = branch_condition(resolve_filter(BranchChoice::Race))
			.expect("Expected a qdrant filter for the race branch.");

		assert_eq!(filter.must.len(), 1);
	}
}
