use std::{
	cmp::Ordering,
	sync::{Arc, Mutex},
};

use serde_json::{Map, Value};

use branchline_config::{
	Branches, Citations, Config, Corpus, EmbeddingProviderConfig, GenerationProviderConfig,
	Providers as ProviderSettings, Qdrant, Retrieval, Service, Storage,
};
use branchline_domain::{
	branch::{Branch, BranchFilter},
	chunk::Chunk,
};
use branchline_service::{
	BoxFuture, ChunkStore, EmbeddingProvider, GenerationProvider, IndexedChunk, Providers,
	ScenarioService, VectorHit, VectorIndex,
};

pub const TEST_VECTOR_DIM: u32 = 8;

/// Deterministic embeddings derived from a BLAKE3 hash of the text. Equal
/// texts embed identically, so a test can steer nearest-neighbor results by
/// querying with a chunk's exact text.
pub struct HashEmbedding {
	pub dimensions: u32,
}

impl HashEmbedding {
	pub fn vector_for(&self, text: &str) -> Vec<f32> {
		let mut hasher = blake3::Hasher::new();

		hasher.update(text.as_bytes());

		let mut bytes = vec![0_u8; self.dimensions as usize];

		hasher.finalize_xof().fill(&mut bytes);

		bytes.into_iter().map(|byte| byte as f32 / 127.5 - 1.0).collect()
	}
}

impl EmbeddingProvider for HashEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		let vectors = texts.iter().map(|text| self.vector_for(text)).collect();

		Box::pin(async move { Ok(vectors) })
	}
}

/// Returns the same draft for every generation call.
pub struct StubGeneration {
	pub draft: Value,
}

impl GenerationProvider for StubGeneration {
	fn generate<'a>(
		&'a self,
		_cfg: &'a GenerationProviderConfig,
		_messages: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<Value>> {
		let draft = self.draft.clone();

		Box::pin(async move { Ok(draft) })
	}
}

/// Fails every embedding call, for exercising the external-failure path.
pub struct FailingEmbedding;

impl EmbeddingProvider for FailingEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		_texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(async move { Err(color_eyre::eyre::eyre!("embedding provider unreachable")) })
	}
}

struct StoredPoint {
	chunk_id: String,
	branch: Branch,
	vector: Vec<f32>,
}

/// In-memory stand-in for the vector index: brute-force cosine distance with
/// branch predicate pushdown, mirroring the production contract.
#[derive(Default)]
pub struct InMemoryVectorIndex {
	points: Mutex<Vec<StoredPoint>>,
}

impl InMemoryVectorIndex {
	pub fn new() -> Self {
		Self::default()
	}
}

impl VectorIndex for InMemoryVectorIndex {
	fn count<'a>(&'a self) -> BoxFuture<'a, color_eyre::Result<u64>> {
		let count = self.points.lock().unwrap_or_else(|err| err.into_inner()).len() as u64;

		Box::pin(async move { Ok(count) })
	}

	fn query<'a>(
		&'a self,
		vector: Vec<f32>,
		filter: BranchFilter,
		limit: u64,
	) -> BoxFuture<'a, color_eyre::Result<Vec<VectorHit>>> {
		let mut hits: Vec<VectorHit> = {
			let points = self.points.lock().unwrap_or_else(|err| err.into_inner());

			points
				.iter()
				.filter(|point| filter.admits(point.branch))
				.map(|point| VectorHit {
					chunk_id: point.chunk_id.clone(),
					distance: 1.0 - cosine_similarity(&vector, &point.vector),
				})
				.collect()
		};

		hits.sort_by(|left, right| {
			left.distance.partial_cmp(&right.distance).unwrap_or(Ordering::Equal)
		});
		hits.truncate(limit as usize);

		Box::pin(async move { Ok(hits) })
	}

	fn reset<'a>(&'a self, _vector_dim: u32) -> BoxFuture<'a, color_eyre::Result<()>> {
		self.points.lock().unwrap_or_else(|err| err.into_inner()).clear();

		Box::pin(async move { Ok(()) })
	}

	fn upsert<'a>(&'a self, batch: Vec<IndexedChunk>) -> BoxFuture<'a, color_eyre::Result<()>> {
		{
			let mut points = self.points.lock().unwrap_or_else(|err| err.into_inner());

			for item in batch {
				points.retain(|point| point.chunk_id != item.chunk.id);
				points.push(StoredPoint {
					chunk_id: item.chunk.id,
					branch: item.chunk.branch,
					vector: item.vector,
				});
			}
		}

		Box::pin(async move { Ok(()) })
	}
}

pub fn cosine_similarity(left: &[f32], right: &[f32]) -> f32 {
	let dot: f32 = left.iter().zip(right).map(|(l, r)| l * r).sum();
	let left_norm = left.iter().map(|v| v * v).sum::<f32>().sqrt();
	let right_norm = right.iter().map(|v| v * v).sum::<f32>().sqrt();

	if left_norm == 0.0 || right_norm == 0.0 {
		return 0.0;
	}

	dot / (left_norm * right_norm)
}

pub fn chunk(id: &str, text: &str, page: u32, branch: Branch, chunk_index: u32) -> Chunk {
	Chunk { id: id.to_string(), text: text.to_string(), page, branch, chunk_index }
}

/// A miniature corpus spanning every branch of the report.
pub fn sample_chunks() -> Vec<Chunk> {
	vec![
		chunk("chunk_0", "Early 2026 brings cheap coding automation to every lab.", 5, Branch::Shared, 0),
		chunk("chunk_1", "By mid 2027 the shared timeline reaches a decision point.", 14, Branch::Shared, 0),
		chunk("chunk_2", "In the race ending, oversight fails as deployment accelerates.", 23, Branch::Race, 0),
		chunk("chunk_3", "The race ending closes with a takeover in 2030.", 29, Branch::Race, 1),
		chunk("chunk_4", "In the slowdown ending, the committee hands control to a board.", 31, Branch::Slowdown, 0),
		chunk("chunk_5", "Appendix E explains neuralese recurrence and memory.", 46, Branch::Appendix, 0),
	]
}

pub fn test_config() -> Config {
	Config {
		service: Service { log_level: "info".to_string() },
		storage: Storage {
			qdrant: Qdrant {
				url: "http://127.0.0.1:6334".to_string(),
				collection: "scenario_chunks_test".to_string(),
				vector_dim: TEST_VECTOR_DIM,
			},
		},
		providers: ProviderSettings {
			embedding: EmbeddingProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://localhost".to_string(),
				api_key: "key".to_string(),
				path: "/v1/embeddings".to_string(),
				model: "test-embedding".to_string(),
				dimensions: TEST_VECTOR_DIM,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
			generation: GenerationProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://localhost".to_string(),
				api_key: "key".to_string(),
				path: "/v1/chat/completions".to_string(),
				model: "test-model".to_string(),
				temperature: 0.1,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
		},
		corpus: Corpus {
			chunks_path: "data/processed/chunks.json".to_string(),
			source_name: "scenario-report.pdf".to_string(),
			min_chunk_chars: 10,
		},
		retrieval: Retrieval::default(),
		citations: Citations::default(),
		branches: Branches::default(),
	}
}

/// Service over the sample corpus with deterministic providers and an empty
/// in-memory vector index. Call `rebuild_index` to populate it.
pub fn build_service(chunks: Vec<Chunk>, draft: Value) -> ScenarioService {
	let providers = Providers::new(
		Arc::new(HashEmbedding { dimensions: TEST_VECTOR_DIM }),
		Arc::new(StubGeneration { draft }),
	);

	ScenarioService::with_vector_index(
		test_config(),
		ChunkStore::from_chunks(chunks),
		Arc::new(InMemoryVectorIndex::new()),
		providers,
	)
	.expect("Failed to build test service.")
}

/// Like [`build_service`], with the vector index already rebuilt.
pub async fn build_indexed_service(chunks: Vec<Chunk>, draft: Value) -> ScenarioService {
	let service = build_service(chunks, draft);

	service.rebuild_index().await.expect("Failed to rebuild test index.");

	service
}
