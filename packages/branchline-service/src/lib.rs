pub mod admin;
pub mod answer;
pub mod chunk_store;
pub mod search;
pub mod vector;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

use std::{future::Future, path::Path, pin::Pin, sync::Arc};

use serde_json::Value;

use branchline_config::{Config, EmbeddingProviderConfig, GenerationProviderConfig};
use branchline_domain::branch::BranchFilter;
use branchline_providers::{embedding, generation};
use branchline_storage::qdrant::VectorStore;

pub use admin::{RebuildReport, Stats};
pub use answer::{QueryRequest, QueryResponse};
pub use chunk_store::ChunkStore;
pub use search::{RetrievalSource, RetrieveRequest, ScoredPassage, sparse::SparseIndex};
pub use vector::{IndexedChunk, QdrantVectorIndex, VectorHit};

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>>;
}

pub trait GenerationProvider
where
	Self: Send + Sync,
{
	fn generate<'a>(
		&'a self,
		cfg: &'a GenerationProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<Value>>;
}

/// Contract with the external nearest-neighbor index. Results carry a cosine
/// distance; callers convert to similarity with `1 - distance`. The branch
/// predicate is pushed down so filtered queries never surface inadmissible
/// chunks.
pub trait VectorIndex
where
	Self: Send + Sync,
{
	fn count<'a>(&'a self) -> BoxFuture<'a, color_eyre::Result<u64>>;
	fn query<'a>(
		&'a self,
		vector: Vec<f32>,
		filter: BranchFilter,
		limit: u64,
	) -> BoxFuture<'a, color_eyre::Result<Vec<VectorHit>>>;
	fn reset<'a>(&'a self, vector_dim: u32) -> BoxFuture<'a, color_eyre::Result<()>>;
	fn upsert<'a>(&'a self, batch: Vec<IndexedChunk>) -> BoxFuture<'a, color_eyre::Result<()>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub generation: Arc<dyn GenerationProvider>,
}

struct DefaultProviders;

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}
}

impl GenerationProvider for DefaultProviders {
	fn generate<'a>(
		&'a self,
		cfg: &'a GenerationProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<Value>> {
		Box::pin(generation::generate(cfg, messages))
	}
}

impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		generation: Arc<dyn GenerationProvider>,
	) -> Self {
		Self { embedding, generation }
	}
}

impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);
		Self { embedding: provider.clone(), generation: provider }
	}
}

/// One retriever instance owns the loaded corpus, the sparse index built over
/// it, and a handle to the vector index. Everything is read-only after
/// construction, so a single instance is safely shared across concurrent
/// callers.
pub struct ScenarioService {
	pub cfg: Config,
	pub chunks: ChunkStore,
	pub sparse: SparseIndex,
	pub vector: Arc<dyn VectorIndex>,
	pub providers: Providers,
}

impl ScenarioService {
	/// Loads the chunk feed, builds the sparse index, and connects to the
	/// vector store. Every side effect happens here, with a typed failure;
	/// nothing is deferred into query time except the vector-index liveness
	/// check.
	pub fn initialize(cfg: Config, providers: Providers) -> Result<Self> {
		let chunks = ChunkStore::load(Path::new(&cfg.corpus.chunks_path))?;
		let store = VectorStore::new(&cfg.storage.qdrant)?;

		Self::with_vector_index(cfg, chunks, Arc::new(QdrantVectorIndex::new(store)), providers)
	}

	/// Builds a service over an already-loaded corpus and an explicit vector
	/// index implementation.
	pub fn with_vector_index(
		cfg: Config,
		chunks: ChunkStore,
		vector: Arc<dyn VectorIndex>,
		providers: Providers,
	) -> Result<Self> {
		if chunks.is_empty() {
			return Err(Error::NotInitialized);
		}

		let sparse = SparseIndex::build(chunks.iter(), &cfg.retrieval);

		Ok(Self { cfg, chunks, sparse, vector, providers })
	}
}
