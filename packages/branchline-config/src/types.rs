use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	pub corpus: Corpus,
	#[serde(default)]
	pub retrieval: Retrieval,
	#[serde(default)]
	pub citations: Citations,
	#[serde(default)]
	pub branches: Branches,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub qdrant: Qdrant,
}

#[derive(Debug, Deserialize)]
pub struct Qdrant {
	pub url: String,
	pub collection: String,
	pub vector_dim: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub generation: GenerationProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct GenerationProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct Corpus {
	/// Path to the preprocessed chunk feed produced by the offline ingestion step.
	pub chunks_path: String,
	#[serde(default = "default_source_name")]
	pub source_name: String,
	#[serde(default = "default_min_chunk_chars")]
	pub min_chunk_chars: u32,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Retrieval {
	pub top_k: u32,
	pub candidate_multiplier: u32,
	pub sparse_scan_multiplier: u32,
	pub bm25_k1: f32,
	pub bm25_b: f32,
}
impl Default for Retrieval {
	fn default() -> Self {
		Self {
			top_k: 10,
			candidate_multiplier: 2,
			sparse_scan_multiplier: 3,
			bm25_k1: 1.5,
			bm25_b: 0.75,
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Citations {
	pub min_quote_chars: u32,
	pub max_quote_chars: u32,
	/// Partial-ratio score on a 0-100 scale a quote must reach against at least
	/// one retrieved passage.
	pub min_match_score: f32,
}
impl Default for Citations {
	fn default() -> Self {
		Self { min_quote_chars: 10, max_quote_chars: 300, min_match_score: 85.0 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Branches {
	/// Entity names that appear with different roles in both endings. A query
	/// mentioning one of these cannot be pinned to a single branch.
	pub cross_branch_entities: Vec<String>,
}
impl Default for Branches {
	fn default() -> Self {
		Self {
			cross_branch_entities: vec!["agent-5".to_string(), "consensus-1".to_string()],
		}
	}
}

fn default_source_name() -> String {
	"scenario-report.pdf".to_string()
}

fn default_min_chunk_chars() -> u32 {
	50
}
