mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Branches, Citations, Config, Corpus, EmbeddingProviderConfig, GenerationProviderConfig,
	Providers, Qdrant, Retrieval, Service, Storage,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.storage.qdrant.collection.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.qdrant.collection must be non-empty.".to_string(),
		});
	}
	if cfg.storage.qdrant.vector_dim == 0 {
		return Err(Error::Validation {
			message: "storage.qdrant.vector_dim must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.storage.qdrant.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match storage.qdrant.vector_dim."
				.to_string(),
		});
	}
	if cfg.corpus.chunks_path.trim().is_empty() {
		return Err(Error::Validation {
			message: "corpus.chunks_path must be non-empty.".to_string(),
		});
	}
	if cfg.retrieval.top_k == 0 {
		return Err(Error::Validation {
			message: "retrieval.top_k must be greater than zero.".to_string(),
		});
	}
	if cfg.retrieval.candidate_multiplier == 0 {
		return Err(Error::Validation {
			message: "retrieval.candidate_multiplier must be greater than zero.".to_string(),
		});
	}
	if cfg.retrieval.sparse_scan_multiplier == 0 {
		return Err(Error::Validation {
			message: "retrieval.sparse_scan_multiplier must be greater than zero.".to_string(),
		});
	}
	if !cfg.retrieval.bm25_k1.is_finite() || cfg.retrieval.bm25_k1 <= 0.0 {
		return Err(Error::Validation {
			message: "retrieval.bm25_k1 must be a positive finite number.".to_string(),
		});
	}
	if !cfg.retrieval.bm25_b.is_finite() || !(0.0..=1.0).contains(&cfg.retrieval.bm25_b) {
		return Err(Error::Validation {
			message: "retrieval.bm25_b must be in the range 0.0-1.0.".to_string(),
		});
	}
	if cfg.citations.min_quote_chars == 0 {
		return Err(Error::Validation {
			message: "citations.min_quote_chars must be greater than zero.".to_string(),
		});
	}
	if cfg.citations.max_quote_chars < cfg.citations.min_quote_chars {
		return Err(Error::Validation {
			message: "citations.max_quote_chars must be at least citations.min_quote_chars."
				.to_string(),
		});
	}
	if !cfg.citations.min_match_score.is_finite()
		|| !(0.0..=100.0).contains(&cfg.citations.min_match_score)
	{
		return Err(Error::Validation {
			message: "citations.min_match_score must be in the range 0.0-100.0.".to_string(),
		});
	}

	for (label, key) in [
		("embedding", &cfg.providers.embedding.api_key),
		("generation", &cfg.providers.generation.api_key),
	] {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	// Branch inference compares against lowercased query text.
	cfg.branches.cross_branch_entities = cfg
		.branches
		.cross_branch_entities
		.iter()
		.map(|entity| entity.trim().to_lowercase())
		.filter(|entity| !entity.is_empty())
		.collect();
}
