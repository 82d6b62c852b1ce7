pub mod dense;
pub mod merge;
pub mod sparse;

use serde::{Deserialize, Serialize};

use branchline_domain::{
	branch::{self, Branch, BranchChoice, BranchFilter},
	infer,
};

use crate::{Error, Result, ScenarioService};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalSource {
	Dense,
	Sparse,
}

/// A chunk annotated with retrieval-time scores. `score` keeps the raw value
/// from whichever scorer surfaced the chunk first; `normalized_score` is
/// min-max rescaled within one retrieval call and is not comparable across
/// calls.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScoredPassage {
	pub id: String,
	pub text: String,
	pub page: u32,
	pub branch: Branch,
	pub score: f32,
	pub normalized_score: f32,
	pub source: RetrievalSource,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetrieveRequest {
	pub query: String,
	pub branch: Option<BranchChoice>,
	pub top_k: Option<u32>,
}

impl ScenarioService {
	/// Resolves the effective branch for a query. An explicit choice wins;
	/// `auto` or no choice falls back to lexical inference over the query
	/// text.
	pub fn resolve_branch(&self, query: &str, explicit: Option<BranchChoice>) -> BranchChoice {
		match explicit {
			None | Some(BranchChoice::Auto) => infer::infer_branch(query, &self.cfg.branches),
			Some(choice) => choice,
		}
	}

	/// Hybrid retrieval: dense and sparse scoring against the same branch
	/// filter, interleaved, deduplicated, normalized, and cut to `top_k`.
	/// An empty result means no evidence was found, not a failure.
	pub async fn retrieve(&self, req: &RetrieveRequest) -> Result<Vec<ScoredPassage>> {
		let query = req.query.trim();

		if query.is_empty() {
			return Err(Error::InvalidRequest { message: "query must be non-empty.".to_string() });
		}

		let top_k = req.top_k.unwrap_or(self.cfg.retrieval.top_k).max(1) as usize;
		let candidate_k = top_k * self.cfg.retrieval.candidate_multiplier.max(1) as usize;
		let choice = self.resolve_branch(query, req.branch);
		let filter = branch::resolve_filter(choice);

		let dense = dense::dense_search(self, query, filter, candidate_k as u64).await?;
		let sparse = self.sparse_search(query, filter, candidate_k);

		Ok(merge::merge_and_rank(dense, sparse, top_k))
	}

	/// Ranks the whole corpus by BM25, then walks the ranking collecting
	/// branch-admitted chunks. The scan is bounded so an aggressive filter
	/// cannot turn one query into a full-corpus sweep.
	fn sparse_search(
		&self,
		query: &str,
		filter: BranchFilter,
		candidate_k: usize,
	) -> Vec<ScoredPassage> {
		let scores = self.sparse.score_all(query);
		let mut ranked: Vec<usize> = (0..scores.len()).collect();

		ranked.sort_by(|left, right| merge::cmp_f32_desc(scores[*left], scores[*right]));

		let scan_limit = candidate_k * self.cfg.retrieval.sparse_scan_multiplier.max(1) as usize;
		let mut out = Vec::new();

		for index in ranked.into_iter().take(scan_limit) {
			let Some(chunk) = self.chunks.get(index) else { continue };

			if !filter.admits(chunk.branch) {
				continue;
			}

			out.push(ScoredPassage {
				id: chunk.id.clone(),
				text: chunk.text.clone(),
				page: chunk.page,
				branch: chunk.branch,
				score: scores[index],
				normalized_score: 0.0,
				source: RetrievalSource::Sparse,
			});

			if out.len() >= candidate_k {
				break;
			}
		}

		out
	}
}
