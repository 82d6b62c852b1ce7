use std::{cmp::Ordering, collections::HashSet};

use super::ScoredPassage;

/// Interleaves dense and sparse results rank-by-rank (dense first at equal
/// rank), deduplicates by chunk id keeping the first-inserted entry and the
/// score it arrived with, min-max normalizes over the merged set, and keeps
/// the best `top_k`.
pub fn merge_and_rank(
	dense: Vec<ScoredPassage>,
	sparse: Vec<ScoredPassage>,
	top_k: usize,
) -> Vec<ScoredPassage> {
	let mut merged = interleave(dense, sparse);

	if merged.is_empty() {
		return merged;
	}

	normalize_scores(&mut merged);
	merged.sort_by(|left, right| cmp_f32_desc(left.normalized_score, right.normalized_score));
	merged.truncate(top_k);

	merged
}

fn interleave(dense: Vec<ScoredPassage>, sparse: Vec<ScoredPassage>) -> Vec<ScoredPassage> {
	let mut dense: Vec<Option<ScoredPassage>> = dense.into_iter().map(Some).collect();
	let mut sparse: Vec<Option<ScoredPassage>> = sparse.into_iter().map(Some).collect();
	let mut seen = HashSet::new();
	let mut out = Vec::with_capacity(dense.len() + sparse.len());

	for rank in 0..dense.len().max(sparse.len()) {
		for list in [&mut dense, &mut sparse] {
			let Some(passage) = list.get_mut(rank).and_then(|slot| slot.take()) else { continue };

			if seen.insert(passage.id.clone()) {
				out.push(passage);
			}
		}
	}

	out
}

/// Min-max rescaling within one result set. When every raw score is
/// identical the range is treated as 1, so every normalized score becomes 0
/// rather than NaN.
pub fn normalize_scores(passages: &mut [ScoredPassage]) {
	let Some(first) = passages.first() else { return };
	let mut min_score = first.score;
	let mut max_score = first.score;

	for passage in passages.iter() {
		min_score = min_score.min(passage.score);
		max_score = max_score.max(passage.score);
	}

	let range = if max_score > min_score { max_score - min_score } else { 1.0 };

	for passage in passages.iter_mut() {
		passage.normalized_score = (passage.score - min_score) / range;
	}
}

pub fn cmp_f32_desc(a: f32, b: f32) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}
