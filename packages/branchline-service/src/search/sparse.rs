use ahash::AHashMap;

use branchline_domain::chunk::Chunk;

/// BM25 Okapi index over the whole corpus, built once at startup. Scores are
/// unbounded term-frequency values; they share no scale with dense
/// similarities and only become comparable after per-query normalization.
pub struct SparseIndex {
	k1: f32,
	b: f32,
	avgdl: f32,
	doc_lens: Vec<u32>,
	term_freqs: Vec<AHashMap<String, u32>>,
	doc_freq: AHashMap<String, u32>,
}

impl SparseIndex {
	pub fn build<'a>(
		chunks: impl Iterator<Item = &'a Chunk>,
		cfg: &branchline_config::Retrieval,
	) -> Self {
		let mut doc_lens = Vec::new();
		let mut term_freqs = Vec::new();
		let mut doc_freq: AHashMap<String, u32> = AHashMap::new();

		for chunk in chunks {
			let mut freqs: AHashMap<String, u32> = AHashMap::new();
			let mut len = 0_u32;

			for token in tokenize(&chunk.text) {
				*freqs.entry(token).or_insert(0) += 1;

				len += 1;
			}

			for term in freqs.keys() {
				*doc_freq.entry(term.clone()).or_insert(0) += 1;
			}

			doc_lens.push(len);
			term_freqs.push(freqs);
		}

		let total_len: u64 = doc_lens.iter().map(|len| *len as u64).sum();
		let avgdl = if total_len == 0 { 1.0 } else { total_len as f32 / doc_lens.len() as f32 };

		Self { k1: cfg.bm25_k1, b: cfg.bm25_b, avgdl, doc_lens, term_freqs, doc_freq }
	}

	pub fn len(&self) -> usize {
		self.doc_lens.len()
	}

	pub fn is_empty(&self) -> bool {
		self.doc_lens.is_empty()
	}

	/// Scores the query against every chunk, in corpus order. No filtering
	/// happens here; branch rules apply downstream.
	pub fn score_all(&self, query: &str) -> Vec<f32> {
		let total_docs = self.len();
		let mut scores = vec![0.0_f32; total_docs];

		if total_docs == 0 {
			return scores;
		}

		// Repeated query terms contribute once per occurrence.
		let query_terms: Vec<(String, f32)> = tokenize(query)
			.filter_map(|term| {
				let df = *self.doc_freq.get(&term)? as f32;
				let idf = (1.0 + (total_docs as f32 - df + 0.5) / (df + 0.5)).ln();

				Some((term, idf))
			})
			.collect();

		for (doc_index, freqs) in self.term_freqs.iter().enumerate() {
			let dl = self.doc_lens[doc_index] as f32;
			let norm = self.k1 * (1.0 - self.b + self.b * dl / self.avgdl);
			let mut score = 0.0_f32;

			for (term, idf) in &query_terms {
				let Some(tf) = freqs.get(term) else { continue };
				let tf = *tf as f32;

				score += idf * tf * (self.k1 + 1.0) / (tf + norm);
			}

			scores[doc_index] = score;
		}

		scores
	}
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
	text.split_whitespace().map(|token| token.to_lowercase())
}
