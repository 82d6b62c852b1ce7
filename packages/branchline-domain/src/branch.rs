use serde::{Deserialize, Serialize};

/// Narrative thread a chunk belongs to. Assigned once at ingestion time from
/// page ranges and never changed afterwards.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Branch {
	Shared,
	Race,
	Slowdown,
	Appendix,
}
impl Branch {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Shared => "shared",
			Self::Race => "race",
			Self::Slowdown => "slowdown",
			Self::Appendix => "appendix",
		}
	}

	pub fn parse(text: &str) -> Option<Self> {
		match text {
			"shared" => Some(Self::Shared),
			"race" => Some(Self::Race),
			"slowdown" => Some(Self::Slowdown),
			"appendix" => Some(Self::Appendix),
			_ => None,
		}
	}
}
impl std::fmt::Display for Branch {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Branch selection as requested by a caller or inferred from query text.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchChoice {
	Auto,
	Shared,
	Race,
	Slowdown,
	Both,
}
impl BranchChoice {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Auto => "auto",
			Self::Shared => "shared",
			Self::Race => "race",
			Self::Slowdown => "slowdown",
			Self::Both => "both",
		}
	}

	pub fn parse(text: &str) -> Option<Self> {
		match text {
			"auto" => Some(Self::Auto),
			"shared" => Some(Self::Shared),
			"race" => Some(Self::Race),
			"slowdown" => Some(Self::Slowdown),
			"both" => Some(Self::Both),
			_ => None,
		}
	}
}
impl std::fmt::Display for BranchChoice {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Inclusion predicate over chunk branch labels.
///
/// A committed ending's history includes everything before the fork, so the
/// `race` and `slowdown` filters always admit `shared` chunks as well.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BranchFilter {
	All,
	Admit(&'static [Branch]),
}
impl BranchFilter {
	pub fn admits(self, branch: Branch) -> bool {
		match self {
			Self::All => true,
			Self::Admit(admitted) => admitted.contains(&branch),
		}
	}

	pub fn admitted(self) -> Option<&'static [Branch]> {
		match self {
			Self::All => None,
			Self::Admit(admitted) => Some(admitted),
		}
	}
}

pub fn resolve_filter(choice: BranchChoice) -> BranchFilter {
	match choice {
		BranchChoice::Shared => BranchFilter::Admit(&[Branch::Shared]),
		BranchChoice::Race => BranchFilter::Admit(&[Branch::Shared, Branch::Race]),
		BranchChoice::Slowdown => BranchFilter::Admit(&[Branch::Shared, Branch::Slowdown]),
		BranchChoice::Auto | BranchChoice::Both => BranchFilter::All,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn committed_endings_admit_shared() {
		assert!(resolve_filter(BranchChoice::Race).admits(Branch::Shared));
		assert!(resolve_filter(BranchChoice::Slowdown).admits(Branch::Shared));
	}

	#[test]
	fn shared_admits_only_shared() {
		let filter = resolve_filter(BranchChoice::Shared);

		assert!(filter.admits(Branch::Shared));
		assert!(!filter.admits(Branch::Race));
		assert!(!filter.admits(Branch::Slowdown));
		assert!(!filter.admits(Branch::Appendix));
	}

	#[test]
	fn auto_and_both_admit_everything() {
		for choice in [BranchChoice::Auto, BranchChoice::Both] {
			let filter = resolve_filter(choice);

			assert_eq!(filter, BranchFilter::All);
			assert!(filter.admits(Branch::Appendix));
		}
	}
}
