pub mod directory;
pub mod filter;
pub mod pipeline;
pub mod ranker;

pub use directory::DirectorySearch;
pub use filter::{DEFAULT_TOP_K, normalize_top_k, shortlist};
pub use pipeline::{ChatAnswer, ReloadSummary, RetrievalEngine, RetrievalOutcome, retrieve_with};
pub use ranker::{RankedCandidate, rank, rank_by_vector};
