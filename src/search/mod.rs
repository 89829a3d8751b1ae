pub mod cache;
pub mod dot;
pub mod mcts;

pub use cache::SearchCache;
pub use mcts::{Mcts, SearchConfig, SearchResult};
