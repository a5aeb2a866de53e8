mod export;
mod summary;

pub use export::write_results;
pub use summary::ReliefSummary;
