pub mod aggregate;
pub mod classifier;
pub mod export;
pub mod grouper;
pub mod index;
pub mod matcher;
pub mod normalizer;
pub mod pipeline;
pub mod score;
pub mod summary;
pub mod text;
pub mod view;

pub use classifier::Tolerances;
pub use pipeline::{compare, ComparisonCache};
pub use view::{SortDir, SortKey, SortSpec};
