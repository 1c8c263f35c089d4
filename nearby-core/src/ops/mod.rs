mod merge_ops;
mod rank_ops;

pub use merge_ops::merge;
pub use rank_ops::{format_distance, rank};
