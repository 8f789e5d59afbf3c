mod classifier;
mod tree_walker;

pub use classifier::{FileCategory, FileClassification, PathClassifier};
pub use tree_walker::{TreeWalk, TreeWalker};
