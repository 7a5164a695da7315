pub mod article;
pub mod feed;

pub use article::{Article, SourceCredibility, Verdict};
pub use feed::{FeedKey, FeedSnapshot, SnapshotOrigin};
