pub mod build;
pub mod builder;
pub mod map;
pub mod reader;
pub mod session;
pub mod stats;
pub mod types;
pub mod update;
pub mod writer;

pub use builder::{build_index, IndexBuilder};
pub use map::SymbolIndex;
pub use session::MapSession;
pub use types::*;
pub use update::{FileChange, FileUpdate, UpdateOutcome};
