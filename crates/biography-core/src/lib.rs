pub mod autosave;
pub mod badge;
pub mod biography;
pub mod cache;
pub mod clock;
pub mod config;
pub mod content;
pub mod error;
pub mod event;
pub mod interaction;
pub mod media;
pub mod visibility;

// Re-export common types
pub use error::{BiographyError, ErrorKind, Result};
pub use visibility::{ReadPredicate, Viewer, Visibility};
