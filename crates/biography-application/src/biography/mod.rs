//! Biography application services.
//!
//! - `service`: reads, saves, autosave and delete for the biography aggregate
//! - `cache`: the read-through cache kept coherent by every write

mod cache;
mod service;

#[cfg(test)]
mod tests;

pub use cache::BiographyCache;
pub use service::{BiographyPorts, BiographyService, DEFAULT_FEATURED_LIMIT, ListRequest};
