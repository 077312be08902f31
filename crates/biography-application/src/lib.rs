//! Application layer for the biography engine.
//!
//! Use-case services that coordinate the domain ports from `biography-core`.
//! Services hold `Arc<dyn Trait>` collaborators and never touch storage
//! directly.

pub mod badge_service;
pub mod biography;
pub mod interaction_service;

#[cfg(test)]
mod test_support;

pub use badge_service::BadgeService;
pub use biography::{BiographyCache, BiographyPorts, BiographyService, ListRequest};
pub use interaction_service::InteractionService;
