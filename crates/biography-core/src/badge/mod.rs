//! Gamification badges.

mod model;
pub mod repository;

pub use model::{
    BADGE_TABLE_VERSION, BADGES, BadgeCategory, BadgeDefinition, BadgeMetrics, BadgeProgress,
    Requirement, calculate_progress, compute_progress, pending_unlocks,
};
pub use repository::BadgeRepository;
