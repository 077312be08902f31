//! Badge table and progress computation.
//!
//! The table is immutable static configuration. Progress is a pure function of
//! the table, a [`BadgeMetrics`] snapshot and the set of recorded unlocks.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Bump whenever a badge is added, retired or re-thresholded.
pub const BADGE_TABLE_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BadgeCategory {
    Story,
    Goal,
    Social,
    Footprint,
}

/// What a badge measures. Wire names match the stored requirement ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Requirement {
    CompleteFirstStory,
    #[serde(rename = "complete_5_stories")]
    #[strum(serialize = "complete_5_stories")]
    CompleteFiveStories,
    #[serde(rename = "story_encouraged_10_times")]
    #[strum(serialize = "story_encouraged_10_times")]
    StoryEncouragedTenTimes,
    #[serde(rename = "story_50_likes")]
    #[strum(serialize = "story_50_likes")]
    StoryFiftyLikes,
    CreateFirstGoal,
    CompleteFirstGoal,
    #[serde(rename = "complete_3_goals")]
    #[strum(serialize = "complete_3_goals")]
    CompleteThreeGoals,
    #[serde(rename = "give_50_likes")]
    #[strum(serialize = "give_50_likes")]
    GiveFiftyLikes,
    #[serde(rename = "post_20_comments")]
    #[strum(serialize = "post_20_comments")]
    PostTwentyComments,
    #[serde(rename = "read_20_biographies")]
    #[strum(serialize = "read_20_biographies")]
    ReadTwentyBiographies,
    #[serde(rename = "add_5_locations")]
    #[strum(serialize = "add_5_locations")]
    AddFiveLocations,
    #[serde(rename = "add_3_international_locations")]
    #[strum(serialize = "add_3_international_locations")]
    AddThreeInternationalLocations,
}

impl Requirement {
    /// Reads the aggregate this requirement is measured against.
    pub fn current_value(&self, metrics: &BadgeMetrics) -> u64 {
        match self {
            Self::CompleteFirstStory | Self::CompleteFiveStories => metrics.stories_completed,
            Self::StoryEncouragedTenTimes => metrics.encouragements_received,
            Self::StoryFiftyLikes => metrics.likes_received,
            Self::CreateFirstGoal => metrics.goals_created,
            Self::CompleteFirstGoal | Self::CompleteThreeGoals => metrics.goals_completed,
            Self::GiveFiftyLikes => metrics.likes_given,
            Self::PostTwentyComments => metrics.comments_posted,
            Self::ReadTwentyBiographies => metrics.biographies_read,
            Self::AddFiveLocations => metrics.locations_added,
            Self::AddThreeInternationalLocations => metrics.international_locations_added,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BadgeDefinition {
    pub id: &'static str,
    pub category: BadgeCategory,
    pub requirement: Requirement,
    pub threshold: u64,
}

const fn badge(
    id: &'static str,
    category: BadgeCategory,
    requirement: Requirement,
    threshold: u64,
) -> BadgeDefinition {
    BadgeDefinition {
        id,
        category,
        requirement,
        threshold,
    }
}

pub const BADGES: [BadgeDefinition; 12] = [
    badge("story_beginner", BadgeCategory::Story, Requirement::CompleteFirstStory, 1),
    badge("story_writer", BadgeCategory::Story, Requirement::CompleteFiveStories, 5),
    badge("inspirator", BadgeCategory::Story, Requirement::StoryEncouragedTenTimes, 10),
    badge("trending", BadgeCategory::Story, Requirement::StoryFiftyLikes, 50),
    badge("goal_setter", BadgeCategory::Goal, Requirement::CreateFirstGoal, 1),
    badge("achiever", BadgeCategory::Goal, Requirement::CompleteFirstGoal, 1),
    badge("consistent", BadgeCategory::Goal, Requirement::CompleteThreeGoals, 3),
    badge("supportive", BadgeCategory::Social, Requirement::GiveFiftyLikes, 50),
    badge("conversationalist", BadgeCategory::Social, Requirement::PostTwentyComments, 20),
    badge("explorer", BadgeCategory::Social, Requirement::ReadTwentyBiographies, 20),
    badge("traveler", BadgeCategory::Footprint, Requirement::AddFiveLocations, 5),
    badge(
        "international",
        BadgeCategory::Footprint,
        Requirement::AddThreeInternationalLocations,
        3,
    ),
];

/// Aggregates a user's badges are measured against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BadgeMetrics {
    /// Core stories plus categorized stories; one-liners are not counted.
    pub stories_completed: u64,
    pub encouragements_received: u64,
    pub likes_received: u64,
    pub goals_created: u64,
    pub goals_completed: u64,
    pub likes_given: u64,
    pub comments_posted: u64,
    /// Distinct biographies viewed while signed in.
    pub biographies_read: u64,
    pub locations_added: u64,
    pub international_locations_added: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BadgeProgress {
    pub badge_id: String,
    pub current_value: u64,
    pub target_value: u64,
    /// Rounded, clamped to `0..=100`.
    pub progress_percent: u8,
    pub unlocked: bool,
}

/// `round(current / threshold * 100)` capped at 100; 0 when the threshold is 0.
pub fn calculate_progress(current: u64, threshold: u64) -> u8 {
    if threshold == 0 {
        return 0;
    }
    let percent = (current as f64 / threshold as f64 * 100.0).round();
    percent.clamp(0.0, 100.0) as u8
}

/// Computes progress for every badge.
///
/// A badge is unlocked when an unlock is recorded or the metric already
/// meets the threshold.
pub fn compute_progress(metrics: &BadgeMetrics, recorded: &HashSet<String>) -> Vec<BadgeProgress> {
    BADGES
        .iter()
        .map(|badge| {
            let current_value = badge.requirement.current_value(metrics);
            BadgeProgress {
                badge_id: badge.id.to_string(),
                current_value,
                target_value: badge.threshold,
                progress_percent: calculate_progress(current_value, badge.threshold),
                unlocked: recorded.contains(badge.id) || current_value >= badge.threshold,
            }
        })
        .collect()
}

/// Badges whose threshold is met but whose unlock is not yet recorded.
pub fn pending_unlocks(metrics: &BadgeMetrics, recorded: &HashSet<String>) -> Vec<&'static str> {
    BADGES
        .iter()
        .filter(|badge| !recorded.contains(badge.id))
        .filter(|badge| badge.requirement.current_value(metrics) >= badge.threshold)
        .map(|badge| badge.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_progress_bounds() {
        assert_eq!(calculate_progress(0, 5), 0);
        assert_eq!(calculate_progress(2, 3), 67);
        assert_eq!(calculate_progress(5, 5), 100);
        assert_eq!(calculate_progress(500, 5), 100);
        assert_eq!(calculate_progress(7, 0), 0);
    }

    #[test]
    fn test_progress_is_monotonic_in_metric() {
        for badge in BADGES {
            let mut previous = 0;
            for value in 0..=badge.threshold * 2 {
                let percent = calculate_progress(value, badge.threshold);
                assert!(percent >= previous, "{} at {value}", badge.id);
                assert!(percent <= 100);
                previous = percent;
            }
        }
    }

    #[test]
    fn test_table_ids_are_unique() {
        let ids: HashSet<_> = BADGES.iter().map(|b| b.id).collect();
        assert_eq!(ids.len(), BADGES.len());
        assert_eq!(
            BADGES.iter().find(|b| b.id == "international").map(|b| b.requirement.as_ref()),
            Some("add_3_international_locations")
        );
    }

    #[test]
    fn test_recorded_unlock_stays_unlocked() {
        let recorded: HashSet<String> = ["story_beginner".to_string()].into();
        let progress = compute_progress(&BadgeMetrics::default(), &recorded);
        let beginner = progress.iter().find(|p| p.badge_id == "story_beginner").unwrap();
        assert!(beginner.unlocked);
        assert_eq!(beginner.progress_percent, 0);
    }

    #[test]
    fn test_pending_unlocks_skip_recorded() {
        let metrics = BadgeMetrics {
            stories_completed: 5,
            ..Default::default()
        };
        let recorded: HashSet<String> = ["story_beginner".to_string()].into();
        assert_eq!(pending_unlocks(&metrics, &recorded), vec!["story_writer"]);
    }
}
