//! Fixed question catalogue.
//!
//! Immutable static configuration. Bump [`CATALOGUE_VERSION`] whenever a
//! question or category is added, renamed or retired.

use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const CATALOGUE_VERSION: u32 = 1;

/// Category id under which stories with no (or an unknown) category surface on read.
pub const UNCATEGORIZED: &str = "uncategorized";

/// The three core narrative questions. Always persisted in the core-story collection.
pub const CORE_STORY_QUESTIONS: [&str; 3] = ["climbing_origin", "climbing_meaning", "advice_to_self"];

/// Story categories in display order.
pub const STORY_CATEGORIES: [&str; 6] = [
    "growth",
    "psychology",
    "community",
    "practical",
    "dreams",
    "life",
];

/// Categorized story questions as `(question_id, category_id)`.
pub const STORY_QUESTIONS: [(&str, &str); 31] = [
    // growth
    ("memorable_moment", "growth"),
    ("biggest_challenge", "growth"),
    ("breakthrough_story", "growth"),
    ("first_outdoor", "growth"),
    ("first_grade", "growth"),
    ("frustrating_climb", "growth"),
    // psychology
    ("fear_management", "psychology"),
    ("climbing_lesson", "psychology"),
    ("failure_perspective", "psychology"),
    ("flow_moment", "psychology"),
    ("life_balance", "psychology"),
    ("unexpected_gain", "psychology"),
    // community
    ("climbing_mentor", "community"),
    ("climbing_partner", "community"),
    ("funny_moment", "community"),
    ("favorite_spot", "community"),
    ("advice_to_group", "community"),
    ("climbing_space", "community"),
    // practical
    ("injury_recovery", "practical"),
    ("memorable_route", "practical"),
    ("training_method", "practical"),
    ("effective_practice", "practical"),
    ("technique_tip", "practical"),
    ("gear_choice", "practical"),
    // dreams
    ("dream_climb", "dreams"),
    ("climbing_trip", "dreams"),
    ("bucket_list_story", "dreams"),
    ("climbing_goal", "dreams"),
    ("climbing_style", "dreams"),
    ("climbing_inspiration", "dreams"),
    // life
    ("life_outside_climbing", "life"),
];

static QUESTION_CATEGORY: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| STORY_QUESTIONS.iter().copied().collect());

pub fn is_core_story(question_id: &str) -> bool {
    CORE_STORY_QUESTIONS.contains(&question_id)
}

pub fn is_known_category(category_id: &str) -> bool {
    STORY_CATEGORIES.contains(&category_id)
}

/// The catalogue category of a categorized question.
pub fn category_of(question_id: &str) -> Option<&'static str> {
    QUESTION_CATEGORY.get(question_id).copied()
}
