//! Story content domain.
//!
//! - `catalogue`: the fixed question catalogue (core questions, categories)
//! - `model`: read shapes (`OneLiners`, `Stories`) and lenient write inputs
//! - `repository`: the `ContentRepository` trait

pub mod catalogue;
mod model;
pub mod repository;

pub use model::{
    AnswerInput, ContentItem, ContentUpdate, JsonPayload, OneLiners, OneLinersInput, Stories,
    StoriesInput,
};
pub use repository::ContentRepository;
