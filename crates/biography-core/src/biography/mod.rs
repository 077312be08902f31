//! Biography aggregate domain.
//!
//! # Module Structure
//!
//! - `model`: the `Biography` aggregate, write patches, field sets, listing shapes
//! - `repository`: `BiographyRepository` and `OwnerDirectory` traits
//! - `presentation`: anonymous masking, id/slug disambiguation, slug and name synthesis

mod model;
pub mod presentation;
pub mod repository;

pub use model::{
    Biography, BiographyField, BiographyInput, BiographyPatch, BiographyQuery, NewBiography,
    NormalizedInput, OwnerProfile, Page, Pagination, RecordAccess, StoredImages,
};
pub use presentation::{Identifier, mask_for_viewer};
pub use repository::{BiographyRepository, OwnerDirectory};
