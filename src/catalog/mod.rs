pub mod errors;
pub mod index;
pub mod loader;
pub mod models;
pub mod subtitle;

pub use errors::CatalogError;
pub use index::{SectionEntry, SectionHandle, SectionId, SectionIndex, SectionPath};
pub use loader::{CatalogLoader, CatalogSource, detect_source};
pub use models::{Catalog, Course, Section, Semester, Week};
pub use subtitle::{SubtitleConfig, derive_subtitle_url, resolve_subtitle_url};
