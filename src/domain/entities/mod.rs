//! Domain entities - Core business objects with identity

mod chapter;
mod content_item;
mod curriculum;

pub use chapter::{Chapter, QuestionAnswer};
pub use content_item::{ContentItem, ContentStatus, ContentStore};
pub use curriculum::{Curriculum, CurriculumChapter};
