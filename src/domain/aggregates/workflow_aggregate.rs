//! Workflow Aggregate - The root aggregate for one book in progress
//!
//! The aggregate holds everything the wizard produces: the syllabus, the
//! extracted curriculum, editorial guidelines, per-subtopic content, refined
//! chapters, practice questions and visual notes, plus the current step.
//! All modifications go through this root so the navigation rules and the
//! approval gate see a consistent picture.
//!
//! The aggregate derives serde because it *is* the persisted snapshot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::entities::{
    Chapter, ContentItem, ContentStore, Curriculum, QuestionAnswer,
};
use crate::domain::value_objects::{EditorialGuidelines, StepTransition, WorkflowStep};

/// The Workflow Aggregate Root
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowAggregate {
    current_step: WorkflowStep,
    syllabus_text: String,
    curriculum: Option<Curriculum>,
    editorial_guidelines: EditorialGuidelines,
    content: ContentStore,
    chapters: Option<Vec<Chapter>>,
    questions: BTreeMap<String, Vec<QuestionAnswer>>,
    visuals: BTreeMap<String, String>,
}

impl WorkflowAggregate {
    /// Initial state: step 1, nothing produced yet
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn current_step(&self) -> WorkflowStep {
        self.current_step
    }

    pub fn syllabus_text(&self) -> &str {
        &self.syllabus_text
    }

    pub fn curriculum(&self) -> Option<&Curriculum> {
        self.curriculum.as_ref()
    }

    pub fn editorial_guidelines(&self) -> &EditorialGuidelines {
        &self.editorial_guidelines
    }

    pub fn content(&self) -> &ContentStore {
        &self.content
    }

    pub fn chapters(&self) -> Option<&[Chapter]> {
        self.chapters.as_deref()
    }

    pub fn questions(&self) -> &BTreeMap<String, Vec<QuestionAnswer>> {
        &self.questions
    }

    pub fn visuals(&self) -> &BTreeMap<String, String> {
        &self.visuals
    }

    // ========================================================================
    // Finders
    // ========================================================================

    pub fn find_chapter(&self, title: &str) -> Option<&Chapter> {
        self.chapters
            .as_ref()
            .and_then(|chapters| chapters.iter().find(|c| c.title == title))
    }

    pub fn questions_for(&self, chapter_title: &str) -> Option<&[QuestionAnswer]> {
        self.questions.get(chapter_title).map(Vec::as_slice)
    }

    pub fn visuals_for(&self, chapter_title: &str) -> Option<&str> {
        self.visuals.get(chapter_title).map(String::as_str)
    }

    pub fn has_refined_chapters(&self) -> bool {
        self.chapters
            .as_ref()
            .is_some_and(|chapters| !chapters.is_empty())
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Move to `target` if the navigation rules allow it.
    ///
    /// - Backward moves are always allowed.
    /// - Advancing exactly one step is allowed; step prerequisites are the
    ///   caller's responsibility.
    /// - Jumping further ahead is allowed once a curriculum exists.
    ///
    /// Anything else, including out-of-range targets, leaves the step as is.
    pub fn go_to_step(&mut self, target: u8) -> StepTransition {
        let Some(target) = WorkflowStep::from_number(target) else {
            return StepTransition::Unchanged;
        };
        let from = self.current_step;
        let current = from.number();

        let allowed = target < from
            || target.number() == current + 1
            || (target.number() > current + 1 && self.curriculum.is_some());

        if !allowed {
            return StepTransition::Unchanged;
        }
        self.current_step = target;
        StepTransition::Moved { from, to: target }
    }

    // ========================================================================
    // Approval gate
    // ========================================================================

    /// Every subtopic key of the curriculum, in order
    pub fn required_content_keys(&self) -> Vec<String> {
        self.curriculum
            .as_ref()
            .map(Curriculum::subtopic_keys)
            .unwrap_or_default()
    }

    /// True iff every required key maps to approved content
    pub fn approve_all_content(&self, required_keys: &[String]) -> bool {
        self.content.approve_all(required_keys)
    }

    /// Gate for leaving content generation. False when no curriculum exists.
    pub fn approve_all_curriculum_content(&self) -> bool {
        if self.curriculum.is_none() {
            return false;
        }
        self.approve_all_content(&self.required_content_keys())
    }

    /// Curriculum keys still blocking the gate
    pub fn pending_approvals(&self) -> Vec<String> {
        self.content.pending(&self.required_content_keys())
    }

    // ========================================================================
    // Mutators
    // ========================================================================

    pub fn set_syllabus_text(&mut self, text: impl Into<String>) {
        self.syllabus_text = text.into();
    }

    pub fn set_curriculum(&mut self, curriculum: Option<Curriculum>) {
        self.curriculum = curriculum;
    }

    pub fn set_editorial_guidelines(&mut self, guidelines: EditorialGuidelines) {
        self.editorial_guidelines = guidelines;
    }

    /// Keyed write into the content store
    pub fn set_content(&mut self, key: impl Into<String>, item: ContentItem) {
        self.content.put(key, item);
    }

    /// Approve existing content for `key`
    ///
    /// # Invariants
    /// - Content must have been generated or written first
    pub fn approve_content(&mut self, key: &str) -> Result<(), AggregateError> {
        if self.content.approve(key) {
            Ok(())
        } else {
            Err(AggregateError::NotFound(format!(
                "No content to approve for \"{}\"",
                key
            )))
        }
    }

    /// Store a refined chapter, replacing any existing chapter with the same
    /// title in place. New titles are appended.
    ///
    /// # Invariants
    /// - Chapter title must not be empty
    pub fn upsert_chapter(&mut self, chapter: Chapter) -> Result<(), AggregateError> {
        if chapter.title.trim().is_empty() {
            return Err(AggregateError::ValidationError(
                "Chapter title cannot be empty".to_string(),
            ));
        }
        let chapters = self.chapters.get_or_insert_with(Vec::new);
        match chapters.iter_mut().find(|c| c.title == chapter.title) {
            Some(existing) => *existing = chapter,
            None => chapters.push(chapter),
        }
        Ok(())
    }

    pub fn set_questions(&mut self, chapter_title: impl Into<String>, questions: Vec<QuestionAnswer>) {
        self.questions.insert(chapter_title.into(), questions);
    }

    pub fn set_visuals(&mut self, chapter_title: impl Into<String>, notes: impl Into<String>) {
        self.visuals.insert(chapter_title.into(), notes.into());
    }

    /// Back to the initial state
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Errors that can occur when modifying the aggregate
#[derive(Debug, Clone, thiserror::Error)]
pub enum AggregateError {
    /// A validation rule was violated
    #[error("Validation error: {0}")]
    ValidationError(String),
    /// Entity not found
    #[error("Not found: {0}")]
    NotFound(String),
}
