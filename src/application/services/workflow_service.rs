//! Workflow Service - Owns the wizard state and drives every step
//!
//! The aggregate lives behind a `tokio::sync::RwLock`. Generation calls read
//! their inputs under a short read lock, release it while the model works,
//! then take the write lock for one keyed write followed by a snapshot save.
//! Saving while the write lock is held keeps persistence order identical to
//! mutation order.
//!
//! Each generation call runs on its own task together with its keyed write.
//! Dropping the caller (a client disconnecting mid-request) detaches that
//! task instead of aborting it, so the call still completes, its result
//! still lands, and its in-flight marker is still cleared.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn, Instrument};

use crate::application::ports::outbound::{LlmPort, SnapshotError, WorkflowSnapshotPort};
use crate::application::services::activity_tracker::{
    ActivityRegion, ActivitySnapshot, ActivityTracker,
};
use crate::application::services::book_generation_service::{
    BookGenerationService, ChapterRefinementInput, ChapterRefinementOutput, ContentEditInput,
    CurriculumExtractionInput, GenerationError, QuestionGenerationInput, SubtopicContentInput,
    SubtopicDraft,
};
use crate::domain::aggregates::{AggregateError, WorkflowAggregate};
use crate::domain::entities::{Chapter, ContentItem, Curriculum, CurriculumChapter, QuestionAnswer};
use crate::domain::value_objects::{EditorialGuidelines, StepTransition, WorkflowStep};

/// Result of a navigation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationOutcome {
    pub moved: bool,
    pub current_step: WorkflowStep,
    /// Why the move did not happen, when it did not
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// Approval gate status over the curriculum's subtopics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApprovalReport {
    pub all_approved: bool,
    pub pending: Vec<String>,
    /// Subtopic names that appear in more than one chapter and share content
    pub duplicate_subtopics: Vec<String>,
}

/// Everything a detached generation task needs to finish on its own
struct Shared<L: LlmPort> {
    state: RwLock<WorkflowAggregate>,
    snapshots: Arc<dyn WorkflowSnapshotPort>,
    generator: BookGenerationService<L>,
    activity: ActivityTracker,
}

impl<L: LlmPort> Shared<L> {
    async fn persist(&self, state: &WorkflowAggregate) -> Result<(), WorkflowError> {
        self.snapshots.save(state).await.map_err(|e| {
            error!("Failed to save workflow snapshot: {}", e);
            WorkflowError::from(e)
        })
    }
}

/// Application service for the book creation workflow
pub struct WorkflowService<L: LlmPort> {
    shared: Arc<Shared<L>>,
    strict_navigation: bool,
}

impl<L: LlmPort + 'static> WorkflowService<L> {
    /// Restore the last snapshot, falling back to the initial state
    pub async fn load(
        snapshots: Arc<dyn WorkflowSnapshotPort>,
        generator: BookGenerationService<L>,
    ) -> Self {
        let state = match snapshots.load().await {
            Ok(Some(state)) => {
                info!("Restored workflow snapshot at step {}", state.current_step());
                state
            }
            Ok(None) => {
                debug!("No workflow snapshot found, starting fresh");
                WorkflowAggregate::new()
            }
            Err(e) => {
                warn!("Ignoring unreadable workflow snapshot: {}", e);
                WorkflowAggregate::new()
            }
        };

        Self {
            shared: Arc::new(Shared {
                state: RwLock::new(state),
                snapshots,
                generator,
                activity: ActivityTracker::new(),
            }),
            strict_navigation: false,
        }
    }

    /// Require every intervening prerequisite on multi-step forward jumps
    pub fn with_strict_navigation(mut self, strict: bool) -> Self {
        self.strict_navigation = strict;
        self
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> WorkflowAggregate {
        self.shared.state.read().await.clone()
    }

    pub async fn activity(&self) -> ActivitySnapshot {
        self.shared.activity.snapshot().await
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    #[instrument(skip(self))]
    pub async fn go_to_step(&self, target: u8) -> Result<NavigationOutcome, WorkflowError> {
        let mut state = self.shared.state.write().await;
        let current = state.current_step();

        let Some(target_step) = WorkflowStep::from_number(target) else {
            return Ok(blocked(current, format!("Step {} does not exist", target)));
        };

        if let Some(notice) = self.navigation_block(&state, target_step) {
            warn!(from = %current, to = %target_step, "Navigation blocked: {}", notice);
            return Ok(blocked(current, notice));
        }

        match state.go_to_step(target) {
            StepTransition::Moved { from, to } => {
                info!("Moved from step {} to step {}", from, to);
                self.shared.persist(&state).await?;
                Ok(NavigationOutcome {
                    moved: true,
                    current_step: to,
                    notice: None,
                })
            }
            StepTransition::Unchanged if target_step == current => Ok(NavigationOutcome {
                moved: false,
                current_step: current,
                notice: None,
            }),
            StepTransition::Unchanged => {
                let notice = "Extract a curriculum before jumping ahead".to_string();
                warn!(from = %current, to = %target_step, "Navigation blocked: {}", notice);
                Ok(blocked(current, notice))
            }
        }
    }

    /// Prerequisites checked on forward moves. Adjacent moves always check
    /// the step being left; strict mode also checks every skipped step.
    fn navigation_block(&self, state: &WorkflowAggregate, target: WorkflowStep) -> Option<String> {
        let current = state.current_step();
        if target <= current {
            return None;
        }

        let last_checked = if self.strict_navigation || current.next() == Some(target) {
            target.number() - 1
        } else {
            return None;
        };

        WorkflowStep::ALL
            .iter()
            .filter(|step| step.number() >= current.number() && step.number() <= last_checked)
            .find_map(|step| exit_prerequisite(state, *step))
    }

    /// Clear the persisted snapshot and return to the initial state.
    ///
    /// The in-memory state is only reset once the stored snapshot is gone.
    #[instrument(skip(self))]
    pub async fn reset(&self) -> Result<(), WorkflowError> {
        let mut state = self.shared.state.write().await;
        self.shared.snapshots.clear().await.map_err(|e| {
            error!("Failed to clear workflow snapshot: {}", e);
            WorkflowError::from(e)
        })?;
        state.reset();
        info!("Workflow reset");
        Ok(())
    }

    // ========================================================================
    // Step 1: Curriculum
    // ========================================================================

    pub async fn set_syllabus_text(&self, text: String) -> Result<(), WorkflowError> {
        let mut state = self.shared.state.write().await;
        state.set_syllabus_text(text);
        self.shared.persist(&state).await
    }

    /// Extract the curriculum from the stored syllabus text.
    ///
    /// A failed extraction leaves the previous curriculum in place.
    #[instrument(skip(self))]
    pub async fn extract_curriculum(&self) -> Result<Curriculum, WorkflowError> {
        let syllabus_text = self.shared.state.read().await.syllabus_text().to_string();
        if syllabus_text.trim().is_empty() {
            return Err(WorkflowError::Validation(
                "Paste the syllabus text before extracting a curriculum".to_string(),
            ));
        }

        let input = CurriculumExtractionInput { syllabus_text };
        self.run_generation(
            ActivityRegion::Curriculum,
            "syllabus",
            move |shared| async move { shared.generator.extract_curriculum(&input).await },
            |state, curriculum: Curriculum| {
                for duplicate in curriculum.duplicate_subtopics() {
                    warn!(
                        subtopic = %duplicate,
                        "Subtopic name appears in more than one chapter; their content is shared"
                    );
                }
                state.set_curriculum(Some(curriculum.clone()));
                info!(chapters = curriculum.chapters.len(), "Curriculum extracted");
                Ok(curriculum)
            },
        )
        .await
    }

    // ========================================================================
    // Step 2: Editorial guidelines
    // ========================================================================

    pub async fn set_editorial_guidelines(
        &self,
        guidelines: EditorialGuidelines,
    ) -> Result<(), WorkflowError> {
        let mut state = self.shared.state.write().await;
        state.set_editorial_guidelines(guidelines);
        self.shared.persist(&state).await
    }

    // ========================================================================
    // Step 3: Content generation and approval
    // ========================================================================

    /// Generate (or regenerate) the content for one subtopic
    #[instrument(skip(self))]
    pub async fn generate_subtopic_content(
        &self,
        subtopic: &str,
    ) -> Result<ContentItem, WorkflowError> {
        let input = {
            let state = self.shared.state.read().await;
            let chapter = require_subtopic(&state, subtopic)?;
            if state.editorial_guidelines().is_blank() {
                debug!("No editorial guidelines set for \"{}\"", subtopic);
            }

            SubtopicContentInput {
                chapter_title: chapter.chapter_title.clone(),
                subtopic: subtopic.to_string(),
                prior_subtopics: chapter
                    .subtopics_before(subtopic)
                    .iter()
                    .map(|s| SubtopicDraft::new(s.clone(), state.content().content_of(s)))
                    .collect(),
                editorial_guidelines: state.editorial_guidelines().formatted(),
            }
        };

        let key = subtopic.to_string();
        self.run_generation(
            ActivityRegion::Content,
            subtopic,
            move |shared| async move { shared.generator.generate_subtopic_content(&input).await },
            move |state, content: String| {
                let item = ContentItem::generated(content);
                state.set_content(&key, item.clone());
                info!("Generated content for \"{}\"", key);
                Ok(item)
            },
        )
        .await
    }

    pub async fn approve_content(&self, subtopic: &str) -> Result<(), WorkflowError> {
        let mut state = self.shared.state.write().await;
        require_subtopic(&state, subtopic)?;
        state.approve_content(subtopic)?;
        info!("Approved content for \"{}\"", subtopic);
        self.shared.persist(&state).await
    }

    /// Replace a subtopic's content by hand, which also approves it
    pub async fn save_edit(&self, subtopic: &str, content: String) -> Result<ContentItem, WorkflowError> {
        if content.trim().is_empty() {
            return Err(WorkflowError::Validation("Edited content is empty".to_string()));
        }

        let mut state = self.shared.state.write().await;
        require_subtopic(&state, subtopic)?;
        let item = ContentItem::edited(content);
        state.set_content(subtopic, item.clone());
        info!("Saved manual edit for \"{}\"", subtopic);
        self.shared.persist(&state).await?;
        Ok(item)
    }

    /// Rewrite a subtopic's content according to a free-text instruction.
    ///
    /// The result is stored as freshly generated and needs approval again.
    #[instrument(skip(self, instruction))]
    pub async fn ai_edit(&self, subtopic: &str, instruction: &str) -> Result<ContentItem, WorkflowError> {
        let original_content = {
            let state = self.shared.state.read().await;
            require_subtopic(&state, subtopic)?;
            state.content().content_of(subtopic).to_string()
        };
        if original_content.trim().is_empty() {
            return Err(WorkflowError::Validation(format!(
                "\"{}\" has no content to edit",
                subtopic
            )));
        }

        let input = ContentEditInput {
            original_content,
            instruction: instruction.to_string(),
        };
        let key = subtopic.to_string();
        self.run_generation(
            ActivityRegion::Content,
            subtopic,
            move |shared| async move { shared.generator.edit_content(&input).await },
            move |state, edited: String| {
                let item = ContentItem::generated(edited);
                state.set_content(&key, item.clone());
                info!("Applied AI edit to \"{}\"", key);
                Ok(item)
            },
        )
        .await
    }

    pub async fn approval_report(&self) -> ApprovalReport {
        let state = self.shared.state.read().await;
        ApprovalReport {
            all_approved: state.approve_all_curriculum_content(),
            pending: state.pending_approvals(),
            duplicate_subtopics: state
                .curriculum()
                .map(Curriculum::duplicate_subtopics)
                .unwrap_or_default(),
        }
    }

    // ========================================================================
    // Step 4: Chapter refinement
    // ========================================================================

    /// Merge a chapter's subtopics into one refined chapter, replacing any
    /// earlier refinement of the same chapter
    #[instrument(skip(self))]
    pub async fn refine_chapter(&self, chapter_title: &str) -> Result<Chapter, WorkflowError> {
        let input = {
            let state = self.shared.state.read().await;
            let curriculum = require_curriculum(&state)?;
            let chapter = curriculum.find_chapter(chapter_title).ok_or_else(|| {
                WorkflowError::NotFound(format!(
                    "Chapter \"{}\" is not in the curriculum",
                    chapter_title
                ))
            })?;

            ChapterRefinementInput {
                chapter_title: chapter.chapter_title.clone(),
                subtopics: chapter
                    .subtopics
                    .iter()
                    .map(|s| SubtopicDraft::new(s.clone(), state.content().content_of(s)))
                    .collect(),
                editorial_guidelines: state.editorial_guidelines().formatted(),
            }
        };

        let title = input.chapter_title.clone();
        let subtopics: Vec<String> = input.subtopics.iter().map(|s| s.sub_topic.clone()).collect();
        self.run_generation(
            ActivityRegion::Chapters,
            chapter_title,
            move |shared| async move { shared.generator.refine_chapter(&input).await },
            move |state, refined: ChapterRefinementOutput| {
                let mut chapter = Chapter::new(title, refined.refined_content).with_subtopics(subtopics);
                if !refined.summary.is_empty() {
                    chapter = chapter.with_learning_objective(refined.summary);
                }
                state.upsert_chapter(chapter.clone())?;
                info!("Refined chapter \"{}\"", chapter.title);
                Ok(chapter)
            },
        )
        .await
    }

    // ========================================================================
    // Step 5: Practice questions
    // ========================================================================

    #[instrument(skip(self))]
    pub async fn generate_questions(
        &self,
        chapter_title: &str,
    ) -> Result<Vec<QuestionAnswer>, WorkflowError> {
        let input = {
            let state = self.shared.state.read().await;
            let chapter = state.find_chapter(chapter_title).ok_or_else(|| {
                WorkflowError::NotFound(format!(
                    "Chapter \"{}\" has not been refined yet",
                    chapter_title
                ))
            })?;
            QuestionGenerationInput {
                content: chapter.description.clone(),
                topic: chapter.title.clone(),
            }
        };

        let key = chapter_title.to_string();
        self.run_generation(
            ActivityRegion::Questions,
            chapter_title,
            move |shared| async move { shared.generator.generate_questions(&input).await },
            move |state, questions: Vec<QuestionAnswer>| {
                state.set_questions(&key, questions.clone());
                info!(count = questions.len(), "Generated questions for \"{}\"", key);
                Ok(questions)
            },
        )
        .await
    }

    // ========================================================================
    // Step 6: Visual planning
    // ========================================================================

    pub async fn set_visuals(&self, chapter_title: &str, notes: String) -> Result<(), WorkflowError> {
        if chapter_title.trim().is_empty() {
            return Err(WorkflowError::Validation("Chapter title is empty".to_string()));
        }
        let mut state = self.shared.state.write().await;
        state.set_visuals(chapter_title, notes);
        self.shared.persist(&state).await
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Run a generation call with its in-flight marker set, then apply the
    /// result as one keyed write. Nothing is written if the call fails.
    async fn run_generation<T, R, C, Fut, A>(
        &self,
        region: ActivityRegion,
        key: &str,
        call: C,
        apply: A,
    ) -> Result<R, WorkflowError>
    where
        C: FnOnce(Arc<Shared<L>>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, GenerationError>> + Send + 'static,
        A: FnOnce(&mut WorkflowAggregate, T) -> Result<R, WorkflowError> + Send + 'static,
        T: Send + 'static,
        R: Send + 'static,
    {
        let shared = Arc::clone(&self.shared);
        let key = key.to_string();

        let task = tokio::spawn(
            async move {
                shared.activity.begin(region, &key).await;
                let result = call(Arc::clone(&shared)).await;
                shared.activity.finish(region, &key).await;

                let value = result.map_err(|e| {
                    error!(?region, key = %key, "Generation failed: {}", e);
                    WorkflowError::from(e)
                })?;

                let mut state = shared.state.write().await;
                let output = apply(&mut *state, value)?;
                shared.persist(&state).await?;
                Ok::<_, WorkflowError>(output)
            }
            .in_current_span(),
        );

        task.await.map_err(|e| {
            error!(?region, "Generation task did not complete: {}", e);
            WorkflowError::Generation(format!("Generation task did not complete: {}", e))
        })?
    }
}

fn blocked(current: WorkflowStep, notice: String) -> NavigationOutcome {
    NavigationOutcome {
        moved: false,
        current_step: current,
        notice: Some(notice),
    }
}

/// What must be true before leaving `step` forwards
fn exit_prerequisite(state: &WorkflowAggregate, step: WorkflowStep) -> Option<String> {
    match step {
        WorkflowStep::CurriculumStructure if state.curriculum().is_none() => {
            Some("Extract a curriculum before continuing".to_string())
        }
        WorkflowStep::ContentGeneration if !state.approve_all_curriculum_content() => {
            let pending = state.pending_approvals();
            if pending.is_empty() {
                Some("Approve all content before continuing".to_string())
            } else {
                Some(format!(
                    "Approve all content before continuing. Pending: {}",
                    pending.join(", ")
                ))
            }
        }
        WorkflowStep::ChapterReview if !state.has_refined_chapters() => {
            Some("Refine at least one chapter before continuing".to_string())
        }
        _ => None,
    }
}

fn require_curriculum(state: &WorkflowAggregate) -> Result<&Curriculum, WorkflowError> {
    state.curriculum().ok_or_else(|| {
        WorkflowError::Validation("Extract a curriculum first".to_string())
    })
}

/// Chapter owning `subtopic`. Content is only ever keyed by curriculum subtopics.
fn require_subtopic<'a>(
    state: &'a WorkflowAggregate,
    subtopic: &str,
) -> Result<&'a CurriculumChapter, WorkflowError> {
    require_curriculum(state)?
        .chapter_for_subtopic(subtopic)
        .ok_or_else(|| {
            WorkflowError::NotFound(format!("Subtopic \"{}\" is not in the curriculum", subtopic))
        })
}

/// Errors that can occur in the workflow service
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Generation failed: {0}")]
    Generation(String),
    #[error("Persistence error: {0}")]
    Persistence(#[from] SnapshotError),
}

impl From<GenerationError> for WorkflowError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::InvalidRequest(msg) => WorkflowError::Validation(msg),
            other => WorkflowError::Generation(other.to_string()),
        }
    }
}

impl From<AggregateError> for WorkflowError {
    fn from(err: AggregateError) -> Self {
        match err {
            AggregateError::ValidationError(msg) => WorkflowError::Validation(msg),
            AggregateError::NotFound(msg) => WorkflowError::NotFound(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::outbound::{LlmRequest, LlmResponse};
    use crate::application::services::book_generation_service::tests::ScriptedLlm;
    use crate::domain::entities::ContentStatus;
    use crate::infrastructure::persistence::InMemorySnapshotRepository;
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::Semaphore;

    const CURRICULUM_REPLY: &str = r#"{"chapters": [
        {"chapter_title": "Cells", "subtopics": ["Cell Wall", "Nucleus"]},
        {"chapter_title": "Plants", "subtopics": ["Photosynthesis"]}
    ]}"#;

    async fn service_with(
        llm: ScriptedLlm,
        snapshots: Arc<dyn WorkflowSnapshotPort>,
    ) -> WorkflowService<ScriptedLlm> {
        WorkflowService::load(snapshots, BookGenerationService::new(llm)).await
    }

    async fn service(llm: ScriptedLlm) -> WorkflowService<ScriptedLlm> {
        service_with(llm, Arc::new(InMemorySnapshotRepository::new())).await
    }

    /// Mock whose first reply is the curriculum; chain further replies on it
    fn scripted() -> ScriptedLlm {
        ScriptedLlm::new().reply(CURRICULUM_REPLY)
    }

    async fn with_curriculum(llm: ScriptedLlm) -> WorkflowService<ScriptedLlm> {
        let service = service(llm).await;
        service.set_syllabus_text("Biology 101".to_string()).await.unwrap();
        service.extract_curriculum().await.unwrap();
        service
    }

    struct BrokenSnapshots;

    #[async_trait]
    impl WorkflowSnapshotPort for BrokenSnapshots {
        async fn load(&self) -> Result<Option<WorkflowAggregate>, SnapshotError> {
            Err(SnapshotError::Serialization("truncated snapshot".to_string()))
        }
        async fn save(&self, _state: &WorkflowAggregate) -> Result<(), SnapshotError> {
            Err(SnapshotError::Database("disk full".to_string()))
        }
        async fn clear(&self) -> Result<(), SnapshotError> {
            Ok(())
        }
    }

    /// Saves succeed, clearing fails
    struct StickySnapshots;

    #[async_trait]
    impl WorkflowSnapshotPort for StickySnapshots {
        async fn load(&self) -> Result<Option<WorkflowAggregate>, SnapshotError> {
            Ok(None)
        }
        async fn save(&self, _state: &WorkflowAggregate) -> Result<(), SnapshotError> {
            Ok(())
        }
        async fn clear(&self) -> Result<(), SnapshotError> {
            Err(SnapshotError::Database("database is locked".to_string()))
        }
    }

    /// Holds every reply until the test releases a permit
    struct GatedLlm {
        gate: Arc<Semaphore>,
        reply: &'static str,
    }

    #[async_trait]
    impl LlmPort for GatedLlm {
        type Error = std::io::Error;

        async fn generate(&self, _request: LlmRequest) -> Result<LlmResponse, Self::Error> {
            let _permit = self.gate.acquire().await.map_err(std::io::Error::other)?;
            Ok(LlmResponse {
                content: self.reply.to_string(),
                model: "gated".to_string(),
                tokens_used: 0,
            })
        }
    }

    #[tokio::test]
    async fn test_extract_curriculum_requires_syllabus() {
        let llm = ScriptedLlm::new();
        let service = service(llm.clone()).await;

        let result = service.extract_curriculum().await;
        assert!(matches!(result, Err(WorkflowError::Validation(_))));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_extraction_keeps_previous_curriculum() {
        let service = with_curriculum(scripted().fail("connection refused")).await;
        let before = service.snapshot().await.curriculum().cloned();

        let result = service.extract_curriculum().await;
        assert!(matches!(result, Err(WorkflowError::Generation(_))));
        assert_eq!(service.snapshot().await.curriculum().cloned(), before);
    }

    #[tokio::test]
    async fn test_generate_subtopic_passes_prior_sections() {
        let llm = scripted();
        let service = with_curriculum(
            llm.clone()
                .reply(r#"{"content": "Walls are rigid."}"#)
                .reply(r#"{"content": "The nucleus stores DNA."}"#),
        )
        .await;

        service.generate_subtopic_content("Cell Wall").await.unwrap();
        let item = service.generate_subtopic_content("Nucleus").await.unwrap();
        assert_eq!(item.status, ContentStatus::Generated);

        assert!(service.activity().await.content.is_none());

        let requests = llm.requests.lock().unwrap();
        let last_prompt = &requests.last().unwrap().messages[0].content;
        assert!(last_prompt.contains("### Cell Wall\nWalls are rigid."));
    }

    #[tokio::test]
    async fn test_generate_unknown_subtopic_is_not_found() {
        let service = with_curriculum(scripted()).await;
        let result = service.generate_subtopic_content("Volcanoes").await;
        assert!(matches!(result, Err(WorkflowError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_failed_generation_leaves_approved_content() {
        let llm = scripted();
        let service = with_curriculum(
            llm.clone()
                .reply(r#"{"content": "Light becomes sugar."}"#)
                .fail("model unavailable"),
        )
        .await;

        service.generate_subtopic_content("Photosynthesis").await.unwrap();
        service.approve_content("Photosynthesis").await.unwrap();

        let result = service.generate_subtopic_content("Photosynthesis").await;
        assert!(matches!(result, Err(WorkflowError::Generation(_))));

        let state = service.snapshot().await;
        let item = state.content().get("Photosynthesis").unwrap();
        assert_eq!(item.content, "Light becomes sugar.");
        assert_eq!(item.status, ContentStatus::Approved);
    }

    #[tokio::test]
    async fn test_save_edit_approves() {
        let service = with_curriculum(scripted()).await;
        let item = service
            .save_edit("Nucleus", "Hand-written text".to_string())
            .await
            .unwrap();
        assert_eq!(item.status, ContentStatus::Approved);

        let result = service.save_edit("Nucleus", "   ".to_string()).await;
        assert!(matches!(result, Err(WorkflowError::Validation(_))));
    }

    #[tokio::test]
    async fn test_ai_edit_requires_existing_content() {
        let service = with_curriculum(scripted().reply(r#"{"editedContent": "Shorter."}"#)).await;

        let result = service.ai_edit("Nucleus", "make it shorter").await;
        assert!(matches!(result, Err(WorkflowError::Validation(_))));

        service
            .save_edit("Nucleus", "A long text.".to_string())
            .await
            .unwrap();
        let item = service.ai_edit("Nucleus", "make it shorter").await.unwrap();
        assert_eq!(item.content, "Shorter.");
        assert_eq!(item.status, ContentStatus::Generated);
    }

    #[tokio::test]
    async fn test_refining_twice_replaces_chapter() {
        let llm = scripted();
        let service = with_curriculum(
            llm.clone()
                .reply(r#"{"refinedContent": "First draft.", "summary": "One"}"#)
                .reply(r#"{"refinedContent": "Second draft.", "summary": "Two"}"#),
        )
        .await;

        service.refine_chapter("Cells").await.unwrap();
        let chapter = service.refine_chapter("Cells").await.unwrap();
        assert_eq!(chapter.subtopics, vec!["Cell Wall", "Nucleus"]);

        let state = service.snapshot().await;
        let chapters = state.chapters().unwrap();
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].description, "Second draft.");
        assert_eq!(chapters[0].learning_objectives, vec!["Two"]);
    }

    #[tokio::test]
    async fn test_questions_require_refined_chapter() {
        let llm = scripted();
        let service = with_curriculum(
            llm.clone()
                .reply(r#"{"refinedContent": "Cells are small.", "summary": "Cells"}"#)
                .reply(r#"{"questions": [{"question": "What is a cell?", "answer": "A unit of life."}]}"#),
        )
        .await;

        let result = service.generate_questions("Cells").await;
        assert!(matches!(result, Err(WorkflowError::NotFound(_))));

        service.refine_chapter("Cells").await.unwrap();
        let questions = service.generate_questions("Cells").await.unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(service.snapshot().await.questions_for("Cells").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_navigation_prerequisites() {
        let service = service(scripted()).await;

        let outcome = service.go_to_step(2).await.unwrap();
        assert!(!outcome.moved);
        assert!(outcome.notice.is_some());

        // Skipping ahead without a curriculum is refused by the aggregate
        let outcome = service.go_to_step(3).await.unwrap();
        assert!(!outcome.moved);
        assert_eq!(outcome.current_step, WorkflowStep::CurriculumStructure);

        service.set_syllabus_text("Biology".to_string()).await.unwrap();
        service.extract_curriculum().await.unwrap();
        assert!(service.go_to_step(3).await.unwrap().moved);

        let outcome = service.go_to_step(4).await.unwrap();
        assert!(!outcome.moved);
        assert!(outcome.notice.unwrap().contains("Cell Wall"));

        // Loose jumps skip intermediate prerequisites
        let outcome = service.go_to_step(5).await.unwrap();
        assert!(outcome.moved);
        assert!(service.go_to_step(1).await.unwrap().moved);
    }

    #[tokio::test]
    async fn test_strict_navigation_checks_skipped_steps() {
        let service = service(scripted()).await.with_strict_navigation(true);
        service.set_syllabus_text("Biology".to_string()).await.unwrap();
        service.extract_curriculum().await.unwrap();

        let outcome = service.go_to_step(5).await.unwrap();
        assert!(!outcome.moved);
        assert!(outcome.notice.unwrap().contains("Approve"));

        for subtopic in ["Cell Wall", "Nucleus", "Photosynthesis"] {
            service.save_edit(subtopic, "Text".to_string()).await.unwrap();
        }
        let outcome = service.go_to_step(5).await.unwrap();
        assert!(!outcome.moved);
        assert!(outcome.notice.unwrap().contains("Refine"));
    }

    #[tokio::test]
    async fn test_out_of_range_step_is_reported() {
        let service = service(ScriptedLlm::new()).await;
        let outcome = service.go_to_step(9).await.unwrap();
        assert!(!outcome.moved);
        assert_eq!(outcome.current_step, WorkflowStep::CurriculumStructure);
    }

    #[tokio::test]
    async fn test_reset_then_load_is_initial_state() {
        let snapshots: Arc<dyn WorkflowSnapshotPort> = Arc::new(InMemorySnapshotRepository::new());
        let service = service_with(ScriptedLlm::new(), snapshots.clone()).await;
        service.set_syllabus_text("Biology".to_string()).await.unwrap();
        service
            .set_visuals("Cells", "Diagram of a cell".to_string())
            .await
            .unwrap();

        service.reset().await.unwrap();
        assert_eq!(service.snapshot().await, WorkflowAggregate::new());

        let reloaded = service_with(ScriptedLlm::new(), snapshots).await;
        assert_eq!(reloaded.snapshot().await, WorkflowAggregate::new());
    }

    #[tokio::test]
    async fn test_state_survives_reload() {
        let snapshots: Arc<dyn WorkflowSnapshotPort> = Arc::new(InMemorySnapshotRepository::new());
        let service = service_with(ScriptedLlm::new(), snapshots.clone()).await;
        service
            .set_editorial_guidelines(EditorialGuidelines::new("lively", "teens"))
            .await
            .unwrap();

        let reloaded = service_with(ScriptedLlm::new(), snapshots).await;
        assert_eq!(
            reloaded.snapshot().await.editorial_guidelines().target_audience,
            "teens"
        );
    }

    #[tokio::test]
    async fn test_persistence_failure_keeps_mutation() {
        let service = service_with(ScriptedLlm::new(), Arc::new(BrokenSnapshots)).await;

        let result = service.set_syllabus_text("Biology".to_string()).await;
        assert!(matches!(result, Err(WorkflowError::Persistence(_))));
        assert_eq!(service.snapshot().await.syllabus_text(), "Biology");
    }

    #[tokio::test]
    async fn test_approval_report_lists_pending_and_duplicates() {
        let llm = ScriptedLlm::new().reply(
            r#"{"chapters": [
                {"chapter_title": "Cells", "subtopics": ["Overview", "Nucleus"]},
                {"chapter_title": "Plants", "subtopics": ["Overview"]}
            ]}"#,
        );
        let service = service(llm).await;
        service.set_syllabus_text("Biology".to_string()).await.unwrap();
        service.extract_curriculum().await.unwrap();
        service.save_edit("Nucleus", "Text".to_string()).await.unwrap();

        let report = service.approval_report().await;
        assert!(!report.all_approved);
        assert_eq!(report.pending, vec!["Overview", "Overview"]);
        assert_eq!(report.duplicate_subtopics, vec!["Overview"]);
    }

    #[tokio::test]
    async fn test_abandoned_request_still_completes_generation() {
        let gate = Arc::new(Semaphore::new(0));
        let llm = GatedLlm {
            gate: gate.clone(),
            reply: CURRICULUM_REPLY,
        };
        let service = WorkflowService::load(
            Arc::new(InMemorySnapshotRepository::new()),
            BookGenerationService::new(llm),
        )
        .await;
        service.set_syllabus_text("Biology 101".to_string()).await.unwrap();

        // The caller gives up while the model is still working
        let abandoned =
            tokio::time::timeout(Duration::from_millis(20), service.extract_curriculum()).await;
        assert!(abandoned.is_err());
        assert_eq!(service.activity().await.curriculum.as_deref(), Some("syllabus"));

        gate.add_permits(1);
        for _ in 0..200 {
            if service.snapshot().await.curriculum().is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let state = service.snapshot().await;
        assert_eq!(state.curriculum().unwrap().chapters.len(), 2);
        assert!(service.activity().await.curriculum.is_none());
    }

    #[tokio::test]
    async fn test_content_writes_outside_curriculum_are_rejected() {
        let service = service(scripted()).await;
        let result = service.save_edit("Cell Wall", "Text".to_string()).await;
        assert!(matches!(result, Err(WorkflowError::Validation(_))));

        service.set_syllabus_text("Biology".to_string()).await.unwrap();
        service.extract_curriculum().await.unwrap();

        let result = service.save_edit("Volcanoes", "Lava".to_string()).await;
        assert!(matches!(result, Err(WorkflowError::NotFound(_))));
        let result = service.approve_content("Volcanoes").await;
        assert!(matches!(result, Err(WorkflowError::NotFound(_))));
        let result = service.ai_edit("Volcanoes", "shorter").await;
        assert!(matches!(result, Err(WorkflowError::NotFound(_))));

        assert!(service.snapshot().await.content().get("Volcanoes").is_none());
    }

    #[tokio::test]
    async fn test_failed_clear_keeps_state() {
        let service = service_with(ScriptedLlm::new(), Arc::new(StickySnapshots)).await;
        service.set_syllabus_text("Biology".to_string()).await.unwrap();

        let result = service.reset().await;
        assert!(matches!(result, Err(WorkflowError::Persistence(_))));
        assert_eq!(service.snapshot().await.syllabus_text(), "Biology");
    }
}
