//! Book Generation Service - Structured calls to the language model
//!
//! Each of the five generation contracts takes a typed input, renders it
//! through [`prompt_builder`](super::llm::prompt_builder), asks the model for
//! a JSON object and parses that object into a typed output. The service
//! never touches workflow state; callers decide what to store.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::application::ports::outbound::{ChatMessage, LlmPort, LlmRequest};
use crate::application::services::llm::prompt_builder::{
    build_curriculum_prompt, build_edit_prompt, build_questions_prompt, build_refinement_prompt,
    build_subtopic_prompt, PromptTemplate,
};
use crate::domain::entities::{Curriculum, CurriculumChapter, QuestionAnswer};

const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Input for curriculum extraction
#[derive(Debug, Clone)]
pub struct CurriculumExtractionInput {
    pub syllabus_text: String,
}

/// A subtopic name with whatever content it currently has
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtopicDraft {
    pub sub_topic: String,
    pub content: String,
}

impl SubtopicDraft {
    pub fn new(sub_topic: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            sub_topic: sub_topic.into(),
            content: content.into(),
        }
    }
}

/// Input for generating one subtopic's content
#[derive(Debug, Clone)]
pub struct SubtopicContentInput {
    pub chapter_title: String,
    pub subtopic: String,
    /// Subtopics that precede this one in the same chapter
    pub prior_subtopics: Vec<SubtopicDraft>,
    pub editorial_guidelines: String,
}

/// Input for merging a chapter's subtopics into one polished chapter
#[derive(Debug, Clone)]
pub struct ChapterRefinementInput {
    pub chapter_title: String,
    pub subtopics: Vec<SubtopicDraft>,
    pub editorial_guidelines: String,
}

/// Input for a free-text AI edit
#[derive(Debug, Clone)]
pub struct ContentEditInput {
    pub original_content: String,
    pub instruction: String,
}

/// Input for practice question generation
#[derive(Debug, Clone)]
pub struct QuestionGenerationInput {
    pub content: String,
    pub topic: String,
}

#[derive(Debug, Deserialize)]
struct CurriculumExtractionOutput {
    chapters: Vec<CurriculumChapter>,
}

#[derive(Debug, Deserialize)]
struct SubtopicContentOutput {
    content: String,
}

/// Refined chapter prose plus its summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterRefinementOutput {
    #[serde(rename = "refinedContent", alias = "refined_content")]
    pub refined_content: String,
    pub summary: String,
}

#[derive(Debug, Deserialize)]
struct ContentEditOutput {
    #[serde(rename = "editedContent", alias = "edited_content")]
    edited_content: String,
}

#[derive(Debug, Deserialize)]
struct QuestionGenerationOutput {
    questions: Vec<QuestionAnswer>,
}

/// Service for the wizard's structured generation calls
pub struct BookGenerationService<L: LlmPort> {
    llm: L,
    temperature: f32,
}

impl<L: LlmPort> BookGenerationService<L> {
    /// Create a new generation service with the provided client
    pub fn new(llm: L) -> Self {
        Self {
            llm,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Extract chapters and subtopics from pasted syllabus text
    #[instrument(skip(self, input))]
    pub async fn extract_curriculum(
        &self,
        input: &CurriculumExtractionInput,
    ) -> Result<Curriculum, GenerationError> {
        if input.syllabus_text.trim().is_empty() {
            return Err(GenerationError::InvalidRequest(
                "Syllabus text is empty".to_string(),
            ));
        }

        let output: CurriculumExtractionOutput = self
            .run(
                PromptTemplate::CurriculumExtraction,
                build_curriculum_prompt(input),
            )
            .await?;

        let chapters: Vec<CurriculumChapter> = output
            .chapters
            .into_iter()
            .filter(|c| !c.chapter_title.trim().is_empty())
            .collect();
        if chapters.is_empty() {
            return Err(GenerationError::ParseError(
                "Model returned no chapters".to_string(),
            ));
        }
        Ok(Curriculum::new(chapters))
    }

    /// Write the content for a single subtopic
    #[instrument(skip(self, input), fields(subtopic = %input.subtopic))]
    pub async fn generate_subtopic_content(
        &self,
        input: &SubtopicContentInput,
    ) -> Result<String, GenerationError> {
        if input.subtopic.trim().is_empty() {
            return Err(GenerationError::InvalidRequest(
                "Subtopic name is empty".to_string(),
            ));
        }

        let output: SubtopicContentOutput = self
            .run(PromptTemplate::SubtopicContent, build_subtopic_prompt(input))
            .await?;
        non_empty(output.content, "content")
    }

    /// Merge a chapter's subtopic drafts into one cohesive chapter
    #[instrument(skip(self, input), fields(chapter = %input.chapter_title))]
    pub async fn refine_chapter(
        &self,
        input: &ChapterRefinementInput,
    ) -> Result<ChapterRefinementOutput, GenerationError> {
        let output: ChapterRefinementOutput = self
            .run(
                PromptTemplate::ChapterRefinement,
                build_refinement_prompt(input),
            )
            .await?;
        let refined_content = non_empty(output.refined_content, "refinedContent")?;
        Ok(ChapterRefinementOutput {
            refined_content,
            summary: output.summary.trim().to_string(),
        })
    }

    /// Rewrite existing content according to a free-text instruction
    #[instrument(skip(self, input))]
    pub async fn edit_content(&self, input: &ContentEditInput) -> Result<String, GenerationError> {
        if input.instruction.trim().is_empty() {
            return Err(GenerationError::InvalidRequest(
                "Edit instruction is empty".to_string(),
            ));
        }

        let output: ContentEditOutput = self
            .run(PromptTemplate::ContentEdit, build_edit_prompt(input))
            .await?;
        non_empty(output.edited_content, "editedContent")
    }

    /// Generate question/answer pairs for a chapter
    #[instrument(skip(self, input), fields(topic = %input.topic))]
    pub async fn generate_questions(
        &self,
        input: &QuestionGenerationInput,
    ) -> Result<Vec<QuestionAnswer>, GenerationError> {
        if input.content.trim().is_empty() {
            return Err(GenerationError::InvalidRequest(
                "Chapter content is empty".to_string(),
            ));
        }

        let output: QuestionGenerationOutput = self
            .run(
                PromptTemplate::QuestionGeneration,
                build_questions_prompt(input),
            )
            .await?;

        let questions: Vec<QuestionAnswer> = output
            .questions
            .into_iter()
            .filter(|qa| !qa.question.trim().is_empty())
            .collect();
        if questions.is_empty() {
            return Err(GenerationError::ParseError(
                "Model returned no questions".to_string(),
            ));
        }
        Ok(questions)
    }

    /// Send one templated prompt and parse the JSON reply into `T`
    async fn run<T: DeserializeOwned>(
        &self,
        template: PromptTemplate,
        prompt: String,
    ) -> Result<T, GenerationError> {
        let request = LlmRequest::new(vec![ChatMessage::user(prompt)])
            .with_system_prompt(template.system_prompt())
            .with_temperature(self.temperature)
            .with_json_output();

        let response = self.llm.generate(request).await.map_err(|e| {
            error!(template = %template, "LLM call failed: {}", e);
            GenerationError::LlmError(e.to_string())
        })?;
        debug!(
            template = %template,
            model = %response.model,
            tokens = response.tokens_used,
            "LLM call completed"
        );

        parse_json_output(&response.content).map_err(|e| {
            error!(template = %template, "Could not parse model output: {}", e);
            e
        })
    }
}

/// Parse the first JSON object found in a model reply.
///
/// Models often wrap JSON in code fences or add a sentence before it, so the
/// reply is scanned for the first balanced `{...}` block.
pub fn parse_json_output<T: DeserializeOwned>(text: &str) -> Result<T, GenerationError> {
    let json = extract_json_object(text).ok_or_else(|| {
        GenerationError::ParseError("No JSON object found in model output".to_string())
    })?;
    serde_json::from_str(json).map_err(|e| GenerationError::ParseError(e.to_string()))
}

fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

fn non_empty(value: String, field: &str) -> Result<String, GenerationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(GenerationError::ParseError(format!(
            "Model returned an empty \"{}\"",
            field
        )));
    }
    Ok(trimmed.to_string())
}

/// Errors that can occur in the generation service
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Error from the underlying LLM client
    #[error("LLM error: {0}")]
    LlmError(String),
    /// Error parsing the LLM response
    #[error("Parse error: {0}")]
    ParseError(String),
    /// Invalid request, rejected before calling the model
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}
