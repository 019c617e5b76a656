//! Prompt building functions for LLM requests
//!
//! Each generation contract has a system prompt that fixes the model's role
//! and output shape, and a builder that renders the structured input into
//! the user message.

use crate::application::services::book_generation_service::{
    ChapterRefinementInput, ContentEditInput, CurriculumExtractionInput,
    QuestionGenerationInput, SubtopicContentInput,
};

/// The five prompt contracts the wizard relies on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptTemplate {
    CurriculumExtraction,
    SubtopicContent,
    ChapterRefinement,
    ContentEdit,
    QuestionGeneration,
}

impl PromptTemplate {
    pub fn name(&self) -> &'static str {
        match self {
            PromptTemplate::CurriculumExtraction => "curriculum_extraction",
            PromptTemplate::SubtopicContent => "subtopic_content",
            PromptTemplate::ChapterRefinement => "chapter_refinement",
            PromptTemplate::ContentEdit => "content_edit",
            PromptTemplate::QuestionGeneration => "question_generation",
        }
    }

    /// Declared output shape, quoted verbatim to the model
    pub fn output_shape(&self) -> &'static str {
        match self {
            PromptTemplate::CurriculumExtraction => {
                r#"{"chapters": [{"chapter_title": "string", "subtopics": ["string"]}]}"#
            }
            PromptTemplate::SubtopicContent => r#"{"content": "string"}"#,
            PromptTemplate::ChapterRefinement => {
                r#"{"refinedContent": "string", "summary": "string"}"#
            }
            PromptTemplate::ContentEdit => r#"{"editedContent": "string"}"#,
            PromptTemplate::QuestionGeneration => {
                r#"{"questions": [{"question": "string", "answer": "string"}]}"#
            }
        }
    }

    pub fn system_prompt(&self) -> String {
        let role = match self {
            PromptTemplate::CurriculumExtraction => {
                "You are an expert curriculum designer specializing in science education."
            }
            PromptTemplate::SubtopicContent => {
                "You are an expert science educator writing one section of a textbook chapter."
            }
            PromptTemplate::ChapterRefinement => "You are a book editor.",
            PromptTemplate::ContentEdit => {
                "You are a careful textbook editor who revises text exactly as instructed."
            }
            PromptTemplate::QuestionGeneration => {
                "You are an experienced teacher writing practice questions with an answer key."
            }
        };
        format!(
            "{}\n\nRespond with a single JSON object and nothing else, matching this shape:\n{}\n",
            role,
            self.output_shape()
        )
    }
}

impl std::fmt::Display for PromptTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

pub fn build_curriculum_prompt(input: &CurriculumExtractionInput) -> String {
    format!(
        "You will receive the content of a science syllabus and extract the chapters and their subtopics.\n\n\
         Syllabus Content: {}\n\n\
         Return the curriculum structure as an array of chapters. Each chapter should have a title \
         and a list of its subtopics. Subtopic names must be unique across the whole curriculum.\n",
        input.syllabus_text
    )
}

pub fn build_subtopic_prompt(input: &SubtopicContentInput) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!("CHAPTER: {}\n", input.chapter_title));
    prompt.push_str(&format!("SUBTOPIC TO WRITE: {}\n", input.subtopic));
    prompt.push_str(&format!(
        "EDITORIAL GUIDELINES: {}\n\n",
        input.editorial_guidelines
    ));

    // Earlier sections of the same chapter, for continuity
    if !input.prior_subtopics.is_empty() {
        prompt.push_str("EARLIER SECTIONS OF THIS CHAPTER:\n");
        for prior in &input.prior_subtopics {
            prompt.push_str(&format!("---\n### {}\n", prior.sub_topic));
            if prior.content.trim().is_empty() {
                prompt.push_str("(not written yet)\n");
            } else {
                prompt.push_str(&format!("{}\n", prior.content));
            }
        }
        prompt.push_str("---\n\n");
        prompt.push_str(
            "Continue naturally from the earlier sections. Do not repeat their material \
             and do not re-introduce the chapter.\n",
        );
    }

    prompt.push_str(
        "Generate age-appropriate educational content for this subtopic. \
         Include key concepts and concrete examples.\n",
    );
    prompt
}

pub fn build_refinement_prompt(input: &ChapterRefinementInput) -> String {
    let mut prompt = String::new();

    prompt.push_str(
        "Your task is to take the raw content for a chapter, which is divided into subtopics, \
         and refine it into a single, cohesive chapter.\n\n",
    );
    prompt.push_str(&format!("**Chapter Title:** {}\n\n", input.chapter_title));
    prompt.push_str(&format!(
        "**Editorial Guidelines:** {}\n\n",
        input.editorial_guidelines
    ));
    prompt.push_str("**Raw Content (Subtopic by Subtopic):**\n");
    for subtopic in &input.subtopics {
        prompt.push_str(&format!(
            "---\n### {}\n{}\n",
            subtopic.sub_topic, subtopic.content
        ));
    }
    prompt.push_str("---\n\n");

    prompt.push_str(
        r#"**Your Instructions:**
1. Create a cohesive narrative: rewrite the raw content to flow seamlessly from one subtopic to the next. Remove awkward greetings or transitions.
2. Maintain tone: the whole chapter must follow the editorial guidelines.
3. Add a summary: provide a concise summary of the key learning points.
4. Format output: a JSON object with the keys "refinedContent" and "summary".
"#,
    );
    prompt
}

pub fn build_edit_prompt(input: &ContentEditInput) -> String {
    format!(
        "Revise the content below according to the instruction. Keep everything the instruction \
         does not ask you to change.\n\n\
         INSTRUCTION: {}\n\n\
         ORIGINAL CONTENT:\n{}\n",
        input.instruction, input.original_content
    )
}

pub fn build_questions_prompt(input: &QuestionGenerationInput) -> String {
    format!(
        "Write practice questions, each with a model answer, that check understanding of the \
         chapter below. Cover its key concepts and vary the difficulty.\n\n\
         TOPIC: {}\n\n\
         CHAPTER CONTENT:\n{}\n",
        input.topic, input.content
    )
}
