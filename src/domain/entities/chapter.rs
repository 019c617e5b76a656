//! Chapter entity - A refined, book-ready chapter and its practice questions

use serde::{Deserialize, Serialize};

/// A chapter after its subtopic drafts have been merged and polished
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub title: String,
    /// Subtopics covered, carried over from the curriculum
    #[serde(default)]
    pub subtopics: Vec<String>,
    /// Refined chapter prose
    pub description: String,
    pub learning_objectives: Vec<String>,
}

impl Chapter {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtopics: Vec::new(),
            description: description.into(),
            learning_objectives: Vec::new(),
        }
    }

    pub fn with_subtopics(mut self, subtopics: Vec<String>) -> Self {
        self.subtopics = subtopics;
        self
    }

    pub fn with_learning_objective(mut self, objective: impl Into<String>) -> Self {
        self.learning_objectives.push(objective.into());
        self
    }
}

/// A practice question and its answer key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionAnswer {
    pub question: String,
    pub answer: String,
}

impl QuestionAnswer {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}
