//! Curriculum entity - Chapters and subtopics extracted from a syllabus

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// One chapter of the extracted curriculum
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurriculumChapter {
    pub chapter_title: String,
    pub subtopics: Vec<String>,
}

impl CurriculumChapter {
    pub fn new(chapter_title: impl Into<String>, subtopics: Vec<String>) -> Self {
        Self {
            chapter_title: chapter_title.into(),
            subtopics,
        }
    }

    /// Subtopics that come before `subtopic` in this chapter
    pub fn subtopics_before(&self, subtopic: &str) -> &[String] {
        match self.subtopics.iter().position(|s| s == subtopic) {
            Some(pos) => &self.subtopics[..pos],
            None => &[],
        }
    }
}

/// The chapter/subtopic tree produced by curriculum extraction.
///
/// Subtopic names double as keys into the content store and are not
/// namespaced by chapter. Two chapters sharing a subtopic name will share
/// its content; see [`Curriculum::duplicate_subtopics`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Curriculum {
    pub chapters: Vec<CurriculumChapter>,
}

impl Curriculum {
    pub fn new(chapters: Vec<CurriculumChapter>) -> Self {
        Self { chapters }
    }

    /// Every subtopic key in curriculum order
    pub fn subtopic_keys(&self) -> Vec<String> {
        self.chapters
            .iter()
            .flat_map(|c| c.subtopics.iter().cloned())
            .collect()
    }

    pub fn find_chapter(&self, title: &str) -> Option<&CurriculumChapter> {
        self.chapters.iter().find(|c| c.chapter_title == title)
    }

    /// First chapter listing the given subtopic
    pub fn chapter_for_subtopic(&self, subtopic: &str) -> Option<&CurriculumChapter> {
        self.chapters
            .iter()
            .find(|c| c.subtopics.iter().any(|s| s == subtopic))
    }

    /// Subtopic names that appear more than once, in first-repeat order
    pub fn duplicate_subtopics(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for key in self.chapters.iter().flat_map(|c| c.subtopics.iter()) {
            if !seen.insert(key.as_str()) && !duplicates.contains(key) {
                duplicates.push(key.clone());
            }
        }
        duplicates
    }
}
