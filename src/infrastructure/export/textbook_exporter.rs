use std::str::FromStr;

use crate::domain::aggregates::WorkflowAggregate;
use crate::domain::entities::{Chapter, QuestionAnswer};

/// Download format for the finished textbook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Markdown,
    Html,
    Text,
}

impl ExportFormat {
    pub fn file_name(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "textbook.md",
            ExportFormat::Html => "textbook.html",
            ExportFormat::Text => "textbook.txt",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "text/markdown",
            ExportFormat::Html => "text/html",
            ExportFormat::Text => "text/plain",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "md" | "markdown" => Ok(ExportFormat::Markdown),
            "html" => Ok(ExportFormat::Html),
            "txt" | "text" => Ok(ExportFormat::Text),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Unknown export format: {0}")]
    UnknownFormat(String),
    #[error("No refined chapters to export yet")]
    NothingToExport,
}

/// A chapter with the per-chapter extras looked up by title
struct ChapterView<'a> {
    number: usize,
    chapter: &'a Chapter,
    questions: &'a [QuestionAnswer],
    visuals: &'a str,
}

/// Renders refined chapters into Markdown, HTML or plain text
#[derive(Debug, Clone)]
pub struct TextbookExporter {
    book_title: String,
}

impl TextbookExporter {
    pub fn new(book_title: impl Into<String>) -> Self {
        Self {
            book_title: book_title.into(),
        }
    }

    /// Render the workflow's refined chapters in `format`
    pub fn export(
        &self,
        state: &WorkflowAggregate,
        format: ExportFormat,
    ) -> Result<String, ExportError> {
        let chapters = state.chapters().ok_or(ExportError::NothingToExport)?;
        let views: Vec<ChapterView<'_>> = chapters
            .iter()
            .enumerate()
            .map(|(index, chapter)| ChapterView {
                number: index + 1,
                chapter,
                questions: state.questions_for(&chapter.title).unwrap_or_default(),
                visuals: state.visuals_for(&chapter.title).unwrap_or_default(),
            })
            .collect();

        Ok(match format {
            ExportFormat::Markdown => self.render_markdown(&views),
            ExportFormat::Html => self.render_html(&views),
            ExportFormat::Text => self.render_text(&views),
        })
    }

    fn render_markdown(&self, chapters: &[ChapterView<'_>]) -> String {
        let mut out = format!("# {}\n\n", self.book_title);

        for view in chapters {
            let chapter = view.chapter;
            out.push_str(&format!("## Chapter {}: {}\n\n", view.number, chapter.title));

            out.push_str("### Subtopics\n\n");
            for subtopic in &chapter.subtopics {
                out.push_str(&format!("- {}\n", subtopic));
            }
            out.push_str(&format!("\n### Content\n\n{}\n\n", chapter.description));

            if !chapter.learning_objectives.is_empty() {
                out.push_str("### Summary\n\n");
                for objective in &chapter.learning_objectives {
                    out.push_str(&format!("{}\n\n", objective));
                }
            }

            if !view.questions.is_empty() {
                out.push_str("### Practice Questions\n\n");
                for (i, qa) in view.questions.iter().enumerate() {
                    out.push_str(&format!("{}. **Q:** {}\n", i + 1, qa.question));
                    out.push_str(&format!("   **A:** {}\n\n", qa.answer));
                }
            }

            if !view.visuals.is_empty() {
                out.push_str(&format!("### Visual Planning Notes\n\n{}\n\n", view.visuals));
            }
            out.push_str("---\n\n");
        }
        out
    }

    /// Content is interpolated as-is; only newlines are converted.
    fn render_html(&self, chapters: &[ChapterView<'_>]) -> String {
        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
        out.push_str("<meta charset=\"UTF-8\">\n");
        out.push_str(
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
        );
        out.push_str(&format!("<title>{}</title>\n", self.book_title));
        out.push_str(
            "<style>\n\
             body { font-family: sans-serif; line-height: 1.6; padding: 2em; }\n\
             h1, h2, h3 { color: #008080; }\n\
             pre { background-color: #f0f0f0; padding: 1em; white-space: pre-wrap; }\n\
             </style>\n",
        );
        out.push_str("</head>\n<body>\n");
        out.push_str(&format!("<h1>{}</h1>\n", self.book_title));

        for view in chapters {
            let chapter = view.chapter;
            out.push_str(&format!("<h2>Chapter {}: {}</h2>", view.number, chapter.title));

            out.push_str("<h3>Subtopics</h3><ul>");
            for subtopic in &chapter.subtopics {
                out.push_str(&format!("<li>{}</li>", subtopic));
            }
            out.push_str("</ul>");
            out.push_str(&format!(
                "<h3>Content</h3><div>{}</div>",
                line_breaks(&chapter.description)
            ));

            if !chapter.learning_objectives.is_empty() {
                out.push_str("<h3>Summary</h3>");
                for objective in &chapter.learning_objectives {
                    out.push_str(&format!("<p>{}</p>", line_breaks(objective)));
                }
            }

            if !view.questions.is_empty() {
                out.push_str("<h3>Practice Questions</h3>");
                for qa in view.questions {
                    out.push_str(&format!(
                        "<p><strong>Q:</strong> {}<br><strong>A:</strong> {}</p>",
                        qa.question, qa.answer
                    ));
                }
            }

            if !view.visuals.is_empty() {
                out.push_str(&format!(
                    "<h3>Visual Planning Notes</h3><pre>{}</pre>",
                    view.visuals
                ));
            }
            out.push_str("<hr>\n");
        }

        out.push_str("</body>\n</html>\n");
        out
    }

    fn render_text(&self, chapters: &[ChapterView<'_>]) -> String {
        let mut out = format!("{}\n\n", self.book_title);

        for view in chapters {
            let chapter = view.chapter;
            out.push_str(&format!("Chapter {}: {}\n\n", view.number, chapter.title));

            out.push_str("Subtopics:\n");
            for subtopic in &chapter.subtopics {
                out.push_str(&format!("- {}\n", subtopic));
            }
            out.push_str(&format!("\nContent:\n{}\n\n", chapter.description));

            if !chapter.learning_objectives.is_empty() {
                out.push_str(&format!(
                    "Summary:\n{}\n\n",
                    chapter.learning_objectives.join("\n")
                ));
            }

            if !view.questions.is_empty() {
                out.push_str("Practice Questions:\n");
                for qa in view.questions {
                    out.push_str(&format!("Q: {}\nA: {}\n\n", qa.question, qa.answer));
                }
            }

            if !view.visuals.is_empty() {
                out.push_str(&format!("Visual Planning Notes:\n{}\n\n", view.visuals));
            }
            out.push_str(&"-".repeat(40));
            out.push_str("\n\n");
        }
        out
    }
}

fn line_breaks(text: &str) -> String {
    text.replace('\n', "<br>")
}
