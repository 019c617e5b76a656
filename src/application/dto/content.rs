use serde::Deserialize;

/// Manual edit of a subtopic's content; saving also approves it.
#[derive(Debug, Deserialize)]
pub struct EditContentRequestDto {
    pub content: String,
}

/// Free-text instruction for an AI edit.
#[derive(Debug, Deserialize)]
pub struct AiEditRequestDto {
    pub instruction: String,
}

/// Visual planning notes for one chapter.
#[derive(Debug, Deserialize)]
pub struct VisualsRequestDto {
    #[serde(default)]
    pub notes: String,
}
