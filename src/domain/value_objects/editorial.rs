//! Editorial guidelines - Tone and audience direction for every generation call

use serde::{Deserialize, Serialize};

/// Style direction supplied by the author in step 2
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorialGuidelines {
    pub writing_style: String,
    pub target_audience: String,
}

impl EditorialGuidelines {
    pub fn new(writing_style: impl Into<String>, target_audience: impl Into<String>) -> Self {
        Self {
            writing_style: writing_style.into(),
            target_audience: target_audience.into(),
        }
    }

    /// Single-line rendering passed to the language model
    pub fn formatted(&self) -> String {
        format!(
            "Target Audience: {}. Writing Style: {}",
            self.target_audience, self.writing_style
        )
    }

    pub fn is_blank(&self) -> bool {
        self.writing_style.trim().is_empty() && self.target_audience.trim().is_empty()
    }
}
