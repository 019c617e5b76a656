use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::aggregates::WorkflowAggregate;
use crate::domain::entities::{Chapter, ContentStore, Curriculum, QuestionAnswer};
use crate::domain::value_objects::{EditorialGuidelines, WorkflowStep};

/// A wizard step with its display name.
#[derive(Debug, Serialize)]
pub struct StepInfoDto {
    pub number: u8,
    pub name: String,
}

impl From<WorkflowStep> for StepInfoDto {
    fn from(step: WorkflowStep) -> Self {
        Self {
            number: step.number(),
            name: step.display_name().to_string(),
        }
    }
}

/// Full workflow state plus the step list for rendering a stepper.
#[derive(Debug, Serialize)]
pub struct WorkflowStateDto {
    pub current_step: StepInfoDto,
    pub steps: Vec<StepInfoDto>,
    pub syllabus_text: String,
    pub curriculum: Option<Curriculum>,
    pub editorial_guidelines: EditorialGuidelines,
    pub content: ContentStore,
    pub chapters: Option<Vec<Chapter>>,
    pub questions: BTreeMap<String, Vec<QuestionAnswer>>,
    pub visuals: BTreeMap<String, String>,
}

impl From<&WorkflowAggregate> for WorkflowStateDto {
    fn from(state: &WorkflowAggregate) -> Self {
        Self {
            current_step: state.current_step().into(),
            steps: WorkflowStep::ALL.into_iter().map(StepInfoDto::from).collect(),
            syllabus_text: state.syllabus_text().to_string(),
            curriculum: state.curriculum().cloned(),
            editorial_guidelines: state.editorial_guidelines().clone(),
            content: state.content().clone(),
            chapters: state.chapters().map(<[Chapter]>::to_vec),
            questions: state.questions().clone(),
            visuals: state.visuals().clone(),
        }
    }
}

/// Request to move the wizard to another step.
#[derive(Debug, Deserialize)]
pub struct NavigationRequestDto {
    pub step: u8,
}

/// Request to store the pasted syllabus.
#[derive(Debug, Deserialize)]
pub struct SyllabusRequestDto {
    pub text: String,
}

/// Editorial guidelines as sent by the client.
#[derive(Debug, Deserialize)]
pub struct GuidelinesRequestDto {
    #[serde(default, alias = "writingStyle")]
    pub writing_style: String,
    #[serde(default, alias = "targetAudience")]
    pub target_audience: String,
}

impl From<GuidelinesRequestDto> for EditorialGuidelines {
    fn from(dto: GuidelinesRequestDto) -> Self {
        EditorialGuidelines::new(dto.writing_style, dto.target_audience)
    }
}
