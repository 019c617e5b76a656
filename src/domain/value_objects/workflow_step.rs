//! Workflow steps - The seven linear stages from syllabus to exported book

use serde::{Deserialize, Serialize};

/// A stage of the book creation wizard.
///
/// Steps are numbered 1..=7 and serialize as their number so snapshots stay
/// compact and readable by any front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum WorkflowStep {
    CurriculumStructure = 1,
    EditorialGuidelines = 2,
    ContentGeneration = 3,
    ChapterReview = 4,
    PracticeQuestions = 5,
    VisualPlanning = 6,
    Export = 7,
}

impl WorkflowStep {
    pub const FIRST: WorkflowStep = WorkflowStep::CurriculumStructure;

    /// All steps in order
    pub const ALL: [WorkflowStep; 7] = [
        WorkflowStep::CurriculumStructure,
        WorkflowStep::EditorialGuidelines,
        WorkflowStep::ContentGeneration,
        WorkflowStep::ChapterReview,
        WorkflowStep::PracticeQuestions,
        WorkflowStep::VisualPlanning,
        WorkflowStep::Export,
    ];

    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.get(usize::from(number).checked_sub(1)?).copied()
    }

    pub fn number(self) -> u8 {
        self as u8
    }

    /// The step directly after this one, if any
    pub fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            WorkflowStep::CurriculumStructure => "Curriculum Structure",
            WorkflowStep::EditorialGuidelines => "Editorial Guidelines",
            WorkflowStep::ContentGeneration => "Content Generation",
            WorkflowStep::ChapterReview => "Chapter Review",
            WorkflowStep::PracticeQuestions => "Practice Questions",
            WorkflowStep::VisualPlanning => "Visual Planning",
            WorkflowStep::Export => "Review & Export",
        }
    }
}

impl Default for WorkflowStep {
    fn default() -> Self {
        Self::FIRST
    }
}

impl std::fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.number(), self.display_name())
    }
}

impl From<WorkflowStep> for u8 {
    fn from(step: WorkflowStep) -> Self {
        step.number()
    }
}

impl TryFrom<u8> for WorkflowStep {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_number(value).ok_or_else(|| format!("workflow step out of range: {}", value))
    }
}

/// Outcome of a navigation request against the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepTransition {
    Moved { from: WorkflowStep, to: WorkflowStep },
    Unchanged,
}

impl StepTransition {
    pub fn moved(&self) -> bool {
        matches!(self, StepTransition::Moved { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_numbers_round_trip() {
        for step in WorkflowStep::ALL {
            assert_eq!(WorkflowStep::from_number(step.number()), Some(step));
        }
        assert_eq!(WorkflowStep::from_number(0), None);
        assert_eq!(WorkflowStep::from_number(8), None);
    }

    #[test]
    fn test_next_stops_at_export() {
        assert_eq!(
            WorkflowStep::ContentGeneration.next(),
            Some(WorkflowStep::ChapterReview)
        );
        assert_eq!(WorkflowStep::Export.next(), None);
    }

    #[test]
    fn test_serializes_as_number() {
        let json = serde_json::to_string(&WorkflowStep::ChapterReview).unwrap();
        assert_eq!(json, "4");

        let step: WorkflowStep = serde_json::from_str("7").unwrap();
        assert_eq!(step, WorkflowStep::Export);

        assert!(serde_json::from_str::<WorkflowStep>("9").is_err());
    }
}
