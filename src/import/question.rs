use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionType {
    #[serde(rename = "multiple_choice")]
    MultipleChoice,
    #[serde(rename = "essay")]
    Essay,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub text: String,
    pub is_correct: bool,
}

/// A question in the shape the bulk import endpoint accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// prompt text, continuation lines joined with single spaces
    pub question_text: String,

    pub question_type: QuestionType,

    /// same for every question of one parse run
    pub points: u32,

    /// answer choices in source order, empty for essays
    pub options: Vec<AnswerOption>,
}

impl Question {
    pub fn correct_count(&self) -> usize {
        self.options.iter().filter(|o| o.is_correct).count()
    }

    /// Checks a question against the import rules. Essays always pass.
    pub fn validate(&self) -> Result<(), InvalidReason> {
        if matches!(self.question_type, QuestionType::Essay) {
            return Ok(());
        }
        if self.options.len() < 2 {
            return Err(InvalidReason::TooFewOptions);
        }
        if self.correct_count() == 0 {
            return Err(InvalidReason::NoCorrectAnswer);
        }
        Ok(())
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    #[error("no correct answer marked (flag with * before an option)")]
    NoCorrectAnswer,

    #[error("minimum two answer options")]
    TooFewOptions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedQuestion {
    Valid(Question),
    Invalid {
        question: Question,
        reason: InvalidReason,
    },
}

impl ParsedQuestion {
    pub fn new(question: Question) -> Self {
        match question.validate() {
            Ok(()) => ParsedQuestion::Valid(question),
            Err(reason) => ParsedQuestion::Invalid { question, reason },
        }
    }

    pub fn question(&self) -> &Question {
        match self {
            ParsedQuestion::Valid(q) => q,
            ParsedQuestion::Invalid { question, .. } => question,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ParsedQuestion::Valid(_))
    }

    pub fn error(&self) -> Option<String> {
        match self {
            ParsedQuestion::Valid(_) => None,
            ParsedQuestion::Invalid { reason, .. } => Some(reason.to_string()),
        }
    }
}

#[derive(Serialize)]
struct PreviewRow<'a> {
    #[serde(flatten)]
    question: &'a Question,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

// preview output carries `valid` and `error` next to the question fields
impl Serialize for ParsedQuestion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        PreviewRow {
            question: self.question(),
            valid: self.is_valid(),
            error: self.error(),
        }
        .serialize(serializer)
    }
}

#[derive(Serialize, Debug)]
pub struct ImportPayload<'a> {
    pub questions: &'a [&'a Question],
}
