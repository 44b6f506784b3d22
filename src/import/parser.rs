use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, trace};

use super::question::{AnswerOption, ParsedQuestion, Question, QuestionType};

static QUESTION_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([0-9]+)[.)]\s*(.*)$").unwrap());
static OPTION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\*)?\s*([a-eA-E])[.)]\s*(.*)$").unwrap());
static ESSAY_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*\(essay\)\s*$").unwrap());

#[derive(Debug, Default)]
struct OpenQuestion {
    text: String,
    essay: bool,
    options: Vec<AnswerOption>,
}

impl OpenQuestion {
    fn start(text: &str) -> Self {
        let text = text.trim();
        let essay = ESSAY_MARKER.is_match(text);
        let text = if essay {
            ESSAY_MARKER.replace(text, "").trim().to_string()
        } else {
            text.to_string()
        };
        Self {
            text,
            essay,
            options: vec![],
        }
    }

    fn push_text(&mut self, line: &str) {
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(line);
    }

    fn finish(self, points: u32) -> Option<ParsedQuestion> {
        if self.text.is_empty() {
            trace!("discarding question with no text");
            return None;
        }
        // no options and no marker still reads as an open-ended question
        let question_type = if self.essay || self.options.is_empty() {
            QuestionType::Essay
        } else {
            QuestionType::MultipleChoice
        };
        Some(ParsedQuestion::new(Question {
            question_text: self.text,
            question_type,
            points,
            options: self.options,
        }))
    }
}

/// Parses numbered questions with lettered options out of free text.
///
/// ```text
/// 1. Apa ibu kota Indonesia?
/// a. Surabaya
/// *b. Jakarta
///
/// 2. Jelaskan proses fotosintesis! (essay)
/// ```
///
/// `*` before an option marks it correct. `(essay)` at the end of a question
/// line makes it an essay, and so does a question with no options. Lines before the first question are dropped and
/// any other line continues the current question's text.
pub fn parse_questions(text: &str, default_points: u32) -> Vec<ParsedQuestion> {
    let mut parsed = Vec::new();
    let mut current: Option<OpenQuestion> = None;

    for (index, raw) in text.split('\n').enumerate() {
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        if let Some(caps) = QUESTION_START.captures(line) {
            if let Some(done) = current.take().and_then(|q| q.finish(default_points)) {
                parsed.push(done);
            }
            current = Some(OpenQuestion::start(&caps[2]));
            continue;
        }

        let Some(open) = current.as_mut() else {
            trace!(line = index + 1, "skipping text before first question");
            continue;
        };

        match OPTION_LINE.captures(line) {
            Some(caps) if !caps[3].trim().is_empty() => {
                if open.essay {
                    debug!(line = index + 1, "ignoring option under essay question");
                    continue;
                }
                open.options.push(AnswerOption {
                    text: caps[3].trim().to_string(),
                    is_correct: caps.get(1).is_some(),
                });
            }
            // a bare "b." has no answer text and stays part of the prompt
            _ => open.push_text(line.trim()),
        }
    }

    if let Some(done) = current.and_then(|q| q.finish(default_points)) {
        parsed.push(done);
    }

    debug!(
        questions = parsed.len(),
        invalid = parsed.iter().filter(|q| !q.is_valid()).count(),
        "parsed question text"
    );
    parsed
}
