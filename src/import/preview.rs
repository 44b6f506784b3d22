use serde::Serialize;

use super::parser::parse_questions;
use super::question::{ParsedQuestion, Question};

/// Parsed questions waiting for review before they are sent off.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ImportPreview {
    rows: Vec<ParsedQuestion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PreviewSummary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
}

impl ImportPreview {
    pub fn parse(text: &str, default_points: u32) -> Self {
        Self {
            rows: parse_questions(text, default_points),
        }
    }

    pub fn rows(&self) -> &[ParsedQuestion] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Drops the row at `index`, shifting later rows down.
    pub fn remove(&mut self, index: usize) -> Option<ParsedQuestion> {
        (index < self.rows.len()).then(|| self.rows.remove(index))
    }

    /// Drops every listed row, indexes refer to positions before any removal.
    pub fn remove_many(&mut self, indexes: &[usize]) -> usize {
        let before = self.rows.len();
        let mut position = 0;
        self.rows.retain(|_| {
            let keep = !indexes.contains(&position);
            position += 1;
            keep
        });
        before - self.rows.len()
    }

    pub fn valid_questions(&self) -> Vec<&Question> {
        self.rows
            .iter()
            .filter_map(|row| match row {
                ParsedQuestion::Valid(q) => Some(q),
                ParsedQuestion::Invalid { .. } => None,
            })
            .collect()
    }

    pub fn summary(&self) -> PreviewSummary {
        let valid = self.rows.iter().filter(|r| r.is_valid()).count();
        PreviewSummary {
            total: self.rows.len(),
            valid,
            invalid: self.rows.len() - valid,
        }
    }
}
