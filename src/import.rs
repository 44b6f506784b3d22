mod client;
mod docx;
mod parser;
mod preview;
mod question;

pub use client::{BulkImportClient, ImportError, ImportReport, RequestError, DEFAULT_TIMEOUT_SECS};
pub use docx::{extract_docx_text, read_document, DocumentError};
pub use parser::parse_questions;
pub use preview::{ImportPreview, PreviewSummary};
pub use question::{AnswerOption, ImportPayload, InvalidReason, ParsedQuestion, Question, QuestionType};
