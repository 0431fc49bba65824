//! Dataset de perguntas e respostas de referência.

mod source;

pub use source::{CsvQuestionSource, Question, QuestionSource};
