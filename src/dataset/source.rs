//! Fonte de perguntas baseada em CSV.

use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::types::config::DatasetConfig;
use crate::{QaCacheError, QaCacheResult};

/// Uma pergunta do dataset com a resposta de referência.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Question {
    /// ID original no dataset.
    pub id: String,

    /// Texto da pergunta (chave do cache).
    pub text: String,

    /// Título da pergunta.
    pub title: String,

    /// Melhor resposta registrada no dataset.
    pub best_answer: String,
}

impl Question {
    /// Cria uma nova pergunta.
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        best_answer: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            title: String::new(),
            best_answer: best_answer.into(),
        }
    }

    /// Define o título.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

/// Fonte de perguntas amostradas de um corpus fixo.
///
/// Pode ser chamada indefinidamente e nunca falha depois de carregada.
pub trait QuestionSource: Send {
    /// Sorteia a próxima pergunta (com reposição).
    fn next_question(&mut self) -> Question;

    /// Tamanho do corpus.
    fn len(&self) -> usize;

    /// Verifica se o corpus está vazio.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Corpus carregado de um CSV sem cabeçalho.
///
/// Colunas, nesta ordem: `question_id`, `question_text`,
/// `question_title`, `best_answer_text`.
pub struct CsvQuestionSource {
    questions: Vec<Question>,
    rng: StdRng,
}

impl CsvQuestionSource {
    /// Carrega o dataset de um arquivo.
    pub fn load<P: AsRef<Path>>(path: P) -> QaCacheResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let questions = Self::parse(&content)?;

        if questions.is_empty() {
            return Err(QaCacheError::EmptyDataset(path.display().to_string()));
        }

        tracing::info!(
            "Dataset carregado: {} perguntas de {}",
            questions.len(),
            path.display()
        );

        Ok(Self {
            questions,
            rng: StdRng::from_entropy(),
        })
    }

    /// Carrega o dataset usando a configuração do TOML.
    pub fn from_config(config: &DatasetConfig) -> QaCacheResult<Self> {
        let source = Self::load(&config.path)?;
        Ok(match config.seed {
            Some(seed) => source.with_seed(seed),
            None => source,
        })
    }

    /// Cria um corpus em memória.
    pub fn from_questions(questions: Vec<Question>) -> QaCacheResult<Self> {
        if questions.is_empty() {
            return Err(QaCacheError::EmptyDataset("<memória>".to_string()));
        }

        Ok(Self {
            questions,
            rng: StdRng::from_entropy(),
        })
    }

    /// Fixa a semente do sorteio.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Todas as perguntas do corpus.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    fn parse(content: &str) -> QaCacheResult<Vec<Question>> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes());

        let mut questions = Vec::new();
        let mut skipped = 0usize;

        for record in reader.records() {
            let record = record?;
            let field = |i: usize| record.get(i).unwrap_or_default().to_string();

            let text = field(1);
            if text.trim().is_empty() {
                skipped += 1;
                continue;
            }

            questions.push(Question {
                id: field(0),
                text,
                title: field(2),
                best_answer: field(3),
            });
        }

        if skipped > 0 {
            tracing::warn!("{} linhas sem texto de pergunta ignoradas", skipped);
        }

        Ok(questions)
    }
}

impl QuestionSource for CsvQuestionSource {
    fn next_question(&mut self) -> Question {
        self.questions
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_else(|| Question::new("", "", ""))
    }

    fn len(&self) -> usize {
        self.questions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::tempdir;

    fn sample_questions() -> Vec<Question> {
        (0..5)
            .map(|i| Question::new(i.to_string(), format!("pergunta {}", i), "resposta"))
            .collect()
    }

    #[test]
    fn test_load_csv_with_bom_and_quotes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.csv");
        std::fs::write(
            &path,
            "\u{feff}1,\"What is Rust?\",Rust,\"A systems language, fast and safe\"\n\
             2,\"Multi\nline?\",Title,Answer\n",
        )
        .unwrap();

        let source = CsvQuestionSource::load(&path).unwrap();
        assert_eq!(source.len(), 2);

        let first = &source.questions()[0];
        assert_eq!(first.id, "1");
        assert_eq!(first.text, "What is Rust?");
        assert_eq!(first.title, "Rust");
        assert_eq!(first.best_answer, "A systems language, fast and safe");
        assert_eq!(source.questions()[1].text, "Multi\nline?");
    }

    #[test]
    fn test_short_rows_and_blank_questions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.csv");
        std::fs::write(&path, "1,Only question\n2,,title,answer\n").unwrap();

        let source = CsvQuestionSource::load(&path).unwrap();
        assert_eq!(source.len(), 1);
        assert_eq!(source.questions()[0].best_answer, "");
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        std::fs::write(&path, "").unwrap();

        let result = CsvQuestionSource::load(&path);
        assert!(matches!(result, Err(QaCacheError::EmptyDataset(_))));
        assert!(CsvQuestionSource::from_questions(vec![]).is_err());
    }

    #[test]
    fn test_missing_file() {
        let result = CsvQuestionSource::load("/nao/existe.csv");
        assert!(matches!(result, Err(QaCacheError::Io(_))));
    }

    #[test]
    fn test_seeded_sampling_is_reproducible() {
        let mut a = CsvQuestionSource::from_questions(sample_questions())
            .unwrap()
            .with_seed(42);
        let mut b = CsvQuestionSource::from_questions(sample_questions())
            .unwrap()
            .with_seed(42);

        for _ in 0..20 {
            assert_eq!(a.next_question(), b.next_question());
        }
    }

    #[test]
    fn test_sampling_draws_from_corpus() {
        let mut source = CsvQuestionSource::from_questions(sample_questions())
            .unwrap()
            .with_seed(1);

        let corpus: HashSet<String> = sample_questions().into_iter().map(|q| q.text).collect();
        let mut seen = HashSet::new();
        for _ in 0..200 {
            let q = source.next_question();
            assert!(corpus.contains(&q.text));
            seen.insert(q.text);
        }

        // Com reposição e 200 sorteios, todas as 5 devem aparecer
        assert_eq!(seen.len(), 5);
    }
}
