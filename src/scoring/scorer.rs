//! Pontuação de qualidade de respostas.

use std::collections::HashSet;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::tfidf::TfidfCosine;

/// Peso da similaridade de cosseno no score final.
pub const COSINE_WEIGHT: f64 = 0.5;
/// Peso da similaridade de Jaccard no score final.
pub const JACCARD_WEIGHT: f64 = 0.3;
/// Peso da razão de comprimento no score final.
pub const LENGTH_WEIGHT: f64 = 0.2;

/// Scores de uma resposta contra a referência, todos em [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityScores {
    /// Similaridade de cosseno TF-IDF.
    pub cosine: f64,

    /// Similaridade de Jaccard entre conjuntos de tokens.
    pub jaccard: f64,

    /// Razão entre os comprimentos (menor / maior).
    pub length_ratio: f64,

    /// Combinação ponderada dos três.
    pub overall: f64,
}

impl QualityScores {
    /// Scores zerados.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Combina os componentes com os pesos padrão.
    pub fn from_components(cosine: f64, jaccard: f64, length_ratio: f64) -> Self {
        let overall =
            cosine * COSINE_WEIGHT + jaccard * JACCARD_WEIGHT + length_ratio * LENGTH_WEIGHT;

        Self {
            cosine,
            jaccard,
            length_ratio,
            overall: overall.clamp(0.0, 1.0),
        }
    }
}

/// Avalia a qualidade de respostas do LLM comparando com a resposta
/// de referência do dataset.
pub struct ResponseScorer {
    non_word: Regex,
    spaces: Regex,
    tfidf: TfidfCosine,
}

impl ResponseScorer {
    /// Cria um novo scorer.
    pub fn new() -> Self {
        Self {
            non_word: Regex::new(r"[^\w\s]").expect("non-word regex is valid"),
            spaces: Regex::new(r"\s+").expect("whitespace regex is valid"),
            tfidf: TfidfCosine::new(),
        }
    }

    /// Normaliza o texto: minúsculas, sem pontuação, espaços simples.
    pub fn preprocess(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let lower = text.to_lowercase();
        let no_punct = self.non_word.replace_all(&lower, " ");
        let collapsed = self.spaces.replace_all(&no_punct, " ");
        collapsed.trim().to_string()
    }

    /// Similaridade de cosseno TF-IDF.
    pub fn cosine_similarity(&self, candidate: &str, reference: &str) -> f64 {
        if candidate.is_empty() || reference.is_empty() {
            return 0.0;
        }

        let candidate = self.preprocess(candidate);
        let reference = self.preprocess(reference);
        if candidate.is_empty() || reference.is_empty() {
            return 0.0;
        }

        self.tfidf.similarity(&candidate, &reference)
    }

    /// Similaridade de Jaccard entre os conjuntos de tokens.
    pub fn jaccard_similarity(&self, candidate: &str, reference: &str) -> f64 {
        if candidate.is_empty() || reference.is_empty() {
            return 0.0;
        }

        let candidate = self.preprocess(candidate);
        let reference = self.preprocess(reference);
        let a: HashSet<&str> = candidate.split_whitespace().collect();
        let b: HashSet<&str> = reference.split_whitespace().collect();

        if a.is_empty() || b.is_empty() {
            return 0.0;
        }

        let intersection = a.intersection(&b).count();
        let union = a.union(&b).count();
        intersection as f64 / union as f64
    }

    /// Razão entre o número de palavras das duas respostas.
    pub fn length_ratio(&self, candidate: &str, reference: &str) -> f64 {
        if candidate.is_empty() || reference.is_empty() {
            return 0.0;
        }

        let candidate_len = candidate.split_whitespace().count();
        let reference_len = reference.split_whitespace().count();

        if reference_len == 0 {
            return 0.0;
        }

        candidate_len.min(reference_len) as f64 / candidate_len.max(reference_len) as f64
    }

    /// Calcula todos os scores de uma vez.
    pub fn score(&self, candidate: &str, reference: &str) -> QualityScores {
        if candidate.is_empty() || reference.is_empty() {
            return QualityScores::zero();
        }

        QualityScores::from_components(
            self.cosine_similarity(candidate, reference),
            self.jaccard_similarity(candidate, reference),
            self.length_ratio(candidate, reference),
        )
    }
}

impl Default for ResponseScorer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preprocess() {
        let scorer = ResponseScorer::new();
        assert_eq!(
            scorer.preprocess("  Hello,   World!\n\tIt's  Rust. "),
            "hello world it s rust"
        );
        assert_eq!(scorer.preprocess(""), "");
        assert_eq!(scorer.preprocess("?!..."), "");
    }

    #[test]
    fn test_empty_inputs_score_zero() {
        let scorer = ResponseScorer::new();
        assert_eq!(scorer.score("", "algo"), QualityScores::zero());
        assert_eq!(scorer.score("algo", ""), QualityScores::zero());
    }

    #[test]
    fn test_identical_answers_score_one() {
        let scorer = ResponseScorer::new();
        let text = "Rust guarantees memory safety without garbage collection.";
        let scores = scorer.score(text, text);

        assert!((scores.cosine - 1.0).abs() < 1e-9);
        assert_eq!(scores.jaccard, 1.0);
        assert_eq!(scores.length_ratio, 1.0);
        assert!((scores.overall - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_jaccard_and_length_ratio() {
        let scorer = ResponseScorer::new();

        let candidate = "Rust is fast";
        let reference = "Rust is safe and fast";

        assert!((scorer.jaccard_similarity(candidate, reference) - 0.6).abs() < 1e-9);
        assert!((scorer.length_ratio(candidate, reference) - 0.6).abs() < 1e-9);
        assert_eq!(scorer.length_ratio("   ", "palavras"), 0.0);
        assert_eq!(scorer.length_ratio("palavras", "   "), 0.0);
    }

    #[test]
    fn test_weighted_overall() {
        let scores = QualityScores::from_components(0.8, 0.5, 1.0);
        assert!((scores.overall - (0.4 + 0.15 + 0.2)).abs() < 1e-9);
    }

    #[test]
    fn test_unrelated_answer_scores_low() {
        let scorer = ResponseScorer::new();
        let scores = scorer.score(
            "[LLM error] Timeout ao executar 'Gemini'",
            "Paris is the capital of France",
        );

        assert_eq!(scores.cosine, 0.0);
        assert_eq!(scores.jaccard, 0.0);
        // Só a razão de comprimento contribui
        assert!((scores.overall - LENGTH_WEIGHT * scores.length_ratio).abs() < 1e-9);
    }

    #[test]
    fn test_scores_in_unit_interval() {
        let scorer = ResponseScorer::new();
        let pairs = [
            ("a b c", "c d e f g"),
            ("Dogs bark loudly at night", "At night, dogs bark."),
            ("one", "one two three four five six seven"),
        ];

        for (a, b) in pairs {
            let s = scorer.score(a, b);
            for v in [s.cosine, s.jaccard, s.length_ratio, s.overall] {
                assert!((0.0..=1.0).contains(&v), "{:?}", s);
            }
        }
    }
}
