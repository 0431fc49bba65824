//! Similaridade de cosseno sobre vetores TF-IDF.
//!
//! O vocabulário é ajustado apenas sobre o par de documentos comparado:
//! tokens com 2+ caracteres de palavra, sem stop words, unigramas e
//! bigramas, limitado aos termos mais frequentes. O idf é suavizado
//! (`ln((1+n)/(1+df)) + 1`) e cada vetor é normalizado por L2.

use std::collections::{BTreeMap, HashMap, HashSet};

use regex::Regex;

use super::stop_words::ENGLISH_STOP_WORDS;

/// Limite padrão do vocabulário.
pub const DEFAULT_MAX_FEATURES: usize = 1000;

/// Vetorizador TF-IDF para comparar dois textos.
pub struct TfidfCosine {
    token_re: Regex,
    stop_words: HashSet<&'static str>,
    max_features: usize,
}

impl TfidfCosine {
    /// Cria um vetorizador com o limite padrão de vocabulário.
    pub fn new() -> Self {
        Self::with_max_features(DEFAULT_MAX_FEATURES)
    }

    /// Cria um vetorizador com limite de vocabulário específico.
    pub fn with_max_features(max_features: usize) -> Self {
        Self {
            token_re: Regex::new(r"\b\w\w+\b").expect("token regex is valid"),
            stop_words: ENGLISH_STOP_WORDS.iter().copied().collect(),
            max_features,
        }
    }

    /// Extrai unigramas e bigramas de um texto já pré-processado.
    pub fn analyze(&self, doc: &str) -> Vec<String> {
        let tokens: Vec<&str> = self
            .token_re
            .find_iter(doc)
            .map(|m| m.as_str())
            .filter(|t| !self.stop_words.contains(t))
            .collect();

        let mut terms: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
        terms.extend(tokens.windows(2).map(|w| format!("{} {}", w[0], w[1])));
        terms
    }

    /// Calcula a similaridade de cosseno entre dois textos.
    ///
    /// Retorna 0.0 quando nenhum termo sobra depois da filtragem.
    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        let docs = [self.analyze(a), self.analyze(b)];
        let counts: Vec<HashMap<&str, usize>> = docs.iter().map(|d| term_counts(d)).collect();

        let vocabulary = self.vocabulary(&counts);
        if vocabulary.is_empty() {
            return 0.0;
        }

        let n_docs = counts.len() as f64;
        let idf: Vec<f64> = vocabulary
            .iter()
            .map(|term| {
                let df = counts.iter().filter(|c| c.contains_key(term)).count() as f64;
                ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let vectors: Vec<Vec<f64>> = counts
            .iter()
            .map(|c| {
                let raw: Vec<f64> = vocabulary
                    .iter()
                    .zip(&idf)
                    .map(|(term, w)| c.get(term).copied().unwrap_or(0) as f64 * w)
                    .collect();
                l2_normalize(raw)
            })
            .collect();

        let dot: f64 = vectors[0].iter().zip(&vectors[1]).map(|(x, y)| x * y).sum();
        dot.clamp(0.0, 1.0)
    }

    fn vocabulary<'a>(&self, counts: &[HashMap<&'a str, usize>]) -> Vec<&'a str> {
        let mut totals: BTreeMap<&'a str, usize> = BTreeMap::new();
        for c in counts {
            for (&term, &n) in c {
                *totals.entry(term).or_insert(0) += n;
            }
        }

        // Mais frequentes primeiro; empate em ordem alfabética
        let mut terms: Vec<(&str, usize)> = totals.into_iter().collect();
        terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        terms.truncate(self.max_features);
        terms.into_iter().map(|(term, _)| term).collect()
    }
}

impl Default for TfidfCosine {
    fn default() -> Self {
        Self::new()
    }
}

fn term_counts(terms: &[String]) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for term in terms {
        *counts.entry(term.as_str()).or_insert(0) += 1;
    }
    counts
}

fn l2_normalize(v: Vec<f64>) -> Vec<f64> {
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm == 0.0 {
        v
    } else {
        v.into_iter().map(|x| x / norm).collect()
    }
}
