//! ROUGE-1/2/L/Lsum F-measures.
//!
//! Tokenization lowercases and keeps only `[a-z0-9]` runs, without stemming.
//! ROUGE-Lsum treats newlines as sentence boundaries and uses the
//! summary-level union LCS.

use crate::domain::model::RougeScores;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

static NON_ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("non alphanumeric pattern"));

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Score {
    pub precision: f64,
    pub recall: f64,
    pub fmeasure: f64,
}

impl Score {
    fn from_ratio(precision: f64, recall: f64) -> Self {
        Self {
            precision,
            recall,
            fmeasure: fmeasure(precision, recall),
        }
    }
}

fn fmeasure(precision: f64, recall: f64) -> f64 {
    if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    }
}

pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    NON_ALNUM
        .replace_all(&lowered, " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn ngram_counts(tokens: &[String], n: usize) -> HashMap<&[String], usize> {
    let mut counts = HashMap::new();
    if tokens.len() >= n {
        for gram in tokens.windows(n) {
            *counts.entry(gram).or_insert(0) += 1;
        }
    }
    counts
}

pub fn rouge_n(prediction: &[String], reference: &[String], n: usize) -> Score {
    let pred_counts = ngram_counts(prediction, n);
    let ref_counts = ngram_counts(reference, n);

    let overlap: usize = ref_counts
        .iter()
        .map(|(gram, count)| pred_counts.get(gram).map_or(0, |c| (*c).min(*count)))
        .sum();
    let pred_total: usize = pred_counts.values().sum();
    let ref_total: usize = ref_counts.values().sum();

    Score::from_ratio(
        overlap as f64 / pred_total.max(1) as f64,
        overlap as f64 / ref_total.max(1) as f64,
    )
}

/// `table[i][j]` = LCS length of `reference[..i]` and `candidate[..j]`.
fn lcs_table(reference: &[String], candidate: &[String]) -> Vec<Vec<usize>> {
    let rows = reference.len();
    let cols = candidate.len();
    let mut table = vec![vec![0usize; cols + 1]; rows + 1];
    for i in 1..=rows {
        for j in 1..=cols {
            table[i][j] = if reference[i - 1] == candidate[j - 1] {
                table[i - 1][j - 1] + 1
            } else {
                table[i - 1][j].max(table[i][j - 1])
            };
        }
    }
    table
}

/// Indices into `reference` of one longest common subsequence.
fn lcs_indices(reference: &[String], candidate: &[String]) -> Vec<usize> {
    let table = lcs_table(reference, candidate);
    let mut i = reference.len();
    let mut j = candidate.len();
    let mut indices = Vec::new();
    while i > 0 && j > 0 {
        if candidate[j - 1] == reference[i - 1] {
            indices.push(i - 1);
            i -= 1;
            j -= 1;
        } else if table[i][j - 1] > table[i - 1][j] {
            j -= 1;
        } else {
            i -= 1;
        }
    }
    indices.reverse();
    indices
}

pub fn rouge_l(prediction: &[String], reference: &[String]) -> Score {
    if prediction.is_empty() || reference.is_empty() {
        return Score::default();
    }
    let table = lcs_table(reference, prediction);
    let lcs = table[reference.len()][prediction.len()] as f64;
    Score::from_ratio(
        lcs / prediction.len() as f64,
        lcs / reference.len() as f64,
    )
}

fn sentences(text: &str) -> Vec<Vec<String>> {
    text.split('\n')
        .filter(|s| !s.is_empty())
        .map(tokenize)
        .collect()
}

pub fn rouge_lsum(prediction: &str, reference: &str) -> Score {
    let pred_sents = sentences(prediction);
    let ref_sents = sentences(reference);
    if pred_sents.is_empty() || ref_sents.is_empty() {
        return Score::default();
    }

    let ref_len: usize = ref_sents.iter().map(Vec::len).sum();
    let pred_len: usize = pred_sents.iter().map(Vec::len).sum();
    if ref_len == 0 || pred_len == 0 {
        return Score::default();
    }

    let mut ref_counts: HashMap<&str, usize> = HashMap::new();
    let mut pred_counts: HashMap<&str, usize> = HashMap::new();
    for token in ref_sents.iter().flatten() {
        *ref_counts.entry(token.as_str()).or_insert(0) += 1;
    }
    for token in pred_sents.iter().flatten() {
        *pred_counts.entry(token.as_str()).or_insert(0) += 1;
    }

    let mut hits = 0usize;
    for ref_sent in &ref_sents {
        // 與每個預測句子的 LCS 取聯集
        let union: BTreeSet<usize> = pred_sents
            .iter()
            .flat_map(|pred_sent| lcs_indices(ref_sent, pred_sent))
            .collect();

        for idx in union {
            let token = ref_sent[idx].as_str();
            let (Some(pred_left), Some(ref_left)) =
                (pred_counts.get(token).copied(), ref_counts.get(token).copied())
            else {
                continue;
            };
            if pred_left > 0 && ref_left > 0 {
                hits += 1;
                pred_counts.insert(token, pred_left - 1);
                ref_counts.insert(token, ref_left - 1);
            }
        }
    }

    Score::from_ratio(hits as f64 / pred_len as f64, hits as f64 / ref_len as f64)
}

/// F-measures of one prediction against one reference.
pub fn score(prediction: &str, reference: &str) -> RougeScores {
    let pred_tokens = tokenize(prediction);
    let ref_tokens = tokenize(reference);

    RougeScores {
        rouge1: rouge_n(&pred_tokens, &ref_tokens, 1).fmeasure,
        rouge2: rouge_n(&pred_tokens, &ref_tokens, 2).fmeasure,
        rouge_l: rouge_l(&pred_tokens, &ref_tokens).fmeasure,
        rouge_lsum: rouge_lsum(prediction, reference).fmeasure,
    }
}

/// Mean of each F-measure. Empty input gives all zeros.
pub fn aggregate(scores: &[RougeScores]) -> RougeScores {
    if scores.is_empty() {
        return RougeScores::default();
    }
    let n = scores.len() as f64;
    let sum = scores.iter().fold(RougeScores::default(), |acc, s| RougeScores {
        rouge1: acc.rouge1 + s.rouge1,
        rouge2: acc.rouge2 + s.rouge2,
        rouge_l: acc.rouge_l + s.rouge_l,
        rouge_lsum: acc.rouge_lsum + s.rouge_lsum,
    });
    RougeScores {
        rouge1: sum.rouge1 / n,
        rouge2: sum.rouge2 / n,
        rouge_l: sum.rouge_l / n,
        rouge_lsum: sum.rouge_lsum / n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_tokenize_lowercases_and_splits_punctuation() {
        assert_eq!(
            tokenize("The Q3 budget, re-approved!"),
            vec!["the", "q3", "budget", "re", "approved"]
        );
        assert!(tokenize("  ... ").is_empty());
    }

    #[test]
    fn test_identical_texts_score_one() {
        let s = score("the cat sat on the mat", "the cat sat on the mat");
        assert!(close(s.rouge1, 1.0));
        assert!(close(s.rouge2, 1.0));
        assert!(close(s.rouge_l, 1.0));
        assert!(close(s.rouge_lsum, 1.0));
    }

    #[test]
    fn test_empty_prediction_scores_zero() {
        let s = score("", "the cat sat on the mat");
        assert_eq!(s, RougeScores::default());
    }

    #[test]
    fn test_rouge1_clips_repeated_tokens() {
        let pred = tokenize("the the the");
        let reference = tokenize("the cat");
        let r1 = rouge_n(&pred, &reference, 1);
        assert!(close(r1.precision, 1.0 / 3.0));
        assert!(close(r1.recall, 0.5));
        assert!(close(r1.fmeasure, 0.4));
    }

    #[test]
    fn test_rouge2_partial_overlap() {
        let pred = tokenize("police killed the gunman");
        let reference = tokenize("police kill the gunman");
        let r2 = rouge_n(&pred, &reference, 2);
        // 只有 "the gunman" 相同
        assert!(close(r2.precision, 1.0 / 3.0));
        assert!(close(r2.recall, 1.0 / 3.0));
    }

    #[test]
    fn test_rouge_l_uses_longest_common_subsequence() {
        let pred = tokenize("police killed the gunman");
        let reference = tokenize("police kill the gunman");
        let l = rouge_l(&pred, &reference);
        assert!(close(l.precision, 0.75));
        assert!(close(l.recall, 0.75));
        assert!(close(l.fmeasure, 0.75));
    }

    #[test]
    fn test_rouge_lsum_matches_rouge_l_for_single_sentence() {
        let pred = "the team agreed to ship on friday";
        let reference = "the team will ship the release on friday";
        let l = rouge_l(&tokenize(pred), &tokenize(reference));
        let lsum = rouge_lsum(pred, reference);
        assert!(close(l.fmeasure, lsum.fmeasure));
    }

    #[test]
    fn test_rouge_lsum_unions_across_sentences() {
        let pred = "budget approved\nlaunch delayed";
        let reference = "launch delayed budget approved";
        let lsum = rouge_lsum(pred, reference);
        assert!(close(lsum.recall, 1.0));
        assert!(close(lsum.precision, 1.0));

        let l = rouge_l(&tokenize(pred), &tokenize(reference));
        assert!(l.fmeasure < lsum.fmeasure);
    }

    #[test]
    fn test_aggregate_averages_fmeasures() {
        let a = RougeScores {
            rouge1: 1.0,
            rouge2: 0.5,
            rouge_l: 1.0,
            rouge_lsum: 1.0,
        };
        let agg = aggregate(&[a, RougeScores::default()]);
        assert!(close(agg.rouge1, 0.5));
        assert!(close(agg.rouge2, 0.25));
        assert_eq!(aggregate(&[]), RougeScores::default());
    }
}
