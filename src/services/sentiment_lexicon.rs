//! Lexicon-based polarity and subjectivity scoring.
//!
//! Every word found in the lexicon contributes one assessment of
//! (polarity, subjectivity). A preceding intensifier scales the assessment, a
//! preceding negation flips and halves its polarity. The document score is
//! the mean over all assessments; text without any known word scores 0.0 / 0.0.

/// (word, polarity in [-1, 1], subjectivity in [0, 1])
static LEXICON: &[(&str, f64, f64)] = &[
    ("amazing", 0.6, 0.9),
    ("awesome", 1.0, 1.0),
    ("awful", -1.0, 1.0),
    ("bad", -0.7, 0.667),
    ("beautiful", 0.85, 1.0),
    ("best", 1.0, 0.3),
    ("better", 0.5, 0.5),
    ("boring", -1.0, 1.0),
    ("brilliant", 0.9, 1.0),
    ("broken", -0.4, 0.4),
    ("buggy", -0.5, 0.6),
    ("cheap", 0.4, 0.7),
    ("clean", 0.367, 0.683),
    ("clear", 0.1, 0.383),
    ("confusing", -0.3, 0.6),
    ("cool", 0.35, 0.65),
    ("crap", -0.8, 0.8),
    ("cute", 0.5, 1.0),
    ("delighted", 0.7, 0.8),
    ("delightful", 1.0, 1.0),
    ("difficult", -0.5, 1.0),
    ("disappointed", -0.75, 0.75),
    ("disappointing", -0.6, 0.7),
    ("disgusting", -1.0, 1.0),
    ("dreadful", -0.9, 1.0),
    ("dull", -0.3125, 0.75),
    ("easy", 0.433, 0.833),
    ("effective", 0.6, 0.8),
    ("efficient", 0.0, 0.0),
    ("elegant", 0.5, 1.0),
    ("enjoy", 0.4, 0.5),
    ("enjoyable", 0.5, 0.6),
    ("excellent", 1.0, 1.0),
    ("exceptional", 0.667, 1.0),
    ("exciting", 0.3, 0.8),
    ("expensive", -0.5, 0.7),
    ("fabulous", 0.4, 0.9),
    ("fail", -0.5, 0.3),
    ("failed", -0.5, 0.3),
    ("fantastic", 0.4, 0.9),
    ("fast", 0.2, 0.6),
    ("fine", 0.417, 0.5),
    ("flawless", 1.0, 1.0),
    ("fun", 0.3, 0.2),
    ("glad", 0.5, 1.0),
    ("good", 0.7, 0.6),
    ("gorgeous", 0.7, 1.0),
    ("great", 0.8, 0.75),
    ("happy", 0.8, 1.0),
    ("hard", -0.292, 0.542),
    ("hate", -0.8, 0.9),
    ("hated", -0.9, 0.7),
    ("helpful", 0.5, 0.6),
    ("horrible", -1.0, 1.0),
    ("ideal", 0.9, 0.9),
    ("impressive", 1.0, 1.0),
    ("incredible", 0.9, 0.9),
    ("inferior", -0.5, 0.7),
    ("interesting", 0.5, 0.5),
    ("lame", -0.5, 0.75),
    ("like", 0.2, 0.3),
    ("love", 0.5, 0.6),
    ("loved", 0.7, 0.8),
    ("lovely", 0.5, 0.75),
    ("mediocre", -0.3, 0.6),
    ("messy", -0.5, 0.7),
    ("nasty", -1.0, 1.0),
    ("nice", 0.6, 1.0),
    ("okay", 0.5, 0.5),
    ("outstanding", 0.5, 0.75),
    ("painful", -0.7, 0.9),
    ("pathetic", -1.0, 1.0),
    ("perfect", 1.0, 1.0),
    ("pleasant", 0.733, 0.967),
    ("pleased", 0.5, 1.0),
    ("poor", -0.4, 0.6),
    ("powerful", 0.3, 1.0),
    ("pretty", 0.25, 1.0),
    ("reliable", 0.4, 0.5),
    ("ridiculous", -0.333, 1.0),
    ("sad", -0.5, 1.0),
    ("satisfied", 0.5, 1.0),
    ("slow", -0.3, 0.39),
    ("smooth", 0.4, 0.7),
    ("solid", 0.0, 0.1),
    ("stupid", -0.8, 1.0),
    ("superb", 1.0, 1.0),
    ("terrible", -1.0, 1.0),
    ("terrific", 1.0, 1.0),
    ("thrilled", 0.7, 0.8),
    ("ugly", -0.7, 1.0),
    ("unhappy", -0.6, 0.9),
    ("unreliable", -0.5, 0.6),
    ("useful", 0.3, 0.0),
    ("useless", -0.5, 0.2),
    ("waste", -0.2, 0.0),
    ("weak", -0.375, 0.625),
    ("weird", -0.5, 1.0),
    ("wonderful", 1.0, 1.0),
    ("worse", -0.4, 0.6),
    ("worst", -1.0, 1.0),
    ("wrong", -0.5, 0.9),
];

static INTENSIFIERS: &[(&str, f64)] = &[
    ("absolutely", 1.5),
    ("extremely", 1.5),
    ("highly", 1.3),
    ("incredibly", 1.5),
    ("quite", 1.1),
    ("really", 1.3),
    ("so", 1.3),
    ("super", 1.4),
    ("too", 1.2),
    ("totally", 1.4),
    ("truly", 1.3),
    ("very", 1.3),
];

static NEGATIONS: &[&str] = &["not", "never", "no", "nor", "neither", "without", "hardly"];

/// Polarity shrinks to this factor (and flips) under negation.
const NEGATION_FACTOR: f64 = -0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentScore {
    pub polarity: f64,
    pub subjectivity: f64,
}

fn lookup(word: &str) -> Option<(f64, f64)> {
    LEXICON
        .binary_search_by(|(w, _, _)| w.cmp(&word))
        .ok()
        .map(|i| (LEXICON[i].1, LEXICON[i].2))
}

fn intensity(word: &str) -> Option<f64> {
    INTENSIFIERS.iter().find(|(w, _)| *w == word).map(|(_, v)| *v)
}

fn is_negation(word: &str) -> bool {
    NEGATIONS.contains(&word) || word.ends_with("n't")
}

/// Lower-cased word tokens; punctuation other than apostrophes separates words.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|w| w.trim_matches('\''))
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn score(text: &str) -> SentimentScore {
    let mut assessments: Vec<(f64, f64)> = Vec::new();
    let mut negated = false;
    let mut multiplier: Option<f64> = None;

    for word in tokenize(text) {
        if let Some((mut polarity, mut subjectivity)) = lookup(&word) {
            if let Some(m) = multiplier {
                polarity *= m;
                subjectivity *= m;
            }
            if negated {
                polarity *= NEGATION_FACTOR;
            }
            assessments.push((polarity.clamp(-1.0, 1.0), subjectivity.clamp(0.0, 1.0)));
            negated = false;
            multiplier = None;
        } else if is_negation(&word) {
            negated = true;
        } else if let Some(m) = intensity(&word) {
            multiplier = Some(multiplier.unwrap_or(1.0) * m);
        } else {
            // Modifiers only reach the next word.
            negated = false;
            multiplier = None;
        }
    }

    if assessments.is_empty() {
        return SentimentScore { polarity: 0.0, subjectivity: 0.0 };
    }

    let n = assessments.len() as f64;
    let polarity = assessments.iter().map(|(p, _)| p).sum::<f64>() / n;
    let subjectivity = assessments.iter().map(|(_, s)| s).sum::<f64>() / n;

    SentimentScore {
        polarity: polarity.clamp(-1.0, 1.0),
        subjectivity: subjectivity.clamp(0.0, 1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexicon_is_sorted_for_binary_search() {
        for pair in LEXICON.windows(2) {
            assert!(pair[0].0 < pair[1].0, "{} >= {}", pair[0].0, pair[1].0);
        }
    }

    #[test]
    fn test_positive_text() {
        let s = score("I love this amazing product!");
        assert!((s.polarity - 0.55).abs() < 1e-9);
        assert!((s.subjectivity - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_negative_text() {
        let s = score("This was a terrible, awful experience.");
        assert!(s.polarity < -0.1);
    }

    #[test]
    fn test_unknown_words_are_neutral() {
        let s = score("The quarterly report is attached.");
        assert_eq!(s, SentimentScore { polarity: 0.0, subjectivity: 0.0 });
        assert_eq!(score(""), SentimentScore { polarity: 0.0, subjectivity: 0.0 });
    }

    #[test]
    fn test_negation_flips_polarity() {
        let plain = score("good");
        let negated = score("not good");
        assert!(plain.polarity > 0.0);
        assert!(negated.polarity < 0.0);
        assert!((negated.polarity - plain.polarity * NEGATION_FACTOR).abs() < 1e-9);
        assert!(score("it isn't good").polarity < 0.0);
    }

    #[test]
    fn test_intensifier_scales_and_clamps() {
        let plain = score("good");
        let intense = score("very good");
        assert!(intense.polarity > plain.polarity);
        assert!(score("extremely perfect").polarity <= 1.0);
        assert!(score("extremely perfect").subjectivity <= 1.0);
    }

    #[test]
    fn test_modifier_does_not_skip_words() {
        // "not" applies to "the", not to "best".
        assert!(score("not the best").polarity > 0.0);
    }

    #[test]
    fn test_scores_stay_in_range() {
        let samples = [
            "absolutely horrible horrible horrible",
            "super extremely really very wonderful",
            "not not not bad",
            "!!!",
            "good bad ugly nice",
        ];
        for text in samples {
            let s = score(text);
            assert!((-1.0..=1.0).contains(&s.polarity), "{}", text);
            assert!((0.0..=1.0).contains(&s.subjectivity), "{}", text);
        }
    }
}
