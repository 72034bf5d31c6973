//! Fuzzy reconciliation of observed labels against a fixed taxonomy.

/// Highest-scoring candidate for an expected label.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BestMatch<'a> {
    /// The winning candidate, if any candidate scored above zero.
    pub key: Option<&'a str>,
    /// Similarity of the winning candidate, in `[0, 1]`.
    pub score: f64,
}

impl<'a> BestMatch<'a> {
    const NONE: Self = Self {
        key: None,
        score: 0.0,
    };

    /// Returns the key when its score strictly exceeds `threshold`.
    #[must_use]
    pub fn above(&self, threshold: f64) -> Option<&'a str> {
        self.key.filter(|_| self.score > threshold)
    }
}

/// Normalised Levenshtein similarity: symmetric, `1.0` for identical strings.
#[must_use]
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}

/// Bigram overlap (Sørensen-Dice) ignoring whitespace. Unlike
/// [`similarity`] it still rewards an answer that is a truncated label,
/// such as `"contextual"` for `"contextual information"`.
#[must_use]
pub fn answer_similarity(a: &str, b: &str) -> f64 {
    strsim::sorensen_dice(a, b)
}

/// Scores every candidate against `expected` and returns the best one.
///
/// Ties keep the earliest candidate in iteration order. An empty candidate
/// set, or one where nothing shares any similarity, yields no key and a
/// score of `0.0`.
pub fn best_match<'a, I>(candidates: I, expected: &str) -> BestMatch<'a>
where
    I: IntoIterator<Item = &'a str>,
{
    best_by(candidates, expected, similarity)
}

fn best_by<'a, I>(candidates: I, target: &str, score_fn: fn(&str, &str) -> f64) -> BestMatch<'a>
where
    I: IntoIterator<Item = &'a str>,
{
    candidates
        .into_iter()
        .fold(BestMatch::NONE, |best, candidate| {
            let score = score_fn(candidate, target);
            if score > best.score {
                BestMatch {
                    key: Some(candidate),
                    score,
                }
            } else {
                best
            }
        })
}

/// Returns the candidate closest to `observed` by [`answer_similarity`] if
/// it reaches `cutoff`.
pub fn closest_match<'a, I>(candidates: I, observed: &str, cutoff: f64) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let best = best_by(candidates, observed, answer_similarity);
    best.key.filter(|_| best.score >= cutoff)
}

/// Canonicalises free-form model output before matching: trims whitespace,
/// surrounding quotes, markdown emphasis, and trailing punctuation, then
/// lower-cases.
#[must_use]
pub fn normalize_label(raw: &str) -> String {
    raw.trim()
        .trim_matches(|ch: char| {
            matches!(ch, '"' | '\'' | '`' | '*' | '.' | ':') || ch.is_whitespace()
        })
        .to_lowercase()
}
