//! Repeating-block detection.
//!
//! Listing containers on locator pages are usually the most frequently
//! repeated styled element. We count every distinct class attribute value
//! and keep the few most common ones as candidates.

use std::collections::HashMap;

use scraper::{ElementRef, Html};
use serde::Serialize;

use super::document::{class_tokens, elements};

/// A signature must occur strictly more often than this to be a candidate.
pub const MIN_OCCURRENCES: usize = 3;

/// Upper bound on the number of candidates handed to the extractor.
pub const MAX_CANDIDATES: usize = 3;

/// Ordered class tokens taken from a single element's `class` attribute.
///
/// Equality is order-sensitive: `["store", "card"]` and `["card", "store"]`
/// are different signatures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ClassSignature(Vec<String>);

impl ClassSignature {
    /// Build a signature from tokens. Returns `None` when no non-blank token
    /// remains.
    pub fn new<I, S>(tokens: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens
            .into_iter()
            .map(Into::into)
            .filter(|t| !t.trim().is_empty())
            .collect();
        if tokens.is_empty() {
            None
        } else {
            Some(Self(tokens))
        }
    }

    /// Split a raw `class` attribute value on whitespace.
    #[must_use]
    pub fn from_class_attr(raw: &str) -> Option<Self> {
        Self::new(raw.split_whitespace())
    }

    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    /// Space-joined form, identical to a normalized `class` attribute.
    #[must_use]
    pub fn key(&self) -> String {
        self.0.join(" ")
    }

    /// Conjunctive CSS selector, e.g. `.store.card`.
    #[must_use]
    pub fn css_selector(&self) -> String {
        let mut selector = String::new();
        for token in &self.0 {
            selector.push('.');
            push_css_ident(&mut selector, token);
        }
        selector
    }

    /// `true` when `element` carries every class in this signature.
    #[must_use]
    pub fn matches(&self, element: ElementRef<'_>) -> bool {
        let present = class_tokens(element);
        if present.is_empty() {
            return false;
        }
        self.0.iter().all(|token| present.contains(&token.as_str()))
    }
}

impl std::fmt::Display for ClassSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.css_selector())
    }
}

fn push_css_ident(out: &mut String, token: &str) {
    for (i, ch) in token.chars().enumerate() {
        if ch.is_ascii_digit() && i == 0 {
            out.push_str(&format!("\\3{ch} "));
        } else if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || !ch.is_ascii() {
            out.push(ch);
        } else {
            out.push('\\');
            out.push(ch);
        }
    }
}

/// A candidate signature with the number of elements that carried it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedCandidate {
    pub signature: ClassSignature,
    pub count: usize,
}

/// Up to [`MAX_CANDIDATES`] signatures, most frequent first, each seen more
/// than [`MIN_OCCURRENCES`] times.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CandidateRanking(Vec<RankedCandidate>);

impl CandidateRanking {
    #[must_use]
    pub fn candidates(&self) -> &[RankedCandidate] {
        &self.0
    }

    pub fn signatures(&self) -> impl Iterator<Item = &ClassSignature> {
        self.0.iter().map(|c| &c.signature)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a CandidateRanking {
    type Item = &'a RankedCandidate;
    type IntoIter = std::slice::Iter<'a, RankedCandidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Rank the document's class signatures by how often they repeat.
///
/// Ties keep first-appearance order.
#[must_use]
pub fn rank(document: &Html) -> CandidateRanking {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut slot_by_key: HashMap<String, usize> = HashMap::new();

    for element in elements(document) {
        let tokens = class_tokens(element);
        if tokens.is_empty() {
            continue;
        }
        let key = tokens.join(" ");
        if let Some(&slot) = slot_by_key.get(&key) {
            counts[slot].1 += 1;
        } else {
            slot_by_key.insert(key.clone(), counts.len());
            counts.push((key, 1));
        }
    }

    // `sort_by` is stable, so equal counts stay in first-seen order.
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    let candidates: Vec<RankedCandidate> = counts
        .into_iter()
        .filter(|(_, count)| *count > MIN_OCCURRENCES)
        .take(MAX_CANDIDATES)
        .filter_map(|(key, count)| {
            ClassSignature::from_class_attr(&key)
                .map(|signature| RankedCandidate { signature, count })
        })
        .collect();

    tracing::debug!(
        candidates = candidates.len(),
        top = candidates.first().map(|c| c.signature.key()),
        "ranked repeating class signatures"
    );

    CandidateRanking(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::document::parse_document;

    fn repeat(fragment: &str, times: usize) -> String {
        fragment.repeat(times)
    }

    fn keys(ranking: &CandidateRanking) -> Vec<String> {
        ranking.signatures().map(ClassSignature::key).collect()
    }

    #[test]
    fn ranks_by_descending_count() {
        let html = format!(
            "{}{}{}",
            repeat(r#"<div class="a">x</div>"#, 4),
            repeat(r#"<div class="b">x</div>"#, 6),
            repeat(r#"<div class="c">x</div>"#, 5),
        );
        let ranking = rank(&parse_document(&html));
        assert_eq!(keys(&ranking), ["b", "c", "a"]);
        let counts: Vec<usize> = ranking.candidates().iter().map(|c| c.count).collect();
        assert_eq!(counts, [6, 5, 4]);
    }

    #[test]
    fn count_of_three_is_not_enough() {
        let html = format!(
            "{}{}",
            repeat(r#"<p class="three">x</p>"#, 3),
            repeat(r#"<p class="four">x</p>"#, 4),
        );
        assert_eq!(keys(&rank(&parse_document(&html))), ["four"]);
    }

    #[test]
    fn keeps_at_most_three_candidates() {
        let html: String = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|c| repeat(&format!(r#"<i class="{c}"></i>"#), 5))
            .collect();
        let ranking = rank(&parse_document(&html));
        assert_eq!(ranking.len(), MAX_CANDIDATES);
        assert_eq!(keys(&ranking), ["a", "b", "c"], "ties keep first-seen order");
    }

    #[test]
    fn signature_order_is_significant() {
        let html = format!(
            "{}{}",
            repeat(r#"<li class="store card">x</li>"#, 4),
            repeat(r#"<li class="card store">x</li>"#, 4),
        );
        let ranking = rank(&parse_document(&html));
        assert_eq!(keys(&ranking), ["store card", "card store"]);
    }

    #[test]
    fn whitespace_variants_share_a_signature() {
        let html = format!(
            "{}{}",
            repeat(r#"<li class="store  card">x</li>"#, 2),
            repeat(r#"<li class=" store card ">x</li>"#, 2),
        );
        let ranking = rank(&parse_document(&html));
        assert_eq!(ranking.candidates()[0].count, 4);
    }

    #[test]
    fn document_without_classes_has_no_candidates() {
        let ranking = rank(&parse_document("<div><p>one</p><p>two</p></div>"));
        assert!(ranking.is_empty());
    }

    #[test]
    fn css_selector_joins_tokens() {
        let sig = ClassSignature::new(["store", "card"]).unwrap();
        assert_eq!(sig.css_selector(), ".store.card");
        assert_eq!(sig.to_string(), ".store.card");
    }

    #[test]
    fn css_selector_escapes_awkward_tokens() {
        let sig = ClassSignature::new(["w-1/2", "2col"]).unwrap();
        assert_eq!(sig.css_selector(), r".w-1\/2.\32 col");
    }

    #[test]
    fn blank_tokens_do_not_form_a_signature() {
        assert!(ClassSignature::new(["", "  "]).is_none());
        assert!(ClassSignature::from_class_attr("   ").is_none());
    }

    #[test]
    fn matches_is_conjunctive_and_ignores_extra_classes() {
        let doc = parse_document(
            r#"<div class="card store featured"></div><div class="store"></div>"#,
        );
        let sig = ClassSignature::new(["store", "card"]).unwrap();
        let matched: Vec<bool> = crate::locator::document::elements(&doc)
            .filter(|el| el.value().name() == "div")
            .map(|el| sig.matches(el))
            .collect();
        assert_eq!(matched, [true, false]);
    }
}
