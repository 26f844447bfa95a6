//! Heuristic store-listing extractor.
//!
//! Works on any page that renders its locations as repeated, identically
//! styled elements:
//!
//! 1. rank the document's most repeated class signatures ([`rank`]),
//! 2. for each candidate in order, treat every element carrying it as one
//!    listing and classify the listing's text fragments ([`extract`]),
//! 3. return the records of the first candidate that yields any.
//!
//! Everything here is synchronous and allocation-local. The parsed document
//! is `!Send`, so async callers should run [`extract_all`] inside
//! `tokio::task::spawn_blocking`.

mod blocks;
mod classify;
mod coords;
mod document;
mod listing;
pub mod types;

use scraper::Html;
use serde::Serialize;

pub use blocks::{
    rank, CandidateRanking, ClassSignature, RankedCandidate, MAX_CANDIDATES, MIN_OCCURRENCES,
};
pub use classify::{classify, default_classifier, ClassifierRule, FieldClassifier};
pub use document::parse_document;
pub use types::{Address, FieldRole, LocationRecord};

use listing::extract_listings;

/// Outcome of one extraction run, with the ranking that led to it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Extraction {
    /// Candidates considered, most frequent first.
    pub candidates: CandidateRanking,
    /// The candidate whose containers produced `records`, if any did.
    pub signature: Option<ClassSignature>,
    pub records: Vec<LocationRecord>,
}

/// Extractor bound to a specific classifier rule table.
#[derive(Debug, Clone, Default)]
pub struct LocationExtractor {
    classifier: FieldClassifier,
}

impl LocationExtractor {
    #[must_use]
    pub fn new(classifier: FieldClassifier) -> Self {
        Self { classifier }
    }

    #[must_use]
    pub fn classifier(&self) -> &FieldClassifier {
        &self.classifier
    }

    #[must_use]
    pub fn extract_with_report(&self, html: &str) -> Extraction {
        run(html, &self.classifier)
    }

    #[must_use]
    pub fn extract_all(&self, html: &str) -> Vec<LocationRecord> {
        self.extract_with_report(html).records
    }
}

/// Extract listing records from `html` with the default rule table.
///
/// Total over any input: malformed markup is repaired by the parser, and a
/// page without a usable repeated block yields an empty vec.
#[must_use]
pub fn extract_all(html: &str) -> Vec<LocationRecord> {
    run(html, default_classifier()).records
}

/// Like [`extract_all`], also reporting the candidates and the winner.
#[must_use]
pub fn extract_with_report(html: &str) -> Extraction {
    run(html, default_classifier())
}

/// Extract one record per element carrying `signature`, using the default
/// rule table. Empty when no element matches.
#[must_use]
pub fn extract(document: &Html, signature: &ClassSignature) -> Vec<LocationRecord> {
    extract_listings(document, signature, default_classifier())
}

fn run(html: &str, classifier: &FieldClassifier) -> Extraction {
    let document = parse_document(html);
    let candidates = rank(&document);

    let winner = candidates.signatures().find_map(|signature| {
        let records = extract_listings(&document, signature, classifier);
        if records.is_empty() {
            tracing::trace!(selector = %signature, "candidate matched no containers");
            None
        } else {
            Some((signature.clone(), records))
        }
    });

    match winner {
        Some((signature, records)) => {
            tracing::debug!(
                selector = %signature,
                count = records.len(),
                "selected listing container"
            );
            Extraction {
                candidates,
                signature: Some(signature),
                records,
            }
        }
        None => {
            tracing::debug!(
                candidates = candidates.len(),
                "no candidate produced any listing"
            );
            Extraction {
                candidates,
                signature: None,
                records: Vec::new(),
            }
        }
    }
}
