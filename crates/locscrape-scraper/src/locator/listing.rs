//! Per-container record assembly.

use std::collections::HashMap;

use scraper::{ElementRef, Html};

use super::blocks::ClassSignature;
use super::classify::FieldClassifier;
use super::coords::recover_coordinates;
use super::document::{descendant_elements, elements, raw_text, stripped_text};
use super::types::{Address, FieldRole, LocationRecord};

/// Text fragments grouped by role, in the order they were seen.
#[derive(Debug, Default)]
struct FieldBuckets(HashMap<FieldRole, Vec<String>>);

impl FieldBuckets {
    fn push(&mut self, role: FieldRole, text: String) {
        self.0.entry(role).or_default().push(text);
    }

    fn first(&self, role: FieldRole) -> Option<String> {
        self.0.get(&role).and_then(|texts| texts.first()).cloned()
    }
}

/// Extract one record per element matching `signature`, in document order.
///
/// Returns an empty vec when no element carries the signature's classes.
pub(crate) fn extract_listings(
    document: &Html,
    signature: &ClassSignature,
    classifier: &FieldClassifier,
) -> Vec<LocationRecord> {
    let records: Vec<LocationRecord> = elements(document)
        .filter(|el| signature.matches(*el))
        .map(|container| build_record(container, classifier))
        .collect();

    tracing::debug!(
        selector = %signature,
        containers = records.len(),
        "extracted listing containers"
    );

    records
}

/// Classify every text-bearing descendant of `container` and keep the first
/// fragment per role.
///
/// A parent and its text-bearing children are both visited, so one phrase can
/// land in several buckets. That overlap is kept as-is.
fn build_record(container: ElementRef<'_>, classifier: &FieldClassifier) -> LocationRecord {
    let mut buckets = FieldBuckets::default();

    for element in descendant_elements(container) {
        let text = stripped_text(element);
        if text.is_empty() {
            continue;
        }
        let role = classifier.classify(raw_text(element).trim());
        buckets.push(role, text);
    }

    let (latitude, longitude) = recover_coordinates(container).unzip();

    LocationRecord {
        name: buckets.first(FieldRole::Name),
        address: Address {
            street: buckets.first(FieldRole::Street),
            city: buckets.first(FieldRole::City),
            region: buckets.first(FieldRole::Region),
            postal: buckets.first(FieldRole::Postal),
        },
        phone: buckets.first(FieldRole::Phone),
        latitude,
        longitude,
    }
}
