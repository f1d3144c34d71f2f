//! Relation Extraction (RE) module
//!
//! Extracts (subject, predicate, object) triples from a dependency parse.
//! Two policies are supported:
//! - Root-anchored: one triple per sentence root, last valid candidate wins,
//!   subject/object must be nominal
//! - Subject-anchored: one triple per subject token, predicate is the
//!   subject's governor, first object child wins, no POS filter

use crate::TripleExtractor;
use spokg_core::{ExtractionConfig, ExtractionPolicy, ParsedSentence, Token, Triple};

/// Personal pronouns dropped when pronoun exclusion is on
pub const PERSONAL_PRONOUNS: [&str; 7] = ["i", "he", "she", "it", "they", "we", "you"];

/// Case-insensitive membership in [`PERSONAL_PRONOUNS`]
pub fn is_personal_pronoun(text: &str) -> bool {
    let lower = text.trim().to_lowercase();
    PERSONAL_PRONOUNS.contains(&lower.as_str())
}

// ============================================================================
// Root-anchored RE
// ============================================================================

/// Extracts main-clause facts anchored at the sentence root.
///
/// Subject and object are chosen among the root's direct children, scanning
/// left to right; when several children qualify, the last one wins.
#[derive(Debug, Clone, Default)]
pub struct RootAnchoredExtractor {
    exclude_pronouns: bool,
}

impl RootAnchoredExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop personal pronouns as subject/object candidates
    pub fn with_pronoun_exclusion(mut self, exclude: bool) -> Self {
        self.exclude_pronouns = exclude;
        self
    }

    /// Subject/object validity: nominal, and not an excluded pronoun
    fn is_valid_argument(&self, token: &Token) -> bool {
        token.pos.is_nominal() && !(self.exclude_pronouns && is_personal_pronoun(&token.text))
    }
}

impl TripleExtractor for RootAnchoredExtractor {
    fn extract(&self, sentence: &ParsedSentence) -> Vec<Triple> {
        sentence
            .roots()
            .filter_map(|(index, root)| {
                let subject = sentence
                    .children(index)
                    .filter(|child| child.dep.is_subject() && self.is_valid_argument(child))
                    .last()?;
                let object = sentence
                    .children(index)
                    .filter(|child| {
                        child.dep.is_object_or_attribute() && self.is_valid_argument(child)
                    })
                    .last()?;

                Triple::complete(&subject.text, &root.lemma, &object.text)
            })
            .collect()
    }
}

// ============================================================================
// Subject-anchored RE
// ============================================================================

/// Emits one triple per subject-bearing token anywhere in the sentence.
///
/// The predicate is the subject's governor; the object is the governor's
/// first child labeled as an object or attribute. No part-of-speech filter.
#[derive(Debug, Clone, Default)]
pub struct SubjectAnchoredExtractor {
    exclude_pronouns: bool,
}

impl SubjectAnchoredExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop triples whose subject or object is a personal pronoun
    pub fn with_pronoun_exclusion(mut self, exclude: bool) -> Self {
        self.exclude_pronouns = exclude;
        self
    }

    fn is_excluded(&self, token: &Token) -> bool {
        self.exclude_pronouns && is_personal_pronoun(&token.text)
    }
}

impl TripleExtractor for SubjectAnchoredExtractor {
    fn extract(&self, sentence: &ParsedSentence) -> Vec<Triple> {
        sentence
            .tokens()
            .iter()
            .enumerate()
            .filter(|(_, token)| token.dep.is_subject())
            .filter_map(|(index, subject)| {
                let (head_index, predicate) = sentence.head_of(index)?;
                let object = sentence
                    .children(head_index)
                    .find(|child| child.dep.is_object_or_attribute())?;

                if self.is_excluded(subject) || self.is_excluded(object) {
                    return None;
                }
                Triple::complete(&subject.text, &predicate.lemma, &object.text)
            })
            .collect()
    }
}

/// Build the extractor selected by the configuration
pub fn extractor_for(config: &ExtractionConfig) -> Box<dyn TripleExtractor> {
    match config.extraction_policy {
        ExtractionPolicy::RootAnchored => Box::new(
            RootAnchoredExtractor::new().with_pronoun_exclusion(config.exclude_pronouns),
        ),
        ExtractionPolicy::SubjectAnchored => Box::new(
            SubjectAnchoredExtractor::new().with_pronoun_exclusion(config.exclude_pronouns),
        ),
    }
}

// ============================================================================
// Tests
// ============================================================================
