//! Sentence segmentation
//!
//! Two strategies:
//! - Parser-driven: sentence boundaries from the dependency parser,
//!   fragments shorter than a word threshold dropped
//! - Regex compound: split on terminal punctuation and coordinating
//!   conjunctions, guarded against title abbreviations

use std::sync::Arc;

use regex::{CaptureMatches, Regex};

use crate::{DependencyParser, SentenceSegmenter, Sentences};
use spokg_core::{ExtractionConfig, Result, SegmentationMode, SpoError};

/// Conjunctions that start a new clause fragment
pub const CONJUNCTIONS: [&str; 7] = ["and", "but", "or", "so", "because", "while", "although"];

/// Title abbreviations whose period does not end a sentence
pub const TITLE_ABBREVIATIONS: [&str; 3] = ["Mr", "Dr", "Ms"];

// ============================================================================
// Regex compound splitting
// ============================================================================

/// Splits text at terminal punctuation and at coordinating conjunctions.
///
/// The conjunction itself is dropped; terminal punctuation stays with the
/// fragment it ends. The regex engine has no lookbehind, so a boundary whose
/// preceding word is a title abbreviation is skipped while scanning, which
/// keeps `Mr. Smith` in one fragment.
pub struct RegexCompoundSegmenter {
    boundary: Regex,
    abbreviations: Vec<String>,
}

impl RegexCompoundSegmenter {
    /// Create a segmenter with the default conjunctions and abbreviations
    pub fn new() -> Result<Self> {
        Self::with_conjunctions(&CONJUNCTIONS)
    }

    /// Create a segmenter that splits on a custom conjunction list
    pub fn with_conjunctions(conjunctions: &[&str]) -> Result<Self> {
        let words: Vec<String> = conjunctions.iter().map(|c| regex::escape(c)).collect();
        let pattern = if words.is_empty() {
            r"(?P<terminal>[.?!])\s+".to_string()
        } else {
            format!(r"(?P<terminal>[.?!])\s+|\b(?:{})\b", words.join("|"))
        };

        let boundary = Regex::new(&pattern)
            .map_err(|e| SpoError::Other(anyhow::anyhow!("invalid boundary pattern: {e}")))?;

        Ok(Self {
            boundary,
            abbreviations: TITLE_ABBREVIATIONS.iter().map(|a| a.to_string()).collect(),
        })
    }

    /// Replace the abbreviation guard list
    pub fn with_abbreviations(mut self, abbreviations: &[&str]) -> Self {
        self.abbreviations = abbreviations.iter().map(|a| a.to_string()).collect();
        self
    }

    /// Iterate fragments of `text` without allocating the full list
    pub fn fragments<'a>(&'a self, text: &'a str) -> CompoundFragments<'a> {
        CompoundFragments {
            text,
            boundaries: self.boundary.captures_iter(text),
            abbreviations: &self.abbreviations,
            start: 0,
            done: false,
        }
    }
}

impl SentenceSegmenter for RegexCompoundSegmenter {
    fn segment<'a>(&'a self, text: &'a str) -> Result<Sentences<'a>> {
        Ok(Box::new(self.fragments(text)))
    }
}

/// Iterator over the fragments produced by [`RegexCompoundSegmenter`]
pub struct CompoundFragments<'a> {
    text: &'a str,
    boundaries: CaptureMatches<'a, 'a>,
    abbreviations: &'a [String],
    start: usize,
    done: bool,
}

impl CompoundFragments<'_> {
    /// Whether the word right before a boundary is a guarded abbreviation
    fn follows_abbreviation(&self, before: &str) -> bool {
        before
            .split_whitespace()
            .last()
            .map(|word| word.trim_end_matches('.'))
            .is_some_and(|word| self.abbreviations.iter().any(|a| a == word))
    }
}

impl Iterator for CompoundFragments<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            if self.done {
                return None;
            }

            let (fragment_end, next_start) = match self.boundaries.next() {
                Some(caps) => {
                    let Some(whole) = caps.get(0) else {
                        continue;
                    };
                    // Terminal punctuation stays in the fragment, the
                    // conjunction does not.
                    let (word_end, fragment_end) = match caps.name("terminal") {
                        Some(terminal) => (terminal.start(), terminal.end()),
                        None => (whole.start(), whole.start()),
                    };

                    if self.follows_abbreviation(&self.text[self.start..word_end]) {
                        continue;
                    }
                    (fragment_end, whole.end())
                }
                None => {
                    self.done = true;
                    (self.text.len(), self.text.len())
                }
            };

            let fragment = self.text[self.start..fragment_end].trim();
            self.start = next_start;

            if !fragment.is_empty() {
                return Some(fragment.to_string());
            }
        }
    }
}

// ============================================================================
// Parser-driven segmentation
// ============================================================================

/// Uses the dependency parser's sentence boundaries and drops short fragments
pub struct ParserSegmenter {
    parser: Arc<dyn DependencyParser>,
    min_words: usize,
}

impl ParserSegmenter {
    /// Create a parser-driven segmenter with the default 5-word threshold
    pub fn new(parser: Arc<dyn DependencyParser>) -> Self {
        Self {
            parser,
            min_words: 5,
        }
    }

    /// Set the minimum number of words a sentence must have
    pub fn with_min_words(mut self, min_words: usize) -> Self {
        self.min_words = min_words;
        self
    }
}

impl SentenceSegmenter for ParserSegmenter {
    fn segment<'a>(&'a self, text: &'a str) -> Result<Sentences<'a>> {
        if text.trim().is_empty() {
            return Ok(Box::new(std::iter::empty()));
        }

        let sentences = self.parser.split_sentences(text)?;
        let min_words = self.min_words;

        Ok(Box::new(sentences.into_iter().filter_map(move |sentence| {
            let sentence = sentence.trim();
            if sentence.split_whitespace().count() >= min_words {
                Some(sentence.to_string())
            } else {
                tracing::trace!(fragment = sentence, "Dropping short fragment");
                None
            }
        })))
    }
}

/// Build the segmenter selected by the configuration
pub fn segmenter_for(
    config: &ExtractionConfig,
    parser: Arc<dyn DependencyParser>,
) -> Result<Box<dyn SentenceSegmenter>> {
    Ok(match config.segmentation_mode {
        SegmentationMode::Parser => {
            Box::new(ParserSegmenter::new(parser).with_min_words(config.min_sentence_words))
        }
        SegmentationMode::RegexCompound => Box::new(RegexCompoundSegmenter::new()?),
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use spokg_core::ParsedSentence;

    /// Parser whose sentence splitter cuts on ". " only
    struct PeriodSplitter;

    impl DependencyParser for PeriodSplitter {
        fn parse(&self, sentence: &str) -> Result<ParsedSentence> {
            ParsedSentence::new(sentence, Vec::new())
        }

        fn split_sentences(&self, text: &str) -> Result<Vec<String>> {
            Ok(text.split(". ").map(|s| s.to_string()).collect())
        }
    }

    struct UnreachableParser;

    impl DependencyParser for UnreachableParser {
        fn parse(&self, sentence: &str) -> Result<ParsedSentence> {
            Err(SpoError::parse_unavailable(sentence, "no model"))
        }

        fn split_sentences(&self, text: &str) -> Result<Vec<String>> {
            Err(SpoError::parse_unavailable(text, "no model"))
        }
    }

    fn split(text: &str) -> Vec<String> {
        RegexCompoundSegmenter::new().unwrap().fragments(text).collect()
    }

    #[test]
    fn test_split_on_conjunction() {
        assert_eq!(
            split("He left quickly, but Mary stayed."),
            vec!["He left quickly,", "Mary stayed."]
        );
    }

    #[test]
    fn test_split_on_terminal_punctuation() {
        assert_eq!(
            split("It rained. Did it stop? Yes! Good"),
            vec!["It rained.", "Did it stop?", "Yes!", "Good"]
        );
    }

    #[test]
    fn test_abbreviation_guard() {
        assert_eq!(
            split("Mr. Smith met Dr. Jones. They talked."),
            vec!["Mr. Smith met Dr. Jones.", "They talked."]
        );
    }

    #[test]
    fn test_conjunction_requires_word_boundary() {
        assert_eq!(
            split("The sandbox stores fortunes."),
            vec!["The sandbox stores fortunes."]
        );
    }

    #[test]
    fn test_conjunction_is_case_sensitive() {
        assert_eq!(split("And then it ended."), vec!["And then it ended."]);
    }

    #[test]
    fn test_leading_conjunctions_dropped() {
        assert_eq!(split("and so it goes"), vec!["it goes"]);
    }

    #[test]
    fn test_empty_text() {
        assert!(split("").is_empty());
        assert!(split("   ").is_empty());
    }

    #[test]
    fn test_single_sentence_idempotent() {
        let sentence = "The sun warms the Earth.";
        let once = split(sentence);
        assert_eq!(once, vec![sentence]);

        let twice: Vec<String> = once.iter().flat_map(|s| split(s)).collect();
        assert_eq!(twice, once);
    }

    #[test]
    fn test_custom_abbreviations() {
        let segmenter = RegexCompoundSegmenter::new()
            .unwrap()
            .with_abbreviations(&["Prof"]);
        let fragments: Vec<String> = segmenter
            .fragments("Prof. Lee spoke. Mr. Ray left.")
            .collect();
        assert_eq!(fragments, vec!["Prof. Lee spoke.", "Mr.", "Ray left."]);
    }

    #[test]
    fn test_parser_segmenter_drops_short_fragments() {
        let segmenter = ParserSegmenter::new(Arc::new(PeriodSplitter));
        let text =
            "Chapter one. The old man walked to the sea. He slept. Then the boy came home late";

        let sentences: Vec<String> = segmenter.segment(text).unwrap().collect();
        assert_eq!(
            sentences,
            vec![
                "The old man walked to the sea",
                "Then the boy came home late"
            ]
        );
    }

    #[test]
    fn test_parser_segmenter_custom_threshold() {
        let segmenter = ParserSegmenter::new(Arc::new(PeriodSplitter)).with_min_words(2);
        let sentences: Vec<String> = segmenter
            .segment("Chapter one. He slept. Go")
            .unwrap()
            .collect();
        assert_eq!(sentences, vec!["Chapter one", "He slept"]);
    }

    #[test]
    fn test_parser_segmenter_empty_text_skips_parser() {
        let segmenter = ParserSegmenter::new(Arc::new(UnreachableParser));
        assert_eq!(segmenter.segment("  ").unwrap().count(), 0);
    }

    #[test]
    fn test_parser_segmenter_surfaces_failure() {
        let segmenter = ParserSegmenter::new(Arc::new(UnreachableParser));
        let result = segmenter.segment("Some text here.");
        assert!(matches!(result, Err(SpoError::ParseUnavailable { .. })));
    }

    #[test]
    fn test_segmenter_for_config() {
        let config = ExtractionConfig {
            segmentation_mode: SegmentationMode::RegexCompound,
            ..Default::default()
        };

        let segmenter = segmenter_for(&config, Arc::new(UnreachableParser)).unwrap();
        let sentences: Vec<String> = segmenter.segment("Cats purr. Dogs bark").unwrap().collect();
        assert_eq!(sentences, vec!["Cats purr.", "Dogs bark"]);
    }
}
