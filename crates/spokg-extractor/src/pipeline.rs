//! Extraction pipeline
//!
//! Segments a document, parses each sentence, extracts triples, and
//! concatenates them in document order.

use std::sync::Arc;

use serde::Serialize;

use crate::relation::extractor_for;
use crate::segment::segmenter_for;
use crate::{DependencyParser, SentenceSegmenter, Sentences, TripleExtractor};
use spokg_core::{ExtractionConfig, ParseFailurePolicy, Result, Triple};

/// Triples of one document run plus counters
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionReport {
    /// All triples, sentence order then emission order
    pub triples: Vec<Triple>,
    /// Sentences produced by the segmenter
    pub sentences_processed: usize,
    /// Sentences dropped because the parser failed on them
    pub sentences_skipped: usize,
    /// Parsed sentences that yielded no triple
    pub sentences_without_triples: usize,
}

impl ExtractionReport {
    pub fn triple_count(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn into_triples(self) -> Vec<Triple> {
        self.triples
    }
}

/// Segmenter, parser, and extractor wired together for one run
pub struct Pipeline {
    segmenter: Box<dyn SentenceSegmenter>,
    parser: Arc<dyn DependencyParser>,
    extractor: Box<dyn TripleExtractor>,
    on_parse_failure: ParseFailurePolicy,
}

impl Pipeline {
    /// Create a pipeline that skips sentences the parser fails on
    pub fn new(
        segmenter: Box<dyn SentenceSegmenter>,
        parser: Arc<dyn DependencyParser>,
        extractor: Box<dyn TripleExtractor>,
    ) -> Self {
        Self {
            segmenter,
            parser,
            extractor,
            on_parse_failure: ParseFailurePolicy::Skip,
        }
    }

    /// Build segmenter and extractor from configuration around a parser
    pub fn from_config(
        config: &ExtractionConfig,
        parser: Arc<dyn DependencyParser>,
    ) -> Result<Self> {
        let segmenter = segmenter_for(config, Arc::clone(&parser))?;
        let extractor = extractor_for(config);
        Ok(Self::new(segmenter, parser, extractor).with_failure_policy(config.on_parse_failure))
    }

    pub fn with_failure_policy(mut self, policy: ParseFailurePolicy) -> Self {
        self.on_parse_failure = policy;
        self
    }

    /// Sentences the configured segmenter produces for `text`
    pub fn segment<'a>(&'a self, text: &'a str) -> Result<Sentences<'a>> {
        self.segmenter.segment(text)
    }

    /// Parse one sentence and extract its triples
    pub fn extract_sentence(&self, sentence: &str) -> Result<Vec<Triple>> {
        let parsed = self.parser.parse(sentence)?;
        Ok(self.extractor.extract(&parsed))
    }

    /// Run the whole document.
    ///
    /// A parse failure either skips the sentence or aborts the run,
    /// depending on the failure policy. A segmentation failure always aborts.
    pub fn run(&self, text: &str) -> Result<ExtractionReport> {
        tracing::info!(chars = text.len(), "Extraction started");
        let mut report = ExtractionReport::default();

        for sentence in self.segment(text)? {
            report.sentences_processed += 1;

            match self.extract_sentence(&sentence) {
                Ok(triples) => {
                    tracing::debug!(
                        sentence = %sentence,
                        triples = triples.len(),
                        "Sentence extracted"
                    );
                    if triples.is_empty() {
                        report.sentences_without_triples += 1;
                    }
                    report.triples.extend(triples);
                }
                Err(e) if e.is_parse_unavailable() => match self.on_parse_failure {
                    ParseFailurePolicy::Skip => {
                        tracing::warn!("Skipping sentence: {}", e);
                        report.sentences_skipped += 1;
                    }
                    ParseFailurePolicy::Abort => return Err(e),
                },
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            sentences = report.sentences_processed,
            skipped = report.sentences_skipped,
            triples = report.triple_count(),
            "Extraction finished"
        );
        Ok(report)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relation::RootAnchoredExtractor;
    use crate::segment::RegexCompoundSegmenter;
    use spokg_core::{ParsedSentence, SpoError, Token};

    /// Parser that builds "<subject> <verb>s <object>" parses and fails on "garbled"
    struct TinyParser;

    impl DependencyParser for TinyParser {
        fn parse(&self, sentence: &str) -> Result<ParsedSentence> {
            if sentence.contains("garbled") {
                return Err(SpoError::parse_unavailable(sentence, "garbled"));
            }
            let words: Vec<&str> = sentence
                .split_whitespace()
                .map(|w| w.trim_end_matches(['.', ',']))
                .collect();
            if words.len() != 3 {
                return ParsedSentence::new(sentence, Vec::new());
            }
            ParsedSentence::new(
                sentence,
                vec![
                    Token::new(words[0], words[0], "NOUN", "nsubj").with_head(1),
                    Token::new(words[1], words[1].trim_end_matches('s'), "VERB", "ROOT"),
                    Token::new(words[2], words[2], "NOUN", "dobj").with_head(1),
                ],
            )
        }

        fn split_sentences(&self, text: &str) -> Result<Vec<String>> {
            Ok(text.split(". ").map(|s| s.to_string()).collect())
        }
    }

    fn regex_pipeline() -> Pipeline {
        Pipeline::new(
            Box::new(RegexCompoundSegmenter::new().unwrap()),
            Arc::new(TinyParser),
            Box::new(RootAnchoredExtractor::new()),
        )
    }

    #[test]
    fn test_run_preserves_order() {
        let report = regex_pipeline()
            .run("cats chase mice. dogs chase cats and birds eat seeds.")
            .unwrap();

        assert_eq!(
            report.triples,
            vec![
                Triple::new("cats", "chase", "mice"),
                Triple::new("dogs", "chase", "cats"),
                Triple::new("birds", "eat", "seeds"),
            ]
        );
        assert_eq!(report.sentences_processed, 3);
        assert_eq!(report.sentences_without_triples, 0);
    }

    #[test]
    fn test_run_keeps_duplicates() {
        let report = regex_pipeline()
            .run("cats chase mice. cats chase mice.")
            .unwrap();
        assert_eq!(report.triple_count(), 2);
        assert_eq!(report.triples[0], report.triples[1]);
    }

    #[test]
    fn test_run_empty_text() {
        let report = regex_pipeline().run("").unwrap();
        assert!(report.is_empty());
        assert_eq!(report.sentences_processed, 0);
    }

    #[test]
    fn test_skip_failed_sentences() {
        let report = regex_pipeline()
            .run("cats chase mice. garbled text here. birds eat seeds.")
            .unwrap();

        assert_eq!(report.sentences_processed, 3);
        assert_eq!(report.sentences_skipped, 1);
        assert_eq!(
            report.into_triples(),
            vec![
                Triple::new("cats", "chase", "mice"),
                Triple::new("birds", "eat", "seeds"),
            ]
        );
    }

    #[test]
    fn test_abort_on_failure() {
        let pipeline = regex_pipeline().with_failure_policy(ParseFailurePolicy::Abort);
        let result = pipeline.run("cats chase mice. garbled text here. birds eat seeds.");
        assert!(matches!(result, Err(SpoError::ParseUnavailable { .. })));
    }

    #[test]
    fn test_sentences_without_triples_counted() {
        let report = regex_pipeline().run("cats chase mice. it rained today on us.").unwrap();
        assert_eq!(report.sentences_processed, 2);
        assert_eq!(report.sentences_without_triples, 1);
        assert_eq!(report.triple_count(), 1);
    }

    #[test]
    fn test_from_config_parser_mode() {
        let config = ExtractionConfig {
            min_sentence_words: 3,
            ..Default::default()
        };
        let pipeline = Pipeline::from_config(&config, Arc::new(TinyParser)).unwrap();

        let report = pipeline.run("cats chase mice. no. dogs chase cats").unwrap();
        assert_eq!(report.sentences_processed, 2);
        assert_eq!(report.triple_count(), 2);
    }
}
