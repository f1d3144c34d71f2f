//! SPOKG Extractor - SPO triple extraction pipeline
//!
//! Segments raw text into sentences, sends each sentence through a
//! dependency parser, and extracts (subject, predicate, object) triples
//! from the parse tree.

use spokg_core::{ParsedSentence, Result, Triple};

/// Lazy sequence of trimmed, non-empty sentences in document order
pub type Sentences<'a> = Box<dyn Iterator<Item = String> + 'a>;

/// Trait for the external dependency parse engine
pub trait DependencyParser: Send + Sync {
    /// Parse one sentence into tokens with dependency links
    fn parse(&self, sentence: &str) -> Result<ParsedSentence>;

    /// Sentence boundaries as detected by the engine
    fn split_sentences(&self, text: &str) -> Result<Vec<String>>;
}

/// Trait for sentence segmentation strategies
pub trait SentenceSegmenter: Send + Sync {
    fn segment<'a>(&'a self, text: &'a str) -> Result<Sentences<'a>>;
}

/// Trait for triple extraction policies
pub trait TripleExtractor: Send + Sync {
    fn extract(&self, sentence: &ParsedSentence) -> Vec<Triple>;
}

pub mod conllu;
pub mod http_parser;
pub mod pipeline;
pub mod relation;
pub mod segment;
pub mod text;

pub use conllu::ConlluParser;
pub use http_parser::HttpParser;
pub use pipeline::{ExtractionReport, Pipeline};
pub use relation::{extractor_for, RootAnchoredExtractor, SubjectAnchoredExtractor};
pub use segment::{segmenter_for, ParserSegmenter, RegexCompoundSegmenter};
pub use text::TextPreparer;
