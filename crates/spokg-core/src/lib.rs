//! SPOKG Core - Domain models, errors, and shared configuration
//!
//! This crate defines the abstractions shared by the extraction pipeline:
//! - Parse model (tokens, dependency labels, parsed sentences)
//! - Subject-Predicate-Object triples
//! - Common error types
//! - Configuration management

pub mod config;

pub use config::{
    AppConfig, ConfigError, ExtractionConfig, ExtractionPolicy, LoggingConfig, ParseFailurePolicy,
    ParserConfig, SegmentationMode,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for SPOKG operations
#[derive(Error, Debug)]
pub enum SpoError {
    /// The dependency parser could not process a sentence
    #[error("Parse unavailable for {sentence:?}: {reason}")]
    ParseUnavailable { sentence: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error on {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SpoError {
    /// Build a `ParseUnavailable` error for a sentence
    pub fn parse_unavailable(sentence: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::ParseUnavailable {
            sentence: sentence.into(),
            reason: reason.to_string(),
        }
    }

    /// Build an IO error tagged with the path involved
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the error is recoverable at sentence granularity
    pub fn is_parse_unavailable(&self) -> bool {
        matches!(self, Self::ParseUnavailable { .. })
    }
}

pub type Result<T> = std::result::Result<T, SpoError>;

// ============================================================================
// Parse Model
// ============================================================================

/// Coarse part-of-speech tag (Universal POS tag set)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PartOfSpeech {
    Noun,
    ProperNoun,
    Pronoun,
    Verb,
    Auxiliary,
    Adjective,
    Adverb,
    Adposition,
    Determiner,
    Conjunction,
    Punctuation,
    /// Any tag the model does not name explicitly
    Other(String),
}

impl PartOfSpeech {
    /// Get the tag string
    pub fn as_str(&self) -> &str {
        match self {
            Self::Noun => "NOUN",
            Self::ProperNoun => "PROPN",
            Self::Pronoun => "PRON",
            Self::Verb => "VERB",
            Self::Auxiliary => "AUX",
            Self::Adjective => "ADJ",
            Self::Adverb => "ADV",
            Self::Adposition => "ADP",
            Self::Determiner => "DET",
            Self::Conjunction => "CCONJ",
            Self::Punctuation => "PUNCT",
            Self::Other(tag) => tag.as_str(),
        }
    }

    /// Noun or proper noun
    pub fn is_nominal(&self) -> bool {
        matches!(self, Self::Noun | Self::ProperNoun)
    }
}

impl From<&str> for PartOfSpeech {
    fn from(tag: &str) -> Self {
        match tag.to_uppercase().as_str() {
            "NOUN" => Self::Noun,
            "PROPN" => Self::ProperNoun,
            "PRON" => Self::Pronoun,
            "VERB" => Self::Verb,
            "AUX" => Self::Auxiliary,
            "ADJ" => Self::Adjective,
            "ADV" => Self::Adverb,
            "ADP" => Self::Adposition,
            "DET" => Self::Determiner,
            "CCONJ" | "CONJ" => Self::Conjunction,
            "PUNCT" => Self::Punctuation,
            _ => Self::Other(tag.to_string()),
        }
    }
}

impl From<String> for PartOfSpeech {
    fn from(tag: String) -> Self {
        Self::from(tag.as_str())
    }
}

impl From<PartOfSpeech> for String {
    fn from(pos: PartOfSpeech) -> Self {
        pos.as_str().to_string()
    }
}

impl std::fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Dependency relation label of a token relative to its governor
/// (e.g. `nsubj`, `dobj`, `attr`, `ROOT`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyLabel(String);

impl DependencyLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Sentence root (`ROOT` in spaCy, `root` in Universal Dependencies)
    pub fn is_root(&self) -> bool {
        self.0.eq_ignore_ascii_case("root")
    }

    /// Any subject relation (`nsubj`, `nsubjpass`, `csubj`, ...)
    pub fn is_subject(&self) -> bool {
        self.0.contains("subj")
    }

    /// Any object relation (`dobj`, `obj`, `pobj`, `iobj`, ...)
    pub fn is_object(&self) -> bool {
        self.0.contains("obj")
    }

    /// Attribute complement of a copula
    pub fn is_attribute(&self) -> bool {
        self.0 == "attr"
    }

    /// Object slot: an object relation or an attribute complement
    pub fn is_object_or_attribute(&self) -> bool {
        self.is_object() || self.is_attribute()
    }
}

impl From<&str> for DependencyLabel {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl std::fmt::Display for DependencyLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A parsed word unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Surface text
    pub text: String,

    /// Base form
    pub lemma: String,

    /// Coarse part-of-speech tag
    pub pos: PartOfSpeech,

    /// Relation to the governing token
    pub dep: DependencyLabel,

    /// Index of the governing token within the sentence (None for the root)
    pub head: Option<usize>,
}

impl Token {
    /// Create a token without a governor
    pub fn new(
        text: impl Into<String>,
        lemma: impl Into<String>,
        pos: impl Into<PartOfSpeech>,
        dep: impl Into<DependencyLabel>,
    ) -> Self {
        Self {
            text: text.into(),
            lemma: lemma.into(),
            pos: pos.into(),
            dep: dep.into(),
            head: None,
        }
    }

    /// Set the governing token index
    pub fn with_head(mut self, head: usize) -> Self {
        self.head = Some(head);
        self
    }
}

/// One sentence worth of tokens, as returned by the dependency parser.
///
/// Tokens are stored in sentence order and refer to their governor by index,
/// so a token's children are the tokens whose `head` points back at it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedSentence {
    /// Sentence text as sent to the parser
    pub text: String,

    tokens: Vec<Token>,
}

impl ParsedSentence {
    /// Create a parsed sentence, checking that every head index is in range
    pub fn new(text: impl Into<String>, tokens: Vec<Token>) -> Result<Self> {
        let text = text.into();
        for (index, token) in tokens.iter().enumerate() {
            match token.head {
                Some(head) if head >= tokens.len() => {
                    return Err(SpoError::parse_unavailable(
                        text,
                        format!("token {index} has out-of-range head {head}"),
                    ));
                }
                Some(head) if head == index => {
                    return Err(SpoError::parse_unavailable(
                        text,
                        format!("token {index} governs itself"),
                    ));
                }
                _ => {}
            }
        }
        Ok(Self { text, tokens })
    }

    /// All tokens in sentence order
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn token(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Direct children of a token, left to right
    pub fn children(&self, index: usize) -> impl Iterator<Item = &Token> + '_ {
        self.tokens
            .iter()
            .filter(move |token| token.head == Some(index))
    }

    /// Governing token of a token
    pub fn head_of(&self, index: usize) -> Option<(usize, &Token)> {
        let head = self.tokens.get(index)?.head?;
        self.tokens.get(head).map(|token| (head, token))
    }

    /// Tokens labeled as sentence root, with their indices
    pub fn roots(&self) -> impl Iterator<Item = (usize, &Token)> + '_ {
        self.tokens
            .iter()
            .enumerate()
            .filter(|(_, token)| token.dep.is_root())
    }

    /// Append another parse, re-basing its head indices after this one's tokens
    pub fn append(&mut self, other: ParsedSentence) {
        let offset = self.tokens.len();
        self.tokens
            .extend(other.tokens.into_iter().map(|mut token| {
                token.head = token.head.map(|head| head + offset);
                token
            }));

        if self.text.is_empty() {
            self.text = other.text;
        } else if !other.text.is_empty() {
            self.text.push(' ');
            self.text.push_str(&other.text);
        }
    }
}

// ============================================================================
// Triples
// ============================================================================

/// A (Subject, Predicate, Object) fact extracted from a sentence
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl Triple {
    /// Create a new triple
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// Create a triple from trimmed fields, only if none is blank
    pub fn complete(subject: &str, predicate: &str, object: &str) -> Option<Self> {
        let (subject, predicate, object) = (subject.trim(), predicate.trim(), object.trim());
        if subject.is_empty() || predicate.is_empty() || object.is_empty() {
            return None;
        }
        Some(Self::new(subject, predicate, object))
    }
}

impl std::fmt::Display for Triple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.subject, self.predicate, self.object)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sun_warms_earth() -> ParsedSentence {
        ParsedSentence::new(
            "The sun warms the Earth.",
            vec![
                Token::new("The", "the", "DET", "det").with_head(1),
                Token::new("sun", "sun", "NOUN", "nsubj").with_head(2),
                Token::new("warms", "warm", "VERB", "ROOT"),
                Token::new("the", "the", "DET", "det").with_head(4),
                Token::new("Earth", "Earth", "PROPN", "dobj").with_head(2),
                Token::new(".", ".", "PUNCT", "punct").with_head(2),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_dependency_label_roles() {
        assert!(DependencyLabel::new("ROOT").is_root());
        assert!(DependencyLabel::new("root").is_root());
        assert!(DependencyLabel::new("nsubjpass").is_subject());
        assert!(DependencyLabel::new("pobj").is_object());
        assert!(DependencyLabel::new("attr").is_object_or_attribute());
        assert!(!DependencyLabel::new("amod").is_object_or_attribute());
    }

    #[test]
    fn test_part_of_speech_parse() {
        assert_eq!(PartOfSpeech::from("propn"), PartOfSpeech::ProperNoun);
        assert_eq!(PartOfSpeech::from("NOUN"), PartOfSpeech::Noun);
        assert_eq!(
            PartOfSpeech::from("SYM"),
            PartOfSpeech::Other("SYM".to_string())
        );
        assert!(PartOfSpeech::ProperNoun.is_nominal());
        assert!(!PartOfSpeech::Pronoun.is_nominal());
    }

    #[test]
    fn test_part_of_speech_serde() {
        let json = serde_json::to_string(&PartOfSpeech::ProperNoun).unwrap();
        assert_eq!(json, "\"PROPN\"");

        let pos: PartOfSpeech = serde_json::from_str("\"X\"").unwrap();
        assert_eq!(pos, PartOfSpeech::Other("X".to_string()));
    }

    #[test]
    fn test_parsed_sentence_tree() {
        let sentence = sun_warms_earth();

        let roots: Vec<_> = sentence.roots().map(|(i, _)| i).collect();
        assert_eq!(roots, vec![2]);

        let children: Vec<&str> = sentence.children(2).map(|t| t.text.as_str()).collect();
        assert_eq!(children, vec!["sun", "Earth", "."]);

        let (head, token) = sentence.head_of(1).unwrap();
        assert_eq!(head, 2);
        assert_eq!(token.lemma, "warm");
        assert!(sentence.head_of(2).is_none());
    }

    #[test]
    fn test_parsed_sentence_rejects_bad_heads() {
        let out_of_range =
            ParsedSentence::new("x", vec![Token::new("x", "x", "X", "dep").with_head(3)]);
        assert!(matches!(
            out_of_range,
            Err(SpoError::ParseUnavailable { .. })
        ));

        let self_headed =
            ParsedSentence::new("x", vec![Token::new("x", "x", "X", "dep").with_head(0)]);
        assert!(self_headed.is_err());
    }

    #[test]
    fn test_parsed_sentence_append_rebases_heads() {
        let mut first = sun_warms_earth();
        let second = ParsedSentence::new(
            "It shines.",
            vec![
                Token::new("It", "it", "PRON", "nsubj").with_head(1),
                Token::new("shines", "shine", "VERB", "ROOT"),
            ],
        )
        .unwrap();

        first.append(second);

        assert_eq!(first.len(), 8);
        assert_eq!(first.token(6).unwrap().head, Some(7));
        assert_eq!(first.roots().count(), 2);
        assert_eq!(first.text, "The sun warms the Earth. It shines.");
    }

    #[test]
    fn test_triple_complete() {
        assert!(Triple::complete("sun", "warm", "Earth").is_some());
        assert!(Triple::complete("", "warm", "Earth").is_none());
        assert!(Triple::complete("sun", " ", "Earth").is_none());
        assert!(Triple::complete("sun", "warm", "").is_none());
        assert_eq!(
            Triple::complete(" sun", "warm ", "Earth"),
            Some(Triple::new("sun", "warm", "Earth"))
        );
    }

    #[test]
    fn test_triple_display() {
        let triple = Triple::new("sun", "warm", "Earth");
        assert_eq!(triple.to_string(), "(sun, warm, Earth)");
    }

    #[test]
    fn test_error_classification() {
        let err = SpoError::parse_unavailable("The sun.", "model not loaded");
        assert!(err.is_parse_unavailable());
        assert!(err.to_string().contains("model not loaded"));

        let other = SpoError::Other(anyhow::anyhow!("boom"));
        assert!(!other.is_parse_unavailable());
    }
}
