//! CoNLL-U parse adapter
//!
//! Serves dependency parses that were produced ahead of time and stored in
//! CoNLL-U format. Each sentence block carries a `# text = ...` comment and
//! one tab-separated line per word:
//!
//! ```text
//! ID  FORM  LEMMA  UPOS  XPOS  FEATS  HEAD  DEPREL  DEPS  MISC
//! ```
//!
//! `HEAD = 0` marks the root. Multiword token ranges (`1-2`) and empty nodes
//! (`1.1`) are skipped.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use crate::DependencyParser;
use spokg_core::{ParsedSentence, Result, SpoError, Token};

/// Dependency parser backed by a pre-parsed CoNLL-U document
#[derive(Debug, Clone, Default)]
pub struct ConlluParser {
    sentences: Vec<ParsedSentence>,
    /// Sentence text -> position in `sentences` (first occurrence wins)
    index: HashMap<String, usize>,
}

impl ConlluParser {
    /// Load a CoNLL-U file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| SpoError::io(path.display().to_string(), e))?;
        content.parse()
    }

    /// Stored sentences in file order
    pub fn sentences(&self) -> &[ParsedSentence] {
        &self.sentences
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// Full text of the document, sentences joined by a space
    pub fn document_text(&self) -> String {
        self.sentences
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn push(&mut self, sentence: ParsedSentence) {
        self.index
            .entry(sentence.text.clone())
            .or_insert(self.sentences.len());
        self.sentences.push(sentence);
    }
}

impl FromStr for ConlluParser {
    type Err = SpoError;

    fn from_str(content: &str) -> Result<Self> {
        let mut parser = Self::default();
        let mut block = SentenceBlock::default();

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                if let Some(sentence) = block.finish()? {
                    parser.push(sentence);
                }
                continue;
            }
            block.add_line(line_no + 1, line)?;
        }
        if let Some(sentence) = block.finish()? {
            parser.push(sentence);
        }

        tracing::debug!(sentences = parser.len(), "Loaded CoNLL-U document");
        Ok(parser)
    }
}

impl DependencyParser for ConlluParser {
    fn parse(&self, sentence: &str) -> Result<ParsedSentence> {
        self.index
            .get(sentence.trim())
            .and_then(|&i| self.sentences.get(i))
            .cloned()
            .ok_or_else(|| {
                SpoError::parse_unavailable(sentence, "sentence not in CoNLL-U document")
            })
    }

    /// Stored sentences that occur in `text`, in order of occurrence
    fn split_sentences(&self, text: &str) -> Result<Vec<String>> {
        let mut cursor = 0;
        let mut found = Vec::new();

        for sentence in &self.sentences {
            if let Some(offset) = text[cursor..].find(sentence.text.as_str()) {
                cursor += offset + sentence.text.len();
                found.push(sentence.text.clone());
            }
        }
        Ok(found)
    }
}

/// Accumulates the lines of one sentence block
#[derive(Default)]
struct SentenceBlock {
    text: Option<String>,
    tokens: Vec<Token>,
}

impl SentenceBlock {
    fn add_line(&mut self, line_no: usize, line: &str) -> Result<()> {
        if let Some(comment) = line.strip_prefix('#') {
            if let Some(text) = comment.trim_start().strip_prefix("text =") {
                self.text = Some(text.trim().to_string());
            }
            return Ok(());
        }

        let columns: Vec<&str> = line.split('\t').collect();
        if columns.len() < 8 {
            return Err(malformed(line_no, "expected at least 8 tab-separated columns"));
        }

        // Multiword ranges and empty nodes carry no dependency of their own
        if columns[0].contains('-') || columns[0].contains('.') {
            return Ok(());
        }

        let id: usize = columns[0]
            .parse()
            .map_err(|_| malformed(line_no, "non-numeric token id"))?;
        if id != self.tokens.len() + 1 {
            return Err(malformed(line_no, "token ids are not consecutive"));
        }

        let head: usize = columns[6]
            .parse()
            .map_err(|_| malformed(line_no, "non-numeric head"))?;

        let lemma = match columns[2] {
            "_" => "",
            lemma => lemma,
        };
        let token = Token::new(columns[1], lemma, columns[3], columns[7]);
        self.tokens.push(match head {
            0 => token,
            head => token.with_head(head - 1),
        });
        Ok(())
    }

    fn finish(&mut self) -> Result<Option<ParsedSentence>> {
        let tokens = std::mem::take(&mut self.tokens);
        let text = self.text.take();
        if tokens.is_empty() {
            return Ok(None);
        }

        let text = text.unwrap_or_else(|| {
            tokens
                .iter()
                .map(|t| t.text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        });
        ParsedSentence::new(text, tokens).map(Some)
    }
}

fn malformed(line_no: usize, reason: &str) -> SpoError {
    SpoError::parse_unavailable(
        format!("<conllu line {line_no}>"),
        format!("malformed CoNLL-U: {reason}"),
    )
}

// ============================================================================
// Tests
// ============================================================================
