//! HTTP dependency parser adapter
//!
//! Talks to a parse service that exposes `POST {base_url}/parse`:
//!
//! ```text
//! request:  {"text": "The sun warms the Earth."}
//! response: {"sentences": [{"text": "...", "tokens": [
//!              {"text": "sun", "lemma": "sun", "pos": "NOUN", "dep": "nsubj", "head": 2}, ...]}]}
//! ```
//!
//! `head` is the governor index within its sentence. `null` or the token's
//! own index (the spaCy convention) marks the root.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::DependencyParser;
use spokg_core::{ParsedSentence, ParserConfig, Result, SpoError, Token};

/// Blocking HTTP client for a dependency parse service
pub struct HttpParser {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpParser {
    /// Create a client for the configured service. No request is sent yet.
    pub fn new(config: &ParserConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SpoError::Other(anyhow::anyhow!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/parse", config.base_url.trim_end_matches('/')),
        })
    }

    /// Endpoint the adapter posts to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request(&self, text: &str) -> Result<ParseResponse> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&ParseRequest { text })
            .send()
            .map_err(|e| SpoError::parse_unavailable(text, format!("parser unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SpoError::parse_unavailable(
                text,
                format!("parser returned HTTP {status}"),
            ));
        }

        response
            .json::<ParseResponse>()
            .map_err(|e| SpoError::parse_unavailable(text, format!("undecodable response: {e}")))
    }
}

impl DependencyParser for HttpParser {
    fn parse(&self, sentence: &str) -> Result<ParsedSentence> {
        let response = self.request(sentence)?;
        response.into_parsed(sentence)
    }

    fn split_sentences(&self, text: &str) -> Result<Vec<String>> {
        let response = self.request(text)?;
        Ok(response.sentence_texts())
    }
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Serialize)]
struct ParseRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ParseResponse {
    #[serde(default)]
    sentences: Vec<WireSentence>,
}

#[derive(Debug, Deserialize)]
struct WireSentence {
    #[serde(default)]
    text: String,
    tokens: Vec<WireToken>,
}

#[derive(Debug, Deserialize)]
struct WireToken {
    text: String,
    #[serde(default)]
    lemma: String,
    pos: String,
    dep: String,
    #[serde(default)]
    head: Option<usize>,
}

impl WireSentence {
    fn into_parsed(self) -> Result<ParsedSentence> {
        let tokens = self
            .tokens
            .into_iter()
            .enumerate()
            .map(|(index, wire)| {
                let token = Token::new(wire.text, wire.lemma, wire.pos, wire.dep.as_str());
                match wire.head {
                    Some(head) if head != index => token.with_head(head),
                    _ => token,
                }
            })
            .collect();

        ParsedSentence::new(self.text, tokens)
    }

    fn display_text(&self) -> String {
        if self.text.trim().is_empty() {
            self.tokens
                .iter()
                .map(|t| t.text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        } else {
            self.text.clone()
        }
    }
}

impl ParseResponse {
    /// Merge every engine sentence into one parse of `input`
    pub(crate) fn into_parsed(self, input: &str) -> Result<ParsedSentence> {
        let mut merged = ParsedSentence::default();
        for sentence in self.sentences {
            merged.append(sentence.into_parsed()?);
        }
        merged.text = input.to_string();
        Ok(merged)
    }

    pub(crate) fn sentence_texts(&self) -> Vec<String> {
        self.sentences
            .iter()
            .map(WireSentence::display_text)
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
