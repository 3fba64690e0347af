//! Token-to-text decoding for display
//!
//! The tree never decodes tokens itself. Callers inject a [`TokenDecoder`]
//! (a tokenizer wrapper, or the JSON-backed [`VocabDecoder`]) and use
//! [`display_token`] to get a short, single-line label.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::tree::Token;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Failed to read vocabulary: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse vocabulary: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Vocabulary key '{0}' is not a token id")]
    BadKey(String),
}

/// Turns a token id into its text. `None` means the id could not be decoded.
pub trait TokenDecoder {
    fn decode(&self, id: u32) -> Option<String>;
}

impl<F> TokenDecoder for F
where
    F: Fn(u32) -> Option<String>,
{
    fn decode(&self, id: u32) -> Option<String> {
        self(id)
    }
}

/// Decoder that knows no tokens; every label falls back to its id
pub struct NoDecoder;

impl TokenDecoder for NoDecoder {
    fn decode(&self, _id: u32) -> Option<String> {
        None
    }
}

/// Id-to-text table loaded from a JSON object such as `{"15": "Hello"}`
#[derive(Debug, Default, Clone)]
pub struct VocabDecoder {
    vocab: HashMap<u32, String>,
}

#[derive(Deserialize)]
#[serde(transparent)]
struct RawVocab(HashMap<String, String>);

impl VocabDecoder {
    pub fn from_json(content: &str) -> Result<Self, DecodeError> {
        let RawVocab(raw) = serde_json::from_str(content)?;
        let mut vocab = HashMap::with_capacity(raw.len());
        for (key, text) in raw {
            let id = key
                .trim()
                .parse::<u32>()
                .map_err(|_| DecodeError::BadKey(key.clone()))?;
            vocab.insert(id, text);
        }
        Ok(Self { vocab })
    }

    pub fn load(path: &Path) -> Result<Self, DecodeError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn len(&self) -> usize {
        self.vocab.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vocab.is_empty()
    }
}

impl TokenDecoder for VocabDecoder {
    fn decode(&self, id: u32) -> Option<String> {
        self.vocab.get(&id).cloned()
    }
}

/// A display label for `token`.
///
/// Whitespace is made visible (`<NL>`, `<SP>`, `<TAB>`) and labels longer
/// than `max_len` characters are cut to end in `...`. Tokens the decoder
/// cannot handle show as `ID:<id>`.
pub fn display_token(token: Token, decoder: &dyn TokenDecoder, max_len: usize) -> String {
    let id = match token {
        Token::Root => return "ROOT".to_string(),
        Token::Unknown => return "???".to_string(),
        Token::Id(id) => id,
    };

    let Some(text) = decoder.decode(id) else {
        return format!("ID:{}", id);
    };

    let visible = text
        .replace('\n', "<NL>")
        .replace(' ', "<SP>")
        .replace('\t', "<TAB>");

    if visible.chars().count() > max_len {
        let keep = max_len.saturating_sub(3);
        let mut cut: String = visible.chars().take(keep).collect();
        cut.push_str("...");
        cut
    } else {
        visible
    }
}
