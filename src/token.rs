//! Core token model shared by the matching engine, the renderer, and the
//! tag-context walker.
//!
//! A tokenization pass turns an input string into a [`TokenStream`]: an
//! ordered sequence of plain-text segments and classified [`Token`]s. Tokens
//! may nest (a rule with a sub-grammar produces a token whose content is
//! itself a stream), so the result is a tree whose leaves, read left to
//! right, always reproduce the input text.
//!
//! Offsets and lengths are byte counts over the original input. A token's
//! `length` is the number of bytes it consumed from the input, which lets
//! range-painting consumers map tokens back onto the source by walking the
//! stream and accumulating leaf lengths.

use serde::Serialize;

/// The content of a [`Token`]: either the raw matched text, or a nested
/// stream produced by recursively tokenizing the match against the rule's
/// sub-grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TokenContent {
    Text(String),
    Stream(TokenStream),
}

/// A classified span of input text.
///
/// Tokens are created by the matching engine (one per rule match) and by the
/// tag-context walker (merged `plain-text` tokens). Fields are written once
/// at construction; the public surface is read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    #[serde(rename = "type")]
    kind: String,
    content: TokenContent,
    #[serde(rename = "alias")]
    aliases: Vec<String>,
    length: usize,
}

impl Token {
    pub fn new(
        kind: impl Into<String>,
        content: TokenContent,
        aliases: Vec<String>,
        length: usize,
    ) -> Self {
        Self {
            kind: kind.into(),
            content,
            aliases,
            length,
        }
    }

    /// The token-type name, i.e. the grammar key of the rule that matched.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn content(&self) -> &TokenContent {
        &self.content
    }

    /// Extra class names attached by the matching rule.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Byte length of the input text this token consumed. For a token with
    /// nested content this is the length of the whole matched region, not
    /// the (possibly lookbehind-trimmed) content.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Flatten the token back to the plain text it covers.
    pub fn to_text(&self) -> String {
        match &self.content {
            TokenContent::Text(text) => text.clone(),
            TokenContent::Stream(stream) => stream.to_text(),
        }
    }

    // The tag-context walker rewrites nested streams in place while it
    // descends; nothing outside the crate can reach this.
    pub(crate) fn content_mut(&mut self) -> &mut TokenContent {
        &mut self.content
    }
}

/// One element of a [`TokenStream`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Item {
    Text(String),
    Token(Token),
}

impl Item {
    /// Byte length of input covered by this element.
    pub fn text_len(&self) -> usize {
        match self {
            Item::Text(text) => text.len(),
            Item::Token(token) => token.length(),
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            Item::Text(text) => text.clone(),
            Item::Token(token) => token.to_text(),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Item::Text(_))
    }

    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Item::Text(_) => None,
            Item::Token(token) => Some(token),
        }
    }
}

/// The flattened, ordered result of one tokenization pass.
///
/// Invariants: no two adjacent elements are both plain text, and no element
/// is an empty string, except the single-element stream `[""]` produced
/// when the input itself is empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct TokenStream {
    pub items: Vec<Item>,
}

impl TokenStream {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    /// Total byte length of input covered by the stream. Equals the length
    /// of the tokenized input for every stream the engine produces.
    pub fn text_len(&self) -> usize {
        self.items.iter().map(Item::text_len).sum()
    }

    /// Flatten the stream back to plain text.
    pub fn to_text(&self) -> String {
        self.items.iter().map(Item::to_text).collect()
    }
}
