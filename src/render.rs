//! Token stream to tagged-markup rendering.
//!
//! Plain text passes through escaped; a token renders as a tagged wrapper
//! (`span` by default, with class list `token`, the token kind, then any
//! aliases) around its recursively rendered content. A [`HookName::Wrap`] callback
//! fires once per token with the mutable render state, so plugins can retag
//! or annotate specific token kinds without engine changes.

use crate::hooks::{HookEnv, HookName, Hooks, WrapEnv};
use crate::token::{Item, Token, TokenContent, TokenStream};
use std::collections::BTreeMap;

/// Render a whole stream as the concatenation of its rendered items.
pub fn stringify_stream(stream: &TokenStream, language: &str, hooks: &Hooks) -> String {
    stream
        .iter()
        .map(|item| stringify_item(item, language, hooks))
        .collect()
}

pub fn stringify_item(item: &Item, language: &str, hooks: &Hooks) -> String {
    match item {
        Item::Text(text) => escape(text),
        Item::Token(token) => stringify_token(token, language, hooks),
    }
}

fn stringify_token(token: &Token, language: &str, hooks: &Hooks) -> String {
    let content = match token.content() {
        TokenContent::Text(text) => escape(text),
        TokenContent::Stream(stream) => stringify_stream(stream, language, hooks),
    };

    let mut classes = vec!["token".to_string(), token.kind().to_string()];
    classes.extend(token.aliases().iter().cloned());

    let mut env = WrapEnv {
        kind: token.kind().to_string(),
        content,
        tag: "span".to_string(),
        classes,
        attributes: BTreeMap::new(),
        language: language.to_string(),
    };
    hooks.run(HookName::Wrap, &mut HookEnv::Wrap(&mut env));

    let mut attributes = String::new();
    for (name, value) in &env.attributes {
        attributes.push_str(&format!(
            " {}=\"{}\"",
            name,
            value.replace('"', "&quot;")
        ));
    }

    format!(
        "<{} class=\"{}\"{}>{}</{}>",
        env.tag,
        env.classes.join(" "),
        attributes,
        env.content,
        env.tag
    )
}

/// Escape text for embedding in markup. `&` and `<` are rewritten;
/// no-break spaces become plain spaces so rendered output copies cleanly.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '\u{a0}' => out.push(' '),
            other => out.push(other),
        }
    }
    out
}
