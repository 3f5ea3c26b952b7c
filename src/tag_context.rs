//! Tag-context walker: a post-tokenize pass for languages that embed
//! expressions inside tag-like markup.
//!
//! Those languages tokenize attribute and expression regions with the full
//! expression grammar, but literal text sitting between an opening and a
//! closing tag must not end up tokenized as code. Rather than complicating
//! the grammar, this pass walks the finished stream, tracks which tags are
//! open and how deep inside expression braces the scan is, and merges
//! everything that is really tag-body text into single `plain-text` tokens.
//!
//! The walker is deliberately lenient: a closing tag whose name does not
//! match the innermost open tag is ignored, as is a closing tag with no
//! open context at all. Grammars in the wild rely on that forgiving
//! behaviour.

use crate::hooks::{HookEnv, HookName, Hooks};
use crate::token::{Item, Token, TokenContent};

/// One open tag: its name and how many unbalanced expression braces have
/// been seen since it opened.
struct OpenTag {
    name: String,
    braces: usize,
}

/// Register the walker as an after-tokenize hook for the given languages.
pub fn install(hooks: &mut Hooks, languages: &[&str]) {
    let languages: Vec<String> = languages.iter().map(|name| name.to_string()).collect();
    hooks.on(HookName::AfterTokenize, move |env| {
        if let HookEnv::AfterTokenize { language, tokens } = env {
            if languages.iter().any(|name| name.as_str() == *language) {
                walk(&mut tokens.items);
            }
        }
    });
}

/// Reclassify literal tag-body text in `items`, recursing into nested
/// streams with a fresh context stack.
pub fn walk(items: &mut Vec<Item>) {
    let mut open: Vec<OpenTag> = Vec::new();
    let mut index = 0;

    while index < items.len() {
        // Literal means: not a tag and not an expression brace, so a
        // candidate for tag-body text.
        let mut literal = false;

        match &items[index] {
            Item::Text(_) => literal = true,
            Item::Token(token) => {
                if token.kind() == "tag" && starts_with_tag(token) {
                    if is_closing(token) {
                        let matches_top = match (open.last(), tag_name(token)) {
                            (Some(top), Some(name)) => top.name == name,
                            _ => false,
                        };
                        if matches_top {
                            open.pop();
                        }
                    } else if !is_self_closing(token) {
                        if let Some(name) = tag_name(token) {
                            open.push(OpenTag { name, braces: 0 });
                        }
                    }
                } else if !open.is_empty()
                    && token.kind() == "punctuation"
                    && token.to_text() == "{"
                {
                    if let Some(top) = open.last_mut() {
                        top.braces += 1;
                    }
                } else if !open.is_empty()
                    && open.last().map_or(false, |top| top.braces > 0)
                    && token.kind() == "punctuation"
                    && token.to_text() == "}"
                {
                    if let Some(top) = open.last_mut() {
                        top.braces -= 1;
                    }
                } else {
                    literal = true;
                }
            }
        }

        if literal && open.last().map_or(false, |top| top.braces == 0) {
            // Plain tag-body text: merge with directly adjacent plain
            // neighbours into one replacement token.
            let mut text = items[index].to_text();
            if index + 1 < items.len() && is_plain(&items[index + 1]) {
                text.push_str(&items[index + 1].to_text());
                items.remove(index + 1);
            }
            if index > 0 && is_plain(&items[index - 1]) {
                text.insert_str(0, &items[index - 1].to_text());
                items.remove(index - 1);
                index -= 1;
            }
            let length = text.len();
            items[index] = Item::Token(Token::new(
                "plain-text",
                TokenContent::Text(text),
                Vec::new(),
                length,
            ));
        }

        if let Item::Token(token) = &mut items[index] {
            if let TokenContent::Stream(stream) = token.content_mut() {
                walk(&mut stream.items);
            }
        }

        index += 1;
    }
}

fn is_plain(item: &Item) -> bool {
    match item {
        Item::Text(_) => true,
        Item::Token(token) => token.kind() == "plain-text",
    }
}

fn nested(token: &Token) -> Option<&Vec<Item>> {
    match token.content() {
        TokenContent::Stream(stream) => Some(&stream.items),
        TokenContent::Text(_) => None,
    }
}

/// A tag token worth inspecting starts with the nested token that carries
/// the tag name (`<` or `</` plus the name).
fn starts_with_tag(token: &Token) -> bool {
    nested(token)
        .and_then(|items| items.first())
        .and_then(Item::as_token)
        .map_or(false, |first| first.kind() == "tag")
}

/// True when the first nested-of-nested element is the closing-tag marker.
fn is_closing(token: &Token) -> bool {
    nested(token)
        .and_then(|items| items.first())
        .and_then(Item::as_token)
        .and_then(nested)
        .and_then(|parts| parts.first())
        .map_or(false, |marker| marker.to_text() == "</")
}

/// True when the tag's last nested element is the self-closing marker.
fn is_self_closing(token: &Token) -> bool {
    nested(token)
        .and_then(|items| items.last())
        .map_or(false, |last| last.to_text() == "/>")
}

/// The tag's name: everything after the punctuation marker inside the name
/// token, flattened to plain text.
fn tag_name(token: &Token) -> Option<String> {
    let name_token = nested(token)?.first()?.as_token()?;
    if name_token.kind() != "tag" {
        return None;
    }
    let parts = nested(name_token)?;
    let name: String = parts.iter().skip(1).map(Item::to_text).collect();
    Some(name.trim().to_string())
}
