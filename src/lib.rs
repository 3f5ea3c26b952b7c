//! # tint
//!
//! A grammar-driven tokenizer for syntax highlighting.
//!
//! Given an input string and an ordered set of named pattern rules (a
//! grammar), tint produces a structured token tree usable for highlighting
//! or lightweight parsing. The engine is deterministic for a given grammar
//! and ordering: earlier rules win wherever matches would overlap, greedy
//! rules may re-match across already-tokenized spans, and rule matches
//! recursively tokenize against nested sub-grammars.
//!
//! The pieces:
//!
//!     token         The token model: Token, TokenStream.
//!     grammar       Grammars, rules, and the GrammarSet registry with its
//!                   derivation operations (extend, insert_before).
//!     hooks         Named extension points around the pipeline.
//!     render        Token stream to tagged-markup rendering.
//!     tag_context   Post-pass reclassifying literal tag-body text in
//!                   tag-embedded-expression languages.
//!     languages     Built-in demonstration grammars.
//!     api           The Highlighter facade tying it all together.
//!
//! Typical use:
//!
//!     let highlighter = Highlighter::with_defaults()?;
//!     let html = highlighter.highlight_as("let x = 1;", "script")?;

pub mod api;
pub mod grammar;
pub mod hooks;
pub mod languages;
pub mod render;
pub mod tag_context;
pub mod token;

mod engine;
mod span_list;

pub use api::{HighlightError, Highlighter};
pub use grammar::{Grammar, GrammarError, GrammarId, GrammarSet, Pattern, Rule};
pub use hooks::{HookEnv, HookName, Hooks, WrapEnv};
pub use token::{Item, Token, TokenContent, TokenStream};
