//! Public engine boundary: the [`Highlighter`] ties the grammar registry,
//! the hook registry, the matching engine and the renderer together.
//!
//! A `Highlighter` owns both registries. Tokenizing and highlighting take
//! `&self`; registry edits take `&mut self`, so the borrow checker enforces
//! that nothing mutates a grammar while a pass over it is running.

use crate::engine;
use crate::grammar::{GrammarError, GrammarId, GrammarSet};
use crate::hooks::{HookEnv, HookName, Hooks};
use crate::languages;
use crate::render;
use crate::tag_context;
use crate::token::TokenStream;
use std::fmt;

/// Errors surfaced by the highlight pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HighlightError {
    /// No grammar was supplied or registered for the requested language.
    UnknownLanguage(String),
}

impl fmt::Display for HighlightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HighlightError::UnknownLanguage(name) => {
                write!(f, "no grammar registered for language `{}`", name)
            }
        }
    }
}

impl std::error::Error for HighlightError {}

/// The engine facade: grammar registry + hook registry + pipeline.
#[derive(Default)]
pub struct Highlighter {
    grammars: GrammarSet,
    hooks: Hooks,
}

impl Highlighter {
    /// An empty highlighter: no languages, no hooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// A highlighter with the built-in languages registered and the
    /// tag-context walker installed for `markup-expr`.
    pub fn with_defaults() -> Result<Self, GrammarError> {
        let mut highlighter = Self::new();
        languages::register_all(&mut highlighter.grammars)?;
        tag_context::install(&mut highlighter.hooks, &["markup-expr"]);
        Ok(highlighter)
    }

    pub fn grammars(&self) -> &GrammarSet {
        &self.grammars
    }

    pub fn grammars_mut(&mut self) -> &mut GrammarSet {
        &mut self.grammars
    }

    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut Hooks {
        &mut self.hooks
    }

    /// Look up the grammar registered under a language name.
    pub fn language(&self, name: &str) -> Option<GrammarId> {
        self.grammars.grammar(name)
    }

    /// Tokenize `text` against a grammar, without running any hooks.
    ///
    /// Never fails; if the engine's runaway guard trips, the partial stream
    /// is returned.
    pub fn tokenize(&self, text: &str, grammar: GrammarId) -> TokenStream {
        engine::tokenize(&self.grammars, text, grammar)
    }

    /// Run the full tokenize pipeline (before-tokenize hook, matching
    /// engine, after-tokenize hook) and return the stream.
    pub fn tokenize_as(&self, text: &str, language: &str) -> Result<TokenStream, HighlightError> {
        let grammar = self.language(language);
        self.run_pipeline(text, grammar, language)
            .map(|(stream, _)| stream)
    }

    /// Highlight `text` and return its tagged markup rendering.
    ///
    /// `grammar` is the grammar to match against; passing `None` raises
    /// [`HighlightError::UnknownLanguage`]. Runs before-tokenize, the
    /// engine, after-tokenize, then the renderer (which fires the wrap hook
    /// per token).
    pub fn highlight(
        &self,
        text: &str,
        grammar: Option<GrammarId>,
        language: &str,
    ) -> Result<String, HighlightError> {
        let (stream, language) = self.run_pipeline(text, grammar, language)?;
        Ok(render::stringify_stream(&stream, &language, &self.hooks))
    }

    /// Highlight using the grammar registered under `language`.
    pub fn highlight_as(&self, text: &str, language: &str) -> Result<String, HighlightError> {
        self.highlight(text, self.language(language), language)
    }

    fn run_pipeline(
        &self,
        text: &str,
        grammar: Option<GrammarId>,
        language: &str,
    ) -> Result<(TokenStream, String), HighlightError> {
        let Some(mut grammar) = grammar else {
            return Err(HighlightError::UnknownLanguage(language.to_string()));
        };

        let mut code = text.to_string();
        let mut language = language.to_string();
        self.hooks.run(
            HookName::BeforeTokenize,
            &mut HookEnv::BeforeTokenize {
                code: &mut code,
                grammar: &mut grammar,
                language: &mut language,
            },
        );

        let mut tokens = self.tokenize(&code, grammar);
        self.hooks.run(
            HookName::AfterTokenize,
            &mut HookEnv::AfterTokenize {
                language: &language,
                tokens: &mut tokens,
            },
        );

        Ok((tokens, language))
    }
}
