//! Hook registry: ordered callback lists keyed by named extension points.
//!
//! Hooks are how external code customizes the pipeline without engine
//! changes: rewriting the input before matching, post-processing the token
//! stream (the tag-context walker registers itself this way), or rewriting
//! the rendering of individual tokens. Callbacks run synchronously in
//! registration order and share one mutable environment per invocation; a
//! hook with no registrations is a no-op.

use crate::grammar::GrammarId;
use crate::token::TokenStream;
use std::collections::{BTreeMap, HashMap};

/// The extension points the pipeline fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookName {
    /// Before matching; the input text, grammar and language are rewritable.
    BeforeTokenize,
    /// After matching; the finished token stream is rewritable.
    AfterTokenize,
    /// Per token, before its rendering is written out.
    Wrap,
}

/// Mutable render state for one token, handed to [`HookName::Wrap`]
/// callbacks before the tagged wrapper is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapEnv {
    pub kind: String,
    /// Already-rendered (escaped) content of the token.
    pub content: String,
    pub tag: String,
    pub classes: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub language: String,
}

/// The environment passed to callbacks; one variant per extension point.
pub enum HookEnv<'a> {
    BeforeTokenize {
        code: &'a mut String,
        grammar: &'a mut GrammarId,
        language: &'a mut String,
    },
    AfterTokenize {
        language: &'a str,
        tokens: &'a mut TokenStream,
    },
    Wrap(&'a mut WrapEnv),
}

pub type HookCallback = Box<dyn Fn(&mut HookEnv<'_>) + Send + Sync>;

/// Ordered callback lists keyed by extension point. Append-only.
#[derive(Default)]
pub struct Hooks {
    callbacks: HashMap<HookName, Vec<HookCallback>>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a callback to the list for `name`.
    pub fn add(&mut self, name: HookName, callback: HookCallback) {
        self.callbacks.entry(name).or_default().push(callback);
    }

    /// Like [`Hooks::add`], without the boxing at the call site.
    pub fn on<F>(&mut self, name: HookName, callback: F)
    where
        F: Fn(&mut HookEnv<'_>) + Send + Sync + 'static,
    {
        self.add(name, Box::new(callback));
    }

    /// Run every callback registered for `name`, in registration order.
    pub fn run(&self, name: HookName, env: &mut HookEnv<'_>) {
        if let Some(list) = self.callbacks.get(&name) {
            for callback in list {
                callback(env);
            }
        }
    }

    pub fn count(&self, name: HookName) -> usize {
        self.callbacks.get(&name).map_or(0, Vec::len)
    }
}
