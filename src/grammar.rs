//! Grammar model and registry.
//!
//! A grammar is an ordered mapping from token-type name to one or more
//! pattern rules; insertion order is priority order, because the matching
//! engine consumes input spans rule by rule and an earlier rule's match is
//! no longer available to later rules.
//!
//! Grammars routinely reference each other: a rule's `inside` sub-grammar
//! may be another language's root grammar, and grammar graphs are often
//! cyclic (an expression language whose braces recurse into itself). To keep
//! that shareable and cycle-safe, grammars live in a [`GrammarSet`] arena
//! and reference each other by [`GrammarId`] rather than by ownership.
//! Registry operations that derive new grammars ([`GrammarSet::extend`],
//! [`GrammarSet::insert_before`]) work over those identifiers: deriving a
//! grammar allocates a fresh slot, and a reference-rewriting traversal keeps
//! every live alias of the replaced grammar pointing at the replacement.

use regex::Regex;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Errors surfaced while building grammars or editing the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    /// A rule pattern failed to compile.
    InvalidPattern { pattern: String, message: String },
    /// No grammar is registered under the given name.
    UnknownGrammar(String),
    /// The named grammar has no rule under the given key.
    UnknownKey { grammar: String, key: String },
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarError::InvalidPattern { pattern, message } => {
                write!(f, "invalid pattern `{}`: {}", pattern, message)
            }
            GrammarError::UnknownGrammar(name) => {
                write!(f, "no grammar registered under `{}`", name)
            }
            GrammarError::UnknownKey { grammar, key } => {
                write!(f, "grammar `{}` has no key `{}`", grammar, key)
            }
        }
    }
}

impl std::error::Error for GrammarError {}

/// Identifier of a grammar slot inside a [`GrammarSet`].
///
/// Identifiers are only meaningful for the set that minted them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GrammarId(usize);

/// A compiled rule pattern. Retains the source string for diagnostics and
/// for comparing rules structurally in tests.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, GrammarError> {
        let regex = Regex::new(source).map_err(|e| GrammarError::InvalidPattern {
            pattern: source.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Find the first match at or after `start`, as a byte range of
    /// `haystack`. With `lookbehind`, capture group 1 anchors the match but
    /// is excluded from the reported range, so the group's text stays plain.
    pub(crate) fn match_at(
        &self,
        haystack: &str,
        start: usize,
        lookbehind: bool,
    ) -> Option<(usize, usize)> {
        if lookbehind {
            let caps = self.regex.captures_at(haystack, start)?;
            let whole = caps.get(0)?;
            let shift = caps.get(1).map_or(0, |group| group.len());
            Some((whole.start() + shift, whole.end()))
        } else {
            let found = self.regex.find_at(haystack, start)?;
            Some((found.start(), found.end()))
        }
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// One pattern rule: the pattern plus its matching options.
#[derive(Debug, Clone)]
pub struct Rule {
    pattern: Pattern,
    lookbehind: bool,
    greedy: bool,
    aliases: Vec<String>,
    inside: Option<GrammarId>,
}

impl Rule {
    pub fn new(pattern: Pattern) -> Self {
        Self {
            pattern,
            lookbehind: false,
            greedy: false,
            aliases: Vec::new(),
            inside: None,
        }
    }

    /// Build a rule straight from a pattern source string.
    pub fn re(source: &str) -> Result<Self, GrammarError> {
        Ok(Self::new(Pattern::new(source)?))
    }

    /// Treat capture group 1 as a lookbehind: it anchors the match but is
    /// excluded from the produced token.
    pub fn lookbehind(mut self) -> Self {
        self.lookbehind = true;
        self
    }

    /// Allow the rule to match across segment boundaries, swallowing spans
    /// already claimed by earlier rules and triggering a bounded rematch of
    /// the affected region.
    pub fn greedy(mut self) -> Self {
        self.greedy = true;
        self
    }

    /// Attach an extra class name to tokens produced by this rule.
    pub fn alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    /// Recursively tokenize this rule's matches against a sub-grammar.
    pub fn inside(mut self, grammar: GrammarId) -> Self {
        self.inside = Some(grammar);
        self
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn is_lookbehind(&self) -> bool {
        self.lookbehind
    }

    pub fn is_greedy(&self) -> bool {
        self.greedy
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn inside_grammar(&self) -> Option<GrammarId> {
        self.inside
    }
}

/// An ordered mapping from token-type name to rules.
///
/// `rest` optionally names another grammar whose entries are appended at the
/// end of this one at resolution time, so several grammars can share a tail
/// of rules without duplicating them.
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    entries: Vec<(String, Vec<Rule>)>,
    rest: Option<GrammarId>,
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single-rule entry.
    pub fn rule(self, name: &str, rule: Rule) -> Self {
        self.rules(name, vec![rule])
    }

    /// Append an entry whose rules are tried in the given order.
    pub fn rules(mut self, name: &str, rules: Vec<Rule>) -> Self {
        self.entries.push((name.to_string(), rules));
        self
    }

    /// Share another grammar's entries as this grammar's tail.
    pub fn with_rest(mut self, grammar: GrammarId) -> Self {
        self.rest = Some(grammar);
        self
    }

    pub fn entries(&self) -> &[(String, Vec<Rule>)] {
        &self.entries
    }

    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|(key, _)| key.as_str()).collect()
    }

    pub fn get(&self, key: &str) -> Option<&[Rule]> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, rules)| rules.as_slice())
    }

    pub fn rest(&self) -> Option<GrammarId> {
        self.rest
    }
}

/// The grammar registry: an arena of grammar slots plus an ordered
/// language-name table.
///
/// All derivation goes through the registry so that every grammar which
/// transitively references a replaced grammar observes the replacement.
#[derive(Debug, Default)]
pub struct GrammarSet {
    arena: Vec<Grammar>,
    languages: Vec<(String, GrammarId)>,
}

impl GrammarSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an anonymous slot for a grammar that is referenced by rules
    /// but not registered as a language (attribute grammars, tag interiors).
    pub fn anonymous(&mut self, grammar: Grammar) -> GrammarId {
        let id = GrammarId(self.arena.len());
        self.arena.push(grammar);
        id
    }

    /// Reserve a named slot before its grammar exists, so self-recursive and
    /// mutually recursive grammars can be built against a real identifier.
    pub fn declare(&mut self, name: &str) -> GrammarId {
        let id = self.anonymous(Grammar::default());
        self.register(name, id);
        id
    }

    /// Register a grammar under a language name and return its identifier.
    pub fn define(&mut self, name: &str, grammar: Grammar) -> GrammarId {
        let id = self.anonymous(grammar);
        self.register(name, id);
        id
    }

    /// Point a language name at an existing grammar (aliases are fine; two
    /// names may share one grammar).
    pub fn register(&mut self, name: &str, id: GrammarId) {
        match self.languages.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = id,
            None => self.languages.push((name.to_string(), id)),
        }
    }

    /// Fill a previously declared slot.
    pub fn set_grammar(&mut self, id: GrammarId, grammar: Grammar) {
        self.arena[id.0] = grammar;
    }

    pub fn grammar(&self, name: &str) -> Option<GrammarId> {
        self.languages
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, id)| *id)
    }

    pub fn get(&self, id: GrammarId) -> Option<&Grammar> {
        self.arena.get(id.0)
    }

    pub fn language_names(&self) -> Vec<&str> {
        self.languages.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Deep-clone the subgraph reachable from `id` into fresh slots.
    ///
    /// Cycle-aware: each reachable grammar is cloned exactly once and every
    /// internal reference is remapped, so a cycle clones to an isomorphic
    /// cycle instead of recursing forever.
    pub fn clone_grammar(&mut self, id: GrammarId) -> GrammarId {
        let mut mapping = HashMap::new();
        self.clone_into(id, &mut mapping)
    }

    fn clone_into(&mut self, id: GrammarId, mapping: &mut HashMap<GrammarId, GrammarId>) -> GrammarId {
        if let Some(&mapped) = mapping.get(&id) {
            return mapped;
        }
        let target = self.anonymous(Grammar::default());
        mapping.insert(id, target);

        let source = self.arena[id.0].clone();
        let rest = source.rest.map(|rest| self.clone_into(rest, mapping));
        let mut entries = Vec::with_capacity(source.entries.len());
        for (key, rules) in source.entries {
            let rules = rules
                .into_iter()
                .map(|mut rule| {
                    rule.inside = rule.inside.map(|inner| self.clone_into(inner, mapping));
                    rule
                })
                .collect();
            entries.push((key, rules));
        }
        self.arena[target.0] = Grammar { entries, rest };
        target
    }

    /// Derive a new grammar from the one registered under `name` by deep
    /// cloning it and overlaying `additions`: a key already present keeps
    /// its original position but takes the new rules; wholly new keys are
    /// appended at the end in the given order.
    ///
    /// The derived grammar is not registered; callers name it with
    /// [`GrammarSet::register`] when it is a language of its own.
    pub fn extend(&mut self, name: &str, additions: Grammar) -> Result<GrammarId, GrammarError> {
        let base = self
            .grammar(name)
            .ok_or_else(|| GrammarError::UnknownGrammar(name.to_string()))?;
        let id = self.clone_grammar(base);

        let Grammar { entries, rest } = additions;
        let derived = &mut self.arena[id.0];
        if rest.is_some() {
            derived.rest = rest;
        }
        for (key, rules) in entries {
            match derived.entries.iter_mut().find(|(name, _)| *name == key) {
                Some(slot) => slot.1 = rules,
                None => derived.entries.push((key, rules)),
            }
        }
        Ok(id)
    }

    /// Rebuild the grammar registered under `container` with `insertions`
    /// placed immediately before `before`, and rewrite every live reference
    /// to the old grammar so indirect aliases stay consistent.
    ///
    /// A key present both in the container and in `insertions` is emitted at
    /// the insertion point and suppressed at its old position, so inserting
    /// an existing key doubles as a same-position overwrite when that key
    /// already sits at `before`.
    pub fn insert_before(
        &mut self,
        container: &str,
        before: &str,
        insertions: Grammar,
    ) -> Result<GrammarId, GrammarError> {
        let old = self
            .grammar(container)
            .ok_or_else(|| GrammarError::UnknownGrammar(container.to_string()))?;
        let source = &self.arena[old.0];
        if !source.entries.iter().any(|(key, _)| key == before) {
            return Err(GrammarError::UnknownKey {
                grammar: container.to_string(),
                key: before.to_string(),
            });
        }

        let mut entries = Vec::with_capacity(source.entries.len() + insertions.entries.len());
        for (key, rules) in &source.entries {
            if key == before {
                for (new_key, new_rules) in &insertions.entries {
                    entries.push((new_key.clone(), new_rules.clone()));
                }
            }
            if !insertions.entries.iter().any(|(new_key, _)| new_key == key) {
                entries.push((key.clone(), rules.clone()));
            }
        }
        let rest = source.rest;
        let id = self.anonymous(Grammar { entries, rest });

        self.register(container, id);
        self.replace_references(old, id);
        Ok(id)
    }

    /// Depth-first traversal over the grammars reachable from `start`,
    /// cycle-guarded by a visited set. Each reachable grammar is visited
    /// exactly once.
    pub fn walk<F>(&self, start: GrammarId, mut visit: F)
    where
        F: FnMut(GrammarId, &Grammar),
    {
        let mut visited = HashSet::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let grammar = &self.arena[id.0];
            visit(id, grammar);
            if let Some(rest) = grammar.rest {
                stack.push(rest);
            }
            for (_, rules) in &grammar.entries {
                for rule in rules {
                    if let Some(inner) = rule.inside {
                        stack.push(inner);
                    }
                }
            }
        }
    }

    /// Rewrite every reference to `old` (language-table entries, `inside`
    /// references, `rest` tails) reachable from the registered languages.
    fn replace_references(&mut self, old: GrammarId, new: GrammarId) {
        for (_, id) in self.languages.iter_mut() {
            if *id == old {
                *id = new;
            }
        }
        let roots: Vec<GrammarId> = self.languages.iter().map(|(_, id)| *id).collect();
        let mut visited = HashSet::new();
        let mut stack = roots;
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let grammar = &mut self.arena[id.0];
            if grammar.rest == Some(old) {
                grammar.rest = Some(new);
            }
            if let Some(rest) = grammar.rest {
                stack.push(rest);
            }
            for (_, rules) in grammar.entries.iter_mut() {
                for rule in rules.iter_mut() {
                    if rule.inside == Some(old) {
                        rule.inside = Some(new);
                    }
                    if let Some(inner) = rule.inside {
                        stack.push(inner);
                    }
                }
            }
        }
    }

    /// The entry list the engine actually matches against: the grammar's own
    /// entries with its `rest` tail merged in. A key present in both keeps
    /// its own position and takes the tail's rules; new tail keys append.
    /// The merge is one level deep and a self-referential tail is ignored.
    pub(crate) fn resolved_entries(&self, id: GrammarId) -> Cow<'_, [(String, Vec<Rule>)]> {
        let grammar = &self.arena[id.0];
        match grammar.rest {
            None => Cow::Borrowed(&grammar.entries),
            Some(rest) if rest == id => Cow::Borrowed(&grammar.entries),
            Some(rest) => {
                let mut entries = grammar.entries.clone();
                for (key, rules) in &self.arena[rest.0].entries {
                    match entries.iter_mut().find(|(name, _)| name == key) {
                        Some(slot) => slot.1 = rules.clone(),
                        None => entries.push((key.clone(), rules.clone())),
                    }
                }
                Cow::Owned(entries)
            }
        }
    }
}
