//! Tests for the registry's derivation operations: extend, insert_before
//! and the reference rewriting that keeps aliased grammars consistent.

use tint::{Grammar, GrammarError, GrammarSet, Rule};

fn rule(source: &str) -> Rule {
    Rule::re(source).unwrap()
}

// ===== extend =====

#[test]
fn test_extend_keeps_position_on_overwrite_and_appends_new_keys() {
    let mut set = GrammarSet::new();
    set.define(
        "base",
        Grammar::new()
            .rule("comment", rule("A"))
            .rule("string", rule("B")),
    );

    let id = set
        .extend(
            "base",
            Grammar::new()
                .rule("comment", rule("C"))
                .rule("number", rule("D")),
        )
        .unwrap();

    let derived = set.get(id).unwrap();
    assert_eq!(derived.keys(), vec!["comment", "string", "number"]);
    assert_eq!(derived.get("comment").unwrap()[0].pattern().source(), "C");
    assert_eq!(derived.get("string").unwrap()[0].pattern().source(), "B");
}

#[test]
fn test_extend_does_not_touch_the_base_grammar() {
    let mut set = GrammarSet::new();
    let base = set.define("base", Grammar::new().rule("comment", rule("A")));

    set.extend("base", Grammar::new().rule("comment", rule("C")))
        .unwrap();

    assert_eq!(set.grammar("base"), Some(base));
    assert_eq!(
        set.get(base).unwrap().get("comment").unwrap()[0]
            .pattern()
            .source(),
        "A"
    );
}

#[test]
fn test_extend_of_a_self_referential_grammar_keeps_the_cycle() {
    let mut set = GrammarSet::new();
    let expr = set.declare("expr");
    set.set_grammar(
        expr,
        Grammar::new().rule("group", rule(r"\(.*\)").inside(expr)),
    );

    let derived = set.extend("expr", Grammar::new().rule("extra", rule("y"))).unwrap();
    let inner = set.get(derived).unwrap().get("group").unwrap()[0]
        .inside_grammar()
        .unwrap();
    assert_eq!(inner, derived);
    assert_ne!(inner, expr);
}

#[test]
fn test_extend_unknown_grammar_errors() {
    let mut set = GrammarSet::new();
    let err = set.extend("missing", Grammar::new()).unwrap_err();
    assert_eq!(err, GrammarError::UnknownGrammar("missing".to_string()));
}

// ===== insert_before =====

#[test]
fn test_insert_before_places_new_keys_ahead_of_the_anchor() {
    let mut set = GrammarSet::new();
    set.define(
        "g",
        Grammar::new()
            .rule("a", rule("a"))
            .rule("b", rule("b"))
            .rule("c", rule("c")),
    );

    let id = set
        .insert_before(
            "g",
            "b",
            Grammar::new().rule("x", rule("x")).rule("y", rule("y")),
        )
        .unwrap();

    assert_eq!(set.get(id).unwrap().keys(), vec!["a", "x", "y", "b", "c"]);
    assert_eq!(set.grammar("g"), Some(id));
}

#[test]
fn test_insert_before_suppresses_duplicated_keys_at_their_old_position() {
    let mut set = GrammarSet::new();
    set.define(
        "g",
        Grammar::new()
            .rule("a", rule("a"))
            .rule("b", rule("b0"))
            .rule("c", rule("c")),
    );

    // Inserting `b` itself before `b` is a same-position overwrite.
    let id = set
        .insert_before(
            "g",
            "b",
            Grammar::new().rule("b", rule("b1")).rule("x", rule("x")),
        )
        .unwrap();

    let derived = set.get(id).unwrap();
    assert_eq!(derived.keys(), vec!["a", "b", "x", "c"]);
    assert_eq!(derived.get("b").unwrap()[0].pattern().source(), "b1");
}

#[test]
fn test_insert_before_rewrites_references_held_by_other_grammars() {
    let mut set = GrammarSet::new();
    let inner = set.define("inner", Grammar::new().rule("k", rule("k")));
    set.define(
        "outer",
        Grammar::new().rule("t", rule("t").inside(inner)),
    );

    let rebuilt = set
        .insert_before("inner", "k", Grammar::new().rule("j", rule("j")))
        .unwrap();

    assert_ne!(rebuilt, inner);
    assert_eq!(set.grammar("inner"), Some(rebuilt));
    // The grammar that aliased `inner` as a sub-grammar observes the
    // replacement without any bookkeeping of its own.
    let outer = set.grammar("outer").unwrap();
    let through_outer = set.get(outer).unwrap().get("t").unwrap()[0]
        .inside_grammar()
        .unwrap();
    assert_eq!(through_outer, rebuilt);
}

#[test]
fn test_insert_before_rewrites_rest_references_too() {
    let mut set = GrammarSet::new();
    let tail = set.define("tail", Grammar::new().rule("k", rule("k")));
    set.define(
        "user",
        Grammar::new().rule("a", rule("a")).with_rest(tail),
    );

    let rebuilt = set
        .insert_before("tail", "k", Grammar::new().rule("j", rule("j")))
        .unwrap();

    let user = set.grammar("user").unwrap();
    assert_eq!(set.get(user).unwrap().rest(), Some(rebuilt));
}

#[test]
fn test_insert_before_unknown_key_errors() {
    let mut set = GrammarSet::new();
    set.define("g", Grammar::new().rule("a", rule("a")));
    let err = set
        .insert_before("g", "missing", Grammar::new().rule("x", rule("x")))
        .unwrap_err();
    assert_eq!(
        err,
        GrammarError::UnknownKey {
            grammar: "g".to_string(),
            key: "missing".to_string(),
        }
    );
}

// ===== clone =====

#[test]
fn test_clone_grammar_is_deep() {
    let mut set = GrammarSet::new();
    let inner = set.anonymous(Grammar::new().rule("k", rule("k")));
    let id = set.define("g", Grammar::new().rule("t", rule("t").inside(inner)));

    let cloned = set.clone_grammar(id);
    let cloned_inner = set.get(cloned).unwrap().get("t").unwrap()[0]
        .inside_grammar()
        .unwrap();
    assert_ne!(cloned_inner, inner);
    assert_eq!(
        set.get(cloned_inner).unwrap().get("k").unwrap()[0]
            .pattern()
            .source(),
        "k"
    );
}

#[test]
fn test_mutually_recursive_grammars_clone_to_an_isomorphic_pair() {
    let mut set = GrammarSet::new();
    let a = set.declare("a");
    let b = set.declare("b");
    set.set_grammar(a, Grammar::new().rule("to-b", rule("b").inside(b)));
    set.set_grammar(b, Grammar::new().rule("to-a", rule("a").inside(a)));

    let cloned_a = set.clone_grammar(a);
    let cloned_b = set.get(cloned_a).unwrap().get("to-b").unwrap()[0]
        .inside_grammar()
        .unwrap();
    let back = set.get(cloned_b).unwrap().get("to-a").unwrap()[0]
        .inside_grammar()
        .unwrap();
    assert_eq!(back, cloned_a);
    assert_ne!(cloned_a, a);
    assert_ne!(cloned_b, b);
}
