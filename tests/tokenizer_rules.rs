//! Behavioural tests for the matching engine's rule semantics: declaration
//! order, lookbehind, greedy rematching, shared rule tails and recursive
//! sub-tokenization.

use tint::{Grammar, Highlighter, Item, Rule, TokenContent, TokenStream};

fn shape(stream: &TokenStream) -> Vec<String> {
    stream
        .iter()
        .map(|item| match item {
            Item::Text(text) => format!("text:{text}"),
            Item::Token(token) => format!("{}:{}", token.kind(), token.to_text()),
        })
        .collect()
}

// ===== Declaration order =====

#[test]
fn test_earlier_key_wins_on_identical_patterns() {
    let mut highlighter = Highlighter::new();
    let id = highlighter.grammars_mut().define(
        "g",
        Grammar::new()
            .rule("a", Rule::re("x").unwrap())
            .rule("b", Rule::re("x").unwrap()),
    );
    let stream = highlighter.tokenize("x", id);
    assert_eq!(shape(&stream), vec!["a:x"]);
}

#[test]
fn test_rules_within_an_entry_are_tried_in_order() {
    let mut highlighter = Highlighter::new();
    let id = highlighter.grammars_mut().define(
        "g",
        Grammar::new().rules(
            "num",
            vec![Rule::re(r"\d+\.\d+").unwrap(), Rule::re(r"\d+").unwrap()],
        ),
    );
    let stream = highlighter.tokenize("1.5", id);
    assert_eq!(shape(&stream), vec!["num:1.5"]);
}

// ===== Lookbehind =====

#[test]
fn test_lookbehind_with_empty_group_keeps_the_full_match() {
    let mut highlighter = Highlighter::new();
    let id = highlighter.grammars_mut().define(
        "g",
        Grammar::new().rule("x", Rule::re("(^)x").unwrap().lookbehind()),
    );
    let stream = highlighter.tokenize("x", id);
    assert_eq!(stream.len(), 1);
    let token = stream.items[0].as_token().unwrap();
    assert_eq!(token.length(), 1);
    assert_eq!(token.to_text(), "x");
}

#[test]
fn test_lookbehind_group_stays_plain_text() {
    let mut highlighter = Highlighter::new();
    let id = highlighter.grammars_mut().define(
        "g",
        Grammar::new().rule("b", Rule::re("(a)b").unwrap().lookbehind()),
    );
    let stream = highlighter.tokenize("ab", id);
    assert_eq!(shape(&stream), vec!["text:a", "b:b"]);
    assert_eq!(stream.items[1].as_token().unwrap().length(), 1);
}

// ===== Greedy rematching =====

#[test]
fn test_greedy_rule_swallows_earlier_tokens() {
    // The comment rule fires first inside the string literal; the greedy
    // string rule then re-matches across the split spans and consumes the
    // comment token whole.
    let mut highlighter = Highlighter::new();
    let id = highlighter.grammars_mut().define(
        "g",
        Grammar::new()
            .rule("comment", Rule::re("//.*").unwrap())
            .rule("string", Rule::re(r#""[^"]*""#).unwrap().greedy()),
    );
    let stream = highlighter.tokenize("\"a//b\" x", id);
    assert_eq!(shape(&stream), vec!["string:\"a//b\"", "text: x"]);
}

#[test]
fn test_rematch_retokenizes_the_leftover_region() {
    // `pair` matches "cc" first; the greedy grab then consumes "a c",
    // destroying that token and leaving "cc" as plain text again. The
    // bounded rematch must give `pair` another run over exactly that
    // region.
    let mut highlighter = Highlighter::new();
    let id = highlighter.grammars_mut().define(
        "g",
        Grammar::new()
            .rule("pair", Rule::re("cc").unwrap())
            .rule("grab", Rule::re("a.*?c").unwrap().greedy()),
    );
    let stream = highlighter.tokenize("a ccc", id);
    assert_eq!(shape(&stream), vec!["grab:a c", "pair:cc"]);
}

#[test]
fn test_greedy_match_cannot_start_inside_a_token() {
    // Both quotes are consumed as punctuation before the greedy string
    // rule runs, so no string match can begin any more.
    let mut highlighter = Highlighter::new();
    let id = highlighter.grammars_mut().define(
        "g",
        Grammar::new()
            .rule("punct", Rule::re("\"").unwrap())
            .rule("string", Rule::re(r#""[^"]*""#).unwrap().greedy()),
    );
    let stream = highlighter.tokenize("\"ab\"", id);
    assert_eq!(shape(&stream), vec!["punct:\"", "text:ab", "punct:\""]);
}

// ===== Shared tails and nested grammars =====

#[test]
fn test_rest_tail_rules_run_after_the_grammars_own() {
    let mut highlighter = Highlighter::new();
    let tail = highlighter
        .grammars_mut()
        .define("tail", Grammar::new().rule("word", Rule::re("[a-z]+").unwrap()));
    let id = highlighter.grammars_mut().define(
        "g",
        Grammar::new()
            .rule("num", Rule::re(r"\d+").unwrap())
            .with_rest(tail),
    );
    let stream = highlighter.tokenize("ab12", id);
    assert_eq!(shape(&stream), vec!["word:ab", "num:12"]);
}

#[test]
fn test_inside_grammar_tokenizes_the_match_recursively() {
    let mut highlighter = Highlighter::new();
    let words = highlighter
        .grammars_mut()
        .anonymous(Grammar::new().rule("word", Rule::re(r"\w+").unwrap()));
    let id = highlighter.grammars_mut().define(
        "g",
        Grammar::new().rule(
            "phrase",
            Rule::re(r"\w+\s\w+").unwrap().greedy().inside(words),
        ),
    );

    let stream = highlighter.tokenize("ab cd", id);
    assert_eq!(stream.len(), 1);
    let phrase = stream.items[0].as_token().unwrap();
    assert_eq!(phrase.kind(), "phrase");
    assert_eq!(phrase.length(), 5);
    match phrase.content() {
        TokenContent::Stream(inner) => {
            assert_eq!(shape(inner), vec!["word:ab", "text: ", "word:cd"]);
        }
        TokenContent::Text(_) => panic!("phrase content should be a nested stream"),
    }
}

// ===== Stream shape =====

#[test]
fn test_empty_input_yields_the_single_empty_string_stream() {
    let mut highlighter = Highlighter::new();
    let id = highlighter
        .grammars_mut()
        .define("g", Grammar::new().rule("x", Rule::re("x").unwrap()));
    let stream = highlighter.tokenize("", id);
    assert_eq!(stream.items, vec![Item::Text(String::new())]);
}

#[test]
fn test_adjacent_matches_leave_no_empty_strings() {
    let mut highlighter = Highlighter::new();
    let id = highlighter
        .grammars_mut()
        .define("g", Grammar::new().rule("x", Rule::re("x").unwrap()));
    let stream = highlighter.tokenize("xx", id);
    assert_eq!(shape(&stream), vec!["x:x", "x:x"]);
}

#[test]
fn test_aliases_are_attached_to_produced_tokens() {
    let mut highlighter = Highlighter::new();
    let id = highlighter.grammars_mut().define(
        "g",
        Grammar::new().rule(
            "number",
            Rule::re(r"\d+").unwrap().alias("constant").alias("numeric"),
        ),
    );
    let stream = highlighter.tokenize("7", id);
    let token = stream.items[0].as_token().unwrap();
    assert_eq!(token.aliases(), ["constant", "numeric"]);
}
