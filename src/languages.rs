//! Built-in demonstration grammars.
//!
//! These are data, not engine logic: everything here goes through the same
//! public grammar-building surface any external language definition would
//! use. Three languages ship by default:
//!
//!     markup        An HTML-like tag language: comments, tags with
//!                   attributes, entities.
//!     script        A small C-like expression language: comments, strings,
//!                   keywords, numbers, operators, punctuation.
//!     markup-expr   Tag markup with script expressions embedded in
//!                   attributes and braces, the language the tag-context
//!                   walker post-processes.
//!
//! `markup-expr` is deliberately built with the registry's derivation
//! operations (`extend` + `insert_before`) instead of by hand, and its
//! embedded expressions reference the registered `script` grammar, so
//! edits to `script` show through.

use crate::grammar::{Grammar, GrammarError, GrammarId, GrammarSet, Rule};

/// Register all built-in languages. `markup-expr` derives from the other
/// two, so they are registered first.
pub fn register_all(set: &mut GrammarSet) -> Result<(), GrammarError> {
    markup(set)?;
    script(set)?;
    markup_expr(set)?;
    Ok(())
}

/// An HTML-like tag language.
pub fn markup(set: &mut GrammarSet) -> Result<GrammarId, GrammarError> {
    let interior = tag_interior(set, None)?;
    let grammar = Grammar::new()
        .rule("comment", Rule::re(r"<!--[\s\S]*?-->")?.greedy())
        .rule(
            "tag",
            Rule::re(r"</?[^\s>/]+[^<>]*>")?.greedy().inside(interior),
        )
        .rules(
            "entity",
            vec![
                Rule::re(r"(?i)&[a-z\d]{1,8};")?.alias("named-entity"),
                Rule::re(r"(?i)&#x?[a-f\d]{1,8};")?,
            ],
        );
    Ok(set.define("markup", grammar))
}

/// A small C-like expression language.
pub fn script(set: &mut GrammarSet) -> Result<GrammarId, GrammarError> {
    let grammar = Grammar::new()
        .rules(
            "comment",
            vec![
                Rule::re(r"/\*[\s\S]*?\*/")?.greedy(),
                Rule::re(r"//.*")?,
            ],
        )
        .rule(
            "string",
            Rule::re(r#""(?:\\.|[^"\\])*"|'(?:\\.|[^'\\])*'"#)?.greedy(),
        )
        .rule(
            "keyword",
            Rule::re(r"\b(?:break|const|continue|else|fn|for|if|let|loop|match|return|while)\b")?,
        )
        .rule("boolean", Rule::re(r"\b(?:false|true)\b")?)
        .rule("number", Rule::re(r"\b\d+(?:\.\d+)?\b")?)
        .rule("operator", Rule::re(r"[!%&*+\-/<=>^|~]+")?)
        .rule("punctuation", Rule::re(r"[{}\[\]();,.:]")?);
    Ok(set.define("script", grammar))
}

/// Tag markup with script expressions embedded in attributes.
///
/// The base is a clone of `script` (text between tags highlights as code
/// until the tag-context walker reclassifies it); tag and entity rules are
/// inserted ahead of everything so markup always wins over code.
pub fn markup_expr(set: &mut GrammarSet) -> Result<GrammarId, GrammarError> {
    let script = set
        .grammar("script")
        .ok_or_else(|| GrammarError::UnknownGrammar("script".to_string()))?;

    let base = set.extend("script", Grammar::new())?;
    set.register("markup-expr", base);

    let expression_interior = set.anonymous(
        Grammar::new()
            .rule(
                "expr-punctuation",
                Rule::re(r"^\{|\}$")?.alias("punctuation"),
            )
            .with_rest(script),
    );
    let expression = Rule::re(r"\{(?:\{[^{}]*\}|[^{}])*\}")?
        .alias("language-script")
        .inside(expression_interior);
    let interior = tag_interior(set, Some(expression))?;

    set.insert_before(
        "markup-expr",
        "comment",
        Grammar::new()
            .rule(
                "tag",
                Rule::re(r"</?[^\s>/]+[^<>]*>")?.greedy().inside(interior),
            )
            .rules(
                "entity",
                vec![
                    Rule::re(r"(?i)&[a-z\d]{1,8};")?.alias("named-entity"),
                    Rule::re(r"(?i)&#x?[a-f\d]{1,8};")?,
                ],
            ),
    )
}

/// The grammar for the inside of a matched tag: the name, attributes and
/// closing punctuation. `expression` optionally slots an embedded-expression
/// rule in right after the name, ahead of attribute values.
fn tag_interior(
    set: &mut GrammarSet,
    expression: Option<Rule>,
) -> Result<GrammarId, GrammarError> {
    let name_interior = set.anonymous(
        Grammar::new()
            .rule("punctuation", Rule::re(r"^</?")?)
            .rule("namespace", Rule::re(r"^[^\s>/:]+:")?),
    );
    let attr_value_interior = set.anonymous(Grammar::new().rules(
        "punctuation",
        vec![
            Rule::re(r"^=")?.alias("attr-equals"),
            Rule::re(r#"^["']|["']$"#)?,
        ],
    ));

    let mut interior = Grammar::new().rule(
        "tag",
        Rule::re(r"^</?[^\s>/]+")?.inside(name_interior),
    );
    if let Some(rule) = expression {
        interior = interior.rule("expression", rule);
    }
    let interior = interior
        .rule(
            "attr-value",
            Rule::re(r#"=\s*(?:"[^"]*"|'[^']*'|[^\s'">=]+)"#)?.inside(attr_value_interior),
        )
        .rule("punctuation", Rule::re(r"/?>")?)
        .rule("attr-name", Rule::re(r"[^\s>/=]+")?);
    Ok(set.anonymous(interior))
}
