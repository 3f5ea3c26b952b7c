//! Command-line interface for tint
//! This binary highlights source files (or stdin) with the built-in
//! demonstration languages.
//!
//! Usage:
//!   tint `<path>` [--language `<name>`] [--format `<format>`]  - Highlight a file
//!   tint --list-languages                                  - List registered languages
//!
//! With no path, input is read from stdin. The language is inferred from
//! the file extension when the flag is omitted.

use clap::{Arg, ArgAction, Command};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::io::Read;
use tint::Highlighter;

/// File-extension to language-name table for inference.
static EXTENSION_LANGUAGES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("html", "markup"),
        ("htm", "markup"),
        ("xml", "markup"),
        ("svg", "markup"),
        ("sc", "script"),
        ("mx", "markup-expr"),
    ])
});

fn main() {
    let matches = Command::new("tint")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A grammar-driven tokenizer and syntax highlighter")
        .arg(
            Arg::new("path")
                .help("Path to the source file (stdin when omitted)")
                .index(1),
        )
        .arg(
            Arg::new("language")
                .long("language")
                .short('l')
                .help("Language to highlight as (inferred from the file extension when omitted)"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .default_value("html")
                .help("Output format: 'html', 'json' (token stream) or 'text' (plain round-trip)"),
        )
        .arg(
            Arg::new("list-languages")
                .long("list-languages")
                .action(ArgAction::SetTrue)
                .help("List registered languages and exit"),
        )
        .get_matches();

    let highlighter = Highlighter::with_defaults().unwrap_or_else(|e| {
        eprintln!("Error building built-in grammars: {}", e);
        std::process::exit(1);
    });

    if matches.get_flag("list-languages") {
        for name in highlighter.grammars().language_names() {
            println!("{}", name);
        }
        return;
    }

    let path = matches.get_one::<String>("path");
    let source = read_source(path);
    let language = resolve_language(matches.get_one::<String>("language"), path);
    let format = matches.get_one::<String>("format").unwrap();

    let output = match format.as_str() {
        "html" => highlighter.highlight_as(&source, &language),
        "json" => highlighter.tokenize_as(&source, &language).map(|stream| {
            serde_json::to_string_pretty(&stream).unwrap_or_else(|e| {
                eprintln!("Error serializing token stream: {}", e);
                std::process::exit(1);
            })
        }),
        "text" => highlighter
            .tokenize_as(&source, &language)
            .map(|stream| stream.to_text()),
        other => {
            eprintln!("Unknown format '{}' (expected html, json or text)", other);
            std::process::exit(1);
        }
    };

    match output {
        Ok(rendered) => println!("{}", rendered),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Read the input from a file path or, when omitted, from stdin.
fn read_source(path: Option<&String>) -> String {
    match path {
        Some(path) => std::fs::read_to_string(path).unwrap_or_else(|e| {
            eprintln!("Error reading file: {}", e);
            std::process::exit(1);
        }),
        None => {
            let mut buffer = String::new();
            if let Err(e) = std::io::stdin().read_to_string(&mut buffer) {
                eprintln!("Error reading stdin: {}", e);
                std::process::exit(1);
            }
            buffer
        }
    }
}

/// Pick the language: explicit flag first, then file extension, then the
/// markup default.
fn resolve_language(flag: Option<&String>, path: Option<&String>) -> String {
    if let Some(language) = flag {
        return language.clone();
    }
    if let Some(path) = path {
        if let Some(extension) = std::path::Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
        {
            if let Some(language) = EXTENSION_LANGUAGES.get(extension) {
                return (*language).to_string();
            }
        }
    }
    "markup".to_string()
}
