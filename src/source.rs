//! Source inspection helpers.
//!
//! Used by callers to derive builder inputs such as the Java main class.
//! Nothing here executes or modifies the source.

use std::path::Path;

/// Detect the Java class that declares `main`.
///
/// Falls back to the first `public class` when no class body contains a
/// `static void main` declaration. Returns `None` when no class is found.
pub fn java_main_class(content: &str) -> Option<String> {
    let mut current: Option<String> = None;
    let mut first_public: Option<String> = None;

    for line in content.lines() {
        let trimmed = line.trim();
        if let Some(name) = class_name(trimmed) {
            if first_public.is_none() && trimmed.contains("public ") {
                first_public = Some(name.clone());
            }
            current = Some(name);
        }
        if declares_java_main(trimmed) {
            if let Some(name) = &current {
                return Some(name.clone());
            }
        }
    }

    first_public.or(current)
}

/// Whether `text` contains a `static ... void main(` declaration.
///
/// Matches on tokens, so spacing is free and other modifiers may sit
/// between `static` and `void`.
pub fn declares_java_main(text: &str) -> bool {
    let tokens = java_tokens(text);
    tokens.windows(3).enumerate().any(|(i, window)| {
        window == ["void", "main", "("]
            && tokens[..i]
                .iter()
                .rev()
                .take_while(|token| is_identifier(token))
                .any(|token| *token == "static")
    })
}

/// Split into identifier tokens and single punctuation characters.
fn java_tokens(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = None;
    for (i, c) in text.char_indices() {
        if is_identifier_char(c) {
            start.get_or_insert(i);
            continue;
        }
        if let Some(s) = start.take() {
            tokens.push(&text[s..i]);
        }
        if !c.is_whitespace() {
            tokens.push(&text[i..i + c.len_utf8()]);
        }
    }
    if let Some(s) = start {
        tokens.push(&text[s..]);
    }
    tokens
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn is_identifier(token: &str) -> bool {
    token.chars().next().is_some_and(is_identifier_char)
}

fn class_name(line: &str) -> Option<String> {
    let mut words = line.split_whitespace();
    words.by_ref().find(|word| *word == "class")?;
    let name = words
        .next()?
        .split(|c: char| c == '{' || c == '<')
        .next()
        .unwrap_or_default();
    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$') {
        return None;
    }
    Some(name.to_string())
}

/// Base name of a path, or the whole string when it has none.
pub fn file_name(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
}
