//! Fragment patterns
//!
//! A fragment is located with a regex built from its literal text. Tokens are
//! matched exactly while the whitespace between them is free to vary, so a
//! re-indented or re-wrapped copy of the fragment still matches.

use anyhow::{Context, Result};
use regex::Regex;
use std::fmt;

/// How a fragment's search text is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatternMode {
    /// Literal text; the whitespace between tokens may vary
    #[default]
    Tolerant,
    /// A raw regular expression
    Regex,
}

impl PatternMode {
    pub fn parse(mode: &str) -> Option<Self> {
        match mode {
            "tolerant" => Some(PatternMode::Tolerant),
            "regex" => Some(PatternMode::Regex),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    /// Build a whitespace-tolerant pattern from literal fragment text
    ///
    /// Leading indentation becomes `[ \t]*` and trailing whitespace is dropped.
    /// An inner whitespace run that spans a line break becomes `\s*`; one
    /// within a single line becomes `\s+`, so neighbouring tokens never fuse.
    pub fn tolerant(fragment: &str) -> Result<Self> {
        if fragment.trim().is_empty() {
            anyhow::bail!("Fragment text is empty; nothing to search for");
        }
        let expr = tolerant_expression(fragment);
        let regex = Regex::new(&expr).with_context(|| {
            format!("Failed to build pattern for fragment: {}", first_line(fragment))
        })?;
        Ok(Self { regex })
    }

    /// Compile a raw regular expression
    pub fn regex(expr: &str) -> Result<Self> {
        let regex = Regex::new(expr).with_context(|| format!("Invalid regex pattern: {}", expr))?;
        Ok(Self { regex })
    }

    pub fn build(mode: PatternMode, text: &str) -> Result<Self> {
        match mode {
            PatternMode::Tolerant => Self::tolerant(text),
            PatternMode::Regex => Self::regex(text),
        }
    }

    pub fn as_regex(&self) -> &Regex {
        &self.regex
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.regex.as_str())
    }
}

/// Translate literal fragment text into a regex source string
pub fn tolerant_expression(fragment: &str) -> String {
    let trimmed = fragment.trim_end();
    let body = trimmed.trim_start();
    let mut expr = String::with_capacity(body.len() * 2);

    if body.len() < trimmed.len() {
        expr.push_str(r"[ \t]*");
    }

    let mut token = String::new();
    let mut gap = String::new();
    for c in body.chars() {
        if c.is_whitespace() {
            gap.push(c);
            continue;
        }
        if !gap.is_empty() {
            expr.push_str(&regex::escape(&token));
            token.clear();
            expr.push_str(if gap.contains('\n') { r"\s*" } else { r"\s+" });
            gap.clear();
        }
        token.push(c);
    }
    expr.push_str(&regex::escape(&token));

    expr
}

fn first_line(text: &str) -> &str {
    text.trim_start().lines().next().unwrap_or("")
}
