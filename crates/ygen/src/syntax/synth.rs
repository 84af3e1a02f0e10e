//! Turning parsed rules into the entries of a `ParserConfig`.

use crate::grammar::{ParserConfig, Rule};
use std::fmt;

/// The shorthand wrappers around a rule reference.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FamilyKind {
    /// `[x]`
    Opt,
    /// `<x>`
    List,
    /// `(x)`
    String,
}

impl FamilyKind {
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Opt => "_opt",
            Self::List => "_list",
            Self::String => "_string",
        }
    }

    pub fn derived_name(self, base: &str) -> String {
        format!("{}{}", base, self.suffix())
    }

    /// Return the base name if `symbol` names a rule of this family.
    pub fn strip<'a>(self, symbol: &'a str) -> Option<&'a str> {
        symbol
            .strip_suffix(self.suffix())
            .filter(|base| !base.is_empty())
    }

    pub const ALL: [Self; 3] = [Self::Opt, Self::List, Self::String];
}

impl fmt::Display for FamilyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Opt => f.write_str("opt"),
            Self::List => f.write_str("list"),
            Self::String => f.write_str("string"),
        }
    }
}

/// An element on the right-hand side of an alternative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Symbol(String),
    Code { text: String, line: usize },
}

pub type Alternative = Vec<Item>;

/// Resolves rule-family shorthand and numbers alternatives while the
/// grammar is being parsed.
#[derive(Debug)]
pub struct RuleSynthesizer<'c> {
    config: &'c mut ParserConfig,
}

impl<'c> RuleSynthesizer<'c> {
    pub fn new(config: &'c mut ParserConfig) -> Self {
        Self { config }
    }

    /// Register `inner` for the family and return the name that replaces the
    /// wrapped reference.
    pub fn wrap(&mut self, kind: FamilyKind, inner: &str) -> String {
        let set = match kind {
            FamilyKind::Opt => &mut self.config.opt_rules,
            FamilyKind::List => &mut self.config.list_rules,
            FamilyKind::String => &mut self.config.string_rules,
        };
        if set.insert(inner.to_owned()) {
            tracing::debug!("register {} family for {}", kind, inner);
        }
        kind.derived_name(inner)
    }

    /// Append one `Rule` per alternative of `lhs`.
    pub fn add_rule(&mut self, lhs: &str, alternatives: Vec<Alternative>) {
        let numbered = alternatives.len() > 1;
        for (i, alternative) in alternatives.into_iter().enumerate() {
            let name = if numbered {
                format!("{}_{}", lhs, i + 1)
            } else {
                lhs.to_owned()
            };

            let mut symbols = vec![];
            let mut code = String::new();
            let last = alternative.len().saturating_sub(1);
            for (j, item) in alternative.into_iter().enumerate() {
                match item {
                    Item::Symbol(symbol) => symbols.push(symbol),
                    Item::Code { text, .. } if j == last => code = action_body(&text),
                    Item::Code { line, .. } => {
                        tracing::warn!(
                            "line {}: mid-rule action in {} is not supported and is dropped",
                            line,
                            name
                        );
                    }
                }
            }

            let production = format!("{} : {}", lhs, symbols.join(" "));
            tracing::trace!("rule {}: {}", name, production);
            self.config.rules.push(Rule {
                name,
                production,
                code,
            });
        }
    }
}

/// Strip the enclosing braces of an action block.
///
/// Code sharing a line with the opening brace of a multi-line block is moved
/// onto its own line, indented like the least indented line after it.
fn action_body(text: &str) -> String {
    let inner = text
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .unwrap_or(text);
    let Some((first, rest)) = inner.split_once('\n') else {
        return inner.trim().to_owned();
    };
    if first.trim().is_empty() {
        return inner.to_owned();
    }
    let indent = rest
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| &line[..line.len() - line.trim_start().len()])
        .min_by_key(|ws| ws.len())
        .unwrap_or("");
    format!("\n{}{}\n{}", indent, first.trim(), rest)
}
