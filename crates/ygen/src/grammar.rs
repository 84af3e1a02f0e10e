//! The structured form of a grammar file.

use indexmap::IndexSet;
use std::fmt;
use ygen_runtime::definition::split_symbols;

/// Associativity of a precedence group.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Assoc {
    Left,
    Right,
    Nonassoc,
}

impl Assoc {
    /// Return the path of the matching runtime variant.
    pub fn runtime_path(self) -> &'static str {
        match self {
            Self::Left => "Assoc::Left",
            Self::Right => "Assoc::Right",
            Self::Nonassoc => "Assoc::Nonassoc",
        }
    }
}

impl fmt::Display for Assoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("%left"),
            Self::Right => f.write_str("%right"),
            Self::Nonassoc => f.write_str("%nonassoc"),
        }
    }
}

/// One `%left`/`%right`/`%nonassoc` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrecGroup {
    pub assoc: Assoc,
    pub tokens: Vec<String>,
}

/// One alternative of a nonterminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// `base` or `base_N`; the handler is named `p_<name>`.
    pub name: String,
    /// `"<lhs> : <items>"`
    pub production: String,
    /// The action body without its enclosing braces.
    pub code: String,
}

impl Rule {
    pub fn handler_name(&self) -> String {
        format!("p_{}", self.name)
    }

    /// Return the left-hand side of the production.
    pub fn lhs(&self) -> &str {
        match self.production.split_once(':') {
            Some((lhs, _)) => lhs.trim(),
            None => self.production.trim(),
        }
    }

    /// Iterate over the right-hand side symbols of the production.
    pub fn symbols(&self) -> impl Iterator<Item = &str> + '_ {
        let rhs = self.production.split_once(':').map_or("", |(_, rhs)| rhs);
        split_symbols(rhs).filter(|s| *s != "%prec")
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    pub start: String,
    /// Precedence groups, lowest first.
    pub precs: Vec<PrecGroup>,
    pub tokens: IndexSet<String>,
    pub opt_rules: IndexSet<String>,
    pub list_rules: IndexSet<String>,
    pub string_rules: IndexSet<String>,
    pub rules: Vec<Rule>,
    pub prologue: Vec<String>,
    pub epilogue: Option<String>,
}

impl ParserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the rules whose left-hand side is `lhs`, in declaration order.
    pub fn rules_of<'a>(&'a self, lhs: &'a str) -> impl Iterator<Item = &'a Rule> + 'a {
        self.rules.iter().filter(move |rule| rule.lhs() == lhs)
    }

    pub fn has_rule(&self, lhs: &str) -> bool {
        self.rules_of(lhs).next().is_some()
    }
}

impl fmt::Display for ParserConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "%start {}", self.start)?;
        if !self.tokens.is_empty() {
            write!(f, "%token")?;
            for token in &self.tokens {
                write!(f, " {}", token)?;
            }
            writeln!(f)?;
        }
        for group in &self.precs {
            write!(f, "{}", group.assoc)?;
            for token in &group.tokens {
                write!(f, " {}", token)?;
            }
            writeln!(f)?;
        }

        for (label, set) in [
            ("opt", &self.opt_rules),
            ("list", &self.list_rules),
            ("string", &self.string_rules),
        ] {
            if set.is_empty() {
                continue;
            }
            write!(f, "## {}:", label)?;
            for name in set {
                write!(f, " {}", name)?;
            }
            writeln!(f)?;
        }

        writeln!(f, "%%")?;
        for rule in &self.rules {
            write!(f, "{} => {}", rule.name, rule.production)?;
            if !rule.code.trim().is_empty() {
                write!(f, " {{ .. }}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
