//! Parser definition.

use crate::{
    family::{self, Family},
    reduction::{Reduction, SemanticValue},
};
use indexmap::{IndexMap, IndexSet};
use std::fmt;

/// A reduction handler.
pub type Handler<V> = fn(&mut Reduction<V>);

/// Associativity of a precedence group.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Assoc {
    Left,
    Right,
    Nonassoc,
}

impl fmt::Display for Assoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
            Self::Nonassoc => write!(f, "nonassoc"),
        }
    }
}

/// A production rule together with the handler invoked when it is reduced.
pub struct Production<V> {
    name: String,
    lhs: String,
    rhs: Vec<String>,
    prec: Option<String>,
    handler: Handler<V>,
}

impl<V> fmt::Debug for Production<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Production")
            .field("name", &self.name)
            .field("lhs", &self.lhs)
            .field("rhs", &self.rhs)
            .field("prec", &self.prec)
            .finish_non_exhaustive()
    }
}

impl<V> Production<V> {
    /// Build a production from its BNF line, e.g. `"expr : expr '+' term"`.
    ///
    /// A `%prec NAME` pair on the right-hand side is split off into
    /// [`prec`](Self::prec) and does not count as a symbol.
    pub fn parse(name: &str, bnf: &str, handler: Handler<V>) -> Result<Self, DefinitionError> {
        let malformed = || DefinitionError::MalformedProduction {
            name: name.to_owned(),
            bnf: bnf.to_owned(),
        };

        let (lhs, rhs) = bnf.split_once(':').ok_or_else(malformed)?;
        let lhs = lhs.trim();
        if lhs.is_empty() || lhs.contains(char::is_whitespace) {
            return Err(malformed());
        }

        let mut symbols = vec![];
        let mut prec = None;
        let mut items = split_symbols(rhs);
        while let Some(item) = items.next() {
            if item == "%prec" {
                prec = Some(items.next().ok_or_else(malformed)?.to_owned());
            } else {
                symbols.push(item.to_owned());
            }
        }

        Ok(Self {
            name: name.to_owned(),
            lhs: lhs.to_owned(),
            rhs: symbols,
            prec,
            handler,
        })
    }

    /// Return the name of the handler, e.g. `p_block_opt_2`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the left-hand side of this production.
    pub fn lhs(&self) -> &str {
        &self.lhs
    }

    /// Return the right-hand side of this production.
    pub fn rhs(&self) -> &[String] {
        &self.rhs[..]
    }

    /// Return the terminal whose precedence this production borrows.
    pub fn prec(&self) -> Option<&str> {
        self.prec.as_deref()
    }

    pub fn handler(&self) -> Handler<V> {
        self.handler
    }

    fn same_shape(&self, other: &Self) -> bool {
        self.lhs == other.lhs && self.rhs == other.rhs && self.prec == other.prec
    }
}

impl<V> fmt::Display for Production<V> {
    // `"LHS : R1 R2 R3"`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} :", self.lhs)?;
        for symbol in &self.rhs {
            write!(f, " {}", symbol)?;
        }
        if let Some(prec) = &self.prec {
            write!(f, " %prec {}", prec)?;
        }
        Ok(())
    }
}

/// Split the right-hand side of a production into its symbols.
///
/// Quoted literals are kept in one piece, so `' '` is a single symbol.
pub fn split_symbols(rhs: &str) -> impl Iterator<Item = &str> + '_ {
    let mut rest = rhs;
    std::iter::from_fn(move || {
        rest = rest.trim_start();
        let end = match rest.as_bytes().first()? {
            &quote @ (b'\'' | b'"') => rest[1..]
                .find(char::from(quote))
                .map_or(rest.len(), |i| i + 2),
            _ => rest.find(char::is_whitespace).unwrap_or(rest.len()),
        };
        let (symbol, tail) = rest.split_at(end);
        rest = tail;
        Some(symbol)
    })
}

/// The registry of reduction handlers, keyed by handler name.
///
/// A `RuleSet` is filled once while a parser is constructed and then handed
/// to the table builder as part of a [`ParserDef`].
pub struct RuleSet<V> {
    productions: IndexMap<String, Production<V>>,
    families: IndexSet<(String, Family)>,
}

impl<V> fmt::Debug for RuleSet<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSet")
            .field("productions", &self.productions)
            .field("families", &self.families)
            .finish()
    }
}

impl<V> Default for RuleSet<V> {
    fn default() -> Self {
        Self {
            productions: IndexMap::new(),
            families: IndexSet::new(),
        }
    }
}

impl<V> RuleSet<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for the production described by `bnf`.
    ///
    /// Registering the same production under the same name again is a no-op;
    /// a different production under an existing name is rejected.
    pub fn define(
        &mut self,
        name: &str,
        bnf: &str,
        handler: Handler<V>,
    ) -> Result<(), DefinitionError> {
        let production = Production::parse(name, bnf, handler)?;
        self.insert(production)
    }

    fn insert(&mut self, production: Production<V>) -> Result<(), DefinitionError> {
        match self.productions.get(production.name()) {
            Some(existing) if existing.same_shape(&production) => Ok(()),
            Some(existing) => Err(DefinitionError::DuplicateRule {
                name: production.name,
                existing: existing.to_string(),
            }),
            None => {
                tracing::trace!("define {}: {}", production.name, production);
                self.productions
                    .insert(production.name.clone(), production);
                Ok(())
            }
        }
    }

    pub(crate) fn define_production(
        &mut self,
        name: String,
        lhs: String,
        rhs: Vec<String>,
        handler: Handler<V>,
    ) -> Result<(), DefinitionError> {
        self.insert(Production {
            name,
            lhs,
            rhs,
            prec: None,
            handler,
        })
    }

    /// Return the production registered under the specified handler name.
    pub fn get(&self, name: &str) -> Option<&Production<V>> {
        self.productions.get(name)
    }

    /// Iterate over the registered productions in registration order.
    pub fn productions(&self) -> impl Iterator<Item = &Production<V>> + '_ {
        self.productions.values()
    }

    /// Iterate over the productions whose left-hand side is `lhs`.
    pub fn alternatives<'a>(&'a self, lhs: &'a str) -> impl Iterator<Item = &'a Production<V>> + 'a {
        self.productions.values().filter(move |p| p.lhs == lhs)
    }

    pub fn len(&self) -> usize {
        self.productions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.productions.is_empty()
    }
}

impl<V> RuleSet<V>
where
    V: SemanticValue,
{
    /// Install the handlers of a rule family derived from `base`.
    ///
    /// Returns `false` if this `(base, family)` pair was already installed.
    pub fn install_family(&mut self, base: &str, family: Family) -> Result<bool, DefinitionError> {
        let key = (base.to_owned(), family);
        if self.families.contains(&key) {
            return Ok(false);
        }
        family::install(self, base, &key.1)?;
        self.families.insert(key);
        Ok(true)
    }

    /// Run the handler registered under `name` over the values of its
    /// right-hand side and return the result.
    pub fn reduce(&self, name: &str, children: Vec<V>) -> Result<V, DefinitionError> {
        let production = self
            .get(name)
            .ok_or_else(|| DefinitionError::UnknownRule {
                name: name.to_owned(),
            })?;
        if children.len() != production.rhs.len() {
            return Err(DefinitionError::ArityMismatch {
                name: name.to_owned(),
                expected: production.rhs.len(),
                actual: children.len(),
            });
        }
        tracing::trace!("reduce {}: {}", name, production);
        let mut p = Reduction::new(children);
        (production.handler)(&mut p);
        Ok(p.into_result())
    }
}

/// Everything the external table builder needs to construct a parser.
#[derive(Debug)]
#[non_exhaustive]
pub struct ParserDef<'a, V> {
    pub start: &'a str,
    pub tokens: &'a [&'a str],
    /// Precedence groups, lowest priority first.
    pub precedence: &'a [(Assoc, &'a [&'a str])],
    pub rules: RuleSet<V>,
}

impl<'a, V> ParserDef<'a, V> {
    pub fn new(
        start: &'a str,
        tokens: &'a [&'a str],
        precedence: &'a [(Assoc, &'a [&'a str])],
        rules: RuleSet<V>,
    ) -> Self {
        Self {
            start,
            tokens,
            precedence,
            rules,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
    #[error("malformed production `{}' for handler {}", bnf, name)]
    MalformedProduction { name: String, bnf: String },

    #[error("duplicate production rule {} (already defined as `{}')", name, existing)]
    DuplicateRule { name: String, existing: String },

    #[error("unknown production rule {}", name)]
    UnknownRule { name: String },

    #[error("{} expects {} values, but {} were given", name, expected, actual)]
    ArityMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
}
