//! Rule families: auxiliary nonterminals derived from a base nonterminal.
//!
//! | family   | derived rule    | productions                                  |
//! |----------|-----------------|----------------------------------------------|
//! | optional | `name_opt`      | `name_opt : ` / `name_opt : name`             |
//! | list     | `name_list`     | `name_list : name` / `name_list : name DELIM name_list` |
//! | string   | `name_string`   | `name_string : name` / `name_string : name name_string` |
//!
//! The list-shaped families are right-recursive, so the cons handler runs
//! innermost (rightmost) first and has to prepend its left child.

use crate::{
    definition::{DefinitionError, RuleSet},
    reduction::{Reduction, SemanticValue},
};
use std::borrow::Cow;

/// The delimiter used by [`Family::list`].
pub const DEFAULT_DELIMITER: &str = "','";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Family {
    /// `name_opt := empty | name`
    Optional,

    /// `name_list := name | name DELIM name_list`
    ///
    /// An empty delimiter yields `name_list := name | name name_list`.
    List { delimiter: Cow<'static, str> },

    /// `name_string := name | name name_string`
    String,
}

impl Family {
    /// A list family delimited by a comma token.
    pub const fn list() -> Self {
        Self::List {
            delimiter: Cow::Borrowed(DEFAULT_DELIMITER),
        }
    }

    pub fn list_with(delimiter: impl Into<Cow<'static, str>>) -> Self {
        Self::List {
            delimiter: delimiter.into(),
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Optional => "_opt",
            Self::List { .. } => "_list",
            Self::String => "_string",
        }
    }

    /// Return the name of the nonterminal derived from `base`.
    pub fn derived_name(&self, base: &str) -> String {
        format!("{}{}", base, self.suffix())
    }

    fn delimiter(&self) -> Option<&str> {
        match self {
            Self::List { delimiter } if !delimiter.is_empty() => Some(&**delimiter),
            _ => None,
        }
    }
}

pub(crate) fn install<V>(
    rules: &mut RuleSet<V>,
    base: &str,
    family: &Family,
) -> Result<(), DefinitionError>
where
    V: SemanticValue,
{
    let derived = family.derived_name(base);
    tracing::debug!("install {:?} family for {} as {}", family, base, derived);

    match family {
        Family::Optional => {
            rules.define_production(
                format!("p_{}_1", derived),
                derived.clone(),
                vec![],
                opt_none::<V>,
            )?;
            rules.define_production(
                format!("p_{}_2", derived),
                derived.clone(),
                vec![base.to_owned()],
                opt_some::<V>,
            )?;
        }

        Family::List { .. } | Family::String => {
            rules.define_production(
                format!("p_{}_1", derived),
                derived.clone(),
                vec![base.to_owned()],
                seq_single::<V>,
            )?;

            let mut rhs = vec![base.to_owned()];
            rhs.extend(family.delimiter().map(str::to_owned));
            rhs.push(derived.clone());
            rules.define_production(format!("p_{}_2", derived), derived, rhs, seq_cons::<V>)?;
        }
    }

    Ok(())
}

fn opt_none<V: SemanticValue>(p: &mut Reduction<V>) {
    p.set(V::null());
}

fn opt_some<V: SemanticValue>(p: &mut Reduction<V>) {
    let value = p.take(1);
    p.set(value);
}

fn seq_single<V: SemanticValue>(p: &mut Reduction<V>) {
    let value = p.take(1);
    p.set(V::from_seq(vec![value]));
}

fn seq_cons<V: SemanticValue>(p: &mut Reduction<V>) {
    // The accumulated tail is always the last child, with or without a delimiter.
    let tail = p.take(p.len() - 1);
    let head = p.take(1);
    let mut items = match tail.into_seq() {
        Ok(items) => items,
        Err(tail) => {
            tracing::warn!("list tail is not a sequence; treating it as a single item");
            vec![tail]
        }
    };
    items.insert(0, head);
    p.set(V::from_seq(items));
}
