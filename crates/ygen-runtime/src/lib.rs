//! Runtime support for parsers generated by `ygen`.

pub mod definition;
pub mod family;
pub mod parser;
pub mod reduction;

pub use crate::{
    definition::{Assoc, DefinitionError, ParserDef, RuleSet},
    family::Family,
    parser::{
        Coord, Engine, NoScopes, ParseError, ScopeHooks, ScopeStack, Scoped, TableBuilder, Token,
        TokenSource,
    },
    reduction::{Reduction, SemanticValue},
};

// internally used by codegen.
#[doc(hidden)]
pub mod _private {
    pub use crate::{
        definition::{Assoc, Handler, ParserDef, RuleSet},
        family::Family,
        parser::{
            syntax_error, Engine, NoScopes, ParseError, ScopeHooks, Scoped, TableBuilder, Token,
            TokenSource,
        },
        reduction::{Reduction, SemanticValue},
    };
}
