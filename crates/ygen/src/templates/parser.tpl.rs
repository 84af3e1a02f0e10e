// ** ATTENTION **
// This code was automatically generated from the file:
// $cfg_filename
//
// Do not modify it directly. Modify the grammar file and
// run the generator again.
// ** ** *** ** **

#[allow(unused_imports)]
use ygen_runtime::_private::{
    syntax_error, Assoc, Engine, Family, Handler, NoScopes, ParseError, ParserDef, Reduction,
    RuleSet, ScopeHooks, Scoped, SemanticValue, TableBuilder, Token, TokenSource,
};

$prologue
/// The start symbol of this grammar.
pub const START: &str = "$start";

/// Precedence groups, lowest priority first.
pub const PRECEDENCE: &[(Assoc, &[&str])] = &[
$precs];

pub const TOKENS: &[&str] = &[
$tokens];

pub const OPT_RULES: &[&str] = &[
$opt_rules];

pub const LIST_RULES: &[&str] = &[
$list_rules];

pub const STRING_RULES: &[&str] = &[
$string_rules];

/// Reduction handlers of this grammar.
pub struct Actions;

#[allow(unused_variables, clippy::all)]
impl Actions {
$productions}

/// `(handler name, production, handler)` of every rule, in declaration order.
pub const PRODUCTIONS: &[(&str, &str, Handler<Value>)] = &[
$handlers];

/// Build the handler registry, including the installed rule families.
pub fn rule_set() -> Result<RuleSet<Value>, ParseError> {
    let mut rules = RuleSet::new();
    for &(name, bnf, handler) in PRODUCTIONS {
        rules.define(name, bnf, handler)?;
    }
    for &name in LIST_RULES {
        rules.install_family(name, Family::list())?;
    }
    for &name in STRING_RULES {
        rules.install_family(name, Family::String)?;
    }
    for &name in OPT_RULES {
        rules.install_family(name, Family::Optional)?;
    }
    Ok(rules)
}

pub struct Parser<E, S = NoScopes> {
    engine: E,
    scopes: S,
}

impl<E> Parser<E>
where
    E: Engine<Value>,
{
    /// Install the rule families and hand the definition to `builder`.
    pub fn new<B>(builder: B) -> Result<Self, ParseError>
    where
        B: TableBuilder<Value, Engine = E>,
    {
        Self::with_scopes(builder, NoScopes)
    }
}

impl<E, S> Parser<E, S>
where
    E: Engine<Value>,
    S: ScopeHooks,
{
    /// Like [`Parser::new`], with `scopes` handed to the lexer on every token.
    pub fn with_scopes<B>(builder: B, scopes: S) -> Result<Self, ParseError>
    where
        B: TableBuilder<Value, Engine = E>,
    {
        let def = ParserDef::new(START, TOKENS, PRECEDENCE, rule_set()?);
        let engine = builder.build(def)?;
        Ok(Self { engine, scopes })
    }

    pub fn scopes(&self) -> &S {
        &self.scopes
    }

    pub fn scopes_mut(&mut self) -> &mut S {
        &mut self.scopes
    }

    pub fn parse(
        &mut self,
        text: &str,
        lexer: &mut dyn TokenSource,
        debug: u32,
    ) -> Result<Value, ParseError> {
        lexer.reset_lineno();
        let mut lexer = Scoped::new(lexer, &mut self.scopes);
        self.engine.parse(text, &mut lexer, debug)
    }

    /// The error reported when no action exists for `token`.
    pub fn p_error(token: Option<&Token>, filename: &str) -> ParseError {
        syntax_error(token, filename)
    }
}
$epilogue