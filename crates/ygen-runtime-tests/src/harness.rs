//! A table builder whose engine replays a fixed shift/reduce script.
//!
//! The real reduction tables come from an external builder. These tests only
//! need the reductions to run in the order an LR engine would run them.

use std::collections::VecDeque;
use ygen_runtime::{
    Assoc, DefinitionError, Engine, ParseError, ParserDef, RuleSet, SemanticValue,
    TableBuilder, Token, TokenSource,
};

#[derive(Debug, Clone, Copy)]
pub enum Step {
    Shift,
    Reduce(&'static str),
}

pub use Step::*;

pub struct ScriptBuilder<V> {
    script: Vec<Step>,
    lift: fn(&Token) -> V,
}

impl<V> ScriptBuilder<V> {
    pub fn new(script: Vec<Step>, lift: fn(&Token) -> V) -> Self {
        Self { script, lift }
    }
}

impl<V> TableBuilder<V> for ScriptBuilder<V>
where
    V: SemanticValue,
{
    type Engine = ScriptEngine<V>;

    fn build(self, def: ParserDef<'_, V>) -> Result<Self::Engine, ParseError> {
        Ok(ScriptEngine {
            start: def.start.to_owned(),
            tokens: def.tokens.iter().map(|&t| t.to_owned()).collect(),
            precedence: def
                .precedence
                .iter()
                .map(|&(assoc, tokens)| (assoc, tokens.iter().map(|&t| t.to_owned()).collect()))
                .collect(),
            rules: def.rules,
            script: self.script,
            lift: self.lift,
            reduced: vec![],
        })
    }
}

pub struct ScriptEngine<V> {
    pub start: String,
    pub tokens: Vec<String>,
    pub precedence: Vec<(Assoc, Vec<String>)>,
    pub rules: RuleSet<V>,
    script: Vec<Step>,
    lift: fn(&Token) -> V,
    /// Left-hand sides of the reductions performed by the last parse.
    pub reduced: Vec<String>,
}

impl<V> Engine<V> for ScriptEngine<V>
where
    V: SemanticValue,
{
    fn parse(
        &mut self,
        input: &str,
        lexer: &mut dyn TokenSource,
        _debug: u32,
    ) -> Result<V, ParseError> {
        lexer.input(input);
        self.reduced.clear();

        let mut stack = vec![];
        for &step in &self.script {
            match step {
                Shift => match lexer.token() {
                    Some(token) => stack.push((self.lift)(&token)),
                    None => return Err(ygen_runtime::parser::syntax_error(None, lexer.filename())),
                },
                Reduce(name) => {
                    let production =
                        self.rules
                            .get(name)
                            .ok_or_else(|| DefinitionError::UnknownRule {
                                name: name.to_owned(),
                            })?;
                    let children = stack.split_off(stack.len() - production.rhs().len());
                    self.reduced.push(production.lhs().to_owned());
                    stack.push(self.rules.reduce(name, children)?);
                }
            }
        }

        if let Some(token) = lexer.token() {
            return Err(ygen_runtime::parser::syntax_error(
                Some(&token),
                lexer.filename(),
            ));
        }
        assert_eq!(self.reduced.last(), Some(&self.start));
        assert_eq!(stack.len(), 1);
        Ok(stack.remove(0))
    }
}

/// A lexer splitting its input at whitespace.
pub struct WordLexer {
    classify: fn(&str) -> &'static str,
    pending: VecDeque<Token>,
    pub resets: usize,
}

impl WordLexer {
    pub fn new(classify: fn(&str) -> &'static str) -> Self {
        Self {
            classify,
            pending: VecDeque::new(),
            resets: 0,
        }
    }
}

impl TokenSource for WordLexer {
    fn input(&mut self, text: &str) {
        self.pending.clear();
        for (i, line) in text.lines().enumerate() {
            let mut column = 1;
            for word in line.split(' ') {
                if !word.is_empty() {
                    self.pending.push_back(Token {
                        kind: (self.classify)(word),
                        text: word.to_owned(),
                        line: i + 1,
                        column,
                    });
                }
                column += word.len() + 1;
            }
        }
    }

    fn token(&mut self) -> Option<Token> {
        self.pending.pop_front()
    }

    fn filename(&self) -> &str {
        "<words>"
    }

    fn reset_lineno(&mut self) {
        self.resets += 1;
    }
}
