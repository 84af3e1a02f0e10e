//! Contracts between a generated parser and its collaborators.
//!
//! A generated parser owns none of the heavy machinery: the lexer is supplied
//! by the caller as a [`TokenSource`], and the reduction tables are built by
//! an external [`TableBuilder`] from the [`ParserDef`] the parser assembles.

use crate::definition::{DefinitionError, ParserDef};
use std::fmt;

/// A source location attached to parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coord {
    pub file: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl Coord {
    pub fn new(file: impl Into<String>, line: Option<usize>, column: Option<usize>) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Coord {
    // `"file:line:column"`, omitting the unknown parts.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file)?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
            if let Some(column) = self.column {
                write!(f, ":{}", column)?;
            }
        }
        Ok(())
    }
}

/// A token handed to the engine by a [`TokenSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The terminal name, e.g. `"NUMBER"` or `"'+'"`.
    pub kind: &'static str,
    pub text: String,
    pub line: usize,
    pub column: usize,
}

/// The lexer driven by an [`Engine`].
pub trait TokenSource {
    /// Start lexing the specified text.
    fn input(&mut self, text: &str);

    /// Fetch the next token, or `None` at the end of input.
    fn token(&mut self) -> Option<Token>;

    /// Return the name of the file being lexed.
    fn filename(&self) -> &str;

    fn reset_lineno(&mut self);

    /// Fetch the next token with access to the parser's scope hooks.
    ///
    /// Lexers without scoped names keep the default, which ignores `scopes`.
    fn scoped_token(&mut self, scopes: &mut dyn ScopeHooks) -> Option<Token> {
        let _ = scopes;
        self.token()
    }
}

/// A [`TokenSource`] fetching every token through
/// [`TokenSource::scoped_token`] with the given hooks.
pub struct Scoped<'a> {
    lexer: &'a mut dyn TokenSource,
    scopes: &'a mut dyn ScopeHooks,
}

impl<'a> Scoped<'a> {
    pub fn new(lexer: &'a mut dyn TokenSource, scopes: &'a mut dyn ScopeHooks) -> Self {
        Self { lexer, scopes }
    }
}

impl TokenSource for Scoped<'_> {
    fn input(&mut self, text: &str) {
        self.lexer.input(text);
    }

    fn token(&mut self) -> Option<Token> {
        self.lexer.scoped_token(&mut *self.scopes)
    }

    fn filename(&self) -> &str {
        self.lexer.filename()
    }

    fn reset_lineno(&mut self) {
        self.lexer.reset_lineno();
    }
}

/// Callbacks a lexer may use to track lexical scopes.
///
/// All methods default to no-ops, so grammars without scoped names can use
/// [`NoScopes`].
pub trait ScopeHooks {
    fn on_scope_begin(&mut self) {}

    fn on_scope_end(&mut self) {}

    fn is_type_in_scope(&self, _name: &str) -> bool {
        false
    }
}

/// The [`ScopeHooks`] that ignores every scope.
#[derive(Debug, Default, Copy, Clone)]
pub struct NoScopes;

impl ScopeHooks for NoScopes {}

/// A stack of scopes mapping each declared name to whether it is a type.
#[derive(Debug, Clone)]
pub struct ScopeStack {
    scopes: Vec<Vec<(String, bool)>>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    /// Create a stack holding the outermost scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![vec![]],
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn push(&mut self) {
        self.scopes.push(vec![]);
    }

    /// Leave the innermost scope. The outermost scope is never popped.
    pub fn pop(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn add_typedef_name(&mut self, name: &str, coord: &Coord) -> Result<(), ParseError> {
        self.declare(name, true, coord)
    }

    pub fn add_identifier(&mut self, name: &str, coord: &Coord) -> Result<(), ParseError> {
        self.declare(name, false, coord)
    }

    fn declare(&mut self, name: &str, is_type: bool, coord: &Coord) -> Result<(), ParseError> {
        let scope = self.scopes.last_mut().ok_or_else(|| ParseError::Syntax {
            coord: coord.clone(),
            msg: "no scope is open".into(),
        })?;
        match scope.iter_mut().find(|(n, _)| n == name) {
            Some((_, prev)) if *prev != is_type => {
                let (now, before) = if is_type {
                    ("Typedef", "non-typedef")
                } else {
                    ("Non-typedef", "typedef")
                };
                Err(ParseError::Syntax {
                    coord: coord.clone(),
                    msg: format!(
                        "{} {:?} previously declared as {} in this scope",
                        now, name, before
                    ),
                })
            }
            Some(_) => Ok(()),
            None => {
                scope.push((name.to_owned(), is_type));
                Ok(())
            }
        }
    }

    /// Return `true` if the innermost declaration of `name` is a type.
    pub fn is_type_in_scope(&self, name: &str) -> bool {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.iter().find(|(n, _)| n == name).map(|(_, t)| *t))
            .unwrap_or(false)
    }
}

impl ScopeHooks for ScopeStack {
    fn on_scope_begin(&mut self) {
        self.push();
    }

    fn on_scope_end(&mut self) {
        self.pop();
    }

    fn is_type_in_scope(&self, name: &str) -> bool {
        ScopeStack::is_type_in_scope(self, name)
    }
}

/// A parser built from a [`ParserDef`].
pub trait Engine<V> {
    fn parse(&mut self, input: &str, lexer: &mut dyn TokenSource, debug: u32)
        -> Result<V, ParseError>;
}

/// The external reduction-table builder.
pub trait TableBuilder<V> {
    type Engine: Engine<V>;

    fn build(self, def: ParserDef<'_, V>) -> Result<Self::Engine, ParseError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("{}: {}", coord, msg)]
    Syntax { coord: Coord, msg: String },

    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error("table builder error: {}", _0)]
    Builder(String),
}

/// Build the error reported when the engine cannot shift `token`.
pub fn syntax_error(token: Option<&Token>, filename: &str) -> ParseError {
    match token {
        Some(token) => ParseError::Syntax {
            coord: Coord::new(filename, Some(token.line), Some(token.column)),
            msg: format!("before: {}", token.text),
        },
        None => ParseError::Syntax {
            coord: Coord::new(filename, None, None),
            msg: "At end of input".into(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_before_token() {
        let token = Token {
            kind: "NUMBER",
            text: "42".into(),
            line: 3,
            column: 7,
        };
        let err = syntax_error(Some(&token), "a.annot");
        assert_eq!(err.to_string(), "a.annot:3:7: before: 42");
    }

    #[test]
    fn syntax_error_at_end_of_input() {
        let err = syntax_error(None, "a.annot");
        assert_eq!(err.to_string(), "a.annot: At end of input");
        assert!(matches!(
            err,
            ParseError::Syntax { coord: Coord { line: None, .. }, .. }
        ));
    }

    #[test]
    fn scope_stack_shadows_and_pops() {
        let coord = Coord::new("t.c", Some(1), Some(1));
        let mut scopes = ScopeStack::new();
        scopes.add_typedef_name("T", &coord).unwrap();
        assert!(scopes.is_type_in_scope("T"));

        scopes.on_scope_begin();
        scopes.add_identifier("T", &coord).unwrap();
        assert!(!scopes.is_type_in_scope("T"));

        scopes.on_scope_end();
        assert!(scopes.is_type_in_scope("T"));

        scopes.pop();
        assert_eq!(scopes.depth(), 1);
    }

    #[test]
    fn scope_stack_rejects_redeclaration_as_other_kind() {
        let coord = Coord::new("t.c", Some(2), Some(5));
        let mut scopes = ScopeStack::new();
        scopes.add_identifier("x", &coord).unwrap();
        let err = scopes.add_typedef_name("x", &coord).unwrap_err();
        assert_eq!(
            err.to_string(),
            "t.c:2:5: Typedef \"x\" previously declared as non-typedef in this scope"
        );
        scopes.add_identifier("x", &coord).unwrap();
    }

    #[test]
    fn no_scopes_never_reports_types() {
        let mut hooks = NoScopes;
        hooks.on_scope_begin();
        assert!(!hooks.is_type_in_scope("T"));
    }

    struct Braces {
        words: Vec<&'static str>,
    }

    impl TokenSource for Braces {
        fn input(&mut self, _: &str) {}

        fn token(&mut self) -> Option<Token> {
            self.scoped_token(&mut NoScopes)
        }

        fn filename(&self) -> &str {
            "<braces>"
        }

        fn reset_lineno(&mut self) {}

        fn scoped_token(&mut self, scopes: &mut dyn ScopeHooks) -> Option<Token> {
            loop {
                let word = self.words.pop()?;
                match word {
                    "{" => scopes.on_scope_begin(),
                    "}" => scopes.on_scope_end(),
                    _ => {
                        let kind = if scopes.is_type_in_scope(word) { "TYPE" } else { "ID" };
                        return Some(Token {
                            kind,
                            text: word.into(),
                            line: 1,
                            column: 1,
                        });
                    }
                }
            }
        }
    }

    #[test]
    fn scoped_forwards_hooks_to_the_lexer() {
        let coord = Coord::new("<braces>", None, None);
        let mut scopes = ScopeStack::new();
        scopes.add_typedef_name("T", &coord).unwrap();

        // popped from the back: T { x
        let mut lexer = Braces { words: vec!["x", "{", "T"] };
        let mut scoped = Scoped::new(&mut lexer, &mut scopes);
        assert_eq!(scoped.token().unwrap().kind, "TYPE");
        assert_eq!(scoped.token().unwrap().kind, "ID");
        assert!(scoped.token().is_none());
        assert_eq!(scoped.filename(), "<braces>");
        assert_eq!(scopes.depth(), 2);
    }
}
