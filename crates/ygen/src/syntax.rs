//! Parser for grammar files.

pub mod lexer;
pub mod synth;

use self::{
    lexer::{Keyword, LexError, LexFault, Lexeme, Lexer, Token},
    synth::{Alternative, FamilyKind, Item, RuleSynthesizer},
};
use crate::grammar::{Assoc, ParserConfig, PrecGroup};
use anyhow::Context as _;
use std::{fs, path::Path};

/// The result of parsing a grammar file.
#[derive(Debug)]
pub struct Parsed {
    pub config: ParserConfig,
    /// Illegal characters skipped while lexing.
    pub lex_faults: Vec<LexFault>,
}

#[derive(Debug, thiserror::Error)]
pub enum SyntaxError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("{}:{}: syntax error at `{}' ({}), expected {}", line, column, text, found, expected)]
    Unexpected {
        found: String,
        text: String,
        expected: &'static str,
        line: usize,
        column: usize,
    },

    #[error("{}:{}: unexpected end of input, expected {}", line, column, expected)]
    UnexpectedEoi {
        expected: &'static str,
        line: usize,
        column: usize,
    },
}

pub fn parse(source: &str) -> Result<Parsed, SyntaxError> {
    let span = tracing::trace_span!("parse");
    let _entered = span.enter();

    let mut parser = GrammarParser::new(source);
    parser.parse_grammar()?;
    Ok(Parsed {
        lex_faults: parser.lexer.take_faults(),
        config: parser.config,
    })
}

pub fn parse_file(path: impl AsRef<Path>) -> anyhow::Result<Parsed> {
    let path = path.as_ref();
    let source = fs::read_to_string(path)
        .with_context(|| anyhow::anyhow!("failed to read {}", path.display()))?;
    let parsed = parse(&source)
        .with_context(|| anyhow::anyhow!("failed to parse {}", path.display()))?;
    Ok(parsed)
}

struct GrammarParser<'s> {
    lexer: Lexer<'s>,
    peeked: Option<Lexeme<'s>>,
    /// Position of the last consumed token.
    last: (usize, usize),
    config: ParserConfig,
    first_rule: Option<String>,
}

impl<'s> GrammarParser<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            lexer: Lexer::new(source),
            peeked: None,
            last: (1, 1),
            config: ParserConfig::new(),
            first_rule: None,
        }
    }

    /// Look at the next token without consuming it.
    ///
    /// The lexer is only advanced on demand, which lets the caller change
    /// the lexer state between two tokens.
    fn peek(&mut self) -> Result<Option<Token<'s>>, SyntaxError> {
        if self.peeked.is_none() {
            self.peeked = self.lexer.next().transpose()?;
        }
        Ok(self.peeked.map(|lexeme| lexeme.token))
    }

    fn bump(&mut self) -> Result<Option<Lexeme<'s>>, SyntaxError> {
        self.peek()?;
        let lexeme = self.peeked.take();
        if let Some(lexeme) = &lexeme {
            self.last = (lexeme.line, lexeme.column);
        }
        Ok(lexeme)
    }

    fn unexpected(&mut self, expected: &'static str) -> SyntaxError {
        match self.peeked.take() {
            Some(lexeme) => SyntaxError::Unexpected {
                found: lexeme.token.to_string(),
                text: lexeme.text.to_owned(),
                expected,
                line: lexeme.line,
                column: lexeme.column,
            },
            None => SyntaxError::UnexpectedEoi {
                expected,
                line: self.last.0,
                column: self.last.1,
            },
        }
    }

    fn expect(&mut self, want: Token<'static>, expected: &'static str) -> Result<(), SyntaxError> {
        if self.peek()? == Some(want) {
            self.bump()?;
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn eat(&mut self, want: Token<'static>) -> Result<bool, SyntaxError> {
        if self.peek()? == Some(want) {
            self.bump()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn ident(&mut self, expected: &'static str) -> Result<&'s str, SyntaxError> {
        match self.peek()? {
            Some(Token::Ident(name)) => {
                self.bump()?;
                Ok(name)
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    // grammar := defsection? rulesection
    fn parse_grammar(&mut self) -> Result<(), SyntaxError> {
        match self.peek()? {
            Some(Token::Ident(..)) => self.lexer.set_last_section(true),
            _ => self.parse_definitions()?,
        }
        self.parse_rules()?;

        if self.config.start.is_empty() {
            if let Some(first) = self.first_rule.take() {
                tracing::debug!("no %start given; using {}", first);
                self.config.start = first;
            }
        }
        Ok(())
    }

    // defsection := definition* SECTION
    fn parse_definitions(&mut self) -> Result<(), SyntaxError> {
        loop {
            match self.peek()? {
                Some(Token::Section(..)) => {
                    // must be set before the token after `%%` is lexed.
                    self.lexer.set_last_section(true);
                    self.bump()?;
                    return Ok(());
                }
                Some(Token::Literal(body)) => {
                    self.bump()?;
                    self.config.prologue.push(body.to_owned());
                }
                Some(Token::Kw(Keyword::Start)) => {
                    self.bump()?;
                    let start = self.ident("a start symbol")?;
                    self.config.start = start.to_owned();
                }
                Some(Token::Kw(Keyword::Token)) => {
                    self.bump()?;
                    let names = self.parse_token_decl()?;
                    self.config.tokens.extend(names);
                }
                Some(Token::Kw(kw @ (Keyword::Left | Keyword::Right | Keyword::Nonassoc))) => {
                    self.bump()?;
                    let assoc = match kw {
                        Keyword::Left => Assoc::Left,
                        Keyword::Right => Assoc::Right,
                        _ => Assoc::Nonassoc,
                    };
                    let tokens = self.parse_token_decl()?;
                    self.config.precs.push(PrecGroup { assoc, tokens });
                }
                Some(Token::Kw(Keyword::Type)) => {
                    self.bump()?;
                    self.parse_tag()?;
                    self.ident("a symbol name")?;
                    loop {
                        self.eat(Token::Comma)?;
                        match self.peek()? {
                            Some(Token::Ident(..)) => {
                                self.bump()?;
                            }
                            _ => break,
                        }
                    }
                    self.eat(Token::Semicolon)?;
                }
                Some(Token::Kw(Keyword::Union)) => {
                    self.bump()?;
                    match self.peek()? {
                        Some(Token::Code(..)) => {
                            self.bump()?;
                        }
                        _ => return Err(self.unexpected("a `{ ... }' block")),
                    }
                    self.eat(Token::Semicolon)?;
                }
                _ => return Err(self.unexpected("a definition or `%%'")),
            }
        }
    }

    // '<' ID '>'
    fn parse_tag(&mut self) -> Result<(), SyntaxError> {
        self.expect(Token::Lt, "`<'")?;
        self.ident("a type tag")?;
        self.expect(Token::Gt, "`>'")
    }

    // ('<' ID '>')? tokenid (','? tokenid)* ';'?
    fn parse_token_decl(&mut self) -> Result<Vec<String>, SyntaxError> {
        if self.peek()? == Some(Token::Lt) {
            self.parse_tag()?;
        }

        let mut names = vec![self.parse_tokenid()?];
        loop {
            if self.eat(Token::Comma)? {
                names.push(self.parse_tokenid()?);
                continue;
            }
            match self.peek()? {
                Some(Token::Ident(..) | Token::QLiteral(..)) => {
                    names.push(self.parse_tokenid()?);
                }
                _ => break,
            }
        }
        self.eat(Token::Semicolon)?;
        Ok(names)
    }

    // tokenid := (ID | QLITERAL) NUMBER?
    fn parse_tokenid(&mut self) -> Result<String, SyntaxError> {
        let name = match self.peek()? {
            Some(Token::Ident(name) | Token::QLiteral(name)) => {
                self.bump()?;
                name.to_owned()
            }
            _ => return Err(self.unexpected("a token name")),
        };
        if let Some(Token::Number(..)) = self.peek()? {
            self.bump()?;
        }
        Ok(name)
    }

    // rulesection := rule* SECTION
    fn parse_rules(&mut self) -> Result<(), SyntaxError> {
        loop {
            match self.peek()? {
                Some(Token::Ident(..)) => self.parse_rule()?,
                Some(Token::Section(epilogue)) => {
                    self.bump()?;
                    self.config.epilogue = epilogue
                        .filter(|text| !text.trim().is_empty())
                        .map(ToOwned::to_owned);
                    break;
                }
                _ => return Err(self.unexpected("a rule or `%%'")),
            }
        }
        match self.peek()? {
            None => Ok(()),
            Some(..) => Err(self.unexpected("end of input")),
        }
    }

    // rule := ID ':' alt ('|' alt)* ';'
    fn parse_rule(&mut self) -> Result<(), SyntaxError> {
        let lhs = self.ident("a rule name")?;
        self.expect(Token::Colon, "`:'")?;

        let mut alternatives = vec![self.parse_alternative()?];
        while self.eat(Token::VertBar)? {
            alternatives.push(self.parse_alternative()?);
        }
        self.expect(Token::Semicolon, "`;' or `|'")?;

        if self.first_rule.is_none() {
            self.first_rule = Some(lhs.to_owned());
        }
        RuleSynthesizer::new(&mut self.config).add_rule(lhs, alternatives);
        Ok(())
    }

    // alt := item*
    fn parse_alternative(&mut self) -> Result<Alternative, SyntaxError> {
        let mut items = vec![];
        loop {
            let item = match self.peek()? {
                Some(Token::VertBar | Token::Semicolon) => break,
                Some(Token::Code(text)) => {
                    let line = self.bump()?.map_or(self.last.0, |lexeme| lexeme.line);
                    Item::Code {
                        text: text.to_owned(),
                        line,
                    }
                }
                Some(Token::Kw(Keyword::Prec)) => {
                    self.bump()?;
                    Item::Symbol(Keyword::Prec.as_str().to_owned())
                }
                Some(Token::QLiteral(text)) => {
                    self.bump()?;
                    Item::Symbol(text.to_owned())
                }
                _ => Item::Symbol(self.parse_ref()?),
            };
            items.push(item);
        }
        Ok(items)
    }

    // ref := ID | '[' ref ']' | '<' ref '>' | '(' ref ')'
    fn parse_ref(&mut self) -> Result<String, SyntaxError> {
        let (kind, close, expected) = match self.peek()? {
            Some(Token::Ident(name)) => {
                self.bump()?;
                return Ok(name.to_owned());
            }
            Some(Token::LBracket) => (FamilyKind::Opt, Token::RBracket, "`]'"),
            Some(Token::Lt) => (FamilyKind::List, Token::Gt, "`>'"),
            Some(Token::LParen) => (FamilyKind::String, Token::RParen, "`)'"),
            _ => return Err(self.unexpected("a symbol, an action, `|' or `;'")),
        };
        self.bump()?;
        let inner = self.parse_ref()?;
        self.expect(close, expected)?;
        Ok(RuleSynthesizer::new(&mut self.config).wrap(kind, &inner))
    }
}
