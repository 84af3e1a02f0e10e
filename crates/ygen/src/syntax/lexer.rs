//! Lexer implementation.

use logos::{FilterResult, Logos};
use std::fmt;

#[derive(Debug, Default, Clone, Copy)]
pub struct LexState {
    /// Set once the rule section has started, so that the `%%` closing it
    /// swallows the rest of the input as the epilogue.
    pub last_section: bool,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub enum RawError {
    #[default]
    Illegal,
    Unbalanced,
    UnterminatedLiteral,
    UnterminatedComment,
}

#[derive(Debug, Copy, Clone, PartialEq, Logos)]
#[logos(extras = LexState, error = RawError)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
pub enum Token<'s> {
    /// The body of a `%{ ... %}` block.
    #[token("%{", literal_block)]
    Literal(&'s str),

    /// `%%`, carrying the rest of the input when it closes the last section.
    #[token("%%", section)]
    Section(Option<&'s str>),

    #[token("%token", |_| Keyword::Token)]
    #[token("%left", |_| Keyword::Left)]
    #[token("%right", |_| Keyword::Right)]
    #[token("%nonassoc", |_| Keyword::Nonassoc)]
    #[token("%prec", |_| Keyword::Prec)]
    #[token("%start", |_| Keyword::Start)]
    #[token("%type", |_| Keyword::Type)]
    #[token("%union", |_| Keyword::Union)]
    Kw(Keyword),

    /// An action block, braces included.
    #[token("{", code_block)]
    Code(&'s str),

    #[regex(r"[a-zA-Z_][a-zA-Z_0-9]*")]
    Ident(&'s str),

    #[regex(r"'[^'\n]*'")]
    #[regex(r#""[^"\n]*""#)]
    QLiteral(&'s str),

    #[regex(r"[0-9]+")]
    Number(&'s str),

    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("|")]
    VertBar,
    #[token(":")]
    Colon,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,

    /// A `/* ... */` comment. Never emitted.
    #[token("/*", block_comment)]
    Comment,

    #[regex(r".", priority = 0)]
    Illegal,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Keyword {
    Token,
    Left,
    Right,
    Nonassoc,
    Prec,
    Start,
    Type,
    Union,
}

impl Keyword {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Token => "%token",
            Self::Left => "%left",
            Self::Right => "%right",
            Self::Nonassoc => "%nonassoc",
            Self::Prec => "%prec",
            Self::Start => "%start",
            Self::Type => "%type",
            Self::Union => "%union",
        }
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Literal(..) => f.write_str("LITERAL"),
            Token::Section(..) => f.write_str("SECTION"),
            Token::Kw(kw) => f.write_str(kw.as_str()),
            Token::Code(..) => f.write_str("CODE"),
            Token::Ident(..) => f.write_str("ID"),
            Token::QLiteral(..) => f.write_str("QLITERAL"),
            Token::Number(..) => f.write_str("NUMBER"),
            Token::Semicolon => f.write_str("';'"),
            Token::Comma => f.write_str("','"),
            Token::Lt => f.write_str("'<'"),
            Token::Gt => f.write_str("'>'"),
            Token::VertBar => f.write_str("'|'"),
            Token::Colon => f.write_str("':'"),
            Token::LBracket => f.write_str("'['"),
            Token::RBracket => f.write_str("']'"),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
            Token::Comment => f.write_str("COMMENT"),
            Token::Illegal => f.write_str("ILLEGAL"),
        }
    }
}

fn literal_block<'s>(lex: &mut logos::Lexer<'s, Token<'s>>) -> Result<&'s str, RawError> {
    let rest = lex.remainder();
    let Some(end) = rest.find("%}") else {
        lex.bump(rest.len());
        return Err(RawError::UnterminatedLiteral);
    };
    lex.bump(end + 2);
    Ok(&rest[..end])
}

fn block_comment<'s>(lex: &mut logos::Lexer<'s, Token<'s>>) -> FilterResult<(), RawError> {
    let rest = lex.remainder();
    match rest.find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            FilterResult::Skip
        }
        None => {
            lex.bump(rest.len());
            FilterResult::Error(RawError::UnterminatedComment)
        }
    }
}

fn section<'s>(lex: &mut logos::Lexer<'s, Token<'s>>) -> Result<Option<&'s str>, RawError> {
    if !lex.extras.last_section {
        return Ok(None);
    }
    let rest = lex.remainder();
    lex.bump(rest.len());
    Ok(Some(rest))
}

fn code_block<'s>(lex: &mut logos::Lexer<'s, Token<'s>>) -> Result<&'s str, RawError> {
    let len = scan_code(lex.remainder()).ok_or(RawError::Unbalanced)?;
    lex.bump(len);
    Ok(lex.slice())
}

/// Return the length of the action code up to and including the `}` that
/// closes an already opened block.
fn scan_code(src: &str) -> Option<usize> {
    let bytes = src.as_bytes();
    let mut depth = 1usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            b'\\' => {
                i += 2;
                continue;
            }
            b'"' => {
                if let Some(n) = string_len(&src[i..]) {
                    i += n;
                    continue;
                }
            }
            b'\'' => {
                if let Some(n) = char_len(&src[i..]) {
                    i += n;
                    continue;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                i += src[i..].find('\n').unwrap_or(src.len() - i);
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                // an unterminated comment leaves the block unbalanced.
                let end = src[i + 2..].find("*/")?;
                i += end + 4;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// `"..."` closed on the same line, escapes honored.
fn string_len(src: &str) -> Option<usize> {
    let bytes = src.as_bytes();
    let mut j = 1;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b'\n' => return None,
            b'"' => return Some(j + 1),
            _ => j += 1,
        }
    }
    None
}

/// A character literal such as `'x'`, `'\n'` or `'\u{7f}'`.
///
/// Anything else starting with a quote (a lifetime, a stray quote) is not a
/// literal and is consumed one character at a time.
fn char_len(src: &str) -> Option<usize> {
    let mut chars = src.char_indices().skip(1);
    match chars.next()? {
        (_, '\\') => {
            let end = src.get(3..)?.find(|c| c == '\'' || c == '\n')? + 3;
            (src.as_bytes()[end] == b'\'').then_some(end + 1)
        }
        (_, '\'') | (_, '\n') => None,
        _ => match chars.next()? {
            (k, '\'') => Some(k + 1),
            _ => None,
        },
    }
}

/// A token with its text and 1-based position.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Lexeme<'s> {
    pub token: Token<'s>,
    pub text: &'s str,
    pub line: usize,
    pub column: usize,
}

/// A recoverable lexing error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}:{}: {}", line, column, message)]
pub struct LexFault {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

/// A fatal lexing error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    /// An action block whose closing brace never appears.
    #[error("{}:{}: unbalanced braces in action code", line, column)]
    UnbalancedCode { line: usize, column: usize },

    #[error("{}:{}: unterminated `%{{' block", line, column)]
    UnterminatedLiteral { line: usize, column: usize },

    #[error("{}:{}: unterminated comment", line, column)]
    UnterminatedComment { line: usize, column: usize },
}

pub struct Lexer<'s> {
    source: &'s str,
    inner: logos::Lexer<'s, Token<'s>>,
    pos: usize,
    line: usize,
    line_start: usize,
    faults: Vec<LexFault>,
    on_error: Option<Box<dyn FnMut(&LexFault) + 's>>,
}

impl fmt::Debug for Lexer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lexer")
            .field("pos", &self.pos)
            .field("line", &self.line)
            .field("faults", &self.faults)
            .finish_non_exhaustive()
    }
}

impl<'s> Lexer<'s> {
    pub fn new(source: &'s str) -> Self {
        Self {
            source,
            inner: Token::lexer(source),
            pos: 0,
            line: 1,
            line_start: 0,
            faults: vec![],
            on_error: None,
        }
    }

    /// Register a callback invoked for every illegal character.
    pub fn with_error_callback(mut self, f: impl FnMut(&LexFault) + 's) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    pub fn set_last_section(&mut self, enabled: bool) {
        self.inner.extras.last_section = enabled;
    }

    /// Take the faults reported so far.
    pub fn take_faults(&mut self) -> Vec<LexFault> {
        std::mem::take(&mut self.faults)
    }

    fn advance_to(&mut self, offset: usize) {
        for (i, b) in self.source[self.pos..offset].bytes().enumerate() {
            if b == b'\n' {
                self.line += 1;
                self.line_start = self.pos + i + 1;
            }
        }
        self.pos = offset;
    }

    fn locate(&mut self, offset: usize) -> (usize, usize) {
        self.advance_to(offset);
        (self.line, offset - self.line_start + 1)
    }

    fn illegal(&mut self, start: usize, line: usize, column: usize) {
        let ch = self.source[start..].chars().next().unwrap_or_default();
        let fault = LexFault {
            message: format!("Illegal character {:?}", ch),
            line,
            column,
        };
        tracing::warn!("{}", fault);
        if let Some(on_error) = &mut self.on_error {
            on_error(&fault);
        }
        self.faults.push(fault);

        let next = start + ch.len_utf8();
        if self.inner.span().end != next {
            // restart right after the offending character.
            let extras = self.inner.extras;
            self.inner = Token::lexer_with_extras(self.source, extras);
            self.inner.bump(next);
        }
        self.advance_to(next);
    }
}

impl<'s> Iterator for Lexer<'s> {
    type Item = Result<Lexeme<'s>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let res = self.inner.next()?;
            let span = self.inner.span();
            let (line, column) = self.locate(span.start);
            match res {
                Ok(Token::Illegal) | Err(RawError::Illegal) => {
                    self.illegal(span.start, line, column);
                }
                Err(RawError::Unbalanced) => {
                    return Some(Err(LexError::UnbalancedCode { line, column }));
                }
                Err(RawError::UnterminatedLiteral) => {
                    return Some(Err(LexError::UnterminatedLiteral { line, column }));
                }
                Err(RawError::UnterminatedComment) => {
                    return Some(Err(LexError::UnterminatedComment { line, column }));
                }
                Ok(token) => {
                    let text = &self.source[span.clone()];
                    self.advance_to(span.end);
                    tracing::trace!("{}:{}: {} {:?}", line, column, token, text);
                    return Some(Ok(Lexeme {
                        token,
                        text,
                        line,
                        column,
                    }));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Token::*;

    fn tokens(input: &str) -> Vec<Token<'_>> {
        Lexer::new(input)
            .map(|res| res.map(|lexeme| lexeme.token))
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn smoketest() {
        let input = "\
%{
use std::fmt;
%}
%token <ival> NUMBER 258, NAME  // trailing comment
%left '+' '-' /* block
comment */
%start expr
%%
expr : expr '+' expr { $$ }
     | [atom] <atom> (atom) %prec UMINUS
     ;
";
        assert!(matches!(
            dbg!(&tokens(input)[..]),
            [
                Literal("\nuse std::fmt;\n"),
                Kw(Keyword::Token),
                Lt,
                Ident("ival"),
                Gt,
                Ident("NUMBER"),
                Number("258"),
                Comma,
                Ident("NAME"),
                Kw(Keyword::Left),
                QLiteral("'+'"),
                QLiteral("'-'"),
                Kw(Keyword::Start),
                Ident("expr"),
                Section(None),
                Ident("expr"),
                Colon,
                Ident("expr"),
                QLiteral("'+'"),
                Ident("expr"),
                Code("{ $$ }"),
                VertBar,
                LBracket,
                Ident("atom"),
                RBracket,
                Lt,
                Ident("atom"),
                Gt,
                LParen,
                Ident("atom"),
                RParen,
                Kw(Keyword::Prec),
                Ident("UMINUS"),
                Semicolon,
            ]
        ));
    }

    #[test]
    fn directives_match_by_prefix() {
        assert_eq!(tokens("%tokens"), [Kw(Keyword::Token), Ident("s")]);
    }

    #[test]
    fn positions() {
        let input = "a\n  /* x\n y */ b\n%{\n\n%} c";
        let lexemes: Vec<_> = Lexer::new(input).map(Result::unwrap).collect();
        let coords: Vec<_> = lexemes.iter().map(|l| (l.text, l.line, l.column)).collect();
        assert_eq!(
            coords,
            [("a", 1, 1), ("b", 3, 7), ("%{\n\n%}", 4, 1), ("c", 6, 4)]
        );
    }

    #[test]
    fn literal_blocks() {
        assert_eq!(tokens("%{ a %}"), [Literal(" a ")]);
        assert_eq!(tokens("%{\na\n%} x"), [Literal("\na\n"), Ident("x")]);
        // braces and percent signs inside are carried as they are.
        assert_eq!(tokens("%{ fn f() { 100 % 7 } %}"), [Literal(" fn f() { 100 % 7 } ")]);
    }

    #[test]
    fn block_comments() {
        assert_eq!(tokens("/* a */ x"), [Ident("x")]);
        assert_eq!(tokens("a /* b\n** c */ d"), [Ident("a"), Ident("d")]);

        let lexemes: Vec<_> = Lexer::new("/* a\nb */ x").map(Result::unwrap).collect();
        assert_eq!(lexemes.len(), 1);
        assert_eq!((lexemes[0].line, lexemes[0].column), (2, 6));
    }

    #[test]
    fn unterminated_literal_and_comment() {
        let err = Lexer::new("x\n  %{ a\n").find_map(Result::err).unwrap();
        assert_eq!(err, LexError::UnterminatedLiteral { line: 2, column: 3 });
        assert_eq!(err.to_string(), "2:3: unterminated `%{' block");

        let err = Lexer::new("x /* a\n").find_map(Result::err).unwrap();
        assert_eq!(err, LexError::UnterminatedComment { line: 1, column: 3 });
    }

    #[test]
    fn code_block_is_opaque() {
        let input = r#"{ let s = "}"; let c = '{'; /* } */ // }
    if x { y } else { z }
}"#;
        let lexemes: Vec<_> = Lexer::new(input).map(Result::unwrap).collect();
        assert_eq!(lexemes.len(), 1);
        assert_eq!(lexemes[0].token, Code(input));
    }

    #[test]
    fn code_block_with_lifetimes_and_escapes() {
        let input = r#"{ fn f<'a>(x: &'a str) -> char { '\'' } } ;"#;
        assert_eq!(
            tokens(input),
            [Code(r#"{ fn f<'a>(x: &'a str) -> char { '\'' } }"#), Semicolon]
        );
    }

    #[test]
    fn multiline_code_advances_line() {
        let input = "{\n  a;\n  b;\n} x";
        let lexemes: Vec<_> = Lexer::new(input).map(Result::unwrap).collect();
        assert_eq!(lexemes[1].text, "x");
        assert_eq!((lexemes[1].line, lexemes[1].column), (4, 3));
    }

    #[test]
    fn unbalanced_code() {
        let input = "x : y\n  { if a { b }\n";
        let err = Lexer::new(input)
            .find_map(Result::err)
            .expect("must be unbalanced");
        assert_eq!(err, LexError::UnbalancedCode { line: 2, column: 3 });
    }

    #[test]
    fn unterminated_comment_in_code() {
        let input = "{ /* } ";
        assert!(Lexer::new(input).any(|res| res.is_err()));
    }

    #[test]
    fn illegal_character_skips_one() {
        let mut seen = vec![];
        let input = "a @ b\n$c";
        let mut lexer = Lexer::new(input).with_error_callback(|fault| seen.push(fault.clone()));
        let toks: Vec<_> = lexer
            .by_ref()
            .map(|res| res.unwrap().token)
            .collect();
        let faults = lexer.take_faults();
        drop(lexer);

        assert_eq!(toks, [Ident("a"), Ident("b"), Ident("c")]);
        assert_eq!(faults, seen);
        assert_eq!(
            seen.iter().map(ToString::to_string).collect::<Vec<_>>(),
            ["1:3: Illegal character '@'", "2:1: Illegal character '$'"]
        );
    }

    #[test]
    fn last_section_captures_epilogue() {
        let input = "%%\nx : y ;\n%%\nfn helper() {\n";
        let mut lexer = Lexer::new(input);
        assert_eq!(lexer.next().unwrap().unwrap().token, Section(None));
        lexer.set_last_section(true);
        let rest: Vec<_> = lexer.map(|res| res.unwrap().token).collect();
        assert_eq!(
            rest,
            [
                Ident("x"),
                Colon,
                Ident("y"),
                Semicolon,
                Section(Some("\nfn helper() {\n"))
            ]
        );
    }
}
