mod p {
    include!(concat!(env!("OUT_DIR"), "/blocks.rs"));
}
use p::*;

use crate::harness::*;
use ygen_runtime::{ScopeHooks, ScopeStack, Token, TokenSource};

fn classify(word: &str) -> &'static str {
    if word.chars().all(|c| c.is_ascii_digit()) {
        "NUMBER"
    } else {
        "ID"
    }
}

fn lift(token: &Token) -> Value {
    match token.kind {
        "NUMBER" => Value::Number(token.text.parse().unwrap()),
        _ => Value::Id(token.text.clone()),
    }
}

#[test]
fn definition() {
    assert_eq!(START, "file");
    assert_eq!(TOKENS, ["ID", "NUMBER"]);
    assert_eq!(OPT_RULES, ["block"]);
    assert!(LIST_RULES.is_empty());
    assert!(STRING_RULES.is_empty());
    assert_eq!(
        PRODUCTIONS
            .iter()
            .map(|&(name, bnf, _)| (name, bnf))
            .collect::<Vec<_>>(),
        [
            ("p_file", "file : block_opt"),
            ("p_block", "block : ID NUMBER"),
            ("p_empty", "empty : "),
        ]
    );

    let rules = rule_set().unwrap();
    assert_eq!(rules.get("p_block_opt_1").unwrap().to_string(), "block_opt :");
    assert_eq!(
        rules.get("p_block_opt_2").unwrap().to_string(),
        "block_opt : block"
    );
}

#[test]
fn present_block() {
    let script = vec![
        Shift,
        Shift,
        Reduce("p_block"),
        Reduce("p_block_opt_2"),
        Reduce("p_file"),
    ];
    let mut parser = Parser::new(ScriptBuilder::new(script, lift)).unwrap();
    let mut lexer = WordLexer::new(classify);
    let value = parser.parse("width 80", &mut lexer, 0).unwrap();
    assert_eq!(
        value,
        Value::Block(
            Box::new(Value::Id("width".into())),
            Box::new(Value::Number(80)),
        )
    );
}

#[test]
fn missing_block() {
    let script = vec![Reduce("p_block_opt_1"), Reduce("p_file")];
    let mut parser = Parser::new(ScriptBuilder::new(script, lift)).unwrap();
    let mut lexer = WordLexer::new(classify);
    assert_eq!(parser.parse("", &mut lexer, 0).unwrap(), Value::Null);
}

/// Opens a scope at `{`, closes one at `}` and hands every other word on.
struct BraceLexer {
    words: WordLexer,
    types_seen: Vec<String>,
}

impl TokenSource for BraceLexer {
    fn input(&mut self, text: &str) {
        self.words.input(text);
    }

    fn token(&mut self) -> Option<Token> {
        self.words.token()
    }

    fn filename(&self) -> &str {
        self.words.filename()
    }

    fn reset_lineno(&mut self) {
        self.words.reset_lineno();
    }

    fn scoped_token(&mut self, scopes: &mut dyn ScopeHooks) -> Option<Token> {
        loop {
            let token = self.words.token()?;
            match token.text.as_str() {
                "{" => scopes.on_scope_begin(),
                "}" => scopes.on_scope_end(),
                name => {
                    if scopes.is_type_in_scope(name) {
                        self.types_seen.push(name.to_owned());
                    }
                    return Some(token);
                }
            }
        }
    }
}

#[test]
fn scope_hooks_reach_the_lexer() {
    let script = vec![
        Shift,
        Shift,
        Reduce("p_block"),
        Reduce("p_block_opt_2"),
        Reduce("p_file"),
    ];
    let coord = ygen_runtime::Coord::new("<words>", None, None);
    let mut scopes = ScopeStack::new();
    scopes.add_typedef_name("size", &coord).unwrap();

    let mut parser = Parser::with_scopes(ScriptBuilder::new(script, lift), scopes).unwrap();
    let mut lexer = BraceLexer {
        words: WordLexer::new(classify),
        types_seen: vec![],
    };
    let value = parser.parse("{ { size } 12", &mut lexer, 0).unwrap();
    assert_eq!(
        value,
        Value::Block(
            Box::new(Value::Id("size".into())),
            Box::new(Value::Number(12)),
        )
    );
    assert_eq!(lexer.types_seen, ["size"]);
    assert_eq!(lexer.words.resets, 1);
    assert_eq!(parser.scopes().depth(), 2);

    parser.scopes_mut().on_scope_end();
    assert_eq!(parser.scopes().depth(), 1);
}
