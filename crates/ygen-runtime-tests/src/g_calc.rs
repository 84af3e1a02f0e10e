mod p {
    include!(concat!(env!("OUT_DIR"), "/calc.rs"));
}
use p::*;

use crate::harness::*;
use ygen_runtime::{Assoc, Token};

fn classify(word: &str) -> &'static str {
    match word {
        "+" => "'+'",
        "-" => "'-'",
        "*" => "'*'",
        "/" => "'/'",
        "(" => "'('",
        ")" => "')'",
        "," => "','",
        _ => "NUM",
    }
}

fn lift(token: &Token) -> Value {
    match token.kind {
        "NUM" => Value::Num(token.text.parse().unwrap()),
        _ => Value::Null,
    }
}

fn run(input: &str, script: Vec<Step>) -> Value {
    let mut parser = Parser::new(ScriptBuilder::new(script, lift)).unwrap();
    let mut lexer = WordLexer::new(classify);
    let value = parser.parse(input, &mut lexer, 0).unwrap();
    assert_eq!(lexer.resets, 1);
    value
}

#[test]
fn definition() {
    assert_eq!(START, "stmts");
    assert_eq!(TOKENS, ["NUM"]);
    assert_eq!(PRECEDENCE.len(), 3);
    assert_eq!(PRECEDENCE[0], (Assoc::Left, &["'+'", "'-'"][..]));
    assert_eq!(PRECEDENCE[1], (Assoc::Left, &["'*'", "'/'"][..]));
    assert_eq!(PRECEDENCE[2], (Assoc::Right, &["UMINUS"][..]));
    assert_eq!(LIST_RULES, ["expr"]);

    let rules = rule_set().unwrap();
    assert_eq!(rules.get("p_expr_5").unwrap().prec(), Some("UMINUS"));
    assert_eq!(
        rules.get("p_expr_list_2").unwrap().to_string(),
        "expr_list : expr ',' expr_list"
    );
    assert_eq!(rules.alternatives("expr").count(), 7);
}

#[test]
fn precedence_shaped_reductions() {
    // 1 + 2 * 3
    let value = run(
        "1 + 2 * 3",
        vec![
            Shift,
            Reduce("p_expr_7"),
            Shift,
            Shift,
            Reduce("p_expr_7"),
            Shift,
            Shift,
            Reduce("p_expr_7"),
            Reduce("p_expr_3"),
            Reduce("p_expr_1"),
            Reduce("p_expr_list_1"),
            Reduce("p_stmts"),
        ],
    );
    assert_eq!(value, Value::Seq(vec![Value::Num(7)]));
}

#[test]
fn unary_minus_and_division() {
    // - 9 / 0 , ( 8 - 2 ) / 3
    let value = run(
        "- 9 / 0 , ( 8 - 2 ) / 3",
        vec![
            Shift,
            Shift,
            Reduce("p_expr_7"),
            Reduce("p_expr_5"),
            Shift,
            Shift,
            Reduce("p_expr_7"),
            Reduce("p_expr_4"),
            Shift,
            Shift,
            Shift,
            Reduce("p_expr_7"),
            Shift,
            Shift,
            Reduce("p_expr_7"),
            Reduce("p_expr_2"),
            Shift,
            Reduce("p_expr_6"),
            Shift,
            Shift,
            Reduce("p_expr_7"),
            Reduce("p_expr_4"),
            Reduce("p_expr_list_1"),
            Reduce("p_expr_list_2"),
            Reduce("p_stmts"),
        ],
    );
    assert_eq!(value, Value::Seq(vec![Value::Num(0), Value::Num(2)]));
}

#[test]
fn syntax_errors() {
    let mut parser = Parser::new(ScriptBuilder::new(vec![Shift, Shift], lift)).unwrap();
    let mut lexer = WordLexer::new(classify);
    let err = parser.parse("1", &mut lexer, 0).unwrap_err();
    assert_eq!(err.to_string(), "<words>: At end of input");

    let mut parser = Parser::new(ScriptBuilder::new(vec![Shift], lift)).unwrap();
    let err = parser.parse("1 +", &mut lexer, 0).unwrap_err();
    assert_eq!(err.to_string(), "<words>:1:3: before: +");

    let token = Token {
        kind: "NUM",
        text: "42".into(),
        line: 3,
        column: 5,
    };
    let err = Parser::<ScriptEngine<Value>>::p_error(Some(&token), "calc.txt");
    assert_eq!(err.to_string(), "calc.txt:3:5: before: 42");
}

#[test]
fn unknown_rule_in_script() {
    let mut parser = Parser::new(ScriptBuilder::new(vec![Shift, Reduce("p_nope")], lift)).unwrap();
    let mut lexer = WordLexer::new(classify);
    let err = parser.parse("1", &mut lexer, 0).unwrap_err();
    assert_eq!(err.to_string(), "unknown production rule p_nope");
}
