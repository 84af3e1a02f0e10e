mod p {
    include!(concat!(env!("OUT_DIR"), "/annot.rs"));
}
use p::*;

use crate::harness::*;
use ygen_runtime::Token;

// Words are written as `KIND=text`.
fn classify(word: &str) -> &'static str {
    let kind = word.split_once('=').map_or(word, |(kind, _)| kind);
    TOKENS
        .iter()
        .copied()
        .find(|&t| t == kind)
        .unwrap_or("$unknown")
}

fn lift(token: &Token) -> Value {
    match token.text.split_once('=') {
        Some((_, text)) => Value::Text(text.to_owned()),
        None => Value::Null,
    }
}

fn position(file: &str, line: u32, column: u32, offset: u32) -> Value {
    Value::Position {
        file: file.into(),
        line,
        column,
        offset,
    }
}

#[test]
fn families_are_installed() {
    assert_eq!(START, "file");
    assert_eq!(STRING_RULES, ["block", "annotation"]);
    assert_eq!(OPT_RULES, ["block_string", "annotation_string"]);

    let rules = rule_set().unwrap();
    for name in [
        "p_block_string_1",
        "p_block_string_2",
        "p_annotation_string_1",
        "p_annotation_string_2",
        "p_block_string_opt_1",
        "p_block_string_opt_2",
        "p_annotation_string_opt_1",
        "p_annotation_string_opt_2",
        "p_empty",
    ] {
        assert!(rules.get(name).is_some(), "{} is not defined", name);
    }
    assert_eq!(
        rules.get("p_annotation_string_2").unwrap().to_string(),
        "annotation_string : annotation annotation_string"
    );
    assert_eq!(
        rules.get("p_block_string_opt_1").unwrap().to_string(),
        "block_string_opt :"
    );
}

#[test]
fn annotated_block() {
    let input = "\
FILENAME=a.c NUMBER=1 NUMBER=2 NUMBER=3
FILENAME=a.c NUMBER=4 NUMBER=5 NUMBER=6
TYPE VAL=int CALL VAL=f
";

    let script = vec![
        Shift,
        Shift,
        Shift,
        Shift,
        Reduce("p_position"),
        Shift,
        Shift,
        Shift,
        Shift,
        Reduce("p_position"),
        Shift,
        Shift,
        Reduce("p_annotation_1"),
        Shift,
        Shift,
        Reduce("p_annotation_3"),
        Reduce("p_annotation_string_1"),
        Reduce("p_annotation_string_2"),
        Reduce("p_annotation_string_opt_2"),
        Reduce("p_block"),
        Reduce("p_block_string_1"),
        Reduce("p_block_string_opt_2"),
        Reduce("p_file"),
    ];
    let mut parser = Parser::new(ScriptBuilder::new(script, lift)).unwrap();
    let mut lexer = WordLexer::new(classify);
    let value = parser.parse(input, &mut lexer, 0).unwrap();

    assert_eq!(
        value,
        Value::Seq(vec![Value::Block {
            start: Box::new(position("a.c", 1, 2, 3)),
            end: Box::new(position("a.c", 4, 5, 6)),
            annotations: vec![
                Value::Annotation {
                    kind: "type",
                    value: "int".into(),
                },
                Value::Annotation {
                    kind: "call",
                    value: "f".into(),
                },
            ],
        }])
    );
}

#[test]
fn block_without_annotations() {
    let script = vec![
        Shift,
        Shift,
        Shift,
        Shift,
        Reduce("p_position"),
        Shift,
        Shift,
        Shift,
        Shift,
        Reduce("p_position"),
        Reduce("p_annotation_string_opt_1"),
        Reduce("p_block"),
        Reduce("p_block_string_1"),
        Reduce("p_block_string_opt_2"),
        Reduce("p_file"),
    ];
    let mut parser = Parser::new(ScriptBuilder::new(script, lift)).unwrap();
    let mut lexer = WordLexer::new(classify);
    let value = parser
        .parse(
            "FILENAME=b.c NUMBER=1 NUMBER=0 NUMBER=0 FILENAME=b.c NUMBER=9 NUMBER=0 NUMBER=80",
            &mut lexer,
            0,
        )
        .unwrap();

    assert_eq!(
        value,
        Value::Seq(vec![Value::Block {
            start: Box::new(position("b.c", 1, 0, 0)),
            end: Box::new(position("b.c", 9, 0, 80)),
            annotations: vec![],
        }])
    );
}

#[test]
fn empty_file() {
    let script = vec![Reduce("p_block_string_opt_1"), Reduce("p_file")];
    let mut parser = Parser::new(ScriptBuilder::new(script, lift)).unwrap();
    let mut lexer = WordLexer::new(classify);
    assert_eq!(parser.parse("", &mut lexer, 0).unwrap(), Value::Seq(vec![]));
}
