mod p {
    include!(concat!(env!("OUT_DIR"), "/families.rs"));
}
use p::*;

use crate::harness::*;
use ygen_runtime::Token;

fn classify(word: &str) -> &'static str {
    match word {
        "(" => "'('",
        ")" => "')'",
        "," => "','",
        _ => "WORD",
    }
}

fn lift(token: &Token) -> Value {
    match token.kind {
        "WORD" => Value::Word(token.text.clone()),
        _ => Value::Null,
    }
}

fn word(s: &str) -> Value {
    Value::Word(s.into())
}

#[test]
fn rule_set_contents() {
    assert_eq!(LIST_RULES, ["word"]);
    assert_eq!(STRING_RULES, ["group", "word"]);
    assert_eq!(OPT_RULES, ["word_list", "word_string"]);

    let rules = rule_set().unwrap();
    assert_eq!(rules.len(), 15);
    assert_eq!(rules.get("p_empty").unwrap().to_string(), "empty :");
    assert_eq!(
        rules.get("p_word_list_opt_2").unwrap().to_string(),
        "word_list_opt : word_list"
    );
    assert_eq!(
        rules.get("p_group_string_2").unwrap().to_string(),
        "group_string : group group_string"
    );
    // the mid-rule action is gone.
    assert_eq!(rules.get("p_word").unwrap().to_string(), "word : WORD WORD");
}

#[test]
fn nested_wrappers() {
    let script = vec![
        Shift,
        Shift,
        Reduce("p_word"),
        Shift,
        Shift,
        Shift,
        Reduce("p_word"),
        Reduce("p_word_list_1"),
        Reduce("p_word_list_2"),
        Reduce("p_word_list_opt_2"),
        Shift,
        Shift,
        Shift,
        Reduce("p_word"),
        Reduce("p_word_string_1"),
        Reduce("p_word_string_opt_2"),
        Shift,
        Reduce("p_group_1"),
        Reduce("p_group_string_1"),
        Reduce("p_doc"),
    ];
    let mut parser = Parser::new(ScriptBuilder::new(script, lift)).unwrap();
    let mut lexer = WordLexer::new(classify);
    let value = parser.parse("a b , c d ( e f )", &mut lexer, 0).unwrap();

    assert_eq!(
        value,
        Value::Seq(vec![
            Value::Seq(vec![word("a"), word("c")]),
            Value::Seq(vec![Value::Seq(vec![word("e")])]),
        ])
    );
}

#[test]
fn alternative_without_action_yields_null() {
    let script = vec![
        Reduce("p_word_list_opt_1"),
        Reduce("p_empty"),
        Reduce("p_group_2"),
        Reduce("p_group_string_1"),
        Reduce("p_doc"),
    ];
    let mut parser = Parser::new(ScriptBuilder::new(script, lift)).unwrap();
    let mut lexer = WordLexer::new(classify);
    let value = parser.parse("", &mut lexer, 0).unwrap();

    assert_eq!(
        value,
        Value::Seq(vec![Value::Null, Value::Seq(vec![Value::Null])])
    );
}
