use pretty_assertions::assert_eq;
use std::{env, fs, path::PathBuf};
use ygen::{codegen::GenerateError, syntax, syntax::synth::FamilyKind, CompileError, Options};
use ygen_runtime::{definition::Production, reduction::Reduction};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap()).join(format!("tests/{}.ypp", name))
}

fn read_fixture(name: &str) -> String {
    fs::read_to_string(fixture(name)).unwrap()
}

fn noop(_: &mut Reduction<()>) {}

macro_rules! define_tests {
    ($($name:ident),*$(,)?) => {$(
        #[test]
        fn $name() {
            let _ = tracing_subscriber::fmt::try_init();

            let source = read_fixture(stringify!($name));
            let parsed = syntax::parse(&source).unwrap();
            assert!(parsed.lex_faults.is_empty());

            // every emitted production must be accepted by the runtime.
            for rule in &parsed.config.rules {
                let production =
                    Production::parse(&rule.handler_name(), &rule.production, noop).unwrap();
                assert_eq!(production.lhs(), rule.lhs());
            }

            let options = Options::new().cfg_filename(concat!(stringify!($name), ".ypp"));
            let generated = ygen::compile(&source, &options).unwrap();
            assert_eq!(generated, ygen::compile(&source, &options).unwrap());
        }
    )*};
}

define_tests! {
    annot,
    calc,
    families,
}

#[test]
fn annot_end_to_end() {
    let source = read_fixture("annot");
    let config = syntax::parse(&source).unwrap().config;
    assert_eq!(config.start, "file");
    assert_eq!(
        config.string_rules.iter().collect::<Vec<_>>(),
        ["block", "annotation"]
    );
    assert_eq!(
        config.opt_rules.iter().collect::<Vec<_>>(),
        ["block_string", "annotation_string"]
    );
    assert!(config.list_rules.is_empty());

    let generated = ygen::compile(&source, &Options::new()).unwrap();
    assert!(generated.contains("pub const START: &str = \"file\";\n"));
    assert!(generated.contains("pub const STRING_RULES: &[&str] = &[\n    \"block\",\n    \"annotation\",\n];\n"));
    assert!(generated.contains(concat!(
        "    /// annotation : TYPE VAL\n",
        "    fn p_annotation_1(p: &mut Reduction<Value>) {\n",
        "        annotate(p, \"type\")\n",
        "    }\n",
    )));
    assert!(generated.contains(concat!(
        "    /// position : FILENAME NUMBER NUMBER NUMBER\n",
        "    fn p_position(p: &mut Reduction<Value>) {\n",
        "        let position = Value::Position {\n",
    )));
    assert!(generated.contains("    (\"p_file\", \"file : block_string_opt\", Actions::p_file),\n"));
    // the grammar has no `empty` rule of its own.
    assert!(generated.contains("    (\"p_empty\", \"empty : \", Actions::p_empty),\n"));
    assert!(generated.contains("\nfn annotate(p: &mut Reduction<Value>, kind: &'static str) {\n"));
}

#[test]
fn calc_precedence_and_numbering() {
    let source = read_fixture("calc");
    let config = syntax::parse(&source).unwrap().config;
    assert_eq!(config.start, "stmts");
    assert_eq!(
        config.rules_of("expr").map(|r| r.name.as_str()).collect::<Vec<_>>(),
        ["expr_1", "expr_2", "expr_3", "expr_4", "expr_5", "expr_6", "expr_7"]
    );
    assert_eq!(config.rules[5].production, "expr : '-' expr %prec UMINUS");

    let generated = ygen::compile(&source, &Options::new()).unwrap();
    assert!(generated.contains(concat!(
        "pub const PRECEDENCE: &[(Assoc, &[&str])] = &[\n",
        "    (Assoc::Left, &[\"'+'\", \"'-'\"]),\n",
        "    (Assoc::Left, &[\"'*'\", \"'/'\"]),\n",
        "    (Assoc::Right, &[\"UMINUS\"]),\n",
        "];\n",
    )));
    assert!(generated.contains(concat!(
        "    fn p_expr_4(p: &mut Reduction<Value>) {\n",
        "        let d = p[3].num();\n",
        "        let q = if d == 0 { 0 } else { p[1].num() / d };\n",
        "        p.set(Value::Num(q));\n",
        "    }\n",
    )));
    assert!(generated.contains("pub const LIST_RULES: &[&str] = &[\n    \"expr\",\n];\n"));
}

#[test]
fn families_fixture() {
    let config = syntax::parse(&read_fixture("families")).unwrap().config;
    assert_eq!(config.start, "doc");
    assert_eq!(config.tokens.iter().collect::<Vec<_>>(), ["WORD"]);
    assert_eq!(config.list_rules.iter().collect::<Vec<_>>(), ["word"]);
    assert_eq!(config.string_rules.iter().collect::<Vec<_>>(), ["group", "word"]);
    assert_eq!(
        config.opt_rules.iter().collect::<Vec<_>>(),
        ["word_list", "word_string"]
    );
    assert_eq!(
        config
            .rules
            .iter()
            .map(|r| (r.name.as_str(), r.production.as_str()))
            .collect::<Vec<_>>(),
        [
            ("doc", "doc : word_list_opt group_string"),
            ("group_1", "group : '(' word_string_opt ')'"),
            ("group_2", "group : empty"),
            ("word", "word : WORD WORD"),
            ("empty", "empty : "),
        ]
    );

    let generated = ygen::compile(&read_fixture("families"), &Options::new()).unwrap();
    // the grammar defines `empty` itself.
    assert_eq!(generated.matches("fn p_empty(").count(), 1);
    assert!(generated.contains("        p.set(Value::Seq(vec![]))\n"));
}

#[test]
fn quoted_space_is_one_symbol() {
    let source = "%token A B\n%%\nx : A ' ' B { p.set(p.take(2)) } ;\n%%\n";
    let config = syntax::parse(source).unwrap().config;
    let rule = &config.rules[0];
    assert_eq!(rule.production, "x : A ' ' B");
    assert_eq!(rule.symbols().collect::<Vec<_>>(), ["A", "' '", "B"]);

    let production = Production::parse(&rule.handler_name(), &rule.production, noop).unwrap();
    assert_eq!(production.rhs(), ["A", "' '", "B"]);
    assert!(ygen::compile(source, &Options::new()).is_ok());
}

#[test]
fn requested_opt_family() {
    let source = concat!(
        "%start file\n",
        "%%\n",
        "file : block_opt ;\n",
        "block : ID NUMBER { $$ = ($1,$2) } ;\n",
        "%%\n",
    );

    let err = ygen::compile(source, &Options::new()).unwrap_err();
    assert!(
        matches!(
            err,
            CompileError::Generate(GenerateError::UnregisteredDerivedRule { .. })
        ),
        "{:?}",
        err
    );

    let options = Options::new().request_family(FamilyKind::Opt, "block");
    let generated = ygen::compile(source, &options).unwrap();
    assert!(generated.contains("pub const OPT_RULES: &[&str] = &[\n    \"block\",\n];\n"));
    assert!(generated.contains(concat!(
        "    /// block : ID NUMBER\n",
        "    fn p_block(p: &mut Reduction<Value>) {\n",
        "        $$ = ($1,$2)\n",
        "    }\n",
    )));
    assert!(generated.contains("    (\"p_file\", \"file : block_opt\", Actions::p_file),\n"));
    assert!(generated.contains("    (\"p_block\", \"block : ID NUMBER\", Actions::p_block),\n"));
}

#[test]
fn tabsize_controls_indentation() {
    let source = "%%\nx : a {\n  let v = p.take(1);\n  p.set(v);\n} ;\n%%\n";
    let options = Options::new().tabsize(2).template("$productions");
    assert_eq!(
        ygen::compile(source, &options).unwrap(),
        concat!(
            "  /// x : a\n",
            "  fn p_x(p: &mut Reduction<Value>) {\n",
            "    let v = p.take(1);\n",
            "    p.set(v);\n",
            "  }\n",
            "\n",
            "  /// empty : \n",
            "  fn p_empty(p: &mut Reduction<Value>) {\n",
            "    p.set(Value::null());\n",
            "  }\n",
        )
    );
}

#[test]
fn strict_mode() {
    let source = "%%\nx : a @ b ;\n%%\n";
    assert!(ygen::compile(source, &Options::new()).is_ok());

    let err = ygen::compile(source, &Options::new().strict(true)).unwrap_err();
    match err {
        CompileError::Lex { faults } => {
            assert_eq!(faults.len(), 1);
            assert_eq!(faults[0].to_string(), "2:7: Illegal character '@'");
        }
        err => panic!("unexpected error: {:?}", err),
    }
}

#[test]
fn failed_compilation_leaves_no_output() {
    let dir = env::temp_dir().join(format!("ygen-smoketests-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let input = dir.join("broken.ypp");
    let output = dir.join("broken.rs");
    fs::write(&input, "%%\nx : a { b ;\n%%\n").unwrap();

    let err = ygen::compile_file(&input, &output, &Options::new()).unwrap_err();
    assert!(matches!(err, CompileError::Syntax(..)), "{:?}", err);
    assert!(!output.exists());

    fs::write(&input, "%%\nx : a { p.set(p.take(1)) } ;\n%%\n").unwrap();
    ygen::compile_file(&input, &output, &Options::new()).unwrap();
    assert!(fs::read_to_string(&output).unwrap().contains("fn p_x("));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn failed_rename_removes_temporary_file() {
    let dir = env::temp_dir().join(format!("ygen-smoketests-rename-{}", std::process::id()));
    let input = dir.join("ok.ypp");
    let output = dir.join("ok.rs");
    // a non-empty directory in place of the output makes the rename fail.
    fs::create_dir_all(output.join("occupied")).unwrap();
    fs::write(&input, "%%\nx : a { p.set(p.take(1)) } ;\n%%\n").unwrap();

    let err = ygen::compile_file(&input, &output, &Options::new()).unwrap_err();
    match err {
        CompileError::Io { path, .. } => assert_eq!(path, output),
        err => panic!("unexpected error: {:?}", err),
    }
    assert!(!dir.join("ok.rs.tmp").exists());
    assert!(output.is_dir());

    fs::remove_dir_all(&dir).unwrap();
}
