//! Rendering of a parsed grammar into the source of a parser module.

use crate::{
    grammar::{ParserConfig, Rule},
    options::Options,
    syntax::synth::FamilyKind,
    template::{Template, TemplateError},
};
use indexmap::IndexSet;
use std::{collections::HashSet, fmt};

/// The placeholders a template may use.
pub const PLACEHOLDERS: &[&str] = &[
    "cfg_filename",
    "start",
    "precs",
    "tokens",
    "opt_rules",
    "list_rules",
    "string_rules",
    "productions",
    "handlers",
    "prologue",
    "epilogue",
];

/// The handler that is generated when the grammar does not define `empty`.
const EMPTY_RULE: &str = "empty";

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("no start symbol: the grammar has neither %start nor any rule")]
    MissingStart,

    #[error(
        "rule {} uses {}, but {} is not registered as a {} rule and no rule defines it",
        rule,
        symbol,
        base,
        kind
    )]
    UnregisteredDerivedRule {
        rule: String,
        symbol: String,
        base: String,
        kind: FamilyKind,
    },

    #[error("rule {} collides with the {} rule derived from {}", name, kind, base)]
    DerivedRuleCollision {
        name: String,
        base: String,
        kind: FamilyKind,
    },

    #[error("handler p_{} is defined more than once", name)]
    DuplicateHandler { name: String },

    #[error("invalid template")]
    Template(
        #[from]
        #[source]
        TemplateError,
    ),
}

/// A validated grammar ready to be rendered with [`fmt::Display`].
#[derive(Debug)]
pub struct Codegen<'g> {
    config: &'g ParserConfig,
    options: &'g Options,
    template: Template<'g>,
    unit: String,
}

impl<'g> Codegen<'g> {
    pub fn new(config: &'g ParserConfig, options: &'g Options) -> Result<Self, GenerateError> {
        let template = Template::parse(options.template_text())?;
        template.check(PLACEHOLDERS)?;
        validate(config)?;
        Ok(Self {
            config,
            options,
            template,
            unit: options.indent_unit(),
        })
    }

    fn indent(&self, depth: usize) -> String {
        self.unit.repeat(depth)
    }

    fn write_precs(&self, out: &mut impl fmt::Write) -> fmt::Result {
        let indent = self.indent(1);
        for group in &self.config.precs {
            write!(out, "{}({}, &[", indent, group.assoc.runtime_path())?;
            for (i, token) in group.tokens.iter().enumerate() {
                if i > 0 {
                    out.write_str(", ")?;
                }
                write!(out, "{:?}", token)?;
            }
            writeln!(out, "]),")?;
        }
        Ok(())
    }

    fn write_names(&self, out: &mut impl fmt::Write, names: &IndexSet<String>) -> fmt::Result {
        let indent = self.indent(1);
        for name in names {
            writeln!(out, "{}{:?},", indent, name)?;
        }
        Ok(())
    }

    fn rules(&self) -> impl Iterator<Item = RuleRef<'_>> + '_ {
        let builtin = (!self.config.has_rule(EMPTY_RULE)).then_some(RuleRef::Empty);
        self.config.rules.iter().map(RuleRef::Grammar).chain(builtin)
    }

    fn write_productions(&self, out: &mut impl fmt::Write) -> fmt::Result {
        let outer = self.indent(1);
        let inner = self.indent(2);
        for (i, rule) in self.rules().enumerate() {
            if i > 0 {
                writeln!(out)?;
            }
            writeln!(out, "{}/// {}", outer, rule.production())?;
            writeln!(
                out,
                "{}fn {}(p: &mut Reduction<Value>) {{",
                outer,
                rule.handler_name()
            )?;
            for line in outdent(rule.code(), self.options.tabsize) {
                if line.is_empty() {
                    writeln!(out)?;
                } else {
                    writeln!(out, "{}{}", inner, line)?;
                }
            }
            writeln!(out, "{}}}", outer)?;
        }
        Ok(())
    }

    fn write_handlers(&self, out: &mut impl fmt::Write) -> fmt::Result {
        let indent = self.indent(1);
        for rule in self.rules() {
            let name = rule.handler_name();
            writeln!(
                out,
                "{}({:?}, {:?}, Actions::{}),",
                indent,
                name,
                rule.production(),
                name
            )?;
        }
        Ok(())
    }

    fn write_prologue(&self, out: &mut impl fmt::Write) -> fmt::Result {
        for (i, body) in self.config.prologue.iter().enumerate() {
            if i > 0 {
                writeln!(out)?;
            }
            writeln!(out, "{}", body.trim_matches('\n'))?;
        }
        Ok(())
    }

    fn write_epilogue(&self, out: &mut impl fmt::Write) -> fmt::Result {
        if let Some(epilogue) = &self.config.epilogue {
            writeln!(out, "{}", epilogue.trim_matches('\n'))?;
        }
        Ok(())
    }
}

impl fmt::Display for Codegen<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let span = tracing::trace_span!("generate");
        let _entered = span.enter();

        let config = self.config;
        self.template.render(f, |f, name| match name {
            "cfg_filename" => f.write_str(&self.options.cfg_filename),
            "start" => f.write_str(&config.start),
            "precs" => self.write_precs(f),
            "tokens" => self.write_names(f, &config.tokens),
            "opt_rules" => self.write_names(f, &config.opt_rules),
            "list_rules" => self.write_names(f, &config.list_rules),
            "string_rules" => self.write_names(f, &config.string_rules),
            "productions" => self.write_productions(f),
            "handlers" => self.write_handlers(f),
            "prologue" => self.write_prologue(f),
            "epilogue" => self.write_epilogue(f),
            // rejected by `Template::check`.
            _ => Err(fmt::Error),
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum RuleRef<'g> {
    Grammar(&'g Rule),
    Empty,
}

impl RuleRef<'_> {
    fn production(&self) -> &str {
        match self {
            Self::Grammar(rule) => &rule.production,
            Self::Empty => "empty : ",
        }
    }

    fn handler_name(&self) -> String {
        match self {
            Self::Grammar(rule) => rule.handler_name(),
            Self::Empty => format!("p_{}", EMPTY_RULE),
        }
    }

    fn code(&self) -> &str {
        match self {
            Self::Grammar(rule) => &rule.code,
            Self::Empty => "p.set(Value::null());",
        }
    }
}

fn validate(config: &ParserConfig) -> Result<(), GenerateError> {
    if config.start.is_empty() {
        return Err(GenerateError::MissingStart);
    }

    let mut seen = HashSet::new();
    for rule in &config.rules {
        if !seen.insert(rule.name.as_str()) {
            return Err(GenerateError::DuplicateHandler {
                name: rule.name.clone(),
            });
        }
    }

    for kind in FamilyKind::ALL {
        for base in family_set(config, kind) {
            let name = kind.derived_name(base);
            if config.has_rule(&name) {
                return Err(GenerateError::DerivedRuleCollision {
                    name,
                    base: base.clone(),
                    kind,
                });
            }
        }
    }

    for rule in &config.rules {
        for symbol in rule.symbols() {
            if symbol.starts_with(['\'', '"']) || config.tokens.contains(symbol) {
                continue;
            }
            for kind in FamilyKind::ALL {
                let Some(base) = kind.strip(symbol) else {
                    continue;
                };
                if !family_set(config, kind).contains(base) && !config.has_rule(symbol) {
                    return Err(GenerateError::UnregisteredDerivedRule {
                        rule: rule.name.clone(),
                        symbol: symbol.to_owned(),
                        base: base.to_owned(),
                        kind,
                    });
                }
            }
        }
    }

    Ok(())
}

fn family_set(config: &ParserConfig, kind: FamilyKind) -> &IndexSet<String> {
    match kind {
        FamilyKind::Opt => &config.opt_rules,
        FamilyKind::List => &config.list_rules,
        FamilyKind::String => &config.string_rules,
    }
}

/// Normalize the indentation of an action body.
///
/// If every line is blank or starts with one indentation unit, that unit is
/// removed. One leading blank line and all trailing blank lines are dropped,
/// and blank lines come back empty.
pub fn outdent(code: &str, tabsize: usize) -> Vec<&str> {
    let unit = " ".repeat(tabsize.max(1));
    let is_blank = |line: &str| line.trim().is_empty();

    let mut lines: Vec<&str> = code.lines().collect();
    if lines.iter().all(|line| is_blank(line) || line.starts_with(&unit)) {
        for line in &mut lines {
            if !is_blank(line) {
                *line = &line[unit.len()..];
            }
        }
    }
    for line in &mut lines {
        if is_blank(line) {
            *line = "";
        }
    }

    if lines.first() == Some(&"") {
        lines.remove(0);
    }
    while lines.last() == Some(&"") {
        lines.pop();
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax;
    use pretty_assertions::assert_eq;

    fn parse_config(source: &str) -> ParserConfig {
        syntax::parse(source).unwrap().config
    }

    #[test]
    fn outdent_minimal_body_is_unchanged() {
        let code = "let a = 1;\nif a > 0 {\n    a\n}";
        assert_eq!(
            outdent(code, 4),
            ["let a = 1;", "if a > 0 {", "    a", "}"]
        );
    }

    #[test]
    fn outdent_strips_one_unit() {
        let code = "\n    let a = 1;\n\n    if a > 0 {\n        a\n    }\n";
        let once = outdent(code, 4);
        assert_eq!(once, ["let a = 1;", "", "if a > 0 {", "    a", "}"]);
        assert_eq!(outdent(&once.join("\n"), 4), once);
    }

    #[test]
    fn outdent_drops_closing_brace_indentation() {
        let code = "\n        p.set(p.take(1));\n    ";
        assert_eq!(outdent(code, 4), ["    p.set(p.take(1));"]);
        assert_eq!(outdent(code, 8), ["p.set(p.take(1));"]);
        assert!(outdent("", 4).is_empty());
        assert!(outdent("   \n  ", 4).is_empty());
    }

    #[test]
    fn outdent_body_starting_on_brace_line() {
        let config = parse_config("%%\nx : a { let v = p.take(1);\n    p.set(v);\n} ;\n%%\n");
        let options = Options::new().template("$productions");
        let generated = Codegen::new(&config, &options).unwrap().to_string();
        assert!(generated.starts_with(concat!(
            "    /// x : a\n",
            "    fn p_x(p: &mut Reduction<Value>) {\n",
            "        let v = p.take(1);\n",
            "        p.set(v);\n",
            "    }\n",
        )));
    }

    #[test]
    fn precedence_is_rendered_in_order() {
        let config = parse_config(
            "%left '+' '-'\n%left '*' '/'\n%%\nexpr : expr '+' expr | NUM ;\n%%\n",
        );
        let options = Options::new();
        let codegen = Codegen::new(&config, &options).unwrap();
        let mut out = String::new();
        codegen.write_precs(&mut out).unwrap();
        assert_eq!(
            out,
            "    (Assoc::Left, &[\"'+'\", \"'-'\"]),\n    (Assoc::Left, &[\"'*'\", \"'/'\"]),\n"
        );
    }

    #[test]
    fn handlers_carry_production_and_body() {
        let config = parse_config("%%\nx : a {\n    let v = p.take(1);\n    p.set(v);\n} ;\n%%\n");
        let options = Options::new().template("$productions--\n$handlers");
        let generated = Codegen::new(&config, &options).unwrap().to_string();
        assert_eq!(
            generated,
            concat!(
                "    /// x : a\n",
                "    fn p_x(p: &mut Reduction<Value>) {\n",
                "        let v = p.take(1);\n",
                "        p.set(v);\n",
                "    }\n",
                "\n",
                "    /// empty : \n",
                "    fn p_empty(p: &mut Reduction<Value>) {\n",
                "        p.set(Value::null());\n",
                "    }\n",
                "--\n",
                "    (\"p_x\", \"x : a\", Actions::p_x),\n",
                "    (\"p_empty\", \"empty : \", Actions::p_empty),\n",
            )
        );
    }

    #[test]
    fn user_defined_empty_replaces_builtin() {
        let config = parse_config("%%\nx : empty ;\nempty : { p.set(Value::null()) } ;\n%%\n");
        let options = Options::new().template("$handlers");
        let generated = Codegen::new(&config, &options).unwrap().to_string();
        assert_eq!(generated.matches("p_empty").count(), 2);
    }

    #[test]
    fn generation_is_deterministic() {
        let source = "%%\nfile : [(block)] ;\nblock : A <b> ;\nb : B ;\n%%\n";
        let options = Options::new().cfg_filename("t.ypp");
        let a = Codegen::new(&parse_config(source), &options).unwrap().to_string();
        let b = Codegen::new(&parse_config(source), &options).unwrap().to_string();
        assert_eq!(a, b);
        assert!(a.contains("// t.ypp\n"));
    }

    #[test]
    fn missing_start() {
        let config = ParserConfig::new();
        let options = Options::new();
        assert!(matches!(
            Codegen::new(&config, &options),
            Err(GenerateError::MissingStart)
        ));
    }

    #[test]
    fn unregistered_derived_rule() {
        let config = parse_config("%%\nx : y_list ;\n%%\n");
        let options = Options::new();
        assert!(matches!(
            Codegen::new(&config, &options),
            Err(GenerateError::UnregisteredDerivedRule { kind: FamilyKind::List, .. })
        ));

        let config = parse_config("%%\nx : y_list ;\ny_list : ;\n%%\n");
        assert!(Codegen::new(&config, &options).is_ok());
    }

    #[test]
    fn derived_rule_collision() {
        let config = parse_config("%%\nfoo : [bar] ;\nbar_opt : ;\n%%\n");
        let options = Options::new();
        assert!(matches!(
            Codegen::new(&config, &options),
            Err(GenerateError::DerivedRuleCollision { kind: FamilyKind::Opt, .. })
        ));
    }

    #[test]
    fn duplicate_handler() {
        let config = parse_config("%%\nx : a ;\nx : b ;\n%%\n");
        let options = Options::new();
        assert!(matches!(
            Codegen::new(&config, &options),
            Err(GenerateError::DuplicateHandler { .. })
        ));
    }

    #[test]
    fn unknown_placeholder() {
        let config = parse_config("%%\nx : a ;\n%%\n");
        let options = Options::new().template("$nope");
        assert!(matches!(
            Codegen::new(&config, &options),
            Err(GenerateError::Template(TemplateError::UnknownPlaceholder { .. }))
        ));
    }
}
