//! Generator options.

use crate::{grammar::ParserConfig, syntax::synth::FamilyKind};

/// The template used when none is given.
pub const DEFAULT_TEMPLATE: &str = include_str!("templates/parser.tpl.rs");

#[derive(Debug, Clone)]
pub struct Options {
    pub(crate) cfg_filename: String,
    pub(crate) template: Option<String>,
    pub(crate) tabsize: usize,
    pub(crate) strict: bool,
    pub(crate) families: Vec<(FamilyKind, String)>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            cfg_filename: "<input>".into(),
            template: None,
            tabsize: 4,
            strict: false,
            families: vec![],
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the grammar file name recorded in the header of the generated code.
    pub fn cfg_filename(mut self, name: impl Into<String>) -> Self {
        self.cfg_filename = name.into();
        self
    }

    /// Replace the default template.
    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Set the width of one indentation unit. Zero is treated as one.
    pub fn tabsize(mut self, tabsize: usize) -> Self {
        self.tabsize = tabsize.max(1);
        self
    }

    /// Make illegal characters in the grammar a hard error.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Register `base` in a family set before the grammar is checked, as if
    /// the grammar had used the matching shorthand somewhere.
    pub fn request_family(mut self, kind: FamilyKind, base: impl Into<String>) -> Self {
        self.families.push((kind, base.into()));
        self
    }

    /// Add the requested families to the sets of a parsed grammar.
    pub fn apply_families(&self, config: &mut ParserConfig) {
        for (kind, base) in &self.families {
            let set = match kind {
                FamilyKind::Opt => &mut config.opt_rules,
                FamilyKind::List => &mut config.list_rules,
                FamilyKind::String => &mut config.string_rules,
            };
            set.insert(base.clone());
        }
    }

    pub(crate) fn template_text(&self) -> &str {
        self.template.as_deref().unwrap_or(DEFAULT_TEMPLATE)
    }

    pub(crate) fn indent_unit(&self) -> String {
        " ".repeat(self.tabsize)
    }
}
