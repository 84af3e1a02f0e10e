//! A parser generator for a Yacc subset.
//!
//! A grammar file (`*.ypp`) is parsed into a [`ParserConfig`], checked, and
//! rendered into the source of a Rust module built on `ygen-runtime`.
//!
//! [`ParserConfig`]: crate::grammar::ParserConfig

pub mod build;
pub mod codegen;
pub mod grammar;
pub mod options;
pub mod syntax;
pub mod template;

pub use crate::options::Options;

use crate::{
    codegen::{Codegen, GenerateError},
    syntax::{lexer::LexFault, SyntaxError},
};
use std::{
    fs, io,
    path::{Path, PathBuf},
};

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("syntax error")]
    Syntax(
        #[from]
        #[source]
        SyntaxError,
    ),

    #[error("strict mode: {} illegal character(s) in the grammar", faults.len())]
    Lex { faults: Vec<LexFault> },

    #[error("failed to generate the parser")]
    Generate(
        #[from]
        #[source]
        GenerateError,
    ),

    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Compile grammar source into parser source.
pub fn compile(source: &str, options: &Options) -> Result<String, CompileError> {
    let mut parsed = syntax::parse(source)?;
    if options.strict && !parsed.lex_faults.is_empty() {
        return Err(CompileError::Lex {
            faults: parsed.lex_faults,
        });
    }
    options.apply_families(&mut parsed.config);
    let codegen = Codegen::new(&parsed.config, options)?;
    Ok(codegen.to_string())
}

/// Compile `input` and write the result to `output`.
///
/// The output is written to a temporary file next to it and renamed into
/// place, so a failed compilation never leaves a partial file behind. The
/// temporary file is removed again if the rename fails.
pub fn compile_file(input: &Path, output: &Path, options: &Options) -> Result<(), CompileError> {
    let io_error = |path: &Path| {
        let path = path.to_owned();
        move |source| CompileError::Io { path, source }
    };

    let source = fs::read_to_string(input).map_err(io_error(input))?;
    let generated = compile(&source, options)?;

    let mut tmp = output.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, generated).map_err(io_error(&tmp))?;
    if let Err(source) = fs::rename(&tmp, output) {
        let _ = fs::remove_file(&tmp);
        return Err(io_error(output)(source));
    }
    Ok(())
}
