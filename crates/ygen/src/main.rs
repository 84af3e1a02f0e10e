use anyhow::Context as _;
use clap::Parser;
use std::{fs, path::PathBuf, time::Instant};
use tracing_subscriber::EnvFilter;
use ygen::{codegen::Codegen, syntax::synth::FamilyKind, Options};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Specify the path of generated .rs file.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Use the specified code template instead of the builtin one.
    #[arg(long)]
    template: Option<PathBuf>,

    /// The width of one indentation unit in action code.
    #[arg(long, default_value_t = 4)]
    tabsize: usize,

    /// Treat illegal characters in the grammar as errors.
    #[arg(long)]
    strict: bool,

    /// Generate `<NAME>_opt` for a rule the grammar never wraps in `[..]`.
    #[arg(long = "opt", value_name = "NAME")]
    opt_rules: Vec<String>,

    /// Generate `<NAME>_list` for a rule the grammar never wraps in `<..>`.
    #[arg(long = "list", value_name = "NAME")]
    list_rules: Vec<String>,

    /// Generate `<NAME>_string` for a rule the grammar never wraps in `(..)`.
    #[arg(long = "string", value_name = "NAME")]
    string_rules: Vec<String>,

    /// Dump the parsed grammar next to the input file, as <INPUT>.expanded.
    #[arg(long)]
    dump_ir: bool,

    /// The path of grammar definition file.
    input: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    tracing::debug!("parsed CLI args = {:?}", args);

    process_file(&args)
        .with_context(|| anyhow::anyhow!("errored during processing {}", args.input.display()))?;

    Ok(())
}

fn process_file(args: &Args) -> anyhow::Result<()> {
    let in_file = fs::canonicalize(&args.input) //
        .context("failed to canonicalize the input file name")?;

    let out_file = args
        .output
        .clone()
        .unwrap_or_else(|| in_file.with_extension("rs"));
    let backup_file = out_file.with_extension("rs.bak");
    let expanded_file = in_file.with_extension("expanded");

    let mut options = Options::new()
        .cfg_filename(args.input.display().to_string())
        .tabsize(args.tabsize)
        .strict(args.strict);
    if let Some(template) = &args.template {
        let template = fs::read_to_string(template)
            .with_context(|| anyhow::anyhow!("failed to read {}", template.display()))?;
        options = options.template(template);
    }
    let requests = [
        (FamilyKind::Opt, &args.opt_rules),
        (FamilyKind::List, &args.list_rules),
        (FamilyKind::String, &args.string_rules),
    ];
    for (kind, names) in requests {
        for name in names {
            options = options.request_family(kind, name.as_str());
        }
    }

    let s = Instant::now();
    let mut parsed = ygen::syntax::parse_file(&in_file)?;
    tracing::info!("parse_file: {:?} elapsed", s.elapsed());

    if !parsed.lex_faults.is_empty() {
        for fault in &parsed.lex_faults {
            println!("[warning] {}: {}", args.input.display(), fault);
        }
        if args.strict {
            anyhow::bail!(
                "{} illegal character(s) in strict mode",
                parsed.lex_faults.len()
            );
        }
    }

    options.apply_families(&mut parsed.config);

    if args.dump_ir {
        fs::write(&expanded_file, parsed.config.to_string())
            .with_context(|| anyhow::anyhow!("failed to write {}", expanded_file.display()))?;
    }

    let s = Instant::now();
    let generated = Codegen::new(&parsed.config, &options)?.to_string();
    tracing::info!("generate: {:?} elapsed", s.elapsed());

    if out_file.exists() {
        fs::copy(&out_file, &backup_file).with_context(|| {
            anyhow::anyhow!(
                "failed to backup the output file to {}",
                backup_file.display()
            )
        })?;
    }
    fs::write(&out_file, generated).with_context(|| {
        anyhow::anyhow!("failed to write generated parser to {}", out_file.display())
    })?;

    Ok(())
}
