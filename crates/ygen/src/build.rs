//! Build script support.

use crate::{compile_file, Options};
use anyhow::Context as _;
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

pub fn process_root() -> anyhow::Result<()> {
    let build = Build::new()?;
    build.process()
}

pub fn process_dir(root_dir: &Path) -> anyhow::Result<()> {
    let build = Build::with_root_dir(root_dir.to_owned())?;
    build.process()
}

#[derive(Debug)]
pub struct Build {
    root_dir: PathBuf,
    out_dir: PathBuf,
    options: Options,
}

impl Build {
    pub fn new() -> anyhow::Result<Self> {
        let root_dir = env::var_os("CARGO_MANIFEST_DIR")
            .map(PathBuf::from)
            .context("The environment variable `CARGO_MANIFEST_DIR' is not set")?;
        Self::with_root_dir(root_dir)
    }

    pub fn with_root_dir(root_dir: PathBuf) -> anyhow::Result<Self> {
        let out_dir = env::var_os("OUT_DIR")
            .map(PathBuf::from)
            .context("The environment variable `OUT_DIR' is not set")?;
        Ok(Self::with_dirs(root_dir, out_dir))
    }

    pub fn with_dirs(root_dir: PathBuf, out_dir: PathBuf) -> Self {
        Self {
            root_dir,
            out_dir,
            options: Options::default(),
        }
    }

    /// Use `options` for every grammar. The recorded file name is still
    /// set per grammar.
    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn process(&self) -> anyhow::Result<()> {
        for entry in WalkDir::new(&self.root_dir) {
            let entry = entry.context("from WalkDir entry")?;
            if !entry.file_type().is_file() {
                continue;
            }
            let in_file = entry.path();
            match in_file.extension().and_then(|ext| ext.to_str()) {
                Some("ypp") => self.process_file(in_file)?,
                _ => continue,
            }
        }

        Ok(())
    }

    fn process_file(&self, in_file: &Path) -> anyhow::Result<()> {
        let rel_path = in_file.strip_prefix(&self.root_dir)?;
        let mut out_file = self.out_dir.join(rel_path);
        out_file.set_extension("rs");
        if let Some(out_dir) = out_file.parent() {
            fs::create_dir_all(out_dir)?;
        }

        println!("cargo:rerun-if-changed={}", in_file.display());

        let options = self
            .options
            .clone()
            .cfg_filename(rel_path.display().to_string());
        compile_file(in_file, &out_file, &options)
            .with_context(|| anyhow::anyhow!("failed to compile {}", in_file.display()))?;

        Ok(())
    }
}
