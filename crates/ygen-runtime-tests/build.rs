use std::{env, path::PathBuf};
use ygen::{build::Build, syntax::synth::FamilyKind, Options};

fn main() {
    let project_root = env::var_os("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .unwrap();
    let test_grammars_dir = project_root.join("../ygen/tests").canonicalize().unwrap();
    ygen::build::process_dir(&test_grammars_dir).unwrap();

    // grammars relying on families requested from outside the grammar.
    let requested_dir = project_root.join("grammars").canonicalize().unwrap();
    Build::with_root_dir(requested_dir)
        .unwrap()
        .options(Options::new().request_family(FamilyKind::Opt, "block"))
        .process()
        .unwrap();
}
