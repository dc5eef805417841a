//! Turns every fixture under `tests/src` into a `#[test]` that calls `run_test`.

use std::{
    fmt::Write as _,
    path::{Path, PathBuf},
};

const FIXTURES: &str = "tests/src";

fn main() {
    println!("cargo:rerun-if-changed={}", FIXTURES);
    let mut fixtures = Vec::new();
    collect_fixtures(Path::new(FIXTURES), &mut fixtures);
    fixtures.sort();

    let mut generated = String::new();
    for fixture in &fixtures {
        let path = fixture
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        writeln!(
            generated,
            "#[test]\nfn {}() {{\n    run_test({:?});\n}}\n",
            test_name(&path),
            path
        )
        .unwrap();
    }

    let destination = Path::new(&std::env::var("OUT_DIR").unwrap()).join("tests.rs");
    std::fs::write(destination, generated).unwrap();
}

/// Collects the `.ron` files below `dir`, relative to the fixture root.
fn collect_fixtures(dir: &Path, fixtures: &mut Vec<PathBuf>) {
    for entry in std::fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            collect_fixtures(&path, fixtures);
        } else if path.extension().map_or(false, |extension| extension == "ron") {
            fixtures.push(path.strip_prefix(FIXTURES).unwrap().to_path_buf());
        }
    }
}

/// `errors/prop_singleton.ron` becomes `errors_prop_singleton`.
fn test_name(path: &str) -> String {
    path.trim_end_matches(".ron")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
