//! Fixture tests for the datatype checker.
//!
//! Each file in `tests/src` is a [`TestCase`] written in RON: a module to check, and what
//! should be true of the signature afterwards. The build script turns every fixture into a test.

use dcommon::{Database, Report};
use dkernel::{basic::*, check_module, is_coinductive, syntax::*, Tcm};
use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct TestCase {
    pub module: Module,
    #[serde(default)]
    pub expect: Vec<Expectation>,
}

#[derive(Deserialize, Debug)]
pub enum Expectation {
    Datatype {
        name: String,
        parameters: u32,
        indices: u32,
        #[serde(default)]
        constructors: Option<Vec<String>>,
        #[serde(default)]
        small: Option<Vec<u32>>,
        #[serde(default)]
        non_linear: Option<Vec<u32>>,
    },
    Constructor {
        name: String,
        arity: u32,
        #[serde(default)]
        forced: Option<Vec<bool>>,
    },
    /// Some declaration fails with the given error code.
    Error(String),
    /// Checking succeeds but reports a warning with the given code.
    Warning(String),
    /// The given name is not in the signature after checking.
    Undefined(String),
    Coinductive {
        ty: Expr,
        expected: Option<bool>,
    },
}

pub fn run_test(file: &str) {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/src")
        .join(file);
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("could not read {}: {}", path.display(), err));
    let case: TestCase = ron::from_str(&text)
        .unwrap_or_else(|err| panic!("could not parse {}: {}", path.display(), err));

    let db = Database::default();
    let mut tcm = Tcm::new(&db, case.module.options.clone());
    let result = check_module(&mut tcm, &case.module);
    let codes = result
        .reports()
        .iter()
        .filter_map(|report: &Report| report.code.clone())
        .collect::<Vec<_>>();

    let mut expects_errors = false;
    for expectation in &case.expect {
        match expectation {
            Expectation::Datatype {
                name,
                parameters,
                indices,
                constructors,
                small,
                non_linear,
            } => {
                let datatype = tcm
                    .state
                    .signature
                    .datatype(QualifiedName::new(&db, name))
                    .unwrap_or_else(|| panic!("datatype {} was not certified: {:?}", name, codes));
                assert_eq!(datatype.parameters, *parameters, "parameters of {}", name);
                assert_eq!(datatype.indices, *indices, "indices of {}", name);
                if let Some(constructors) = constructors {
                    let actual = datatype
                        .constructors
                        .iter()
                        .map(|constructor| constructor.display(&db))
                        .collect::<Vec<_>>();
                    assert_eq!(&actual, constructors, "constructors of {}", name);
                }
                if let Some(small) = small {
                    let actual = datatype.small_parameters.iter().copied().collect::<Vec<_>>();
                    assert_eq!(&actual, small, "small parameters of {}", name);
                }
                if let Some(non_linear) = non_linear {
                    let actual = datatype
                        .non_linear_parameters
                        .iter()
                        .copied()
                        .collect::<Vec<_>>();
                    assert_eq!(&actual, non_linear, "non-linear parameters of {}", name);
                }
            }
            Expectation::Constructor {
                name,
                arity,
                forced,
            } => {
                let constructor = tcm
                    .state
                    .signature
                    .constructor(QualifiedName::new(&db, name))
                    .unwrap_or_else(|| panic!("constructor {} was not certified: {:?}", name, codes));
                assert_eq!(constructor.arity, *arity, "arity of {}", name);
                if let Some(forced) = forced {
                    let actual = constructor
                        .forced
                        .iter()
                        .map(|forced| *forced == IsForced::Forced)
                        .collect::<Vec<_>>();
                    assert_eq!(&actual, forced, "forced arguments of {}", name);
                }
            }
            Expectation::Error(code) => {
                expects_errors = true;
                assert!(codes.contains(code), "expected {}, found {:?}", code, codes);
            }
            Expectation::Warning(code) => {
                assert!(codes.contains(code), "expected {}, found {:?}", code, codes);
            }
            Expectation::Undefined(name) => {
                assert!(
                    tcm.state
                        .signature
                        .get(QualifiedName::new(&db, name))
                        .is_none(),
                    "{} should not be defined",
                    name
                );
            }
            Expectation::Coinductive { ty, expected } => {
                let ty = tcm.elaborate_type(ty).unwrap();
                assert_eq!(is_coinductive(&tcm, &ty), *expected, "coinductivity of {:?}", ty);
            }
        }
    }
    if expects_errors {
        result.assert_errored();
    } else {
        result.assert_ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    include!(concat!(env!("OUT_DIR"), "/tests.rs"));
}
