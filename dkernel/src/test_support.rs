use dcommon::{Database, Dr, Intern};

use crate::{
    basic::*,
    datatype::CertifiedDatatype,
    module::check_module,
    signature::{Definition, DefinitionKind},
    sort::pi_sort,
    syntax::Module,
    tcm::{CheckOptions, Tcm},
    term::*,
    traverse::strengthen_sort,
};

pub(crate) fn with_db<R>(f: impl FnOnce(&dyn Intern) -> R) -> R {
    let db = Database::default();
    f(&db)
}

pub(crate) fn with_tcm<R>(f: impl FnOnce(&mut Tcm) -> R) -> R {
    with_db(|db| f(&mut Tcm::new(db, CheckOptions::default())))
}

/// Parses `text` as a RON module and checks it with the module's options.
pub(crate) fn with_module<R>(
    text: &str,
    f: impl FnOnce(&mut Tcm, Dr<Vec<CertifiedDatatype>>) -> R,
) -> R {
    let module = Module::from_ron(text).unwrap();
    with_db(|db| {
        let mut tcm = Tcm::new(db, module.options.clone());
        let result = check_module(&mut tcm, &module);
        f(&mut tcm, result)
    })
}

pub(crate) fn declare(tcm: &mut Tcm, name: QualifiedName, ty: Type) {
    tcm.state
        .signature
        .register(Definition {
            name,
            ty,
            kind: DefinitionKind::Axiom,
        })
        .unwrap();
}

/// The closed function type `(name : domain) -> codomain`.
pub(crate) fn pi(db: &dyn Intern, name: &str, info: ArgInfo, domain: Type, codomain: Type) -> Type {
    let sort = pi_sort(&domain.sort, strengthen_sort(&codomain.sort, 1).as_ref()).unwrap();
    Type {
        sort,
        term: Term::Pi(Pi {
            domain: Box::new(Domain {
                name: Name::new(db, name),
                info,
                ty: domain,
            }),
            codomain: Box::new(codomain),
        }),
    }
}
