//! Checks every declaration of a module in order.

use dcommon::{Dr, Report, ReportKind};
use tracing::{info, warn};

use crate::{
    basic::*,
    conversion::ConversionError,
    datatype::{check_data_definition, CertifiedDatatype},
    result::CheckError,
    signature::{Definition, DefinitionKind, FunctionDefinition, RecordDefinition},
    syntax::{Declaration, Expr, Module},
    tcm::Tcm,
    term::*,
    traverse::contains_metavariables,
};

/// Checks the declarations of `module`, returning the datatypes that were certified.
///
/// A declaration that fails to check produces an error report and leaves the signature as it was.
/// Later declarations are still checked, and may fail in turn if they refer to it.
#[tracing::instrument(level = "debug", skip_all, fields(declarations = module.declarations.len()))]
pub fn check_module(tcm: &mut Tcm, module: &Module) -> Dr<Vec<CertifiedDatatype>> {
    let db = tcm.db();
    let mut result = Dr::sequence_unfail(module.declarations.iter().map(|declaration| {
        match check_declaration(tcm, declaration) {
            Ok(certified) => Dr::ok(certified),
            Err(error) => {
                warn!(declaration = declaration.name(), code = error.code(), "declaration rejected");
                Dr::fail(error.report(db))
            }
        }
    }))
    .map(|certified| certified.into_iter().flatten().collect::<Vec<_>>());

    let postponed = tcm.state.constraints.len();
    if postponed > 0 {
        result = result.with(
            Report::new(ReportKind::Warning)
                .with_code("unsolved-constraints")
                .with_message(format!(
                    "{} constraints could not be solved",
                    postponed
                )),
        );
    }
    let unsolved = tcm
        .state
        .signature
        .definitions()
        .filter(|definition| contains_metavariables(&tcm.normalise(&definition.ty.term)))
        .map(|definition| definition.name.display(db))
        .collect::<Vec<_>>();
    if !unsolved.is_empty() {
        warn!(?unsolved, "declarations left placeholders unsolved");
        result = result.with(
            Report::new(ReportKind::Warning)
                .with_code("unsolved-placeholders")
                .with_message(format!(
                    "the types of {} contain unsolved placeholders",
                    unsolved.join(", ")
                )),
        );
    }
    result
}

fn check_declaration(
    tcm: &mut Tcm,
    declaration: &Declaration,
) -> Result<Option<CertifiedDatatype>, CheckError> {
    match declaration {
        Declaration::Postulate { name, ty } => {
            declare(tcm, name, ty, DefinitionKind::Axiom).map(|()| None)
        }
        Declaration::DataSignature { name, ty } => {
            declare(tcm, name, ty, DefinitionKind::DataSignature).map(|()| None)
        }
        Declaration::Record {
            name,
            ty,
            induction,
        } => declare(
            tcm,
            name,
            ty,
            DefinitionKind::Record(RecordDefinition {
                induction: *induction,
            }),
        )
        .map(|()| None),
        Declaration::Function {
            name,
            ty,
            parameters,
            body,
        } => check_function(tcm, name, ty, parameters, body.as_ref()).map(|()| None),
        Declaration::Data(data) => check_data_definition(tcm, data).map(Some),
    }
}

fn declare(tcm: &mut Tcm, name: &str, ty: &Expr, kind: DefinitionKind) -> Result<(), CheckError> {
    let name = QualifiedName::new(tcm.db(), name);
    tcm.speculate(|tcm| {
        let ty = tcm.elaborate_type(ty)?;
        tcm.state.signature.register(Definition { name, ty, kind })?;
        info!(name = %name.display(tcm.db()), "declared");
        Ok(())
    })
}

fn check_function(
    tcm: &mut Tcm,
    name: &str,
    ty: &Expr,
    parameters: &[String],
    body: Option<&Expr>,
) -> Result<(), CheckError> {
    let name = QualifiedName::new(tcm.db(), name);
    tcm.speculate(|tcm| {
        let ty = tcm.elaborate_type(ty)?;
        let body = match body {
            Some(body) => {
                let len = tcm.context.len();
                let result = check_body(tcm, &ty, parameters, body);
                tcm.context.truncate(len);
                Some(result?)
            }
            None => None,
        };
        tcm.state.signature.register(Definition {
            name,
            ty,
            kind: DefinitionKind::Function(FunctionDefinition {
                arity: parameters.len() as u32,
                body,
            }),
        })?;
        info!(name = %name.display(tcm.db()), "defined function");
        Ok(())
    })
}

/// Binds `parameters` to the leading arguments of `ty`, leaving them in the context,
/// and checks `body` against the rest of `ty`.
fn check_body(
    tcm: &mut Tcm,
    ty: &Type,
    parameters: &[String],
    body: &Expr,
) -> Result<Term, CheckError> {
    let mut current = ty.term.clone();
    for parameter in parameters {
        match tcm.reduce(&current) {
            Term::Pi(pi) => {
                tcm.context.push(Domain {
                    name: Name::new(tcm.db(), parameter),
                    info: pi.domain.info,
                    ty: pi.domain.ty,
                });
                current = pi.codomain.term;
            }
            other => return Err(ConversionError::ExpectedFunctionType(other).into()),
        }
    }
    let body = tcm.elaborate_term(body)?;
    let inferred = tcm.infer_type(&body)?;
    tcm.equal_term(&inferred, &current)?;
    Ok(tcm.normalise(&body))
}
