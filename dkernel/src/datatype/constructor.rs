use tracing::debug;

use super::{fits, DatatypeInfo};
use crate::{
    basic::*,
    conversion::ConversionError,
    free_vars::{free_variables, FreeVariablePolicy},
    result::CheckError,
    signature::{ConstructorDefinition, Definition, DefinitionKind, ParameterSet},
    syntax::ConstructorDeclaration,
    tcm::Tcm,
    term::*,
};

/// Checks a single constructor of the datatype described by `info`, and registers it.
///
/// The constructor's type is elaborated under the datatype's parameters.
/// Returns the constructor's name and definition, together with the parameters
/// that occur in its target indices.
#[tracing::instrument(level = "debug", skip_all, fields(constructor = %declaration.name))]
pub(super) fn check_constructor(
    tcm: &mut Tcm,
    info: &DatatypeInfo,
    declaration: &ConstructorDeclaration,
) -> Result<(QualifiedName, ConstructorDefinition, ParameterSet), CheckError> {
    let name = QualifiedName::new(tcm.db(), &declaration.name);
    if declaration.relevance != Relevance::Relevant {
        return Err(CheckError::IrrelevantConstructor { constructor: name });
    }

    let ty = tcm.elaborate_type(&declaration.ty)?;
    let len = tcm.context.len();
    let non_linear = check_target(tcm, info, name, &ty);
    tcm.context.truncate(len);
    let non_linear = non_linear?;

    let ty = tcm.normalise_type(&ty);
    let forced = if tcm.options.forcing {
        tcm.forced_arguments(&ty, info.parameters.len())
    } else {
        vec![IsForced::NotForced; tcm.telescope_view(&ty).0.len()]
    };
    let arity = fits::fits_in(tcm, info, name, &forced, &ty)?;

    let definition = ConstructorDefinition {
        datatype: info.name,
        parameters: info.parameters.len() as u32,
        arity,
        induction: Induction::Inductive,
        forced,
    };
    // Outside the datatype, the parameters of a constructor are implicit.
    let closed = info
        .parameters
        .clone()
        .with_annotations(BinderAnnotation::Implicit)
        .to_pi(ty);
    tcm.state.signature.register(Definition {
        name,
        ty: closed,
        kind: DefinitionKind::Constructor(definition.clone()),
    })?;
    if declaration.instance {
        tcm.state.add_instance(info.name, name);
    }
    debug!(arity, ?non_linear, "checked constructor");
    Ok((name, definition, non_linear))
}

/// Walks the function types of `ty`, leaving its arguments in the context,
/// and checks that it ends in the datatype applied to its own parameters.
/// Returns the parameters that occur in the target's indices.
fn check_target(
    tcm: &mut Tcm,
    info: &DatatypeInfo,
    constructor: QualifiedName,
    ty: &Type,
) -> Result<ParameterSet, CheckError> {
    let mut walked = 0;
    let mut current = ty.term.clone();
    let target = loop {
        match tcm.reduce(&current) {
            Term::Pi(pi) => {
                tcm.context.push(*pi.domain);
                current = pi.codomain.term;
                walked += 1;
            }
            placeholder @ Term::Metavariable(_) => {
                let generic = generic_target(tcm, info, walked)?;
                debug!(
                    target = %generic.display(tcm.db()),
                    "solving placeholder target"
                );
                if tcm
                    .speculate(|tcm| tcm.equal_term(&placeholder, &generic))
                    .is_err()
                {
                    return Err(CheckError::ConstructorTargetMismatch {
                        constructor,
                        target: placeholder,
                    });
                }
                current = generic;
            }
            target => break target,
        }
    };

    let parameters = info.parameters.len();
    let target = tcm.normalise(&target);
    let (head, arguments) = target.destructure_as_nary_application();
    if *head != Term::Inst(info.name) || arguments.len() != parameters + info.indices {
        return Err(CheckError::ConstructorTargetMismatch {
            constructor,
            target: target.clone(),
        });
    }

    let (claimed, indices) = arguments.split_at(parameters);
    for (k, (argument_info, argument)) in claimed.iter().enumerate() {
        if argument_info.is_irrelevant() {
            continue;
        }
        let variable = Term::local((walked + parameters - 1 - k) as u32);
        tcm.equal_term(argument, &variable)?;
    }

    let mut non_linear = ParameterSet::new();
    for (_, index) in indices {
        for variable in free_variables(index, FreeVariablePolicy::IgnoreInAnnotations) {
            let position = (walked + parameters) as i64 - 1 - variable as i64;
            assert!(
                position >= 0,
                "variable {} in the target of `{}` is bound outside the datatype's parameters",
                variable,
                constructor.display(tcm.db())
            );
            if position < parameters as i64 {
                non_linear.insert(position as u32);
            }
        }
    }
    Ok(non_linear)
}

/// The datatype applied to its parameters and to fresh placeholders for its indices,
/// in a context extended by `walked` constructor arguments.
fn generic_target(tcm: &mut Tcm, info: &DatatypeInfo, walked: usize) -> Result<Term, CheckError> {
    let parameters = info.parameters.len();
    let mut target = Term::Inst(info.name);
    for (k, domain) in info.parameters.domains().iter().enumerate() {
        target = target.apply(
            Term::local((walked + parameters - 1 - k) as u32),
            domain.info,
        );
    }
    for _ in 0..info.indices {
        let ty = tcm.infer_type(&target)?;
        let pi = match tcm.reduce(&ty) {
            Term::Pi(pi) => pi,
            other => return Err(ConversionError::ExpectedFunctionType(other).into()),
        };
        let index = tcm.fresh_term_meta(&pi.domain.ty.term);
        target = target.apply(index, pi.domain.info);
    }
    Ok(target)
}
