use tracing::debug;

use crate::{
    basic::*, result::CheckError, syntax::ParameterBinding, tcm::Tcm, telescope::Telescope,
    term::*,
};

/// Matches the definition-site parameters against the leading function types of the data signature,
/// then runs `ret` with those parameters in scope.
///
/// An implicit or instance binder in the signature that the definition site does not mention
/// is inserted under the signature's own name. `ret` receives the bound parameters and the
/// rest of the signature, which lives under them.
///
/// # Panics
/// If a definition-site parameter has no matching binder, or is implicit where the signature is explicit.
/// The syntax layer rules these cases out.
pub(super) fn bind_parameters<R, F>(
    tcm: &mut Tcm,
    bindings: &[ParameterBinding],
    ty: &Type,
    ret: F,
) -> Result<R, CheckError>
where
    F: FnOnce(&mut Tcm, Telescope, Type) -> Result<R, CheckError>,
{
    bind_from(tcm, bindings, ty.clone(), Telescope::default(), ret)
}

fn bind_from<R, F>(
    tcm: &mut Tcm,
    bindings: &[ParameterBinding],
    ty: Type,
    mut telescope: Telescope,
    ret: F,
) -> Result<R, CheckError>
where
    F: FnOnce(&mut Tcm, Telescope, Type) -> Result<R, CheckError>,
{
    let (binding, rest) = match bindings.split_first() {
        Some(split) => split,
        None => return ret(tcm, telescope, ty),
    };
    let pi = match tcm.reduce(&ty.term) {
        Term::Pi(pi) => pi,
        other => panic!(
            "parameter `{}` has no binder in the data signature, which ends in `{}`",
            binding.name,
            other.display(tcm.db())
        ),
    };

    let quantifier = pi.domain.info.annotation;
    let (domain, remaining) = if binding.annotation == quantifier {
        if let Some(ascription) = &binding.ty {
            let ascribed = tcm.elaborate_type(ascription)?;
            tcm.equal_type(&ascribed, &pi.domain.ty)?;
        }
        let domain = Domain {
            name: Name::new(tcm.db(), &binding.name),
            info: pi.domain.info,
            ty: pi.domain.ty.clone(),
        };
        (domain, rest)
    } else if binding.annotation == BinderAnnotation::Explicit {
        debug!(
            name = %pi.domain.name.text(tcm.db()),
            "inserting implicit parameter"
        );
        ((*pi.domain).clone(), bindings)
    } else {
        panic!(
            "parameter `{}` is {:?}, but the data signature expects {:?}",
            binding.name, binding.annotation, quantifier
        );
    };

    telescope.push(domain.clone());
    let codomain = *pi.codomain;
    tcm.under(domain, move |tcm| {
        bind_from(tcm, remaining, codomain, telescope, ret)
    })
}
