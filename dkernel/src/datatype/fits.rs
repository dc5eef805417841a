use tracing::debug;

use super::DatatypeInfo;
use crate::{
    basic::*, result::CheckError, sort::Sort, tcm::Tcm, term::*, traverse::lift_sort,
};

/// Checks that the arguments of a constructor fit inside the datatype's sort,
/// and returns the constructor's arity.
///
/// Forced arguments are skipped unless `without_k` is set, in which case the constructor's own
/// sort is checked too. Arguments in `SizeUniv` always fit.
/// With universe checks disabled, only the arity is computed.
#[tracing::instrument(level = "debug", skip_all)]
pub(super) fn fits_in(
    tcm: &mut Tcm,
    info: &DatatypeInfo,
    constructor: QualifiedName,
    forced: &[IsForced],
    ty: &Type,
) -> Result<u32, CheckError> {
    let without_k = tcm.options.without_k;
    let containment = |error| CheckError::SortContainment {
        constructor,
        argument: None,
        datatype_sort: info.sort.clone(),
        error,
    };
    if info.universe_check && without_k {
        tcm.leq_sort(&ty.sort, info.sort).map_err(containment)?;
    }

    let len = tcm.context.len();
    let result = walk(tcm, info, constructor, forced, ty);
    tcm.context.truncate(len);
    result
}

fn walk(
    tcm: &mut Tcm,
    info: &DatatypeInfo,
    constructor: QualifiedName,
    forced: &[IsForced],
    ty: &Type,
) -> Result<u32, CheckError> {
    let without_k = tcm.options.without_k;
    let mut arity = 0;
    let mut current = ty.term.clone();
    while let Term::Pi(pi) = tcm.reduce(&current) {
        let is_forced = forced.get(arity as usize) == Some(&IsForced::Forced);
        let argument_sort = tcm.reduce_sort(&pi.domain.ty.sort);
        if info.universe_check && (without_k || !is_forced) && argument_sort != Sort::SizeUniv {
            // The datatype's sort lives outside the arguments walked so far.
            let datatype_sort = lift_sort(info.sort, arity, 0);
            if let Err(error) = tcm.leq_sort(&argument_sort, &datatype_sort) {
                return Err(CheckError::SortContainment {
                    constructor,
                    argument: Some(arity),
                    datatype_sort: info.sort.clone(),
                    error,
                });
            }
        } else if is_forced {
            debug!(argument = arity, "skipping forced argument");
        }
        tcm.context.push(*pi.domain);
        current = pi.codomain.term;
        arity += 1;
    }
    Ok(arity)
}
