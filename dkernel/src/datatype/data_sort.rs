use tracing::debug;

use crate::{
    basic::*,
    free_vars::{free_variables, FreeVariablePolicy},
    result::CheckError,
    sort::Sort,
    tcm::Tcm,
    telescope::Telescope,
    term::Type,
    traverse::{lift_sort, lift_type},
};

/// Determines the sort of a datatype from the end of its signature.
///
/// `core` is the signature with the parameters and indices peeled off. It must be a sort
/// that does not mention the indices, and that is not `Omega`.
#[tracing::instrument(level = "debug", skip_all)]
pub(super) fn resolve_data_sort(
    tcm: &mut Tcm,
    datatype: QualifiedName,
    indices: &Telescope,
    core: &Type,
) -> Result<Sort, CheckError> {
    // Created outside the indices, so its solution cannot mention them.
    let sort = tcm.fresh_sort_meta(true);
    let expected = lift_type(&Type::of_sort(sort.clone()), indices.len() as u32, 0);
    let result = tcm.under_telescope(indices, |tcm| tcm.equal_type(core, &expected));
    match result {
        Ok(()) => {
            let sort = tcm.normalise_sort(&sort);
            debug!(sort = %sort.display(tcm.db()), "resolved datatype sort");
            Ok(sort)
        }
        Err(error) => {
            let free = free_variables(&core.term, FreeVariablePolicy::IgnoreNone);
            if free.iter().any(|&variable| (variable as usize) < indices.len()) {
                Err(CheckError::SortDependsOnIndices { datatype })
            } else {
                Err(error.into())
            }
        }
    }
}

/// Checks that every index lives in a sort no larger than the datatype's sort.
/// A datatype in `Prop` may have indices in `Set`.
pub(super) fn check_index_sorts(
    tcm: &mut Tcm,
    datatype: QualifiedName,
    indices: &Telescope,
    sort: &Sort,
) -> Result<(), CheckError> {
    let bound = match tcm.reduce_sort(sort) {
        Sort::Prop => Sort::type_n(0),
        other => other,
    };
    let len = tcm.context.len();
    let mut result = Ok(());
    for (k, domain) in indices.domains().iter().enumerate() {
        let lifted = lift_sort(&bound, k as u32, 0);
        if let Err(error) = tcm.leq_sort(&domain.ty.sort, &lifted) {
            result = Err(CheckError::IndexSortTooLarge {
                datatype,
                index: k as u32,
                error,
            });
            break;
        }
        tcm.context.push(domain.clone());
    }
    tcm.context.truncate(len);
    result
}
