use crate::{
    conversion::Ir, signature::ParameterSet, sort::Sort, tcm::Tcm, telescope::Telescope,
    term::Term,
};

/// Finds the parameters whose type lives in a sort no larger than the datatype's sort.
///
/// Parameters of type `Level` are never small. A parameter whose sort cannot be compared
/// with the datatype's sort yet is not small either.
/// None of the checks made here leave anything behind in the state.
pub(super) fn small_parameters(tcm: &mut Tcm, parameters: &Telescope, sort: &Sort) -> ParameterSet {
    let level = Term::Inst(tcm.state.builtins.level);
    // The datatype's sort lives under the parameters, as does every lifted parameter type.
    let mut result = ParameterSet::new();
    for (i, ty) in (0..parameters.len()).filter_map(|i| Some((i, parameters.lifted_type(i)?))) {
        let is_level = proves(tcm, |tcm| {
            let reduced = tcm.reduce(&ty.term);
            tcm.equal_term(&reduced, &level)
        });
        if !is_level && proves(tcm, |tcm| tcm.leq_sort(&ty.sort, sort)) {
            result.insert(i as u32);
        }
    }
    result
}

/// Whether `check` succeeds without postponing anything. Its effects on the state are discarded.
fn proves(tcm: &mut Tcm, check: impl FnOnce(&mut Tcm) -> Ir<()>) -> bool {
    tcm.local_state(|tcm| {
        let postponed = tcm.state.constraints.len();
        check(tcm).is_ok() && tcm.state.constraints.len() == postponed
    })
}
