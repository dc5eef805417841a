//! Forcing analysis.
//!
//! A constructor argument is forced if its value can be read off the constructor's target indices.
//! For instance, in `cons : {n : Nat} -> A -> Vec A n -> Vec A (suc n)`, the argument `n` is forced.

use std::collections::BTreeSet;

use crate::{basic::*, conversion::Conversion, state::State, term::*};

pub trait ForcingAnalysis {
    /// Computes one annotation per argument of a constructor type.
    /// The type lives under the datatype's `parameters` parameters,
    /// and its target applies the datatype to those parameters followed by the indices.
    fn forced_arguments(
        &self,
        state: &State,
        conversion: &dyn Conversion,
        ty: &Type,
        parameters: usize,
    ) -> Vec<IsForced>;
}

/// Marks an argument as forced if it occurs in a target index in constructor pattern position,
/// that is, as an index itself or as an argument to a constructor.
#[derive(Debug, Default, Clone, Copy)]
pub struct PatternForcing;

impl ForcingAnalysis for PatternForcing {
    fn forced_arguments(
        &self,
        state: &State,
        conversion: &dyn Conversion,
        ty: &Type,
        parameters: usize,
    ) -> Vec<IsForced> {
        let mut arguments = Vec::new();
        let mut current = conversion.reduce(state, &ty.term);
        while let Term::Pi(pi) = current {
            arguments.push(pi.domain.info);
            current = conversion.reduce(state, &pi.codomain.term);
        }

        let mut pattern_variables = BTreeSet::new();
        for (_, index) in current.apply_args().into_iter().skip(parameters) {
            collect_pattern_variables(state, conversion, index, &mut pattern_variables);
        }

        let arity = arguments.len();
        arguments
            .iter()
            .enumerate()
            .map(|(k, info)| {
                let variable = (arity - 1 - k) as u32;
                if !info.is_irrelevant() && pattern_variables.contains(&variable) {
                    IsForced::Forced
                } else {
                    IsForced::NotForced
                }
            })
            .collect()
    }
}

fn collect_pattern_variables(
    state: &State,
    conversion: &dyn Conversion,
    term: &Term,
    result: &mut BTreeSet<u32>,
) {
    let term = conversion.reduce(state, term);
    match &term {
        Term::Local(local) => {
            result.insert(local.index.value());
        }
        Term::Inst(_) | Term::Apply(_) => {
            let (head, arguments) = term.destructure_as_nary_application();
            if let Term::Inst(name) = head {
                if let Some(constructor) = state.signature.constructor(*name) {
                    for (info, argument) in arguments
                        .into_iter()
                        .skip(constructor.parameters as usize)
                    {
                        if !info.is_irrelevant() {
                            collect_pattern_variables(state, conversion, argument, result);
                        }
                    }
                }
            }
        }
        _ => {}
    }
}
