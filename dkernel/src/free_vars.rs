//! Computes the free variables of terms.

use std::collections::BTreeSet;

use crate::{
    sort::{Level, Sort},
    term::*,
};

/// Which occurrences of a variable count as free occurrences.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FreeVariablePolicy {
    /// Every occurrence counts.
    IgnoreNone,
    /// Occurrences in the sort annotations of types and in irrelevant arguments are ignored.
    IgnoreInAnnotations,
}

/// The free variables of `t`, as de Bruijn indices relative to the scope `t` lives in.
/// Occurrences in placeholder arguments count as free occurrences.
#[must_use]
pub fn free_variables(t: &Term, policy: FreeVariablePolicy) -> BTreeSet<u32> {
    let mut result = BTreeSet::new();
    collect_in_term(t, policy, 0, &mut result);
    result
}

fn collect_in_term(t: &Term, policy: FreeVariablePolicy, offset: u32, result: &mut BTreeSet<u32>) {
    match t {
        Term::Local(local) => {
            if local.index.value() >= offset {
                result.insert(local.index.value() - offset);
            }
        }
        Term::Inst(_) => {}
        Term::Apply(apply) => {
            collect_in_term(&apply.function, policy, offset, result);
            if !(policy == FreeVariablePolicy::IgnoreInAnnotations && apply.info.is_irrelevant()) {
                collect_in_term(&apply.argument, policy, offset, result);
            }
        }
        Term::Pi(pi) => {
            collect_in_type(&pi.domain.ty, policy, offset, result);
            collect_in_type(&pi.codomain, policy, offset + 1, result);
        }
        Term::Sort(sort) => collect_in_sort(sort, policy, offset, result),
        Term::Level(level) => collect_in_level(level, policy, offset, result),
        Term::Metavariable(meta) => {
            for argument in &meta.arguments {
                collect_in_term(argument, policy, offset, result);
            }
        }
    }
}

fn collect_in_type(ty: &Type, policy: FreeVariablePolicy, offset: u32, result: &mut BTreeSet<u32>) {
    if policy == FreeVariablePolicy::IgnoreNone {
        collect_in_sort(&ty.sort, policy, offset, result);
    }
    collect_in_term(&ty.term, policy, offset, result);
}

fn collect_in_sort(sort: &Sort, policy: FreeVariablePolicy, offset: u32, result: &mut BTreeSet<u32>) {
    match sort {
        Sort::Prop | Sort::SizeUniv | Sort::Omega => {}
        Sort::Type(level) => collect_in_level(level, policy, offset, result),
        Sort::Meta(meta) => {
            for argument in &meta.arguments {
                collect_in_term(argument, policy, offset, result);
            }
        }
    }
}

fn collect_in_level(level: &Level, policy: FreeVariablePolicy, offset: u32, result: &mut BTreeSet<u32>) {
    for atom in &level.atoms {
        collect_in_term(&atom.term, policy, offset, result);
    }
}
