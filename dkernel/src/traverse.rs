//! Utilities for traversing the term tree for things like find-and-replace operations.

use std::convert::Infallible;

use crate::{
    basic::*,
    sort::{Level, LevelAtom, Sort},
    term::*,
};

pub enum ReplaceResult {
    /// The term should not be replaced.
    Skip,
    /// The term should be replaced with the given value.
    ReplaceWith(Term),
}

/// Traverses the term tree and finds terms matching the provided replacement function.
/// If any matched, the replacement function generates the value to replace the found value with.
/// The provided [`DeBruijnOffset`] gives the amount of binders the [`Term`] argument is currently under.
/// The replacement function may abort the whole traversal by returning an error.
#[rustfmt::skip]
pub fn try_replace_in_term<E, F>(t: &Term, offset: DeBruijnOffset, replace_fn: &mut F) -> Result<Term, E>
where
    F: FnMut(&Term, DeBruijnOffset) -> Result<ReplaceResult, E>,
{
    match replace_fn(t, offset)? {
        ReplaceResult::ReplaceWith(replacement) => Ok(replacement),
        ReplaceResult::Skip => Ok(match t {
            Term::Local(_) | Term::Inst(_) => t.clone(),
            Term::Apply(apply) => Term::Apply(Apply {
                function: Box::new(try_replace_in_term(&apply.function, offset, replace_fn)?),
                argument: Box::new(try_replace_in_term(&apply.argument, offset, replace_fn)?),
                info: apply.info,
            }),
            Term::Pi(pi) => Term::Pi(Pi {
                domain: Box::new(Domain {
                    name: pi.domain.name,
                    info: pi.domain.info,
                    ty: try_replace_in_type(&pi.domain.ty, offset, replace_fn)?,
                }),
                codomain: Box::new(try_replace_in_type(&pi.codomain, offset.succ(), replace_fn)?),
            }),
            Term::Sort(sort) => Term::Sort(try_replace_in_sort(sort, offset, replace_fn)?),
            Term::Level(level) => Term::Level(try_replace_in_level(level, offset, replace_fn)?),
            Term::Metavariable(meta) => Term::Metavariable(Metavariable {
                index: meta.index,
                arguments: meta
                    .arguments
                    .iter()
                    .map(|argument| try_replace_in_term(argument, offset, &mut *replace_fn))
                    .collect::<Result<_, _>>()?,
            }),
        }),
    }
}

pub fn try_replace_in_type<E, F>(
    ty: &Type,
    offset: DeBruijnOffset,
    replace_fn: &mut F,
) -> Result<Type, E>
where
    F: FnMut(&Term, DeBruijnOffset) -> Result<ReplaceResult, E>,
{
    Ok(Type {
        sort: try_replace_in_sort(&ty.sort, offset, replace_fn)?,
        term: try_replace_in_term(&ty.term, offset, replace_fn)?,
    })
}

pub fn try_replace_in_sort<E, F>(
    sort: &Sort,
    offset: DeBruijnOffset,
    replace_fn: &mut F,
) -> Result<Sort, E>
where
    F: FnMut(&Term, DeBruijnOffset) -> Result<ReplaceResult, E>,
{
    Ok(match sort {
        Sort::Prop | Sort::SizeUniv | Sort::Omega => sort.clone(),
        Sort::Type(level) => Sort::Type(try_replace_in_level(level, offset, replace_fn)?),
        Sort::Meta(meta) => Sort::Meta(Metavariable {
            index: meta.index,
            arguments: meta
                .arguments
                .iter()
                .map(|argument| try_replace_in_term(argument, offset, &mut *replace_fn))
                .collect::<Result<_, _>>()?,
        }),
    })
}

/// The result is not canonicalised, since replaced atoms may have become levels themselves.
pub fn try_replace_in_level<E, F>(
    level: &Level,
    offset: DeBruijnOffset,
    replace_fn: &mut F,
) -> Result<Level, E>
where
    F: FnMut(&Term, DeBruijnOffset) -> Result<ReplaceResult, E>,
{
    Ok(Level {
        constant: level.constant,
        atoms: level
            .atoms
            .iter()
            .map(|atom| {
                Ok(LevelAtom {
                    term: try_replace_in_term(&atom.term, offset, &mut *replace_fn)?,
                    offset: atom.offset,
                })
            })
            .collect::<Result<_, _>>()?,
    })
}

fn infallible<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

/// Like [`try_replace_in_term`], but the replacement function cannot fail.
#[must_use]
pub fn replace_in_term(
    t: &Term,
    mut replace_fn: impl FnMut(&Term, DeBruijnOffset) -> ReplaceResult,
) -> Term {
    infallible(try_replace_in_term(
        t,
        DeBruijnOffset::zero(),
        &mut |t, offset| Ok(replace_fn(t, offset)),
    ))
}

#[must_use]
pub fn replace_in_type(
    ty: &Type,
    mut replace_fn: impl FnMut(&Term, DeBruijnOffset) -> ReplaceResult,
) -> Type {
    infallible(try_replace_in_type(
        ty,
        DeBruijnOffset::zero(),
        &mut |t, offset| Ok(replace_fn(t, offset)),
    ))
}

#[must_use]
pub fn replace_in_sort(
    sort: &Sort,
    mut replace_fn: impl FnMut(&Term, DeBruijnOffset) -> ReplaceResult,
) -> Sort {
    infallible(try_replace_in_sort(
        sort,
        DeBruijnOffset::zero(),
        &mut |t, offset| Ok(replace_fn(t, offset)),
    ))
}

/// Shifts every variable at or above `cutoff` up by `shift`,
/// as when moving a term under `shift` new binders.
fn lift_locals(shift: u32, cutoff: u32) -> impl FnMut(&Term, DeBruijnOffset) -> ReplaceResult {
    move |t, offset| match t {
        Term::Local(local) if local.index.value() >= cutoff + offset.value() => {
            ReplaceResult::ReplaceWith(Term::local(local.index.value() + shift))
        }
        _ => ReplaceResult::Skip,
    }
}

#[must_use]
pub fn lift_free_vars(t: &Term, shift: u32, cutoff: u32) -> Term {
    if shift == 0 {
        return t.clone();
    }
    replace_in_term(t, lift_locals(shift, cutoff))
}

#[must_use]
pub fn lift_type(ty: &Type, shift: u32, cutoff: u32) -> Type {
    if shift == 0 {
        return ty.clone();
    }
    replace_in_type(ty, lift_locals(shift, cutoff))
}

#[must_use]
pub fn lift_sort(sort: &Sort, shift: u32, cutoff: u32) -> Sort {
    if shift == 0 {
        return sort.clone();
    }
    replace_in_sort(sort, lift_locals(shift, cutoff))
}

/// Replaces the innermost free variable with `substitution`, lowering every other free variable by one.
/// Used to compute the codomain of a function type applied to an argument.
fn instantiate_with(substitution: &Term) -> impl FnMut(&Term, DeBruijnOffset) -> ReplaceResult + '_ {
    move |t, offset| match t {
        Term::Local(local) if local.index.value() == offset.value() => {
            ReplaceResult::ReplaceWith(lift_free_vars(substitution, offset.value(), 0))
        }
        Term::Local(local) if local.index.value() > offset.value() => {
            ReplaceResult::ReplaceWith(Term::local(local.index.value() - 1))
        }
        _ => ReplaceResult::Skip,
    }
}

#[must_use]
pub fn instantiate(body: &Term, substitution: &Term) -> Term {
    replace_in_term(body, instantiate_with(substitution))
}

/// Replaces each free variable `i < arguments.len()` with `arguments[i]`,
/// and lowers the remaining free variables by `arguments.len()`.
fn substitute_with(arguments: &[Term]) -> impl FnMut(&Term, DeBruijnOffset) -> ReplaceResult + '_ {
    move |t, offset| match t {
        Term::Local(local) if local.index.value() >= offset.value() => {
            let index = (local.index.value() - offset.value()) as usize;
            ReplaceResult::ReplaceWith(match arguments.get(index) {
                Some(argument) => lift_free_vars(argument, offset.value(), 0),
                None => Term::local(local.index.value() - arguments.len() as u32),
            })
        }
        _ => ReplaceResult::Skip,
    }
}

/// Applies a parallel substitution, as stored in a [`Metavariable`] occurrence.
#[must_use]
pub fn substitute(t: &Term, arguments: &[Term]) -> Term {
    replace_in_term(t, substitute_with(arguments))
}

#[must_use]
pub fn substitute_sort(sort: &Sort, arguments: &[Term]) -> Sort {
    replace_in_sort(sort, substitute_with(arguments))
}

/// Removes the `count` innermost binders from the scope of the term.
/// Fails if any of the removed variables occur.
fn strengthen_by(count: u32) -> impl FnMut(&Term, DeBruijnOffset) -> Result<ReplaceResult, ()> {
    move |t, offset| match t {
        Term::Local(local) if local.index.value() >= offset.value() => {
            if local.index.value() - offset.value() < count {
                Err(())
            } else {
                Ok(ReplaceResult::ReplaceWith(Term::local(
                    local.index.value() - count,
                )))
            }
        }
        _ => Ok(ReplaceResult::Skip),
    }
}

pub fn strengthen(t: &Term, count: u32) -> Option<Term> {
    try_replace_in_term(t, DeBruijnOffset::zero(), &mut strengthen_by(count)).ok()
}

pub fn strengthen_sort(sort: &Sort, count: u32) -> Option<Sort> {
    try_replace_in_sort(sort, DeBruijnOffset::zero(), &mut strengthen_by(count)).ok()
}

/// Returns true if any sub-term satisfies the predicate.
/// Placeholder sorts in type annotations are presented to the predicate as [`Term::Sort`].
pub fn find_in_term(t: &Term, predicate: &mut impl FnMut(&Term) -> bool) -> bool {
    if predicate(t) {
        return true;
    }
    match t {
        Term::Local(_) | Term::Inst(_) => false,
        Term::Apply(apply) => {
            find_in_term(&apply.function, predicate) || find_in_term(&apply.argument, predicate)
        }
        Term::Pi(pi) => {
            find_in_type(&pi.domain.ty, predicate) || find_in_type(&pi.codomain, predicate)
        }
        Term::Sort(sort) => find_in_sort(sort, predicate),
        Term::Level(level) => find_in_level(level, predicate),
        Term::Metavariable(meta) => meta
            .arguments
            .iter()
            .any(|argument| find_in_term(argument, predicate)),
    }
}

pub fn find_in_type(ty: &Type, predicate: &mut impl FnMut(&Term) -> bool) -> bool {
    find_in_sort(&ty.sort, predicate) || find_in_term(&ty.term, predicate)
}

pub fn find_in_sort(sort: &Sort, predicate: &mut impl FnMut(&Term) -> bool) -> bool {
    match sort {
        Sort::Prop | Sort::SizeUniv | Sort::Omega => false,
        Sort::Type(level) => find_in_level(level, predicate),
        Sort::Meta(meta) => {
            predicate(&Term::Sort(sort.clone()))
                || meta
                    .arguments
                    .iter()
                    .any(|argument| find_in_term(argument, predicate))
        }
    }
}

fn find_in_level(level: &Level, predicate: &mut impl FnMut(&Term) -> bool) -> bool {
    level
        .atoms
        .iter()
        .any(|atom| find_in_term(&atom.term, predicate))
}

fn is_placeholder(t: &Term) -> bool {
    matches!(t, Term::Metavariable(_) | Term::Sort(Sort::Meta(_)))
}

fn is_occurrence_of(meta: MetaId) -> impl FnMut(&Term) -> bool {
    move |t| match t {
        Term::Metavariable(occurrence) | Term::Sort(Sort::Meta(occurrence)) => {
            occurrence.index == meta
        }
        _ => false,
    }
}

pub fn contains_metavariables(t: &Term) -> bool {
    find_in_term(t, &mut is_placeholder)
}

/// Returns true if the placeholder `meta` occurs anywhere in `t`, including inside sorts.
pub fn occurs_meta(t: &Term, meta: MetaId) -> bool {
    find_in_term(t, &mut is_occurrence_of(meta))
}

pub fn occurs_meta_in_sort(sort: &Sort, meta: MetaId) -> bool {
    find_in_sort(sort, &mut is_occurrence_of(meta))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instantiate_lowers_outer_variables() {
        // #0 #1 [#0 := #5] = #5 #0
        let body = Term::local(0).apply(Term::local(1), ArgInfo::explicit());
        assert_eq!(
            instantiate(&body, &Term::local(5)),
            Term::local(5).apply(Term::local(0), ArgInfo::explicit())
        );
    }

    #[test]
    fn lift_respects_cutoff() {
        let term = Term::local(0).apply(Term::local(2), ArgInfo::explicit());
        assert_eq!(
            lift_free_vars(&term, 3, 1),
            Term::local(0).apply(Term::local(5), ArgInfo::explicit())
        );
    }

    #[test]
    fn strengthen_fails_on_removed_variables() {
        assert_eq!(strengthen(&Term::local(2), 2), Some(Term::local(0)));
        assert_eq!(strengthen(&Term::local(1), 2), None);
    }

    #[test]
    fn substitution_is_parallel() {
        let term = Term::local(0).apply(Term::local(1), ArgInfo::explicit());
        let result = substitute(&term, &[Term::local(1), Term::local(0)]);
        assert_eq!(
            result,
            Term::local(1).apply(Term::local(0), ArgInfo::explicit())
        );
    }
}
