//! Definitional equality, the sort order, and placeholder solving.
//!
//! The datatype checker only talks to conversion through the [`Conversion`] trait.
//! [`Unifier`] is the implementation used by default: it compares weak head normal forms
//! structurally, solves placeholders whose arguments are distinct variables by inversion,
//! and postpones every other problem that mentions an unsolved placeholder.

use std::collections::BTreeMap;

use tracing::debug;

use crate::{
    basic::*,
    signature::{DefinitionKind, FunctionDefinition},
    sort::{Level, LevelAtom, Sort},
    state::*,
    term::*,
    traverse::*,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    UnequalTerms { left: Term, right: Term },
    UnequalSorts { left: Sort, right: Sort },
    SortNotBelow { left: Sort, right: Sort },
    UnequalLevels { left: Level, right: Level },
    LevelNotBelow { left: Level, right: Level },
    /// Solving the placeholder would make it refer to itself.
    OccursCheck { meta: MetaId },
    /// The solution would mention a variable the placeholder cannot see.
    OutOfScope { meta: MetaId, variable: u32 },
    /// A sort placeholder that must stay below `Omega` was equated with `Omega`.
    SortCeiling { meta: MetaId, sort: Sort },
    ExpectedFunctionType(Term),
    ExpectedSort(Term),
    AnnotationMismatch {
        expected: BinderAnnotation,
        found: BinderAnnotation,
    },
    UnknownConstant(QualifiedName),
}

/// Short for "inference result".
pub type Ir<T> = Result<T, ConversionError>;

/// Every operation takes the length of the context its terms live in as `depth`,
/// which is recorded alongside postponed constraints.
pub trait Conversion {
    /// Reduces a term to weak head normal form, instantiating solved placeholders.
    fn reduce(&self, state: &State, term: &Term) -> Term;
    fn reduce_sort(&self, state: &State, sort: &Sort) -> Sort;

    /// Fully normalises a term.
    fn normalise(&self, state: &State, term: &Term) -> Term;
    fn normalise_sort(&self, state: &State, sort: &Sort) -> Sort;

    fn normalise_type(&self, state: &State, ty: &Type) -> Type {
        Type {
            sort: self.normalise_sort(state, &ty.sort),
            term: self.normalise(state, &ty.term),
        }
    }

    fn equal_term(&self, state: &mut State, depth: usize, left: &Term, right: &Term) -> Ir<()>;

    fn equal_type(&self, state: &mut State, depth: usize, left: &Type, right: &Type) -> Ir<()> {
        self.equal_term(state, depth, &left.term, &right.term)
    }

    fn equal_sort(&self, state: &mut State, depth: usize, left: &Sort, right: &Sort) -> Ir<()>;

    /// Checks `left <= right` in the sort order.
    fn leq_sort(&self, state: &mut State, depth: usize, left: &Sort, right: &Sort) -> Ir<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Unifier;

/// If every argument is a distinct variable, maps each variable to its position.
fn pattern_inverse(arguments: &[Term]) -> Option<BTreeMap<u32, u32>> {
    let mut inverse = BTreeMap::new();
    for (position, argument) in arguments.iter().enumerate() {
        match argument {
            Term::Local(local) => {
                if inverse
                    .insert(local.index.value(), position as u32)
                    .is_some()
                {
                    return None;
                }
            }
            _ => return None,
        }
    }
    Some(inverse)
}

/// Rewrites a term from the scope of a placeholder occurrence into the placeholder's creation scope.
fn inversion(
    inverse: &BTreeMap<u32, u32>,
    meta: MetaId,
) -> impl FnMut(&Term, DeBruijnOffset) -> Ir<ReplaceResult> + '_ {
    move |t, offset| match t {
        Term::Local(local) if local.index.value() >= offset.value() => {
            let variable = local.index.value() - offset.value();
            match inverse.get(&variable) {
                Some(position) => Ok(ReplaceResult::ReplaceWith(Term::local(
                    position + offset.value(),
                ))),
                None => Err(ConversionError::OutOfScope { meta, variable }),
            }
        }
        _ => Ok(ReplaceResult::Skip),
    }
}

impl Unifier {
    /// Performs one head step: instantiates a solved placeholder or unfolds a function
    /// applied to at least as many arguments as its arity.
    fn unfold_head(&self, state: &State, term: &Term) -> Option<Term> {
        let (head, arguments) = term.destructure_as_nary_application();
        match head {
            Term::Metavariable(meta) => match state.metas.solution(meta.index) {
                Some(MetaSolution::Term(solution)) => Some(create_nary_application(
                    substitute(solution, &meta.arguments),
                    arguments
                        .into_iter()
                        .map(|(info, argument)| (info, argument.clone())),
                )),
                _ => None,
            },
            Term::Inst(name) => match state.signature.get(*name).map(|def| &def.kind) {
                Some(DefinitionKind::Function(FunctionDefinition {
                    arity,
                    body: Some(body),
                })) if arguments.len() >= *arity as usize => {
                    let (now, later) = arguments.split_at(*arity as usize);
                    let substitution = now
                        .iter()
                        .rev()
                        .map(|(_, argument)| (*argument).clone())
                        .collect::<Vec<_>>();
                    Some(create_nary_application(
                        substitute(body, &substitution),
                        later
                            .iter()
                            .map(|(info, argument)| (*info, (*argument).clone())),
                    ))
                }
                _ => None,
            },
            _ => None,
        }
    }

    fn reduce_level(&self, state: &State, level: &Level) -> Level {
        level
            .atoms
            .iter()
            .fold(Level::constant(level.constant), |acc, atom| {
                let reduced = match self.reduce(state, &atom.term) {
                    Term::Level(inner) => inner.raise(atom.offset),
                    term => Level {
                        constant: 0,
                        atoms: vec![LevelAtom {
                            term,
                            offset: atom.offset,
                        }],
                    },
                };
                acc.join(&reduced)
            })
    }

    fn normalise_level(&self, state: &State, level: &Level) -> Level {
        let level = self.reduce_level(state, level);
        Level {
            constant: level.constant,
            atoms: level
                .atoms
                .iter()
                .map(|atom| LevelAtom {
                    term: self.normalise(state, &atom.term),
                    offset: atom.offset,
                })
                .collect(),
        }
        .canonicalise()
    }

    fn postpone(&self, state: &mut State, depth: usize, kind: ConstraintKind) {
        debug!(?kind, "postponing constraint");
        state.postpone(Constraint { depth, kind });
    }

    fn assign_term(
        &self,
        state: &mut State,
        depth: usize,
        meta: &Metavariable,
        value: &Term,
    ) -> Ir<()> {
        let postponed = ConstraintKind::EqualTerms(Term::Metavariable(meta.clone()), value.clone());
        if matches!(value, Term::Metavariable(other) if other.index == meta.index) {
            self.postpone(state, depth, postponed);
            return Ok(());
        }
        let inverse = match pattern_inverse(&meta.arguments) {
            Some(inverse) => inverse,
            None => {
                self.postpone(state, depth, postponed);
                return Ok(());
            }
        };
        let value = self.normalise(state, value);
        if occurs_meta(&value, meta.index) {
            return Err(ConversionError::OccursCheck { meta: meta.index });
        }
        let solution = try_replace_in_term(
            &value,
            DeBruijnOffset::zero(),
            &mut inversion(&inverse, meta.index),
        )?;
        #[cfg(feature = "checker_diagnostics")]
        tracing::trace!("solved {} := {:?}", meta.index, solution);
        state.metas.solve(meta.index, MetaSolution::Term(solution));
        Ok(())
    }

    fn assign_sort(
        &self,
        state: &mut State,
        depth: usize,
        meta: &Metavariable,
        value: &Sort,
    ) -> Ir<()> {
        let postponed = ConstraintKind::EqualSorts(Sort::Meta(meta.clone()), value.clone());
        if matches!(value, Sort::Meta(other) if other.index == meta.index) {
            self.postpone(state, depth, postponed);
            return Ok(());
        }
        if let Some(MetaEntry {
            kind: MetaKind::Sort { below_omega: true },
            ..
        }) = state.metas.get(meta.index)
        {
            if *value == Sort::Omega {
                return Err(ConversionError::SortCeiling {
                    meta: meta.index,
                    sort: value.clone(),
                });
            }
        }
        let inverse = match pattern_inverse(&meta.arguments) {
            Some(inverse) => inverse,
            None => {
                self.postpone(state, depth, postponed);
                return Ok(());
            }
        };
        let value = self.normalise_sort(state, value);
        if occurs_meta_in_sort(&value, meta.index) {
            return Err(ConversionError::OccursCheck { meta: meta.index });
        }
        let solution = try_replace_in_sort(
            &value,
            DeBruijnOffset::zero(),
            &mut inversion(&inverse, meta.index),
        )?;
        #[cfg(feature = "checker_diagnostics")]
        tracing::trace!("solved {} := {:?}", meta.index, solution);
        state.metas.solve(meta.index, MetaSolution::Sort(solution));
        Ok(())
    }

    fn equal_level(&self, state: &mut State, depth: usize, left: &Level, right: &Level) -> Ir<()> {
        let left = self.normalise_level(state, left);
        let right = self.normalise_level(state, right);
        if left == right {
            return Ok(());
        }
        if let Some(meta) = left.as_placeholder() {
            return self.assign_term(state, depth, meta, &Term::Level(right.clone()));
        }
        if let Some(meta) = right.as_placeholder() {
            return self.assign_term(state, depth, meta, &Term::Level(left.clone()));
        }
        if left.has_placeholders() || right.has_placeholders() {
            self.postpone(
                state,
                depth,
                ConstraintKind::EqualTerms(Term::Level(left), Term::Level(right)),
            );
            return Ok(());
        }
        Err(ConversionError::UnequalLevels { left, right })
    }

    fn leq_level(&self, state: &mut State, depth: usize, left: &Level, right: &Level) -> Ir<()> {
        let left = self.normalise_level(state, left);
        let right = self.normalise_level(state, right);
        if left.syntactically_below(&right) {
            return Ok(());
        }
        if left.has_placeholders() || right.has_placeholders() {
            self.postpone(
                state,
                depth,
                ConstraintKind::LeqSorts(Sort::Type(left), Sort::Type(right)),
            );
            return Ok(());
        }
        Err(ConversionError::LevelNotBelow { left, right })
    }
}

impl Conversion for Unifier {
    fn reduce(&self, state: &State, term: &Term) -> Term {
        let mut current = term.clone();
        while let Some(next) = self.unfold_head(state, &current) {
            current = next;
        }
        match current {
            Term::Sort(sort) => Term::Sort(self.reduce_sort(state, &sort)),
            Term::Level(level) => Term::Level(self.reduce_level(state, &level)),
            other => other,
        }
    }

    fn reduce_sort(&self, state: &State, sort: &Sort) -> Sort {
        match sort {
            Sort::Meta(meta) => match state.metas.solution(meta.index) {
                Some(MetaSolution::Sort(solution)) => {
                    self.reduce_sort(state, &substitute_sort(solution, &meta.arguments))
                }
                _ => sort.clone(),
            },
            Sort::Type(level) => Sort::Type(self.reduce_level(state, level)),
            Sort::Prop | Sort::SizeUniv | Sort::Omega => sort.clone(),
        }
    }

    fn normalise(&self, state: &State, term: &Term) -> Term {
        match self.reduce(state, term) {
            t @ (Term::Local(_) | Term::Inst(_)) => t,
            Term::Apply(apply) => Term::Apply(Apply {
                function: Box::new(self.normalise(state, &apply.function)),
                argument: Box::new(self.normalise(state, &apply.argument)),
                info: apply.info,
            }),
            Term::Pi(pi) => Term::Pi(Pi {
                domain: Box::new(Domain {
                    name: pi.domain.name,
                    info: pi.domain.info,
                    ty: self.normalise_type(state, &pi.domain.ty),
                }),
                codomain: Box::new(self.normalise_type(state, &pi.codomain)),
            }),
            Term::Sort(sort) => Term::Sort(self.normalise_sort(state, &sort)),
            Term::Level(level) => Term::Level(self.normalise_level(state, &level)),
            Term::Metavariable(meta) => Term::Metavariable(Metavariable {
                index: meta.index,
                arguments: meta
                    .arguments
                    .iter()
                    .map(|argument| self.normalise(state, argument))
                    .collect(),
            }),
        }
    }

    fn normalise_sort(&self, state: &State, sort: &Sort) -> Sort {
        match self.reduce_sort(state, sort) {
            Sort::Type(level) => Sort::Type(self.normalise_level(state, &level)),
            Sort::Meta(meta) => Sort::Meta(Metavariable {
                index: meta.index,
                arguments: meta
                    .arguments
                    .iter()
                    .map(|argument| self.normalise(state, argument))
                    .collect(),
            }),
            other => other,
        }
    }

    fn equal_term(&self, state: &mut State, depth: usize, left: &Term, right: &Term) -> Ir<()> {
        let left = self.reduce(state, left);
        let right = self.reduce(state, right);
        #[cfg(feature = "checker_diagnostics")]
        tracing::trace!("comparing {:?} =?= {:?}", left, right);
        if left == right {
            return Ok(());
        }

        match (&left, &right) {
            (Term::Metavariable(meta), _) => self.assign_term(state, depth, meta, &right),
            (_, Term::Metavariable(meta)) => self.assign_term(state, depth, meta, &left),
            (Term::Level(_), _) | (_, Term::Level(_)) => self.equal_level(
                state,
                depth,
                &Level::atom(left.clone()),
                &Level::atom(right.clone()),
            ),
            (Term::Sort(left), Term::Sort(right)) => self.equal_sort(state, depth, left, right),
            (Term::Pi(left_pi), Term::Pi(right_pi)) => {
                if left_pi.domain.info.annotation != right_pi.domain.info.annotation {
                    return Err(ConversionError::UnequalTerms {
                        left: left.clone(),
                        right: right.clone(),
                    });
                }
                self.equal_type(state, depth, &left_pi.domain.ty, &right_pi.domain.ty)?;
                self.equal_type(state, depth + 1, &left_pi.codomain, &right_pi.codomain)
            }
            (Term::Apply(_), Term::Apply(_)) => {
                let (left_head, left_arguments) = left.destructure_as_nary_application();
                let (right_head, right_arguments) = right.destructure_as_nary_application();
                if matches!(left_head, Term::Metavariable(_))
                    || matches!(right_head, Term::Metavariable(_))
                {
                    self.postpone(
                        state,
                        depth,
                        ConstraintKind::EqualTerms(left.clone(), right.clone()),
                    );
                    return Ok(());
                }
                if left_arguments.len() != right_arguments.len() {
                    return Err(ConversionError::UnequalTerms {
                        left: left.clone(),
                        right: right.clone(),
                    });
                }
                self.equal_term(state, depth, left_head, right_head)?;
                for ((info, left_argument), (_, right_argument)) in
                    left_arguments.iter().zip(&right_arguments)
                {
                    if info.is_irrelevant() {
                        continue;
                    }
                    self.equal_term(state, depth, left_argument, right_argument)?;
                }
                Ok(())
            }
            _ => Err(ConversionError::UnequalTerms {
                left: left.clone(),
                right: right.clone(),
            }),
        }
    }

    fn equal_sort(&self, state: &mut State, depth: usize, left: &Sort, right: &Sort) -> Ir<()> {
        let left = self.reduce_sort(state, left);
        let right = self.reduce_sort(state, right);
        if left == right {
            return Ok(());
        }
        match (&left, &right) {
            (Sort::Meta(meta), _) => self.assign_sort(state, depth, meta, &right),
            (_, Sort::Meta(meta)) => self.assign_sort(state, depth, meta, &left),
            (Sort::Type(left), Sort::Type(right)) => self.equal_level(state, depth, left, right),
            _ => Err(ConversionError::UnequalSorts {
                left: left.clone(),
                right: right.clone(),
            }),
        }
    }

    fn leq_sort(&self, state: &mut State, depth: usize, left: &Sort, right: &Sort) -> Ir<()> {
        let left = self.normalise_sort(state, left);
        let right = self.normalise_sort(state, right);
        if left == right {
            return Ok(());
        }
        match (&left, &right) {
            (Sort::Meta(_), _) | (_, Sort::Meta(_)) => {
                self.postpone(
                    state,
                    depth,
                    ConstraintKind::LeqSorts(left.clone(), right.clone()),
                );
                Ok(())
            }
            (Sort::SizeUniv, _) | (_, Sort::SizeUniv) => Err(ConversionError::SortNotBelow {
                left: left.clone(),
                right: right.clone(),
            }),
            (_, Sort::Omega) | (Sort::Prop, Sort::Type(_)) => Ok(()),
            (Sort::Type(left), Sort::Type(right)) => self.leq_level(state, depth, left, right),
            _ => Err(ConversionError::SortNotBelow {
                left: left.clone(),
                right: right.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    #[test]
    fn pattern_placeholders_are_solved_by_inversion() {
        with_tcm(|tcm| {
            let db = tcm.db();
            let nat = Term::Inst(QualifiedName::new(db, "Level"));
            // ?m[#1, #0] =?= #0 solves ?m := #1 in its own scope.
            let meta = tcm.state.metas.fresh(2, MetaKind::Term { ty: nat });
            let occurrence = Term::Metavariable(Metavariable {
                index: meta,
                arguments: vec![Term::local(1), Term::local(0)],
            });
            Unifier
                .equal_term(&mut tcm.state, 2, &occurrence, &Term::local(0))
                .unwrap();
            assert_eq!(
                tcm.state.metas.solution(meta),
                Some(&MetaSolution::Term(Term::local(1)))
            );
            assert_eq!(Unifier.reduce(&tcm.state, &occurrence), Term::local(0));
        });
    }

    #[test]
    fn out_of_scope_solutions_are_rejected() {
        with_tcm(|tcm| {
            let meta = tcm.state.metas.fresh(0, MetaKind::Sort { below_omega: true });
            let occurrence = Sort::Meta(Metavariable {
                index: meta,
                arguments: Vec::new(),
            });
            let dependent = Sort::Type(Level::atom(Term::local(0)));
            assert_eq!(
                Unifier.equal_sort(&mut tcm.state, 1, &occurrence, &dependent),
                Err(ConversionError::OutOfScope { meta, variable: 0 })
            );
            assert_eq!(
                Unifier.equal_sort(&mut tcm.state, 0, &occurrence, &Sort::Omega),
                Err(ConversionError::SortCeiling {
                    meta,
                    sort: Sort::Omega
                })
            );
        });
    }

    #[test]
    fn non_patterns_are_postponed() {
        with_tcm(|tcm| {
            let level = Term::Inst(tcm.state.builtins.level);
            let meta = tcm.state.metas.fresh(2, MetaKind::Term { ty: level });
            let occurrence = Term::Metavariable(Metavariable {
                index: meta,
                arguments: vec![Term::local(0), Term::local(0)],
            });
            Unifier
                .equal_term(&mut tcm.state, 2, &occurrence, &Term::local(1))
                .unwrap();
            assert!(tcm.state.metas.solution(meta).is_none());
            assert_eq!(tcm.state.constraints.len(), 1);
        });
    }

    #[test]
    fn sort_order() {
        with_tcm(|tcm| {
            let set0 = Sort::type_n(0);
            let set1 = Sort::type_n(1);
            assert!(Unifier.leq_sort(&mut tcm.state, 0, &Sort::Prop, &set0).is_ok());
            assert!(Unifier.leq_sort(&mut tcm.state, 0, &set0, &set1).is_ok());
            assert!(Unifier.leq_sort(&mut tcm.state, 0, &set1, &set0).is_err());
            assert!(Unifier.leq_sort(&mut tcm.state, 0, &set1, &Sort::Omega).is_ok());
            assert!(Unifier.leq_sort(&mut tcm.state, 0, &Sort::SizeUniv, &set1).is_err());
            assert!(Unifier
                .leq_sort(&mut tcm.state, 0, &Sort::SizeUniv, &Sort::SizeUniv)
                .is_ok());
            assert!(Unifier.leq_sort(&mut tcm.state, 0, &set0, &Sort::Prop).is_err());
        });
    }
}
