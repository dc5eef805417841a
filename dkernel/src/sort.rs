//! Universe levels and sorts.
//!
//! A [`Level`] is kept in a canonical form `max(c, t1 + k1, ..., tn + kn)`, so that
//! syntactic equality of normalised levels coincides with equality in the level algebra
//! for levels without placeholders.

use crate::term::{Metavariable, Term};

/// A level term `t` raised by a constant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LevelAtom {
    /// A neutral term of type `Level`, such as a variable or placeholder.
    pub term: Term,
    pub offset: u32,
}

/// `max(constant, atoms...)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level {
    pub constant: u32,
    /// Sorted by term, with at most one atom per term.
    pub atoms: Vec<LevelAtom>,
}

impl Level {
    pub fn constant(constant: u32) -> Self {
        Self {
            constant,
            atoms: Vec::new(),
        }
    }

    pub fn zero() -> Self {
        Self::constant(0)
    }

    /// The level `term`, which must have type `Level`.
    pub fn atom(term: Term) -> Self {
        match term {
            Term::Level(level) => level,
            term => Self {
                constant: 0,
                atoms: vec![LevelAtom { term, offset: 0 }],
            },
        }
    }

    #[must_use]
    pub fn succ(&self) -> Self {
        self.raise(1)
    }

    /// Adds `by` to every component of this level.
    #[must_use]
    pub fn raise(&self, by: u32) -> Self {
        Self {
            constant: if self.atoms.is_empty() || self.constant > 0 {
                self.constant + by
            } else {
                0
            },
            atoms: self
                .atoms
                .iter()
                .map(|atom| LevelAtom {
                    term: atom.term.clone(),
                    offset: atom.offset + by,
                })
                .collect(),
        }
        .canonicalise()
    }

    #[must_use]
    pub fn join(&self, other: &Level) -> Self {
        Self {
            constant: self.constant.max(other.constant),
            atoms: self
                .atoms
                .iter()
                .chain(&other.atoms)
                .cloned()
                .collect(),
        }
        .canonicalise()
    }

    /// Sorts the atoms, merges atoms over the same term, and drops a constant
    /// that is dominated by some atom.
    #[must_use]
    pub fn canonicalise(mut self) -> Self {
        self.atoms.sort();
        let mut atoms: Vec<LevelAtom> = Vec::with_capacity(self.atoms.len());
        for atom in self.atoms {
            match atoms.last_mut() {
                Some(last) if last.term == atom.term => last.offset = last.offset.max(atom.offset),
                _ => atoms.push(atom),
            }
        }
        let largest_offset = atoms.iter().map(|atom| atom.offset).max();
        if largest_offset.map_or(false, |offset| self.constant <= offset) {
            self.constant = 0;
        }
        Self {
            constant: self.constant,
            atoms,
        }
    }

    pub fn as_constant(&self) -> Option<u32> {
        if self.atoms.is_empty() {
            Some(self.constant)
        } else {
            None
        }
    }

    /// If this level is exactly one unsolved placeholder, return it.
    pub fn as_placeholder(&self) -> Option<&Metavariable> {
        match self.atoms.as_slice() {
            [LevelAtom {
                term: Term::Metavariable(meta),
                offset: 0,
            }] if self.constant == 0 => Some(meta),
            _ => None,
        }
    }

    pub fn has_placeholders(&self) -> bool {
        self.atoms
            .iter()
            .any(|atom| crate::traverse::contains_metavariables(&atom.term))
    }

    /// Decides `self <= other` syntactically on canonical levels.
    /// A `false` answer is only definitive if neither side has placeholders.
    pub fn syntactically_below(&self, other: &Level) -> bool {
        let other_offset = other.atoms.iter().map(|atom| atom.offset).max();
        let constant_fits = self.constant <= other.constant
            || other_offset.map_or(false, |offset| self.constant <= offset);
        constant_fits
            && self.atoms.iter().all(|atom| {
                other
                    .atoms
                    .iter()
                    .any(|bound| bound.term == atom.term && atom.offset <= bound.offset)
            })
    }
}

/// A universe.
///
/// The sorts are ordered as `Prop <= Type ℓ` for every `ℓ`, `Type ℓ <= Type ℓ'` whenever `ℓ <= ℓ'`,
/// and everything except `SizeUniv` lies below `Omega`. `SizeUniv` is only comparable with itself.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sort {
    Prop,
    Type(Level),
    /// The sort of `Size`.
    SizeUniv,
    /// The sort of sorts that depend on their arguments in an unbounded way.
    Omega,
    /// A placeholder standing for a sort.
    Meta(Metavariable),
}

impl Sort {
    pub fn type_n(level: u32) -> Self {
        Sort::Type(Level::constant(level))
    }

    /// The sort of the type `self`.
    pub fn univ_sort(&self) -> Sort {
        match self {
            Sort::Prop => Sort::type_n(0),
            Sort::Type(level) => Sort::Type(level.succ()),
            Sort::SizeUniv | Sort::Omega | Sort::Meta(_) => Sort::Omega,
        }
    }

    pub fn is_prop(&self) -> bool {
        matches!(self, Sort::Prop)
    }
}

/// The sort of a function type with the given domain and codomain sorts.
/// `codomain` is `None` if the codomain sort depends on the bound variable.
/// Returns `None` if a placeholder blocks the computation.
pub fn pi_sort(domain: &Sort, codomain: Option<&Sort>) -> Option<Sort> {
    let codomain = match codomain {
        Some(codomain) => codomain,
        None => return Some(Sort::Omega),
    };
    match (domain, codomain) {
        (Sort::Meta(_), _) | (_, Sort::Meta(_)) => None,
        (Sort::Omega, _) | (_, Sort::Omega) => Some(Sort::Omega),
        (_, Sort::Prop) => Some(Sort::Prop),
        (_, Sort::SizeUniv) => Some(Sort::SizeUniv),
        (Sort::Prop | Sort::SizeUniv, codomain) => Some(codomain.clone()),
        (Sort::Type(left), Sort::Type(right)) => Some(Sort::Type(left.join(right))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_levels_absorb_constants() {
        let l = Level::atom(Term::local(0));
        assert_eq!(l.join(&Level::constant(0)), l);
        assert_eq!(l.succ().join(&Level::constant(1)), l.succ());
        assert_eq!(
            l.join(&Level::constant(2)).constant,
            2,
            "a constant above every atom survives"
        );
        assert_eq!(l.join(&l.succ()), l.succ());
    }

    #[test]
    fn owned_levels_join_rather_than_compare() {
        let constant = Level::constant(3);
        let atom = Level::atom(Term::local(0));
        let joined = constant.clone().join(&atom);
        assert_eq!(joined.constant, 3);
        assert_eq!(joined.as_constant(), None);
        assert_eq!(joined, atom.join(&constant));
    }

    #[test]
    fn syntactic_level_order() {
        let l = Level::atom(Term::local(0));
        assert!(Level::zero().syntactically_below(&l));
        assert!(l.syntactically_below(&l.succ()));
        assert!(!l.succ().syntactically_below(&l));
        assert!(Level::constant(1).syntactically_below(&l.succ()));
        assert!(!Level::constant(2).syntactically_below(&l.succ()));
    }

    #[test]
    fn pi_sorts() {
        let set0 = Sort::type_n(0);
        let set1 = Sort::type_n(1);
        assert_eq!(pi_sort(&set1, Some(&set0)), Some(set1.clone()));
        assert_eq!(pi_sort(&set1, Some(&Sort::Prop)), Some(Sort::Prop));
        assert_eq!(pi_sort(&Sort::Prop, Some(&set0)), Some(set0.clone()));
        assert_eq!(pi_sort(&Sort::SizeUniv, Some(&set0)), Some(set0));
        assert_eq!(pi_sort(&set1, None), Some(Sort::Omega));
    }
}
