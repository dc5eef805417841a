//! # Terms
//!
//! Terms are the kernel's internal syntax, using de Bruijn indices for local variables.
//! Every type is stored together with the sort it inhabits, see [`Type`].

use std::fmt::Display;

use crate::{
    basic::*,
    sort::{Level, Sort},
};

/// Use a bound local variable.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Local {
    /// The local variable to be used.
    pub index: DeBruijnIndex,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Apply {
    pub function: Box<Term>,
    pub argument: Box<Term>,
    /// Must agree with the annotation of the binder this argument fills.
    pub info: ArgInfo,
}

/// The binder of a dependent function type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Domain {
    pub name: Name,
    pub info: ArgInfo,
    pub ty: Type,
}

/// A dependent function type `(x : A) -> B`.
/// The codomain lives under one more binder than the domain.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pi {
    pub domain: Box<Domain>,
    pub codomain: Box<Type>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MetaId(u32);

impl MetaId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }
}

impl Display for MetaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "?{}", self.0)
    }
}

/// An occurrence of a placeholder, applied to a substitution for the variables of the scope
/// it was created in. `arguments[i]` is the image of the creation scope's variable `i`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Metavariable {
    pub index: MetaId,
    pub arguments: Vec<Term>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Term {
    Local(Local),
    /// A global declaration.
    Inst(QualifiedName),
    Apply(Apply),
    Pi(Pi),
    Sort(Sort),
    /// A universe level, of type `Level`.
    Level(Level),
    Metavariable(Metavariable),
}

/// A term that is used as a type, tagged with the sort it inhabits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Type {
    pub sort: Sort,
    pub term: Term,
}

impl Type {
    pub fn new(sort: Sort, term: Term) -> Self {
        Self { sort, term }
    }

    /// The type whose inhabitants are the types of sort `sort`.
    pub fn of_sort(sort: Sort) -> Self {
        Self {
            sort: sort.univ_sort(),
            term: Term::Sort(sort),
        }
    }
}

impl Term {
    pub fn local(index: u32) -> Self {
        Term::Local(Local {
            index: DeBruijnIndex::new(index),
        })
    }

    #[must_use]
    pub fn apply(self, argument: Term, info: ArgInfo) -> Self {
        Term::Apply(Apply {
            function: Box::new(self),
            argument: Box::new(argument),
            info,
        })
    }

    /// If this term is a function application, return the leftmost function in the call chain.
    /// For example, applying this function to `foo 1 2 3` returns `foo`.
    /// If this is not a function application, we interpret the term as a nullary function,
    /// and return the whole term.
    pub fn leftmost_function(&self) -> &Term {
        match self {
            Term::Apply(apply) => apply.function.leftmost_function(),
            _ => self,
        }
    }

    /// If this is a function application, return the list of arguments applied to the
    /// [leftmost function](Term::leftmost_function) of the term, in order.
    pub fn apply_args(&self) -> Vec<(ArgInfo, &Term)> {
        match self {
            Term::Apply(apply) => {
                let mut result = apply.function.apply_args();
                result.push((apply.info, &apply.argument));
                result
            }
            _ => Vec::new(),
        }
    }

    /// Returns the [`Term::leftmost_function`] of this term, and the list of [`Term::apply_args`]
    /// that were applied to it.
    pub fn destructure_as_nary_application(&self) -> (&Term, Vec<(ArgInfo, &Term)>) {
        (self.leftmost_function(), self.apply_args())
    }
}

/// Creates an n-ary function application chain from the given function and arguments.
#[must_use]
pub fn create_nary_application(
    function: Term,
    arguments: impl IntoIterator<Item = (ArgInfo, Term)>,
) -> Term {
    arguments
        .into_iter()
        .fold(function, |function, (info, argument)| {
            function.apply(argument, info)
        })
}
