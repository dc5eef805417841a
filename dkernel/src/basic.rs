//! Basic objects shared by every part of the kernel: names, de Bruijn indices, and argument annotations.

use std::{fmt::Display, ops::Add};

use dcommon::{Intern, Path, Str};
use serde::{Deserialize, Serialize};

/// A name for a local variable or binder.
/// The name `_` is used for anonymous binders.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(pub Str);

impl Name {
    pub fn new(db: &dyn Intern, text: &str) -> Self {
        Self(Str::new(db, text))
    }

    pub fn text(self, db: &dyn Intern) -> String {
        self.0.lookup(db)
    }
}

/// The fully qualified name of a global declaration.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QualifiedName(pub Path);

impl QualifiedName {
    pub fn new(db: &dyn Intern, text: &str) -> Self {
        Self(Path::parse(db, text))
    }

    pub fn display(self, db: &dyn Intern) -> String {
        self.0.display(db)
    }
}

/// A de Bruijn index, counting binders outward from the use site.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeBruijnIndex(u32);

impl Display for DeBruijnIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl DeBruijnIndex {
    /// Constructs a de Bruijn index explicitly.
    /// Prefer [`Self::zero`] and [`Self::succ`] where possible.
    pub fn new(idx: u32) -> Self {
        Self(idx)
    }

    /// The lowest de Bruijn index.
    pub fn zero() -> DeBruijnIndex {
        Self(0)
    }

    /// The next (higher) de Bruijn index.
    pub fn succ(self) -> DeBruijnIndex {
        Self(self.0 + 1)
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

/// The number of binders a sub-term sits under, relative to where a traversal started.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeBruijnOffset(u32);

impl DeBruijnOffset {
    /// The zero offset.
    pub fn zero() -> DeBruijnOffset {
        Self(0)
    }

    /// Increase the offset by one.
    pub fn succ(self) -> DeBruijnOffset {
        Self(self.0 + 1)
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Add<DeBruijnOffset> for DeBruijnIndex {
    type Output = DeBruijnIndex;

    fn add(self, rhs: DeBruijnOffset) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

/// How should the argument to this function be given?
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BinderAnnotation {
    /// The argument is to be given explicitly.
    #[default]
    Explicit,
    /// The argument is implicit, and is to be filled eagerly by the elaborator.
    Implicit,
    /// The argument is implicit, and is to be filled by instance search.
    Instance,
}

/// Whether a value may influence computation.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Relevance {
    #[default]
    Relevant,
    /// Used only in types, never inspected at runtime.
    NonStrict,
    /// Ignored entirely by conversion.
    Irrelevant,
}

/// The annotations carried by a binder and by the application that fills it.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArgInfo {
    #[serde(default)]
    pub annotation: BinderAnnotation,
    #[serde(default)]
    pub relevance: Relevance,
}

impl ArgInfo {
    pub fn explicit() -> Self {
        Self::default()
    }

    pub fn implicit() -> Self {
        Self {
            annotation: BinderAnnotation::Implicit,
            relevance: Relevance::Relevant,
        }
    }

    pub fn is_irrelevant(self) -> bool {
        self.relevance == Relevance::Irrelevant
    }
}

/// Whether a datatype is inductive or coinductive.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Induction {
    #[default]
    Inductive,
    CoInductive,
}

/// Whether a constructor argument is determined by the constructor's target indices.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IsForced {
    Forced,
    NotForced,
}
