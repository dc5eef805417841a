//! The mutable state of the checker.
//!
//! Every field is backed by a persistent data structure, so [`State`] is fast to clone.
//! A clone is a snapshot: restoring it undoes every registration, placeholder solution,
//! and postponed constraint made since.

use dcommon::Intern;
use rpds::{RedBlackTreeMap, Vector};

use crate::{
    basic::*,
    signature::{Definition, DefinitionKind, Signature},
    sort::Sort,
    term::*,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaKind {
    /// A placeholder for a term of the given type.
    /// The type lives in the placeholder's creation scope.
    Term { ty: Term },
    /// A placeholder for a sort. If `below_omega` is set, it may not be solved by `Omega`.
    Sort { below_omega: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaSolution {
    Term(Term),
    Sort(Sort),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaEntry {
    /// The length of the context the placeholder was created in.
    pub scope: usize,
    pub kind: MetaKind,
    /// Lives in the creation scope.
    pub solution: Option<MetaSolution>,
}

/// Every placeholder created so far, solved or not.
#[derive(Debug, Clone, Default)]
pub struct MetaStore {
    next: u32,
    entries: RedBlackTreeMap<MetaId, MetaEntry>,
}

impl MetaStore {
    pub fn fresh(&mut self, scope: usize, kind: MetaKind) -> MetaId {
        let id = MetaId::new(self.next);
        self.next += 1;
        self.entries.insert_mut(
            id,
            MetaEntry {
                scope,
                kind,
                solution: None,
            },
        );
        id
    }

    pub fn get(&self, id: MetaId) -> Option<&MetaEntry> {
        self.entries.get(&id)
    }

    pub fn solution(&self, id: MetaId) -> Option<&MetaSolution> {
        self.get(id)?.solution.as_ref()
    }

    /// # Panics
    /// If the placeholder does not exist or is already solved.
    pub fn solve(&mut self, id: MetaId, solution: MetaSolution) {
        let mut entry = match self.entries.get(&id) {
            Some(entry) => entry.clone(),
            None => panic!("placeholder {} does not exist", id),
        };
        assert!(entry.solution.is_none(), "placeholder {} solved twice", id);
        entry.solution = Some(solution);
        self.entries.insert_mut(id, entry);
    }

    pub fn unsolved(&self) -> impl Iterator<Item = MetaId> + '_ {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.solution.is_none())
            .map(|(id, _)| *id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintKind {
    EqualTerms(Term, Term),
    EqualSorts(Sort, Sort),
    LeqSorts(Sort, Sort),
}

/// A conversion problem that could not be decided yet because of unsolved placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    /// The length of the context both sides live in.
    pub depth: usize,
    pub kind: ConstraintKind,
}

/// The names of the primitive declarations every signature starts with.
#[derive(Debug, Copy, Clone)]
pub struct Builtins {
    /// `Level : Set`.
    pub level: QualifiedName,
    /// `Size : SizeUniv`.
    pub size: QualifiedName,
}

#[derive(Debug, Clone)]
pub struct State {
    pub signature: Signature,
    pub metas: MetaStore,
    pub constraints: Vector<Constraint>,
    /// Instance constructors, keyed by the datatype they construct.
    pub instances: RedBlackTreeMap<QualifiedName, Vector<QualifiedName>>,
    pub builtins: Builtins,
}

impl State {
    pub fn new(db: &dyn Intern) -> Self {
        let builtins = Builtins {
            level: QualifiedName::new(db, "Level"),
            size: QualifiedName::new(db, "Size"),
        };
        let mut signature = Signature::default();
        for (name, sort) in [
            (builtins.level, Sort::type_n(0)),
            (builtins.size, Sort::SizeUniv),
        ] {
            // The signature is empty, so registration cannot fail.
            let _ = signature.register(Definition {
                name,
                ty: Type::of_sort(sort),
                kind: DefinitionKind::Axiom,
            });
        }
        Self {
            signature,
            metas: MetaStore::default(),
            constraints: Vector::new(),
            instances: RedBlackTreeMap::new(),
            builtins,
        }
    }

    pub fn postpone(&mut self, constraint: Constraint) {
        self.constraints.push_back_mut(constraint);
    }

    pub fn add_instance(&mut self, datatype: QualifiedName, constructor: QualifiedName) {
        let mut constructors = self.instances.get(&datatype).cloned().unwrap_or_default();
        constructors.push_back_mut(constructor);
        self.instances.insert_mut(datatype, constructors);
    }

    pub fn instances_of(&self, datatype: QualifiedName) -> impl Iterator<Item = &QualifiedName> {
        self.instances.get(&datatype).into_iter().flat_map(|v| v.iter())
    }
}
