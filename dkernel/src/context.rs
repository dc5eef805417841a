use crate::{
    basic::*,
    term::{Domain, Term, Type},
    traverse::lift_type,
};

/// The local variables in scope, outermost first.
/// Each entry's type lives in the scope of the entries before it.
#[derive(Debug, Clone, Default)]
pub struct Context {
    entries: Vec<Domain>,
}

impl Context {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, domain: Domain) {
        self.entries.push(domain);
    }

    pub fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }

    /// The binder referred to by the given de Bruijn index.
    pub fn entry(&self, index: DeBruijnIndex) -> Option<&Domain> {
        let position = self.entries.len().checked_sub(index.value() as usize + 1)?;
        self.entries.get(position)
    }

    /// The type of the given variable, valid in the current scope.
    pub fn type_of(&self, index: DeBruijnIndex) -> Option<Type> {
        self.entry(index)
            .map(|domain| lift_type(&domain.ty, index.value() + 1, 0))
    }

    /// Finds the innermost variable with the given name.
    pub fn lookup(&self, name: Name) -> Option<DeBruijnIndex> {
        self.entries
            .iter()
            .rev()
            .position(|domain| domain.name == name)
            .map(|index| DeBruijnIndex::new(index as u32))
    }

    /// The variables of the current scope, as the substitution `i ↦ #i`.
    pub fn identity_arguments(&self) -> Vec<Term> {
        (0..self.entries.len() as u32).map(Term::local).collect()
    }
}
