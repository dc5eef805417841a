//! The global signature: every declaration checked so far, keyed by qualified name.
//!
//! The signature is stored in a persistent map, so it is cheap to clone.
//! This is how failed declarations are rolled back, see [`crate::tcm::Tcm::speculate`].

use std::collections::BTreeSet;

use rpds::RedBlackTreeMap;

use crate::{
    basic::*,
    sort::Sort,
    term::{Term, Type},
};

/// A set of parameter positions, counted from zero at the outermost parameter.
pub type ParameterSet = BTreeSet<u32>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatatypeDefinition {
    pub parameters: u32,
    pub indices: u32,
    /// The sort of the datatype, valid under its parameters.
    pub sort: Sort,
    pub induction: Induction,
    pub constructors: Vec<QualifiedName>,
    /// Parameters whose type fits inside the datatype's sort.
    pub small_parameters: ParameterSet,
    /// Parameters that some constructor mentions in its target indices.
    pub non_linear_parameters: ParameterSet,
    /// Whether constructor arguments were checked against the datatype's sort.
    pub universe_check: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorDefinition {
    pub datatype: QualifiedName,
    pub parameters: u32,
    /// The number of constructor arguments, not counting parameters.
    pub arity: u32,
    pub induction: Induction,
    /// One entry per constructor argument.
    pub forced: Vec<IsForced>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDefinition {
    pub arity: u32,
    /// Abstract functions have no body and never unfold.
    /// The body lives under `arity` binders, the last argument being variable zero.
    pub body: Option<Term>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDefinition {
    pub induction: Option<Induction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionKind {
    /// A postulate.
    Axiom,
    Function(FunctionDefinition),
    /// A datatype whose type has been declared, but whose constructors have not been given yet.
    DataSignature,
    Datatype(DatatypeDefinition),
    Record(RecordDefinition),
    Constructor(ConstructorDefinition),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub name: QualifiedName,
    /// Closed.
    pub ty: Type,
    pub kind: DefinitionKind,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Phase {
    /// Registered while its own definition is being checked, so that it may refer to itself.
    Placeholder,
    Final,
}

#[derive(Debug, Clone)]
struct Entry {
    definition: Definition,
    phase: Phase,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    AlreadyDefined(QualifiedName),
    NotFound(QualifiedName),
    NotPlaceholder(QualifiedName),
}

#[derive(Debug, Clone, Default)]
pub struct Signature {
    entries: RedBlackTreeMap<QualifiedName, Entry>,
}

impl Signature {
    /// Adds a finished declaration.
    pub fn register(&mut self, definition: Definition) -> Result<(), SignatureError> {
        if self.entries.contains_key(&definition.name) {
            return Err(SignatureError::AlreadyDefined(definition.name));
        }
        self.entries.insert_mut(
            definition.name,
            Entry {
                definition,
                phase: Phase::Final,
            },
        );
        Ok(())
    }

    /// Adds a declaration that is still being checked.
    /// A data signature may be replaced by the placeholder of its datatype.
    pub fn register_placeholder(&mut self, definition: Definition) -> Result<(), SignatureError> {
        if let Some(entry) = self.entries.get(&definition.name) {
            if entry.phase != Phase::Final
                || entry.definition.kind != DefinitionKind::DataSignature
            {
                return Err(SignatureError::AlreadyDefined(definition.name));
            }
        }
        self.entries.insert_mut(
            definition.name,
            Entry {
                definition,
                phase: Phase::Placeholder,
            },
        );
        Ok(())
    }

    /// Completes a placeholder. Each placeholder may be finalised only once.
    pub fn finalise(
        &mut self,
        name: QualifiedName,
        update: impl FnOnce(&mut Definition),
    ) -> Result<(), SignatureError> {
        let entry = self
            .entries
            .get(&name)
            .ok_or(SignatureError::NotFound(name))?;
        if entry.phase != Phase::Placeholder {
            return Err(SignatureError::NotPlaceholder(name));
        }
        let mut definition = entry.definition.clone();
        update(&mut definition);
        self.entries.insert_mut(
            name,
            Entry {
                definition,
                phase: Phase::Final,
            },
        );
        Ok(())
    }

    pub fn get(&self, name: QualifiedName) -> Option<&Definition> {
        self.entries.get(&name).map(|entry| &entry.definition)
    }

    pub fn lookup(&self, name: QualifiedName) -> Result<&Definition, SignatureError> {
        self.get(name).ok_or(SignatureError::NotFound(name))
    }

    /// Every finished declaration, in name order.
    pub fn definitions(&self) -> impl Iterator<Item = &Definition> + '_ {
        self.entries
            .values()
            .filter(|entry| entry.phase == Phase::Final)
            .map(|entry| &entry.definition)
    }

    pub fn is_placeholder(&self, name: QualifiedName) -> bool {
        self.entries
            .get(&name)
            .map_or(false, |entry| entry.phase == Phase::Placeholder)
    }

    pub fn datatype(&self, name: QualifiedName) -> Option<&DatatypeDefinition> {
        match &self.get(name)?.kind {
            DefinitionKind::Datatype(datatype) => Some(datatype),
            _ => None,
        }
    }

    pub fn constructor(&self, name: QualifiedName) -> Option<&ConstructorDefinition> {
        match &self.get(name)?.kind {
            DefinitionKind::Constructor(constructor) => Some(constructor),
            _ => None,
        }
    }
}
