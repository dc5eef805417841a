//! The input language: declarations as they are written, before elaboration.
//!
//! Modules are read from RON. Variables are referred to by name; the elaborator
//! resolves them to de Bruijn indices.

use serde::{Deserialize, Serialize};

use crate::{basic::*, tcm::CheckOptions};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// A local variable.
    Var(String),
    /// A global declaration.
    Const(String),
    App(Box<Expr>, Vec<Arg>),
    Pi(Box<Binder>, Box<Expr>),
    /// A non-dependent function type.
    Arrow(Box<Expr>, Box<Expr>),
    /// `Set n` for a literal level `n`.
    Set(u32),
    /// `Set ℓ` for a level expression `ℓ`.
    SetAt(Box<Expr>),
    Prop,
    SetOmega,
    SizeUniv,
    LevelLit(u32),
    LevelSuc(Box<Expr>),
    LevelMax(Box<Expr>, Box<Expr>),
    /// A term to be inferred.
    Hole,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    Explicit(Expr),
    Implicit(Expr),
    Instance(Expr),
    /// An explicit argument to an irrelevant binder.
    Irrelevant(Expr),
}

impl Arg {
    pub fn split(&self) -> (ArgInfo, &Expr) {
        match self {
            Arg::Explicit(expr) => (ArgInfo::explicit(), expr),
            Arg::Implicit(expr) => (ArgInfo::implicit(), expr),
            Arg::Instance(expr) => (
                ArgInfo {
                    annotation: BinderAnnotation::Instance,
                    relevance: Relevance::Relevant,
                },
                expr,
            ),
            Arg::Irrelevant(expr) => (
                ArgInfo {
                    annotation: BinderAnnotation::Explicit,
                    relevance: Relevance::Irrelevant,
                },
                expr,
            ),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Binder {
    pub name: String,
    pub ty: Expr,
    #[serde(default)]
    pub annotation: BinderAnnotation,
    #[serde(default)]
    pub relevance: Relevance,
}

/// A parameter as written at a datatype's definition site, such as the `A` in `data Vec A where`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ParameterBinding {
    pub name: String,
    #[serde(default)]
    pub annotation: BinderAnnotation,
    /// An optional type ascription, which must agree with the data signature.
    #[serde(default)]
    pub ty: Option<Expr>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ConstructorDeclaration {
    pub name: String,
    /// The constructor's type, written in the scope of the datatype's parameters.
    pub ty: Expr,
    #[serde(default)]
    pub relevance: Relevance,
    /// Whether the constructor is registered for instance search.
    #[serde(default)]
    pub instance: bool,
}

fn yes() -> bool {
    true
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DataDefinition {
    pub name: String,
    /// The datatype's type. If omitted, a data signature must have been declared earlier.
    #[serde(default)]
    pub ty: Option<Expr>,
    #[serde(default)]
    pub induction: Induction,
    #[serde(default)]
    pub parameters: Vec<ParameterBinding>,
    #[serde(default)]
    pub constructors: Vec<ConstructorDeclaration>,
    /// If false, constructor arguments are not checked against the datatype's sort.
    #[serde(default = "yes")]
    pub universe_check: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Postulate {
        name: String,
        ty: Expr,
    },
    Function {
        name: String,
        ty: Expr,
        /// Names for the arguments the body is abstracted over.
        #[serde(default)]
        parameters: Vec<String>,
        #[serde(default)]
        body: Option<Expr>,
    },
    /// A record type without fields.
    Record {
        name: String,
        ty: Expr,
        #[serde(default)]
        induction: Option<Induction>,
    },
    DataSignature {
        name: String,
        ty: Expr,
    },
    Data(DataDefinition),
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Postulate { name, .. }
            | Declaration::Function { name, .. }
            | Declaration::Record { name, .. }
            | Declaration::DataSignature { name, .. } => name,
            Declaration::Data(data) => &data.name,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Module {
    #[serde(default)]
    pub options: CheckOptions,
    pub declarations: Vec<Declaration>,
}

impl Module {
    pub fn from_ron(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_module() {
        let module = Module::from_ron(
            r#"(
                options: (without_k: true),
                declarations: [
                    DataSignature(name: "Nat", ty: Set(0)),
                    Data((
                        name: "Nat",
                        constructors: [
                            (name: "zero", ty: Const("Nat")),
                            (name: "suc", ty: Arrow(Const("Nat"), Const("Nat"))),
                        ],
                    )),
                ],
            )"#,
        )
        .unwrap();
        assert!(module.options.without_k);
        assert!(module.options.forcing);
        assert_eq!(module.declarations.len(), 2);
        match &module.declarations[1] {
            Declaration::Data(data) => {
                assert!(data.universe_check);
                assert_eq!(data.induction, Induction::Inductive);
                assert_eq!(data.constructors[1].relevance, Relevance::Relevant);
            }
            other => panic!("expected a datatype, found {:?}", other),
        }
    }

    #[test]
    fn parse_nested_binders() {
        let expr: Expr = ron::from_str(
            r#"Pi((name: "A", ty: Set(0)), Pi((name: "x", ty: Var("A"), annotation: Implicit), Var("A")))"#,
        )
        .unwrap();
        let (outer, codomain) = match expr {
            Expr::Pi(outer, codomain) => (outer, codomain),
            other => panic!("expected a function type, found {:?}", other),
        };
        assert_eq!(outer.name, "A");
        assert_eq!(outer.ty, Expr::Set(0));
        match *codomain {
            Expr::Pi(inner, body) => {
                assert_eq!(inner.annotation, BinderAnnotation::Implicit);
                assert_eq!(inner.ty, Expr::Var("A".to_owned()));
                assert_eq!(*body, Expr::Var("A".to_owned()));
            }
            other => panic!("expected a function type, found {:?}", other),
        }
    }
}
