//! Converts [`Expr`] syntax into kernel terms, checking types as it goes.
//! Holes become fresh placeholders, which are solved by the conversion checker.

use crate::{
    basic::*,
    result::CheckError,
    sort::{Level, Sort},
    syntax::{Binder, Expr},
    tcm::Tcm,
    term::*,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElaborationError {
    UnboundVariable(String),
    UnknownConstant(String),
}

impl Tcm<'_> {
    /// Elaborates an expression that must be a type.
    pub fn elaborate_type(&mut self, expr: &Expr) -> Result<Type, CheckError> {
        let term = self.elaborate_term(expr)?;
        let sort = self.infer_sort(&term)?;
        Ok(Type { sort, term })
    }

    pub fn elaborate_term(&mut self, expr: &Expr) -> Result<Term, CheckError> {
        match expr {
            Expr::Var(name) => self
                .context
                .lookup(Name::new(self.db(), name))
                .map(|index| Term::Local(Local { index }))
                .ok_or_else(|| ElaborationError::UnboundVariable(name.clone()).into()),
            Expr::Const(name) => {
                let qualified = QualifiedName::new(self.db(), name);
                if self.state.signature.get(qualified).is_none() {
                    return Err(ElaborationError::UnknownConstant(name.clone()).into());
                }
                Ok(Term::Inst(qualified))
            }
            Expr::App(function, arguments) => {
                let mut term = self.elaborate_term(function)?;
                for argument in arguments {
                    let (info, argument) = argument.split();
                    let argument = self.elaborate_term(argument)?;
                    term = term.apply(argument, info);
                }
                // Checking the application solves the placeholders among its arguments.
                self.infer_type(&term)?;
                Ok(term)
            }
            Expr::Pi(binder, codomain) => self.elaborate_pi(binder, codomain),
            Expr::Arrow(domain, codomain) => self.elaborate_pi(
                &Binder {
                    name: "_".to_owned(),
                    ty: (**domain).clone(),
                    annotation: BinderAnnotation::Explicit,
                    relevance: Relevance::Relevant,
                },
                codomain,
            ),
            Expr::Set(level) => Ok(Term::Sort(Sort::type_n(*level))),
            Expr::SetAt(level) => Ok(Term::Sort(Sort::Type(self.elaborate_level(level)?))),
            Expr::Prop => Ok(Term::Sort(Sort::Prop)),
            Expr::SetOmega => Ok(Term::Sort(Sort::Omega)),
            Expr::SizeUniv => Ok(Term::Sort(Sort::SizeUniv)),
            Expr::LevelLit(_) | Expr::LevelSuc(_) | Expr::LevelMax(_, _) => {
                Ok(Term::Level(self.elaborate_level(expr)?))
            }
            Expr::Hole => {
                let sort = self.fresh_sort_meta(false);
                let ty = self.fresh_term_meta(&Term::Sort(sort));
                Ok(self.fresh_term_meta(&ty))
            }
        }
    }

    fn elaborate_pi(&mut self, binder: &Binder, codomain: &Expr) -> Result<Term, CheckError> {
        let domain = Domain {
            name: Name::new(self.db(), &binder.name),
            info: ArgInfo {
                annotation: binder.annotation,
                relevance: binder.relevance,
            },
            ty: self.elaborate_type(&binder.ty)?,
        };
        let codomain = self.under(domain.clone(), |tcm| tcm.elaborate_type(codomain))?;
        Ok(Term::Pi(Pi {
            domain: Box::new(domain),
            codomain: Box::new(codomain),
        }))
    }

    fn elaborate_level(&mut self, expr: &Expr) -> Result<Level, CheckError> {
        match expr {
            Expr::LevelLit(level) => Ok(Level::constant(*level)),
            Expr::LevelSuc(level) => Ok(self.elaborate_level(level)?.succ()),
            Expr::LevelMax(left, right) => {
                let left = self.elaborate_level(left)?;
                let right = self.elaborate_level(right)?;
                Ok(left.join(&right))
            }
            _ => {
                let term = self.elaborate_term(expr)?;
                let ty = self.infer_type(&term)?;
                self.equal_term(&ty, &Term::Inst(self.state.builtins.level))?;
                Ok(Level::atom(term))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    #[test]
    fn names_resolve_to_innermost_binders() {
        with_tcm(|tcm| {
            // (A : Set) -> (A : Set) -> A
            let expr = Expr::Pi(
                Box::new(Binder {
                    name: "A".to_owned(),
                    ty: Expr::Set(0),
                    annotation: BinderAnnotation::Explicit,
                    relevance: Relevance::Relevant,
                }),
                Box::new(Expr::Pi(
                    Box::new(Binder {
                        name: "A".to_owned(),
                        ty: Expr::Set(0),
                        annotation: BinderAnnotation::Explicit,
                        relevance: Relevance::Relevant,
                    }),
                    Box::new(Expr::Var("A".to_owned())),
                )),
            );
            let ty = tcm.elaborate_type(&expr).unwrap();
            assert_eq!(ty.sort, Sort::type_n(1));
            let (telescope, tail) = tcm.telescope_view(&ty);
            assert_eq!(telescope.len(), 2);
            assert_eq!(tail.term, Term::local(0));
        });
    }

    #[test]
    fn holes_are_solved_by_application() {
        with_tcm(|tcm| {
            let level = Expr::Const("Level".to_owned());
            // (F : Level -> Set) -> F _ -> Set
            let expr = Expr::Pi(
                Box::new(Binder {
                    name: "F".to_owned(),
                    ty: Expr::Arrow(Box::new(level), Box::new(Expr::Set(0))),
                    annotation: BinderAnnotation::Explicit,
                    relevance: Relevance::Relevant,
                }),
                Box::new(Expr::Arrow(
                    Box::new(Expr::App(
                        Box::new(Expr::Var("F".to_owned())),
                        vec![crate::syntax::Arg::Explicit(Expr::Hole)],
                    )),
                    Box::new(Expr::Set(0)),
                )),
            );
            tcm.elaborate_type(&expr).unwrap();
            assert!(tcm.state.metas.unsolved().count() < 3);
        });
    }

    #[test]
    fn unbound_variables_are_reported() {
        with_tcm(|tcm| {
            assert_eq!(
                tcm.elaborate_term(&Expr::Var("x".to_owned())),
                Err(ElaborationError::UnboundVariable("x".to_owned()).into())
            );
        });
    }
}
