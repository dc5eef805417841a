//! Infers types of terms.

use crate::{
    conversion::{ConversionError, Ir},
    sort::Sort,
    state::MetaKind,
    tcm::Tcm,
    term::*,
    traverse::{instantiate, substitute},
};

impl Tcm<'_> {
    /// Infers the type of a term in the current context, solving placeholders along the way.
    pub fn infer_type(&mut self, term: &Term) -> Ir<Term> {
        match term {
            Term::Local(local) => match self.context.type_of(local.index) {
                Some(ty) => Ok(ty.term),
                None => panic!(
                    "variable {} escapes a context of length {}",
                    local.index,
                    self.context.len()
                ),
            },
            Term::Inst(name) => self
                .state
                .signature
                .get(*name)
                .map(|definition| definition.ty.term.clone())
                .ok_or(ConversionError::UnknownConstant(*name)),
            Term::Apply(apply) => {
                let function_type = self.infer_type(&apply.function)?;
                match self.reduce(&function_type) {
                    Term::Pi(pi) => {
                        if pi.domain.info.annotation != apply.info.annotation {
                            return Err(ConversionError::AnnotationMismatch {
                                expected: pi.domain.info.annotation,
                                found: apply.info.annotation,
                            });
                        }
                        let argument_type = self.infer_type(&apply.argument)?;
                        self.equal_term(&argument_type, &pi.domain.ty.term)?;
                        Ok(instantiate(&pi.codomain.term, &apply.argument))
                    }
                    other => Err(ConversionError::ExpectedFunctionType(other)),
                }
            }
            Term::Pi(pi) => Ok(Term::Sort(
                self.pi_sort(&pi.domain.ty.sort, &pi.codomain.sort)?,
            )),
            Term::Sort(sort) => Ok(Term::Sort(sort.univ_sort())),
            Term::Level(_) => Ok(Term::Inst(self.state.builtins.level)),
            Term::Metavariable(meta) => match self.state.metas.get(meta.index).map(|e| &e.kind) {
                Some(MetaKind::Term { ty }) => Ok(substitute(ty, &meta.arguments)),
                _ => panic!("{} is not a term placeholder", meta.index),
            },
        }
    }

    /// Infers the sort of a term used as a type.
    pub fn infer_sort(&mut self, ty: &Term) -> Ir<Sort> {
        let ty_ty = self.infer_type(ty)?;
        match self.reduce(&ty_ty) {
            Term::Sort(sort) => Ok(sort),
            placeholder @ Term::Metavariable(_) => {
                let sort = self.fresh_sort_meta(false);
                self.equal_term(&placeholder, &Term::Sort(sort.clone()))?;
                Ok(sort)
            }
            other => Err(ConversionError::ExpectedSort(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{basic::*, conversion::ConversionError, sort::Sort, term::*, test_support::*};

    #[test]
    fn applications_check_annotations() {
        with_tcm(|tcm| {
            let db = tcm.db();
            let level = tcm.state.builtins.level;
            // Set_ : (l : Level) -> Set (suc l)
            let set_at = QualifiedName::new(db, "Set_");
            declare(
                tcm,
                set_at,
                pi(
                    db,
                    "l",
                    ArgInfo::explicit(),
                    Type::new(Sort::type_n(0), Term::Inst(level)),
                    Type::of_sort(Sort::type_n(0)),
                ),
            );
            let applied = Term::Inst(set_at).apply(
                Term::Level(crate::sort::Level::zero()),
                ArgInfo::explicit(),
            );
            assert_eq!(
                tcm.infer_type(&applied),
                Ok(Term::Sort(Sort::type_n(0)))
            );
            let wrong = Term::Inst(set_at).apply(
                Term::Level(crate::sort::Level::zero()),
                ArgInfo::implicit(),
            );
            assert_eq!(
                tcm.infer_type(&wrong),
                Err(ConversionError::AnnotationMismatch {
                    expected: BinderAnnotation::Explicit,
                    found: BinderAnnotation::Implicit,
                })
            );
        });
    }
}
