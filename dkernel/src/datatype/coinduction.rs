use crate::{basic::Induction, signature::DefinitionKind, tcm::Tcm, term::*};

/// Whether `ty` is a coinductive type.
/// Returns `None` if this cannot be decided yet, for instance because the head of `ty`
/// is a variable, a placeholder, or a function that does not unfold.
#[tracing::instrument(level = "debug", skip_all)]
pub fn is_coinductive(tcm: &Tcm, ty: &Type) -> Option<bool> {
    let reduced = tcm.reduce(&ty.term);
    match reduced.leftmost_function() {
        Term::Inst(name) => {
            let definition = match tcm.state.signature.get(*name) {
                Some(definition) => definition,
                None => panic!("`{}` is not in the signature", name.display(tcm.db())),
            };
            match &definition.kind {
                DefinitionKind::Axiom => Some(false),
                DefinitionKind::Function(_) | DefinitionKind::DataSignature => None,
                DefinitionKind::Datatype(datatype) => {
                    Some(datatype.induction == Induction::CoInductive)
                }
                DefinitionKind::Record(record) => {
                    Some(record.induction == Some(Induction::CoInductive))
                }
                DefinitionKind::Constructor(_) => unreachable!(
                    "constructor `{}` at the head of a type",
                    name.display(tcm.db())
                ),
            }
        }
        Term::Local(_) | Term::Metavariable(_) => None,
        Term::Pi(_) | Term::Sort(_) => Some(false),
        head @ (Term::Level(_) | Term::Apply(_)) => {
            unreachable!("`{}` at the head of a type", head.display(tcm.db()))
        }
    }
}
