//! A plain printer for terms, used in diagnostics and in the summary emitted by the command line tool.
//! Local variables are printed as de Bruijn indices.

use dcommon::Intern;

use crate::{
    basic::*,
    sort::{Level, Sort},
    term::*,
};

impl Term {
    pub fn display(&self, db: &dyn Intern) -> String {
        match self {
            Term::Local(local) => local.index.to_string(),
            Term::Inst(name) => name.display(db),
            Term::Apply(_) => {
                let (function, arguments) = self.destructure_as_nary_application();
                let mut result = display_atom(db, function);
                for (info, argument) in arguments {
                    result.push(' ');
                    result.push_str(&match info.annotation {
                        BinderAnnotation::Explicit => display_atom(db, argument),
                        BinderAnnotation::Implicit => format!("{{{}}}", argument.display(db)),
                        BinderAnnotation::Instance => format!("{{{{{}}}}}", argument.display(db)),
                    });
                }
                result
            }
            Term::Pi(pi) => {
                let domain = pi.domain.ty.term.display(db);
                let name = pi.domain.name.text(db);
                let binder = match pi.domain.info.annotation {
                    BinderAnnotation::Explicit if name == "_" => display_atom(db, &pi.domain.ty.term),
                    BinderAnnotation::Explicit => format!("({} : {})", name, domain),
                    BinderAnnotation::Implicit => format!("{{{} : {}}}", name, domain),
                    BinderAnnotation::Instance => format!("{{{{{} : {}}}}}", name, domain),
                };
                format!("{} → {}", binder, pi.codomain.term.display(db))
            }
            Term::Sort(sort) => sort.display(db),
            Term::Level(level) => level.display(db),
            Term::Metavariable(meta) => meta.index.to_string(),
        }
    }
}

fn display_atom(db: &dyn Intern, term: &Term) -> String {
    match term {
        Term::Apply(_) | Term::Pi(_) => format!("({})", term.display(db)),
        Term::Sort(Sort::Type(_)) | Term::Level(_) => format!("({})", term.display(db)),
        _ => term.display(db),
    }
}

impl Level {
    pub fn display(&self, db: &dyn Intern) -> String {
        let mut components = Vec::new();
        if self.constant > 0 || self.atoms.is_empty() {
            components.push(self.constant.to_string());
        }
        for atom in &self.atoms {
            let term = display_atom(db, &atom.term);
            components.push(if atom.offset == 0 {
                term
            } else {
                format!("{} + {}", term, atom.offset)
            });
        }
        if components.len() == 1 {
            components.remove(0)
        } else {
            format!("max({})", components.join(", "))
        }
    }
}

impl Sort {
    pub fn display(&self, db: &dyn Intern) -> String {
        match self {
            Sort::Prop => "Prop".to_owned(),
            Sort::Type(level) => match level.as_constant() {
                Some(0) => "Set".to_owned(),
                Some(n) => format!("Set{}", n),
                None => format!("Set {}", level.display(db)),
            },
            Sort::SizeUniv => "SizeUniv".to_owned(),
            Sort::Omega => "Setω".to_owned(),
            Sort::Meta(meta) => meta.index.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    #[test]
    fn print_applications_and_sorts() {
        with_db(|db| {
            let vec = QualifiedName::new(db, "Vec");
            let term = Term::Inst(vec)
                .apply(Term::local(1), ArgInfo::explicit())
                .apply(Term::local(0), ArgInfo::implicit());
            assert_eq!(term.display(db), "Vec #1 {#0}");
            assert_eq!(Sort::type_n(0).display(db), "Set");
            assert_eq!(Sort::type_n(2).display(db), "Set2");
            assert_eq!(
                Sort::Type(Level::atom(Term::local(0)).succ()).display(db),
                "Set #0 + 1"
            );
        });
    }
}
