//! Telescopes: sequences of binders where each binder's type may mention the variables bound before it.

use crate::{
    sort::pi_sort,
    tcm::Tcm,
    term::*,
    traverse::{lift_type, strengthen_sort},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Telescope {
    domains: Vec<Domain>,
}

impl Telescope {
    pub fn new(domains: Vec<Domain>) -> Self {
        Self { domains }
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    pub fn domains(&self) -> &[Domain] {
        &self.domains
    }

    pub fn push(&mut self, domain: Domain) {
        self.domains.push(domain);
    }

    /// Changes the binder annotation of every domain.
    #[must_use]
    pub fn with_annotations(mut self, annotation: crate::basic::BinderAnnotation) -> Telescope {
        for domain in &mut self.domains {
            domain.info.annotation = annotation;
        }
        self
    }

    /// Abstracts `core`, which lives under this telescope, into a chain of function types.
    /// The resulting sorts are computed with [`pi_sort`]; a codomain whose sort is blocked
    /// on a placeholder gives the whole function type sort `Omega`.
    #[must_use]
    pub fn to_pi(&self, core: Type) -> Type {
        self.domains.iter().rev().fold(core, |codomain, domain| {
            let codomain_sort = strengthen_sort(&codomain.sort, 1);
            let sort = pi_sort(&domain.ty.sort, codomain_sort.as_ref())
                .unwrap_or(crate::sort::Sort::Omega);
            Type {
                sort,
                term: Term::Pi(Pi {
                    domain: Box::new(domain.clone()),
                    codomain: Box::new(codomain),
                }),
            }
        })
    }

    /// The type of the `k`th binder, lifted into the scope of the whole telescope.
    pub fn lifted_type(&self, k: usize) -> Option<Type> {
        let domain = self.domains.get(k)?;
        Some(lift_type(&domain.ty, (self.domains.len() - k) as u32, 0))
    }
}

impl Tcm<'_> {
    /// Peels every function type off the front of `ty`, reducing as needed.
    /// Returns the binders and the remaining type, which lives under them.
    pub fn telescope_view(&self, ty: &Type) -> (Telescope, Type) {
        let mut telescope = Telescope::default();
        let mut current = ty.clone();
        loop {
            match self.reduce(&current.term) {
                Term::Pi(pi) => {
                    telescope.push(*pi.domain);
                    current = *pi.codomain;
                }
                term => {
                    return (
                        telescope,
                        Type {
                            sort: current.sort,
                            term,
                        },
                    )
                }
            }
        }
    }
}
