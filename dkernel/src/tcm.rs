//! The checking monad: the state, the local context, and the collaborators every check needs.

use dcommon::Intern;
use serde::{Deserialize, Serialize};

use crate::{
    basic::*,
    context::Context,
    conversion::{Conversion, Ir, Unifier},
    forcing::{ForcingAnalysis, PatternForcing},
    sort::{pi_sort, Sort},
    state::{MetaKind, State},
    telescope::Telescope,
    term::*,
    traverse::strengthen_sort,
};

/// Options that change what the datatype checker accepts.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct CheckOptions {
    /// Also check the constructor's own sort and every forced argument, and bound index sorts.
    pub without_k: bool,
    /// Reject datatypes in `Prop` with more than one constructor.
    pub prop_singleton: bool,
    /// Compute forced constructor arguments.
    pub forcing: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            without_k: false,
            prop_singleton: false,
            forcing: true,
        }
    }
}

pub struct Tcm<'db> {
    db: &'db dyn Intern,
    pub options: CheckOptions,
    pub state: State,
    pub context: Context,
    conversion: Box<dyn Conversion>,
    forcing: Box<dyn ForcingAnalysis>,
}

impl<'db> Tcm<'db> {
    pub fn new(db: &'db dyn Intern, options: CheckOptions) -> Self {
        Self {
            db,
            options,
            state: State::new(db),
            context: Context::default(),
            conversion: Box::new(Unifier),
            forcing: Box::new(PatternForcing),
        }
    }

    #[must_use]
    pub fn with_conversion(mut self, conversion: impl Conversion + 'static) -> Self {
        self.conversion = Box::new(conversion);
        self
    }

    #[must_use]
    pub fn with_forcing(mut self, forcing: impl ForcingAnalysis + 'static) -> Self {
        self.forcing = Box::new(forcing);
        self
    }

    pub fn db(&self) -> &'db dyn Intern {
        self.db
    }

    /// Runs `f` with `domain` pushed onto the context.
    pub fn under<R>(&mut self, domain: Domain, f: impl FnOnce(&mut Self) -> R) -> R {
        let len = self.context.len();
        self.context.push(domain);
        let result = f(self);
        self.context.truncate(len);
        result
    }

    /// Runs `f` with every binder of the telescope pushed onto the context.
    pub fn under_telescope<R>(&mut self, telescope: &Telescope, f: impl FnOnce(&mut Self) -> R) -> R {
        let len = self.context.len();
        for domain in telescope.domains() {
            self.context.push(domain.clone());
        }
        let result = f(self);
        self.context.truncate(len);
        result
    }

    /// Runs `f`, undoing all of its effects on the state if it fails.
    pub fn speculate<T, E>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, E>) -> Result<T, E> {
        let snapshot = self.state.clone();
        let len = self.context.len();
        let result = f(self);
        if result.is_err() {
            self.state = snapshot;
            self.context.truncate(len);
        }
        result
    }

    /// Runs `f`, then undoes all of its effects on the state.
    pub fn local_state<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let snapshot = self.state.clone();
        let result = f(self);
        self.state = snapshot;
        result
    }

    pub fn reduce(&self, term: &Term) -> Term {
        self.conversion.reduce(&self.state, term)
    }

    pub fn reduce_sort(&self, sort: &Sort) -> Sort {
        self.conversion.reduce_sort(&self.state, sort)
    }

    pub fn normalise(&self, term: &Term) -> Term {
        self.conversion.normalise(&self.state, term)
    }

    pub fn normalise_sort(&self, sort: &Sort) -> Sort {
        self.conversion.normalise_sort(&self.state, sort)
    }

    pub fn normalise_type(&self, ty: &Type) -> Type {
        self.conversion.normalise_type(&self.state, ty)
    }

    pub fn equal_term(&mut self, left: &Term, right: &Term) -> Ir<()> {
        let depth = self.context.len();
        self.conversion
            .equal_term(&mut self.state, depth, left, right)
    }

    pub fn equal_type(&mut self, left: &Type, right: &Type) -> Ir<()> {
        let depth = self.context.len();
        self.conversion
            .equal_type(&mut self.state, depth, left, right)
    }

    pub fn equal_sort(&mut self, left: &Sort, right: &Sort) -> Ir<()> {
        let depth = self.context.len();
        self.conversion
            .equal_sort(&mut self.state, depth, left, right)
    }

    pub fn leq_sort(&mut self, left: &Sort, right: &Sort) -> Ir<()> {
        let depth = self.context.len();
        self.conversion
            .leq_sort(&mut self.state, depth, left, right)
    }

    /// A fresh sort placeholder in the current scope.
    pub fn fresh_sort_meta(&mut self, below_omega: bool) -> Sort {
        let index = self
            .state
            .metas
            .fresh(self.context.len(), MetaKind::Sort { below_omega });
        Sort::Meta(Metavariable {
            index,
            arguments: self.context.identity_arguments(),
        })
    }

    /// A fresh placeholder of type `ty` in the current scope.
    pub fn fresh_term_meta(&mut self, ty: &Term) -> Term {
        let index = self
            .state
            .metas
            .fresh(self.context.len(), MetaKind::Term { ty: ty.clone() });
        Term::Metavariable(Metavariable {
            index,
            arguments: self.context.identity_arguments(),
        })
    }

    /// The sort of `(x : domain) -> codomain`, where `codomain` lives under `x`.
    /// If a placeholder blocks the computation, returns a fresh sort bounded by both sides.
    pub fn pi_sort(&mut self, domain: &Sort, codomain: &Sort) -> Ir<Sort> {
        let domain = self.reduce_sort(domain);
        let codomain = strengthen_sort(&self.reduce_sort(codomain), 1);
        match pi_sort(&domain, codomain.as_ref()) {
            Some(sort) => Ok(sort),
            None => {
                let sort = self.fresh_sort_meta(false);
                self.leq_sort(&domain, &sort)?;
                if let Some(codomain) = codomain {
                    self.leq_sort(&codomain, &sort)?;
                }
                Ok(sort)
            }
        }
    }

    /// Forcing annotations for each argument of a constructor type that lives under
    /// `parameters` datatype parameters.
    pub fn forced_arguments(&self, ty: &Type, parameters: usize) -> Vec<IsForced> {
        self.forcing
            .forced_arguments(&self.state, self.conversion.as_ref(), ty, parameters)
    }
}
