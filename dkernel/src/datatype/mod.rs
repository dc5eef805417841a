//! Checks datatype definitions and their constructors.
//!
//! A datatype `D` is checked in these stages:
//! - its definition-site parameters are bound against its signature ([`parameters`]),
//! - its sort is read off the end of the signature ([`data_sort`]),
//! - the parameters whose types fit inside that sort are recorded ([`small`]),
//! - every constructor is checked to construct `D`, and the parameters it mentions in
//!   its target indices are collected ([`constructor`]),
//! - every constructor argument is checked to fit inside the datatype's sort ([`fits`]).
//!
//! The whole check is one transaction: if anything fails, the signature is left untouched.

use tracing::{debug, info};

use crate::{
    basic::*,
    result::CheckError,
    signature::{
        ConstructorDefinition, DatatypeDefinition, Definition, DefinitionKind, ParameterSet,
        SignatureError,
    },
    sort::Sort,
    syntax::DataDefinition,
    tcm::Tcm,
    telescope::Telescope,
    term::Type,
};

mod coinduction;
mod constructor;
mod data_sort;
mod fits;
mod parameters;
mod small;

pub use coinduction::is_coinductive;

/// What the constructor checks need to know about the datatype being defined.
pub(crate) struct DatatypeInfo<'a> {
    pub name: QualifiedName,
    /// The datatype's parameters, which are in scope while checking constructors.
    pub parameters: &'a Telescope,
    pub indices: usize,
    /// Lives under the parameters.
    pub sort: &'a Sort,
    pub universe_check: bool,
}

/// A datatype that has been checked and added to the signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertifiedDatatype {
    pub name: QualifiedName,
    pub definition: DatatypeDefinition,
    pub constructors: Vec<(QualifiedName, ConstructorDefinition)>,
}

/// Checks a datatype definition and registers the datatype and its constructors.
#[tracing::instrument(level = "debug", skip_all, fields(datatype = %data.name))]
pub fn check_data_definition(
    tcm: &mut Tcm,
    data: &DataDefinition,
) -> Result<CertifiedDatatype, CheckError> {
    let name = QualifiedName::new(tcm.db(), &data.name);
    tcm.speculate(|tcm| {
        if let Some(ty) = &data.ty {
            let ty = tcm.elaborate_type(ty)?;
            tcm.state.signature.register(Definition {
                name,
                ty,
                kind: DefinitionKind::DataSignature,
            })?;
        }
        let signature = match tcm.state.signature.get(name) {
            Some(definition) if definition.kind == DefinitionKind::DataSignature => {
                definition.clone()
            }
            Some(_) => return Err(SignatureError::AlreadyDefined(name).into()),
            None => return Err(CheckError::MissingDataSignature { datatype: name }),
        };
        let certified = parameters::bind_parameters(
            tcm,
            &data.parameters,
            &signature.ty,
            |tcm, parameters, tail| check_under_parameters(tcm, data, &signature, parameters, tail),
        )?;
        info!(
            datatype = %data.name,
            constructors = certified.constructors.len(),
            "certified datatype"
        );
        Ok(certified)
    })
}

fn check_under_parameters(
    tcm: &mut Tcm,
    data: &DataDefinition,
    signature: &Definition,
    parameters: Telescope,
    tail: Type,
) -> Result<CertifiedDatatype, CheckError> {
    let name = signature.name;
    let (indices, core) = tcm.telescope_view(&tail);
    let sort = data_sort::resolve_data_sort(tcm, name, &indices, &core)?;
    if tcm.options.without_k && data.universe_check {
        data_sort::check_index_sorts(tcm, name, &indices, &sort)?;
    }
    let small_parameters = small::small_parameters(tcm, &parameters, &sort);
    debug!(?small_parameters, "classified parameters");

    let mut definition = DatatypeDefinition {
        parameters: parameters.len() as u32,
        indices: indices.len() as u32,
        sort: sort.clone(),
        induction: data.induction,
        constructors: Vec::new(),
        small_parameters,
        non_linear_parameters: ParameterSet::new(),
        universe_check: data.universe_check,
    };
    tcm.state.signature.register_placeholder(Definition {
        name,
        ty: signature.ty.clone(),
        kind: DefinitionKind::Datatype(definition.clone()),
    })?;

    let info = DatatypeInfo {
        name,
        parameters: &parameters,
        indices: indices.len(),
        sort: &sort,
        universe_check: data.universe_check,
    };
    let mut constructors = Vec::new();
    for declaration in &data.constructors {
        let (constructor, constructor_definition, non_linear) =
            constructor::check_constructor(tcm, &info, declaration)?;
        definition.non_linear_parameters.extend(non_linear);
        definition.constructors.push(constructor);
        constructors.push((constructor, constructor_definition));
    }

    if tcm.options.prop_singleton
        && tcm.reduce_sort(&sort).is_prop()
        && data.constructors.len() > 1
    {
        return Err(CheckError::PropMustBeSingleton {
            datatype: name,
            constructors: data.constructors.len(),
        });
    }

    definition.sort = tcm.normalise_sort(&sort);
    let finished = definition.clone();
    tcm.state.signature.finalise(name, move |entry| {
        entry.kind = DefinitionKind::Datatype(finished);
    })?;

    Ok(CertifiedDatatype {
        name,
        definition,
        constructors,
    })
}

#[cfg(test)]
mod tests;
