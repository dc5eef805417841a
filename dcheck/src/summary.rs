use dcommon::Intern;
use dkernel::{basic::*, CertifiedDatatype};
use serde::Serialize;

/// What the command line tool prints for each certified datatype.
#[derive(Serialize, Debug)]
pub struct DatatypeSummary {
    pub name: String,
    pub parameters: u32,
    pub indices: u32,
    pub sort: String,
    pub induction: Induction,
    pub small_parameters: Vec<u32>,
    pub non_linear_parameters: Vec<u32>,
    pub constructors: Vec<ConstructorSummary>,
}

#[derive(Serialize, Debug)]
pub struct ConstructorSummary {
    pub name: String,
    pub arity: u32,
    pub forced: Vec<bool>,
}

impl DatatypeSummary {
    pub fn new(db: &dyn Intern, datatype: &CertifiedDatatype) -> Self {
        let definition = &datatype.definition;
        Self {
            name: datatype.name.display(db),
            parameters: definition.parameters,
            indices: definition.indices,
            sort: definition.sort.display(db),
            induction: definition.induction,
            small_parameters: definition.small_parameters.iter().copied().collect(),
            non_linear_parameters: definition.non_linear_parameters.iter().copied().collect(),
            constructors: datatype
                .constructors
                .iter()
                .map(|(name, constructor)| ConstructorSummary {
                    name: name.display(db),
                    arity: constructor.arity,
                    forced: constructor
                        .forced
                        .iter()
                        .map(|forced| *forced == IsForced::Forced)
                        .collect(),
                })
                .collect(),
        }
    }
}
