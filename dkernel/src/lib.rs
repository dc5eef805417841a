//! The datatype declaration checker.
//!
//! Declarations are read as [`syntax::Module`]s, elaborated into [`term::Term`]s,
//! and checked by [`module::check_module`]. Datatypes go through [`datatype::check_data_definition`],
//! which registers the datatype and its constructors in the [`signature::Signature`].

pub use datatype::{check_data_definition, is_coinductive, CertifiedDatatype};
pub use module::check_module;
pub use result::CheckError;
pub use tcm::{CheckOptions, Tcm};

pub mod basic;
pub mod context;
pub mod conversion;
pub mod datatype;
pub mod elaborate;
pub mod forcing;
pub mod free_vars;
pub mod infer;
pub mod module;
pub mod print;
pub mod result;
pub mod signature;
pub mod sort;
pub mod state;
pub mod syntax;
pub mod tcm;
pub mod telescope;
pub mod term;
pub mod traverse;

#[cfg(test)]
mod test_support;
