//! Errors raised while checking declarations, and their conversion into [`Report`]s.

use dcommon::{Intern, Report, ReportKind};

use crate::{
    basic::QualifiedName,
    conversion::ConversionError,
    elaborate::ElaborationError,
    signature::SignatureError,
    sort::Sort,
    term::Term,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    /// The sort of a datatype could not be determined without mentioning its indices.
    SortDependsOnIndices { datatype: QualifiedName },
    Conversion(ConversionError),
    /// Constructors must be relevant.
    IrrelevantConstructor { constructor: QualifiedName },
    /// A constructor's type does not end in its datatype applied to the parameters and indices.
    ConstructorTargetMismatch {
        constructor: QualifiedName,
        target: Term,
    },
    /// A constructor argument, or with `without_k` the constructor itself,
    /// lives in a sort larger than the datatype's sort.
    SortContainment {
        constructor: QualifiedName,
        /// `None` for the constructor's own sort.
        argument: Option<u32>,
        datatype_sort: Sort,
        error: ConversionError,
    },
    /// With `prop_singleton`, a datatype in `Prop` has more than one constructor.
    PropMustBeSingleton {
        datatype: QualifiedName,
        constructors: usize,
    },
    /// With `without_k`, the sort of an index is larger than the datatype's sort.
    IndexSortTooLarge {
        datatype: QualifiedName,
        index: u32,
        error: ConversionError,
    },
    /// A datatype without a type was defined, but no data signature was declared.
    MissingDataSignature { datatype: QualifiedName },
    Signature(SignatureError),
    Elaboration(ElaborationError),
}

impl From<ConversionError> for CheckError {
    fn from(error: ConversionError) -> Self {
        CheckError::Conversion(error)
    }
}

impl From<SignatureError> for CheckError {
    fn from(error: SignatureError) -> Self {
        CheckError::Signature(error)
    }
}

impl From<ElaborationError> for CheckError {
    fn from(error: ElaborationError) -> Self {
        CheckError::Elaboration(error)
    }
}

impl CheckError {
    /// A short identifier for this kind of error.
    pub fn code(&self) -> &'static str {
        match self {
            CheckError::SortDependsOnIndices { .. } => "sort-depends-on-indices",
            CheckError::Conversion(_) => "conversion",
            CheckError::IrrelevantConstructor { .. } => "irrelevant-constructor",
            CheckError::ConstructorTargetMismatch { .. } => "constructor-target-mismatch",
            CheckError::SortContainment { .. } => "sort-containment",
            CheckError::PropMustBeSingleton { .. } => "prop-must-be-singleton",
            CheckError::IndexSortTooLarge { .. } => "index-sort-too-large",
            CheckError::MissingDataSignature { .. } => "missing-data-signature",
            CheckError::Signature(_) => "signature",
            CheckError::Elaboration(_) => "elaboration",
        }
    }

    pub fn report(&self, db: &dyn Intern) -> Report {
        let report = Report::new(ReportKind::Error).with_code(self.code());
        match self {
            CheckError::SortDependsOnIndices { datatype } => report.with_message(format!(
                "the sort of `{}` depends on its indices",
                datatype.display(db)
            )),
            CheckError::Conversion(error) => report.with_message(conversion_message(db, error)),
            CheckError::IrrelevantConstructor { constructor } => report.with_message(format!(
                "constructor `{}` must be relevant",
                constructor.display(db)
            )),
            CheckError::ConstructorTargetMismatch {
                constructor,
                target,
            } => report
                .with_message(format!(
                    "constructor `{}` does not construct an element of its datatype",
                    constructor.display(db)
                ))
                .with_note(format!("its target is `{}`", target.display(db))),
            CheckError::SortContainment {
                constructor,
                argument,
                datatype_sort,
                error,
            } => report
                .with_message(match argument {
                    Some(argument) => format!(
                        "argument {} of constructor `{}` does not fit in the datatype's sort `{}`",
                        argument,
                        constructor.display(db),
                        datatype_sort.display(db)
                    ),
                    None => format!(
                        "constructor `{}` does not fit in the datatype's sort `{}`",
                        constructor.display(db),
                        datatype_sort.display(db)
                    ),
                })
                .with_note(conversion_message(db, error)),
            CheckError::PropMustBeSingleton {
                datatype,
                constructors,
            } => report
                .with_message(format!(
                    "datatype `{}` lives in Prop, so it may have at most one constructor",
                    datatype.display(db)
                ))
                .with_note(format!("it has {} constructors", constructors)),
            CheckError::IndexSortTooLarge {
                datatype,
                index,
                error,
            } => report
                .with_message(format!(
                    "index {} of `{}` lives in a sort larger than the datatype",
                    index,
                    datatype.display(db)
                ))
                .with_note(conversion_message(db, error)),
            CheckError::MissingDataSignature { datatype } => report.with_message(format!(
                "datatype `{}` has no type and no data signature",
                datatype.display(db)
            )),
            CheckError::Signature(error) => report.with_message(match error {
                SignatureError::AlreadyDefined(name) => {
                    format!("`{}` is already defined", name.display(db))
                }
                SignatureError::NotFound(name) => format!("`{}` is not defined", name.display(db)),
                SignatureError::NotPlaceholder(name) => {
                    format!("`{}` was already completed", name.display(db))
                }
            }),
            CheckError::Elaboration(error) => report.with_message(match error {
                ElaborationError::UnboundVariable(name) => {
                    format!("variable `{}` is not in scope", name)
                }
                ElaborationError::UnknownConstant(name) => format!("`{}` is not defined", name),
            }),
        }
    }
}

fn conversion_message(db: &dyn Intern, error: &ConversionError) -> String {
    match error {
        ConversionError::UnequalTerms { left, right } => format!(
            "`{}` is not equal to `{}`",
            left.display(db),
            right.display(db)
        ),
        ConversionError::UnequalSorts { left, right } => format!(
            "sort `{}` is not equal to `{}`",
            left.display(db),
            right.display(db)
        ),
        ConversionError::SortNotBelow { left, right } => format!(
            "sort `{}` is not below `{}`",
            left.display(db),
            right.display(db)
        ),
        ConversionError::UnequalLevels { left, right } => format!(
            "level `{}` is not equal to `{}`",
            left.display(db),
            right.display(db)
        ),
        ConversionError::LevelNotBelow { left, right } => format!(
            "level `{}` is not below `{}`",
            left.display(db),
            right.display(db)
        ),
        ConversionError::OccursCheck { meta } => {
            format!("placeholder {} would occur in its own solution", meta)
        }
        ConversionError::OutOfScope { meta, variable } => format!(
            "placeholder {} cannot depend on variable #{}",
            meta, variable
        ),
        ConversionError::SortCeiling { meta, sort } => format!(
            "placeholder {} cannot be solved by `{}`",
            meta,
            sort.display(db)
        ),
        ConversionError::ExpectedFunctionType(term) => {
            format!("expected a function type, found `{}`", term.display(db))
        }
        ConversionError::ExpectedSort(term) => {
            format!("expected a sort, found `{}`", term.display(db))
        }
        ConversionError::AnnotationMismatch { expected, found } => format!(
            "expected an argument annotated {:?}, found {:?}",
            expected, found
        ),
        ConversionError::UnknownConstant(name) => format!("`{}` is not defined", name.display(db)),
    }
}
