use salsa::{InternId, InternKey};
use std::fmt::Debug;

/// Provides utilities for interning names.
///
/// The [`Debug`] constraint is used to give databases a simple [`Debug`] implementation
/// for use in tracing messages.
#[salsa::query_group(InternStorage)]
pub trait Intern: Debug {
    #[salsa::interned]
    fn intern_string_data(&self, data: String) -> Str;

    #[salsa::interned]
    fn intern_path_data(&self, data: PathData) -> Path;
}

/// An interned string type.
/// Can be safely copied and compared cheaply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Str(InternId);

impl InternKey for Str {
    fn from_intern_id(v: InternId) -> Self {
        Self(v)
    }

    fn as_intern_id(&self) -> InternId {
        self.0
    }
}

impl Str {
    pub fn new(db: &dyn Intern, text: impl ToString) -> Self {
        db.intern_string_data(text.to_string())
    }

    pub fn lookup(&self, db: &dyn Intern) -> String {
        db.lookup_intern_string_data(*self)
    }
}

/// A fully qualified path.
/// Use [`Path`] instead, if possible.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PathData(pub Vec<Str>);

/// A fully qualified path, such as `Data::Vec::cons`.
/// Used as the name of every declaration in a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Path(InternId);

impl InternKey for Path {
    fn from_intern_id(v: InternId) -> Self {
        Self(v)
    }

    fn as_intern_id(&self) -> InternId {
        self.0
    }
}

impl Path {
    /// Interns a path written with `::` separators.
    pub fn parse(db: &dyn Intern, text: &str) -> Self {
        db.intern_path_data(PathData(
            text.split("::").map(|segment| Str::new(db, segment)).collect(),
        ))
    }

    pub fn segments(self, db: &dyn Intern) -> Vec<Str> {
        db.lookup_intern_path_data(self).0
    }

    pub fn display(self, db: &dyn Intern) -> String {
        self.segments(db)
            .into_iter()
            .map(|s| db.lookup_intern_string_data(s))
            .collect::<Vec<_>>()
            .join("::")
    }
}
