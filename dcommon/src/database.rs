use std::fmt::Debug;

use crate::InternStorage;

/// The database that owns every interned name.
/// A single database is shared by all declarations checked in one session.
#[salsa::database(InternStorage)]
#[derive(Default)]
pub struct Database {
    storage: salsa::Storage<Self>,
}

impl salsa::Database for Database {}

impl Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<db>")
    }
}
