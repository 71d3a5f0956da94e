mod catalog;
mod copy;
mod quote;
pub mod transform;

pub use catalog::{Statement, StatementCatalog};
pub use copy::{CopySpec, JsonFormat, TimeFormat};
pub use quote::quote_literal;

/// SQL flavour statements are rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Redshift,
    Sqlite,
}
