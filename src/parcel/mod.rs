//! Parcel enrichment: lookup tables, field derivers, scoring and the row transformer.

pub mod columns;
pub mod derive;
pub mod record;
pub mod row;
pub mod score;
pub mod tables;
pub mod transform;

pub use columns::ColumnMap;
pub use record::{EnrichedRecord, Gps, OwnerType, RowDiagnostic};
pub use row::RawRow;
pub use tables::LookupTables;
pub use transform::{RowTransformer, Transformed};
