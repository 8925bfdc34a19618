use chrono::{Datelike, Local};
use std::sync::Arc;

use super::columns::ColumnMap;
use super::derive::{non_negative_amount, owner_type, years_owned, zoning_fit_score};
use super::record::{EnrichedRecord, Gps, RowDiagnostic};
use super::row::RawRow;
use super::score::{investment_score, ScoreInputs};
use super::tables::LookupTables;
use crate::constants::{NO_ADDRESS, UNKNOWN};

/// Result of enriching one row: the record plus anything worth reporting about it.
#[derive(Debug, Clone, PartialEq)]
pub struct Transformed {
    pub record: EnrichedRecord,
    pub diagnostics: Vec<RowDiagnostic>,
}

/// Maps raw rows to enriched records. Never fails; bad values degrade to defaults.
///
/// The current year is fixed at construction so that a transformer gives the same
/// output for the same row for its whole lifetime.
#[derive(Debug, Clone)]
pub struct RowTransformer {
    tables: Arc<LookupTables>,
    columns: Arc<ColumnMap>,
    current_year: i32,
}

impl RowTransformer {
    pub fn new(tables: Arc<LookupTables>, columns: Arc<ColumnMap>, current_year: i32) -> Self {
        Self {
            tables,
            columns,
            current_year,
        }
    }

    /// Transformer pinned to the local calendar year.
    pub fn for_current_year(tables: Arc<LookupTables>, columns: Arc<ColumnMap>) -> Self {
        Self::new(tables, columns, Local::now().year())
    }

    pub fn transform(&self, row: &RawRow) -> Transformed {
        let columns = &*self.columns;
        let mut diagnostics = Vec::new();

        let parcel_id = columns
            .parcel_id
            .iter()
            .find_map(|column| row.value(column))
            .unwrap_or(UNKNOWN);
        let owner = row.value(&columns.owner);
        let land_use_code = row.value(&columns.land_use_code);

        let (acreage, issue) = non_negative_amount(&columns.acreage, row.value(&columns.acreage));
        diagnostics.extend(issue);
        let (assessed_value, issue) =
            non_negative_amount(&columns.assessed_value, row.value(&columns.assessed_value));
        diagnostics.extend(issue);

        let zoning_fit_score = zoning_fit_score(&self.tables, land_use_code)
            .map_err(|diagnostic| diagnostics.push(diagnostic))
            .ok();
        let years_owned = years_owned(row.value(&columns.date_sold), self.current_year)
            .map_err(|diagnostic| diagnostics.push(diagnostic))
            .ok()
            .flatten();
        let owner_type = owner_type(owner);

        let investment_score = investment_score(&ScoreInputs {
            acreage,
            zoning_fit_score,
            owner_type,
            years_owned,
        });

        let record = EnrichedRecord {
            parcel_id: parcel_id.to_string(),
            owner: owner.unwrap_or(UNKNOWN).to_string(),
            address: row.value(&columns.address).unwrap_or(NO_ADDRESS).to_string(),
            acreage,
            zoning: land_use_code.unwrap_or(UNKNOWN).to_string(),
            gps: Gps::default(),
            assessed_value,
            zoning_fit_score,
            investment_score,
            owner_type,
            years_owned,
            contact_info: None,
        };

        Transformed {
            record,
            diagnostics,
        }
    }
}
