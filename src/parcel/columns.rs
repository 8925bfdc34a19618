use serde::Deserialize;

use crate::constants::*;

/// Which source column feeds which enriched field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    /// Candidate parcel identifier columns, first non-empty wins
    pub parcel_id: Vec<String>,
    pub owner: String,
    pub address: String,
    pub acreage: String,
    pub land_use_code: String,
    pub assessed_value: String,
    pub date_sold: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            parcel_id: vec![
                COL_TAX_PARCEL_ID.to_string(),
                COL_LAND_PARCEL_NUMBER.to_string(),
            ],
            owner: COL_OWNER_NAME.to_string(),
            address: COL_MAILING_ADDRESS.to_string(),
            acreage: COL_DEEDED_ACRES.to_string(),
            land_use_code: COL_LAND_USE_CODE.to_string(),
            assessed_value: COL_ASSESSED_VALUE.to_string(),
            date_sold: COL_DATE_SOLD.to_string(),
        }
    }
}
