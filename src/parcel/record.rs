use serde::{Deserialize, Serialize};
use std::fmt;

/// One enriched parcel, serialized as a single NDJSON line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedRecord {
    pub parcel_id: String,
    pub owner: String,
    pub address: String,
    pub acreage: f64,
    /// Raw land-use code as found in the source
    pub zoning: String,
    pub gps: Gps,
    pub assessed_value: f64,
    /// None when the land-use code has no zoning category
    pub zoning_fit_score: Option<u8>,
    pub investment_score: u8,
    pub owner_type: OwnerType,
    /// May be negative when the sale date lies in the future
    pub years_owned: Option<i32>,
    pub contact_info: Option<String>,
}

/// Coordinates placeholder; nothing geocodes parcels yet so both stay null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Gps {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OwnerType {
    Entity,
    Individual,
    Unknown,
}

/// Non-fatal issue found while enriching a single row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowDiagnostic {
    /// Land-use code with no zoning category (None when the column was empty or missing)
    UnmappedLandUse { code: Option<String> },
    /// Zoning category found but absent from the score table
    UnscoredZoning { code: String, category: String },
    UnparsableNumber { column: String, value: String },
    UnparsableDate { value: String },
}

impl RowDiagnostic {
    /// Configuration gaps are worth a warning; malformed source values are routine.
    pub fn is_config_gap(&self) -> bool {
        matches!(
            self,
            RowDiagnostic::UnmappedLandUse { .. } | RowDiagnostic::UnscoredZoning { .. }
        )
    }
}

impl fmt::Display for RowDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowDiagnostic::UnmappedLandUse { code: Some(code) } => {
                write!(f, "No zoning mapping found for land use code: {}", code)
            }
            RowDiagnostic::UnmappedLandUse { code: None } => {
                write!(f, "No zoning mapping found: land use code is missing")
            }
            RowDiagnostic::UnscoredZoning { code, category } => write!(
                f,
                "Zoning category '{}' (land use code {}) has no fitness score",
                category, code
            ),
            RowDiagnostic::UnparsableNumber { column, value } => {
                write!(f, "Unparsable number in '{}': {:?}", column, value)
            }
            RowDiagnostic::UnparsableDate { value } => {
                write!(f, "Unparsable sale date: {:?}", value)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serializes_camel_case_with_null_placeholders() {
        let record = EnrichedRecord {
            parcel_id: "12-345".to_string(),
            owner: "Unknown".to_string(),
            address: "N/A".to_string(),
            acreage: 0.0,
            zoning: "Unknown".to_string(),
            gps: Gps::default(),
            assessed_value: 0.0,
            zoning_fit_score: None,
            investment_score: 0,
            owner_type: OwnerType::Unknown,
            years_owned: None,
            contact_info: None,
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "parcelId": "12-345",
                "owner": "Unknown",
                "address": "N/A",
                "acreage": 0.0,
                "zoning": "Unknown",
                "gps": { "lat": null, "lon": null },
                "assessedValue": 0.0,
                "zoningFitScore": null,
                "investmentScore": 0,
                "ownerType": "Unknown",
                "yearsOwned": null,
                "contactInfo": null
            })
        );
    }

    #[test]
    fn test_diagnostic_message() {
        let diagnostic = RowDiagnostic::UnmappedLandUse {
            code: Some("XYZ".to_string()),
        };
        assert!(diagnostic.is_config_gap());
        assert_eq!(
            diagnostic.to_string(),
            "No zoning mapping found for land use code: XYZ"
        );
    }
}
