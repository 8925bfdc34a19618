/// Source column names used by the county exports this service was built against.
/// Deployments with different headers override them in the `[columns]` config table.
pub const COL_TAX_PARCEL_ID: &str = "Tax Parcel ID";
pub const COL_LAND_PARCEL_NUMBER: &str = "Land Parcel Number";
pub const COL_OWNER_NAME: &str = "Owner Name";
pub const COL_MAILING_ADDRESS: &str = "Mailing Address Line 1";
pub const COL_DEEDED_ACRES: &str = "Deeded Acres";
pub const COL_LAND_USE_CODE: &str = "Current Land Use Code";
pub const COL_ASSESSED_VALUE: &str = "Total Assessed Value";
pub const COL_DATE_SOLD: &str = "Date Sold";

// Fallbacks written into enriched records
pub const UNKNOWN: &str = "Unknown";
pub const NO_ADDRESS: &str = "N/A";

/// Dataset files live at `<data dir>/<county><DATASET_SUFFIX>`.
pub const DATASET_SUFFIX: &str = "_parcels.csv";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_CONFIG_FILE: &str = "parcel_stream.toml";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;

pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

/// Highest score a zoning category may carry.
pub const MAX_ZONING_SCORE: u8 = 5;
