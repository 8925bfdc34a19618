use parcel_stream::parcel::EnrichedRecord;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn test_enrich_writes_ndjson_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("input.csv");
    let output = dir.path().join("out.ndjson");
    std::fs::write(
        &input,
        "Tax Parcel ID,Owner Name,Deeded Acres,Current Land Use Code\n\
         A1,River Trust,4.5,RV\n\
         A2,Sam Smith,9,EV\n",
    )
    .unwrap();

    let status = Command::new(env!("CARGO_BIN_EXE_parcel_stream"))
        .arg("enrich")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .env_remove("PARCEL_CONFIG")
        .status()
        .unwrap();
    assert!(status.success());

    let written = std::fs::read_to_string(&output).unwrap();
    let records: Vec<EnrichedRecord> = written
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].parcel_id, "A1");
    // acreage + zoning + entity
    assert_eq!(records[0].investment_score, 4);
    assert_eq!(records[1].zoning_fit_score, Some(0));
    assert_eq!(records[1].investment_score, 0);
}

#[test]
fn test_enrich_fails_on_corrupt_input() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("input.csv");
    let output = dir.path().join("out.ndjson");
    let mut bytes = b"Tax Parcel ID\nA1\nA2\n".to_vec();
    bytes.extend_from_slice(b"\xff\n");
    std::fs::write(&input, bytes).unwrap();

    let status = Command::new(env!("CARGO_BIN_EXE_parcel_stream"))
        .arg("enrich")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .env_remove("PARCEL_CONFIG")
        .status()
        .unwrap();
    assert!(!status.success());

    let written = std::fs::read_to_string(&output).unwrap();
    assert_eq!(written.lines().count(), 2);
}
