// Fixture writers for the CLI integration tests

use std::fs;
use std::path::{Path, PathBuf};

pub const THRESHOLDS: &str = include_str!("../../thresholds.example.toml");

const DATAC_HEADER: &str = "LINE;TRACK;Date;KM;LOCATION;STG1c;STG2c;STG3c;STG4c;\
RWH1mm;RWH2mm;RWH3mm;RWH4mm;WHGT1c;WHGT2c;WHGT3c;WHGT4c";

/// One DATAC measurement row: (location m on km 12, left stagger, wear channel 1)
pub type Row = (f64, f64, f64);

/// Write a DATAC export dated `date` (DD.MM.YYYY) on line EAL, track UP
pub fn write_datac(dir: &Path, name: &str, date: &str, rows: &[Row]) -> PathBuf {
    let mut content = format!("{DATAC_HEADER}\n");
    for (location, stagger, wear) in rows {
        content.push_str(&format!(
            "EAL;UP;{date};12;{location};{stagger};0;0;0;{wear};11.5;11.5;11.5;0;0;0;0\n"
        ));
    }
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Wear patch at 12000-12003 m, clean wire up to 12012 m
pub fn worn_rows(wear: f64) -> Vec<Row> {
    (0..=12)
        .map(|m| (m as f64, 0.0, if m <= 3 { wear } else { 11.5 }))
        .collect()
}

/// Metadata directory: tangent track 11000-13000 m, one tension length
pub fn write_metadata(dir: &Path) -> PathBuf {
    let meta = dir.join("metadata");
    fs::create_dir_all(&meta).unwrap();
    fs::write(
        meta.join("track_types.csv"),
        "track type,Track Type startM,Track Type endM\nTangent,11000,13000\n",
    )
    .unwrap();
    fs::write(
        meta.join("spans.csv"),
        "Overlap FromM,Overlap ToM,Overlap,Tension Length\n11000,12500,N,T1\n12500,13000,Y,T2\n",
    )
    .unwrap();
    fs::write(
        meta.join("landmarks.csv"),
        "Landmark FromM,Landmark ToM,Landmark\n11990,12010,Bridge 4\n",
    )
    .unwrap();
    meta
}

pub fn write_thresholds(dir: &Path) -> PathBuf {
    let path = dir.join("thresholds.toml");
    fs::write(&path, THRESHOLDS).unwrap();
    path
}

/// Catenary wear export in metres
pub fn write_catenary(dir: &Path, rows: &[(f64, [f64; 4])]) -> PathBuf {
    let mut content = String::from("LINE,TRACK,CHAINAGE,WireWear1,WireWear2,WireWear3,WireWear4\n");
    for (chainage, [a, b, c, d]) in rows {
        content.push_str(&format!("EAL,UP,{chainage},{a},{b},{c},{d}\n"));
    }
    let path = dir.join("catenary.csv");
    fs::write(&path, content).unwrap();
    path
}
