use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use data_encoding::HEXLOWER;
use rand::Rng;

pub fn setup() {
    let results_dir_path = PathBuf::from_str("./target/results/").unwrap();

    if !results_dir_path.exists() {
        fs::create_dir_all(&results_dir_path).unwrap_or_else(|_|
            panic!("Failed to create results directory: {:?}", results_dir_path)
        );
    } else {
        println!("Results directory exists at {:?}", results_dir_path);
    }
}

/// A fresh, empty directory under ./target/results/
#[allow(dead_code)]
pub fn temp_dir() -> PathBuf {
    let path = temp_file_name("./target/results/");
    fs::create_dir_all(&path).unwrap_or_else(|_|
        panic!("Failed to create directory: {:?}", path)
    );
    path
}

#[allow(dead_code)]
pub fn temp_file_name(dir: &str) -> PathBuf {
    let mut result = PathBuf::from(dir);
    let name = HEXLOWER.encode(&rand::random::<[u8; 16]>());
    result.push(name);
    result
}

#[allow(dead_code)]
pub fn dir_entries(path: &Path) -> Result<usize, anyhow::Error> {
    Ok(fs::read_dir(path)?.count())
}

#[allow(dead_code)]
pub fn write_records(path: &Path, records: &[Vec<String>]) -> Result<(), anyhow::Error> {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_path(path)?;
    for record in records {
        writer.write_record(record)?;
    }
    writer.flush()?;
    Ok(())
}

#[allow(dead_code)]
pub fn read_records(path: &Path) -> Result<Vec<Vec<String>>, anyhow::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let mut records = Vec::new();
    for record in reader.records() {
        records.push(record?.iter().map(|f| f.to_string()).collect());
    }
    Ok(records)
}

/// Random records of the form [name, integer, float, "quoted, text"]
#[allow(dead_code)]
pub fn random_records(count: usize) -> Vec<Vec<String>> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|i| {
            vec![
                HEXLOWER.encode(&rng.gen::<[u8; 4]>()),
                rng.gen_range(-500..500).to_string(),
                format!("{}", rng.gen_range(-1000.0..1000.0)),
                format!("row {i}, \"quoted\""),
            ]
        })
        .collect()
}
