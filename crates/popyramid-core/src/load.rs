use crate::model::{AgeBandRecord, Dataset};
use crate::number::js_to_number;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;

pub const AGE_COLUMN: &str = "Age";
pub const MALES_COLUMN: &str = "Males";
pub const FEMALES_COLUMN: &str = "Females";

// Short rows are padded with empty cells, which coerce to `0` like any other blank count.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Age", default)]
    age: Option<String>,
    #[serde(rename = "Males", default)]
    males: Option<String>,
    #[serde(rename = "Females", default)]
    females: Option<String>,
}

impl CsvRow {
    fn into_record(self) -> AgeBandRecord {
        AgeBandRecord {
            age: self.age.unwrap_or_default(),
            male_pop: js_to_number(self.males.as_deref().unwrap_or("")),
            female_pop: js_to_number(self.females.as_deref().unwrap_or("")),
        }
    }
}

/// Loads a dataset from a CSV file with at least `Age`, `Males` and `Females` columns.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Dataset> {
    let path = path.as_ref();
    let source_name = path.display().to_string();
    let file = std::fs::File::open(path).map_err(|error| Error::Io {
        source_name: source_name.clone(),
        error,
    })?;
    read_dataset(&source_name, file)
}

/// Parses CSV text already held in memory.
pub fn parse_dataset(source_name: &str, text: &str) -> Result<Dataset> {
    read_dataset(source_name, text.as_bytes())
}

pub fn read_dataset<R: std::io::Read>(source_name: &str, reader: R) -> Result<Dataset> {
    let csv_err = |error: csv::Error| Error::Csv {
        source_name: source_name.to_string(),
        error,
    };

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers().map_err(csv_err)?.clone();
    for column in [AGE_COLUMN, MALES_COLUMN, FEMALES_COLUMN] {
        if !headers.iter().any(|h| h == column) {
            return Err(Error::MissingColumn {
                source_name: source_name.to_string(),
                column,
            });
        }
    }

    let mut records = Vec::new();
    for row in rdr.deserialize::<CsvRow>() {
        let record = row.map_err(csv_err)?.into_record();
        if record.male_pop.is_nan() || record.female_pop.is_nan() {
            tracing::debug!(
                source = source_name,
                age = %record.age,
                "non-numeric count coerced to NaN"
            );
        }
        records.push(record);
    }

    tracing::debug!(source = source_name, rows = records.len(), "dataset loaded");
    Ok(Dataset::new(source_name, records))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_in_file_order() {
        let ds = parse_dataset("inline", "Age,Males,Females\n0,100,90\n1,80,85\n90+,10,5\n")
            .expect("parse ok");
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.records[0], AgeBandRecord::new("0", 100.0, 90.0));
        assert_eq!(ds.records[2].age, "90+");
        assert_eq!(ds.source, "inline");
    }

    #[test]
    fn ignores_extra_columns_and_header_order() {
        let ds = parse_dataset("inline", "Females,Year,Age,Males\n5,2020,0-4,7\n").expect("parse");
        assert_eq!(ds.records[0], AgeBandRecord::new("0-4", 7.0, 5.0));
    }

    #[test]
    fn malformed_counts_are_lenient() {
        let ds = parse_dataset("inline", "Age,Males,Females\n0,abc,\n1,12\n").expect("parse ok");
        assert!(ds.records[0].male_pop.is_nan());
        assert_eq!(ds.records[0].female_pop, 0.0);
        assert_eq!(ds.records[1].male_pop, 12.0);
        assert_eq!(ds.records[1].female_pop, 0.0);
    }

    #[test]
    fn missing_column_is_an_error() {
        let err = parse_dataset("inline", "Age,Males\n0,1\n").unwrap_err();
        assert!(matches!(
            err,
            Error::MissingColumn {
                column: "Females",
                ..
            }
        ));
    }

    #[test]
    fn header_only_file_is_empty() {
        let ds = parse_dataset("inline", "Age,Males,Females\n").expect("parse ok");
        assert!(ds.is_empty());
    }
}
