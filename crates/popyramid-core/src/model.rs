use serde::{Deserialize, Serialize};

/// One CSV row: a single age band with its male and female counts.
///
/// Counts are `NaN` when the source cell could not be coerced to a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeBandRecord {
    pub age: String,
    #[serde(rename = "malePop")]
    pub male_pop: f64,
    #[serde(rename = "femalePop")]
    pub female_pop: f64,
}

impl AgeBandRecord {
    pub fn new(age: impl Into<String>, male_pop: f64, female_pop: f64) -> Self {
        Self {
            age: age.into(),
            male_pop,
            female_pop,
        }
    }
}

/// Age bands in file order. The last record is the open-ended terminal bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub source: String,
    pub records: Vec<AgeBandRecord>,
}

impl Dataset {
    pub fn new(source: impl Into<String>, records: Vec<AgeBandRecord>) -> Self {
        Self {
            source: source.into(),
            records,
        }
    }

    pub fn empty(source: impl Into<String>) -> Self {
        Self::new(source, Vec::new())
    }

    pub fn records(&self) -> &[AgeBandRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Largest male or female count over all records. `NaN` counts are skipped; `None` when
    /// nothing comparable is left.
    pub fn max_count(&self) -> Option<f64> {
        self.records
            .iter()
            .flat_map(|r| [r.male_pop, r.female_pop])
            .filter(|v| !v.is_nan())
            .fold(None, |acc: Option<f64>, v| {
                Some(acc.map_or(v, |m| m.max(v)))
            })
    }

    /// Age labels with duplicates removed, keeping first-seen order.
    pub fn distinct_ages(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::with_capacity(self.records.len());
        for r in &self.records {
            if !out.contains(&r.age.as_str()) {
                out.push(r.age.as_str());
            }
        }
        out
    }
}
