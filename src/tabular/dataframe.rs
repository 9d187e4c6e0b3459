//! Polars DataFrame projections of the report tables.
//!
//! Plotting and reporting collaborators consume DataFrames; the conversions
//! here keep column order aligned with the model's positional species order
//! and the sensitivity problem's factor order.

use polars::prelude::*;

use crate::model::result::TimeCourse;
use crate::uncertainty::sensitivity::SobolIndices;
use crate::uncertainty::summary::QuantileBand;

impl TimeCourse {
    /// Project the time course into a DataFrame with a `Time` column
    /// followed by one column per species, in positional order.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut columns = Vec::with_capacity(self.names.len() + 1);
        columns.push(Series::new("Time", self.time.clone()));
        for name in &self.names {
            columns.push(Series::new(name, self.species[name].clone()));
        }
        DataFrame::new(columns)
    }
}

impl QuantileBand {
    /// Project the band into a `Time/High/Low/Mean` DataFrame.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        DataFrame::new(vec![
            Series::new("Time", self.time.clone()),
            Series::new("High", self.high.clone()),
            Series::new("Low", self.low.clone()),
            Series::new("Mean", self.mean.clone()),
        ])
    }
}

impl SobolIndices {
    /// Project the per-factor indices into a
    /// `Factor/S1/S1_conf/ST/ST_conf` DataFrame.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let names: Vec<&str> = self.factors.iter().map(|f| f.name.as_str()).collect();
        DataFrame::new(vec![
            Series::new("Factor", names),
            Series::new("S1", self.factors.iter().map(|f| f.s1).collect::<Vec<_>>()),
            Series::new(
                "S1_conf",
                self.factors.iter().map(|f| f.s1_conf).collect::<Vec<_>>(),
            ),
            Series::new("ST", self.factors.iter().map(|f| f.st).collect::<Vec<_>>()),
            Series::new(
                "ST_conf",
                self.factors.iter().map(|f| f.st_conf).collect::<Vec<_>>(),
            ),
        ])
    }
}

/// Write any of the report DataFrames as a CSV file.
pub fn write_csv(df: &mut DataFrame, path: impl Into<std::path::PathBuf>) -> PolarsResult<()> {
    let mut file = std::fs::File::create(path.into())?;
    CsvWriter::new(&mut file).finish(df)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn time_course_columns_follow_positional_order() {
        let course = TimeCourse {
            time: vec![0.0, 1.0],
            names: vec!["S".to_string(), "P".to_string()],
            species: HashMap::from([
                ("S".to_string(), vec![100.0, 90.0]),
                ("P".to_string(), vec![0.0, 10.0]),
            ]),
        };

        let df = course.to_dataframe().unwrap();
        assert_eq!(df.get_column_names(), ["Time", "S", "P"]);
        assert_eq!(df.height(), 2);
    }
}
