//! Tabular source datasets for automatic-mode replay.
//!
//! Accepts row-oriented CSV with a time column and optional MAP/CO/SVV/PVV
//! columns. Missing vitals columns fall back to the standard defaults when
//! scoring historical rows. When no file exists for a patient a synthetic
//! dataset stands in so the dashboard always has something to replay.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use rand::Rng;
use tracing::{info, warn};

use crate::error::{MonitorError, Result};

/// Recognized time-column spellings, matched case-insensitively.
pub const TIME_COLUMNS: [&str; 5] = ["time", "tiempo", "Tiempo", "Time", "tiempo_segundos"];

/// Number of rows in a synthetic dataset.
pub const SYNTHETIC_ROWS: usize = 100;

/// One source row; vitals are `None` when the column is absent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceRow {
    pub time: f64,
    pub map: Option<f64>,
    pub co: Option<f64>,
    pub svv: Option<f64>,
    pub pvv: Option<f64>,
}

/// An immutable tabular dataset, rows ordered by time.
///
/// Replaced wholesale on each load; never mutated in place.
#[derive(Debug, Clone, Default)]
pub struct SourceDataset {
    rows: Vec<SourceRow>,
}

impl SourceDataset {
    /// Parse a CSV table from any reader.
    ///
    /// Fails with [`MonitorError::MissingTimeColumn`] when no header matches
    /// a recognized time spelling, and [`MonitorError::MalformedRow`] when a
    /// time value does not parse. Vitals cells that fail to parse are
    /// treated as absent rather than fatal.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let headers = rdr.headers()?.clone();

        let time_idx = headers
            .iter()
            .position(|h| {
                TIME_COLUMNS
                    .iter()
                    .any(|c| h.trim().eq_ignore_ascii_case(c))
            })
            .ok_or(MonitorError::MissingTimeColumn)?;

        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let map_idx = column("MAP");
        let co_idx = column("CO");
        let svv_idx = column("SVV");
        // The clinical exports spell pulse volume variation both ways.
        let pvv_idx = column("PVV").or_else(|| column("PPV"));

        let mut rows = Vec::new();
        for (i, record) in rdr.records().enumerate() {
            let record = record?;
            let cell = |idx: Option<usize>| {
                idx.and_then(|i| record.get(i))
                    .and_then(|v| v.trim().parse::<f64>().ok())
            };
            let time = cell(Some(time_idx)).ok_or_else(|| MonitorError::MalformedRow {
                row: i + 1,
                detail: format!(
                    "time value {:?} is not a number",
                    record.get(time_idx).unwrap_or("")
                ),
            })?;
            rows.push(SourceRow {
                time,
                map: cell(map_idx),
                co: cell(co_idx),
                svv: cell(svv_idx),
                pvv: cell(pvv_idx),
            });
        }

        rows.sort_by(|a, b| a.time.total_cmp(&b.time));
        Ok(SourceDataset { rows })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|err| {
            MonitorError::Ingestion(format!("cannot open {}: {err}", path.display()))
        })?;
        Self::from_csv_reader(file)
    }

    /// Synthetic fallback dataset: time = row index, vitals drawn uniformly
    /// from plausible intraoperative ranges.
    pub fn synthetic<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let rows = (0..SYNTHETIC_ROWS)
            .map(|i| SourceRow {
                time: i as f64,
                map: Some(rng.gen_range(65..=95) as f64),
                co: Some((rng.gen_range(3.0..=7.0_f64) * 10.0).round() / 10.0),
                svv: Some(rng.gen_range(8..=20) as f64),
                pvv: Some(rng.gen_range(7..=18) as f64),
            })
            .collect();
        SourceDataset { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[SourceRow] {
        &self.rows
    }

    pub fn max_time(&self) -> Option<f64> {
        self.rows.last().map(|r| r.time)
    }

    /// All rows with `time <= t`, in time order.
    pub fn rows_up_to(&self, t: f64) -> &[SourceRow] {
        let end = self.rows.partition_point(|r| r.time <= t);
        &self.rows[..end]
    }
}

/// Load `<id>.csv` from the patient data directory, falling back to a
/// synthetic dataset when the directory or file is missing or unreadable.
/// Never fatal; the fallback is logged.
pub fn load_patient_dataset<R: Rng + ?Sized>(
    data_dir: &Path,
    patient_id: u32,
    rng: &mut R,
) -> SourceDataset {
    let path = data_dir.join(format!("{patient_id}.csv"));
    match SourceDataset::from_path(&path) {
        Ok(dataset) => {
            info!(patient = patient_id, path = %path.display(), rows = dataset.len(), "patient dataset loaded");
            dataset
        }
        Err(err) => {
            warn!(patient = patient_id, path = %path.display(), error = %err, "falling back to synthetic dataset");
            SourceDataset::synthetic(rng)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use test_case::test_case;

    #[test_case("time"; "lowercase english")]
    #[test_case("Time"; "capitalized english")]
    #[test_case("tiempo"; "lowercase spanish")]
    #[test_case("Tiempo"; "capitalized spanish")]
    #[test_case("TIEMPO"; "uppercase matches case-insensitively")]
    #[test_case("tiempo_segundos"; "export column name")]
    fn recognizes_time_column(header: &str) {
        let csv = format!("{header},MAP\n0,75\n1,80\n");
        let dataset = SourceDataset::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn missing_time_column_is_an_ingestion_error() {
        let err = SourceDataset::from_csv_reader("MAP,CO\n75,5.0\n".as_bytes()).unwrap_err();
        assert!(matches!(err, MonitorError::MissingTimeColumn));
    }

    #[test]
    fn unparseable_time_reports_the_row() {
        let err =
            SourceDataset::from_csv_reader("time,MAP\n0,75\nbogus,80\n".as_bytes()).unwrap_err();
        match err {
            MonitorError::MalformedRow { row, .. } => assert_eq!(row, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn ppv_is_accepted_as_pvv_alias() {
        let dataset =
            SourceDataset::from_csv_reader("tiempo_segundos,PPV\n0,14\n20,15\n".as_bytes())
                .unwrap();
        assert_eq!(dataset.rows()[0].pvv, Some(14.0));
        assert_eq!(dataset.rows()[0].map, None);
    }

    #[test]
    fn rows_up_to_selects_inclusively() {
        let csv = (0..100)
            .map(|i| format!("{}", i * 10))
            .fold(String::from("time\n"), |acc, t| acc + &t + "\n");
        let dataset = SourceDataset::from_csv_reader(csv.as_bytes()).unwrap();
        let selected = dataset.rows_up_to(25.0);
        assert_eq!(selected.len(), 3);
        assert_eq!(selected.last().unwrap().time, 20.0);
        assert_eq!(dataset.rows_up_to(20.0).len(), 3);
        assert!(dataset.rows_up_to(-1.0).is_empty());
    }

    #[test]
    fn rows_are_sorted_by_time() {
        let dataset =
            SourceDataset::from_csv_reader("time,MAP\n5,80\n1,70\n3,75\n".as_bytes()).unwrap();
        let times: Vec<f64> = dataset.rows().iter().map(|r| r.time).collect();
        assert_eq!(times, vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn synthetic_dataset_has_expected_shape() {
        let mut rng = StdRng::seed_from_u64(3);
        let dataset = SourceDataset::synthetic(&mut rng);
        assert_eq!(dataset.len(), SYNTHETIC_ROWS);
        assert_eq!(dataset.max_time(), Some(99.0));
        for (i, row) in dataset.rows().iter().enumerate() {
            assert_eq!(row.time, i as f64);
            let map = row.map.unwrap();
            let co = row.co.unwrap();
            let svv = row.svv.unwrap();
            let pvv = row.pvv.unwrap();
            assert!((65.0..=95.0).contains(&map));
            assert!((3.0..=7.0).contains(&co));
            // CO is rounded to one decimal place.
            assert!(((co * 10.0).round() - co * 10.0).abs() < 1e-9);
            assert!((8.0..=20.0).contains(&svv));
            assert!((7.0..=18.0).contains(&pvv));
        }
    }

    #[test]
    fn missing_patient_file_falls_back_to_synthetic() {
        let mut rng = StdRng::seed_from_u64(5);
        let dataset =
            load_patient_dataset(Path::new("/nonexistent/rosphere-data"), 7, &mut rng);
        assert_eq!(dataset.len(), SYNTHETIC_ROWS);
    }
}
