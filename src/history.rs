//! Population history
//!
//! A `[time][z][n]` array of atom counts. Rows are appended one step at a
//! time and never touched again once written.

use ndarray::{s, Array2, Array3, ArrayView2, ArrayView3, Axis};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::error::Error;
use crate::nuclide::{Grid, Nuclide};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationHistory {
    step_seconds: f64,
    len: usize, // Finalised rows
    populations: Array3<f64>,
}

impl PopulationHistory {
    /// History with room for `steps` transitions after `initial`
    pub(crate) fn new(initial: Array2<f64>, steps: usize, step_seconds: f64) -> Self {
        let (rows, cols) = initial.dim();
        let mut populations = Array3::zeros((steps + 1, rows, cols));
        populations.index_axis_mut(Axis(0), 0).assign(&initial);
        Self { step_seconds, len: 1, populations }
    }

    pub(crate) fn push(&mut self, row: &Array2<f64>) {
        assert!(self.len < self.populations.dim().0, "population history is full");
        self.populations.index_axis_mut(Axis(0), self.len).assign(row);
        self.len += 1;
    }

    /// Number of finalised rows (t = 0 included)
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of transitions the history was sized for
    pub fn capacity_steps(&self) -> usize {
        self.populations.dim().0 - 1
    }

    pub fn is_complete(&self) -> bool {
        self.len == self.populations.dim().0
    }

    pub fn step_seconds(&self) -> f64 {
        self.step_seconds
    }

    /// Simulated time of row `t` [s]
    pub fn time(&self, t: usize) -> f64 {
        t as f64 * self.step_seconds
    }

    pub fn grid(&self) -> Grid {
        let (_, rows, cols) = self.populations.dim();
        Grid { rows, cols }
    }

    /// Row `t`, if it has been finalised
    pub fn row(&self, t: usize) -> Option<ArrayView2<'_, f64>> {
        (t < self.len).then(|| self.populations.index_axis(Axis(0), t))
    }

    /// Most recent finalised row
    pub fn last(&self) -> ArrayView2<'_, f64> {
        self.populations.index_axis(Axis(0), self.len - 1)
    }

    pub fn population(&self, t: usize, nuclide: Nuclide) -> Option<f64> {
        self.row(t).map(|row| row[nuclide.index()])
    }

    /// Atom count summed over the chart at row `t`
    pub fn total(&self, t: usize) -> Option<f64> {
        self.row(t).map(|row| row.sum())
    }

    /// Nucleon-weighted count at row `t`
    pub fn nucleon_mass(&self, t: usize) -> Option<f64> {
        self.row(t).map(|row| {
            row.indexed_iter()
                .map(|((z, n), count)| count * Nuclide::new(z, n).nucleons() as f64)
                .sum()
        })
    }

    /// All finalised rows
    pub fn as_array(&self) -> ArrayView3<'_, f64> {
        self.populations.slice(s![..self.len, .., ..])
    }

    pub fn into_array(self) -> Array3<f64> {
        if self.is_complete() {
            self.populations
        } else {
            self.populations.slice(s![..self.len, .., ..]).to_owned()
        }
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let writer = BufWriter::new(fs::File::create(path.as_ref())?);
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    pub fn read_json(path: impl AsRef<Path>) -> Result<Self, Error> {
        let reader = BufReader::new(fs::File::open(path.as_ref())?);
        let history: Self = serde_json::from_reader(reader)?;
        let rows = history.populations.dim().0;
        if history.len == 0 || history.len > rows {
            return Err(Error::CorruptHistory { len: history.len, rows });
        }
        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(steps: usize) -> PopulationHistory {
        let mut initial = Array2::zeros((2, 3));
        initial[[0, 0]] = 10.0;
        initial[[1, 2]] = 2.0;
        PopulationHistory::new(initial, steps, 0.5)
    }

    #[test]
    fn test_append_only() {
        let mut history = seeded(2);
        assert_eq!(history.len(), 1);
        assert!(history.row(1).is_none());

        let mut next = history.last().to_owned();
        next[[0, 0]] = 4.0;
        history.push(&next);

        assert_eq!(history.len(), 2);
        assert_eq!(history.population(0, Nuclide::new(0, 0)), Some(10.0));
        assert_eq!(history.population(1, Nuclide::new(0, 0)), Some(4.0));
        assert!(!history.is_complete());
        assert_eq!(history.as_array().dim(), (2, 2, 3));
        assert_eq!(history.time(1), 0.5);
    }

    #[test]
    #[should_panic(expected = "full")]
    fn test_push_past_capacity() {
        let mut history = seeded(1);
        let row = history.last().to_owned();
        history.push(&row);
        history.push(&row);
    }

    #[test]
    fn test_totals() {
        let history = seeded(1);
        assert_eq!(history.total(0), Some(12.0));
        // H-1 has one nucleon; row 1 column 2 is He-4
        assert_eq!(history.nucleon_mass(0), Some(10.0 + 2.0 * 4.0));
        assert_eq!(history.total(1), None);
    }

    #[test]
    fn test_json_file() {
        let mut history = seeded(1);
        let row = history.last().to_owned();
        history.push(&row);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        history.write_json(&path).unwrap();
        let loaded = PopulationHistory::read_json(&path).unwrap();
        assert_eq!(loaded, history);
        assert!(loaded.is_complete());
    }

    #[test]
    fn test_json_file_inconsistent_len() {
        let dir = tempfile::tempdir().unwrap();
        // Nothing finalised, and more rows finalised than stored
        let cases = [
            (
                r#"{"step_seconds":0.1,"len":0,"populations":{"v":1,"dim":[2,1,1],"data":[5.0,4.0]}}"#,
                0,
                2,
            ),
            (r#"{"step_seconds":0.1,"len":3,"populations":{"v":1,"dim":[0,6,7],"data":[]}}"#, 3, 0),
        ];
        for (i, (json, len, rows)) in cases.into_iter().enumerate() {
            let path = dir.path().join(format!("history{i}.json"));
            std::fs::write(&path, json).unwrap();
            match PopulationHistory::read_json(&path) {
                Err(Error::CorruptHistory { len: l, rows: r }) => assert_eq!((l, r), (len, rows)),
                other => panic!("expected corrupt history, got {other:?}"),
            }
        }
    }
}
