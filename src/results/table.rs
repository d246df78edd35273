//! Loosely typed score tables read from the engine's CSV output

use crate::error::Result;
use serde::Serialize;
use std::cmp::Ordering;

/// A CSV table kept as strings. Column names are trimmed on load and an
/// empty cell is a missing value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ScoreTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn from_csv(text: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(text.as_bytes());

        let columns: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self::new(columns, rows))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn has_columns(&self, names: &[&str]) -> bool {
        names.iter().all(|n| self.has_column(n))
    }

    pub fn first_column(&self) -> Option<&str> {
        self.columns.first().map(String::as_str)
    }

    /// First of `candidates` present in the table.
    pub fn first_present<'a>(&self, candidates: &[&'a str]) -> Option<&'a str> {
        candidates.iter().copied().find(|c| self.has_column(c))
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn text(&self, row: usize, column: &str) -> Option<&str> {
        self.column(column).and_then(|c| self.cell(row, c))
    }

    /// Numeric value of a cell. Unparseable or non-finite values are missing.
    pub fn number(&self, row: usize, column: usize) -> Option<f64> {
        self.cell(row, column)
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite())
    }

    pub fn numbers(&self, column: &str) -> Vec<Option<f64>> {
        match self.column(column) {
            Some(c) => (0..self.len()).map(|r| self.number(r, c)).collect(),
            None => Vec::new(),
        }
    }

    /// Mean over the non-missing values of a column.
    pub fn mean(&self, column: &str) -> Option<f64> {
        let values: Vec<f64> = self.numbers(column).into_iter().flatten().collect();
        if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        }
    }

    /// Row indices ordered by a numeric column. The sort is stable and
    /// missing values go last in both directions.
    pub fn rows_sorted_by(&self, column: &str, descending: bool) -> Vec<usize> {
        let scores = self.numbers(column);
        let mut order: Vec<usize> = (0..self.len()).collect();
        if scores.is_empty() {
            return order;
        }
        order.sort_by(|&a, &b| compare_scores(scores[a], scores[b], descending));
        order
    }

    /// Left join: append `value_column` from `other`, matched on `key`.
    ///
    /// Unmatched rows get an empty value; several matches duplicate the row.
    pub fn left_join(&self, other: &ScoreTable, key: &str, value_column: &str) -> ScoreTable {
        let (Some(left_key), Some(right_key), Some(right_value)) = (
            self.column(key),
            other.column(key),
            other.column(value_column),
        ) else {
            return self.clone();
        };

        let mut columns = self.columns.clone();
        columns.push(value_column.to_string());

        let mut rows = Vec::with_capacity(self.rows.len());
        for (i, row) in self.rows.iter().enumerate() {
            let id = self.cell(i, left_key);
            let matches: Vec<String> = match id {
                Some(id) => (0..other.len())
                    .filter(|&j| other.cell(j, right_key) == Some(id))
                    .map(|j| other.cell(j, right_value).unwrap_or_default().to_string())
                    .collect(),
                None => Vec::new(),
            };

            if matches.is_empty() {
                let mut joined = row.clone();
                joined.push(String::new());
                rows.push(joined);
            } else {
                for value in matches {
                    let mut joined = row.clone();
                    joined.push(value);
                    rows.push(joined);
                }
            }
        }

        ScoreTable::new(columns, rows)
    }
}

pub fn compare_scores(a: Option<f64>, b: Option<f64>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => {
            let ord = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
            if descending {
                ord.reverse()
            } else {
                ord
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_are_trimmed_and_rows_padded() {
        let table = ScoreTable::from_csv(" BlockName , Score\nData,0.5\nShort\n").unwrap();
        assert_eq!(table.columns(), &["BlockName".to_string(), "Score".to_string()]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.text(1, "Score"), None);
    }

    #[test]
    fn test_mean_skips_missing_values() {
        let table = ScoreTable::from_csv("BlockName,Score\nA,0.2\nB,\nC,n/a\nD,0.6\n").unwrap();
        let mean = table.mean("Score").unwrap();
        assert!((mean - 0.4).abs() < 1e-9);
        assert_eq!(table.mean("Missing"), None);
    }

    #[test]
    fn test_sort_is_stable_with_missing_last() {
        let table = ScoreTable::from_csv("Name,Score\na,0.5\nb,\nc,0.9\nd,0.5\n").unwrap();
        assert_eq!(table.rows_sorted_by("Score", true), vec![2, 0, 3, 1]);
        assert_eq!(table.rows_sorted_by("Score", false), vec![0, 3, 2, 1]);
    }

    #[test]
    fn test_left_join_behaves_relationally() {
        let comp = ScoreTable::from_csv("CompetencyID,Score\nC1,0.1\nC2,0.2\nC3,0.3\n").unwrap();
        let reference =
            ScoreTable::from_csv("CompetencyID,BlockName\nC1,Data\nC3,ML\nC3,NLP\n").unwrap();

        let joined = comp.left_join(&reference, "CompetencyID", "BlockName");
        assert_eq!(joined.len(), 4);
        assert_eq!(joined.text(0, "BlockName"), Some("Data"));
        assert_eq!(joined.text(1, "BlockName"), None);
        assert_eq!(joined.text(2, "BlockName"), Some("ML"));
        assert_eq!(joined.text(3, "BlockName"), Some("NLP"));
    }
}
