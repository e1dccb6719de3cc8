// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Pipe-delimited tables attached to steps.

use std::{collections::HashMap, fmt};

/// Table written right below a step line:
///
/// ```text
/// | Target | Value |
/// | #user  | alice |
/// ```
///
/// Every cell is already trimmed. The first row is treated as a header by
/// [`DataTable::hashes()`] and [`DataTable::rows()`] only; [`DataTable::raw()`]
/// returns everything as written.
///
/// # Example
///
/// ```rust
/// use cucumber_browser::DataTable;
///
/// let table = DataTable::from(vec![
///     vec!["Target", "Value"],
///     vec!["#user", "alice"],
/// ]);
///
/// assert_eq!(table.hashes()[0]["Target"], "#user");
/// assert_eq!(table.rows(), [["#user", "alice"]]);
/// ```
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct DataTable {
    rows: Vec<Vec<String>>,
}

impl DataTable {
    /// Creates a new [`DataTable`] out of the given `rows`.
    #[must_use]
    pub const fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Appends a row to the bottom of this [`DataTable`].
    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Returns all the rows, header included.
    #[must_use]
    pub fn raw(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Returns all the rows except the header one.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or_default()
    }

    /// Maps each non-header row into a map keyed by the header cells.
    ///
    /// Cells exceeding the header width are ignored.
    #[must_use]
    pub fn hashes(&self) -> Vec<HashMap<String, String>> {
        let Some((header, rows)) = self.rows.split_first() else {
            return Vec::new();
        };
        rows.iter()
            .map(|row| {
                header.iter().cloned().zip(row.iter().cloned()).collect()
            })
            .collect()
    }

    /// Converts a two-column table into a map from the first column to the
    /// second one.
    ///
    /// Returns [`None`] if any row doesn't have exactly 2 cells.
    #[must_use]
    pub fn rows_hash(&self) -> Option<HashMap<String, String>> {
        self.rows
            .iter()
            .map(|row| match row.as_slice() {
                [k, v] => Some((k.clone(), v.clone())),
                _ => None,
            })
            .collect()
    }

    /// Returns a [`DataTable`] with rows and columns swapped.
    ///
    /// The width of the first row defines the height of the result.
    #[must_use]
    pub fn transpose(&self) -> Self {
        let width = self.width();
        let rows = (0..width)
            .map(|col| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(col).cloned())
                    .collect()
            })
            .collect();
        Self::new(rows)
    }

    /// Indicates whether this [`DataTable`] has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows, header included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Number of cells in the first row.
    #[must_use]
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }
}

impl From<Vec<Vec<String>>> for DataTable {
    fn from(rows: Vec<Vec<String>>) -> Self {
        Self::new(rows)
    }
}

impl From<Vec<Vec<&str>>> for DataTable {
    fn from(rows: Vec<Vec<&str>>) -> Self {
        Self::new(
            rows.into_iter()
                .map(|r| r.into_iter().map(str::to_owned).collect())
                .collect(),
        )
    }
}

impl fmt::Display for DataTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            writeln!(f, "| {} |", row.join(" | "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> DataTable {
        DataTable::from(vec![
            vec!["name", "age"],
            vec!["Alice", "30"],
            vec!["Bob", "25"],
        ])
    }

    #[test]
    fn rows_skip_header() {
        let table = people();
        assert_eq!(table.raw().len(), 3);
        assert_eq!(table.rows(), [["Alice", "30"], ["Bob", "25"]]);
        assert!(DataTable::default().rows().is_empty());
    }

    #[test]
    fn hashes_are_keyed_by_header() {
        let hashes = people().hashes();
        assert_eq!(hashes.len(), 2);
        assert_eq!(hashes[1]["name"], "Bob");
        assert_eq!(hashes[0]["age"], "30");
    }

    #[test]
    fn rows_hash_requires_two_columns() {
        let kv = DataTable::from(vec![vec!["timeout", "30"], vec!["x", "y"]]);
        assert_eq!(kv.rows_hash().unwrap()["timeout"], "30");

        let wide = DataTable::from(vec![vec!["a", "b", "c"]]);
        assert!(wide.rows_hash().is_none());
    }

    #[test]
    fn transposes() {
        let t = people().transpose();
        assert_eq!(t.raw(), [["name", "Alice", "Bob"], ["age", "30", "25"]]);
        assert_eq!(t.width(), 3);
    }

    #[test]
    fn displays_as_gherkin() {
        let table = DataTable::from(vec![vec!["a", "b"]]);
        assert_eq!(table.to_string(), "| a | b |\n");
    }
}
