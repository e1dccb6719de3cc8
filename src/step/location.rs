// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Source code location of a step definition.

use std::panic;

use derive_more::with_trait::{Debug, Display};

/// Location of a step definition's registration in the source code.
///
/// Captured automatically by [`#[track_caller]`][1] registration methods of
/// a [`Collection`].
///
/// [`Collection`]: super::Collection
/// [1]: https://doc.rust-lang.org/reference/attributes/codegen.html#the-track_caller-attribute
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[display("{path}:{line}:{column}")]
pub struct Location {
    /// Path to the file where the step is registered.
    pub path: &'static str,

    /// Line of the file where the step is registered.
    pub line: u32,

    /// Column of the file where the step is registered.
    pub column: u32,
}

impl Location {
    /// Creates a new [`Location`].
    #[must_use]
    pub const fn new(path: &'static str, line: u32, column: u32) -> Self {
        Self { path, line, column }
    }

    /// Returns the [`Location`] of the caller of the current
    /// `#[track_caller]` function.
    #[must_use]
    #[track_caller]
    pub fn caller() -> Self {
        let loc = panic::Location::caller();
        Self::new(loc.file(), loc.line(), loc.column())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[track_caller]
    fn registered_here() -> Location {
        Location::caller()
    }

    #[test]
    fn points_to_the_caller() {
        let line = line!() + 1;
        let loc = registered_here();

        assert_eq!(loc.line, line);
        assert!(loc.path.ends_with("location.rs"));
    }

    #[test]
    fn displays_path_line_column() {
        assert_eq!(Location::new("src/steps.rs", 42, 10).to_string(), "src/steps.rs:42:10");
    }
}
