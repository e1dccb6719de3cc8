// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tools for parsing `.feature` files.
//!
//! Parsing is split in two layers:
//! - [`scan`] walks the whole file once, finds `Feature:`, `Background:` and
//!   `Scenario:` headers with their tag runs and records each body's byte
//!   [`Span`];
//! - [`text_block`] turns a single body into a list of [`Step`]s with their
//!   tables and text blocks.
//!
//! [`Span`]: crate::feature::Span
//! [`Step`]: crate::Step

pub mod basic;
pub mod scan;
pub mod text_block;

use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use derive_more::{Display, Error};
use futures::Stream;

use crate::Feature;

#[doc(inline)]
pub use self::{basic::Basic, scan::parse};

/// Source of parsed [`Feature`]s.
pub trait Parser<I> {
    /// CLI options of this [`Parser`]. In case no options should be
    /// introduced, just use [`cli::Empty`].
    ///
    /// [`cli::Empty`]: crate::cli::Empty
    type Cli: clap::Args;

    /// Output [`Stream`] of parsed [`Feature`]s.
    type Output: Stream<Item = Result<Feature>> + 'static;

    /// Parses the given `input` into a [`Stream`] of [`Feature`]s.
    fn parse(self, input: I, cli: Self::Cli) -> Self::Output;
}

/// Result of parsing `.feature` files.
pub type Result<T> = std::result::Result<T, Error>;

/// Kind of a syntax problem found in a `.feature` file.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum SyntaxError {
    /// Text block opened with `"""` is never closed.
    #[display("text block is not closed")]
    UnterminatedDocString,

    /// Table row or text block without a step it could belong to.
    #[display("table or text block doesn't follow any step")]
    Orphan,

    /// Second `Feature:` header inside a single file.
    #[display("only one `Feature:` is allowed per file")]
    DuplicateFeature,

    /// Second `Background:` section inside a single file.
    #[display("only one `Background:` is allowed per file")]
    DuplicateBackground,

    /// `Background:` declared after a `Scenario:`.
    #[display("`Background:` must precede all scenarios")]
    LateBackground,
}

/// [`Parser`] error.
#[derive(Clone, Debug, Display, Error)]
pub enum Error {
    /// Failed to read a file.
    #[display("Failed to read `{}`: {source}", path.display())]
    Io {
        /// Path of the file.
        path: PathBuf,

        /// Underlying [`io::Error`].
        source: Arc<io::Error>,
    },

    /// Failed to walk the glob pattern.
    #[display("Failed to walk glob `{pattern}`: {reason}")]
    Glob {
        /// Glob pattern being walked.
        #[error(not(source))]
        pattern: String,

        /// Description of the failure.
        reason: String,
    },

    /// Malformed `.feature` file.
    #[display("{}: {kind}", location(path.as_deref(), *line))]
    Syntax {
        /// Path of the file, if it was read from disk.
        path: Option<PathBuf>,

        /// 1-based line number the problem was detected at.
        line: usize,

        /// What's wrong.
        kind: SyntaxError,
    },
}

impl Error {
    /// Attaches the given `path` to this [`Error`], if it lacks one.
    #[must_use]
    pub fn with_path(self, new: impl Into<PathBuf>) -> Self {
        match self {
            Self::Syntax { path: None, line, kind } => {
                Self::Syntax { path: Some(new.into()), line, kind }
            }
            other => other,
        }
    }
}

/// Formats `path:line` for [`Error`] messages.
fn location(path: Option<&Path>, line: usize) -> String {
    match path {
        Some(p) => format!("{}:{line}", p.display()),
        None => format!("line {line}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_mentions_location() {
        let err = Error::Syntax {
            path: None,
            line: 7,
            kind: SyntaxError::UnterminatedDocString,
        };
        assert_eq!(err.to_string(), "line 7: text block is not closed");

        let err = err.with_path("login.feature");
        assert_eq!(
            err.to_string(),
            "login.feature:7: text block is not closed",
        );
    }
}
