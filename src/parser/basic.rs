// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Default [`Parser`] implementation.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
    vec,
};

use futures::stream;

use super::{scan, Error, Parser, Result};
use crate::Feature;

/// Glob used to discover `.feature` files when none is provided.
pub const DEFAULT_GLOB: &str = "**/*.feature";

/// CLI options of a [`Basic`] [`Parser`].
#[derive(clap::Args, Clone, Debug, Default)]
#[group(skip)]
pub struct Cli {
    /// Glob pattern to look for feature files with, relative to the input
    /// directory. By default, looks for `**/*.feature` files.
    #[arg(long, short, value_name = "glob", global = true)]
    pub input: Option<String>,
}

/// Default [`Parser`].
///
/// Given a file, parses only it. Given a directory, walks it with a glob
/// pattern and parses every matched file in path order. A problem with one
/// file doesn't stop the others from being parsed.
///
/// As there is no async runtime-agnostic way to interact with io, this
/// [`Parser`] is blocking.
#[derive(Clone, Debug, Default)]
pub struct Basic {
    /// Glob pattern overriding [`DEFAULT_GLOB`].
    glob: Option<String>,
}

impl Basic {
    /// Creates a new [`Basic`] [`Parser`].
    #[must_use]
    pub const fn new() -> Self {
        Self { glob: None }
    }

    /// Sets the glob pattern to discover `.feature` files with.
    ///
    /// The `--input` CLI option takes precedence.
    #[must_use]
    pub fn with_glob(mut self, glob: impl Into<String>) -> Self {
        self.glob = Some(glob.into());
        self
    }

    /// Lists the files to parse under the given `base` directory.
    fn discover(base: &Path, glob: &str) -> Result<Vec<PathBuf>> {
        let walker = globwalk::GlobWalkerBuilder::from_patterns(base, &[glob])
            .case_insensitive(true)
            .build()
            .map_err(|e| Error::Glob {
                pattern: glob.to_owned(),
                reason: e.to_string(),
            })?;

        let mut paths = walker
            .filter_map(|entry| match entry {
                Ok(entry) => {
                    entry.file_type().is_file().then(|| entry.into_path())
                }
                Err(e) => {
                    tracing::warn!("skipping unreadable entry: {e}");
                    None
                }
            })
            .collect::<Vec<_>>();
        paths.sort();
        Ok(paths)
    }
}

impl<I: AsRef<Path>> Parser<I> for Basic {
    type Cli = Cli;

    type Output = stream::Iter<vec::IntoIter<Result<Feature>>>;

    fn parse(self, input: I, cli: Cli) -> Self::Output {
        let input = input.as_ref();

        let features = if input.is_file() {
            vec![read(input)]
        } else {
            let glob = cli.input.or(self.glob);
            let glob = glob.as_deref().unwrap_or(DEFAULT_GLOB);

            match Self::discover(input, glob) {
                Ok(paths) => {
                    if paths.is_empty() {
                        tracing::warn!(
                            dir = %input.display(),
                            glob,
                            "no feature files found",
                        );
                    }
                    paths.iter().map(|p| read(p)).collect()
                }
                Err(e) => vec![Err(e)],
            }
        };

        stream::iter(features)
    }
}

/// Reads and parses a single `.feature` file.
fn read(path: &Path) -> Result<Feature> {
    let content = fs::read_to_string(path).map_err(|e: io::Error| Error::Io {
        path: path.to_owned(),
        source: Arc::new(e),
    })?;
    tracing::debug!(path = %path.display(), "parsing feature file");
    scan::parse(&content, Some(path))
}
