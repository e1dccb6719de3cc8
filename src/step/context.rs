// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Arguments passed to a step handler.

use std::str::FromStr;

use anyhow::{anyhow, Context as _};

use crate::{DataTable, Step};

/// Single argument of a step handler.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Argument {
    /// Value captured by a [`Pattern`].
    ///
    /// [`Pattern`]: super::Pattern
    Capture(String),

    /// Table attached to the [`Step`].
    Table(DataTable),

    /// Text block attached to the [`Step`].
    DocString(String),
}

/// Context of a step handler execution.
#[derive(Clone, Debug)]
pub struct Context {
    /// [`Step`] being executed.
    pub step: Step,

    /// Arguments in order: captures, then the table (if any), then the text
    /// block (if any).
    pub args: Vec<Argument>,
}

impl Context {
    /// Builds a [`Context`] out of the matched `step` and its `captures`.
    #[must_use]
    pub fn new(step: Step, captures: Vec<String>) -> Self {
        let args = captures
            .into_iter()
            .map(Argument::Capture)
            .chain(step.table.clone().map(Argument::Table))
            .chain(step.docstring.clone().map(Argument::DocString))
            .collect();
        Self { step, args }
    }

    /// Returns captured values only.
    pub fn captures(&self) -> impl Iterator<Item = &str> + '_ {
        self.args.iter().filter_map(|a| match a {
            Argument::Capture(c) => Some(c.as_str()),
            Argument::Table(_) | Argument::DocString(_) => None,
        })
    }

    /// Returns the `n`th captured value (0-based).
    #[must_use]
    pub fn capture(&self, n: usize) -> Option<&str> {
        self.captures().nth(n)
    }

    /// Parses the `n`th captured value.
    ///
    /// # Errors
    ///
    /// If there is no such capture, or it cannot be parsed as `T`.
    pub fn parse<T>(&self, n: usize) -> anyhow::Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        let raw = self.capture(n).ok_or_else(|| {
            anyhow!("step `{}` has no capture #{n}", self.step.text)
        })?;
        raw.parse()
            .with_context(|| format!("cannot parse capture #{n} `{raw}`"))
    }

    /// Returns the [`DataTable`] attached to the [`Step`].
    #[must_use]
    pub fn table(&self) -> Option<&DataTable> {
        self.args.iter().find_map(|a| match a {
            Argument::Table(t) => Some(t),
            Argument::Capture(_) | Argument::DocString(_) => None,
        })
    }

    /// Returns the text block attached to the [`Step`].
    #[must_use]
    pub fn docstring(&self) -> Option<&str> {
        self.args.iter().find_map(|a| match a {
            Argument::DocString(d) => Some(d.as_str()),
            Argument::Capture(_) | Argument::Table(_) => None,
        })
    }
}
