// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Parsed representation of a `.feature` file.
//!
//! A single [`Feature`] is produced per file. Its [`Scenario`]s keep the byte
//! [`Span`] of their body in the source text, so nothing ever has to be
//! re-located by name after parsing.

use std::{fmt, path::PathBuf, str::FromStr};

use derive_more::with_trait::{Display, Error};

use crate::data_table::DataTable;

/// Keyword a [`Step`] line starts with.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Keyword {
    /// `Given`
    Given,

    /// `When`
    When,

    /// `Then`
    Then,

    /// `And`
    And,

    /// `But`
    But,
}

/// Error of parsing an unknown [`Keyword`].
#[derive(Clone, Debug, Display, Error)]
#[display("Unknown step keyword: {_0}")]
pub struct UnknownKeyword(#[error(not(source))] pub String);

impl FromStr for Keyword {
    type Err = UnknownKeyword;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "given" => Ok(Self::Given),
            "when" => Ok(Self::When),
            "then" => Ok(Self::Then),
            "and" => Ok(Self::And),
            "but" => Ok(Self::But),
            _ => Err(UnknownKeyword(s.to_owned())),
        }
    }
}

/// Kind of a step definition, as declared at registration.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum StepType {
    /// [Given] step.
    ///
    /// [Given]: https://cucumber.io/docs/gherkin/reference#given
    Given,

    /// [When] step.
    ///
    /// [When]: https://cucumber.io/docs/gherkin/reference#when
    When,

    /// [Then] step.
    ///
    /// [Then]: https://cucumber.io/docs/gherkin/reference#then
    Then,
}

/// Byte range of some section inside the source text.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Span {
    /// Offset of the first byte.
    pub start: usize,

    /// Offset right after the last byte.
    pub end: usize,
}

impl Span {
    /// Returns the part of `source` covered by this [`Span`].
    ///
    /// Returns an empty string if this [`Span`] doesn't fit into `source`.
    #[must_use]
    pub fn slice<'s>(&self, source: &'s str) -> &'s str {
        source.get(self.start..self.end).unwrap_or_default()
    }
}

/// Single parsed step line together with its attached table and text block.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Step {
    /// [`Keyword`] the line started with, if any.
    pub keyword: Option<Keyword>,

    /// Trimmed line as written in the file.
    pub raw: String,

    /// Text used for matching: the [`Keyword`] and a trailing colon stripped.
    pub text: String,

    /// Pipe-delimited table following the step line.
    pub table: Option<DataTable>,

    /// Text block (`"""`) following the step line.
    pub docstring: Option<String>,

    /// 1-based line number of the step inside its file.
    pub line: usize,
}

impl Step {
    /// Creates a new [`Step`] without any table or text block attached.
    #[must_use]
    pub fn new(raw: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            keyword: None,
            raw: raw.into(),
            text: text.into(),
            table: None,
            docstring: None,
            line: 0,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.keyword {
            Some(kw) => write!(f, "{kw} {}", self.text),
            None => write!(f, "{}", self.text),
        }
    }
}

/// [Background] section of a [`Feature`].
///
/// [Background]: https://cucumber.io/docs/gherkin/reference#background
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Background {
    /// Name following the `Background:` keyword (usually empty).
    pub name: String,

    /// Parsed [`Step`]s.
    pub steps: Vec<Step>,

    /// Body of this [`Background`] inside the source text.
    pub span: Span,

    /// 1-based line number of the header.
    pub line: usize,
}

/// [Scenario] (or Scenario Outline) of a [`Feature`].
///
/// [Scenario]: https://cucumber.io/docs/gherkin/reference#example
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Scenario {
    /// Name following the header keyword.
    pub name: String,

    /// Tags written right before the header, without the leading `@`.
    pub tags: Vec<String>,

    /// Own [`Step`]s, without the [`Background`] ones.
    pub steps: Vec<Step>,

    /// Body of this [`Scenario`] inside the source text.
    pub span: Span,

    /// 1-based line number of the header.
    pub line: usize,

    /// Whether the header was `Scenario Outline:`.
    pub outline: bool,
}

/// Parsed `.feature` file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Feature {
    /// Name following the `Feature:` keyword.
    pub name: String,

    /// Path of the file this [`Feature`] was parsed from.
    pub path: Option<PathBuf>,

    /// Tags written right before the `Feature:` keyword, without `@`.
    pub tags: Vec<String>,

    /// Optional [`Background`] shared by all the [`Scenario`]s.
    pub background: Option<Background>,

    /// [`Scenario`]s in order of declaration.
    pub scenarios: Vec<Scenario>,
}

impl Feature {
    /// Returns the steps to execute for the given [`Scenario`]:
    /// [`Background`] steps followed by the [`Scenario`]'s own ones, each
    /// paired with whether it comes from the [`Background`].
    pub fn steps_of<'a>(
        &'a self,
        scenario: &'a Scenario,
    ) -> impl Iterator<Item = (&'a Step, bool)> + 'a {
        self.background
            .iter()
            .flat_map(|bg| bg.steps.iter().map(|s| (s, true)))
            .chain(scenario.steps.iter().map(|s| (s, false)))
    }

    /// Returns merged [`Feature`] and [`Scenario`] tags.
    #[must_use]
    pub fn tags_of(&self, scenario: &Scenario) -> Vec<String> {
        let mut tags = self.tags.clone();
        for t in &scenario.tags {
            if !tags.contains(t) {
                tags.push(t.clone());
            }
        }
        tags
    }

    /// Counts all the [`Step`]s of this [`Feature`], counting the
    /// [`Background`] once per [`Scenario`].
    #[must_use]
    pub fn count_steps(&self) -> usize {
        self.scenarios.iter().map(|sc| self.steps_of(sc).count()).sum()
    }
}
