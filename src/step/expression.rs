// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [Cucumber Expressions][1] expanded into [`Regex`]es by the
//! [`cucumber_expressions`] crate.
//!
//! [1]: https://github.com/cucumber/cucumber-expressions#readme

use std::{fmt, hash, str::FromStr};

use derive_more::{Display, Error};
use regex::Regex;

/// Error of expanding an [`Expression`] into a [`Regex`].
#[derive(Clone, Debug, Display, Error)]
#[display("Invalid expression `{source}`: {reason}")]
pub struct ExpressionError {
    /// Source text of the [`Expression`].
    #[error(not(source))]
    pub source: String,

    /// Rendered [`cucumber_expressions::Error`].
    pub reason: String,
}

/// Capturing groups forming a single argument.
#[derive(Clone, Debug)]
struct Argument {
    /// Indices of the groups, at most one of which participates in a match.
    groups: Vec<usize>,

    /// Whether this is a `{string}` argument, captured without its quotes.
    quoted: bool,
}

/// Compiled [Cucumber Expression][1].
///
/// Every parameter yields exactly one argument. `{string}` ones are passed
/// without their quotes and with `\"`, `\'` and `\\` unescaped.
///
/// ```rust
/// # use cucumber_browser::step::Expression;
/// #
/// let expr: Expression = r#"I fill {string} with {int} item(s)"#.parse()?;
///
/// assert_eq!(
///     expr.captures(r##"I fill "#qty" with 3 items"##),
///     Some(vec!["#qty".to_owned(), "3".to_owned()]),
/// );
/// assert_eq!(expr.captures(r##"I fill "#qty" with many items"##), None);
/// # Ok::<_, cucumber_browser::step::ExpressionError>(())
/// ```
///
/// [1]: https://github.com/cucumber/cucumber-expressions#readme
#[derive(Clone, Debug)]
pub struct Expression {
    source: String,
    regex: Regex,
    arguments: Vec<Argument>,
}

impl Expression {
    /// Expands the given `source` into an [`Expression`].
    ///
    /// # Errors
    ///
    /// If the `source` is malformed or uses an unknown parameter.
    pub fn new(source: impl Into<String>) -> Result<Self, ExpressionError> {
        let source = source.into();
        let regex =
            cucumber_expressions::Expression::regex(source.as_str()).map_err(
                |e| ExpressionError {
                    source: source.clone(),
                    reason: e.to_string(),
                },
            )?;

        // `{string}` expands into `__{id}_0` and `__{id}_1` named groups,
        // every other parameter into a single unnamed one.
        let mut arguments = Vec::<Argument>::new();
        let mut last_id = None;
        for (i, name) in regex.capture_names().enumerate().skip(1) {
            let id = name
                .and_then(|n| n.strip_prefix("__"))
                .and_then(|n| n.split_once('_'))
                .map(|(id, _)| id);
            match arguments.last_mut() {
                Some(arg) if id.is_some() && id == last_id => {
                    arg.groups.push(i);
                }
                _ => arguments.push(Argument {
                    groups: vec![i],
                    quoted: id.is_some(),
                }),
            }
            last_id = id;
        }

        Ok(Self { source, regex, arguments })
    }

    /// Returns the source text of this [`Expression`].
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns the [`Regex`] this [`Expression`] is expanded into.
    #[must_use]
    pub const fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Matches the whole `text` against this [`Expression`], returning one
    /// argument per parameter.
    #[must_use]
    pub fn captures(&self, text: &str) -> Option<Vec<String>> {
        let caps = self.regex.captures(text)?;
        Some(
            self.arguments
                .iter()
                .map(|arg| {
                    let value = arg
                        .groups
                        .iter()
                        .find_map(|&i| caps.get(i))
                        .map_or("", |m| m.as_str());
                    if arg.quoted {
                        unescape(value)
                    } else {
                        value.to_owned()
                    }
                })
                .collect(),
        )
    }
}

/// Unescapes quotes and backslashes of a `{string}` capture.
fn unescape(captured: &str) -> String {
    let mut out = String::with_capacity(captured.len());
    let mut chars = captured.chars();
    while let Some(c) = chars.next() {
        match (c, chars.clone().next()) {
            ('\\', Some(next @ ('"' | '\'' | '\\'))) => {
                out.push(next);
                _ = chars.next();
            }
            (c, _) => out.push(c),
        }
    }
    out
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Expression {}

impl hash::Hash for Expression {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.source.hash(state);
    }
}

impl FromStr for Expression {
    type Err = ExpressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
