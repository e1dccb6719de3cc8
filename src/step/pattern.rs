// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! What a step definition matches against.

use derive_more::with_trait::{Display, From};
use regex::Regex;

use super::{Expression, ExpressionError, HashableRegex};

/// Matching pattern of a step definition.
///
/// Each variant has its own matching rules:
/// - [`Pattern::Expression`] matches the whole text, one argument per
///   parameter;
/// - [`Pattern::Regex`] searches the text, one argument per capturing group;
/// - [`Pattern::Literal`] requires the text to be byte-equal, giving no
///   arguments.
///
/// Matching is case- and whitespace-sensitive for all of them.
#[derive(Clone, Debug, Display, Eq, From, Hash, PartialEq)]
pub enum Pattern {
    /// Exact text.
    #[display("{_0}")]
    Literal(String),

    /// Regular expression.
    #[display("/{_0}/")]
    Regex(HashableRegex),

    /// [Cucumber Expression][1].
    ///
    /// [1]: https://github.com/cucumber/cucumber-expressions#readme
    #[display("{_0}")]
    Expression(Expression),
}

impl Pattern {
    /// Creates a [`Pattern::Literal`].
    #[must_use]
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    /// Compiles a [`Pattern::Regex`].
    ///
    /// # Errors
    ///
    /// If the `re` is not a valid [`Regex`].
    pub fn regex(re: &str) -> Result<Self, regex::Error> {
        Ok(Self::Regex(Regex::new(re)?.into()))
    }

    /// Compiles a [`Pattern::Expression`].
    ///
    /// # Errors
    ///
    /// If the `expr` is not a valid [`Expression`].
    pub fn expression(expr: &str) -> Result<Self, ExpressionError> {
        Ok(Self::Expression(expr.parse()?))
    }

    /// Tries to match the given step `text`, returning the captured
    /// arguments on success.
    ///
    /// A failed attempt is never an error: it's just [`None`], so matching
    /// may continue with the next definition.
    #[must_use]
    pub fn captures(&self, text: &str) -> Option<Vec<String>> {
        match self {
            Self::Expression(expr) => expr.captures(text),
            Self::Regex(re) => re.captures_of(text),
            Self::Literal(lit) => (lit == text).then(Vec::new),
        }
    }
}

impl From<&str> for Pattern {
    fn from(text: &str) -> Self {
        Self::literal(text)
    }
}

impl From<Regex> for Pattern {
    fn from(re: Regex) -> Self {
        Self::Regex(re.into())
    }
}
