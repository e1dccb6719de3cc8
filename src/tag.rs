// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tags extraction and filtering of [`Scenario`]s by tags.
//!
//! A [`Filter`] is written as comma-separated OR-groups, each being
//! a plus-separated AND-list of tags:
//!
//! ```text
//! smoke+critical,nightly   ≡   (smoke AND critical) OR nightly
//! ```
//!
//! Regardless of any [`Filter`], a [`Scenario`] tagged with [`IGNORE`] (on
//! itself or on its [`Feature`]) never runs.
//!
//! [`Feature`]: crate::Feature
//! [`Scenario`]: crate::Scenario

use std::{fmt, str::FromStr};

use derive_more::with_trait::{Display, Error};
use itertools::Itertools as _;

/// Tag forcing a [`Scenario`] to be skipped, whatever the [`Filter`] is.
///
/// [`Scenario`]: crate::Scenario
pub const IGNORE: &str = "ignore";

/// Indicates whether the given trimmed `line` is a tag line.
///
/// Only a line starting with `@` is one: a step mentioning `@something` in
/// the middle of its text is not.
#[must_use]
pub fn is_tag_line(line: &str) -> bool {
    line.starts_with('@')
}

/// Indicates whether the given trimmed `line` is a comment line: `#` followed
/// by whitespace or by the end of the line.
#[must_use]
pub fn is_comment_line(line: &str) -> bool {
    line.strip_prefix('#').is_some_and(|rest| {
        rest.chars().next().map_or(true, char::is_whitespace)
    })
}

/// Extracts tags (without the leading `@`) from a tag `line`.
///
/// Everything after a `#` token is considered a comment.
pub fn parse_line(line: &str) -> impl Iterator<Item = &str> {
    line.split_whitespace()
        .take_while(|token| !token.starts_with('#'))
        .filter_map(|token| token.strip_prefix('@'))
        .filter(|tag| !tag.is_empty())
}

/// Normalizes the given `tag` by stripping its leading `@`, if any.
#[must_use]
pub fn normalize(tag: &str) -> &str {
    let tag = tag.trim();
    tag.strip_prefix('@').unwrap_or(tag)
}

/// Indicates whether the given `tags` contain the [`IGNORE`] one.
#[must_use]
pub fn is_ignored<I, S>(tags: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter().any(|t| normalize(t.as_ref()) == IGNORE)
}

/// Outcome of checking [`Scenario`] tags against a [`Filter`].
///
/// [`Scenario`]: crate::Scenario
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Decision {
    /// [`Scenario`] should run.
    ///
    /// [`Scenario`]: crate::Scenario
    #[display("admitted")]
    Admitted,

    /// [`Scenario`] carries the [`IGNORE`] tag.
    ///
    /// [`Scenario`]: crate::Scenario
    #[display("ignored")]
    Ignored,

    /// [`Scenario`] doesn't satisfy the [`Filter`].
    ///
    /// [`Scenario`]: crate::Scenario
    #[display("filtered out")]
    Filtered,
}

/// Decides whether a [`Scenario`] with the given merged `tags` runs.
///
/// [`Scenario`]: crate::Scenario
#[must_use]
pub fn evaluate<S: AsRef<str>>(
    filter: Option<&Filter>,
    tags: &[S],
) -> Decision {
    if is_ignored(tags) {
        Decision::Ignored
    } else if filter.map_or(true, |f| f.admits(tags)) {
        Decision::Admitted
    } else {
        Decision::Filtered
    }
}

/// Error of parsing a [`Filter`].
#[derive(Clone, Debug, Display, Error, Eq, PartialEq)]
#[display("Invalid tag filter `{filter}`: empty tag in group {group}")]
pub struct FilterError {
    /// The whole filter expression.
    #[error(not(source))]
    pub filter: String,

    /// 1-based index of the offending OR-group.
    pub group: usize,
}

/// OR-of-AND tag filter expression.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Filter {
    /// OR-groups, each containing the tags required all together.
    groups: Vec<Vec<String>>,
}

impl Filter {
    /// Indicates whether at least one group has all its tags among the given
    /// `tags`.
    ///
    /// A [`Filter`] without any groups (parsed from a blank string) admits
    /// everything.
    #[must_use]
    pub fn admits<S: AsRef<str>>(&self, tags: &[S]) -> bool {
        self.groups.is_empty() || self.groups.iter().any(|group| {
            group
                .iter()
                .all(|req| tags.iter().any(|t| normalize(t.as_ref()) == req))
        })
    }

    /// Returns OR-groups of this [`Filter`].
    #[must_use]
    pub fn groups(&self) -> &[Vec<String>] {
        &self.groups
    }
}

impl FromStr for Filter {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let groups = s
            .split(',')
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .enumerate()
            .map(|(n, group)| {
                group
                    .split('+')
                    .map(normalize)
                    .map(|tag| {
                        (!tag.is_empty()).then(|| tag.to_owned()).ok_or_else(
                            || FilterError {
                                filter: s.to_owned(),
                                group: n + 1,
                            },
                        )
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { groups })
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.groups.iter().map(|g| g.iter().join("+")).join(","),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(s: &str) -> Filter {
        s.parse().unwrap()
    }

    #[test]
    fn or_of_and_groups() {
        let f = filter("a+b,c");
        assert!(f.admits(&["a", "b"]));
        assert!(!f.admits(&["a"]));
        assert!(f.admits(&["c"]));
        assert!(!f.admits(&["b", "d"]));
        assert!(f.admits(&["x", "c", "a"]));
    }

    #[test]
    fn at_sign_is_optional() {
        let f = filter("@smoke+critical");
        assert!(f.admits(&["smoke", "critical"]));
        assert!(f.admits(&["@smoke", "@critical"]));
        assert_eq!(f.to_string(), "smoke+critical");
    }

    #[test]
    fn blank_filter_admits_everything() {
        assert!(filter("").groups().is_empty());
        assert!(filter(" ").admits(&["any"]));
        assert_eq!(evaluate(None, &["any"]), Decision::Admitted);
        assert_eq!(evaluate::<&str>(None, &[]), Decision::Admitted);
    }

    #[test]
    fn ignore_always_wins() {
        for expr in ["ignore", "a", "a+ignore,b"] {
            let f = filter(expr);
            assert_eq!(evaluate(Some(&f), &["a", "ignore"]), Decision::Ignored);
            assert_eq!(evaluate(Some(&f), &["b", "@ignore"]), Decision::Ignored);
        }
        assert_eq!(evaluate(None, &["ignore"]), Decision::Ignored);
    }

    #[test]
    fn filtered_when_no_group_matches() {
        let f = filter("nightly");
        assert_eq!(evaluate(Some(&f), &["smoke"]), Decision::Filtered);
    }

    #[test]
    fn rejects_empty_tags_inside_group() {
        let err = "a+,b".parse::<Filter>().unwrap_err();
        assert_eq!(err.group, 1);
    }

    #[test]
    fn parses_tag_lines() {
        let tags: Vec<_> = parse_line("@smoke  @ui # @not-a-tag").collect();
        assert_eq!(tags, ["smoke", "ui"]);
        assert!(is_tag_line("@wip"));
        assert!(!is_tag_line("Then I see \"@wip\""));
    }

    #[test]
    fn detects_comments() {
        assert!(is_comment_line("# comment"));
        assert!(is_comment_line("#"));
        assert!(!is_comment_line("#user"));
    }
}
