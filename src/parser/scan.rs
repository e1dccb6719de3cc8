// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Scanning of a whole `.feature` file into a [`Feature`].
//!
//! The scan is a single forward pass over the original text. Tag runs,
//! headers and body [`Span`]s are all recorded in that pass, so a
//! [`Scenario`]'s body is never searched for again by its name, and text
//! blocks are always taken from the original content.

use std::{mem, path::Path};

use lazy_regex::regex_captures;

use crate::{
    feature::{Background, Feature, Scenario, Span},
    tag,
};

use super::{text_block, Error, SyntaxError};

/// Structural header line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Header<'s> {
    /// `Feature: <name>`
    Feature(&'s str),

    /// `Background: <name>`
    Background(&'s str),

    /// `Scenario: <name>` or `Scenario Outline: <name>`.
    Scenario {
        /// Name of the scenario.
        name: &'s str,

        /// Whether it's a `Scenario Outline:`.
        outline: bool,
    },
}

impl<'s> Header<'s> {
    /// Recognizes a header in the given trimmed `line`.
    #[must_use]
    pub fn parse(line: &'s str) -> Option<Self> {
        let (_, keyword, name) = regex_captures!(
            r"^(Feature|Background|Scenario Outline|Scenario):[ \t]*(.*)$",
            line,
        )?;
        let name = name.trim_end();
        Some(match keyword {
            "Feature" => Self::Feature(name),
            "Background" => Self::Background(name),
            outline => Self::Scenario { name, outline: outline != "Scenario" },
        })
    }
}

/// Header found during the scan, with the body following it.
#[derive(Debug)]
struct Section<'s> {
    header: Header<'s>,
    tags: Vec<String>,
    line: usize,
    body: Span,
}

/// Parses the given `content` of a `.feature` file.
///
/// `path` is only recorded into the resulting [`Feature`] and into errors.
/// Parsing has no hidden state, so the same `content` always yields equal
/// [`Feature`]s.
///
/// A file without a `Feature:` header still produces a [`Feature`], named
/// after the file stem.
///
/// # Errors
///
/// If the `content` violates the supported syntax. See [`SyntaxError`] for
/// details.
pub fn parse(content: &str, path: Option<&Path>) -> Result<Feature, Error> {
    let located = |e: Error| match path {
        Some(p) => e.with_path(p),
        None => e,
    };

    let (sections, feature_tags_before) = scan(content);
    let mut feature: Option<(&str, Vec<String>)> = None;
    let mut background: Option<Background> = None;
    let mut scenarios = Vec::new();

    for Section { header, tags, line, body } in sections {
        match header {
            Header::Feature(name) => {
                if feature.is_some() {
                    let kind = SyntaxError::DuplicateFeature;
                    return Err(located(syntax(line, kind)));
                }
                feature = Some((name, tags));
            }
            Header::Background(name) => {
                if background.is_some() {
                    let kind = SyntaxError::DuplicateBackground;
                    return Err(located(syntax(line, kind)));
                }
                if !scenarios.is_empty() {
                    let kind = SyntaxError::LateBackground;
                    return Err(located(syntax(line, kind)));
                }
                background = Some(Background {
                    name: name.to_owned(),
                    steps: text_block::parse(body.slice(content), line + 1)
                        .map_err(located)?,
                    span: body,
                    line,
                });
            }
            Header::Scenario { name, outline } => {
                scenarios.push(Scenario {
                    name: name.to_owned(),
                    tags,
                    steps: text_block::parse(body.slice(content), line + 1)
                        .map_err(located)?,
                    span: body,
                    line,
                    outline,
                });
            }
        }
    }

    let (name, tags) = feature.map_or_else(
        || {
            let stem = path
                .and_then(Path::file_stem)
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            (stem, feature_tags_before)
        },
        |(name, tags)| (name.to_owned(), tags),
    );

    Ok(Feature {
        name,
        path: path.map(Path::to_path_buf),
        tags,
        background,
        scenarios,
    })
}

/// Splits `content` into [`Section`]s.
///
/// Also returns tags of a trailing tag run not followed by any header, which
/// are used as [`Feature`] tags when the file lacks a `Feature:` header.
fn scan(content: &str) -> (Vec<Section<'_>>, Vec<String>) {
    let mut sections: Vec<Section<'_>> = Vec::new();
    let mut tags: Vec<String> = Vec::new();
    let mut tag_run_start: Option<usize> = None;
    let mut in_docstring = false;
    let mut offset = 0;

    for (n, raw) in content.split_inclusive('\n').enumerate() {
        let start = offset;
        offset += raw.len();
        let line = raw.trim();

        if in_docstring {
            in_docstring = line != text_block::DOCSTRING_DELIMITER;
            continue;
        }
        if line.is_empty() || tag::is_comment_line(line) {
            continue;
        }
        if tag::is_tag_line(line) {
            _ = tag_run_start.get_or_insert(start);
            for t in tag::parse_line(line) {
                if !tags.iter().any(|existing| existing == t) {
                    tags.push(t.to_owned());
                }
            }
            continue;
        }

        if let Some(header) = Header::parse(line) {
            let boundary = tag_run_start.take().unwrap_or(start);
            if let Some(prev) = sections.last_mut() {
                prev.body.end = boundary;
            }
            sections.push(Section {
                header,
                tags: mem::take(&mut tags),
                line: n + 1,
                body: Span { start: offset, end: content.len() },
            });
            continue;
        }

        // Tags are only attached to a header directly following them.
        tags.clear();
        tag_run_start = None;
        in_docstring = line == text_block::DOCSTRING_DELIMITER;
    }

    (sections, tags)
}

fn syntax(line: usize, kind: SyntaxError) -> Error {
    Error::Syntax { path: None, line, kind }
}
