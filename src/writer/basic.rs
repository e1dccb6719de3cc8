// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Default [`Writer`] implementation.

use std::{collections::HashMap, fmt::Display, io, sync::Arc};

use derive_more::with_trait::{Deref, DerefMut};
use itertools::Itertools as _;
use smart_default::SmartDefault;

use crate::{
    event, parser,
    writer::{
        self,
        out::{Coloring, Styles, WriteStrExt as _},
    },
    Feature, Scenario, Step, Writer,
};

/// CLI options of a [`Basic`] [`Writer`].
#[derive(clap::Args, Clone, Copy, Debug, SmartDefault)]
#[group(skip)]
pub struct Cli {
    /// Coloring policy for a console output.
    #[arg(
        long,
        value_name = "auto|always|never",
        default_value = "auto",
        global = true
    )]
    #[default(Coloring::Auto)]
    pub color: Coloring,
}

/// Default [`Writer`] implementation outputting to an [`io::Write`] implementor
/// ([`io::Stdout`] by default).
///
/// Pretty-prints with colors if terminal was successfully detected, otherwise
/// has simple output. Useful for running tests with CI tools.
///
/// Output of every [`Scenario`] is buffered until it finishes, so concurrently
/// running [`Scenario`]s never interleave their lines.
#[derive(Debug, Deref, DerefMut)]
pub struct Basic<Out: io::Write = io::Stdout> {
    /// [`io::Write`] implementor to write the output into.
    #[deref]
    #[deref_mut]
    output: Out,

    /// [`Styles`] for terminal output.
    styles: Styles,

    /// Buffered output of the running [`Scenario`]s.
    running: HashMap<*const Scenario, String>,
}

impl Basic {
    /// Creates a new [`Basic`] [`Writer`] outputting to [`io::Stdout`].
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout(), Coloring::Auto)
    }
}

impl<Out: io::Write> Basic<Out> {
    /// Creates a new [`Basic`] [`Writer`] outputting to the given `output`.
    #[must_use]
    pub fn new(output: Out, color: Coloring) -> Self {
        let mut basic =
            Self { output, styles: Styles::new(), running: HashMap::new() };
        basic.apply_cli(Cli { color });
        basic
    }

    /// Applies the given [`Cli`] options to this [`Basic`] [`Writer`].
    pub fn apply_cli(&mut self, cli: Cli) {
        self.styles.apply_coloring(cli.color);
    }

    /// Returns the underlying output.
    #[must_use]
    pub fn into_inner(self) -> Out {
        self.output
    }

    /// Writes the given `line`, logging a failure instead of propagating it.
    fn line(&mut self, line: impl AsRef<str>) {
        if let Err(e) = self.output.write_line(line) {
            tracing::error!("failed to write output: {e}");
        }
    }

    /// Outputs the parsing `error` encountered while parsing some [`Feature`].
    fn parsing_failed(&mut self, error: impl Display) {
        let msg = self.styles.err(format!("Failed to parse: {error}"));
        self.line(msg);
    }

    /// Outputs the [`Feature`] header.
    fn feature_started(&mut self, feature: &Feature) {
        let path = feature
            .path
            .as_ref()
            .map(|p| format!(" ({})", p.display()))
            .unwrap_or_default();
        let msg = format!(
            "{}{}",
            self.styles.ok(format!("Feature: {}", feature.name)),
            self.styles.skipped(path),
        );
        self.line(msg);
    }

    /// Handles the given [`event::Scenario`].
    fn scenario(&mut self, scenario: &Arc<Scenario>, ev: event::Scenario) {
        let key = Arc::as_ptr(scenario);
        match ev {
            event::Scenario::Ignored => {
                let msg = self.styles.skipped(format!(
                    "  Scenario: {} (ignored)",
                    scenario.name,
                ));
                self.line(msg);
            }
            event::Scenario::Started => {
                let header = self
                    .styles
                    .ok(format!("  Scenario: {}", scenario.name))
                    .into_owned();
                _ = self.running.insert(key, header + "\n");
            }
            event::Scenario::Background(step, ev) => {
                self.step(key, &step, &ev, ">");
            }
            event::Scenario::Step(step, ev) => {
                self.step(key, &step, &ev, " ");
            }
            event::Scenario::Finished(verdict) => {
                if let event::Verdict::Failed { artifacts, .. } = &verdict {
                    let lines = artifacts
                        .iter()
                        .map(|a| {
                            format!(
                                "      Artifact: {} ({}, {} bytes)\n",
                                a.name,
                                a.mime,
                                a.bytes.len(),
                            )
                        })
                        .join("");
                    self.buffer(key, self.styles.err(lines).into_owned());
                }
                if let Some(out) = self.running.remove(&key) {
                    if let Err(e) = self.output.write_str(out) {
                        tracing::error!("failed to write output: {e}");
                    }
                }
            }
        }
    }

    /// Renders the given [`event::Step`] into the [`Scenario`] buffer.
    ///
    /// `mark` distinguishes [`Background`] steps from regular ones.
    ///
    /// [`Background`]: crate::Background
    fn step(
        &mut self,
        key: *const Scenario,
        step: &Step,
        ev: &event::Step,
        mark: &str,
    ) {
        let rendered = match ev {
            event::Step::Started => return,
            event::Step::Passed(_) => {
                //               ✔
                self.styles.ok(format!("   \u{2714}{mark} {step}\n"))
            }
            event::Step::Failed(failure) => {
                let reason = failure
                    .to_string()
                    .lines()
                    .map(|l| format!("      {l}\n"))
                    .join("");
                self.styles.err(format!(
                    //  ✘
                    "   \u{2718}{mark} {step}\n      \
                     Step failed at line {}:\n{reason}",
                    step.line,
                ))
            }
        }
        .into_owned();
        self.buffer(key, rendered);
    }

    /// Appends `text` to the buffer of the given [`Scenario`].
    fn buffer(&mut self, key: *const Scenario, text: String) {
        self.running.entry(key).or_default().push_str(&text);
    }
}

impl<Out: io::Write> Writer for Basic<Out> {
    type Cli = Cli;

    async fn handle_event(
        &mut self,
        ev: parser::Result<event::Cucumber>,
        cli: &Self::Cli,
    ) {
        use event::{Cucumber, Feature};

        self.apply_cli(*cli);

        match ev {
            Err(err) => self.parsing_failed(&err),
            Ok(Cucumber::Started | Cucumber::Finished) => {}
            Ok(Cucumber::Feature(f, ev)) => match ev {
                Feature::Started => self.feature_started(&f),
                Feature::Scenario(sc, ev) => self.scenario(&sc, ev),
                Feature::Finished => {}
            },
        }
    }
}

impl<Out, Val> writer::Arbitrary<Val> for Basic<Out>
where
    Out: io::Write,
    Val: AsRef<str>,
{
    async fn write(&mut self, val: Val) {
        self.line(val);
    }
}
