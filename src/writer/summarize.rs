// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`Writer`]-wrapper for collecting a summary of execution.

use std::borrow::Cow;

use derive_more::with_trait::Deref;
use itertools::Itertools as _;

use crate::{
    event, parser,
    writer::{self, out::Styles},
    Writer,
};

/// Execution statistics.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Stats {
    /// Number of passed [`Step`]s (or [`Scenario`]s).
    ///
    /// [`Scenario`]: crate::Scenario
    /// [`Step`]: crate::Step
    pub passed: usize,

    /// Number of skipped [`Step`]s (or [`Scenario`]s).
    ///
    /// [`Scenario`]: crate::Scenario
    /// [`Step`]: crate::Step
    pub skipped: usize,

    /// Number of failed [`Step`]s (or [`Scenario`]s).
    ///
    /// [`Scenario`]: crate::Scenario
    /// [`Step`]: crate::Step
    pub failed: usize,
}

impl Stats {
    /// Returns total number of [`Step`]s (or [`Scenario`]s), these [`Stats`]
    /// have been collected for.
    ///
    /// [`Scenario`]: crate::Scenario
    /// [`Step`]: crate::Step
    #[must_use]
    pub const fn total(&self) -> usize {
        self.passed + self.skipped + self.failed
    }
}

/// Possible states of a [`Summarize`] [`Writer`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    /// [`Finished`] event hasn't been encountered yet.
    ///
    /// [`Finished`]: event::Cucumber::Finished
    InProgress,

    /// [`Finished`] event was encountered, but summary hasn't been output yet.
    ///
    /// [`Finished`]: event::Cucumber::Finished
    FinishedButNotOutput,

    /// [`Finished`] event was encountered and summary was output.
    ///
    /// [`Finished`]: event::Cucumber::Finished
    FinishedAndOutput,
}

/// Wrapper for a [`Writer`] for outputting an execution summary (number of
/// executed features, scenarios, steps and parsing errors).
///
/// Underlying [`Writer`] has to be an [`Arbitrary`] one accepting [`String`]
/// to output the summary with.
///
/// [`Arbitrary`]: writer::Arbitrary
#[derive(Clone, Debug, Deref)]
pub struct Summarize<Writer> {
    /// Original [`Writer`] to summarize output of.
    #[deref]
    pub writer: Writer,

    /// Number of started [`Feature`]s.
    ///
    /// [`Feature`]: crate::Feature
    pub features: usize,

    /// [`Scenario`]s [`Stats`]. Ignored [`Scenario`]s count as skipped.
    ///
    /// [`Scenario`]: crate::Scenario
    pub scenarios: Stats,

    /// [`Step`]s [`Stats`].
    ///
    /// [`Step`]: crate::Step
    pub steps: Stats,

    /// Number of [`Parser`] errors.
    ///
    /// [`Parser`]: crate::Parser
    pub parsing_errors: usize,

    /// Number of diagnostic [`Artifact`]s attached to failed [`Scenario`]s.
    ///
    /// [`Artifact`]: crate::Artifact
    /// [`Scenario`]: crate::Scenario
    pub artifacts: usize,

    /// Current [`State`] of this [`Writer`].
    state: State,
}

impl<Wr> Writer for Summarize<Wr>
where
    Wr: writer::Arbitrary<String>,
{
    type Cli = Wr::Cli;

    async fn handle_event(
        &mut self,
        ev: parser::Result<event::Cucumber>,
        cli: &Self::Cli,
    ) {
        use event::{Cucumber, Feature};

        // Once `Cucumber::Finished` is emitted, events are just passed
        // through, without collecting `Stats`.
        if self.state == State::InProgress {
            match &ev {
                Err(_) => self.parsing_errors += 1,
                Ok(Cucumber::Feature(_, ev)) => match ev {
                    Feature::Started => self.features += 1,
                    Feature::Scenario(_, ev) => self.handle_scenario(ev),
                    Feature::Finished => {}
                },
                Ok(Cucumber::Finished) => {
                    self.state = State::FinishedButNotOutput;
                }
                Ok(Cucumber::Started) => {}
            }
        }

        self.writer.handle_event(ev, cli).await;

        if self.state == State::FinishedButNotOutput {
            self.state = State::FinishedAndOutput;
            let summary = Styles::new().summary(self);
            self.writer.write(summary).await;
        }
    }
}

impl<Wr, Val> writer::Arbitrary<Val> for Summarize<Wr>
where
    Wr: writer::Arbitrary<Val> + writer::Arbitrary<String>,
{
    async fn write(&mut self, val: Val) {
        <Wr as writer::Arbitrary<Val>>::write(&mut self.writer, val).await;
    }
}

impl<Wr> writer::Stats for Summarize<Wr>
where
    Self: Writer,
{
    fn passed_scenarios(&self) -> usize {
        self.scenarios.passed
    }

    fn skipped_scenarios(&self) -> usize {
        self.scenarios.skipped
    }

    fn failed_scenarios(&self) -> usize {
        self.scenarios.failed
    }

    fn failed_steps(&self) -> usize {
        self.steps.failed
    }

    fn parsing_errors(&self) -> usize {
        self.parsing_errors
    }
}

impl<Writer> From<Writer> for Summarize<Writer> {
    fn from(writer: Writer) -> Self {
        Self {
            writer,
            features: 0,
            scenarios: Stats::default(),
            steps: Stats::default(),
            parsing_errors: 0,
            artifacts: 0,
            state: State::InProgress,
        }
    }
}

impl<Writer> Summarize<Writer> {
    /// Wraps the given [`Writer`] into a new [`Summarize`]d one.
    #[must_use]
    pub fn new(writer: Writer) -> Self {
        Self::from(writer)
    }

    /// Returns the original [`Writer`], wrapped by this [`Summarize`] one.
    #[must_use]
    pub fn into_inner(self) -> Writer {
        self.writer
    }

    /// Keeps track of [`Scenario`]'s [`Stats`].
    ///
    /// [`Scenario`]: crate::Scenario
    fn handle_scenario(&mut self, ev: &event::Scenario) {
        use event::{Scenario, Step, Verdict};

        match ev {
            Scenario::Started => {}
            Scenario::Ignored => self.scenarios.skipped += 1,
            Scenario::Background(_, ev) | Scenario::Step(_, ev) => match ev {
                Step::Started => {}
                Step::Passed(_) => self.steps.passed += 1,
                Step::Failed(_) => self.steps.failed += 1,
            },
            Scenario::Finished(Verdict::Passed) => self.scenarios.passed += 1,
            Scenario::Finished(Verdict::Failed { artifacts, .. }) => {
                self.scenarios.failed += 1;
                self.artifacts += artifacts.len();
            }
        }
    }
}

// Kept here, as it's related to summarization only.
#[allow(clippy::multiple_inherent_impl)]
impl Styles {
    /// Generates a formatted summary [`String`].
    #[must_use]
    pub fn summary<W>(&self, summary: &Summarize<W>) -> String {
        let features = self.maybe_plural("feature", summary.features);

        let scenarios =
            self.maybe_plural("scenario", summary.scenarios.total());
        let scenarios_stats = self.format_stats(summary.scenarios);

        let steps = self.maybe_plural("step", summary.steps.total());
        let steps_stats = self.format_stats(summary.steps);

        let artifacts = (summary.artifacts > 0)
            .then(|| {
                format!(
                    "{}\n",
                    self.maybe_plural("artifact", summary.artifacts),
                )
            })
            .unwrap_or_default();

        let parsing_errors = (summary.parsing_errors > 0)
            .then(|| {
                self.err(
                    self.maybe_plural("parsing error", summary.parsing_errors),
                )
            })
            .unwrap_or_default();

        format!(
            "{}\n{features}\n{scenarios}{scenarios_stats}\n\
             {steps}{steps_stats}\n{artifacts}{parsing_errors}",
            self.bold(self.header("[Summary]")),
        )
        .trim_end_matches('\n')
        .to_owned()
    }

    /// Formats [`Stats`] for a terminal output.
    #[must_use]
    pub fn format_stats(&self, stats: Stats) -> Cow<'static, str> {
        let formatted = [
            (stats.passed > 0)
                .then(|| self.bold(self.ok(format!("{} passed", stats.passed))))
                .unwrap_or_default(),
            (stats.skipped > 0)
                .then(|| {
                    self.bold(
                        self.skipped(format!("{} skipped", stats.skipped)),
                    )
                })
                .unwrap_or_default(),
            (stats.failed > 0)
                .then(|| {
                    self.bold(self.err(format!("{} failed", stats.failed)))
                })
                .unwrap_or_default(),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .join(&self.bold(", "));

        (!formatted.is_empty())
            .then(|| {
                self.bold(format!(
                    " {}{formatted}{}",
                    self.bold("("),
                    self.bold(")"),
                ))
            })
            .unwrap_or_default()
    }

    /// Adds `s` to `singular` if the given `num` is not `1`.
    fn maybe_plural(
        &self,
        singular: impl Into<Cow<'static, str>>,
        num: usize,
    ) -> Cow<'static, str> {
        self.bold(format!(
            "{num} {}{}",
            singular.into(),
            if num == 1 { "" } else { "s" },
        ))
    }
}
