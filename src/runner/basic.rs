// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Default [`Runner`] implementation.

use std::{cell::Cell, fmt, sync::Arc};

use futures::{
    channel::mpsc,
    future::{self, Either},
    pin_mut,
    stream::{self, LocalBoxStream},
    FutureExt as _, Stream, StreamExt as _,
};
use regex::Regex;

use super::{executor::Executor, Runner};
use crate::{
    event, parser, step,
    tag::{self, Decision},
    Feature, Scenario, Session, World,
};

/// CLI options of a [`Basic`] [`Runner`].
#[derive(clap::Args, Clone, Copy, Debug, Default)]
#[group(skip)]
pub struct Cli {
    /// Number of scenarios of a single feature to run concurrently. If not
    /// specified, uses the value configured in tests runner, or 1 by default.
    #[arg(long, short, value_name = "int", global = true)]
    pub concurrency: Option<usize>,

    /// Stop scheduling new scenarios after the first failure.
    #[arg(long, global = true)]
    pub fail_fast: bool,
}

/// Default [`Runner`] implementation.
///
/// [`Feature`]s run one after another. [`Scenario`]s of a single [`Feature`]
/// run concurrently up to the configured limit, each in its own
/// [`Session`], while [`Step`]s of a [`Scenario`] always run sequentially.
///
/// [`Scenario`]: crate::Scenario
/// [`Step`]: crate::Step
pub struct Basic<S: Session> {
    /// [`Collection`] of step definitions to match [`Step`]s against.
    ///
    /// [`Collection`]: step::Collection
    /// [`Step`]: crate::Step
    steps: step::Collection<World<S>>,

    /// Optional number of concurrently executed [`Scenario`]s.
    ///
    /// [`Scenario`]: crate::Scenario
    max_concurrent_scenarios: Option<usize>,

    /// Indicates whether execution should be stopped after the first failure.
    fail_fast: bool,

    /// [`tag::Filter`] a [`Scenario`] should satisfy to run.
    ///
    /// [`Scenario`]: crate::Scenario
    tags: Option<tag::Filter>,

    /// [`Regex`] a [`Scenario`] name should match to run.
    ///
    /// [`Scenario`]: crate::Scenario
    name: Option<Regex>,
}

// Implemented manually to omit redundant `S: Debug` trait bound.
impl<S: Session> fmt::Debug for Basic<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Basic")
            .field("steps", &self.steps)
            .field("max_concurrent_scenarios", &self.max_concurrent_scenarios)
            .field("fail_fast", &self.fail_fast)
            .field("tags", &self.tags)
            .field("name", &self.name)
            .finish()
    }
}

// Implemented manually to omit redundant `S: Default` trait bound.
impl<S: Session> Default for Basic<S> {
    fn default() -> Self {
        Self {
            steps: step::Collection::new(),
            max_concurrent_scenarios: None,
            fail_fast: false,
            tags: None,
            name: None,
        }
    }
}

impl<S: Session> Basic<S> {
    /// Creates a new empty [`Runner`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the step definitions [`Collection`] to use.
    ///
    /// [`Collection`]: step::Collection
    #[must_use]
    pub fn steps(mut self, steps: step::Collection<World<S>>) -> Self {
        self.steps = steps;
        self
    }

    /// If `max` is [`Some`], then number of concurrently executed
    /// [`Scenario`]s of a single [`Feature`] will be limited.
    ///
    /// [`Scenario`]: crate::Scenario
    #[must_use]
    pub fn max_concurrent_scenarios(
        mut self,
        max: impl Into<Option<usize>>,
    ) -> Self {
        self.max_concurrent_scenarios = max.into();
        self
    }

    /// Makes stop running tests on the first failure.
    ///
    /// __NOTE__: Already running [`Scenario`]s will be finished.
    ///
    /// [`Scenario`]: crate::Scenario
    #[must_use]
    pub const fn fail_fast(mut self) -> Self {
        self.fail_fast = true;
        self
    }

    /// Runs only [`Scenario`]s whose effective tags satisfy the given
    /// [`tag::Filter`].
    ///
    /// [`Scenario`]: crate::Scenario
    #[must_use]
    pub fn filter_tags(
        mut self,
        filter: impl Into<Option<tag::Filter>>,
    ) -> Self {
        self.tags = filter.into();
        self
    }

    /// Runs only [`Scenario`]s whose name matches the given [`Regex`].
    ///
    /// [`Scenario`]: crate::Scenario
    #[must_use]
    pub fn filter_name(mut self, regex: impl Into<Option<Regex>>) -> Self {
        self.name = regex.into();
        self
    }

    /// Sets the given filters only if none were configured before.
    pub(crate) fn default_filters(
        mut self,
        tags: Option<tag::Filter>,
        name: Option<Regex>,
    ) -> Self {
        self.tags = self.tags.or(tags);
        self.name = self.name.or(name);
        self
    }
}

impl<S: Session> Runner for Basic<S> {
    type Cli = Cli;

    type EventStream =
        LocalBoxStream<'static, parser::Result<event::Cucumber>>;

    fn run<St>(self, features: St, cli: Cli) -> Self::EventStream
    where
        St: Stream<Item = parser::Result<Feature>> + 'static,
    {
        let Self { steps, max_concurrent_scenarios, fail_fast, tags, name } =
            self;

        let plan = Plan {
            concurrency: cli
                .concurrency
                .or(max_concurrent_scenarios)
                .unwrap_or(1)
                .max(1),
            fail_fast: cli.fail_fast || fail_fast,
            tags,
            name,
        };
        let (sender, receiver) = mpsc::unbounded();
        let execute = execute(features, Executor::new(steps, sender), plan);

        stream::select(
            receiver.map(Either::Left),
            execute.into_stream().map(Either::Right),
        )
        .filter_map(|r| {
            future::ready(match r {
                Either::Left(ev) => Some(ev),
                Either::Right(()) => None,
            })
        })
        .boxed_local()
    }
}

/// Settings of a single run.
struct Plan {
    /// Maximum number of concurrently executed [`Scenario`]s.
    ///
    /// [`Scenario`]: crate::Scenario
    concurrency: usize,

    /// Whether to stop scheduling [`Scenario`]s after the first failure.
    ///
    /// [`Scenario`]: crate::Scenario
    fail_fast: bool,

    tags: Option<tag::Filter>,

    name: Option<Regex>,
}

impl Plan {
    /// Decides whether the given `scenario` of the `feature` runs.
    fn decide(&self, feature: &Feature, scenario: &Scenario) -> Decision {
        let unnamed = |re: &Regex| !re.is_match(&scenario.name);
        match tag::evaluate(self.tags.as_ref(), &feature.tags_of(scenario)) {
            Decision::Admitted if self.name.as_ref().is_some_and(unnamed) => {
                Decision::Filtered
            }
            d => d,
        }
    }
}

/// Executes all the `features` one by one, emitting events via the
/// `executor`.
async fn execute<S, St>(features: St, executor: Executor<S>, plan: Plan)
where
    S: Session,
    St: Stream<Item = parser::Result<Feature>>,
{
    executor.send(Ok(event::Cucumber::Started));

    let failed = Cell::new(false);
    let stopped = || plan.fail_fast && failed.get();

    pin_mut!(features);
    while let Some(feature) = features.next().await {
        if stopped() {
            break;
        }

        let feature = match feature {
            Ok(f) => Arc::new(f),
            Err(e) => {
                tracing::warn!("{e}");
                executor.send(Err(e));
                continue;
            }
        };
        executor.send(Ok(event::Cucumber::feature_started(Arc::clone(
            &feature,
        ))));

        if feature.scenarios.is_empty() {
            tracing::warn!(feature = %feature.name, "feature has no scenarios");
        }

        let mut admitted = Vec::new();
        for scenario in &feature.scenarios {
            match plan.decide(&feature, scenario) {
                Decision::Admitted => admitted.push(Arc::new(scenario.clone())),
                Decision::Ignored => {
                    tracing::warn!(
                        feature = %feature.name,
                        scenario = %scenario.name,
                        "scenario is ignored",
                    );
                    executor.send(Ok(event::Cucumber::scenario(
                        Arc::clone(&feature),
                        Arc::new(scenario.clone()),
                        event::Scenario::Ignored,
                    )));
                }
                Decision::Filtered => {
                    tracing::debug!(
                        feature = %feature.name,
                        scenario = %scenario.name,
                        "scenario is filtered out",
                    );
                }
            }
        }

        stream::iter(admitted)
            .take_while(|_| future::ready(!stopped()))
            .map(|scenario| {
                executor.run_scenario(Arc::clone(&feature), scenario)
            })
            .buffer_unordered(plan.concurrency)
            .for_each(|verdict| {
                if verdict.is_failed() {
                    failed.set(true);
                }
                future::ready(())
            })
            .await;

        executor.send(Ok(event::Cucumber::feature_finished(feature)));
    }

    executor.send(Ok(event::Cucumber::Finished));
}

#[cfg(test)]
mod tests {
    use std::{convert::Infallible, str::FromStr as _};

    use futures::{executor::block_on, future::LocalBoxFuture};

    use super::*;
    use crate::{parser::scan, Artifact};

    struct Page;

    impl Session for Page {
        type Element = ();
        type Error = Infallible;

        async fn new() -> Result<Self, Self::Error> {
            Ok(Self)
        }

        async fn screenshot(&mut self) -> Result<Artifact, Self::Error> {
            Ok(Artifact::png("page.png", Vec::new()))
        }
    }

    fn ok(_: &mut World<Page>, _: step::Context) -> LocalBoxFuture<'_, anyhow::Result<()>> {
        async { Ok(()) }.boxed_local()
    }

    fn fail(_: &mut World<Page>, _: step::Context) -> LocalBoxFuture<'_, anyhow::Result<()>> {
        async { Err(anyhow::anyhow!("nope")) }.boxed_local()
    }

    const FEATURE: &str = "\
@web
Feature: Shop

  @smoke @cart
  Scenario: add
    Given it works

  @smoke
  Scenario: remove
    Given it breaks

  @ignore @smoke
  Scenario: skip
    Given it works

  Scenario: browse
    Given it works
";

    /// Runs the [`FEATURE`] returning `(started, ignored)` scenario names.
    fn run(runner: Basic<Page>, cli: Cli) -> (Vec<String>, Vec<String>) {
        let feature = scan::parse(FEATURE, None).unwrap();
        let events = block_on(
            runner.run(stream::iter([Ok(feature)]), cli).collect::<Vec<_>>(),
        );

        let mut started = Vec::new();
        let mut ignored = Vec::new();
        for ev in events {
            if let Ok(event::Cucumber::Feature(
                _,
                event::Feature::Scenario(sc, ev),
            )) = ev
            {
                match ev {
                    event::Scenario::Started => started.push(sc.name.clone()),
                    event::Scenario::Ignored => ignored.push(sc.name.clone()),
                    _ => {}
                }
            }
        }
        (started, ignored)
    }

    fn runner() -> Basic<Page> {
        Basic::new().steps(
            step::Collection::new()
                .given("it works", ok)
                .given("it breaks", fail),
        )
    }

    #[test]
    fn runs_admitted_scenarios_in_order() {
        let (started, ignored) = run(runner(), Cli::default());

        assert_eq!(started, ["add", "remove", "browse"]);
        assert_eq!(ignored, ["skip"]);
    }

    #[test]
    fn filters_by_tags() {
        let filter = tag::Filter::from_str("smoke+cart,@nothing").unwrap();
        let (started, ignored) = run(runner().filter_tags(filter), Cli::default());

        assert_eq!(started, ["add"]);
        assert_eq!(ignored, ["skip"]);
    }

    #[test]
    fn ignore_wins_over_filter() {
        let filter = tag::Filter::from_str("ignore").unwrap();
        let (started, ignored) = run(runner().filter_tags(filter), Cli::default());

        assert!(started.is_empty());
        assert_eq!(ignored, ["skip"]);
    }

    #[test]
    fn filters_by_name() {
        let (started, _) = run(
            runner().filter_name(Regex::new("^(add|browse)$").unwrap()),
            Cli::default(),
        );

        assert_eq!(started, ["add", "browse"]);
    }

    #[test]
    fn fail_fast_stops_scheduling() {
        let (started, _) = run(runner(), Cli { fail_fast: true, ..Cli::default() });

        assert_eq!(started, ["add", "remove"]);
    }

    #[test]
    fn builder_filters_take_precedence() {
        let tags = tag::Filter::from_str("cart").unwrap();
        let (started, _) = run(
            runner()
                .filter_tags(tags)
                .default_filters(tag::Filter::from_str("web").ok(), None),
            Cli::default(),
        );

        assert_eq!(started, ["add"]);
    }

    #[test]
    fn parsing_errors_are_passed_through() {
        let events = block_on(
            runner()
                .run(
                    stream::iter([Err(parser::Error::Glob {
                        pattern: "[".into(),
                        reason: "unclosed".into(),
                    })]),
                    Cli::default(),
                )
                .collect::<Vec<_>>(),
        );

        assert_eq!(events.len(), 3);
        assert!(matches!(events[1], Err(parser::Error::Glob { .. })));
    }
}
