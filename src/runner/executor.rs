// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Execution of a single [`Scenario`].
//!
//! [`Scenario`]: crate::Scenario

use std::{panic::AssertUnwindSafe, sync::Arc};

use derive_more::with_trait::Display;
use futures::{channel::mpsc, FutureExt as _};

use crate::{
    event, feature, parser,
    step::{self, Failure},
    Artifact, Session, World,
};

/// Lifecycle state of a running [`Scenario`].
///
/// [`Scenario`]: crate::Scenario
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum State {
    /// Admitted, but not started yet.
    #[display("pending")]
    Pending,

    /// [`Step`]s are being executed.
    ///
    /// [`Step`]: crate::Step
    #[display("running")]
    Running,

    /// Every [`Step`] has passed.
    ///
    /// [`Step`]: crate::Step
    #[display("passed")]
    Passed,

    /// Some [`Step`] has failed.
    ///
    /// [`Step`]: crate::Step
    #[display("failed")]
    Failed,
}

impl State {
    /// Indicates whether no further transition is possible.
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Passed | Self::Failed)
    }
}

/// Runs [`Scenario`]s one [`Step`] after another, reporting everything
/// through the events channel.
///
/// [`Scenario`]: crate::Scenario
/// [`Step`]: crate::Step
pub(super) struct Executor<S: Session> {
    /// Read-only registry of step definitions.
    steps: step::Collection<World<S>>,

    /// Sender of the produced events.
    sender: mpsc::UnboundedSender<parser::Result<event::Cucumber>>,
}

impl<S: Session> Executor<S> {
    /// Creates a new [`Executor`].
    pub(super) const fn new(
        steps: step::Collection<World<S>>,
        sender: mpsc::UnboundedSender<parser::Result<event::Cucumber>>,
    ) -> Self {
        Self { steps, sender }
    }

    /// Sends the given event, ignoring a closed receiver.
    pub(super) fn send(&self, event: parser::Result<event::Cucumber>) {
        // Receiver being dropped means nobody is interested in events anymore.
        _ = self.sender.unbounded_send(event);
    }

    /// Executes the given `scenario` of the `feature` in a fresh [`Session`].
    ///
    /// [`Background`] steps run first. The first failed step stops the
    /// [`Scenario`]. When the failure comes from a step handler, a single
    /// page capture is attached to the returned [`Verdict`].
    ///
    /// [`Background`]: crate::Background
    /// [`Scenario`]: crate::Scenario
    /// [`Verdict`]: event::Verdict
    pub(super) async fn run_scenario(
        &self,
        feature: Arc<feature::Feature>,
        scenario: Arc<feature::Scenario>,
    ) -> event::Verdict {
        let emit = |ev: event::Scenario| {
            self.send(Ok(event::Cucumber::scenario(
                Arc::clone(&feature),
                Arc::clone(&scenario),
                ev,
            )));
        };
        let mut state = State::Pending;
        let mut advance = |next: State| {
            tracing::debug!(
                scenario = %scenario.name,
                from = %state,
                to = %next,
                "scenario state changed",
            );
            state = next;
        };

        emit(event::Scenario::Started);
        advance(State::Running);

        let verdict = match S::new().await {
            Ok(session) => {
                let mut world = World::new(session);
                let mut verdict = event::Verdict::Passed;
                for (step, is_background) in feature.steps_of(&scenario) {
                    let step = Arc::new(step.clone());
                    let step_event = |ev| {
                        let step = Arc::clone(&step);
                        event::Scenario::step(step, ev, is_background)
                    };

                    emit(step_event(event::Step::Started));
                    match self.run_step(&mut world, &step).await {
                        Ok(captures) => {
                            emit(step_event(event::Step::Passed(captures)));
                        }
                        Err(failure) => {
                            let failed = event::Step::Failed(failure.clone());
                            emit(step_event(failed));
                            let artifacts = if failure.is_undefined() {
                                Vec::new()
                            } else {
                                capture(&mut world.session, &scenario.name)
                                    .await
                                    .into_iter()
                                    .collect()
                            };
                            verdict =
                                event::Verdict::Failed { failure, artifacts };
                            break;
                        }
                    }
                }
                verdict
            }
            Err(e) => event::Verdict::Failed {
                failure: Failure::Session(e.to_string()),
                artifacts: Vec::new(),
            },
        };

        match &verdict {
            event::Verdict::Passed => {
                advance(State::Passed);
                tracing::info!(
                    feature = %feature.name,
                    scenario = %scenario.name,
                    "scenario passed",
                );
            }
            event::Verdict::Failed { failure, artifacts } => {
                advance(State::Failed);
                tracing::info!(
                    feature = %feature.name,
                    scenario = %scenario.name,
                    artifacts = artifacts.len(),
                    "scenario failed: {failure}",
                );
            }
        }
        debug_assert!(state.is_final(), "scenario has not finished");

        emit(event::Scenario::Finished(verdict.clone()));
        verdict
    }

    /// Matches the given `step` and awaits its handler.
    ///
    /// Returns the captured arguments on success.
    async fn run_step(
        &self,
        world: &mut World<S>,
        step: &feature::Step,
    ) -> Result<Vec<String>, Failure> {
        let Some(found) = self.steps.find(&step.text) else {
            return Err(Failure::Undefined { text: step.text.clone() });
        };
        tracing::debug!(
            step = %step.text,
            pattern = %found.definition.pattern,
            location = ?found.definition.location,
            "step matched",
        );

        let handler = found.definition.handler;
        let ctx = step::Context::new(step.clone(), found.captures.clone());
        let run = async move { handler(world, ctx).await };

        match AssertUnwindSafe(run).catch_unwind().await {
            Ok(Ok(())) => Ok(found.captures),
            Ok(Err(e)) => Err(e.into()),
            Err(info) => Err(Failure::from_panic(info)),
        }
    }
}

/// Takes a full-page capture of the `session`.
///
/// A capture failure is only logged: the step failure it accompanies is what
/// gets reported.
async fn capture<S: Session>(
    session: &mut S,
    scenario: &str,
) -> Option<Arc<Artifact>> {
    match AssertUnwindSafe(session.screenshot()).catch_unwind().await {
        Ok(Ok(artifact)) => Some(Arc::new(artifact)),
        Ok(Err(e)) => {
            tracing::warn!(scenario, "failed to capture the page: {e}");
            None
        }
        Err(info) => {
            tracing::warn!(
                scenario,
                "page capture panicked: {}",
                Failure::from_panic(info),
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, convert::Infallible};

    use futures::{executor::block_on, future::LocalBoxFuture, StreamExt as _};

    use super::*;
    use crate::parser::scan;

    thread_local! {
        static SHOTS: Cell<usize> = const { Cell::new(0) };
    }

    struct Page;

    impl Session for Page {
        type Element = ();
        type Error = Infallible;

        async fn new() -> Result<Self, Self::Error> {
            Ok(Self)
        }

        async fn screenshot(&mut self) -> Result<Artifact, Self::Error> {
            SHOTS.with(|s| s.set(s.get() + 1));
            Ok(Artifact::png("page.png", vec![0; 8]))
        }
    }

    fn visit(w: &mut World<Page>, ctx: step::Context) -> LocalBoxFuture<'_, anyhow::Result<()>> {
        async move {
            let seen = w.var("seen").and_then(|v| v.as_str()).unwrap_or("");
            let seen = format!("{seen}{}", ctx.capture(0).unwrap_or_default());
            _ = w.set_var("seen", seen);
            Ok(())
        }
        .boxed_local()
    }

    fn broken(_: &mut World<Page>, _: step::Context) -> LocalBoxFuture<'_, anyhow::Result<()>> {
        async { Err(anyhow::anyhow!("element `#save` not found")) }.boxed_local()
    }

    fn explode(_: &mut World<Page>, _: step::Context) -> LocalBoxFuture<'_, anyhow::Result<()>> {
        panic!("driver crashed")
    }

    fn executor() -> (
        Executor<Page>,
        mpsc::UnboundedReceiver<parser::Result<event::Cucumber>>,
    ) {
        let steps = step::Collection::new()
            .given(step::Pattern::regex("^I visit (.+)$").unwrap(), visit)
            .when("I save", broken)
            .when("I crash", explode);
        let (tx, rx) = mpsc::unbounded();
        (Executor::new(steps, tx), rx)
    }

    fn run(src: &str) -> (event::Verdict, Vec<event::Scenario>, usize) {
        SHOTS.with(|s| s.set(0));
        let feature = Arc::new(scan::parse(src, None).unwrap());
        let scenario = Arc::new(feature.scenarios[0].clone());
        let (executor, rx) = executor();

        let verdict = block_on(executor.run_scenario(feature, scenario));
        drop(executor);
        let events = block_on(rx.collect::<Vec<_>>())
            .into_iter()
            .map(|ev| match ev {
                Ok(event::Cucumber::Feature(_, event::Feature::Scenario(_, ev))) => ev,
                _ => unreachable!("only scenario events are emitted"),
            })
            .collect();
        (verdict, events, SHOTS.with(Cell::get))
    }

    #[test]
    fn passes_without_artifacts() {
        let (verdict, events, shots) = run(
            "Feature: F\n\
             Background:\n  Given I visit a\n\
             Scenario: S\n  Given I visit b\n",
        );

        assert!(!verdict.is_failed());
        assert_eq!(shots, 0);
        assert!(matches!(events.first(), Some(event::Scenario::Started)));
        assert!(matches!(
            &events[2],
            event::Scenario::Background(s, event::Step::Passed(c))
                if s.text == "I visit a" && c == &["a"],
        ));
        assert!(matches!(
            &events[4],
            event::Scenario::Step(s, event::Step::Passed(_)) if s.text == "I visit b",
        ));
        assert!(matches!(
            events.last(),
            Some(event::Scenario::Finished(event::Verdict::Passed)),
        ));
    }

    #[test]
    fn failure_attaches_single_capture_and_keeps_error() {
        let (verdict, events, shots) = run(
            "Feature: F\n\
             Scenario: S\n  When I save\n  Then I visit never\n",
        );

        assert_eq!(shots, 1);
        let event::Verdict::Failed { failure, artifacts } = verdict else {
            panic!("scenario should fail");
        };
        assert_eq!(failure.to_string(), "element `#save` not found");
        assert_eq!(artifacts.len(), 1);
        assert!(!events.iter().any(|ev| matches!(
            ev,
            event::Scenario::Step(s, _) if s.text == "I visit never",
        )));
    }

    #[test]
    fn panic_is_a_failure() {
        let (verdict, _, shots) = run("Feature: F\nScenario: S\n  When I crash\n");

        assert_eq!(shots, 1);
        assert!(matches!(
            verdict,
            event::Verdict::Failed { failure: Failure::Panic(m), .. }
                if m == "driver crashed",
        ));
    }

    #[test]
    fn undefined_step_has_no_artifact() {
        let (verdict, events, shots) =
            run("Feature: F\nScenario: S\n  When I fly\n  Given I visit x\n");

        assert_eq!(shots, 0);
        assert!(matches!(
            verdict,
            event::Verdict::Failed { failure: Failure::Undefined { text }, artifacts }
                if text == "I fly" && artifacts.is_empty(),
        ));
        assert_eq!(events.len(), 4);
    }

    #[test]
    fn final_states() {
        assert!(!State::Pending.is_final());
        assert!(!State::Running.is_final());
        assert!(State::Passed.is_final());
        assert!(State::Failed.is_final());
        assert_eq!(State::Running.to_string(), "running");
    }
}
