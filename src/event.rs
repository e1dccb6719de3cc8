// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Key occurrences in the lifecycle of a run.
//!
//! The top-level enum here is [`Cucumber`].
//!
//! Each event enum contains variants indicating what stage of execution the
//! [`runner::Basic`] is at, and variants with detailed content about the
//! precise sub-event.
//!
//! [`runner::Basic`]: crate::runner::Basic

use std::sync::Arc;

use crate::{feature, step, Artifact};

/// Top-level run event.
#[derive(Clone, Debug)]
pub enum Cucumber {
    /// Run has started.
    Started,

    /// [`Feature`] event.
    Feature(Arc<feature::Feature>, Feature),

    /// Run has finished.
    Finished,
}

impl Cucumber {
    /// Constructs an event of a [`Feature`] being started.
    #[must_use]
    pub fn feature_started(feature: Arc<feature::Feature>) -> Self {
        Self::Feature(feature, Feature::Started)
    }

    /// Constructs an event of a finished [`Feature`].
    #[must_use]
    pub fn feature_finished(feature: Arc<feature::Feature>) -> Self {
        Self::Feature(feature, Feature::Finished)
    }

    /// Constructs a [`Scenario`] event.
    #[must_use]
    pub fn scenario(
        feature: Arc<feature::Feature>,
        scenario: Arc<feature::Scenario>,
        event: Scenario,
    ) -> Self {
        Self::Feature(feature, Feature::Scenario(scenario, event))
    }
}

/// Event specific to a particular [Feature].
///
/// [Feature]: https://cucumber.io/docs/gherkin/reference#feature
#[derive(Clone, Debug)]
pub enum Feature {
    /// [`Feature`] execution has started.
    ///
    /// [`Feature`]: feature::Feature
    Started,

    /// [`Scenario`] event.
    Scenario(Arc<feature::Scenario>, Scenario),

    /// [`Feature`] execution has finished.
    ///
    /// [`Feature`]: feature::Feature
    Finished,
}

/// Event specific to a particular [Scenario].
///
/// [Scenario]: https://cucumber.io/docs/gherkin/reference#example
#[derive(Clone, Debug)]
pub enum Scenario {
    /// [`Scenario`] carries the [`tag::IGNORE`] tag and won't run.
    ///
    /// [`Scenario`]: feature::Scenario
    /// [`tag::IGNORE`]: crate::tag::IGNORE
    Ignored,

    /// [`Scenario`] execution has started.
    ///
    /// [`Scenario`]: feature::Scenario
    Started,

    /// [`Background`] [`Step`] event.
    ///
    /// [`Background`]: feature::Background
    Background(Arc<feature::Step>, Step),

    /// [`Step`] event.
    Step(Arc<feature::Step>, Step),

    /// [`Scenario`] execution has finished.
    ///
    /// [`Scenario`]: feature::Scenario
    Finished(Verdict),
}

impl Scenario {
    /// Constructs a [`Step`] event, marking it as a [`Background`] one if
    /// `background` is `true`.
    ///
    /// [`Background`]: feature::Background
    #[must_use]
    pub fn step(
        step: Arc<feature::Step>,
        event: Step,
        background: bool,
    ) -> Self {
        if background {
            Self::Background(step, event)
        } else {
            Self::Step(step, event)
        }
    }
}

/// Event specific to a particular [Step].
///
/// [Step]: https://cucumber.io/docs/gherkin/reference#steps
#[derive(Clone, Debug)]
pub enum Step {
    /// [`Step`] execution has started.
    ///
    /// [`Step`]: feature::Step
    Started,

    /// [`Step`] has passed, with the arguments captured by its definition.
    ///
    /// [`Step`]: feature::Step
    Passed(Vec<String>),

    /// [`Step`] has failed.
    ///
    /// [`Step`]: feature::Step
    Failed(step::Failure),
}

/// Final outcome of a [`Scenario`].
///
/// [`Scenario`]: feature::Scenario
#[derive(Clone, Debug)]
pub enum Verdict {
    /// Every [`Step`] has passed.
    ///
    /// [`Step`]: feature::Step
    Passed,

    /// [`Scenario`] stopped at its first failed [`Step`].
    ///
    /// [`Scenario`]: feature::Scenario
    /// [`Step`]: feature::Step
    Failed {
        /// Reason of the failure, exactly as it happened.
        failure: step::Failure,

        /// Diagnostics captured from the session at the moment of failure.
        artifacts: Vec<Arc<Artifact>>,
    },
}

impl Verdict {
    /// Indicates whether this is a [`Verdict::Failed`].
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}
