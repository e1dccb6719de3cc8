// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tools for executing [`Step`]s.
//!
//! [`Step`]: crate::Step

pub mod basic;
mod executor;

use futures::Stream;

use crate::{event, parser, Feature};

#[doc(inline)]
pub use self::{basic::Basic, executor::State};

/// Executor of [`Parser`] output producing [`Cucumber`] events for [`Writer`].
///
/// # Order guarantees
///
/// Implementors are expected to source events in a [happened-before] order.
/// [`event::Scenario::Started`] of a single [`Scenario`] should predate any
/// other event of this [`Scenario`], while [`event::Scenario::Finished`]
/// should be the last one. [`Step`] events of a [`Scenario`] are emitted in
/// the order the [`Step`]s run: [`Background`] ones first. As [`Scenario`]s
/// may run concurrently, events of one [`Scenario`] can be interleaved with
/// events of another one.
///
/// [`Background`]: crate::Background
/// [`Cucumber`]: event::Cucumber
/// [`Parser`]: crate::Parser
/// [`Scenario`]: crate::Scenario
/// [`Step`]: crate::Step
/// [`Writer`]: crate::Writer
///
/// [happened-before]: https://en.wikipedia.org/wiki/Happened-before
pub trait Runner {
    /// CLI options of this [`Runner`]. In case no options should be introduced,
    /// just use [`cli::Empty`].
    ///
    /// All CLI options from [`Parser`], [`Runner`] and [`Writer`] will be
    /// merged together, so overlapping arguments will cause a runtime panic.
    ///
    /// [`cli::Empty`]: crate::cli::Empty
    /// [`Parser`]: crate::Parser
    /// [`Writer`]: crate::Writer
    type Cli: clap::Args;

    /// Output events [`Stream`].
    type EventStream: Stream<Item = parser::Result<event::Cucumber>>;

    /// Executes the given [`Stream`] of [`Feature`]s transforming it into
    /// a [`Stream`] of executed [`Cucumber`] events.
    ///
    /// [`Cucumber`]: event::Cucumber
    fn run<S>(self, features: S, cli: Self::Cli) -> Self::EventStream
    where
        S: Stream<Item = parser::Result<Feature>> + 'static;
}
