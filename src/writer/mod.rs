// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tools for outputting [`Cucumber`] events.
//!
//! [`Cucumber`]: crate::event::Cucumber

pub mod basic;
pub mod out;
pub mod summarize;

use std::future::Future;

use crate::{event, parser};

#[doc(inline)]
pub use self::{
    basic::Basic,
    out::Coloring,
    summarize::Summarize,
};

/// Writer of [`Cucumber`] events to some output.
///
/// [`Cucumber`]: event::Cucumber
pub trait Writer {
    /// CLI options of this [`Writer`]. In case no options should be
    /// introduced, just use [`cli::Empty`].
    ///
    /// All CLI options from [`Parser`], [`Runner`] and [`Writer`] will be
    /// merged together, so overlapping arguments will cause a runtime panic.
    ///
    /// [`cli::Empty`]: crate::cli::Empty
    /// [`Parser`]: crate::Parser
    /// [`Runner`]: crate::Runner
    type Cli: clap::Args;

    /// Handles the given [`Cucumber`] event.
    ///
    /// [`Cucumber`]: event::Cucumber
    fn handle_event(
        &mut self,
        ev: parser::Result<event::Cucumber>,
        cli: &Self::Cli,
    ) -> impl Future<Output = ()>;
}

/// [`Writer`] that also can output an arbitrary `Value` in addition to
/// regular [`Cucumber`] events.
///
/// [`Cucumber`]: event::Cucumber
pub trait Arbitrary<Value>: Writer {
    /// Writes `val` to the [`Writer`]'s output.
    fn write(&mut self, val: Value) -> impl Future<Output = ()>;
}

/// [`Writer`] tracking a number of executed, failed and skipped
/// [`Scenario`]s and of parsing errors.
///
/// [`Scenario`]: crate::Scenario
pub trait Stats: Writer {
    /// Returns number of passed [`Scenario`]s.
    ///
    /// [`Scenario`]: crate::Scenario
    #[must_use]
    fn passed_scenarios(&self) -> usize;

    /// Returns number of skipped [`Scenario`]s.
    ///
    /// [`Scenario`]: crate::Scenario
    #[must_use]
    fn skipped_scenarios(&self) -> usize;

    /// Returns number of failed [`Scenario`]s.
    ///
    /// [`Scenario`]: crate::Scenario
    #[must_use]
    fn failed_scenarios(&self) -> usize;

    /// Returns number of failed [`Step`]s.
    ///
    /// [`Step`]: crate::Step
    #[must_use]
    fn failed_steps(&self) -> usize;

    /// Returns number of parsing errors.
    #[must_use]
    fn parsing_errors(&self) -> usize;

    /// Indicates whether there were failures during execution.
    #[must_use]
    fn execution_has_failed(&self) -> bool {
        self.failed_scenarios() > 0 || self.parsing_errors() > 0
    }
}

/// Extension of [`Writer`] allowing its summarization.
pub trait Ext: Sized {
    /// Wraps this [`Writer`] to print a summary at the end of an output.
    ///
    /// See [`Summarize`] for more information.
    #[must_use]
    fn summarized(self) -> Summarize<Self>;
}

impl<T: Writer> Ext for T {
    fn summarized(self) -> Summarize<Self> {
        Summarize::from(self)
    }
}
