// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Top-level errors of a [`Cucumber`] run.
//!
//! Failures of single steps are [`step::Failure`]s and problems with
//! `.feature` files are [`parser::Error`]s: both are reported as events and
//! only counted here.
//!
//! [`Cucumber`]: crate::Cucumber
//! [`parser::Error`]: crate::parser::Error
//! [`step::Failure`]: crate::step::Failure

use derive_more::{Display, Error};

/// Alias for a [`Result`] with the [`Error`] of this module.
///
/// [`Result`]: std::result::Result
pub type Result<T> = std::result::Result<T, Error>;

/// Error of a whole [`Cucumber`] run.
///
/// [`Cucumber`]: crate::Cucumber
#[derive(Clone, Debug, Display, Error, Eq, PartialEq)]
pub enum Error {
    /// Run has finished, but something has failed.
    #[display("{}", execution_failure(*failed_scenarios, *parsing_errors))]
    Execution {
        /// Number of failed [`Scenario`]s.
        ///
        /// [`Scenario`]: crate::Scenario
        failed_scenarios: usize,

        /// Number of `.feature` files failed to be parsed.
        parsing_errors: usize,
    },

    /// Global [`tracing`] subscriber cannot be installed.
    #[display("Failed to initialize tracing: {_0}")]
    Tracing(#[error(not(source))] String),
}

/// Formats the [`Error::Execution`] message.
fn execution_failure(failed_scenarios: usize, parsing_errors: usize) -> String {
    let plural = |n: usize| if n == 1 { "" } else { "s" };

    let mut msg = Vec::with_capacity(2);
    if failed_scenarios > 0 {
        msg.push(format!(
            "{failed_scenarios} scenario{} failed",
            plural(failed_scenarios),
        ));
    }
    if parsing_errors > 0 {
        msg.push(format!(
            "{parsing_errors} parsing error{}",
            plural(parsing_errors),
        ));
    }
    msg.join(", ")
}
