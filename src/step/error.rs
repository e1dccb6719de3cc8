// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Reasons of a step failure.

use std::{any::Any, sync::Arc};

use derive_more::with_trait::{Display, Error};

/// Alias for a [`catch_unwind()`] error.
///
/// [`catch_unwind()`]: std::panic::catch_unwind()
pub type Info = Box<dyn Any + Send + 'static>;

/// Reason of a failed step.
#[derive(Clone, Debug, Display, Error)]
pub enum Failure {
    /// No step definition matches the step text.
    #[display("Step is not defined: {text}")]
    Undefined {
        /// Text nothing matched.
        #[error(not(source))]
        text: String,
    },

    /// Step handler returned an error.
    ///
    /// The error is kept exactly as the handler returned it.
    #[display("{_0:#}")]
    Error(#[error(not(source))] Arc<anyhow::Error>),

    /// Step handler panicked.
    #[display("Step panicked: {_0}")]
    Panic(#[error(not(source))] String),

    /// Browser session couldn't be started, so no step has run.
    #[display("Failed to start a session: {_0}")]
    Session(#[error(not(source))] String),
}

impl Failure {
    /// Creates a [`Failure::Panic`] out of the [`catch_unwind()`] payload.
    ///
    /// [`catch_unwind()`]: std::panic::catch_unwind()
    #[must_use]
    pub fn from_panic(info: Info) -> Self {
        let msg = info
            .downcast_ref::<String>()
            .cloned()
            .or_else(|| info.downcast_ref::<&str>().map(|s| (*s).to_owned()))
            .unwrap_or_else(|| "(Could not resolve panic payload)".to_owned());
        Self::Panic(msg)
    }

    /// Returns the handler error, if this is a [`Failure::Error`].
    #[must_use]
    pub fn as_error(&self) -> Option<&anyhow::Error> {
        match self {
            Self::Error(e) => Some(e),
            Self::Undefined { .. } | Self::Panic(_) | Self::Session(_) => None,
        }
    }

    /// Indicates whether no step definition matched.
    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined { .. })
    }
}

impl From<anyhow::Error> for Failure {
    fn from(e: anyhow::Error) -> Self {
        Self::Error(Arc::new(e))
    }
}
