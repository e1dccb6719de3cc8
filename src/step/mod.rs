// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Step definitions and their matching.
//!
//! A step definition is a [`Pattern`] paired with a [`Handler`]. All of
//! them live in a [`Collection`], which resolves a step's text to the first
//! matching definition.

pub mod collection;
pub mod context;
pub mod error;
pub mod expression;
pub mod location;
pub mod pattern;
pub mod regex;

use futures::future::LocalBoxFuture;

#[doc(inline)]
pub use self::{
    collection::{Collection, Definition, Match},
    context::{Argument, Context},
    error::{Failure, Info},
    expression::{Expression, ExpressionError},
    location::Location,
    pattern::Pattern,
    regex::HashableRegex,
};

/// Alias for a step function that returns a [`LocalBoxFuture`].
///
/// Receives the per-scenario `World` mutably, so a step can use the browser
/// session and keep its state there, and the [`Context`] with the step's
/// arguments.
pub type Handler<World> = for<'a> fn(
    &'a mut World,
    Context,
) -> LocalBoxFuture<'a, anyhow::Result<()>>;
