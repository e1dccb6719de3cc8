// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Registry of step definitions.

use std::fmt;

use crate::feature::StepType;

use super::{Handler, Location, Pattern};

/// Single registered step definition.
pub struct Definition<World> {
    /// [`Pattern`] to match step text against.
    pub pattern: Pattern,

    /// Keyword this definition was registered with.
    ///
    /// Used for reporting only: a `Given` definition matches a `Then` step
    /// just as well.
    pub keyword: Option<StepType>,

    /// Function executing the step.
    pub handler: Handler<World>,

    /// Where this definition was registered.
    pub location: Option<Location>,
}

// Implemented manually to omit redundant `World: Clone` trait bound, imposed by
// `#[derive(Clone)]`.
impl<World> Clone for Definition<World> {
    fn clone(&self) -> Self {
        Self {
            pattern: self.pattern.clone(),
            keyword: self.keyword,
            handler: self.handler,
            location: self.location,
        }
    }
}

// Implemented manually to omit redundant `World: Debug` trait bound.
impl<World> fmt::Debug for Definition<World> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definition")
            .field("pattern", &self.pattern)
            .field("keyword", &self.keyword)
            .field("handler", &(self.handler as *const ()))
            .field("location", &self.location)
            .finish()
    }
}

/// Successful match of a step text by a [`Definition`].
#[derive(Debug)]
pub struct Match<'me, World> {
    /// Matched [`Definition`].
    pub definition: &'me Definition<World>,

    /// Captured arguments, in order.
    pub captures: Vec<String>,
}

/// Ordered, append-only registry of step [`Definition`]s.
///
/// Definitions are tried in registration order, and the first one matching
/// wins, so registering a more specific [`Pattern`] earlier shadows a more
/// general one registered later.
///
/// The registry is built up front and then handed to the runner, which only
/// ever reads it.
///
/// # Example
///
/// ```rust
/// # use cucumber_browser::step::{Collection, Context, Pattern};
/// # use futures::{future::LocalBoxFuture, FutureExt as _};
/// #
/// fn click(_: &mut (), _: Context) -> LocalBoxFuture<'_, anyhow::Result<()>> {
///     async { Ok(()) }.boxed_local()
/// }
///
/// let steps = Collection::new()
///     .when(Pattern::regex(r#"^I click "(.*)"$"#)?, click)
///     .when("I pause", click);
///
/// let m = steps.find(r#"I click "Save""#).unwrap();
/// assert_eq!(m.captures, ["Save"]);
/// assert!(steps.find("I pause").unwrap().captures.is_empty());
/// assert!(steps.find("I vanish").is_none());
/// # Ok::<_, regex::Error>(())
/// ```
pub struct Collection<World> {
    definitions: Vec<Definition<World>>,
}

// Implemented manually to omit redundant `World: Clone` trait bound, imposed by
// `#[derive(Clone)]`.
impl<World> Clone for Collection<World> {
    fn clone(&self) -> Self {
        Self { definitions: self.definitions.clone() }
    }
}

// Implemented manually to omit redundant `World: Default` trait bound, imposed
// by `#[derive(Default)]`.
impl<World> Default for Collection<World> {
    fn default() -> Self {
        Self { definitions: Vec::new() }
    }
}

impl<World> fmt::Debug for Collection<World> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.definitions).finish()
    }
}

impl<World> Collection<World> {
    /// Creates a new empty [`Collection`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new [`Definition`].
    ///
    /// No validation happens: registering the same [`Pattern`] twice is
    /// allowed, and only the first one will ever match.
    #[must_use]
    #[track_caller]
    pub fn register(
        mut self,
        pattern: impl Into<Pattern>,
        keyword: Option<StepType>,
        handler: Handler<World>,
    ) -> Self {
        self.definitions.push(Definition {
            pattern: pattern.into(),
            keyword,
            handler,
            location: Some(Location::caller()),
        });
        self
    }

    /// Appends a [Given] step [`Definition`].
    ///
    /// [Given]: https://cucumber.io/docs/gherkin/reference#given
    #[must_use]
    #[track_caller]
    pub fn given(
        self,
        pattern: impl Into<Pattern>,
        handler: Handler<World>,
    ) -> Self {
        self.register(pattern, Some(StepType::Given), handler)
    }

    /// Appends a [When] step [`Definition`].
    ///
    /// [When]: https://cucumber.io/docs/gherkin/reference#when
    #[must_use]
    #[track_caller]
    pub fn when(
        self,
        pattern: impl Into<Pattern>,
        handler: Handler<World>,
    ) -> Self {
        self.register(pattern, Some(StepType::When), handler)
    }

    /// Appends a [Then] step [`Definition`].
    ///
    /// [Then]: https://cucumber.io/docs/gherkin/reference#then
    #[must_use]
    #[track_caller]
    pub fn then(
        self,
        pattern: impl Into<Pattern>,
        handler: Handler<World>,
    ) -> Self {
        self.register(pattern, Some(StepType::Then), handler)
    }

    /// Appends all the [`Definition`]s of the `other` [`Collection`] after
    /// the existing ones.
    #[must_use]
    pub fn extend(mut self, other: Self) -> Self {
        self.definitions.extend(other.definitions);
        self
    }

    /// Returns the first [`Definition`] matching the given step `text`,
    /// along with the captured arguments.
    #[must_use]
    pub fn find(&self, text: &str) -> Option<Match<'_, World>> {
        self.definitions.iter().find_map(|definition| {
            definition
                .pattern
                .captures(text)
                .map(|captures| Match { definition, captures })
        })
    }

    /// Iterates over all the [`Definition`]s in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Definition<World>> {
        self.definitions.iter()
    }

    /// Number of registered [`Definition`]s.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Indicates whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use futures::{future::LocalBoxFuture, FutureExt as _};

    use super::*;
    use crate::step::Context;

    #[derive(Default)]
    struct Calls(Vec<&'static str>);

    fn first(w: &mut Calls, _: Context) -> LocalBoxFuture<'_, anyhow::Result<()>> {
        w.0.push("first");
        async { Ok(()) }.boxed_local()
    }

    fn second(w: &mut Calls, _: Context) -> LocalBoxFuture<'_, anyhow::Result<()>> {
        w.0.push("second");
        async { Ok(()) }.boxed_local()
    }

    fn registry() -> Collection<Calls> {
        Collection::new()
            .register(Pattern::regex(r#"^I click "(.*)"$"#).unwrap(), None, first)
            .register("I pause", None, second)
    }

    #[test]
    fn registration_order_example() {
        let steps = registry();

        let click = steps.find(r##"I click "#ok""##).unwrap();
        assert_eq!(click.captures, ["#ok"]);
        assert!(matches!(click.definition.pattern, Pattern::Regex(_)));

        let pause = steps.find("I pause").unwrap();
        assert!(pause.captures.is_empty());
        assert_eq!(pause.definition.pattern, Pattern::from("I pause"));

        assert!(steps.find("I vanish").is_none());
    }

    #[test]
    fn first_registered_wins() {
        let steps = Collection::new()
            .given(Pattern::regex("^I (.+)$").unwrap(), first)
            .then("I pause", second);

        let m = steps.find("I pause").unwrap();
        let mut calls = Calls::default();
        _ = futures::executor::block_on((m.definition.handler)(
            &mut calls,
            Context::new(crate::Step::new("I pause", "I pause"), m.captures),
        ));
        assert_eq!(calls.0, ["first"]);
    }

    #[test]
    fn keyword_does_not_restrict_matching() {
        let steps = Collection::new().given("I pause", second);
        let m = steps.find("I pause").unwrap();
        assert_eq!(m.definition.keyword, Some(StepType::Given));
    }

    #[test]
    fn records_registration_location() {
        let line = line!() + 1;
        let steps = Collection::<Calls>::new().when("x", first);

        let loc = steps.iter().next().unwrap().location.unwrap();
        assert_eq!(loc.line, line);
        assert!(loc.path.ends_with("collection.rs"));
    }

    #[test]
    fn extend_preserves_order() {
        let steps = registry().extend(Collection::new().when("I pause", first));

        assert_eq!(steps.len(), 3);
        let m = steps.find("I pause").unwrap();
        assert_eq!(m.definition.keyword, None);
    }
}
