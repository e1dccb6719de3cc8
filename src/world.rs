// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Browser [`Session`] abstraction and the per-scenario [`World`].

use std::{collections::HashMap, fmt, future::Future};

use derive_more::with_trait::Debug;
use serde_json::Value;

/// Browser automation session (one page) driven by steps.
///
/// A fresh [`Session`] is created for every [scenario][0] and dropped once the
/// [scenario][0] ends, so nothing leaks between [scenarios][0].
///
/// [0]: https://cucumber.io/docs/gherkin/reference#example
pub trait Session: Sized + 'static {
    /// Handle of an element located on a page.
    type Element;

    /// Error of the underlying driver.
    type Error: fmt::Display;

    /// Starts a new [`Session`].
    fn new() -> impl Future<Output = Result<Self, Self::Error>>;

    /// Takes a full-page capture of the current page.
    fn screenshot(
        &mut self,
    ) -> impl Future<Output = Result<Artifact, Self::Error>>;
}

/// Diagnostic file attached to a failed [scenario][0].
///
/// [0]: https://cucumber.io/docs/gherkin/reference#example
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Artifact {
    /// Name of this [`Artifact`], like `screenshot.png`.
    pub name: String,

    /// [MIME type][1] of the [`Artifact::bytes`].
    ///
    /// [1]: https://developer.mozilla.org/en-US/docs/Web/HTTP/Basics_of_HTTP/MIME_types
    pub mime: String,

    /// Raw content.
    #[debug("<{} bytes>", bytes.len())]
    pub bytes: Vec<u8>,
}

impl Artifact {
    /// Creates a new PNG screenshot [`Artifact`].
    #[must_use]
    pub fn png(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), mime: "image/png".into(), bytes }
    }
}

/// Per-scenario state handed to every step handler.
///
/// Owned by the scenario executor. Handlers keep here whatever they need to
/// pass to later steps, instead of attaching it to the [`Session`].
pub struct World<S: Session> {
    /// Browser [`Session`] of the [scenario][0].
    ///
    /// [0]: https://cucumber.io/docs/gherkin/reference#example
    pub session: S,

    /// Element the previous steps have focused on.
    pub active_element: Option<S::Element>,

    /// Elements the previous steps have collected.
    pub active_elements: Vec<S::Element>,

    /// Named values stored by steps.
    pub variables: HashMap<String, Value>,
}

impl<S: Session> World<S> {
    /// Wraps the given `session` into an empty [`World`].
    #[must_use]
    pub fn new(session: S) -> Self {
        Self {
            session,
            active_element: None,
            active_elements: Vec::new(),
            variables: HashMap::new(),
        }
    }

    /// Stores a `value` under the given `name`, returning the previous one.
    pub fn set_var(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Option<Value> {
        self.variables.insert(name.into(), value.into())
    }

    /// Returns the value stored under the given `name`.
    #[must_use]
    pub fn var(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// Replaces `${name}` placeholders in the given `text` with stored
    /// variables.
    ///
    /// Strings are inserted without quotes, other values as JSON. Unknown
    /// placeholders are left untouched.
    #[must_use]
    pub fn interpolate(&self, text: &str) -> String {
        lazy_regex::regex_replace_all!(
            r"\$\{([^}]+)\}",
            text,
            |whole: &str, name: &str| match self.variables.get(name) {
                Some(Value::String(s)) => s.clone(),
                Some(v) => v.to_string(),
                None => whole.to_owned(),
            }
        )
        .into_owned()
    }
}

impl<S> fmt::Debug for World<S>
where
    S: Session + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("session", &self.session)
            .field("active_element", &self.active_element.is_some())
            .field("active_elements", &self.active_elements.len())
            .field("variables", &self.variables)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use serde_json::json;

    use super::*;

    struct Page;

    impl Session for Page {
        type Element = &'static str;
        type Error = Infallible;

        async fn new() -> Result<Self, Self::Error> {
            Ok(Self)
        }

        async fn screenshot(&mut self) -> Result<Artifact, Self::Error> {
            Ok(Artifact::png("page.png", vec![0; 4]))
        }
    }

    #[test]
    fn starts_empty() {
        let world = World::new(Page);
        assert!(world.active_element.is_none());
        assert!(world.active_elements.is_empty());
        assert!(world.variables.is_empty());
    }

    #[test]
    fn stores_variables() {
        let mut world = World::new(Page);
        assert_eq!(world.set_var("user", "alice"), None);
        assert_eq!(world.set_var("user", "bob"), Some(json!("alice")));
        _ = world.set_var("count", 3);

        assert_eq!(world.var("user"), Some(&json!("bob")));
        assert_eq!(world.var("missing"), None);
        assert_eq!(
            world.interpolate("${user} has ${count} items, ${other}"),
            "bob has 3 items, ${other}",
        );
    }

    #[test]
    fn artifact_debug_hides_bytes() {
        let a = Artifact::png("shot.png", vec![1, 2, 3]);
        assert!(format!("{a:?}").contains("<3 bytes>"));
        assert_eq!(a.mime, "image/png");
    }
}
