// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`Regex`] wrapper usable as a [`Pattern`] part.
//!
//! [`Pattern`]: super::Pattern

use std::{
    cmp::Ordering,
    hash::{Hash, Hasher},
};

use derive_more::with_trait::{Debug, Deref, Display, From, Into};
use regex::Regex;

/// [`Regex`] wrapper implementing [`Eq`], [`Ord`] and [`Hash`] by its
/// source text.
#[derive(Clone, Debug, Deref, Display, From, Into)]
pub struct HashableRegex(Regex);

impl HashableRegex {
    /// Returns captured groups `1..` of the first match inside `text`.
    ///
    /// A group not participating in the match yields an empty string.
    #[must_use]
    pub fn captures_of(&self, text: &str) -> Option<Vec<String>> {
        let caps = self.0.captures(text)?;
        Some(
            caps.iter()
                .skip(1)
                .map(|m| m.map_or("", |m| m.as_str()).to_owned())
                .collect(),
        )
    }
}

impl Hash for HashableRegex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.as_str().hash(state);
    }
}

impl PartialEq for HashableRegex {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_str() == other.0.as_str()
    }
}

impl Eq for HashableRegex {}

impl PartialOrd for HashableRegex {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HashableRegex {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.as_str().cmp(other.0.as_str())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn re(s: &str) -> HashableRegex {
        Regex::new(s).unwrap().into()
    }

    #[test]
    fn compares_by_source() {
        assert_eq!(re("a+"), re("a+"));
        assert!(re("a") < re("b"));

        let set: HashSet<_> = [re("x"), re("y"), re("x")].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn captures_skip_whole_match() {
        let r = re(r#"^I click "(.*)"$"#);
        assert_eq!(r.captures_of(r##"I click "#ok""##), Some(vec!["#ok".into()]));
        assert_eq!(r.captures_of("I pause"), None);
    }

    #[test]
    fn non_participating_group_is_empty() {
        let r = re(r"^I (open|close)( quickly)?$");
        assert_eq!(
            r.captures_of("I open"),
            Some(vec!["open".into(), String::new()]),
        );
    }

    #[test]
    fn searches_anywhere_in_text() {
        assert_eq!(re(r"(\d+) items").captures_of("I have 3 items in cart"), Some(vec!["3".into()]));
    }
}
