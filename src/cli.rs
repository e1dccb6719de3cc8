// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tools for composing CLI options.
//!
//! The main thing in this module is [`Opts`], which compose all the strongly
//! typed CLI options from [`Parser`], [`Runner`] and [`Writer`], and provide
//! filtering based on [`Regex`] or [tag filters][1].
//!
//! The idea behind this is that [`Parser`], [`Runner`] and/or [`Writer`] may
//! want to introduce their own CLI options to allow tweaking themselves, but we
//! still do want them combine in a single CLI and avoid any boilerplate burden.
//!
//! If the implementation doesn't need any CLI options, it may just use the
//! prepared [`cli::Empty`] stub.
//!
//! [`cli::Empty`]: self::Empty
//! [`Parser`]: crate::Parser
//! [`Runner`]: crate::Runner
//! [`Writer`]: crate::Writer
//! [1]: crate::tag::Filter

use regex::Regex;

use crate::tag;

pub use clap::{Args, Parser};

/// Name of the environment variable the tag filter is read from, when no
/// `--tags` option is given.
pub const TAGS_ENV: &str = "CUCUMBER_TAGS";

/// Reads a tag [`Filter`] from the [`TAGS_ENV`] environment variable.
///
/// [`Opts`] built in code never see the environment, so this one is consulted
/// whenever neither the builder nor the `--tags` option has set a filter.
/// An unset, empty or malformed variable yields [`None`].
///
/// [`Filter`]: tag::Filter
#[must_use]
pub fn tags_from_env() -> Option<tag::Filter> {
    std::env::var(TAGS_ENV).ok().as_deref().and_then(tags_from)
}

/// Parses the `value` of the [`TAGS_ENV`] environment variable.
fn tags_from(value: &str) -> Option<tag::Filter> {
    if value.trim().is_empty() {
        return None;
    }
    value
        .parse()
        .map_err(|e| tracing::warn!("ignoring `{TAGS_ENV}`: {e}"))
        .ok()
}

/// Root CLI (command line interface) of a top-level [`Cucumber`] executor.
///
/// It combines all the nested CLIs of [`Parser`], [`Runner`] and [`Writer`],
/// and may be extended with custom CLI options additionally.
///
/// # Example
///
/// ```rust
/// # use cucumber_browser::cli;
/// # use cucumber_browser::cli::Parser as _;
/// #
/// #[derive(clap::Args)] // also re-exported as `cli::Args`
/// struct CustomOpts {
///     /// Base URL of the application under test.
///     #[arg(long, default_value = "http://localhost:8080")]
///     base_url: String,
/// }
///
/// let opts = cli::Opts::<cli::Empty, cli::Empty, cli::Empty, CustomOpts>
///     ::try_parse_from(["cucumber", "--tags", "@smoke", "--base-url", "x"])
///     .unwrap();
/// assert_eq!(opts.custom.base_url, "x");
/// assert!(opts.tags_filter.unwrap().admits(&["smoke"]));
/// ```
///
/// [`Cucumber`]: crate::Cucumber
/// [`Parser`]: crate::Parser
/// [`Runner`]: crate::Runner
/// [`Writer`]: crate::Writer
#[derive(clap::Parser, Clone, Debug, Default)]
#[command(
    name = "cucumber",
    about = "Run the browser scenarios.",
    long_about = "Run the browser scenarios described by `.feature` files."
)]
pub struct Opts<Parser, Runner, Writer, Custom = Empty>
where
    Parser: Args,
    Runner: Args,
    Writer: Args,
    Custom: Args,
{
    /// Regex to filter scenarios by their name.
    #[arg(
        id = "name",
        long = "name",
        short = 'n',
        value_name = "regex",
        visible_alias = "scenario-name",
        global = true
    )]
    pub re_filter: Option<Regex>,

    /// Tag filter to select scenarios by: `a+b,c` means "(a and b) or c".
    ///
    /// Note: Tags of a Feature and of its Scenario are merged together on
    /// filtering. Scenarios tagged `@ignore` never run.
    #[arg(
        id = "tags",
        long = "tags",
        short = 't',
        value_name = "filter",
        env = TAGS_ENV,
        global = true
    )]
    pub tags_filter: Option<tag::Filter>,

    /// [`Parser`] CLI options.
    ///
    /// [`Parser`]: crate::Parser
    #[command(flatten)]
    pub parser: Parser,

    /// [`Runner`] CLI options.
    ///
    /// [`Runner`]: crate::Runner
    #[command(flatten)]
    pub runner: Runner,

    /// [`Writer`] CLI options.
    ///
    /// [`Writer`]: crate::Writer
    #[command(flatten)]
    pub writer: Writer,

    /// Additional custom CLI options.
    #[command(flatten)]
    pub custom: Custom,
}

impl<Parser, Runner, Writer, Custom> Opts<Parser, Runner, Writer, Custom>
where
    Parser: Args,
    Runner: Args,
    Writer: Args,
    Custom: Args,
{
    /// Shortcut for [`clap::Parser::parse()`], which doesn't require the trait
    /// being imported.
    #[must_use]
    pub fn parsed() -> Self {
        <Self as clap::Parser>::parse()
    }
}

/// Empty CLI options.
#[derive(Args, Clone, Copy, Debug, Default)]
#[group(skip)]
pub struct Empty;

/// Composes two [`clap::Args`] derivers together.
///
/// Useful when implementing a custom [`Writer`] wrapping another one, so both
/// keep their own CLI options.
///
/// [`Writer`]: crate::Writer
#[derive(Args, Clone, Copy, Debug, Default)]
#[group(skip)]
pub struct Compose<L: Args, R: Args> {
    /// Left [`clap::Args`] deriver.
    #[command(flatten)]
    pub left: L,

    /// Right [`clap::Args`] deriver.
    #[command(flatten)]
    pub right: R,
}

impl<L: Args, R: Args> Compose<L, R> {
    /// Unpacks this [`Compose`] into the underlying CLIs.
    #[must_use]
    pub fn into_inner(self) -> (L, R) {
        let Self { left, right } = self;
        (left, right)
    }
}
