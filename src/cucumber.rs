// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Top-level [Cucumber] executor.
//!
//! [Cucumber]: https://cucumber.io

use std::{fmt, io, marker::PhantomData, path::Path};

use futures::{pin_mut, StreamExt as _};
use regex::Regex;
use tracing_subscriber::EnvFilter;

use crate::{
    cli, error, parser, runner, step, tag, writer, Parser, Runner as _,
    Session, World, Writer, WriterExt as _,
};

/// [`Writer`] used by [`Cucumber::new()`].
pub type DefaultWriter = writer::Summarize<writer::Basic>;

/// Top-level [Cucumber] executor.
///
/// Use [`Cucumber::new()`] to get the default executor, register step
/// definitions with [`Cucumber::steps()`] and [`run()`] it over a directory
/// of `.feature` files (or a single file).
///
/// Settings given to the builder take precedence over the CLI options, which,
/// in turn, take precedence over the environment.
///
/// # Example
///
/// ```rust,no_run
/// # use std::convert::Infallible;
/// #
/// # use cucumber_browser::{step, Artifact, Cucumber, Session, World};
/// # use futures::{future::LocalBoxFuture, FutureExt as _};
/// #
/// struct Page;
///
/// impl Session for Page {
///     type Element = String;
///     type Error = Infallible;
///
///     async fn new() -> Result<Self, Self::Error> {
///         Ok(Self)
///     }
///
///     async fn screenshot(&mut self) -> Result<Artifact, Self::Error> {
///         Ok(Artifact::png("page.png", vec![]))
///     }
/// }
///
/// fn open(
///     w: &mut World<Page>,
///     ctx: step::Context,
/// ) -> LocalBoxFuture<'_, anyhow::Result<()>> {
///     async move {
///         _ = w.set_var("url", ctx.capture(0).unwrap_or_default());
///         Ok(())
///     }
///     .boxed_local()
/// }
///
/// # futures::executor::block_on(async {
/// Cucumber::<Page, _, _, _>::new()
///     .steps(step::Collection::new().given(
///         step::Pattern::expression("I open {string}")?,
///         open,
///     ))
///     .max_concurrent_scenarios(4)
///     .run_and_exit("tests/features")
///     .await;
/// # Ok::<_, step::ExpressionError>(())
/// # });
/// ```
///
/// [`run()`]: Cucumber::run
/// [Cucumber]: https://cucumber.io
pub struct Cucumber<S, P, I, Wr, Cli = cli::Empty>
where
    S: Session,
    P: Parser<I>,
    Wr: Writer,
    Cli: clap::Args,
{
    /// [`Parser`] sourcing [`Feature`]s for execution.
    ///
    /// [`Feature`]: crate::Feature
    parser: P,

    /// [`Runner`] executing [`Scenario`]s and producing events.
    ///
    /// [`Runner`]: crate::Runner
    /// [`Scenario`]: crate::Scenario
    runner: runner::Basic<S>,

    /// [`Writer`] outputting events to some output.
    writer: Wr,

    /// CLI options this [`Cucumber`] has been run with.
    ///
    /// If empty, then will be parsed from a command line.
    cli: Option<cli::Opts<P::Cli, runner::basic::Cli, Wr::Cli, Cli>>,

    /// Type of the input consumed by [`Cucumber::parser`].
    _parser_input: PhantomData<I>,
}

// Implemented manually to omit redundant trait bounds on the CLI types.
impl<S, P, I, Wr, Cli> fmt::Debug for Cucumber<S, P, I, Wr, Cli>
where
    S: Session,
    P: Parser<I> + fmt::Debug,
    Wr: Writer + fmt::Debug,
    Cli: clap::Args,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cucumber")
            .field("parser", &self.parser)
            .field("runner", &self.runner)
            .field("writer", &self.writer)
            .field("cli", &self.cli.is_some())
            .finish_non_exhaustive()
    }
}

impl<S, I> Cucumber<S, parser::Basic, I, DefaultWriter>
where
    S: Session,
    I: AsRef<Path>,
{
    /// Creates a default [`Cucumber`] executor.
    ///
    /// * [`Parser`]: [`parser::Basic`], walking `**/*.feature` files.
    ///
    /// * [`Runner`]: [`runner::Basic`], running one [`Scenario`] at a time.
    ///
    /// * [`Writer`]: [`writer::Summarize`] over [`writer::Basic`], printing to
    ///   STDOUT, finishing with a summary.
    ///
    /// [`Runner`]: crate::Runner
    /// [`Scenario`]: crate::Scenario
    #[must_use]
    pub fn new() -> Self {
        Self::custom(parser::Basic::new(), writer::Basic::stdout().summarized())
    }
}

impl<S, I> Default for Cucumber<S, parser::Basic, I, DefaultWriter>
where
    S: Session,
    I: AsRef<Path>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S, P, I, Wr, Cli> Cucumber<S, P, I, Wr, Cli>
where
    S: Session,
    P: Parser<I>,
    Wr: Writer,
    Cli: clap::Args,
{
    /// Creates a custom [`Cucumber`] executor with the provided [`Parser`]
    /// and [`Writer`].
    #[must_use]
    pub fn custom(parser: P, writer: Wr) -> Self {
        Self {
            parser,
            runner: runner::Basic::new(),
            writer,
            cli: None,
            _parser_input: PhantomData,
        }
    }

    /// Replaces [`Parser`].
    ///
    /// Resets the CLI options given via [`Cucumber::with_cli()`].
    #[must_use]
    pub fn with_parser<NewP, NewI>(
        self,
        parser: NewP,
    ) -> Cucumber<S, NewP, NewI, Wr, Cli>
    where
        NewP: Parser<NewI>,
    {
        let Self { runner, writer, .. } = self;
        Cucumber {
            parser,
            runner,
            writer,
            cli: None,
            _parser_input: PhantomData,
        }
    }

    /// Replaces [`Writer`].
    ///
    /// Resets the CLI options given via [`Cucumber::with_cli()`].
    #[must_use]
    pub fn with_writer<NewWr>(
        self,
        writer: NewWr,
    ) -> Cucumber<S, P, I, NewWr, Cli>
    where
        NewWr: Writer,
    {
        let Self { parser, runner, .. } = self;
        Cucumber {
            parser,
            runner,
            writer,
            cli: None,
            _parser_input: PhantomData,
        }
    }

    /// Provides the CLI options this [`Cucumber`] runs with, instead of
    /// parsing them from the command line.
    #[must_use]
    pub fn with_cli<CustomCli>(
        self,
        cli: cli::Opts<P::Cli, runner::basic::Cli, Wr::Cli, CustomCli>,
    ) -> Cucumber<S, P, I, Wr, CustomCli>
    where
        CustomCli: clap::Args,
    {
        let Self { parser, runner, writer, .. } = self;
        Cucumber {
            parser,
            runner,
            writer,
            cli: Some(cli),
            _parser_input: PhantomData,
        }
    }

    /// Makes this [`Cucumber`] ignore the command line, running with the
    /// default CLI options.
    #[must_use]
    pub fn with_default_cli(mut self) -> Self
    where
        cli::Opts<P::Cli, runner::basic::Cli, Wr::Cli, Cli>: Default,
    {
        self.cli = Some(cli::Opts::default());
        self
    }

    /// Sets the step definitions to match [`Step`]s against.
    ///
    /// [`Step`]: crate::Step
    #[must_use]
    pub fn steps(mut self, steps: step::Collection<World<S>>) -> Self {
        self.runner = self.runner.steps(steps);
        self
    }

    /// Runs only [`Scenario`]s whose effective tags satisfy the given
    /// [`tag::Filter`]. Overrides the `--tags` CLI option.
    ///
    /// [`Scenario`]: crate::Scenario
    #[must_use]
    pub fn tags(mut self, filter: tag::Filter) -> Self {
        self.runner = self.runner.filter_tags(filter);
        self
    }

    /// Runs only [`Scenario`]s whose name matches the given [`Regex`].
    /// Overrides the `--name` CLI option.
    ///
    /// [`Scenario`]: crate::Scenario
    #[must_use]
    pub fn filter_name(mut self, regex: Regex) -> Self {
        self.runner = self.runner.filter_name(regex);
        self
    }

    /// If `max` is [`Some`], then number of concurrently executed
    /// [`Scenario`]s of a single [`Feature`] will be limited.
    ///
    /// [`Feature`]: crate::Feature
    /// [`Scenario`]: crate::Scenario
    #[must_use]
    pub fn max_concurrent_scenarios(
        mut self,
        max: impl Into<Option<usize>>,
    ) -> Self {
        self.runner = self.runner.max_concurrent_scenarios(max);
        self
    }

    /// Stops scheduling new [`Scenario`]s after the first failure.
    ///
    /// [`Scenario`]: crate::Scenario
    #[must_use]
    pub fn fail_fast(mut self) -> Self {
        self.runner = self.runner.fail_fast();
        self
    }

    /// Installs a global [`tracing`] subscriber printing to STDERR.
    ///
    /// Verbosity is read from the `RUST_LOG` environment variable, defaulting
    /// to `info`.
    ///
    /// # Errors
    ///
    /// If a global subscriber has been installed already.
    pub fn init_tracing(self) -> error::Result<Self> {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .try_init()
            .map_err(|e| error::Error::Tracing(e.to_string()))?;
        Ok(self)
    }

    /// Runs [`Cucumber`].
    ///
    /// [`Feature`]s sourced from the [`Parser`] are fed to the [`Runner`],
    /// which produces events handled by the [`Writer`].
    ///
    /// A tag filter set via [`Cucumber::tags()`] wins over the `--tags`
    /// option, which in turn wins over the [`cli::TAGS_ENV`] environment
    /// variable.
    ///
    /// [`Feature`]: crate::Feature
    /// [`Runner`]: crate::Runner
    pub async fn run(self, input: I) -> Wr {
        let Self { parser, runner, mut writer, cli: opts, .. } = self;
        let cli::Opts {
            re_filter,
            tags_filter,
            parser: parser_cli,
            runner: runner_cli,
            writer: writer_cli,
            ..
        } = opts.unwrap_or_else(cli::Opts::parsed);

        let tags_filter = tags_filter.or_else(cli::tags_from_env);
        let runner = runner.default_filters(tags_filter, re_filter);
        let events = runner.run(parser.parse(input, parser_cli), runner_cli);
        pin_mut!(events);
        while let Some(ev) = events.next().await {
            writer.handle_event(ev, &writer_cli).await;
        }
        writer
    }
}

impl<S, P, I, Wr, Cli> Cucumber<S, P, I, Wr, Cli>
where
    S: Session,
    P: Parser<I>,
    Wr: writer::Stats,
    Cli: clap::Args,
{
    /// Runs [`Cucumber`], turning any failure into an [`error::Error`].
    ///
    /// # Errors
    ///
    /// If any [`Scenario`] has failed or any `.feature` file cannot be parsed.
    ///
    /// [`Scenario`]: crate::Scenario
    pub async fn try_run(self, input: I) -> error::Result<Wr> {
        let writer = self.run(input).await;
        if writer.execution_has_failed() {
            return Err(error::Error::Execution {
                failed_scenarios: writer.failed_scenarios(),
                parsing_errors: writer.parsing_errors(),
            });
        }
        Ok(writer)
    }

    /// Runs [`Cucumber`], panicking on any failure.
    ///
    /// Intended for `harness = false` test targets, where a panic fails the
    /// test binary.
    ///
    /// # Panics
    ///
    /// If any [`Scenario`] has failed or any `.feature` file cannot be parsed.
    ///
    /// [`Scenario`]: crate::Scenario
    pub async fn run_and_exit(self, input: I) {
        if let Err(e) = self.try_run(input).await {
            panic!("{e}");
        }
    }
}
