use cucumber_browser::{
    cli, event, parser, runner, step, writer, writer::out::WritableString,
    Artifact, Cucumber, Event, Session, World, Writer, WriterExt as _,
};
use futures::{future::LocalBoxFuture, FutureExt as _};
use regex::Regex;

const FEATURES: &str = "tests/features/browser";
const SHOP: &str = "tests/features/browser/shop.feature";
const HOME: &str = "https://shop.example";

struct Page {
    url: Option<String>,
    title: String,
}

impl Session for Page {
    type Element = String;
    type Error = String;

    async fn new() -> Result<Self, Self::Error> {
        Ok(Self { url: None, title: String::new() })
    }

    async fn screenshot(&mut self) -> Result<Artifact, Self::Error> {
        let url = self.url.clone().unwrap_or_default();
        Ok(Artifact::png("failure.png", url.into_bytes()))
    }
}

struct Unreachable;

impl Session for Unreachable {
    type Element = ();
    type Error = String;

    async fn new() -> Result<Self, Self::Error> {
        Err("connection refused".into())
    }

    async fn screenshot(&mut self) -> Result<Artifact, Self::Error> {
        Err("no page".into())
    }
}

fn open<S: Session>(
    w: &mut World<S>,
    ctx: step::Context,
) -> LocalBoxFuture<'_, anyhow::Result<()>> {
    async move {
        _ = w.set_var("url", ctx.capture(0).unwrap_or_default());
        Ok(())
    }
    .boxed_local()
}

fn navigate(
    w: &mut World<Page>,
    ctx: step::Context,
) -> LocalBoxFuture<'_, anyhow::Result<()>> {
    async move {
        w.session.url = ctx.capture(0).map(ToOwned::to_owned);
        Ok(())
    }
    .boxed_local()
}

fn click(
    w: &mut World<Page>,
    ctx: step::Context,
) -> LocalBoxFuture<'_, anyhow::Result<()>> {
    async move {
        let target = ctx.capture(0).unwrap_or_default().to_owned();
        if target == "missing" {
            anyhow::bail!("element `{target}` not found");
        }
        w.session.title = "Cart".into();
        w.active_element = Some(target);
        Ok(())
    }
    .boxed_local()
}

fn title_is(
    w: &mut World<Page>,
    ctx: step::Context,
) -> LocalBoxFuture<'_, anyhow::Result<()>> {
    async move {
        let expected = ctx.capture(0).unwrap_or_default();
        anyhow::ensure!(
            w.session.title == expected,
            "title is `{}`",
            w.session.title,
        );
        Ok(())
    }
    .boxed_local()
}

fn steps() -> step::Collection<World<Page>> {
    let expr = |e: &str| step::Pattern::expression(e).unwrap();
    step::Collection::new()
        .given(expr("I open {string}"), navigate)
        .when(expr("I click {string}"), click)
        .then(expr("the title is {string}"), title_is)
}

/// [`Writer`] remembering what has happened.
#[derive(Default)]
struct Recorder {
    steps: Vec<String>,
    ignored: Vec<String>,
    verdicts: Vec<(String, event::Verdict)>,
    parsing_errors: usize,
}

impl Writer for Recorder {
    type Cli = cli::Empty;

    async fn handle_event(
        &mut self,
        ev: parser::Result<Event>,
        _: &Self::Cli,
    ) {
        use event::{Feature, Scenario, Step};

        match ev {
            Err(_) => self.parsing_errors += 1,
            Ok(Event::Feature(_, Feature::Scenario(sc, ev))) => match ev {
                Scenario::Ignored => self.ignored.push(sc.name.clone()),
                Scenario::Background(st, Step::Started)
                | Scenario::Step(st, Step::Started) => {
                    self.steps.push(format!("{}: {st}", sc.name));
                }
                Scenario::Finished(v) => {
                    self.verdicts.push((sc.name.clone(), v));
                }
                _ => {}
            },
            Ok(_) => {}
        }
    }
}

impl Recorder {
    fn verdict(&self, scenario: &str) -> &event::Verdict {
        self.verdicts
            .iter()
            .find_map(|(name, v)| (name == scenario).then_some(v))
            .unwrap_or_else(|| panic!("no verdict for `{scenario}`"))
    }

    fn names(&self) -> Vec<&str> {
        self.verdicts.iter().map(|(name, _)| name.as_str()).collect()
    }
}

type Opts =
    cli::Opts<parser::basic::Cli, runner::basic::Cli, <Recorder as Writer>::Cli>;

fn cucumber<S: Session, Wr: Writer>(
    writer: Wr,
) -> Cucumber<S, parser::Basic, &'static str, Wr> {
    Cucumber::custom(parser::Basic::new(), writer)
}

#[tokio::test]
async fn runs_all_features() {
    let rec = cucumber(Recorder::default())
        .steps(steps())
        .with_default_cli()
        .run(FEATURES)
        .await;

    assert_eq!(rec.parsing_errors, 1);
    assert_eq!(rec.ignored, ["Not ready"]);
    assert_eq!(
        rec.steps,
        [
            r#"Add to cart: Given I open "https://shop.example""#,
            r#"Add to cart: When I click "add""#,
            r#"Add to cart: Then the title is "Cart""#,
            r#"Broken button: Given I open "https://shop.example""#,
            r#"Broken button: When I click "missing""#,
            r#"Unknown step: Given I open "https://shop.example""#,
            "Unknown step: When I dance",
        ],
    );
    assert_eq!(rec.names(), ["Add to cart", "Broken button", "Unknown step"]);
    assert!(!rec.verdict("Add to cart").is_failed());
}

#[tokio::test]
async fn failure_keeps_error_and_single_screenshot() {
    let rec = cucumber(Recorder::default())
        .steps(steps())
        .with_default_cli()
        .run(SHOP)
        .await;

    let event::Verdict::Failed { failure, artifacts } =
        rec.verdict("Broken button")
    else {
        panic!("`Broken button` should fail");
    };
    assert_eq!(
        failure.as_error().map(ToString::to_string).as_deref(),
        Some("element `missing` not found"),
    );
    assert_eq!(artifacts.len(), 1);
    assert_eq!(artifacts[0].name, "failure.png");
    assert_eq!(artifacts[0].mime, "image/png");
    assert_eq!(artifacts[0].bytes, HOME.as_bytes());
}

#[tokio::test]
async fn undefined_step_has_no_screenshot() {
    let rec = cucumber(Recorder::default())
        .steps(steps())
        .with_default_cli()
        .run(SHOP)
        .await;

    let event::Verdict::Failed { failure, artifacts } =
        rec.verdict("Unknown step")
    else {
        panic!("`Unknown step` should fail");
    };
    assert!(failure.is_undefined());
    assert_eq!(failure.to_string(), "Step is not defined: I dance");
    assert!(artifacts.is_empty());
}

#[tokio::test]
async fn filters_by_tags() {
    let rec = cucumber(Recorder::default())
        .steps(steps())
        .tags("@slow".parse().unwrap())
        .with_default_cli()
        .run(SHOP)
        .await;

    assert_eq!(rec.names(), ["Broken button"]);
    assert_eq!(rec.ignored, ["Not ready"]);
}

#[tokio::test]
async fn feature_tags_are_inherited() {
    let rec = cucumber(Recorder::default())
        .steps(steps())
        .tags("web+slow,nothing".parse().unwrap())
        .with_default_cli()
        .run(SHOP)
        .await;

    assert_eq!(rec.names(), ["Broken button"]);
}

#[tokio::test]
async fn builder_overrides_cli_filters() {
    let opts: Opts = cli::Opts {
        tags_filter: Some("nothing".parse().unwrap()),
        ..cli::Opts::default()
    };
    let rec = cucumber(Recorder::default())
        .steps(steps())
        .with_cli(opts)
        .tags("slow".parse().unwrap())
        .run(SHOP)
        .await;

    assert_eq!(rec.names(), ["Broken button"]);

    let opts: Opts = cli::Opts {
        tags_filter: Some("nothing".parse().unwrap()),
        ..cli::Opts::default()
    };
    let rec = cucumber(Recorder::default())
        .steps(steps())
        .with_cli(opts)
        .run(SHOP)
        .await;

    assert!(rec.names().is_empty());
}

#[tokio::test]
async fn fail_fast_stops_on_first_failure() {
    let rec = cucumber(Recorder::default())
        .steps(steps())
        .fail_fast()
        .with_default_cli()
        .run(SHOP)
        .await;

    assert_eq!(rec.names(), ["Add to cart", "Broken button"]);
}

#[tokio::test]
async fn concurrent_scenarios_all_finish() {
    let rec = cucumber(Recorder::default())
        .steps(steps())
        .max_concurrent_scenarios(3)
        .with_default_cli()
        .run(SHOP)
        .await;

    let mut names = rec.names();
    names.sort_unstable();
    assert_eq!(names, ["Add to cart", "Broken button", "Unknown step"]);
    assert_eq!(rec.steps.len(), 7);
}

#[tokio::test]
async fn session_start_failure_fails_scenario() {
    let rec = cucumber::<Unreachable, _>(Recorder::default())
        .steps(step::Collection::new().given(
            step::Pattern::expression("I open {string}").unwrap(),
            open,
        ))
        .filter_name(Regex::new("^Add").unwrap())
        .with_default_cli()
        .run(SHOP)
        .await;

    let event::Verdict::Failed { failure, artifacts } =
        rec.verdict("Add to cart")
    else {
        panic!("`Add to cart` should fail");
    };
    assert_eq!(
        failure.to_string(),
        "Failed to start a session: connection refused",
    );
    assert!(artifacts.is_empty());
    assert!(rec.steps.is_empty());
}

#[tokio::test]
async fn try_run_reports_failures() {
    let err = cucumber::<Page, _>(
        writer::Basic::new(WritableString::default(), writer::Coloring::Never)
            .summarized(),
    )
    .steps(steps())
    .with_default_cli()
    .try_run(FEATURES)
    .await
    .unwrap_err();

    assert_eq!(err.to_string(), "2 scenarios failed, 1 parsing error");
}

#[tokio::test]
async fn summarizes_passed_run() {
    let summary = cucumber::<Page, _>(
        writer::Basic::new(WritableString::default(), writer::Coloring::Never)
            .summarized(),
    )
    .steps(steps())
    .filter_name(Regex::new("^(Add|Not)").unwrap())
    .with_default_cli()
    .try_run(SHOP)
    .await
    .unwrap();

    assert_eq!(summary.features, 1);
    assert_eq!(summary.scenarios.passed, 1);
    assert_eq!(summary.scenarios.skipped, 1);
    assert_eq!(summary.steps.passed, 3);
    assert_eq!(summary.artifacts, 0);

    let out = summary.into_inner().into_inner().0;
    assert!(out.contains("Feature: Shop"), "{out}");
    assert!(out.contains("Scenario: Add to cart"), "{out}");
    assert!(out.contains("Scenario: Not ready (ignored)"), "{out}");
    assert!(out.contains("[Summary]"), "{out}");
}

#[tokio::test]
#[should_panic(expected = "1 scenario failed")]
async fn run_and_exit_panics_on_failure() {
    cucumber::<Page, _>(
        writer::Basic::new(WritableString::default(), writer::Coloring::Never)
            .summarized(),
    )
    .steps(steps())
    .filter_name(Regex::new("^Broken").unwrap())
    .with_default_cli()
    .run_and_exit(SHOP)
    .await;
}
