use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, ensure};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Handle;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use overflow_list::config::PresenterSettings;
use overflow_list::debounce::spawn_resize_debouncer;
use overflow_list::fixture::{BreadcrumbScenario, GalleryFixture, LegendFixtureItem, LegendScenario};
use overflow_list::gallery::run_gallery;
use overflow_list::item::MeasuredItemSpec;
use overflow_list::pointer::PointerHub;
use overflow_list::policy::TruncationMode;
use overflow_list::presenter::PresenterOptions;
use overflow_list::report::{ListKind, ListReport};

#[derive(Debug, Parser)]
#[command(
    name = "overflow_list",
    about = "Overflow-aware truncation for breadcrumbs and legends"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Truncate a breadcrumb trail and print the resulting render.
    Breadcrumb {
        /// `always`, `auto` or `never`.
        #[arg(long, default_value = "always")]
        mode: TruncationMode,
        /// Container width used to estimate overflow in `auto` mode.
        #[arg(long)]
        container_width: Option<f32>,
        #[arg(long)]
        json: bool,
        #[arg(required = true)]
        items: Vec<String>,
    },
    /// Fit pre-measured legend entries (`KEY=WIDTH`) into a container.
    Legend {
        #[arg(long)]
        container_width: f32,
        /// Space reserved for the `+N more` trigger.
        #[arg(long)]
        buffer: Option<f32>,
        #[arg(long)]
        gap: Option<f32>,
        /// Keys that stay inline regardless of the cutoff.
        #[arg(long = "anchor")]
        anchors: Vec<String>,
        #[arg(long)]
        json: bool,
        #[arg(required = true)]
        items: Vec<MeasuredItemSpec>,
    },
    /// Read container widths from stdin, one per line, and print a JSON
    /// report each time the settled cutoff changes.
    Follow {
        #[arg(long)]
        buffer: Option<f32>,
        #[arg(long)]
        gap: Option<f32>,
        #[arg(long = "anchor")]
        anchors: Vec<String>,
        #[arg(required = true)]
        items: Vec<MeasuredItemSpec>,
    },
    /// Evaluate every scenario in a gallery fixture.
    Demo {
        #[arg(long)]
        fixture: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Open the interactive gallery window.
    Gallery {
        #[arg(long)]
        fixture: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = init_tracing()?;

    let cli = Cli::parse();
    let settings = PresenterSettings::from_env().context("failed to load configuration")?;

    match cli.command {
        Commands::Breadcrumb {
            mode,
            container_width,
            json,
            items,
        } => run_breadcrumb(&settings, mode, container_width, items, json)?,
        Commands::Legend {
            container_width,
            buffer,
            gap,
            anchors,
            json,
            items,
        } => {
            let settings = with_overrides(settings, buffer, gap)?;
            run_legend(&settings, container_width, items, &anchors, json)?
        }
        Commands::Follow {
            buffer,
            gap,
            anchors,
            items,
        } => {
            let settings = with_overrides(settings, buffer, gap)?;
            run_follow(&settings, items, &anchors).await?
        }
        Commands::Demo { fixture, json } => {
            let fixture = load_fixture(&settings, fixture)?;
            run_demo(&settings, &fixture, json)?
        }
        Commands::Gallery { fixture } => {
            let fixture = load_fixture(&settings, fixture)?;
            run_gallery(&settings, fixture)?
        }
    }

    Ok(())
}

fn run_breadcrumb(
    settings: &PresenterSettings,
    mode: TruncationMode,
    container_width: Option<f32>,
    items: Vec<String>,
    json: bool,
) -> Result<()> {
    let scenario = BreadcrumbScenario {
        id: "breadcrumb".to_owned(),
        mode,
        container_width,
        items,
    };
    let mut presenter = scenario.presenter(PointerHub::new(), PresenterOptions::from(settings));
    if let Some(measurement) = scenario.estimated_measurement() {
        presenter.measure_now(&measurement);
    }

    let report = ListReport::capture(&scenario.id, ListKind::Breadcrumb, &presenter);
    print_report(&report, json)
}

fn run_legend(
    settings: &PresenterSettings,
    container_width: f32,
    items: Vec<MeasuredItemSpec>,
    anchors: &[String],
    json: bool,
) -> Result<()> {
    ensure!(
        container_width.is_finite() && container_width >= 0.0,
        "--container-width must be a non-negative number"
    );
    let scenario = legend_scenario(settings, container_width, items, anchors)?;
    let mut presenter = scenario.presenter(PointerHub::new(), PresenterOptions::from(settings));
    presenter.measure_now(&scenario.measurement(container_width));

    let report = ListReport::capture(&scenario.id, ListKind::Legend, &presenter);
    print_report(&report, json)
}

async fn run_follow(
    settings: &PresenterSettings,
    items: Vec<MeasuredItemSpec>,
    anchors: &[String],
) -> Result<()> {
    let scenario = legend_scenario(settings, 0.0, items, anchors)?;
    let mut presenter = scenario.presenter(PointerHub::new(), PresenterOptions::from(settings));
    let (resize, mut settled_rx) =
        spawn_resize_debouncer(&Handle::current(), settings.resize_debounce());
    let mut resize = Some(resize);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_cutoff = None;

    info!(
        items = presenter.items().len(),
        debounce_ms = settings.resize_debounce_ms,
        "following container widths on stdin"
    );

    loop {
        tokio::select! {
            line = lines.next_line(), if resize.is_some() => {
                match line.context("failed to read container width from stdin")? {
                    Some(line) => {
                        let raw = line.trim();
                        if !raw.is_empty() {
                            let width = parse_width(raw)?;
                            if let Some(resize) = &resize {
                                resize.notify_resize(width);
                            }
                        }
                    }
                    None => {
                        debug!("stdin closed; flushing pending width");
                        resize = None;
                    }
                }
            }
            settled = settled_rx.recv() => {
                let Some(width) = settled else {
                    break;
                };
                presenter.measure_now(&scenario.measurement(width));
                if last_cutoff != Some(presenter.cutoff_index()) {
                    last_cutoff = Some(presenter.cutoff_index());
                    let report = ListReport::capture(&scenario.id, ListKind::Legend, &presenter);
                    print_report(&report, true)?;
                }
            }
        }
    }

    Ok(())
}

fn run_demo(settings: &PresenterSettings, fixture: &GalleryFixture, json: bool) -> Result<()> {
    let reports = fixture.evaluate(PresenterOptions::from(settings));
    info!(scenarios = reports.len(), "evaluated gallery fixture");

    if json {
        let rendered =
            serde_json::to_string_pretty(&reports).context("failed to serialize demo reports")?;
        println!("{rendered}");
        return Ok(());
    }

    for report in &reports {
        let kind = match report.kind {
            ListKind::Breadcrumb => "breadcrumb",
            ListKind::Legend => "legend",
        };
        println!("{:<10} {:<12} {}", kind, report.id, report.line);
    }
    Ok(())
}

fn legend_scenario(
    settings: &PresenterSettings,
    container_width: f32,
    items: Vec<MeasuredItemSpec>,
    anchors: &[String],
) -> Result<LegendScenario> {
    for anchor in anchors {
        ensure!(
            items.iter().any(|item| &item.key == anchor),
            "--anchor `{anchor}` does not match any legend item"
        );
    }

    Ok(LegendScenario {
        id: "legend".to_owned(),
        container_width,
        gap: settings.legend_gap_px,
        items: items
            .into_iter()
            .map(|item| LegendFixtureItem {
                anchor: anchors.contains(&item.key),
                key: item.key,
                width: item.width,
                color: None,
            })
            .collect(),
    })
}

fn with_overrides(
    mut settings: PresenterSettings,
    buffer: Option<f32>,
    gap: Option<f32>,
) -> Result<PresenterSettings> {
    if let Some(buffer) = buffer {
        ensure!(
            buffer.is_finite() && buffer >= 0.0,
            "--buffer must be a non-negative number"
        );
        settings.legend_buffer_px = buffer;
    }
    if let Some(gap) = gap {
        ensure!(
            gap.is_finite() && gap >= 0.0,
            "--gap must be a non-negative number"
        );
        settings.legend_gap_px = gap;
    }
    Ok(settings)
}

fn load_fixture(settings: &PresenterSettings, path: Option<PathBuf>) -> Result<GalleryFixture> {
    match path {
        Some(path) => GalleryFixture::load(&path),
        None => GalleryFixture::load_or_builtin(&settings.fixture_path),
    }
}

fn parse_width(raw: &str) -> Result<f32> {
    let width = raw
        .parse::<f32>()
        .with_context(|| format!("invalid container width `{raw}`"))?;
    ensure!(
        width.is_finite() && width >= 0.0,
        "invalid container width `{raw}`"
    );
    Ok(width)
}

fn print_report(report: &ListReport, json: bool) -> Result<()> {
    if json {
        let rendered = serde_json::to_string(report).context("failed to serialize list report")?;
        println!("{rendered}");
    } else {
        println!("{}", report.line);
    }
    Ok(())
}

fn init_tracing() -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,overflow_list=debug"));
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_filter(env_filter);

    let (file_layer, guard) = match env::var_os("OVERFLOW_LOG_DIR") {
        Some(log_dir) => {
            let appender = tracing_appender::rolling::daily(log_dir, "overflow_list.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file_filter = env::var("OVERFLOW_FILE_LOG")
                .ok()
                .and_then(|raw| EnvFilter::try_new(raw).ok())
                .unwrap_or_else(|| EnvFilter::new("debug"));
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(file_filter);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(guard)
}
