use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, ensure};
use serde::Deserialize;
use tracing::warn;

use crate::config::DEFAULT_LEGEND_GAP_PX;
use crate::fit::{ContainerBox, Measurement};
use crate::item::DisplayItem;
use crate::pointer::PointerHub;
use crate::policy::{BreadcrumbStrategy, LegendStrategy, TruncationMode};
use crate::presenter::{BreadcrumbPresenter, LegendPresenter, ListPresenter, PresenterOptions};
use crate::report::{ListKind, ListReport};

const BUILTIN_FIXTURE: &str = include_str!("../fixtures/gallery.yaml");
/// Rough glyph advance used when a trail has to be measured without a
/// text engine.
const ESTIMATED_CHAR_WIDTH_PX: f32 = 7.0;
const ESTIMATED_CRUMB_PADDING_PX: f32 = 16.0;
const ESTIMATED_CRUMB_SEPARATOR_PX: f32 = 20.0;
const DEFAULT_SWATCH_COLOR: [u8; 3] = [100, 116, 139];

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GalleryFixture {
    #[serde(default)]
    pub breadcrumbs: Vec<BreadcrumbScenario>,
    #[serde(default)]
    pub legends: Vec<LegendScenario>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BreadcrumbScenario {
    pub id: String,
    #[serde(default)]
    pub mode: TruncationMode,
    #[serde(default)]
    pub container_width: Option<f32>,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LegendScenario {
    pub id: String,
    pub container_width: f32,
    #[serde(default = "default_gap")]
    pub gap: f32,
    pub items: Vec<LegendFixtureItem>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LegendFixtureItem {
    pub key: String,
    pub width: f32,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub anchor: bool,
}

/// Content of one legend entry: the series label and its swatch color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendSwatch {
    pub label: String,
    pub color: [u8; 3],
}

fn default_gap() -> f32 {
    DEFAULT_LEGEND_GAP_PX
}

impl GalleryFixture {
    pub fn builtin() -> Result<Self> {
        parse_fixture(BUILTIN_FIXTURE).context("built-in gallery fixture is invalid")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read fixture `{}`", path.display()))?;
        parse_fixture(&raw).with_context(|| format!("invalid fixture `{}`", path.display()))
    }

    /// Loads `path`, falling back to the built-in scenarios when the file does
    /// not exist. A file that exists but fails to parse is still an error.
    pub fn load_or_builtin(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::load(path);
        }
        warn!(
            path = %path.display(),
            "fixture file not found; using built-in scenarios"
        );
        Self::builtin()
    }

    /// Mounts every scenario, runs its first measurement and reports the
    /// resulting render.
    pub fn evaluate(&self, options: PresenterOptions) -> Vec<ListReport> {
        let hub = PointerHub::new();
        let mut reports = Vec::with_capacity(self.breadcrumbs.len() + self.legends.len());

        for scenario in &self.breadcrumbs {
            let mut presenter = scenario.presenter(hub.clone(), options);
            if let Some(measurement) = scenario.estimated_measurement() {
                presenter.measure_now(&measurement);
            }
            reports.push(ListReport::capture(
                &scenario.id,
                ListKind::Breadcrumb,
                &presenter,
            ));
        }

        for scenario in &self.legends {
            let mut presenter = scenario.presenter(hub.clone(), options);
            presenter.measure_now(&scenario.measurement(scenario.container_width));
            reports.push(ListReport::capture(&scenario.id, ListKind::Legend, &presenter));
        }

        reports
    }
}

impl BreadcrumbScenario {
    pub fn display_items(&self) -> Vec<DisplayItem<String>> {
        self.items.iter().map(DisplayItem::labelled).collect()
    }

    pub fn presenter(&self, hub: PointerHub, options: PresenterOptions) -> BreadcrumbPresenter<String> {
        ListPresenter::new(
            self.display_items(),
            BreadcrumbStrategy::new(self.mode),
            hub,
            options,
        )
    }

    /// Character-count estimate of the trail laid out in `container_width`.
    pub fn estimated_measurement(&self) -> Option<Measurement> {
        let container_width = self.container_width?;
        let widths = self
            .items
            .iter()
            .map(|label| {
                label.chars().count() as f32 * ESTIMATED_CHAR_WIDTH_PX + ESTIMATED_CRUMB_PADDING_PX
            })
            .collect::<Vec<_>>();
        Some(Measurement::row(
            ContainerBox {
                left: 0.0,
                right: container_width,
            },
            &widths,
            ESTIMATED_CRUMB_SEPARATOR_PX,
        ))
    }
}

impl LegendScenario {
    pub fn display_items(&self) -> Vec<DisplayItem<LegendSwatch>> {
        self.items
            .iter()
            .map(|item| {
                let color = item
                    .color
                    .as_deref()
                    .and_then(|raw| parse_hex_color(raw).ok())
                    .unwrap_or(DEFAULT_SWATCH_COLOR);
                let entry = DisplayItem::new(
                    item.key.clone(),
                    LegendSwatch {
                        label: item.key.clone(),
                        color,
                    },
                );
                if item.anchor { entry.anchored() } else { entry }
            })
            .collect()
    }

    pub fn presenter(&self, hub: PointerHub, options: PresenterOptions) -> LegendPresenter<LegendSwatch> {
        ListPresenter::new(self.display_items(), LegendStrategy, hub, options)
    }

    /// Fixture widths laid out in a container of `container_width`.
    pub fn measurement(&self, container_width: f32) -> Measurement {
        let widths = self.items.iter().map(|item| item.width).collect::<Vec<_>>();
        Measurement::row(
            ContainerBox {
                left: 0.0,
                right: container_width,
            },
            &widths,
            self.gap,
        )
    }
}

pub fn parse_hex_color(raw: &str) -> Result<[u8; 3]> {
    let hex = raw.trim().trim_start_matches('#');
    ensure!(
        hex.len() == 6 && hex.is_ascii(),
        "color `{raw}` must look like #rrggbb"
    );

    let mut rgb = [0_u8; 3];
    for (slot, channel) in rgb.iter_mut().enumerate() {
        let start = slot * 2;
        *channel = u8::from_str_radix(&hex[start..start + 2], 16)
            .with_context(|| format!("color `{raw}` has an invalid channel"))?;
    }
    Ok(rgb)
}

fn parse_fixture(raw: &str) -> Result<GalleryFixture> {
    let fixture =
        serde_yaml::from_str::<GalleryFixture>(raw).context("failed to parse fixture YAML")?;
    validate_fixture(&fixture)?;
    Ok(fixture)
}

fn validate_fixture(fixture: &GalleryFixture) -> Result<()> {
    let mut ids = BTreeSet::new();
    let scenario_ids = fixture
        .breadcrumbs
        .iter()
        .map(|scenario| scenario.id.as_str())
        .chain(fixture.legends.iter().map(|scenario| scenario.id.as_str()));
    for id in scenario_ids {
        ensure!(!id.trim().is_empty(), "scenario id cannot be empty");
        if !ids.insert(id) {
            return Err(anyhow!("duplicate scenario id `{id}`"));
        }
    }

    for scenario in &fixture.breadcrumbs {
        ensure_unique_keys(&scenario.id, scenario.items.iter().map(String::as_str))?;
        if let Some(width) = scenario.container_width {
            ensure!(
                width.is_finite() && width >= 0.0,
                "scenario `{}` has an invalid container_width",
                scenario.id
            );
        }
    }

    for scenario in &fixture.legends {
        ensure_unique_keys(&scenario.id, scenario.items.iter().map(|item| item.key.as_str()))?;
        ensure!(
            scenario.container_width.is_finite() && scenario.container_width >= 0.0,
            "scenario `{}` has an invalid container_width",
            scenario.id
        );
        ensure!(
            scenario.gap.is_finite() && scenario.gap >= 0.0,
            "scenario `{}` has an invalid gap",
            scenario.id
        );
        for item in &scenario.items {
            ensure!(
                item.width.is_finite() && item.width >= 0.0,
                "legend item `{}` in `{}` has an invalid width",
                item.key,
                scenario.id
            );
            if let Some(color) = &item.color {
                parse_hex_color(color).with_context(|| {
                    format!("legend item `{}` in `{}`", item.key, scenario.id)
                })?;
            }
        }
    }

    Ok(())
}

fn ensure_unique_keys<'a>(scenario_id: &str, keys: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = BTreeSet::new();
    for key in keys {
        ensure!(
            !key.trim().is_empty(),
            "scenario `{scenario_id}` has an empty item key"
        );
        ensure!(
            seen.insert(key),
            "scenario `{scenario_id}` repeats item key `{key}`"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::presenter::PresenterOptions;
    use crate::report::ListKind;
    use crate::test_support::ScratchDir;

    use super::{GalleryFixture, parse_fixture, parse_hex_color};

    #[test]
    fn builtin_fixture_evaluates_documented_scenarios() {
        let fixture = GalleryFixture::builtin().expect("built-in fixture should parse");
        let reports = fixture.evaluate(PresenterOptions::default());

        let catalog = reports
            .iter()
            .find(|report| report.id == "catalog")
            .expect("catalog scenario should be present");
        assert_eq!(catalog.kind, ListKind::Breadcrumb);
        assert_eq!(catalog.hidden, ["Products", "Categories"]);
        assert_eq!(catalog.active.as_deref(), Some("Laptops"));

        let docs = reports
            .iter()
            .find(|report| report.id == "docs")
            .expect("docs scenario should be present");
        assert_eq!(docs.hidden, ["Guides"]);

        let short = reports
            .iter()
            .find(|report| report.id == "short")
            .expect("short scenario should be present");
        assert!(short.hidden.is_empty());
        assert_eq!(short.trigger, None);

        let sales = reports
            .iter()
            .find(|report| report.id == "sales")
            .expect("sales scenario should be present");
        assert_eq!(sales.cutoff_index, 2);
        assert_eq!(sales.inline, ["revenue", "profit"]);
        assert_eq!(sales.hidden, ["traffic", "conversions"]);
        assert_eq!(sales.trigger.as_deref(), Some("+2 more"));

        let uptime = reports
            .iter()
            .find(|report| report.id == "uptime")
            .expect("uptime scenario should be present");
        assert_eq!(uptime.inline, ["us-east", "us-west", "eu-central", "total"]);
        assert_eq!(uptime.trigger.as_deref(), Some("+1 more"));
    }

    #[test]
    fn fixture_rejects_unknown_fields_and_duplicates() {
        let unknown = parse_fixture("breadcrumbs:\n  - id: a\n    items: [x]\n    colour: red\n");
        assert!(unknown.is_err());

        let duplicate_ids = parse_fixture(
            "breadcrumbs:\n  - id: a\n    items: [x]\nlegends:\n  - id: a\n    container_width: 10\n    items: []\n",
        )
        .expect_err("duplicate ids should be rejected");
        assert!(duplicate_ids.to_string().contains("duplicate scenario id"));

        let duplicate_keys = parse_fixture("breadcrumbs:\n  - id: a\n    items: [x, x]\n")
            .expect_err("duplicate keys should be rejected");
        assert!(duplicate_keys.to_string().contains("repeats item key"));
    }

    #[test]
    fn load_or_builtin_falls_back_only_for_missing_files() {
        let root = ScratchDir::new("fixture-load").expect("fixture dir should be created");

        let missing = root.join("missing.yaml");
        let fallback = GalleryFixture::load_or_builtin(&missing).expect("fallback should work");
        assert_eq!(fallback, GalleryFixture::builtin().expect("builtin should parse"));

        let broken = root.join("broken.yaml");
        fs::write(&broken, "legends: [").expect("broken fixture should be written");
        assert!(GalleryFixture::load_or_builtin(&broken).is_err());
    }

    #[test]
    fn hex_colors_parse_with_or_without_hash() {
        assert_eq!(parse_hex_color("#2563eb").expect("valid color"), [0x25, 0x63, 0xeb]);
        assert_eq!(parse_hex_color("ffffff").expect("valid color"), [255, 255, 255]);
        assert!(parse_hex_color("#12345").is_err());
        assert!(parse_hex_color("#zzzzzz").is_err());
    }
}
