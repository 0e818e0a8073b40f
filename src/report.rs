use serde::Serialize;

use crate::policy::TruncationStrategy;
use crate::presenter::ListPresenter;
use crate::view::ViewEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Breadcrumb,
    Legend,
}

/// Flattened, serializable snapshot of a presenter's current render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListReport {
    pub id: String,
    pub kind: ListKind,
    pub cutoff_index: usize,
    pub container_width: Option<f32>,
    pub inline: Vec<String>,
    pub hidden: Vec<String>,
    pub trigger: Option<String>,
    pub active: Option<String>,
    pub line: String,
}

impl ListReport {
    pub fn capture<C, S: TruncationStrategy>(
        id: impl Into<String>,
        kind: ListKind,
        presenter: &ListPresenter<C, S>,
    ) -> Self {
        let items = presenter.items();
        let partition = presenter.partition();
        let view = presenter.render();

        Self {
            id: id.into(),
            kind,
            cutoff_index: presenter.cutoff_index(),
            container_width: presenter.state().container_width(),
            inline: view.inline_keys().into_iter().map(str::to_owned).collect(),
            hidden: partition
                .hidden
                .iter()
                .map(|index| items[*index].key.clone())
                .collect(),
            trigger: view.trigger_label().map(str::to_owned),
            active: partition.active.map(|index| items[index].key.clone()),
            line: Self::to_line(presenter, kind),
        }
    }

    /// One-line rendering, e.g. `Home / ... / Devices / [Laptops]`.
    pub fn to_line<C, S: TruncationStrategy>(presenter: &ListPresenter<C, S>, kind: ListKind) -> String {
        let separator = match kind {
            ListKind::Breadcrumb => " / ",
            ListKind::Legend => "  ",
        };

        presenter
            .render()
            .entries
            .iter()
            .map(|entry| match entry {
                ViewEntry::Item {
                    item, active: true, ..
                } => format!("[{}]", item.key),
                ViewEntry::Item { item, .. } => item.key.clone(),
                ViewEntry::OverflowTrigger { label, .. } => label.clone(),
            })
            .collect::<Vec<_>>()
            .join(separator)
    }
}
