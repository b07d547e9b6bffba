//! Tab layout: which controls, charts and tables each tab shows, with
//! options and defaults taken from the loaded data.

use crate::core::{DatasetStore, Source};
use crate::views::chart::title_case;
use crate::views::overview::{kpis, Kpi};
use crate::views::{
    activation, adhoc, collaboration, content, device, engagement, overview, Metric, Tab,
    ENGAGEMENT_METRICS,
};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;

pub const TITLE: &str = "Product Analytics Dashboard";

/// How a control's value feeds a [`crate::views::Selection`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Role {
    Metric(&'static [Metric]),
    Categories,
    DateRange,
    Overall { default: bool },
}

#[derive(Debug, Clone, Copy)]
pub struct ControlDef {
    pub id: &'static str,
    pub label: &'static str,
    pub role: Role,
}

const KAQ1_CONTROLS: &[ControlDef] = &[
    ControlDef {
        id: "kaq1-metric",
        label: "Metric",
        role: Role::Metric(ENGAGEMENT_METRICS),
    },
    ControlDef {
        id: "kaq1-tiers",
        label: "Subscription tiers",
        role: Role::Categories,
    },
    ControlDef {
        id: "kaq1-date",
        label: "Date range",
        role: Role::DateRange,
    },
    ControlDef {
        id: "kaq1-overall",
        label: "Show all tiers combined",
        role: Role::Overall { default: true },
    },
];

const KAQ2_CONTROLS: &[ControlDef] = &[
    ControlDef {
        id: "kaq2-metric",
        label: "Metric",
        role: Role::Metric(ENGAGEMENT_METRICS),
    },
    ControlDef {
        id: "kaq2-types",
        label: "Content types",
        role: Role::Categories,
    },
    ControlDef {
        id: "kaq2-date",
        label: "Date range",
        role: Role::DateRange,
    },
    ControlDef {
        id: "kaq2-overall",
        label: "Show all content types combined",
        role: Role::Overall { default: true },
    },
];

const KAQ3_CONTROLS: &[ControlDef] = &[ControlDef {
    id: "kaq3-date",
    label: "Signup months",
    role: Role::DateRange,
}];

const KAQ4_CONTROLS: &[ControlDef] = &[
    ControlDef {
        id: "kaq4-platforms",
        label: "Platforms",
        role: Role::Categories,
    },
    ControlDef {
        id: "kaq4-date",
        label: "Date range",
        role: Role::DateRange,
    },
    ControlDef {
        id: "kaq4-overall",
        label: "Show all platforms combined",
        role: Role::Overall { default: true },
    },
];

const KAQ5_CONTROLS: &[ControlDef] = &[
    ControlDef {
        id: "kaq5-modes",
        label: "Work modes",
        role: Role::Categories,
    },
    ControlDef {
        id: "kaq5-date",
        label: "Date range",
        role: Role::DateRange,
    },
    ControlDef {
        id: "kaq5-overall",
        label: "Show all work modes combined",
        role: Role::Overall { default: false },
    },
];

pub fn controls(tab: Tab) -> &'static [ControlDef] {
    match tab {
        Tab::Kaq1 => KAQ1_CONTROLS,
        Tab::Kaq2 => KAQ2_CONTROLS,
        Tab::Kaq3 => KAQ3_CONTROLS,
        Tab::Kaq4 => KAQ4_CONTROLS,
        Tab::Kaq5 => KAQ5_CONTROLS,
        Tab::Overview | Tab::Aq => &[],
    }
}

pub fn charts(tab: Tab) -> &'static [&'static str] {
    match tab {
        Tab::Overview => &[overview::GROWTH],
        Tab::Kaq1 => &[engagement::TREND, engagement::TOTAL],
        Tab::Kaq2 => &[content::TREND, content::SEASONALITY, content::YEARLY],
        Tab::Kaq3 => &[activation::RATE, activation::VOLUME],
        Tab::Kaq4 => &[device::ACTIVITY, device::DURATION],
        Tab::Kaq5 => &[collaboration::SHARE, collaboration::EVENTS],
        Tab::Aq => &[adhoc::RANKING, adhoc::DAU, adhoc::CHANGE],
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub title: &'static str,
    pub tabs: Vec<TabLayout>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TabLayout {
    pub id: &'static str,
    pub label: &'static str,
    pub controls: Vec<Control>,
    pub charts: &'static [&'static str],
    pub tables: Vec<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub kpis: Vec<Kpi>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Control {
    pub id: &'static str,
    pub label: &'static str,
    #[serde(flatten)]
    pub kind: ControlKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Choice {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ControlKind {
    Dropdown {
        options: Vec<Choice>,
        value: String,
    },
    MultiSelect {
        options: Vec<Choice>,
        value: Vec<String>,
    },
    DateRange {
        min: Option<NaiveDate>,
        max: Option<NaiveDate>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
    Checklist {
        options: Vec<Choice>,
        value: Vec<String>,
    },
}

impl ControlKind {
    /// The control's initial value as the page would post it.
    pub fn default_value(&self) -> serde_json::Value {
        match self {
            ControlKind::Dropdown { value, .. } => json!(value),
            ControlKind::MultiSelect { value, .. } | ControlKind::Checklist { value, .. } => {
                json!(value)
            }
            ControlKind::DateRange { start, end, .. } => json!({ "start": start, "end": end }),
        }
    }
}

/// Value a checked overall checklist posts.
pub const OVERALL_VALUE: &str = "overall";

impl Layout {
    pub fn build(store: &DatasetStore) -> Layout {
        let tabs = Tab::ALL
            .into_iter()
            .map(|tab| TabLayout {
                id: tab.id(),
                label: tab.label(),
                controls: controls(tab)
                    .iter()
                    .map(|def| build_control(def, store, tab.sources()[0]))
                    .collect(),
                charts: charts(tab),
                tables: tab.sources().iter().map(|s| s.name()).collect(),
                kpis: if tab == Tab::Overview {
                    kpis(store)
                } else {
                    Vec::new()
                },
            })
            .collect();
        Layout { title: TITLE, tabs }
    }

    pub fn tab(&self, tab: Tab) -> Option<&TabLayout> {
        self.tabs.iter().find(|t| t.id == tab.id())
    }

    /// Initial control values of a tab, keyed by control id.
    pub fn defaults(&self, tab: Tab) -> BTreeMap<String, serde_json::Value> {
        self.tab(tab)
            .map(|t| {
                t.controls
                    .iter()
                    .map(|c| (c.id.to_string(), c.kind.default_value()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn build_control(def: &ControlDef, store: &DatasetStore, source: Source) -> Control {
    let kind = match def.role {
        Role::Metric(metrics) => ControlKind::Dropdown {
            options: metrics
                .iter()
                .map(|m| Choice {
                    label: m.label.to_string(),
                    value: m.column.to_string(),
                })
                .collect(),
            value: metrics
                .first()
                .map(|m| m.column.to_string())
                .unwrap_or_default(),
        },
        Role::Categories => {
            let categories = store
                .partitioned(source)
                .map(|p| p.categories())
                .unwrap_or_default();
            ControlKind::MultiSelect {
                options: categories
                    .iter()
                    .map(|c| Choice {
                        label: title_case(c),
                        value: c.clone(),
                    })
                    .collect(),
                value: categories,
            }
        }
        Role::DateRange => {
            let bounds = store.date_bounds(source);
            let (min, max) = (bounds.map(|b| b.0), bounds.map(|b| b.1));
            ControlKind::DateRange {
                min,
                max,
                start: min,
                end: max,
            }
        }
        Role::Overall { default } => ControlKind::Checklist {
            options: vec![Choice {
                label: def.label.to_string(),
                value: OVERALL_VALUE.to_string(),
            }],
            value: if default {
                vec![OVERALL_VALUE.to_string()]
            } else {
                Vec::new()
            },
        },
    };
    Control {
        id: def.id,
        label: def.label,
        kind,
    }
}
