//! Declarative wiring of controls to view controllers.

use super::layout::{charts, controls, ControlDef, Role, OVERALL_VALUE};
use super::ShellError;
use crate::core::DatasetStore;
use crate::views::chart::ChartSpec;
use crate::views::{
    activation, adhoc, collaboration, content, device, engagement, overview, Selection, Tab,
};
use std::collections::BTreeMap;

pub type Handler = fn(&Selection, &DatasetStore) -> Vec<ChartSpec>;

/// Control values as posted by the page, keyed by control id.
pub type Values = BTreeMap<String, serde_json::Value>;

/// One registered recomputation: when any of `inputs` changes, `handler`
/// recomputes `outputs`.
#[derive(Clone)]
pub struct Callback {
    pub tab: Tab,
    pub inputs: &'static [ControlDef],
    pub outputs: &'static [&'static str],
    pub handler: Handler,
}

impl Callback {
    pub fn listens_to(&self, control: &str) -> bool {
        self.inputs.iter().any(|c| c.id == control)
    }
}

#[derive(Clone)]
pub struct Registry {
    callbacks: Vec<Callback>,
}

impl Registry {
    /// Every tab's controller, listening to every control of its tab.
    pub fn standard() -> Self {
        let callback = |tab: Tab, handler: Handler| Callback {
            tab,
            inputs: controls(tab),
            outputs: charts(tab),
            handler,
        };
        Registry {
            callbacks: vec![
                callback(Tab::Overview, overview::update),
                callback(Tab::Kaq1, engagement::update),
                callback(Tab::Kaq2, content::update),
                callback(Tab::Kaq3, activation::update),
                callback(Tab::Kaq4, device::update),
                callback(Tab::Kaq5, collaboration::update),
                callback(Tab::Aq, adhoc::update),
            ],
        }
    }

    /// Callbacks declaring `control` as an input.
    pub fn callbacks_for<'a>(&'a self, control: &'a str) -> impl Iterator<Item = &'a Callback> {
        self.callbacks.iter().filter(move |cb| cb.listens_to(control))
    }

    /// Recompute after `changed` took a new value. Only callbacks that list
    /// `changed` as an input run.
    pub fn dispatch(
        &self,
        store: &DatasetStore,
        changed: &str,
        values: &Values,
    ) -> Result<Vec<ChartSpec>, ShellError> {
        let matching: Vec<&Callback> = self.callbacks_for(changed).collect();
        if matching.is_empty() {
            return Err(ShellError::UnknownControl(changed.to_string()));
        }
        log::debug!("{} changed, running {} callback(s)", changed, matching.len());
        Ok(matching.into_iter().flat_map(|cb| run(cb, store, values)).collect())
    }

    /// Run every callback of `tab`, as on page load.
    pub fn initial(&self, store: &DatasetStore, tab: Tab, values: &Values) -> Vec<ChartSpec> {
        self.callbacks
            .iter()
            .filter(|cb| cb.tab == tab)
            .flat_map(|cb| run(cb, store, values))
            .collect()
    }
}

/// Run a callback, keeping only the outputs it declares.
fn run(callback: &Callback, store: &DatasetStore, values: &Values) -> Vec<ChartSpec> {
    let selection = selection_from_values(callback.inputs, values);
    (callback.handler)(&selection, store)
        .into_iter()
        .filter(|chart| callback.outputs.contains(&chart.id.as_str()))
        .collect()
}

/// Read a selection from posted control values. Absent or ill-typed values
/// fall back to the unfiltered default for that control.
pub fn selection_from_values(inputs: &[ControlDef], values: &Values) -> Selection {
    let mut selection = Selection::default();
    for control in inputs {
        let Some(value) = values.get(control.id) else {
            if let Role::Overall { default } = control.role {
                selection = selection.overall(default);
            }
            continue;
        };
        selection = match control.role {
            Role::Metric(_) => match value.as_str() {
                Some(metric) => selection.metric(metric),
                None => selection,
            },
            Role::Categories => selection.categories(strings(value)),
            Role::DateRange => {
                let (start, end) = date_pair(value);
                selection.between(start.as_deref(), end.as_deref())
            }
            Role::Overall { .. } => selection.overall(match value {
                serde_json::Value::Bool(b) => *b,
                other => strings(other).iter().any(|v| v == OVERALL_VALUE),
            }),
        };
    }
    selection
}

fn strings(value: &serde_json::Value) -> Vec<String> {
    match value {
        serde_json::Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        serde_json::Value::String(s) => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// `{"start": .., "end": ..}` or `[start, end]`.
fn date_pair(value: &serde_json::Value) -> (Option<String>, Option<String>) {
    let text = |v: Option<&serde_json::Value>| v.and_then(|v| v.as_str()).map(str::to_string);
    match value {
        serde_json::Value::Object(map) => (text(map.get("start")), text(map.get("end"))),
        serde_json::Value::Array(items) => (text(items.first()), text(items.get(1))),
        _ => (None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::fixtures;
    use serde_json::json;

    fn values(pairs: &[(&str, serde_json::Value)]) -> Values {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn dispatch_runs_only_listening_callbacks() {
        let registry = Registry::standard();
        let store = fixtures::store();
        let charts = registry
            .dispatch(&store, "kaq4-platforms", &values(&[("kaq4-platforms", json!(["desktop"]))]))
            .unwrap();
        let ids: Vec<&str> = charts.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec![device::ACTIVITY, device::DURATION]);
    }

    #[test]
    fn unknown_control_is_an_error() {
        let registry = Registry::standard();
        let err = registry
            .dispatch(&fixtures::store(), "kaq9-metric", &Values::new())
            .unwrap_err();
        assert!(matches!(err, ShellError::UnknownControl(_)));
    }

    #[test]
    fn initial_runs_every_callback_of_a_tab() {
        let registry = Registry::standard();
        let charts = registry.initial(&fixtures::store(), Tab::Aq, &Values::new());
        assert_eq!(charts.len(), 3);
        assert!(charts.iter().all(|c| !c.is_empty()));
    }

    #[test]
    fn selection_reads_each_control_role() {
        let sel = selection_from_values(
            controls(Tab::Kaq1),
            &values(&[
                ("kaq1-metric", json!("events")),
                ("kaq1-tiers", json!(["free"])),
                ("kaq1-date", json!({"start": "2024-02-01", "end": null})),
                ("kaq1-overall", json!([])),
            ]),
        );
        assert_eq!(sel.metric.as_deref(), Some("events"));
        assert_eq!(sel.categories.len(), 1);
        assert_eq!(sel.start.as_deref(), Some("2024-02-01"));
        assert_eq!(sel.end, None);
        assert!(!sel.include_overall);
    }

    #[test]
    fn missing_overall_uses_control_default() {
        assert!(selection_from_values(controls(Tab::Kaq1), &Values::new()).include_overall);
        assert!(!selection_from_values(controls(Tab::Kaq5), &Values::new()).include_overall);
    }

    #[test]
    fn tier_scenario_through_the_registry() {
        let registry = Registry::standard();
        let store = fixtures::store();
        let charts = registry
            .dispatch(
                &store,
                "kaq1-date",
                &values(&[
                    ("kaq1-tiers", json!(["free"])),
                    ("kaq1-date", json!(["2024-02-01", "2024-02-01"])),
                    ("kaq1-overall", json!(false)),
                ]),
            )
            .unwrap();
        assert_eq!(charts[0].traces.len(), 1);
        assert_eq!(charts[0].traces[0].y, vec![Some(30.0)]);
    }
}
