use crate::presenter::metrics::DerivedMetrics;
use log::debug;
use serde_json::{Value, json};
use shared::Composition;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

pub const MANGROVE_COLOR: &str = "#00FF00";
pub const WATER_COLOR: &str = "#0000FF";
pub const LAND_COLOR: &str = "#FFD700";

pub const MANGROVE_LABEL: &str = "Mangrove";
pub const WATER_LABEL: &str = "Water";
pub const LAND_LABEL: &str = "Other Land";

/// Segmentation legend, in the same order and colors as the composition chart.
pub const LEGEND: [(&str, &str); 3] = [
    (MANGROVE_LABEL, MANGROVE_COLOR),
    (WATER_LABEL, WATER_COLOR),
    (LAND_LABEL, LAND_COLOR),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Pie,
    Bar,
}

/// Plain numeric series handed to the chart library.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub kind: ChartKind,
    pub title: Option<&'static str>,
    pub labels: Vec<&'static str>,
    pub values: Vec<f64>,
    pub colors: Vec<&'static str>,
}

pub fn composition_chart(composition: &Composition) -> ChartData {
    ChartData {
        kind: ChartKind::Pie,
        title: None,
        labels: LEGEND.iter().map(|(label, _)| *label).collect(),
        values: vec![composition.mangrove, composition.water, composition.land],
        colors: LEGEND.iter().map(|(_, color)| *color).collect(),
    }
}

pub fn stock_chart(metrics: &DerivedMetrics) -> ChartData {
    ChartData {
        kind: ChartKind::Bar,
        title: Some("Carbon Stock (Ton CO₂e)"),
        labels: vec![MANGROVE_LABEL, LAND_LABEL],
        values: vec![metrics.mangrove_stock, metrics.land_stock],
        colors: vec![MANGROVE_COLOR, LAND_COLOR],
    }
}

impl ChartData {
    /// Chart.js configuration object.
    pub fn config(&self) -> Value {
        match self.kind {
            ChartKind::Pie => json!({
                "type": "pie",
                "data": {
                    "labels": self.labels,
                    "datasets": [{
                        "data": self.values,
                        "backgroundColor": self.colors,
                        "borderColor": "#ffffff",
                        "borderWidth": 1
                    }]
                },
                "options": { "responsive": true, "maintainAspectRatio": false }
            }),
            ChartKind::Bar => json!({
                "type": "bar",
                "data": {
                    "labels": self.labels,
                    "datasets": [{
                        "label": self.title.unwrap_or_default(),
                        "data": self.values,
                        "backgroundColor": self.colors
                    }]
                },
                "options": {
                    "responsive": true,
                    "maintainAspectRatio": false,
                    "scales": { "y": { "beginAtZero": true } },
                    "plugins": { "legend": { "display": false } }
                }
            }),
        }
    }
}

#[wasm_bindgen]
extern "C" {
    /// Chart.js, loaded by the page as a global.
    pub type Chart;

    #[wasm_bindgen(constructor, catch)]
    fn new(canvas: &HtmlCanvasElement, config: &JsValue) -> Result<Chart, JsValue>;

    #[wasm_bindgen(method, js_name = destroy)]
    fn destroy_chart(this: &Chart);

    #[wasm_bindgen(static_method_of = Chart, js_name = getChart)]
    fn get_chart(canvas: &HtmlCanvasElement) -> Option<Chart>;
}

pub trait ChartInstance {
    fn destroy(&self);
}

impl ChartInstance for Chart {
    fn destroy(&self) {
        self.destroy_chart();
    }
}

/// Holds at most one live chart. Replacing or dropping the slot destroys the
/// previous instance first.
#[derive(Debug)]
pub struct ChartSlot<C: ChartInstance> {
    current: Option<C>,
}

impl<C: ChartInstance> Default for ChartSlot<C> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<C: ChartInstance> ChartSlot<C> {
    pub fn replace<E>(&mut self, build: impl FnOnce() -> Result<C, E>) -> Result<(), E> {
        self.clear();
        self.current = Some(build()?);
        Ok(())
    }

    pub fn clear(&mut self) {
        if let Some(previous) = self.current.take() {
            previous.destroy();
        }
    }

    #[cfg(test)]
    pub fn is_live(&self) -> bool {
        self.current.is_some()
    }
}

impl<C: ChartInstance> Drop for ChartSlot<C> {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Draws `data` on `canvas`, destroying whatever chart was bound to it.
pub fn draw(
    slot: &mut ChartSlot<Chart>,
    canvas: &HtmlCanvasElement,
    data: &ChartData,
) -> Result<(), JsValue> {
    let config = js_sys::JSON::parse(&data.config().to_string())?;
    slot.replace(|| {
        if let Some(stale) = Chart::get_chart(canvas) {
            debug!("Destroying chart left on canvas {}", canvas.id());
            stale.destroy_chart();
        }
        Chart::new(canvas, &config)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presenter::metrics::{SplitFormula, derive_metrics};
    use crate::test_support::sample_result;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn composition_series_preserve_order() {
        let composition = Composition { mangrove: 40.0, water: 35.0, land: 25.0 };
        let chart = composition_chart(&composition);
        assert_eq!(chart.values, vec![40.0, 35.0, 25.0]);
        assert_eq!(chart.labels, vec!["Mangrove", "Water", "Other Land"]);
    }

    #[test]
    fn legend_and_series_share_colors() {
        let chart = composition_chart(&Composition::default());
        let legend_colors: Vec<_> = LEGEND.iter().map(|(_, color)| *color).collect();
        assert_eq!(chart.colors, legend_colors);

        let metrics = derive_metrics(&sample_result(), SplitFormula::Percentage);
        let stock = stock_chart(&metrics);
        assert_eq!(stock.colors, vec![MANGROVE_COLOR, LAND_COLOR]);
        assert_eq!(stock.values, vec![400.0, 250.0]);
    }

    #[test]
    fn bar_config_starts_at_zero_without_legend() {
        let metrics = derive_metrics(&sample_result(), SplitFormula::Percentage);
        let config = stock_chart(&metrics).config();
        assert_eq!(config["type"], "bar");
        assert_eq!(config["options"]["scales"]["y"]["beginAtZero"], true);
        assert_eq!(config["options"]["plugins"]["legend"]["display"], false);
        assert_eq!(config["data"]["datasets"][0]["data"], json!([400.0, 250.0]));
    }

    struct FakeChart {
        live: Rc<Cell<usize>>,
    }

    impl FakeChart {
        fn new(live: &Rc<Cell<usize>>) -> Self {
            live.set(live.get() + 1);
            Self { live: live.clone() }
        }
    }

    impl ChartInstance for FakeChart {
        fn destroy(&self) {
            self.live.set(self.live.get() - 1);
        }
    }

    #[test]
    fn repeated_renders_keep_a_single_chart() {
        let live = Rc::new(Cell::new(0));
        let mut slot = ChartSlot::default();
        for _ in 0..4 {
            slot.replace(|| Ok::<_, ()>(FakeChart::new(&live))).unwrap();
            assert_eq!(live.get(), 1);
        }
        drop(slot);
        assert_eq!(live.get(), 0);
    }

    #[test]
    fn failed_build_leaves_slot_empty() {
        let live = Rc::new(Cell::new(0));
        let mut slot = ChartSlot::default();
        slot.replace(|| Ok::<_, &str>(FakeChart::new(&live))).unwrap();
        assert_eq!(slot.replace(|| Err("canvas missing")), Err("canvas missing"));
        assert!(!slot.is_live());
        assert_eq!(live.get(), 0);
    }
}
