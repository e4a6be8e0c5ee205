//! Turns a stored analysis payload into display-ready figures.

pub mod charts;
pub mod format;
pub mod metrics;

use crate::config::ClientConfig;
use crate::storage::Handoff;
use charts::ChartData;
use log::warn;
use metrics::{DerivedMetrics, SplitFormula, derive_metrics};

/// Rounded shares may drift from 100% by a little.
const COMPOSITION_TOLERANCE: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    /// `None` when neither the server nor the browser kept the original.
    pub original_image: Option<String>,
    pub segmented_image: String,
    pub heatmap_image: String,
    pub area: String,
    pub stock: String,
    pub value_low: String,
    pub value_high: String,
    pub metrics: DerivedMetrics,
    pub composition_chart: ChartData,
    pub stock_chart: ChartData,
}

pub fn prepare(handoff: &Handoff, config: &ClientConfig, formula: SplitFormula) -> Dashboard {
    let result = &handoff.result;
    let metrics = derive_metrics(result, formula);

    let share_total = result.composition.total();
    if (share_total - 100.0).abs() > COMPOSITION_TOLERANCE {
        warn!("Composition shares add up to {:.2}%, not 100%", share_total);
    }

    let original_image = result
        .original_image_url
        .as_deref()
        .or(handoff.preview_url.as_deref())
        .map(|url| config.resolve_url(url));

    Dashboard {
        original_image,
        segmented_image: config.resolve_url(&result.segmented_image_url),
        heatmap_image: config.resolve_url(&result.heatmap_image_url),
        area: format::area(result.total_area),
        stock: format::stock(result.total_stock),
        value_low: format::rupiah(metrics.value_low),
        value_high: format::rupiah(metrics.value_high),
        metrics,
        composition_chart: charts::composition_chart(&result.composition),
        stock_chart: charts::stock_chart(&metrics),
    }
}
