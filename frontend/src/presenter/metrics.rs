use shared::AnalysisResult;
use strum::{Display, EnumString};

/// Carbon price range, USD per tonne CO2e.
pub const PRICE_LOW_USD: f64 = 5.0;
pub const PRICE_HIGH_USD: f64 = 30.0;
/// IDR per USD.
pub const USD_TO_IDR: f64 = 16_500.0;

/// How `total_stock` is split between mangrove and land.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SplitFormula {
    /// Each class gets `total * share / 100`; water carries no stock, so the
    /// two parts only add up to `total` when water is 0%.
    #[default]
    Percentage,
    /// `land = total / (1 + mangrove / land)`, `mangrove = total - land`.
    /// Water is ignored and the parts always add up to `total`.
    Ratio,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedMetrics {
    pub mangrove_stock: f64,
    pub land_stock: f64,
    /// Rupiah.
    pub value_low: f64,
    /// Rupiah.
    pub value_high: f64,
}

pub fn derive_metrics(result: &AnalysisResult, formula: SplitFormula) -> DerivedMetrics {
    let total = result.total_stock;
    let composition = &result.composition;
    let (mangrove_stock, land_stock) = match formula {
        SplitFormula::Percentage => (
            total * composition.mangrove / 100.0,
            total * composition.land / 100.0,
        ),
        SplitFormula::Ratio => ratio_split(total, composition.mangrove, composition.land),
    };

    DerivedMetrics {
        mangrove_stock,
        land_stock,
        value_low: total * PRICE_LOW_USD * USD_TO_IDR,
        value_high: total * PRICE_HIGH_USD * USD_TO_IDR,
    }
}

// No land share means no land carbon; the whole stock goes to mangrove.
fn ratio_split(total: f64, mangrove: f64, land: f64) -> (f64, f64) {
    if !(land > 0.0) {
        return (total, 0.0);
    }
    let land_stock = total / (1.0 + mangrove / land);
    if !land_stock.is_finite() {
        return (total, 0.0);
    }
    (total - land_stock, land_stock)
}
