//! Land-cover analysis of an uploaded aerial image.
//!
//! Pixels are split into mangrove, water and land by their dominant color
//! channel. The class map is written out as a segmented PNG and a JET heatmap,
//! and the pixel counts drive the composition, area and carbon estimate.

pub mod heatmap;
pub mod segmentation;

use crate::config::AnalysisConfig;
use image::ImageFormat;
use log::info;
use segmentation::{ClassCounts, Segmentation};
use shared::{AnalysisResult, Composition};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("Image has no pixels")]
    EmptyImage,
    #[error("Failed to write result image: {0}")]
    Encode(#[source] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct Analyzer {
    config: AnalysisConfig,
    result_dir: PathBuf,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig, result_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            result_dir: result_dir.into(),
        }
    }

    /// Analyzes `image_bytes` and writes `segmented_{stamp}.png` and
    /// `heatmap_{stamp}.png` into the result directory.
    pub fn analyze(
        &self,
        image_bytes: &[u8],
        stamp: &str,
        original_image_url: Option<String>,
    ) -> Result<AnalysisResult, AnalysisError> {
        let image = image::load_from_memory(image_bytes)
            .map_err(AnalysisError::Decode)?
            .to_rgb8();
        if image.width() == 0 || image.height() == 0 {
            return Err(AnalysisError::EmptyImage);
        }

        let segmentation = Segmentation::classify(&image, self.config.dominance_margin);
        let (width, height) = segmentation.dimensions();

        let segmented_name = format!("segmented_{}.png", stamp);
        let heatmap_name = format!("heatmap_{}.png", stamp);

        segmentation
            .render()
            .save_with_format(self.result_path(&segmented_name), ImageFormat::Png)
            .map_err(AnalysisError::Encode)?;
        heatmap::render(&segmentation.mangrove_mask(), width, height)
            .save_with_format(self.result_path(&heatmap_name), ImageFormat::Png)
            .map_err(AnalysisError::Encode)?;

        let counts = segmentation.counts();
        info!(
            "Analyzed {}x{} image: {} mangrove, {} water, {} land pixels",
            width, height, counts.mangrove, counts.water, counts.land
        );

        Ok(AnalysisResult {
            original_image_url,
            segmented_image_url: format!("/results/{}", segmented_name),
            heatmap_image_url: format!("/results/{}", heatmap_name),
            composition: composition(&counts),
            total_area: round2(counts.total() as f64 / self.config.pixels_per_hectare),
            total_stock: carbon_stock(&counts, &self.config),
        })
    }

    fn result_path(&self, name: &str) -> PathBuf {
        self.result_dir.join(name)
    }
}

pub fn composition(counts: &ClassCounts) -> Composition {
    let total = counts.total();
    let share = |pixels: u64| {
        if total == 0 {
            0.0
        } else {
            round2(pixels as f64 / total as f64 * 100.0)
        }
    };
    Composition {
        mangrove: share(counts.mangrove),
        water: share(counts.water),
        land: share(counts.land),
    }
}

/// Water holds no stock.
pub fn carbon_stock(counts: &ClassCounts, config: &AnalysisConfig) -> f64 {
    (counts.mangrove as f64 * config.mangrove_factor + counts.land as f64 * config.land_factor)
        .round()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
