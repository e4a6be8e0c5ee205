use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Session storage slot holding the serialized `AnalysisResult` between views.
pub const RESULT_SLOT: &str = "analysisResult";
/// Session storage slot holding the locally created preview URL, if any.
pub const PREVIEW_SLOT: &str = "analysisPreview";

/// Multipart field name the backend reads the uploaded image from.
pub const UPLOAD_FIELD: &str = "file";

/// Land-cover percentages of the analyzed area.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct Composition {
    #[serde(default)]
    pub mangrove: f64,
    #[serde(default)]
    pub water: f64,
    #[serde(default)]
    pub land: f64,
}

impl Composition {
    pub fn total(&self) -> f64 {
        self.mangrove + self.water + self.land
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AnalysisResult {
    #[serde(default)]
    pub original_image_url: Option<String>,
    pub segmented_image_url: String,
    pub heatmap_image_url: String,
    pub composition: Composition,
    /// Hectares.
    pub total_area: f64,
    /// Tonnes of CO2-equivalent.
    pub total_stock: f64,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskStatus::Pending)
    }
}

/// Server-side unit of asynchronous analysis work.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AnalysisTask {
    #[serde(alias = "taskId")]
    pub task_id: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub result: Option<AnalysisResult>,
    #[serde(default)]
    pub error: Option<String>,
}

impl AnalysisTask {
    pub fn pending(task_id: String) -> Self {
        Self {
            task_id,
            status: TaskStatus::Pending,
            result: None,
            error: None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StartAnalysisResponse {
    pub task_id: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn task_status_uses_lowercase_on_the_wire() {
        let json = serde_json::to_string(&TaskStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
        assert_eq!(TaskStatus::from_str("failed").unwrap(), TaskStatus::Failed);
        assert_eq!(TaskStatus::Pending.to_string(), "pending");
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
    }

    #[test]
    fn pending_task_parses_without_result_or_error() {
        let task: AnalysisTask =
            serde_json::from_str(r#"{"task_id":"abc","status":"pending"}"#).unwrap();
        assert_eq!(task, AnalysisTask::pending("abc".into()));
    }

    #[test]
    fn composition_defaults_missing_shares_to_zero() {
        let composition: Composition = serde_json::from_str(r#"{"mangrove":60.5,"water":39.5}"#).unwrap();
        assert_eq!(composition.land, 0.0);
        assert!((composition.total() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn result_survives_json_round_trip() {
        let result = AnalysisResult {
            original_image_url: None,
            segmented_image_url: "/results/segmented_1.png".into(),
            heatmap_image_url: "/results/heatmap_1.png".into(),
            composition: Composition { mangrove: 40.0, water: 35.0, land: 25.0 },
            total_area: 12.34,
            total_stock: 1000.0,
        };
        let json = serde_json::to_string(&result).unwrap();
        let back: AnalysisResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
