use crate::api::AnalysisApi;
use crate::error::ClientError;
use shared::{AnalysisResult, AnalysisTask, Composition, TaskStatus};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

pub fn sample_result() -> AnalysisResult {
    AnalysisResult {
        original_image_url: Some("/uploads/original_1700000000_bay.png".into()),
        segmented_image_url: "/results/segmented_1700000000_a1b2c3d4e5f6.png".into(),
        heatmap_image_url: "/results/heatmap_1700000000_a1b2c3d4e5f6.png".into(),
        composition: Composition { mangrove: 40.0, water: 35.0, land: 25.0 },
        total_area: 12.5,
        total_stock: 1000.0,
    }
}

/// Backend double answering status checks from a script. Once the script
/// runs out every check reports `pending`.
pub struct ScriptedApi {
    script: RefCell<VecDeque<Result<AnalysisTask, ClientError>>>,
    status_calls: Cell<usize>,
    submit_calls: Cell<usize>,
}

impl ScriptedApi {
    pub fn new(script: Vec<Result<AnalysisTask, ClientError>>) -> Self {
        Self {
            script: RefCell::new(script.into()),
            status_calls: Cell::new(0),
            submit_calls: Cell::new(0),
        }
    }

    pub fn pending() -> AnalysisTask {
        AnalysisTask::pending("task-1".into())
    }

    pub fn completed(result: AnalysisResult) -> AnalysisTask {
        AnalysisTask {
            status: TaskStatus::Completed,
            result: Some(result),
            ..Self::pending()
        }
    }

    pub fn failed() -> AnalysisTask {
        AnalysisTask {
            status: TaskStatus::Failed,
            error: Some("analysis failed".into()),
            ..Self::pending()
        }
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.get()
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.get()
    }
}

impl AnalysisApi for ScriptedApi {
    type Image = &'static str;

    async fn analyze(&self, _image: &&'static str) -> Result<AnalysisResult, ClientError> {
        self.submit_calls.set(self.submit_calls.get() + 1);
        Ok(sample_result())
    }

    async fn start_analysis(&self, _image: &&'static str) -> Result<String, ClientError> {
        self.submit_calls.set(self.submit_calls.get() + 1);
        Ok("task-1".into())
    }

    async fn check_status(&self, task_id: &str) -> Result<AnalysisTask, ClientError> {
        self.status_calls.set(self.status_calls.get() + 1);
        self.script
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(AnalysisTask::pending(task_id.into())))
    }
}
