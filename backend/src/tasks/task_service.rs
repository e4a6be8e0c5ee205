use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use shared::{AnalysisResult, AnalysisTask, TaskStatus};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Error, Debug, PartialEq)]
pub enum TaskServiceError {
    #[error("Task not found: {0}")]
    NotFound(String),
    #[error("Task {0} already finished")]
    AlreadyFinished(String),
}

#[derive(Debug, Clone)]
struct TaskRecord {
    task: AnalysisTask,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TaskRecord {
    fn new(task_id: String) -> Self {
        let now = Utc::now();
        Self {
            task: AnalysisTask::pending(task_id),
            created_at: now,
            updated_at: now,
        }
    }

    fn expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.task.status.is_terminal() && now - self.updated_at >= ttl
    }

    fn finish(&mut self, status: TaskStatus, result: Option<AnalysisResult>, error: Option<String>) {
        self.task.status = status;
        self.task.result = result;
        self.task.error = error;
        self.updated_at = Utc::now();
    }
}

pub const DEFAULT_TASK_TTL_SECS: i64 = 3600;

/// In-memory store of analysis tasks. Each task leaves `pending` exactly once;
/// finished tasks are dropped `ttl` after their last update.
#[derive(Clone)]
pub struct TaskService {
    tasks: Arc<RwLock<HashMap<String, TaskRecord>>>,
    ttl: Duration,
}

impl Default for TaskService {
    fn default() -> Self {
        Self::with_ttl(Duration::seconds(DEFAULT_TASK_TTL_SECS))
    }
}

impl TaskService {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            tasks: Arc::default(),
            ttl,
        }
    }

    fn evict_expired(&self, tasks: &mut HashMap<String, TaskRecord>) {
        let now = Utc::now();
        let before = tasks.len();
        tasks.retain(|_, record| !record.expired(now, self.ttl));
        let evicted = before - tasks.len();
        if evicted > 0 {
            debug!("Evicted {} finished tasks", evicted);
        }
    }

    pub async fn create_task(&self) -> AnalysisTask {
        let record = TaskRecord::new(Uuid::new_v4().to_string());
        let task = record.task.clone();
        let mut tasks = self.tasks.write().await;
        self.evict_expired(&mut tasks);
        tasks.insert(task.task_id.clone(), record);
        info!("Created task {}", task.task_id);
        task
    }

    pub async fn get_task(&self, task_id: &str) -> Option<AnalysisTask> {
        let mut tasks = self.tasks.write().await;
        self.evict_expired(&mut tasks);
        let record = tasks.get(task_id)?;
        debug!(
            "Task {} is {} (created {}, updated {})",
            task_id, record.task.status, record.created_at, record.updated_at
        );
        Some(record.task.clone())
    }

    pub async fn complete_task(
        &self,
        task_id: &str,
        result: AnalysisResult,
    ) -> Result<AnalysisTask, TaskServiceError> {
        self.finish(task_id, TaskStatus::Completed, Some(result), None).await
    }

    pub async fn fail_task(&self, task_id: &str, error: String) -> Result<AnalysisTask, TaskServiceError> {
        self.finish(task_id, TaskStatus::Failed, None, Some(error)).await
    }

    async fn finish(
        &self,
        task_id: &str,
        status: TaskStatus,
        result: Option<AnalysisResult>,
        error: Option<String>,
    ) -> Result<AnalysisTask, TaskServiceError> {
        let mut tasks = self.tasks.write().await;
        let record = tasks
            .get_mut(task_id)
            .ok_or_else(|| TaskServiceError::NotFound(task_id.to_string()))?;
        if record.task.status.is_terminal() {
            warn!("Task {} is already {}, ignoring {}", task_id, record.task.status, status);
            return Err(TaskServiceError::AlreadyFinished(task_id.to_string()));
        }
        record.finish(status, result, error);
        info!("Task {} {}", task_id, status);
        Ok(record.task.clone())
    }
}
