use crate::error::ClientError;
use gloo_storage::{SessionStorage, Storage};
use log::{info, warn};
use shared::{AnalysisResult, PREVIEW_SLOT, RESULT_SLOT};

/// String key-value slots that survive a page navigation.
pub trait SlotStore {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&self, key: &str, value: &str) -> Result<(), ClientError>;
    fn remove(&self, key: &str);
}

/// The browser's `sessionStorage`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SessionSlots;

impl SlotStore for SessionSlots {
    fn read(&self, key: &str) -> Option<String> {
        SessionStorage::raw().get_item(key).ok().flatten()
    }

    fn write(&self, key: &str, value: &str) -> Result<(), ClientError> {
        SessionStorage::raw()
            .set_item(key, value)
            .map_err(|e| ClientError::Storage(format!("{:?}", e)))
    }

    fn remove(&self, key: &str) {
        SessionStorage::delete(key);
    }
}

/// What the entry view leaves behind for the result view.
#[derive(Debug, Clone, PartialEq)]
pub struct Handoff {
    pub result: AnalysisResult,
    pub preview_url: Option<String>,
}

pub fn store<S: SlotStore>(
    slots: &S,
    result: &AnalysisResult,
    preview_url: Option<&str>,
) -> Result<(), ClientError> {
    let json = serde_json::to_string(result).map_err(|e| ClientError::Storage(e.to_string()))?;
    slots.write(RESULT_SLOT, &json)?;
    match preview_url {
        Some(url) => slots.write(PREVIEW_SLOT, url)?,
        None => slots.remove(PREVIEW_SLOT),
    }
    info!("Stored analysis result ({} bytes)", json.len());
    Ok(())
}

pub fn load<S: SlotStore>(slots: &S) -> Result<Handoff, ClientError> {
    let json = slots.read(RESULT_SLOT).ok_or(ClientError::MissingData)?;
    let result = serde_json::from_str::<AnalysisResult>(&json).map_err(|e| {
        warn!("Stored analysis result is unreadable: {}", e);
        ClientError::MissingData
    })?;
    Ok(Handoff {
        result,
        preview_url: slots.read(PREVIEW_SLOT),
    })
}
