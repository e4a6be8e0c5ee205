//! Submission lifecycle: select an image, submit it, wait, deliver.
//!
//! The controller only tracks state. Network calls and timers are started by
//! the caller once a transition allows them; the poller handle is parked in
//! [`SubmissionState::Polling`] so leaving that state always stops polling.

use crate::error::ClientError;
use crate::poller::PollHandle;
use log::{info, warn};
use shared::AnalysisResult;

#[derive(Debug)]
pub enum SubmissionState {
    Idle,
    Ready,
    Submitting,
    Polling(PollHandle),
    Delivered,
    Failed(ClientError),
}

impl SubmissionState {
    pub fn name(&self) -> &'static str {
        match self {
            SubmissionState::Idle => "idle",
            SubmissionState::Ready => "ready",
            SubmissionState::Submitting => "submitting",
            SubmissionState::Polling(_) => "polling",
            SubmissionState::Delivered => "delivered",
            SubmissionState::Failed(_) => "failed",
        }
    }
}

/// Label and enabled flag of the analyze button for the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonState {
    pub label: &'static str,
    pub disabled: bool,
}

#[derive(Debug)]
pub struct SubmissionController<I> {
    image: Option<I>,
    state: SubmissionState,
}

impl<I> Default for SubmissionController<I> {
    fn default() -> Self {
        Self {
            image: None,
            state: SubmissionState::Idle,
        }
    }
}

impl<I: Clone> SubmissionController<I> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn image(&self) -> Option<&I> {
        self.image.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.state, SubmissionState::Submitting | SubmissionState::Polling(_))
    }

    fn transition(&mut self, next: SubmissionState) {
        info!("Submission {} -> {}", self.state.name(), next.name());
        self.state = next;
    }

    pub fn select_image(&mut self, image: I) -> Result<(), ClientError> {
        if self.is_busy() {
            warn!("Ignoring image selection while {}", self.state.name());
            return Err(ClientError::busy());
        }
        self.image = Some(image);
        self.transition(SubmissionState::Ready);
        Ok(())
    }

    /// Starts a submission and hands back the image to upload. Without an
    /// image, or while another submission runs, nothing changes.
    pub fn request_submit(&mut self) -> Result<I, ClientError> {
        if self.is_busy() {
            warn!("Rejected submit while {}", self.state.name());
            return Err(ClientError::busy());
        }
        let Some(image) = self.image.clone() else {
            warn!("Rejected submit without an image");
            return Err(ClientError::no_image());
        };
        self.transition(SubmissionState::Submitting);
        Ok(image)
    }

    /// The backend accepted the upload as a task. Returns `false` (and drops,
    /// i.e. cancels, the handle) when no submission is waiting for one.
    pub fn task_accepted(&mut self, handle: PollHandle) -> bool {
        if !matches!(self.state, SubmissionState::Submitting) {
            warn!("Discarding poller for task {} while {}", handle.task_id(), self.state.name());
            return false;
        }
        info!("Polling task {}", handle.task_id());
        self.transition(SubmissionState::Polling(handle));
        true
    }

    /// A result arrived, either straight from the submission or from a
    /// completed task. Returns the result to hand over, or `None` if it is
    /// stale.
    pub fn result_received(&mut self, result: AnalysisResult) -> Option<AnalysisResult> {
        if !self.is_busy() {
            warn!("Ignoring result while {}", self.state.name());
            return None;
        }
        self.transition(SubmissionState::Delivered);
        Some(result)
    }

    /// Transport failure or failed task. Returns `false` if no submission was
    /// in flight.
    pub fn fail(&mut self, error: ClientError) -> bool {
        if !self.is_busy() {
            warn!("Ignoring failure while {}: {}", self.state.name(), error);
            return false;
        }
        self.transition(SubmissionState::Failed(error));
        true
    }

    /// Leaves a terminal state so the image can be submitted again.
    pub fn reset(&mut self) {
        if matches!(self.state, SubmissionState::Delivered | SubmissionState::Failed(_)) {
            let next = if self.image.is_some() {
                SubmissionState::Ready
            } else {
                SubmissionState::Idle
            };
            self.transition(next);
        }
    }

    pub fn button(&self) -> ButtonState {
        match self.state {
            SubmissionState::Submitting => ButtonState {
                label: "Uploading & analyzing...",
                disabled: true,
            },
            SubmissionState::Polling(_) => ButtonState {
                label: "Waiting for results...",
                disabled: true,
            },
            SubmissionState::Delivered => ButtonState {
                label: "Opening results...",
                disabled: true,
            },
            _ => ButtonState {
                label: "Analyze Now",
                disabled: false,
            },
        }
    }
}
