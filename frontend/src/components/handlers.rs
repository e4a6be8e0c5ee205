use super::super::Msg;
use super::super::{Model, SelectedImage};
use super::utils::{alert, extract_image_files};
use crate::api::{self, Submitted};
use crate::error::ClientError;
use crate::poller::{self, BrowserSleeper};
use crate::storage::{self, SessionSlots};
use crate::view::View;
use gloo_file::{File as GlooFile, ObjectUrl};
use shared::AnalysisResult;
use wasm_bindgen_futures::spawn_local;
use web_sys::{ClipboardEvent, DragEvent, FileList};
use yew::prelude::*;

pub fn handle_file_selected(model: &mut Model, file: GlooFile) -> bool {
    let preview_url = ObjectUrl::from(file.clone());
    match model.controller.select_image(SelectedImage { file, preview_url }) {
        Ok(()) => {
            model.error = None;
            true
        }
        Err(e) => {
            model.error = Some(e.to_string());
            true
        }
    }
}

pub fn handle_analyze(model: &mut Model, ctx: &Context<Model>) -> bool {
    match model.controller.request_submit() {
        Ok(image) => {
            model.error = None;
            send_analysis_request(model, ctx, image.file);
            true
        }
        Err(e) => {
            log::warn!("Analyze rejected: {}", e);
            alert(&e.to_string());
            false
        }
    }
}

fn send_analysis_request(model: &Model, ctx: &Context<Model>, file: GlooFile) {
    let api = model.api.clone();
    let mode = model.config.mode;
    let link = ctx.link().clone();

    spawn_local(async move {
        let outcome = api::submit(&api, mode, &file).await;
        link.send_message(Msg::Submitted(outcome));
    });
}

pub fn handle_submitted(
    model: &mut Model,
    ctx: &Context<Model>,
    outcome: Result<Submitted, ClientError>,
) -> bool {
    match outcome {
        Ok(Submitted::Finished(result)) => deliver(model, result),
        Ok(Submitted::Accepted(task_id)) => start_polling(model, ctx, task_id),
        Err(e) => fail(model, e),
    }
}

fn start_polling(model: &mut Model, ctx: &Context<Model>, task_id: String) -> bool {
    let api = model.api.clone();
    let interval_ms = model.config.poll_interval_ms;
    let link = ctx.link().clone();

    let (handle, polling) = {
        let task_id = task_id.clone();
        poller::schedule(task_id.clone(), async move {
            poller::poll_until_terminal(&api, &BrowserSleeper, &task_id, interval_ms).await
        })
    };

    spawn_local(async move {
        match polling.await {
            Ok(outcome) => link.send_message(Msg::PollFinished(outcome)),
            Err(_) => log::debug!("Poller for task {} aborted", task_id),
        }
    });

    model.controller.task_accepted(handle)
}

pub fn handle_poll_finished(
    model: &mut Model,
    outcome: Result<AnalysisResult, ClientError>,
) -> bool {
    match outcome {
        Ok(result) => deliver(model, result),
        Err(e) => fail(model, e),
    }
}

fn deliver(model: &mut Model, result: AnalysisResult) -> bool {
    let Some(result) = model.controller.result_received(result) else {
        return false;
    };
    let preview_url = model
        .controller
        .image()
        .map(|image| image.preview_url.to_string());

    match storage::store(&SessionSlots, &result, preview_url.as_deref()) {
        Ok(()) => {
            log::info!("Analysis delivered, opening results");
            View::Result.navigate();
        }
        Err(e) => {
            log::error!("Could not hand over the result: {}", e);
            alert(&e.to_string());
            model.error = Some(e.to_string());
            model.controller.reset();
        }
    }
    true
}

fn fail(model: &mut Model, error: ClientError) -> bool {
    if !model.controller.fail(error.clone()) {
        return false;
    }
    log::error!("Analysis failed: {}", error);
    alert(&error.to_string());
    model.error = Some(error.to_string());
    model.controller.reset();
    true
}

pub fn handle_drop(model: &mut Model, ctx: &Context<Model>, event: DragEvent) -> bool {
    event.prevent_default();
    model.is_dragging = false;

    if let Some(data_transfer) = event.data_transfer() {
        if let Some(file_list) = data_transfer.files() {
            process_file_list(ctx, file_list);
        }
    }

    true
}

pub fn handle_paste(ctx: &Context<Model>, event: ClipboardEvent) -> bool {
    if let Some(data_transfer) = event.clipboard_data() {
        if let Some(file_list) = data_transfer.files() {
            if file_list.length() > 0 {
                event.prevent_default();
                process_file_list(ctx, file_list);
                return true;
            }
        }
    }
    false
}

// Only the first image counts, one analysis runs per submission
pub fn process_file_list(ctx: &Context<Model>, file_list: FileList) {
    match extract_image_files(&file_list).into_iter().next() {
        Some(file) => ctx.link().send_message(Msg::FileSelected(file)),
        None => {
            log::warn!("Dropped or pasted content contained no image");
            ctx.link()
                .send_message(Msg::SetError(Some("No valid image file selected.".into())));
        }
    }
}
