mod api;
mod components;
mod config;
mod controller;
mod error;
mod poller;
mod presenter;
mod storage;
#[cfg(test)]
mod test_support;
mod view;

use api::{HttpApi, Submitted};
use components::handlers;
use components::header::render_header;
use components::preview_area::render_preview_area;
use components::results::ResultView;
use components::upload_section::render_upload_section;
use components::utils::render_error_message;
use config::ClientConfig;
use controller::SubmissionController;
use error::ClientError;
use gloo_events::EventListener;
use gloo_file::{File as GlooFile, ObjectUrl};
use shared::AnalysisResult;
use view::View;
use wasm_bindgen::JsCast;
use web_sys::{ClipboardEvent, DragEvent};
use yew::prelude::*;

// Models
#[derive(Clone)]
struct SelectedImage {
    file: GlooFile,
    preview_url: ObjectUrl,
}

// Yew msg components
enum Msg {
    // File operations
    FileSelected(GlooFile),
    SetError(Option<String>),

    // Analysis operations
    Analyze,
    Submitted(Result<Submitted, ClientError>),
    PollFinished(Result<AnalysisResult, ClientError>),

    // UI states
    SetDragging(bool),

    // Input events
    HandleDrop(DragEvent),
    HandlePaste(ClipboardEvent),
}

// Entry view: pick an image, submit it, wait for the result
struct Model {
    controller: SubmissionController<SelectedImage>,
    config: ClientConfig,
    api: HttpApi,
    error: Option<String>,
    is_dragging: bool,
    paste_listener: Option<EventListener>,
}

impl Component for Model {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let config = ClientConfig::from_build_env();
        log::info!("Analysis backend: {} ({} mode)", config.backend_url, config.mode);

        let mut model = Self {
            controller: SubmissionController::new(),
            api: HttpApi::new(config.clone()),
            config,
            error: None,
            is_dragging: false,
            paste_listener: None,
        };

        if let Some(window) = web_sys::window() {
            let link = ctx.link().clone();
            let listener = EventListener::new(&window, "paste", move |event| {
                if let Some(clipboard_event) = event.dyn_ref::<ClipboardEvent>() {
                    link.send_message(Msg::HandlePaste(clipboard_event.clone()));
                }
            });
            model.paste_listener = Some(listener);
        }

        model
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            // File operations
            Msg::FileSelected(file) => handlers::handle_file_selected(self, file),
            Msg::SetError(error) => {
                self.error = error;
                true
            }

            // Analysis operations
            Msg::Analyze => handlers::handle_analyze(self, ctx),
            Msg::Submitted(outcome) => handlers::handle_submitted(self, ctx, outcome),
            Msg::PollFinished(outcome) => handlers::handle_poll_finished(self, outcome),

            // UI states
            Msg::SetDragging(is_dragging) => {
                self.is_dragging = is_dragging;
                true
            }

            // Input events
            Msg::HandleDrop(event) => handlers::handle_drop(self, ctx, event),
            Msg::HandlePaste(event) => handlers::handle_paste(ctx, event),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="container">
                { render_header() }

                <main class="main-content">
                { render_upload_section(self, ctx) }
                { render_error_message(self) }
                { render_preview_area(self, ctx) }
                </main>

                <footer class="app-footer">
                    <p>{"Mangrove Carbon Analysis | Fullstack Rust WASM"}</p>
                </footer>
            </div>
        }
    }
}

#[function_component(App)]
fn app() -> Html {
    match View::current() {
        View::Entry => html! { <Model /> },
        View::Result => html! { <ResultView /> },
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("App starting...");
    yew::Renderer::<App>::new().render();
}
