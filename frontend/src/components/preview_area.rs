use super::super::{Model, Msg};
use super::utils::debounce;
use crate::controller::SubmissionState;
use yew::prelude::*;

pub fn render_preview_area(model: &Model, ctx: &Context<Model>) -> Html {
    let link = ctx.link().clone();
    let button = model.controller.button();

    html! {
        <div id="preview-container">
            { render_selected_image_preview(model) }
            <div class="button-container">
                <button
                    id="analyze-btn"
                    class="analyze-btn"
                    disabled={button.disabled}
                    onclick={debounce(300, {
                        let link = link.clone();
                        move || link.send_message(Msg::Analyze)
                    })}
                >
                    { render_analyze_button_content(model, button.label) }
                </button>
            </div>
        </div>
    }
}

fn render_selected_image_preview(model: &Model) -> Html {
    match model.controller.image() {
        Some(image) => html! {
            <img id="actual-image-preview"
                src={image.preview_url.to_string()}
                alt={image.file.name()} />
        },
        None => html! {
            <div class="select-preview">
                <p>{"No image selected yet"}</p>
            </div>
        },
    }
}

fn render_analyze_button_content(model: &Model, label: &'static str) -> Html {
    match model.controller.state() {
        SubmissionState::Submitting | SubmissionState::Polling(_) | SubmissionState::Delivered => {
            html! { <><i class="fa-solid fa-spinner fa-spin"></i>{ format!(" {}", label) }</> }
        }
        _ => html! { <><i class="fa-solid fa-magnifying-glass"></i>{ format!(" {}", label) }</> },
    }
}
