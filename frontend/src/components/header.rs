use yew::prelude::*;

/// Renders the application header
pub fn render_header() -> Html {
    html! {
        <header class="app-header">
            <h1><i class="fa-solid fa-tree"></i> {" Mangrove Carbon Analysis"}</h1>
            <p class="subtitle">{"Upload an aerial or satellite image via button, drag & drop, or paste"}</p>
        </header>
    }
}
