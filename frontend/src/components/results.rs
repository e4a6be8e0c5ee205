use super::utils::{alert, debounce};
use crate::config::ClientConfig;
use crate::presenter::charts::{self, Chart, ChartSlot, LEGEND};
use crate::presenter::metrics::SplitFormula;
use crate::presenter::{self, Dashboard};
use crate::storage::{self, Handoff, SessionSlots};
use crate::view::View;
use wasm_bindgen::JsValue;
use web_sys::HtmlCanvasElement;
use yew::prelude::*;

pub enum ResultMsg {
    SetFormula(SplitFormula),
    BackToUpload,
}

/// Result view: reads the stored handoff once and renders it.
pub struct ResultView {
    config: ClientConfig,
    handoff: Option<Handoff>,
    formula: SplitFormula,
    generated_at: String,
    composition_canvas: NodeRef,
    stock_canvas: NodeRef,
    composition_chart: ChartSlot<Chart>,
    stock_chart: ChartSlot<Chart>,
}

impl ResultView {
    fn dashboard(&self) -> Option<Dashboard> {
        self.handoff
            .as_ref()
            .map(|handoff| presenter::prepare(handoff, &self.config, self.formula))
    }
}

impl Component for ResultView {
    type Message = ResultMsg;
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        let config = ClientConfig::from_build_env();
        let handoff = match storage::load(&SessionSlots) {
            Ok(handoff) => Some(handoff),
            Err(e) => {
                log::error!("Result view opened without data: {}", e);
                alert(&e.to_string());
                View::Entry.navigate();
                None
            }
        };

        Self {
            formula: config.split_formula,
            config,
            handoff,
            generated_at: js_sys::Date::new_0()
                .to_locale_string("id-ID", &JsValue::UNDEFINED)
                .into(),
            composition_canvas: NodeRef::default(),
            stock_canvas: NodeRef::default(),
            composition_chart: ChartSlot::default(),
            stock_chart: ChartSlot::default(),
        }
    }

    fn update(&mut self, _ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            ResultMsg::SetFormula(formula) => {
                if self.formula == formula {
                    return false;
                }
                log::info!("Carbon split formula: {}", formula);
                self.formula = formula;
                true
            }
            ResultMsg::BackToUpload => {
                View::Entry.navigate();
                false
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let Some(dashboard) = self.dashboard() else {
            return html! {
                <div class="container">
                    <p class="no-results-message">{"No analysis data found. Returning to upload..."}</p>
                </div>
            };
        };
        let link = ctx.link().clone();

        html! {
            <div class="container">
                <header class="app-header">
                    <h1><i class="fa-solid fa-chart-pie"></i>{" Analysis Result"}</h1>
                    <p class="subtitle">{ format!("Generated {}", self.generated_at) }</p>
                </header>

                <main class="main-content">
                    { render_images(&dashboard) }
                    { render_figures(&dashboard) }
                    { self.render_formula_selector(ctx) }

                    <div class="results-charts">
                        <div class="chart-box">
                            <h3>{"Land Cover Composition"}</h3>
                            <canvas id="composition-chart" ref={self.composition_canvas.clone()}></canvas>
                        </div>
                        <div class="chart-box">
                            <h3>{"Carbon Stock"}</h3>
                            <canvas id="stock-chart" ref={self.stock_canvas.clone()}></canvas>
                        </div>
                    </div>

                    <div class="button-container">
                        <button
                            class="analyze-btn"
                            onclick={debounce(300, move || link.send_message(ResultMsg::BackToUpload))}
                        >
                            <i class="fa-solid fa-arrow-left"></i>{" Analyze Another Image"}
                        </button>
                    </div>
                </main>
            </div>
        }
    }

    fn rendered(&mut self, _ctx: &Context<Self>, _first_render: bool) {
        let Some(dashboard) = self.dashboard() else {
            return;
        };

        if let Some(canvas) = self.composition_canvas.cast::<HtmlCanvasElement>() {
            if let Err(e) = charts::draw(&mut self.composition_chart, &canvas, &dashboard.composition_chart) {
                log::error!("Composition chart failed: {:?}", e);
            }
        }
        if let Some(canvas) = self.stock_canvas.cast::<HtmlCanvasElement>() {
            if let Err(e) = charts::draw(&mut self.stock_chart, &canvas, &dashboard.stock_chart) {
                log::error!("Stock chart failed: {:?}", e);
            }
        }
    }
}

impl ResultView {
    fn render_formula_selector(&self, ctx: &Context<Self>) -> Html {
        let option = |formula: SplitFormula, label: &'static str| {
            html! {
                <label>
                    <input type="radio" name="split_formula"
                        value={formula.to_string()}
                        checked={self.formula == formula}
                        onchange={ctx.link().callback(move |_| ResultMsg::SetFormula(formula))} />
                    <span class="radio-label-text">{ label }</span>
                </label>
            }
        };

        html! {
            <div class="processing-mode-selector">
                { option(SplitFormula::Percentage, "Split by share") }
                { option(SplitFormula::Ratio, "Split by mangrove/land ratio") }
            </div>
        }
    }
}

fn render_images(dashboard: &Dashboard) -> Html {
    html! {
        <div class="result-images">
            <figure>
                {
                    match &dashboard.original_image {
                        Some(src) => html! { <img id="original-image" src={src.clone()} alt="Original image" /> },
                        None => html! { <div class="unavailable-preview"><p>{"Original image unavailable"}</p></div> },
                    }
                }
                <figcaption>{"Original"}</figcaption>
            </figure>
            <figure>
                <img id="segmented-image" src={dashboard.segmented_image.clone()} alt="Segmentation" />
                <figcaption>{"Segmentation"}</figcaption>
                <ul class="legend">
                    { for LEGEND.iter().map(|(label, color)| html! {
                        <li>
                            <span class="legend-swatch" style={format!("background-color: {}", color)}></span>
                            { *label }
                        </li>
                    })}
                </ul>
            </figure>
            <figure>
                <img id="heatmap-image" src={dashboard.heatmap_image.clone()} alt="Carbon heatmap" />
                <figcaption>{"Carbon Density Heatmap"}</figcaption>
                <div class="heatmap-legend">
                    <span>{"Low"}</span>
                    <span class="heatmap-gradient"
                        style="background: linear-gradient(to right, #800000, #ff0000, #ffff00, #00ffff, #0000ff, #000080);">
                    </span>
                    <span>{"High"}</span>
                </div>
            </figure>
        </div>
    }
}

fn render_figures(dashboard: &Dashboard) -> Html {
    html! {
        <div class="result-figures">
            <div class="result-item">
                <div class="result-label">{"Estimated Area"}</div>
                <div id="total-area" class="result-value">{ dashboard.area.clone() }</div>
            </div>
            <div class="result-item">
                <div class="result-label">{"Total Carbon Stock"}</div>
                <div id="total-stock" class="result-value">{ dashboard.stock.clone() }</div>
            </div>
            <div class="result-item">
                <div class="result-label">{"Economic Value (low)"}</div>
                <div id="value-low" class="result-value">{ dashboard.value_low.clone() }</div>
            </div>
            <div class="result-item">
                <div class="result-label">{"Economic Value (high)"}</div>
                <div id="value-high" class="result-value">{ dashboard.value_high.clone() }</div>
            </div>
        </div>
    }
}
