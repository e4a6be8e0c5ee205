use log::error;

/// Which page the app renders, picked from the `view` query parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Entry,
    Result,
}

impl View {
    pub fn from_query(search: &str) -> Self {
        let query = search.trim_start_matches('?');
        let is_result = url::form_urlencoded::parse(query.as_bytes())
            .any(|(key, value)| key == "view" && value == "result");
        if is_result { View::Result } else { View::Entry }
    }

    pub fn href(self) -> &'static str {
        match self {
            View::Entry => "?",
            View::Result => "?view=result",
        }
    }

    pub fn current() -> Self {
        web_sys::window()
            .and_then(|window| window.location().search().ok())
            .map(|search| Self::from_query(&search))
            .unwrap_or(View::Entry)
    }

    /// Full page navigation, so the result view starts from stored data only.
    pub fn navigate(self) {
        let Some(window) = web_sys::window() else {
            error!("No window to navigate with");
            return;
        };
        if let Err(e) = window.location().set_href(self.href()) {
            error!("Navigation to {:?} failed: {:?}", self, e);
        }
    }
}
