use crate::presenter::metrics::SplitFormula;
use log::warn;
use std::str::FromStr;
use strum::{Display, EnumString};
use url::Url;

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 3000;

/// How an image is handed to the analysis service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SubmissionMode {
    /// `POST /analyze`, the response carries the result.
    Sync,
    /// `POST /start-analysis` followed by `GET /check-status/{id}` polling.
    #[default]
    Task,
}

/// Client settings, baked in at build time.
///
/// Every field can be overridden through an environment variable visible to
/// the compiler (`ANALYSIS_BACKEND_URL`, `ANALYSIS_MODE`,
/// `ANALYSIS_POLL_INTERVAL_MS`, `ANALYSIS_SPLIT_FORMULA`).
#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    pub backend_url: String,
    pub mode: SubmissionMode,
    pub poll_interval_ms: u32,
    pub split_formula: SplitFormula,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            mode: SubmissionMode::default(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            split_formula: SplitFormula::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_build_env() -> Self {
        Self::from_lookup(|key| match key {
            "ANALYSIS_BACKEND_URL" => option_env!("ANALYSIS_BACKEND_URL"),
            "ANALYSIS_MODE" => option_env!("ANALYSIS_MODE"),
            "ANALYSIS_POLL_INTERVAL_MS" => option_env!("ANALYSIS_POLL_INTERVAL_MS"),
            "ANALYSIS_SPLIT_FORMULA" => option_env!("ANALYSIS_SPLIT_FORMULA"),
            _ => None,
        })
    }

    fn from_lookup<'a>(lookup: impl Fn(&str) -> Option<&'a str>) -> Self {
        let defaults = Self::default();
        let backend_url = match lookup("ANALYSIS_BACKEND_URL") {
            Some(raw) if Url::parse(raw).is_ok() => raw.trim_end_matches('/').to_string(),
            Some(raw) => {
                warn!("Ignoring invalid backend URL {:?}, using {}", raw, defaults.backend_url);
                defaults.backend_url
            }
            None => defaults.backend_url,
        };

        Self {
            backend_url,
            mode: parse_or(lookup("ANALYSIS_MODE"), "ANALYSIS_MODE", defaults.mode),
            poll_interval_ms: parse_or(
                lookup("ANALYSIS_POLL_INTERVAL_MS"),
                "ANALYSIS_POLL_INTERVAL_MS",
                defaults.poll_interval_ms,
            ),
            split_formula: parse_or(
                lookup("ANALYSIS_SPLIT_FORMULA"),
                "ANALYSIS_SPLIT_FORMULA",
                defaults.split_formula,
            ),
        }
    }

    /// Absolute URL of a backend endpoint, e.g. `endpoint("analyze")`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.backend_url, path.trim_start_matches('/'))
    }

    /// Resolves a server-relative image path against the backend URL, keeping
    /// any path prefix the backend is mounted under, like [`Self::endpoint`].
    /// Absolute, `blob:` and `data:` URLs are returned untouched.
    pub fn resolve_url(&self, path: &str) -> String {
        const PASSTHROUGH: [&str; 4] = ["http://", "https://", "blob:", "data:"];
        if PASSTHROUGH.iter().any(|prefix| path.starts_with(prefix)) {
            return path.to_string();
        }
        self.endpoint(path)
    }
}

fn parse_or<T: FromStr>(raw: Option<&str>, key: &str, default: T) -> T {
    match raw.map(str::parse::<T>) {
        Some(Ok(value)) => value,
        Some(Err(_)) => {
            warn!("Ignoring unparseable {} value {:?}", key, raw.unwrap_or_default());
            default
        }
        None => default,
    }
}
