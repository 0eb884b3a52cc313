//! Google Analytics (gtag.js) bootstrap.
//!
//! Deciding whether and how to load the analytics script is kept apart
//! from emitting it: [`plan`] is pure, and [`AnalyticsBootstrap`] can be
//! rendered as HTML or inspected in tests.

use chrono::{DateTime, SecondsFormat, Utc};
use url::Url;

/// Base address of the gtag.js loader.
pub const GTAG_SCRIPT_URL: &str = "https://www.googletagmanager.com/gtag/js";

/// Hostname on which no analytics events are emitted.
pub const LOCAL_HOSTNAME: &str = "localhost";

/// Inputs to the bootstrap decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsConfig {
    /// Measurement id, e.g. `G-XXXXXXX`. Absent or empty disables analytics.
    pub analytics_id: Option<String>,
    /// Host the page is served from.
    pub hostname: String,
}

/// A gtag call issued once the script has loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GtagCommand {
    /// `gtag('js', <timestamp>)`
    Js(DateTime<Utc>),
    /// `gtag('config', <id>)`
    Config(String),
}

impl GtagCommand {
    /// Renders the call as a line of JavaScript.
    pub fn to_js(&self) -> String {
        match self {
            GtagCommand::Js(at) => format!(
                "gtag('js', new Date({}));",
                js_string(&at.to_rfc3339_opts(SecondsFormat::Millis, true))
            ),
            GtagCommand::Config(id) => format!("gtag('config', {});", js_string(id)),
        }
    }
}

/// What the page should do to load analytics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsBootstrap {
    analytics_id: String,
    script_src: Url,
    tracking_enabled: bool,
}

/// Decides whether the analytics script is injected at all.
///
/// Returns `None` when no usable id is configured. The id is trimmed, so a
/// whitespace-only id counts as absent rather than producing a loader URL
/// for a measurement id that cannot exist.
pub fn plan(config: &AnalyticsConfig) -> Option<AnalyticsBootstrap> {
    let id = config.analytics_id.as_deref()?.trim();
    if id.is_empty() {
        return None;
    }

    let script_src = Url::parse_with_params(GTAG_SCRIPT_URL, &[("id", id)]).ok()?;

    Some(AnalyticsBootstrap {
        analytics_id: id.to_string(),
        script_src,
        tracking_enabled: config.hostname != LOCAL_HOSTNAME,
    })
}

impl AnalyticsBootstrap {
    pub fn analytics_id(&self) -> &str {
        &self.analytics_id
    }

    /// Address of the script element to append.
    pub fn script_src(&self) -> &Url {
        &self.script_src
    }

    /// False on `localhost`: the script loads but nothing is sent.
    pub fn tracking_enabled(&self) -> bool {
        self.tracking_enabled
    }

    /// Commands to run from the script's load callback.
    pub fn on_load(&self, now: DateTime<Utc>) -> Vec<GtagCommand> {
        if !self.tracking_enabled {
            return Vec::new();
        }

        vec![
            GtagCommand::Js(now),
            GtagCommand::Config(self.analytics_id.clone()),
        ]
    }

    /// HTML to place at the end of `<body>`.
    ///
    /// The init script runs when the loader fires `load`; there is no
    /// error handler, a failed load simply sends nothing.
    pub fn render_snippet(&self) -> String {
        let mut html = String::from("<script>\n");
        html.push_str("  (function () {\n");
        html.push_str("    var script = document.createElement('script');\n");

        if self.tracking_enabled {
            html.push_str("    script.addEventListener('load', function () {\n");
            html.push_str(&format!(
                "      if (window.location.hostname === {}) return;\n",
                js_string(LOCAL_HOSTNAME)
            ));
            html.push_str("      window.dataLayer = window.dataLayer || [];\n");
            html.push_str("      function gtag() { dataLayer.push(arguments); }\n");
            html.push_str("      gtag('js', new Date());\n");
            html.push_str(&format!(
                "      {}\n",
                GtagCommand::Config(self.analytics_id.clone()).to_js()
            ));
            html.push_str("    });\n");
        }

        html.push_str(&format!(
            "    script.src = {};\n",
            js_string(self.script_src.as_str())
        ));
        html.push_str("    document.body.appendChild(script);\n");
        html.push_str("  })();\n");
        html.push_str("</script>\n");
        html
    }
}

/// Quotes `value` as a JavaScript string literal safe inside `<script>`.
fn js_string(value: &str) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "\"\"".to_string())
        .replace('<', "\\u003c")
}
