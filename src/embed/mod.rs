//! Embedded static resources.
//!
//! - `serve` - dev server client script and status page
//! - `bundle` - module registry runtime prepended to the main chunk

mod template;

pub use template::{Template, TemplateVars};

pub mod serve {
    use super::{Template, TemplateVars};

    /// URL path the hot reload client is served from.
    pub const HOTRELOAD_PATH: &str = "/__pagepack/hotreload.js";

    /// Variables for hotreload.js.
    pub struct HotreloadVars {
        pub ws_port: u16,
    }

    impl TemplateVars for HotreloadVars {
        fn apply(&self, content: &str) -> String {
            content.replace("__PAGEPACK_WS_PORT__", &self.ws_port.to_string())
        }
    }

    /// Hot reload client with WebSocket port injection.
    pub const HOTRELOAD_JS: Template<HotreloadVars> =
        Template::new(include_str!("serve/hotreload.js"));

    /// Variables for status.html.
    pub struct StatusVars {
        pub title: &'static str,
        /// Already HTML-escaped.
        pub detail: String,
        /// Seconds between automatic refreshes; 0 disables refreshing.
        pub refresh: u32,
    }

    impl TemplateVars for StatusVars {
        fn apply(&self, content: &str) -> String {
            let refresh = if self.refresh > 0 {
                format!("<meta http-equiv=\"refresh\" content=\"{}\">", self.refresh)
            } else {
                String::new()
            };
            content
                .replace("__REFRESH__", &refresh)
                .replace("__TITLE__", self.title)
                .replace("__DETAIL__", &self.detail)
        }
    }

    /// Page shown before the first successful build.
    pub const STATUS_HTML: Template<StatusVars> =
        Template::new(include_str!("serve/status.html"));
}

pub mod bundle {
    use super::{Template, TemplateVars};

    /// Variables for runtime.js.
    pub struct RuntimeVars {
        /// `{ id: function (module, exports, __require) {...}, ... }`
        pub modules: String,
        /// `{ chunkId: "file.js", ... }`
        pub chunks: String,
        pub entry: usize,
    }

    impl TemplateVars for RuntimeVars {
        fn apply(&self, content: &str) -> String {
            // Modules last: their source may contain the other placeholders.
            content
                .replace("__PAGEPACK_CHUNKS__", &self.chunks)
                .replace("__PAGEPACK_ENTRY__", &self.entry.to_string())
                .replace("__PAGEPACK_MODULES__", &self.modules)
        }
    }

    /// Module registry runtime for the main chunk.
    pub const RUNTIME_JS: Template<RuntimeVars> =
        Template::new(include_str!("bundle/runtime.js"));

    /// Global queue async chunks push themselves onto.
    pub const CHUNK_QUEUE: &str = "self.__pagepack_chunks";
}

#[cfg(test)]
mod tests {
    use super::bundle::{RUNTIME_JS, RuntimeVars};
    use super::serve::{HOTRELOAD_JS, HotreloadVars, STATUS_HTML, StatusVars};

    #[test]
    fn test_hotreload_port() {
        let js = HOTRELOAD_JS.render(&HotreloadVars { ws_port: 40000 });
        assert!(js.contains("40000"));
        assert!(!js.contains("__PAGEPACK_WS_PORT__"));
    }

    #[test]
    fn test_status_page() {
        let html = STATUS_HTML.render(&StatusVars {
            title: "Building",
            detail: "first build in progress".to_string(),
            refresh: 1,
        });
        assert!(html.contains("Building"));
        assert!(html.contains("http-equiv=\"refresh\""));
    }

    #[test]
    fn test_runtime_placeholders() {
        let js = RUNTIME_JS.render(&RuntimeVars {
            modules: "{0: function (module, exports, __require) { var s = \"__PAGEPACK_ENTRY__\"; }}"
                .to_string(),
            chunks: "{}".to_string(),
            entry: 0,
        });
        assert!(!js.contains("__PAGEPACK_MODULES__"));
        assert!(!js.contains("__PAGEPACK_CHUNKS__"));
        assert!(js.contains("\"__PAGEPACK_ENTRY__\""));
    }
}
