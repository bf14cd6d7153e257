//! Fingerprint patches applied to every new page before any site script
//! runs. These cover the checks trend sites actually perform: the
//! `navigator.webdriver` flag, the `window.chrome` object, language lists,
//! and a plausible plugin array.

/// Installed via `Page.addScriptToEvaluateOnNewDocument` so it executes
/// before the site's own detection code.
pub const INIT_SCRIPT: &str = r#"
Object.defineProperty(navigator, 'webdriver', {
    get: () => false,
});

window.chrome = window.chrome || { runtime: {} };

Object.defineProperty(navigator, 'languages', {
    get: () => ['en-US', 'en'],
});

Object.defineProperty(navigator, 'plugins', {
    get: () => [
        { name: 'Chrome PDF Plugin', filename: 'internal-pdf-viewer' },
        { name: 'Chrome PDF Viewer', filename: 'mhjfbmdgcfjbbpaeojofohoefgiehjai' },
    ],
});
"#;

/// Fixed desktop user agent, overriding the headless default which leaks
/// "HeadlessChrome" in the UA string.
pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_agent_does_not_leak_headless() {
        assert!(!USER_AGENT.contains("Headless"));
    }

    #[test]
    fn init_script_masks_webdriver() {
        assert!(INIT_SCRIPT.contains("webdriver"));
        assert!(INIT_SCRIPT.contains("window.chrome"));
    }
}
