use crate::util::TimePolicy;
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;

const DEFAULT_SUPABASE_URL: &str = "http://localhost:54321";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Runtime settings injected by the host page as `window.ENV`.
///
/// Keys are read in README style (`SUPABASE_URL`) first, then lowercase.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EnvConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub log_level: String,
    /// Display/input offset for timestamps. `None` uses the browser's offset.
    pub utc_offset_minutes: Option<i32>,
}

impl EnvConfig {
    pub fn new() -> Self {
        let Some(env) = web_sys::window()
            .and_then(|w| w.get("ENV"))
            .map(JsValue::from)
            .filter(|env| !env.is_undefined() && env.is_object())
        else {
            return Self::default();
        };

        let mut config = Self::default();
        if let Some(url) = read_string(&env, &["SUPABASE_URL", "supabase_url"]) {
            config.supabase_url = url;
        }
        if let Some(key) = read_string(&env, &["SUPABASE_ANON_KEY", "supabase_anon_key"]) {
            config.supabase_anon_key = key;
        }
        if let Some(level) = read_string(&env, &["LOG_LEVEL", "log_level"]) {
            config.log_level = level;
        }
        config.utc_offset_minutes = read_string(&env, &["UTC_OFFSET_MINUTES", "utc_offset_minutes"])
            .and_then(|raw| parse_offset(&raw));
        config
    }

    /// Config pointing at `url` with `anon_key`, everything else default.
    pub fn for_project(url: &str, anon_key: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            supabase_anon_key: anon_key.to_string(),
            ..Self::default()
        }
    }

    pub fn time_policy(&self) -> TimePolicy {
        match self.utc_offset_minutes {
            Some(m) => TimePolicy::new(m),
            None => TimePolicy::browser(),
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            supabase_url: DEFAULT_SUPABASE_URL.to_string(),
            supabase_anon_key: String::new(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            utc_offset_minutes: None,
        }
    }
}

/// First key present as a string or number.
fn read_string(env: &JsValue, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        let v = js_sys::Reflect::get(env, &JsValue::from_str(key)).ok()?;
        v.as_string()
            .or_else(|| v.as_f64().map(|n| n.to_string()))
            .filter(|s| !s.trim().is_empty())
    })
}

fn parse_offset(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    raw.parse::<i32>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().map(|f| f.round() as i32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = EnvConfig::default();
        assert_eq!(c.supabase_url, "http://localhost:54321");
        assert_eq!(c.log_level, "info");
        assert!(c.supabase_anon_key.is_empty());
        assert!(c.utc_offset_minutes.is_none());
    }

    #[test]
    fn test_for_project() {
        let c = EnvConfig::for_project("https://x.supabase.co", "k");
        assert_eq!(c.supabase_url, "https://x.supabase.co");
        assert_eq!(c.supabase_anon_key, "k");
        assert_eq!(c.log_level, "info");
    }

    #[test]
    fn test_explicit_offset_policy() {
        let c = EnvConfig {
            utc_offset_minutes: Some(-180),
            ..EnvConfig::default()
        };
        assert_eq!(c.time_policy().offset_minutes(), -180);
    }

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset("-180"), Some(-180));
        assert_eq!(parse_offset(" 330 "), Some(330));
        assert_eq!(parse_offset("-180.0"), Some(-180));
        assert_eq!(parse_offset("brt"), None);
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn reads_window_env() {
        let env = js_sys::Object::new();
        let _ = js_sys::Reflect::set(&env, &"SUPABASE_URL".into(), &"https://p.supabase.co".into());
        let _ = js_sys::Reflect::set(&env, &"supabase_anon_key".into(), &"anon".into());
        let _ = js_sys::Reflect::set(&env, &"UTC_OFFSET_MINUTES".into(), &JsValue::from_f64(-180.0));
        let window = web_sys::window().unwrap();
        let _ = js_sys::Reflect::set(&window, &"ENV".into(), &env);

        let c = EnvConfig::new();
        assert_eq!(c.supabase_url, "https://p.supabase.co");
        assert_eq!(c.supabase_anon_key, "anon");
        assert_eq!(c.utc_offset_minutes, Some(-180));
        assert_eq!(c.log_level, "info");
    }
}
