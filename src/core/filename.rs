use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

static FORBIDDEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"[\\/:*?<>|]"#).unwrap());

/// Substitute filesystem-unsafe characters so the value can be used as a
/// filename stem on every platform. Idempotent.
pub fn sanitize_path_component(name: &str) -> String {
    let name: String = name.nfc().collect();
    let name = name.trim();
    FORBIDDEN_RE.replace_all(name, "-").trim().to_string()
}
