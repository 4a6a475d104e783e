use std::sync::OnceLock;

static QUIET: OnceLock<bool> = OnceLock::new();

/// `DRAGEVENTS_QUIET=1` suppresses spinners and decorative headers
pub fn is_quiet() -> bool {
    *QUIET.get_or_init(|| {
        std::env::var("DRAGEVENTS_QUIET")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    })
}
