//! URL-safe slugs derived from dashboard titles.
//!
//! A slug is never stored as authoritative data: it is recomputed from the
//! title every time the title changes, and dashboard URIs are `db/{slug}`.

/// Generate a URL-safe slug from a title.
///
/// Non-ASCII letters are transliterated first, so accented, Cyrillic and CJK
/// titles keep meaningful, distinct slugs. The result is lowercased, every
/// other non-alphanumeric run becomes a single `-`, and `-` is trimmed from
/// both ends.
///
/// # Examples
///
/// ```
/// use kiosk_core::slug::generate_slug;
///
/// assert_eq!(generate_slug("Grafana Demo!"), "grafana-demo");
/// assert_eq!(generate_slug("CPU / Memory (prod)"), "cpu-memory-prod");
/// assert_eq!(generate_slug("Café Ops"), "cafe-ops");
/// ```
pub fn generate_slug(title: &str) -> String {
    ::slug::slugify(title)
}

/// The playback URI of a stored dashboard with the given slug.
pub fn dashboard_uri(slug: &str) -> String {
    format!("db/{slug}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_basic_title() {
        assert_eq!(generate_slug("Getting Started"), "getting-started");
    }

    #[test]
    fn slug_strips_trailing_punctuation() {
        assert_eq!(generate_slug("Grafana Demo!"), "grafana-demo");
    }

    #[test]
    fn slug_collapses_separator_runs() {
        assert_eq!(generate_slug("foo -- / bar"), "foo-bar");
    }

    #[test]
    fn slug_trims_leading_separators() {
        assert_eq!(generate_slug("  --hello"), "hello");
    }

    #[test]
    fn slug_of_empty_title_is_empty() {
        assert_eq!(generate_slug(""), "");
        assert_eq!(generate_slug("!!!"), "");
    }

    #[test]
    fn slug_keeps_digits() {
        assert_eq!(generate_slug("Node 42 Overview"), "node-42-overview");
    }

    #[test]
    fn slug_transliterates_accents() {
        assert_eq!(generate_slug("Café Ops"), "cafe-ops");
        assert_eq!(generate_slug("Übersicht Länder"), "ubersicht-lander");
    }

    #[test]
    fn slug_transliterates_cyrillic() {
        assert_eq!(generate_slug("Склад"), "sklad");
        assert_ne!(generate_slug("Дашборд продаж"), "");
        assert_ne!(generate_slug("Продажи"), generate_slug("Склад"));
    }

    #[test]
    fn slug_of_cjk_title_is_ascii_and_distinct() {
        let japanese = generate_slug("日本語");
        let chinese = generate_slug("中文");

        assert!(!japanese.is_empty());
        assert!(japanese.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'));
        assert_ne!(japanese, chinese);
    }

    #[test]
    fn uri_prefixes_db() {
        assert_eq!(dashboard_uri("grafana-demo"), "db/grafana-demo");
    }
}
