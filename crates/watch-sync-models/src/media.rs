use std::fmt;

/// Media type as recorded in a progress record's metadata.
///
/// The raw type string is interpreted exactly once, when a record enters the
/// pipeline; everything downstream branches on this enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaKind {
    Movie,
    Show,
    Unknown(String),
}

impl MediaKind {
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            Some("movie") => MediaKind::Movie,
            Some("show") => MediaKind::Show,
            other => MediaKind::Unknown(other.unwrap_or_default().to_string()),
        }
    }

    /// Label used in report entries and log lines.
    pub fn label(&self) -> &str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Show => "show",
            MediaKind::Unknown(raw) if raw.is_empty() => "unknown",
            MediaKind::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_known_types() {
        assert_eq!(MediaKind::from_raw(Some("movie")), MediaKind::Movie);
        assert_eq!(MediaKind::from_raw(Some("show")), MediaKind::Show);
    }

    #[test]
    fn test_from_raw_unknown_preserves_value() {
        assert_eq!(
            MediaKind::from_raw(Some("short")),
            MediaKind::Unknown("short".to_string())
        );
    }

    #[test]
    fn test_from_raw_absent() {
        assert_eq!(MediaKind::from_raw(None), MediaKind::Unknown(String::new()));
        assert_eq!(MediaKind::from_raw(None).label(), "unknown");
    }
}
