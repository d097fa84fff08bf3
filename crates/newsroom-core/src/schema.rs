//! Canonical column names for the video metadata sheet.
//!
//! Incoming headers are normalized once at load time: the configured prefix
//! is stripped and the remainder is matched case-insensitively against the
//! canonical names, so historical header drift (`FORMAT` vs `format`) never
//! reaches the pipelines.

/// Publication date, parsed from `%d-%b-%Y` strings into a Date column.
pub const DATE: &str = "TANGGAL";
/// Video title.
pub const TITLE: &str = "JUDUL";
/// Editorial theme.
pub const THEME: &str = "TEMA";
/// Quoted source name, or the `none` sentinel.
pub const ATTRIBUTION: &str = "ATRIBUSI";
/// Video format category. Optional in the source sheet.
pub const FORMAT: &str = "FORMAT";

/// ISO week label derived from [`DATE`], e.g. `2024-W02`.
pub const WEEK: &str = "MINGGU";
/// Display-formatted date string (`%d %b %Y`) added for the presentation layer.
pub const DISPLAY_DATE: &str = "TANGGAL_TAMPIL";
/// Sentiment label column added per record.
pub const SENTIMENT: &str = "SENTIMEN";
/// Count column produced by every aggregation pipeline.
pub const COUNT: &str = "jumlah";
/// Token column of the word-frequency pipeline.
pub const TOKEN: &str = "kata";

/// Attribution value recorded when a video quotes no source.
pub const ATTRIBUTION_NONE: &str = "none";

/// Columns that must be present after header normalization.
pub const REQUIRED_COLUMNS: [&str; 4] = [DATE, TITLE, THEME, ATTRIBUTION];

/// Columns recognized during header normalization.
pub const CANONICAL_COLUMNS: [&str; 5] = [DATE, TITLE, THEME, ATTRIBUTION, FORMAT];

/// Maps a raw header onto its canonical column name, if it is one we know.
pub fn canonical_column(header: &str) -> Option<&'static str> {
    CANONICAL_COLUMNS
        .iter()
        .copied()
        .find(|canonical| header.eq_ignore_ascii_case(canonical))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_column_is_case_insensitive() {
        assert_eq!(canonical_column("format"), Some(FORMAT));
        assert_eq!(canonical_column("Format"), Some(FORMAT));
        assert_eq!(canonical_column("TANGGAL"), Some(DATE));
        assert_eq!(canonical_column("judul"), Some(TITLE));
        assert_eq!(canonical_column("DURASI"), None);
    }
}
