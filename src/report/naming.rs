//! File and sheet naming for rendered reports

use crate::hierarchy::Level;

/// Longest sheet title spreadsheet tools accept
pub const MAX_SHEET_TITLE: usize = 31;

/// File stem of the master report
pub const MASTER_FILE_STEM: &str = "_MANAGEMENT_SUMMARY";

/// Replace characters that are not allowed in file names
pub fn sanitize_component(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' => '-',
            other => other,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// `LEVEL_ID_Name` stem of a per-manager report
pub fn report_file_stem(level: Level, id: &str, name: &str) -> String {
    format!("{}_{}_{}", level.code(), id, sanitize_component(name))
}

/// Sheet title cut to `MAX_SHEET_TITLE` characters
pub fn sheet_title(title: &str) -> String {
    title.chars().take(MAX_SHEET_TITLE).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_component() {
        assert_eq!(sanitize_component(" A/B\\C:D*E?F "), "A-B-C-D-E-F");
        assert_eq!(sanitize_component("Plain Name"), "Plain Name");
    }

    #[test]
    fn test_report_file_stem() {
        assert_eq!(
            report_file_stem(Level::AreaManager, "A1", "Alex: Area"),
            "AM_A1_Alex- Area"
        );
        assert_eq!(report_file_stem(Level::Director, "D1", "Dana"), "DIRECTOR_D1_Dana");
    }

    #[test]
    fn test_sheet_title_truncation() {
        assert_eq!(sheet_title("Rep Summary"), "Rep Summary");
        let long = "A very long sheet title that keeps going";
        assert_eq!(sheet_title(long).chars().count(), MAX_SHEET_TITLE);
        assert!(long.starts_with(&sheet_title(long)));
    }
}
