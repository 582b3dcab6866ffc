//! Format identifiers and the input/output compatibility matrix.

use std::fmt;

/// Output format code requested for a conversion. Immutable for the duration
/// of one batch run; every file in the batch shares it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionTarget {
    Markdown,
    Text,
    Pdf,
    Docx,
    Xlsx,
}

impl ConversionTarget {
    /// Every target the service knows about, in menu order.
    pub const ALL: [ConversionTarget; 5] = [
        ConversionTarget::Markdown,
        ConversionTarget::Text,
        ConversionTarget::Pdf,
        ConversionTarget::Docx,
        ConversionTarget::Xlsx,
    ];

    /// Upper-case wire form, as carried in the `export_format` field.
    pub fn code(self) -> &'static str {
        match self {
            ConversionTarget::Markdown => "MARKDOWN",
            ConversionTarget::Text => "TEXT",
            ConversionTarget::Pdf => "PDF",
            ConversionTarget::Docx => "DOCX",
            ConversionTarget::Xlsx => "XLSX",
        }
    }

    /// Parses a case-insensitive format name.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "markdown" => Some(ConversionTarget::Markdown),
            "text" => Some(ConversionTarget::Text),
            "pdf" => Some(ConversionTarget::Pdf),
            "docx" => Some(ConversionTarget::Docx),
            "xlsx" => Some(ConversionTarget::Xlsx),
            _ => None,
        }
    }
}

impl fmt::Display for ConversionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Input extensions the conversion service accepts.
pub const ACCEPTED_EXTENSIONS: [&str; 8] =
    ["pdf", "docx", "doc", "txt", "md", "html", "xlsx", "xls"];

/// Per-file upload limit enforced by the service.
pub const MAX_FILE_BYTES: u64 = 16 * 1024 * 1024;

const FROM_MARKDOWN: &[ConversionTarget] = &[
    ConversionTarget::Markdown,
    ConversionTarget::Text,
    ConversionTarget::Pdf,
    ConversionTarget::Docx,
    ConversionTarget::Xlsx,
];
const TO_TEXTUAL: &[ConversionTarget] = &[ConversionTarget::Markdown, ConversionTarget::Text];

/// Lower-cased extension of `name`, if it has one.
pub fn file_extension(name: &str) -> Option<String> {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// Whether `name` carries one of the accepted input extensions.
pub fn is_accepted_name(name: &str) -> bool {
    file_extension(name)
        .map(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Targets the service can produce for a given input extension. Markdown
/// sources can be rendered to any format; everything else flattens to
/// Markdown or plain text.
pub fn compatible_targets(ext: &str) -> &'static [ConversionTarget] {
    if ext.eq_ignore_ascii_case("md") {
        FROM_MARKDOWN
    } else {
        TO_TEXTUAL
    }
}

/// The target the UI highlights for a given input extension.
pub fn recommended_target(ext: &str) -> Option<ConversionTarget> {
    match ext.to_ascii_lowercase().as_str() {
        "md" => Some(ConversionTarget::Pdf),
        "pdf" | "docx" => Some(ConversionTarget::Markdown),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(ConversionTarget::parse("MARKDOWN"), Some(ConversionTarget::Markdown));
        assert_eq!(ConversionTarget::parse("pdf"), Some(ConversionTarget::Pdf));
        assert_eq!(ConversionTarget::parse(" Docx "), Some(ConversionTarget::Docx));
        assert_eq!(ConversionTarget::parse("odt"), None);
    }

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(file_extension("Report.PDF"), Some("pdf".to_string()));
        assert_eq!(file_extension("archive.tar.gz"), Some("gz".to_string()));
        assert_eq!(file_extension("no_extension"), None);
        assert_eq!(file_extension("trailing."), None);
    }

    #[test]
    fn acceptance_follows_the_extension_list() {
        assert!(is_accepted_name("notes.md"));
        assert!(is_accepted_name("table.XLS"));
        assert!(!is_accepted_name("image.png"));
        assert!(!is_accepted_name("noext"));
    }

    #[test]
    fn markdown_sources_reach_every_target() {
        assert_eq!(compatible_targets("md"), &ConversionTarget::ALL[..]);
        assert_eq!(
            compatible_targets("pdf"),
            &[ConversionTarget::Markdown, ConversionTarget::Text][..]
        );
    }

    #[test]
    fn recommendations_match_the_menu() {
        assert_eq!(recommended_target("md"), Some(ConversionTarget::Pdf));
        assert_eq!(recommended_target("docx"), Some(ConversionTarget::Markdown));
        assert_eq!(recommended_target("txt"), None);
    }
}
