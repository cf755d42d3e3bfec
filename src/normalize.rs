//! Text normalization for captured error messages
//!
//! OCR output arrives with hard line breaks and occasionally broken
//! ligatures (Tesseract renders "fi" as U+FB01 or the Adobe private-use
//! glyph). Normalization collapses breaks to spaces, restores ligatures,
//! and trims. Total and pure; idempotent on already-normalized text.

/// Fixed substitution table for OCR ligature damage
const LIGATURES: &[(&str, &str)] = &[
    ("\u{FB01}", "fi"), // ﬁ
    ("\u{FB02}", "fl"), // ﬂ
    ("\u{F001}", "fi"), // Adobe private-use fi
    ("\u{F002}", "fl"), // Adobe private-use fl
];

/// Normalize captured text for classification
pub fn normalize(text: &str) -> String {
    let mut out = text.replace("\r\n", " ").replace(['\n', '\r'], " ");
    for (broken, fixed) in LIGATURES {
        if out.contains(broken) {
            out = out.replace(broken, fixed);
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_line_breaks() {
        assert_eq!(
            normalize("Traceback:\nKeyError: 'name'\r\n"),
            "Traceback: KeyError: 'name'"
        );
    }

    #[test]
    fn test_restores_ligatures() {
        assert_eq!(normalize("ﬁle not found, cannot ﬁnd it"), "file not found, cannot find it");
        assert_eq!(normalize("\u{F001}le"), "file");
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(normalize("   SyntaxError: invalid syntax  "), "SyntaxError: invalid syntax");
    }

    #[test]
    fn test_idempotent() {
        let once = normalize("ﬁle\nnot found\n");
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("\n\n"), "");
    }
}
