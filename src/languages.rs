//! Fixed language hint passed to both the document extractor and OCR.

/// Tesseract language codes, in the order the engines receive them.
pub const LANGUAGES: &[&str] = &[
    "eng", "spa", "fra", "deu", "ita", "por", "rus", "pol", "nld", "swe", "ell", "ces", "dan",
    "nor", "fin", "hun", "bul",
];

/// The hint string in tesseract's `lang1+lang2+...` form.
pub fn language_hint() -> String {
    LANGUAGES.join("+")
}
