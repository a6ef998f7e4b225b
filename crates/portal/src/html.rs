//! Small helpers over `scraper` element trees.

use scraper::ElementRef;

/// Concatenated, trimmed text content of an element.
pub(crate) fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Trimmed attribute value, `None` when absent.
pub(crate) fn attr(element: &ElementRef<'_>, name: &str) -> Option<String> {
    element.value().attr(name).map(|v| v.trim().to_string())
}
