/// External-reference declarations — the `[ext_resource ...]` lines of a document.

use crate::core::document::SectionTag;

/// One external-reference declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtResource {
    /// Line index within the document.
    pub line: usize,
    /// Declared resource type (`Script`, `Resource`, ...).
    pub resource_type: String,
    /// Target path, usually `res://...`.
    pub path: String,
    /// Stable identifier of the target, if the declaration carries one.
    pub uid: Option<String>,
    /// Local identifier used by `ExtResource("<id>")` expressions.
    pub id: String,
}

impl ExtResource {
    /// Parse an `[ext_resource ...]` line. Returns `None` for any other line
    /// or when the declaration lacks a `path` or `id`.
    pub fn parse(line: usize, text: &str) -> Option<ExtResource> {
        let tag = SectionTag::parse(text)?;
        if tag.name != "ext_resource" {
            return None;
        }
        Some(ExtResource {
            line,
            resource_type: tag.attr("type").unwrap_or_default().to_string(),
            path: tag.attr("path")?.to_string(),
            uid: tag
                .attr("uid")
                .filter(|uid| !uid.is_empty())
                .map(str::to_string),
            id: tag.attr("id")?.to_string(),
        })
    }

    /// Render a declaration line in the host's attribute order.
    pub fn render(resource_type: &str, uid: Option<&str>, path: &str, id: &str) -> String {
        match uid.filter(|u| !u.is_empty()) {
            Some(uid) => format!(
                "[ext_resource type=\"{}\" uid=\"{}\" path=\"{}\" id=\"{}\"]",
                resource_type, uid, path, id
            ),
            None => format!(
                "[ext_resource type=\"{}\" path=\"{}\" id=\"{}\"]",
                resource_type, path, id
            ),
        }
    }

    /// Numeric prefix of the local id (`"3_ab12c"` → 3), if any.
    pub fn numeric_prefix(id: &str) -> Option<u32> {
        id.split('_').next()?.parse().ok()
    }
}
