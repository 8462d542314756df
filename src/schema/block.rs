/// Which kind of section a block is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    /// An inline object; carries the `id` attribute of its marker, if any.
    Embedded { sub_id: Option<String> },
    /// The document's top-level object.
    Root,
}

/// A contiguous line range `[start, end)` holding one object.
///
/// `start` is the marker line (or the first body line for a marker-less root).
/// `last_line` is the last non-blank line inside the range; new fields go
/// directly after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub start: usize,
    pub end: usize,
    pub last_line: usize,
    pub category: Option<String>,
    pub name: Option<String>,
    pub has_target_field: bool,
}

impl Block {
    pub fn new(kind: BlockKind, start: usize) -> Self {
        Self {
            kind,
            start,
            end: start + 1,
            last_line: start,
            category: None,
            name: None,
            has_target_field: false,
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self.kind, BlockKind::Root)
    }

    /// Line index a new field assignment is inserted at.
    pub fn insertion_index(&self) -> usize {
        self.last_line + 1
    }

    /// Label used in reports: the name field, else the sub-resource id.
    pub fn label(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        match &self.kind {
            BlockKind::Embedded { sub_id: Some(id) } => format!("<{}>", id),
            BlockKind::Embedded { sub_id: None } => format!("<block@{}>", self.start),
            BlockKind::Root => "<root>".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_prefers_name() {
        let mut block = Block::new(
            BlockKind::Embedded {
                sub_id: Some("Resource_k3m2p".to_string()),
            },
            4,
        );
        assert_eq!(block.label(), "<Resource_k3m2p>");
        block.name = Some("Grant Fire D6".to_string());
        assert_eq!(block.label(), "Grant Fire D6");
    }
}
