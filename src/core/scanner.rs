/// Block scanner — single forward pass classifying every line of a document.
///
/// The format has no nesting beyond flat section markers, so the scanner is a
/// small state machine: header → declarations → embedded blocks → root.

use crate::core::document::{parse_field, unquote, SectionTag};
use crate::schema::{Block, BlockKind, ExtResource};

/// Classification of one scanned line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Header,
    ExternalRefDecl,
    BlockStart,
    BlockField,
    /// Emitted when a block closes; `line_index` is the block's exclusive end.
    BlockEnd,
    RootMarker,
    /// Blank lines, continuation lines of multi-line values, unknown sections.
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannedLine {
    pub line_index: usize,
    pub kind: LineKind,
}

/// Field names the scanner watches inside each block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNames {
    pub target: String,
    pub category: String,
    pub name: String,
}

/// Everything a scan learns about a document.
#[derive(Debug, Clone, Default)]
pub struct Scan {
    pub lines: Vec<ScannedLine>,
    pub header: Option<usize>,
    pub declarations: Vec<ExtResource>,
    pub blocks: Vec<Block>,
    pub root: Option<Block>,
}

impl Scan {
    /// Blocks that may receive a reference: the embedded blocks, or the root
    /// section when the document has none.
    pub fn anchors(&self) -> Vec<&Block> {
        if self.is_flat() {
            self.root.iter().collect()
        } else {
            self.blocks.iter().collect()
        }
    }

    pub fn is_flat(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Declaration for `path`, if the document already references it.
    pub fn declaration_for(&self, path: &str) -> Option<&ExtResource> {
        self.declarations.iter().find(|d| d.path == path)
    }

    /// Line index new declarations are inserted at, and whether a blank
    /// separator line must precede them (no declarations exist yet).
    pub fn declaration_insertion(&self) -> (usize, bool) {
        match self.declarations.last() {
            Some(last) => (last.line + 1, false),
            None => (self.header.map_or(0, |h| h + 1), true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum State {
    Header,
    Declarations,
    Blocks,
    Root,
}

pub struct BlockScanner<'a> {
    fields: &'a FieldNames,
}

impl<'a> BlockScanner<'a> {
    pub fn new(fields: &'a FieldNames) -> Self {
        Self { fields }
    }

    pub fn scan(&self, lines: &[String]) -> Scan {
        let mut scan = Scan::default();
        let mut state = State::Header;
        let mut open: Option<Block> = None;

        for (index, line) in lines.iter().enumerate() {
            let trimmed = line.trim();

            if trimmed.starts_with('[') {
                if let Some(tag) = SectionTag::parse(trimmed) {
                    match tag.name.as_str() {
                        "gd_resource" | "gd_scene" if state == State::Header => {
                            scan.header = Some(index);
                            scan.lines.push(classified(index, LineKind::Header));
                            state = State::Declarations;
                            continue;
                        }
                        "ext_resource" if state <= State::Declarations => {
                            if let Some(ext) = ExtResource::parse(index, trimmed) {
                                scan.declarations.push(ext);
                                scan.lines.push(classified(index, LineKind::ExternalRefDecl));
                                state = State::Declarations;
                                continue;
                            }
                        }
                        "sub_resource" if state < State::Root => {
                            self.close(&mut scan, open.take(), index);
                            open = Some(Block::new(
                                BlockKind::Embedded {
                                    sub_id: tag.attr("id").map(str::to_string),
                                },
                                index,
                            ));
                            scan.lines.push(classified(index, LineKind::BlockStart));
                            state = State::Blocks;
                            continue;
                        }
                        "resource" if state < State::Root => {
                            self.close(&mut scan, open.take(), index);
                            open = Some(Block::new(BlockKind::Root, index));
                            scan.lines.push(classified(index, LineKind::RootMarker));
                            state = State::Root;
                            continue;
                        }
                        // `[node]`, `[connection]` and other sections end the
                        // open block and are never anchors.
                        name if is_section_name(name) => {
                            self.close(&mut scan, open.take(), index);
                            scan.lines.push(classified(index, LineKind::Other));
                            state = state.max(State::Blocks);
                            continue;
                        }
                        _ => {}
                    }
                }
            }

            // Marker-less body: the first field after the declarations opens
            // an implicit root section.
            if open.is_none() && state <= State::Declarations && parse_field(trimmed).is_some() {
                open = Some(Block::new(BlockKind::Root, index));
                state = State::Root;
            }

            match open.as_mut() {
                Some(block) if !trimmed.is_empty() => {
                    block.last_line = index;
                    if let Some((key, value)) = parse_field(trimmed) {
                        self.observe_field(block, key, value);
                        scan.lines.push(classified(index, LineKind::BlockField));
                    } else {
                        scan.lines.push(classified(index, LineKind::Other));
                    }
                }
                _ => scan.lines.push(classified(index, LineKind::Other)),
            }
        }

        self.close(&mut scan, open, lines.len());
        scan
    }

    fn observe_field(&self, block: &mut Block, key: &str, value: &str) {
        if key == self.fields.target {
            block.has_target_field = true;
        } else if key == self.fields.category {
            block.category = Some(unquote(value));
        } else if key == self.fields.name {
            block.name = Some(unquote(value));
        }
    }

    fn close(&self, scan: &mut Scan, block: Option<Block>, end: usize) {
        let Some(mut block) = block else {
            return;
        };
        block.end = end;
        scan.lines.push(classified(end, LineKind::BlockEnd));
        if block.is_root() {
            scan.root = Some(block);
        } else {
            scan.blocks.push(block);
        }
    }
}

/// Marker names are bare identifiers; `[1, 2]` or `[ExtResource("a")]` on a
/// continuation line is a value, not a section.
fn is_section_name(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn classified(line_index: usize, kind: LineKind) -> ScannedLine {
    ScannedLine { line_index, kind }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> FieldNames {
        FieldNames {
            target: "granted_dice".to_string(),
            category: "category".to_string(),
            name: "affix_name".to_string(),
        }
    }

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    const TREE: &str = r#"[gd_resource type="Resource" script_class="SkillTree" load_steps=4 format=3 uid="uid://tree"]

[ext_resource type="Script" path="res://scripts/dice/die_resource.gd" id="1_dscr"]
[ext_resource type="Script" path="res://scripts/affix.gd" id="2_affx"]

[sub_resource type="Resource" id="Resource_a"]
affix_name = "Grant Fire D6"
script = ExtResource("2_affx")
category = 3

[sub_resource type="Resource" id="Resource_b"]
script = ExtResource("2_affx")
category = 3
granted_dice = Array[ExtResource("1_dscr")]([ExtResource("3_old")])
affix_name = "Holy D8"

[resource]
script = ExtResource("2_affx")
tree_name = "Pyromancer"
"#;

    #[test]
    fn classifies_sections() {
        let f = fields();
        let scan = BlockScanner::new(&f).scan(&lines(TREE));

        assert_eq!(scan.header, Some(0));
        assert_eq!(scan.declarations.len(), 2);
        assert_eq!(scan.declarations[1].id, "2_affx");
        assert_eq!(scan.blocks.len(), 2);
        assert!(scan.root.is_some());
        assert!(!scan.is_flat());

        let kinds: Vec<LineKind> = scan.lines.iter().map(|l| l.kind).collect();
        assert_eq!(kinds[0], LineKind::Header);
        assert_eq!(kinds[2], LineKind::ExternalRefDecl);
        assert!(scan
            .lines
            .contains(&ScannedLine { line_index: 5, kind: LineKind::BlockStart }));
        assert!(scan
            .lines
            .contains(&ScannedLine { line_index: 16, kind: LineKind::RootMarker }));
        assert!(scan
            .lines
            .contains(&ScannedLine { line_index: 10, kind: LineKind::BlockEnd }));
    }

    #[test]
    fn tracks_fields_in_any_order() {
        let f = fields();
        let scan = BlockScanner::new(&f).scan(&lines(TREE));

        let first = &scan.blocks[0];
        assert_eq!(first.name.as_deref(), Some("Grant Fire D6"));
        assert_eq!(first.category.as_deref(), Some("3"));
        assert!(!first.has_target_field);
        assert_eq!((first.start, first.last_line, first.end), (5, 8, 10));
        assert_eq!(first.insertion_index(), 9);

        let second = &scan.blocks[1];
        assert_eq!(second.name.as_deref(), Some("Holy D8"));
        assert!(second.has_target_field);
        assert_eq!(second.kind, BlockKind::Embedded { sub_id: Some("Resource_b".to_string()) });
    }

    #[test]
    fn anchors_are_embedded_blocks_when_present() {
        let f = fields();
        let scan = BlockScanner::new(&f).scan(&lines(TREE));
        let anchors = scan.anchors();
        assert_eq!(anchors.len(), 2);
        assert!(anchors.iter().all(|b| !b.is_root()));
    }

    #[test]
    fn flat_document_anchors_on_root() {
        let text = r#"[gd_resource type="Resource" script_class="AffixData" load_steps=2 format=3]

[ext_resource type="Script" path="res://scripts/affix.gd" id="1_affx"]

[resource]
script = ExtResource("1_affx")
affix_name = "Neutral D10 Bonus"
category = 3
"#;
        let f = fields();
        let scan = BlockScanner::new(&f).scan(&lines(text));
        assert!(scan.is_flat());
        let anchors = scan.anchors();
        assert_eq!(anchors.len(), 1);
        assert!(anchors[0].is_root());
        assert_eq!(anchors[0].name.as_deref(), Some("Neutral D10 Bonus"));
        assert_eq!(anchors[0].insertion_index(), 8);
        assert_eq!(anchors[0].end, 8);
    }

    #[test]
    fn markerless_body_is_implicit_root() {
        let text = "[gd_resource type=\"Resource\" format=3]\n\naffix_name = \"D4\"\n";
        let f = fields();
        let scan = BlockScanner::new(&f).scan(&lines(text));
        let root = scan.root.as_ref().unwrap();
        assert_eq!(root.start, 2);
        assert_eq!(root.name.as_deref(), Some("D4"));
    }

    #[test]
    fn multiline_values_extend_block() {
        let text = r#"[gd_resource type="Resource" format=3]

[resource]
affix_name = "Fire D6"
tags = {
"hot": true
}

"#;
        let f = fields();
        let scan = BlockScanner::new(&f).scan(&lines(text));
        let root = scan.root.as_ref().unwrap();
        assert_eq!(root.last_line, 6);
        assert_eq!(root.insertion_index(), 7);
    }

    #[test]
    fn unknown_sections_close_the_open_block() {
        let text = r#"[gd_scene load_steps=3 format=3]

[ext_resource type="Script" path="res://scripts/affix.gd" id="1_affx"]

[sub_resource type="Resource" id="Resource_a"]
affix_name = "Fire D6"
category = 3

[node name="Root" type="Node"]
affix_name = "Shadow D20"
category = 1
values = [1, 2]

[connection signal="ready" from="." to="." method="_on_ready"]
"#;
        let f = fields();
        let scan = BlockScanner::new(&f).scan(&lines(text));

        assert_eq!(scan.blocks.len(), 1);
        let block = &scan.blocks[0];
        assert_eq!(block.name.as_deref(), Some("Fire D6"));
        assert_eq!(block.category.as_deref(), Some("3"));
        assert_eq!((block.last_line, block.end), (6, 8));
        assert!(scan.root.is_none());
        assert_eq!(scan.anchors().len(), 1);
    }

    #[test]
    fn value_brackets_are_not_sections() {
        assert!(is_section_name("node"));
        assert!(is_section_name("sub_resource"));
        assert!(!is_section_name("1,"));
        assert!(!is_section_name("ExtResource(\"a\")"));
    }

    #[test]
    fn declaration_insertion_points() {
        let f = fields();
        let scan = BlockScanner::new(&f).scan(&lines(TREE));
        assert_eq!(scan.declaration_insertion(), (4, false));
        assert_eq!(
            scan.declaration_for("res://scripts/affix.gd").map(|d| d.id.as_str()),
            Some("2_affx")
        );

        let bare = "[gd_resource type=\"Resource\" format=3]\n\n[resource]\nx = 1\n";
        let scan = BlockScanner::new(&f).scan(&lines(bare));
        assert_eq!(scan.declaration_insertion(), (1, true));
    }

    #[test]
    fn missing_header() {
        let f = fields();
        let scan = BlockScanner::new(&f).scan(&lines("[resource]\nx = 1\n"));
        assert_eq!(scan.header, None);
        assert!(scan.root.is_some());
    }
}
