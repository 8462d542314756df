/// Reference injection — plans new declarations and field assignments for a
/// document, then splices them in from the bottom up.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::core::document::{Document, DocumentError};
use crate::core::scanner::Scan;
use crate::schema::{Block, ExtResource, ReferenceExpr, ReferenceKind};

const ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const ID_SUFFIX_LEN: usize = 5;

/// The document a new reference points at.
#[derive(Debug, Clone, Copy)]
pub struct TargetRef<'a> {
    pub path: &'a str,
    /// Stable identifier; empty when the target declares none.
    pub uid: &'a str,
    /// `type` attribute written on a new declaration.
    pub resource_type: &'a str,
}

/// What one `inject` call queued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Injection {
    pub local_id: String,
    pub new_declaration: bool,
    pub field_line: String,
    pub line_index: usize,
}

/// Accumulates insertions for one document.
///
/// Nothing touches the document until `apply`, so a failed `inject` leaves
/// the plan (and the document) exactly as it was.
pub struct ReferenceInjector<'a> {
    scan: &'a Scan,
    element_script: Option<&'a str>,
    used_ids: FxHashSet<String>,
    planned: FxHashMap<String, String>,
    new_declarations: Vec<String>,
    fields: Vec<(usize, String)>,
    next_index: u32,
    rng: StdRng,
}

impl<'a> ReferenceInjector<'a> {
    pub fn new(scan: &'a Scan, element_script: Option<&'a str>, seed: u64) -> Self {
        let used_ids: FxHashSet<String> = scan.declarations.iter().map(|d| d.id.clone()).collect();
        let highest = scan
            .declarations
            .iter()
            .filter_map(|d| ExtResource::numeric_prefix(&d.id))
            .max()
            .unwrap_or(0);
        let next_index = highest.max(scan.declarations.len() as u32) + 1;

        Self {
            scan,
            element_script,
            used_ids,
            planned: FxHashMap::default(),
            new_declarations: Vec::new(),
            fields: Vec::new(),
            next_index,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Queue a `field = <reference>` line in `anchor` pointing at `target`.
    ///
    /// Reuses an existing (or already planned) declaration for the same
    /// path; otherwise queues a new one.
    pub fn inject(
        &mut self,
        anchor: &Block,
        field: &str,
        kind: ReferenceKind,
        target: TargetRef<'_>,
    ) -> Result<Injection, DocumentError> {
        let element_type_id = match kind {
            ReferenceKind::Single => None,
            ReferenceKind::Collection => Some(self.type_identity()?),
        };

        let (local_id, new_declaration) = self.local_id_for(target);

        let expr = match element_type_id {
            None => ReferenceExpr::Single {
                id: local_id.clone(),
            },
            Some(element_type_id) => ReferenceExpr::Collection {
                element_type_id,
                ids: vec![local_id.clone()],
            },
        };
        let field_line = expr.assignment(field);
        let line_index = anchor.insertion_index();
        self.fields.push((line_index, field_line.clone()));

        Ok(Injection {
            local_id,
            new_declaration,
            field_line,
            line_index,
        })
    }

    /// Number of declarations `apply` will add.
    pub fn new_declarations(&self) -> usize {
        self.new_declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Splice every queued line into `doc`, highest index first so earlier
    /// indices stay valid. Returns the number of declarations added.
    pub fn apply(self, doc: &mut Document) -> usize {
        let added = self.new_declarations.len();
        let mut insertions: Vec<(usize, Vec<String>)> = self
            .fields
            .into_iter()
            .map(|(index, line)| (index, vec![line]))
            .collect();

        if added > 0 {
            let (index, needs_separator) = self.scan.declaration_insertion();
            let mut lines = Vec::with_capacity(added + 1);
            if needs_separator {
                lines.push(String::new());
            }
            lines.extend(self.new_declarations);
            insertions.push((index, lines));
        }

        insertions.sort_by(|a, b| b.0.cmp(&a.0));
        for (index, lines) in insertions {
            doc.insert_lines(index, lines);
        }
        added
    }

    /// Local id of the script declaration that types collection elements.
    fn type_identity(&self) -> Result<String, DocumentError> {
        let script = self.element_script.unwrap_or_default();
        self.scan
            .declarations
            .iter()
            .find(|d| d.resource_type == "Script" && d.path == script)
            .map(|d| d.id.clone())
            .ok_or_else(|| DocumentError::MissingTypeIdentity(script.to_string()))
    }

    fn local_id_for(&mut self, target: TargetRef<'_>) -> (String, bool) {
        if let Some(existing) = self.scan.declaration_for(target.path) {
            return (existing.id.clone(), false);
        }
        if let Some(planned) = self.planned.get(target.path) {
            return (planned.clone(), false);
        }

        let id = self.fresh_id();
        self.new_declarations.push(ExtResource::render(
            target.resource_type,
            Some(target.uid),
            target.path,
            &id,
        ));
        self.planned.insert(target.path.to_string(), id.clone());
        (id, true)
    }

    fn fresh_id(&mut self) -> String {
        loop {
            let suffix: String = (0..ID_SUFFIX_LEN)
                .map(|_| ID_ALPHABET[self.rng.gen_range(0..ID_ALPHABET.len())] as char)
                .collect();
            let id = format!("{}_{}", self.next_index, suffix);
            if self.used_ids.insert(id.clone()) {
                self.next_index += 1;
                return id;
            }
        }
    }
}
