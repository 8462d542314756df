use serde::{Deserialize, Serialize};

/// Shape of the field a new reference is written into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReferenceKind {
    /// `field = ExtResource("id")`
    #[default]
    Single,
    /// `field = Array[ExtResource("script")]([ExtResource("id")])`
    Collection,
}

/// A reference expression on the right-hand side of a field assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceExpr {
    Single {
        id: String,
    },
    /// Typed collection; `element_type_id` is the local id of the element's script.
    Collection {
        element_type_id: String,
        ids: Vec<String>,
    },
}

impl ReferenceExpr {
    pub fn render(&self) -> String {
        match self {
            Self::Single { id } => ext_ref(id),
            Self::Collection {
                element_type_id,
                ids,
            } => {
                let items: Vec<String> = ids.iter().map(|id| ext_ref(id)).collect();
                format!(
                    "Array[{}]([{}])",
                    ext_ref(element_type_id),
                    items.join(", ")
                )
            }
        }
    }

    /// Render a complete `field = <expr>` line.
    pub fn assignment(&self, field: &str) -> String {
        format!("{} = {}", field, self.render())
    }
}

fn ext_ref(id: &str) -> String {
    format!("ExtResource(\"{}\")", id)
}
