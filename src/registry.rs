use log::{debug, info};
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::builtin_signatures;
use crate::error::{Result, ToolkitError};
use crate::schema::LayoutSignature;

/// All known layout signatures, keyed by id. Built once and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    signatures: BTreeMap<String, LayoutSignature>,
    header_sets: BTreeMap<BTreeSet<String>, String>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in catalog layout.
    pub fn with_builtin_layouts() -> Result<Self> {
        let mut registry = Self::new();
        for signature in builtin_signatures() {
            registry.register(signature)?;
        }
        info!("Registered {} built-in layouts", registry.len());
        Ok(registry)
    }

    pub fn register(&mut self, signature: LayoutSignature) -> Result<()> {
        if let Some(existing) = self.signatures.get(&signature.id) {
            return Err(ToolkitError::DuplicateSignature {
                layout_id: signature.id.clone(),
                existing_id: existing.id.clone(),
            });
        }

        if signature.required_count() == 0 {
            return Err(ToolkitError::InvalidLayout {
                layout_id: signature.id.clone(),
                reason: "layout declares no required columns".to_string(),
            });
        }

        let mut roles = BTreeSet::new();
        for column in &signature.columns {
            if column.headers.is_empty() {
                return Err(ToolkitError::InvalidLayout {
                    layout_id: signature.id.clone(),
                    reason: format!("column '{}' has no header spelling", column.role),
                });
            }
            if !roles.insert(column.role) {
                return Err(ToolkitError::InvalidLayout {
                    layout_id: signature.id.clone(),
                    reason: format!("role '{}' is mapped twice", column.role),
                });
            }
        }

        let header_set = signature.header_set();
        if let Some(existing_id) = self.header_sets.get(&header_set) {
            return Err(ToolkitError::DuplicateSignature {
                layout_id: signature.id.clone(),
                existing_id: existing_id.clone(),
            });
        }

        debug!(
            "Registering layout '{}' ({}, {} columns)",
            signature.id,
            signature.category,
            signature.columns.len()
        );
        self.header_sets.insert(header_set, signature.id.clone());
        self.signatures.insert(signature.id.clone(), signature);
        Ok(())
    }

    pub fn get(&self, layout_id: &str) -> Option<&LayoutSignature> {
        self.signatures.get(layout_id)
    }

    pub fn require(&self, layout_id: &str) -> Result<&LayoutSignature> {
        self.get(layout_id)
            .ok_or_else(|| ToolkitError::UnknownLayout(layout_id.to_string()))
    }

    pub fn signatures(&self) -> impl Iterator<Item = &LayoutSignature> {
        self.signatures.values()
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

static BUILTIN_REGISTRY: Lazy<Result<SchemaRegistry>> = Lazy::new(SchemaRegistry::with_builtin_layouts);

/// Shared registry of built-in layouts, initialized on first use.
pub fn default_registry() -> Result<&'static SchemaRegistry> {
    match &*BUILTIN_REGISTRY {
        Ok(registry) => Ok(registry),
        Err(e) => Err(ToolkitError::InvalidLayout {
            layout_id: "built-in catalog".to_string(),
            reason: e.to_string(),
        }),
    }
}
