//! The shop catalog: price-ordered tools and upgrades in one index space.
//!
//! Items are addressed by a single 1-based index. Indices `1..=tools.len()`
//! name tools in ascending price order; the following `upgrades.len()`
//! indices name upgrades in ascending price order. Equal prices are ordered
//! by id so the numbering is stable across loads.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::{Tool, Upgrade};

/// On-disk shape of the catalog: two collections keyed by catalog id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogDocument {
    /// Tools keyed by catalog id.
    #[serde(alias = "pickaxes")]
    pub tools: BTreeMap<String, Tool>,
    /// Upgrades keyed by catalog id.
    pub upgrades: BTreeMap<String, Upgrade>,
}

/// An item resolved from a catalog index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseTarget<'a> {
    /// A tool, priced in gold.
    Tool(&'a Tool),
    /// An upgrade, priced in diamonds.
    Upgrade(&'a Upgrade),
}

impl<'a> PurchaseTarget<'a> {
    /// Display name of the item.
    pub fn name(&self) -> &'a str {
        match *self {
            Self::Tool(tool) => tool.name(),
            Self::Upgrade(upgrade) => upgrade.name(),
        }
    }
}

/// Immutable catalog built once at startup.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tools: Vec<Tool>,
    upgrades: Vec<Upgrade>,
    index_by_id: HashMap<String, usize>,
}

impl Catalog {
    /// Builds a catalog from a parsed document.
    ///
    /// Entries with an empty `id` take their map key as id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if a tool has an empty yield range or an id
    /// appears twice across tools and upgrades.
    #[instrument(skip(document), fields(tools = document.tools.len(), upgrades = document.upgrades.len()))]
    pub fn from_document(document: CatalogDocument) -> Result<Self, CatalogError> {
        let mut tools: Vec<Tool> = document
            .tools
            .into_iter()
            .map(|(key, tool)| {
                if tool.id().is_empty() {
                    Tool::new(
                        key,
                        tool.name().clone(),
                        *tool.price(),
                        *tool.min_yield(),
                        *tool.max_yield(),
                    )
                } else {
                    tool
                }
            })
            .collect();

        if let Some(bad) = tools.iter().find(|t| !t.has_valid_range()) {
            warn!(tool = %bad.id(), min = bad.min_yield(), max = bad.max_yield(), "Degenerate yield range");
            return Err(CatalogError::new(format!(
                "tool '{}' has empty yield range [{}, {})",
                bad.id(),
                bad.min_yield(),
                bad.max_yield()
            )));
        }

        let mut upgrades: Vec<Upgrade> = document
            .upgrades
            .into_iter()
            .map(|(key, upgrade)| {
                if upgrade.id().is_empty() {
                    Upgrade::new(
                        key,
                        upgrade.name().clone(),
                        upgrade.description().clone(),
                        *upgrade.price(),
                    )
                } else {
                    upgrade
                }
            })
            .collect();

        tools.sort_by(|a, b| a.price().cmp(b.price()).then_with(|| a.id().cmp(b.id())));
        upgrades.sort_by(|a, b| a.price().cmp(b.price()).then_with(|| a.id().cmp(b.id())));

        let mut index_by_id = HashMap::with_capacity(tools.len() + upgrades.len());
        let ids = tools
            .iter()
            .map(|t| t.id())
            .chain(upgrades.iter().map(|u| u.id()));
        for (offset, id) in ids.enumerate() {
            if index_by_id.insert(id.clone(), offset + 1).is_some() {
                return Err(CatalogError::new(format!("duplicate catalog id '{id}'")));
            }
        }

        info!(tools = tools.len(), upgrades = upgrades.len(), "Catalog built");
        Ok(Self {
            tools,
            upgrades,
            index_by_id,
        })
    }

    /// Parses a JSON catalog document.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] on malformed JSON or invalid entries.
    #[instrument(skip(content))]
    pub fn from_json_str(content: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_str(content)
            .map_err(|e| CatalogError::new(format!("Failed to parse JSON catalog: {}", e)))?;
        Self::from_document(document)
    }

    /// Parses a TOML catalog document.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] on malformed TOML or invalid entries.
    #[instrument(skip(content))]
    pub fn from_toml_str(content: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument = toml::from_str(content)
            .map_err(|e| CatalogError::new(format!("Failed to parse TOML catalog: {}", e)))?;
        Self::from_document(document)
    }

    /// Loads a catalog file; `.toml` files are read as TOML, anything else as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        debug!("Loading catalog from file");
        let content = std::fs::read_to_string(path).map_err(|e| {
            CatalogError::new(format!("Failed to read catalog '{}': {}", path.display(), e))
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            _ => Self::from_json_str(&content),
        }
    }

    /// Tools in ascending price order.
    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    /// Upgrades in ascending price order.
    pub fn upgrades(&self) -> &[Upgrade] {
        &self.upgrades
    }

    /// Total number of purchasable items.
    pub fn len(&self) -> usize {
        self.tools.len() + self.upgrades.len()
    }

    /// True when nothing is for sale.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolves a 1-based shop index to an item, or `None` if out of range.
    #[instrument(skip(self))]
    pub fn resolve(&self, index: usize) -> Option<PurchaseTarget<'_>> {
        let tools = self.tools.len();
        let target = match index {
            0 => None,
            i if i <= tools => self.tools.get(i - 1).map(PurchaseTarget::Tool),
            i => self.upgrades.get(i - 1 - tools).map(PurchaseTarget::Upgrade),
        };
        debug!(index, found = target.is_some(), "Resolved shop index");
        target
    }

    /// The 1-based shop index of the item with the given id.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    /// Shop index of the first upgrade.
    pub fn first_upgrade_index(&self) -> usize {
        self.tools.len() + 1
    }
}

/// Catalog loading or validation error.
#[derive(Debug, Clone, Display, Error)]
#[display("Catalog error: {} at {}:{}", message, file, line)]
pub struct CatalogError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl CatalogError {
    /// Creates a new catalog error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
