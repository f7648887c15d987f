//! PC-builder flow state, persisted per session between turns.

use serde::{Deserialize, Serialize};

use crate::domain::commerce::{ComponentCategory, Product};
use crate::domain::foundation::BuildId;

/// Steps of the PC-builder flow: one per component category, plus the
/// terminal confirmation step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PcBuilderStep {
    #[default]
    None,
    Category(ComponentCategory),
    Completed,
}

impl PcBuilderStep {
    /// Persisted string form ("none", "ram", ..., "completed").
    pub fn as_key(&self) -> &'static str {
        match self {
            PcBuilderStep::None => "none",
            PcBuilderStep::Category(cat) => cat.key(),
            PcBuilderStep::Completed => "completed",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "none" => Some(PcBuilderStep::None),
            "completed" => Some(PcBuilderStep::Completed),
            other => ComponentCategory::from_key(other).map(PcBuilderStep::Category),
        }
    }
}

impl Serialize for PcBuilderStep {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_key())
    }
}

impl<'de> Deserialize<'de> for PcBuilderStep {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        // Unknown step names fall back to None rather than failing the
        // whole metadata load.
        Ok(PcBuilderStep::from_key(&key).unwrap_or_default())
    }
}

/// The candidate menu as last shown to the user. A bare numeric reply is
/// only ever resolved against the menu for the step it was shown on;
/// menus from earlier steps are dropped when the flow advances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateMenu {
    pub category: ComponentCategory,
    pub products: Vec<Product>,
}

/// Working data for the PC-builder flow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PcBuilderData {
    /// Build record held by the capability provider, created lazily on
    /// the first category.
    #[serde(default)]
    pub build_id: Option<BuildId>,
    /// Menu shown in the previous turn, if any.
    #[serde(default)]
    pub shown: Option<CandidateMenu>,
}

impl PcBuilderData {
    /// Returns the cached menu only if it belongs to the given category.
    pub fn menu_for(&self, category: ComponentCategory) -> Option<&CandidateMenu> {
        self.shown
            .as_ref()
            .filter(|menu| menu.category == category)
    }
}

/// Persisted PC-builder flow state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PcBuilderState {
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub step: PcBuilderStep,
    #[serde(default)]
    pub data: PcBuilderData,
}

impl PcBuilderState {
    /// Fresh state at flow entry.
    pub fn enter() -> Self {
        Self {
            active: true,
            step: PcBuilderStep::Category(ComponentCategory::Ram),
            data: PcBuilderData::default(),
        }
    }

    /// Resets to the inactive default, discarding working data.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}
