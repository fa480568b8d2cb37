// ============================================================
// Layer 3 — Model Registry
// ============================================================
// Three ordered name lists a concrete model fills in once, when
// it is constructed:
//
//   loss_names   — losses reported by get_current_losses
//   model_names  — networks that are saved, loaded, printed and
//                  switched between train / eval mode
//   visual_names — tensors returned by get_current_visuals
//
// Every name must be resolvable through the model's accessors;
// the lifecycle layer treats an unresolvable name as a bug.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRegistry {
    loss_names:   Vec<String>,
    model_names:  Vec<String>,
    visual_names: Vec<String>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_losses<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.loss_names.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_networks<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.model_names.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_visuals<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.visual_names.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn loss_names(&self) -> &[String] {
        &self.loss_names
    }

    pub fn model_names(&self) -> &[String] {
        &self.model_names
    }

    pub fn visual_names(&self) -> &[String] {
        &self.visual_names
    }

    pub fn is_empty(&self) -> bool {
        self.loss_names.is_empty() && self.model_names.is_empty() && self.visual_names.is_empty()
    }
}
