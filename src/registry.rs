//! Id-keyed collection of rulers owned by the embedding application.
//! Exactly one ruler is "selected" (shown); the rest are hidden.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{info, warn};

use crate::config::RulerConfig;
use crate::controller::Ruler;
use crate::error::{Result, RulerError};
use crate::host::Host;

#[derive(Default)]
pub struct RulerRegistry {
    rulers: BTreeMap<String, Ruler>,
    current: Option<String>,
}

impl RulerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the ruler named by `config.ruler_id` unless a live one exists,
    /// then select it
    pub fn init_ruler(&mut self, config: RulerConfig, host: Arc<dyn Host>) -> Result<&mut Ruler> {
        let id = config.ruler_id.clone();
        if self.rulers.get(&id).is_some_and(Ruler::is_destroyed) {
            info!("Replacing destroyed ruler {id}");
            self.rulers.remove(&id);
        }
        if !self.rulers.contains_key(&id) {
            let ruler = Ruler::new(config, host)?;
            self.rulers.insert(id.clone(), ruler);
        }
        self.select(&id)?;
        self.rulers
            .get_mut(&id)
            .ok_or(RulerError::UnknownRulerId(id))
    }

    /// Add an already constructed ruler
    pub fn insert(&mut self, ruler: Ruler) -> Result<()> {
        let id = ruler.id().to_string();
        if self.rulers.contains_key(&id) {
            return Err(RulerError::DuplicateRulerId(id));
        }
        self.rulers.insert(id, ruler);
        Ok(())
    }

    /// The selected ruler
    #[must_use]
    pub fn get(&self) -> Option<&Ruler> {
        self.current.as_ref().and_then(|id| self.rulers.get(id))
    }

    #[must_use]
    pub fn get_by_id(&self, id: &str) -> Option<&Ruler> {
        self.rulers.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Ruler> {
        self.rulers.get_mut(id)
    }

    /// Show `id` and hide every other ruler
    pub fn select(&mut self, id: &str) -> Result<()> {
        if !self.rulers.contains_key(id) {
            return Err(RulerError::UnknownRulerId(id.to_string()));
        }
        for (ruler_id, ruler) in &mut self.rulers {
            let result = if ruler_id == id {
                ruler.show()
            } else {
                ruler.hide()
            };
            if let Err(e) = result {
                warn!("Could not toggle ruler {ruler_id}: {e}");
            }
        }
        self.current = Some(id.to_string());
        Ok(())
    }

    /// Destroy and forget `id`
    pub fn delete(&mut self, id: &str) -> Result<()> {
        let mut ruler = self
            .rulers
            .remove(id)
            .ok_or_else(|| RulerError::UnknownRulerId(id.to_string()))?;
        if self.current.as_deref() == Some(id) || self.rulers.is_empty() {
            self.current = None;
        }
        match ruler.destroy() {
            Ok(()) | Err(RulerError::Destroyed(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    #[must_use]
    pub fn exists(&self, id: &str) -> bool {
        self.rulers.contains_key(id)
    }

    /// Destroy every ruler and empty the registry
    pub fn destroy_all(&mut self) {
        for (id, mut ruler) in std::mem::take(&mut self.rulers) {
            if ruler.is_destroyed() {
                continue;
            }
            if let Err(e) = ruler.destroy() {
                warn!("Failed to destroy ruler {id}: {e}");
            }
        }
        self.current = None;
        info!("All rulers destroyed");
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.rulers.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rulers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rulers.is_empty()
    }
}
