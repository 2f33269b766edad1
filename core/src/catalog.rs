use std::collections::HashSet;

use serde::Deserialize;
use thiserror::Error;

use crate::{PlantEntity, PlantId};

/// Immutable, validated list of the plants placed in one garden session.
///
/// Plants keep the order in which they were supplied; proximity tie-breaks
/// rely on it.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(try_from = "CatalogDocument")]
pub struct PlantCatalog {
    plants: Vec<PlantEntity>,
}

impl PlantCatalog {
    /// Validates and wraps the provided plants.
    pub fn new(plants: Vec<PlantEntity>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(plants.len());
        for plant in &plants {
            let id = plant.id();
            if id.as_str().trim().is_empty() {
                return Err(CatalogError::BlankId);
            }
            if !seen.insert(id.clone()) {
                return Err(CatalogError::DuplicateId(id.clone()));
            }
            if !plant.position().is_finite() {
                return Err(CatalogError::NonFinitePosition(id.clone()));
            }
            let size = plant.visual_size();
            if !(size.is_finite() && size > 0.0) {
                return Err(CatalogError::InvalidVisualSize {
                    plant: id.clone(),
                    size,
                });
            }
        }

        Ok(Self { plants })
    }

    /// Plants in catalog order.
    #[must_use]
    pub fn plants(&self) -> &[PlantEntity] {
        &self.plants
    }

    /// Looks up a plant by identifier.
    #[must_use]
    pub fn get(&self, id: &PlantId) -> Option<&PlantEntity> {
        self.plants.iter().find(|plant| plant.id() == id)
    }

    /// Number of plants in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plants.len()
    }

    /// Reports whether the catalog holds no plants.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plants.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogDocument {
    #[serde(default, rename = "plant")]
    plants: Vec<PlantEntity>,
}

impl TryFrom<CatalogDocument> for PlantCatalog {
    type Error = CatalogError;

    fn try_from(document: CatalogDocument) -> Result<Self, Self::Error> {
        Self::new(document.plants)
    }
}

/// Reasons a plant list may be rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum CatalogError {
    /// A plant identifier was empty or whitespace.
    #[error("plant identifiers must not be blank")]
    BlankId,
    /// Two plants share the same identifier.
    #[error("plant identifier `{0}` is used more than once")]
    DuplicateId(PlantId),
    /// A plant position contained NaN or infinity.
    #[error("plant `{0}` has a non-finite position")]
    NonFinitePosition(PlantId),
    /// A plant visual size was not strictly positive.
    #[error("plant `{plant}` has invalid visual size {size}")]
    InvalidVisualSize {
        /// Plant that failed validation.
        plant: PlantId,
        /// Rejected size.
        size: f32,
    },
}
