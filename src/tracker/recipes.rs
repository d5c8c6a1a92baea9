use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    store::{KeyValueStore, StorageError, RECIPES_KEY},
    utils::clock::Clock,
};

use super::{
    entities::Recipe,
    error::{TrackerError, ValidationError},
};

/// Ordered list of recipes the user can log from. The whole list is written back on every change.
pub struct RecipeCatalog<S> {
    store: S,
    clock: Arc<dyn Clock>,
    recipes: Vec<Recipe>,
}

impl<S: KeyValueStore> RecipeCatalog<S> {
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            recipes: vec![],
        }
    }

    /// Replaces the in-memory catalog with the stored one. A missing key means an empty catalog
    /// and nothing is written.
    /// A stored value that can't be decoded leaves the in-memory catalog as it was.
    pub async fn load(&mut self) -> Result<(), TrackerError> {
        let Some(recipes) = self.read_stored().await? else {
            debug!("No recipes stored yet");
            self.recipes.clear();
            return Ok(());
        };
        self.recipes = recipes;
        debug!("Loaded {} recipes", self.recipes.len());
        Ok(())
    }

    pub fn list(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn find(&self, id: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|v| v.id == id)
    }

    /// Case insensitive substring search over names, in catalog order.
    pub fn search<'a>(&'a self, query: &str) -> impl Iterator<Item = &'a Recipe> + 'a {
        let query = query.to_lowercase();
        self.recipes
            .iter()
            .filter(move |v| v.name.to_lowercase().contains(&query))
    }

    /// Validates the form values, appends a new recipe and persists the catalog. If persisting
    /// fails the recipe stays in memory.
    pub async fn add(&mut self, name: &str, points: &str) -> Result<Recipe, TrackerError> {
        let (name, points) = validate_recipe(name, points)?;
        let recipe = Recipe {
            id: self.next_id(),
            name,
            points,
        };
        info!("Adding recipe {recipe:?}");
        self.recipes.push(recipe.clone());
        self.persist().await?;
        Ok(recipe)
    }

    pub async fn remove(&mut self, id: &str) -> Result<Recipe, TrackerError> {
        let Some(position) = self.recipes.iter().position(|v| v.id == id) else {
            return Err(TrackerError::RecipeNotFound(id.to_owned()));
        };
        let removed = self.recipes.remove(position);
        info!("Removed recipe {removed:?}");
        self.persist().await?;
        Ok(removed)
    }

    async fn read_stored(&self) -> Result<Option<Vec<Recipe>>, TrackerError> {
        let Some(raw) = self.store.get(RECIPES_KEY).await? else {
            return Ok(None);
        };
        let recipes = serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt {
            key: RECIPES_KEY.into(),
            source,
        })?;
        Ok(Some(recipes))
    }

    /// Writes the whole catalog. The stored value is decoded first, so a value this version can't
    /// read is never replaced.
    async fn persist(&self) -> Result<(), TrackerError> {
        self.read_stored().await?;
        let raw = serde_json::to_string(&self.recipes).map_err(|source| StorageError::Encode {
            key: RECIPES_KEY.into(),
            source,
        })?;
        self.store.set(RECIPES_KEY, &raw).await?;
        Ok(())
    }

    /// Ids are the creation time in milliseconds. Two recipes created within the same millisecond
    /// get consecutive values.
    fn next_id(&self) -> String {
        let mut candidate = self.clock.time().timestamp_millis();
        while self.find(&candidate.to_string()).is_some() {
            candidate += 1;
        }
        candidate.to_string()
    }
}

pub fn validate_recipe(name: &str, points: &str) -> Result<(String, u32), ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    let points = points
        .trim()
        .parse::<u32>()
        .map_err(|_| ValidationError::InvalidPoints(points.to_owned()))?;
    Ok((name.to_owned(), points))
}
