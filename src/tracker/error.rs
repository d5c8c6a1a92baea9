use crate::store::StorageError;

/// Problems with user input. These are reported before anything gets mutated.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Recipe name can't be empty")]
    EmptyName,
    #[error("`{0}` is not a valid amount of points")]
    InvalidPoints(String),
}

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("No recipe with id {0}")]
    RecipeNotFound(String),
}
