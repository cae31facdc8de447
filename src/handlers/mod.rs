pub mod advice;
pub mod health;
pub mod materials;
pub mod product;

use std::sync::Arc;

use crate::advisor::Advisor;
use crate::workspace::Workspace;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub workspace: Arc<Workspace>,
    pub advisor: Arc<Advisor>,
}
