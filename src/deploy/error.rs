use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::backend::BackendError;
use crate::model::DeclarationError;

/// Errors that abort a build. No build step runs after one is returned.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Declaration(#[from] DeclarationError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("failed to prepare layer at {}: {source}", path.display())]
    Packaging {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
