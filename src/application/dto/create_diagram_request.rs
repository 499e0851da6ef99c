use std::path::PathBuf;

/// Request to create a diagram from a local image file.
#[derive(Debug, Clone)]
pub struct CreateDiagramRequest {
    pub image_path: PathBuf,
    /// Free text shown to the description model; may be empty.
    pub user_description: String,
}

impl CreateDiagramRequest {
    pub fn new(image_path: PathBuf, user_description: String) -> Self {
        Self {
            image_path,
            user_description,
        }
    }
}
