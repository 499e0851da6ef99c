use chrono::Utc;

/// A rendered report, fetched via a short-lived presigned link.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramReport {
    pub diagram_id: String,
    pub presigned_url: String,
}

impl DiagramReport {
    pub fn new(diagram_id: String, presigned_url: String) -> Self {
        Self {
            diagram_id,
            presigned_url,
        }
    }

    /// Local filename to save the download under, defaulting to the
    /// extension carried by the presigned URL's path.
    pub fn suggested_filename(&self) -> String {
        let extension = self
            .presigned_url
            .split('?')
            .next()
            .and_then(|path| path.rsplit('.').next().filter(|ext| ext.len() <= 5))
            .unwrap_or("pdf");
        format!(
            "threat-model-{}-{}.{}",
            self.diagram_id,
            Utc::now().format("%Y%m%d-%H%M%S"),
            extension
        )
    }
}
