pub mod classifier;
pub mod permissions;
pub mod registry;
pub mod responses;
pub mod static_files;

use std::path::PathBuf;

use crate::config::ServerConfig;
use crate::handler::classifier::Classifier;
use crate::http::response::HttpResponse;

/// Turns the bytes of one request into the response to write back.
pub struct Handler {
    classifier: Classifier,
    resource_root: PathBuf,
    server_name: String,
}

impl Handler {
    pub fn new(classifier: Classifier, config: &ServerConfig) -> Self {
        Self {
            classifier,
            resource_root: config.resource_root.clone(),
            server_name: config.server_name.clone(),
        }
    }

    pub async fn handle_request(&self, raw: &[u8]) -> HttpResponse {
        let classification = self.classifier.classify(raw);
        responses::build(&classification, &self.resource_root, &self.server_name).await
    }
}
