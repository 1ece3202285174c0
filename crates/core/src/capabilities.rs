//! Cluster capabilities as reported by `GET /info`

use serde::Deserialize;

use crate::config::ClientSettings;

/// Subset of the capability document that the client acts on
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Capabilities {
    #[serde(default)]
    pub swift: SwiftLimits,

    /// Present if the bulk middleware allows bulk deletes
    #[serde(default)]
    pub bulk_delete: Option<BulkDeleteLimits>,

    /// Present if the bulk middleware allows archive extraction
    #[serde(default)]
    pub bulk_upload: Option<BulkUploadLimits>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SwiftLimits {
    pub version: Option<String>,
    pub max_file_size: Option<u64>,
    pub max_object_name_length: Option<u64>,
    pub container_listing_limit: Option<u64>,
    pub account_listing_limit: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BulkDeleteLimits {
    pub max_deletes_per_request: usize,
    pub max_failed_deletes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BulkUploadLimits {
    pub max_containers_per_extraction: usize,
    pub max_failed_extractions: usize,
}

impl Capabilities {
    /// Lower `settings` to what the cluster accepts
    pub fn apply_to(&self, settings: &mut ClientSettings) {
        if let Some(limits) = self.bulk_delete
            && limits.max_deletes_per_request > 0
        {
            settings.bulk_delete_batch_size = settings
                .bulk_delete_batch_size
                .min(limits.max_deletes_per_request);
        }
    }
}
