//! API shape of the extension identity object.

use serde::{Deserialize, Serialize};

use deskext_core::{ExtensionInfo, PublisherTypeId};

use super::error::ApiResult;
use super::mapping::ApiMapping;

/// Identity object handed to an extension at activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionInfoApi {
    pub publisher_type: String,
    pub publisher_name: String,
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub long_description: String,
}

impl ExtensionInfoApi {
    /// Translate into the host's identity object.
    pub fn to_info(&self) -> ApiResult<ExtensionInfo> {
        Ok(ExtensionInfo {
            publisher_type: PublisherTypeId::from_api(&self.publisher_type)?,
            publisher_name: self.publisher_name.clone(),
            name: self.name.clone(),
            version: self.version.clone(),
            short_description: self.short_description.clone(),
            long_description: self.long_description.clone(),
        })
    }
}

impl From<&ExtensionInfo> for ExtensionInfoApi {
    fn from(info: &ExtensionInfo) -> Self {
        Self {
            publisher_type: info.publisher_type.to_api().to_string(),
            publisher_name: info.publisher_name.clone(),
            name: info.name.clone(),
            version: info.version.clone(),
            short_description: info.short_description.clone(),
            long_description: info.long_description.clone(),
        }
    }
}
