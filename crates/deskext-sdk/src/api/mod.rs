//! API Facade Layer
//!
//! Translation between the host's internal types and the shapes extension
//! code sees. Trust is asymmetric here: host values always translate, values
//! from extensions are checked and rejected with an [`ApiError`].

mod command;
mod error;
mod info;
pub mod mapping;

pub use command::{CommandApi, MenuBarItemPositionApi};
pub use error::{ApiError, ApiResult, ERROR_CODE_CONTRACT_VERSION, ErrorCode};
pub use info::ExtensionInfoApi;
pub use mapping::{ApiMapping, MappingEntry, MappingTable, all_mapping_tables, mapping_table};
