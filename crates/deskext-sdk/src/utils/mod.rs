//! SDK Utilities

mod validation;

pub use validation::{
    ValidationError, validate_extension_name, validate_publisher_name, validate_version,
};
