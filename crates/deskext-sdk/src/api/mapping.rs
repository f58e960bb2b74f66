//! Enumeration mappings between host ids and API names.
//!
//! Each enumerated concept has one [`ApiMapping`] implementation produced by
//! [`api_mapping!`]. `to_api` is a plain `match` over the internal enum, so a
//! variant added on the host side without an API name fails to compile.
//! `from_api` takes untrusted strings and reports unknown names with the
//! concept's error code.

use std::fmt;

use serde::Serialize;

use deskext_core::{
    CorrectnessId, OrderSideId, PublisherTypeId, TradingEnvironmentId, UiActionCommitTypeId,
    UiActionStateId,
};

use super::error::{ApiError, ApiResult, ErrorCode};
use crate::defect::internal_defect;

/// Bijection between an internal enumeration and its API names.
pub trait ApiMapping: Sized + Copy + Eq + fmt::Display + 'static {
    /// Concept name used in messages and tables
    const CONCEPT: &'static str;
    /// Code reported for unknown API names
    const INVALID_CODE: ErrorCode;
    /// Every internal variant in declaration order
    const VARIANTS: &'static [Self];

    /// Translate to the API name. Total.
    fn to_api(self) -> &'static str;

    /// Translate an API name from extension code.
    fn from_api(value: &str) -> ApiResult<Self>;

    /// Resolve a raw host discriminant. A discriminant with no variant is an
    /// internal defect, not a reported error.
    #[track_caller]
    fn from_ordinal(ordinal: usize) -> Self {
        match Self::VARIANTS.get(ordinal) {
            Some(variant) => *variant,
            None => internal_defect(
                "MAP0001",
                format!("{} ordinal {} has no variant", Self::CONCEPT, ordinal),
            ),
        }
    }
}

macro_rules! api_mapping {
    ($internal:ident, $concept:literal, $code:expr, { $($variant:ident => $api:literal),+ $(,)? }) => {
        impl ApiMapping for $internal {
            const CONCEPT: &'static str = $concept;
            const INVALID_CODE: ErrorCode = $code;
            const VARIANTS: &'static [Self] = &$internal::ALL;

            fn to_api(self) -> &'static str {
                match self {
                    $($internal::$variant => $api,)+
                }
            }

            fn from_api(value: &str) -> ApiResult<Self> {
                match value {
                    $($api => Ok($internal::$variant),)+
                    other => Err(ApiError::new(
                        $code,
                        format!("invalid {} '{}'", $concept, other),
                    )),
                }
            }
        }
    };
}

api_mapping!(TradingEnvironmentId, "TradingEnvironmentId", ErrorCode::InvalidTradingEnvironmentId, {
    Production => "Production",
    Delayed => "Delayed",
    Demo => "Demo",
});

api_mapping!(CorrectnessId, "CorrectnessId", ErrorCode::InvalidCorrectnessId, {
    Good => "Good",
    Usable => "Usable",
    Suspect => "Suspect",
    Error => "Error",
});

// The API speaks of buying and selling, the host of bid and ask.
api_mapping!(OrderSideId, "OrderSideId", ErrorCode::InvalidOrderSideId, {
    Bid => "Buy",
    Ask => "Sell",
});

api_mapping!(PublisherTypeId, "PublisherTypeId", ErrorCode::InvalidPublisherTypeId, {
    Builtin => "Builtin",
    User => "User",
    Organisation => "Organisation",
});

api_mapping!(UiActionCommitTypeId, "UiActionCommitTypeId", ErrorCode::InvalidUiActionCommitTypeId, {
    Explicit => "Explicit",
    Implicit => "Implicit",
});

api_mapping!(UiActionStateId, "UiActionStateId", ErrorCode::InvalidUiActionStateId, {
    Disabled => "Disabled",
    Readonly => "Readonly",
    Missing => "Missing",
    Invalid => "Invalid",
    Valid => "Valid",
    Accepted => "Accepted",
    Warning => "Warning",
    Error => "Error",
});

// ─────────────────────────────────────────────────────────────────────────────
// Mapping Tables
// ─────────────────────────────────────────────────────────────────────────────

/// One row of a mapping table.
#[derive(Debug, Clone, Serialize)]
pub struct MappingEntry {
    pub internal: String,
    pub api: &'static str,
}

/// A whole mapping, for inspection.
#[derive(Debug, Clone, Serialize)]
pub struct MappingTable {
    pub concept: &'static str,
    pub invalid_code: ErrorCode,
    pub entries: Vec<MappingEntry>,
}

/// Table for one concept.
pub fn mapping_table<M: ApiMapping>() -> MappingTable {
    MappingTable {
        concept: M::CONCEPT,
        invalid_code: M::INVALID_CODE,
        entries: M::VARIANTS
            .iter()
            .map(|variant| MappingEntry {
                internal: variant.to_string(),
                api: variant.to_api(),
            })
            .collect(),
    }
}

/// Tables for every concept carried by the facade.
pub fn all_mapping_tables() -> Vec<MappingTable> {
    vec![
        mapping_table::<TradingEnvironmentId>(),
        mapping_table::<CorrectnessId>(),
        mapping_table::<OrderSideId>(),
        mapping_table::<PublisherTypeId>(),
        mapping_table::<UiActionCommitTypeId>(),
        mapping_table::<UiActionStateId>(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn assert_bijection<M: ApiMapping + fmt::Debug>() {
        let mut names = HashSet::new();
        for variant in M::VARIANTS {
            let api = variant.to_api();
            assert!(names.insert(api), "{} name '{}' used twice", M::CONCEPT, api);
            assert_eq!(M::from_api(api).unwrap(), *variant);
        }
    }

    #[test]
    fn test_round_trip_every_concept() {
        assert_bijection::<TradingEnvironmentId>();
        assert_bijection::<CorrectnessId>();
        assert_bijection::<OrderSideId>();
        assert_bijection::<PublisherTypeId>();
        assert_bijection::<UiActionCommitTypeId>();
        assert_bijection::<UiActionStateId>();
    }

    #[test]
    fn test_unknown_names_reported() {
        let err = TradingEnvironmentId::from_api("Paper").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidTradingEnvironmentId);

        let err = OrderSideId::from_api("Bid").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidOrderSideId);
        assert!(err.message.contains("'Bid'"));

        // Names are case sensitive
        assert!(CorrectnessId::from_api("good").is_err());
        assert!(UiActionCommitTypeId::from_api("").is_err());
    }

    #[test]
    fn test_order_side_vocabulary() {
        assert_eq!(OrderSideId::Bid.to_api(), "Buy");
        assert_eq!(OrderSideId::from_api("Sell").unwrap(), OrderSideId::Ask);
    }

    #[test]
    fn test_from_ordinal() {
        assert_eq!(CorrectnessId::from_ordinal(2), CorrectnessId::Suspect);
        assert_eq!(UiActionStateId::from_ordinal(7), UiActionStateId::Error);
    }

    #[test]
    #[should_panic(expected = "MAP0001")]
    fn test_from_ordinal_out_of_range_is_defect() {
        OrderSideId::from_ordinal(2);
    }

    #[test]
    fn test_all_tables() {
        let tables = all_mapping_tables();
        assert_eq!(tables.len(), 6);
        let side = tables.iter().find(|t| t.concept == "OrderSideId").unwrap();
        assert_eq!(side.entries[0].internal, "bid");
        assert_eq!(side.entries[0].api, "Buy");
    }
}
