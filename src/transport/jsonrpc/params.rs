#![forbid(unsafe_code)]

use serde::Deserialize;

use crate::core::model::TierSelector;
use crate::transport::jsonrpc::RpcError;

#[derive(Debug, Default, Deserialize)]
pub struct TierParams {
    #[serde(default)]
    pub tier: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SessionParams {
    pub session_id: String,
}

pub(crate) fn parse_tier(token: &str) -> Result<TierSelector, RpcError> {
    token
        .parse()
        .map_err(|e| RpcError::InvalidParams(format!("invalid tier: {e}")))
}

pub(crate) fn parse_tier_opt(token: Option<&str>) -> Result<Option<TierSelector>, RpcError> {
    token.map(parse_tier).transpose()
}

#[cfg(test)]
mod tests {
    use super::{parse_tier, parse_tier_opt};
    use crate::core::model::{Tier, TierSelector};
    use crate::transport::jsonrpc::RpcError;

    #[test]
    fn parse_tier_accepts_all_and_names() {
        assert_eq!(parse_tier("all").expect("all"), TierSelector::All);
        assert_eq!(
            parse_tier("Platinum").expect("tier"),
            TierSelector::Only(Tier::Platinum)
        );
    }

    #[test]
    fn parse_tier_rejects_unknown() {
        match parse_tier("Legendary").expect_err("error") {
            RpcError::InvalidParams(msg) => assert!(msg.contains("invalid tier")),
            _ => panic!("unexpected error"),
        }
    }

    #[test]
    fn parse_tier_opt_passes_none() {
        assert!(parse_tier_opt(None).expect("none").is_none());
    }
}
