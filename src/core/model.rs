#![forbid(unsafe_code)]

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const STATUS_AVAILABLE: &str = "available";
pub const ALL_TIERS_TOKEN: &str = "all";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
    Crown,
    Ace,
    Conqueror,
}

impl Tier {
    /// Display order of the tier filter bar, lowest rank first.
    pub const ALL: [Tier; 8] = [
        Tier::Bronze,
        Tier::Silver,
        Tier::Gold,
        Tier::Platinum,
        Tier::Diamond,
        Tier::Crown,
        Tier::Ace,
        Tier::Conqueror,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Bronze => "Bronze",
            Tier::Silver => "Silver",
            Tier::Gold => "Gold",
            Tier::Platinum => "Platinum",
            Tier::Diamond => "Diamond",
            Tier::Crown => "Crown",
            Tier::Ace => "Ace",
            Tier::Conqueror => "Conqueror",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown tier: {0}")]
pub struct UnknownTier(pub String);

impl FromStr for Tier {
    type Err = UnknownTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tier::ALL
            .iter()
            .copied()
            .find(|tier| tier.as_str() == s)
            .ok_or_else(|| UnknownTier(s.to_string()))
    }
}

/// The tier filter token: either every tier or exactly one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TierSelector {
    #[default]
    All,
    Only(Tier),
}

impl TierSelector {
    pub fn matches(&self, tier: Tier) -> bool {
        match self {
            TierSelector::All => true,
            TierSelector::Only(selected) => *selected == tier,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            TierSelector::All => ALL_TIERS_TOKEN,
            TierSelector::Only(tier) => tier.as_str(),
        }
    }

    /// Every selector the filter bar offers, "all" first.
    pub fn choices() -> impl Iterator<Item = TierSelector> {
        std::iter::once(TierSelector::All).chain(Tier::ALL.into_iter().map(TierSelector::Only))
    }
}

impl fmt::Display for TierSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for TierSelector {
    type Err = UnknownTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == ALL_TIERS_TOKEN {
            return Ok(TierSelector::All);
        }
        s.parse().map(TierSelector::Only)
    }
}

impl TryFrom<String> for TierSelector {
    type Error = UnknownTier;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TierSelector> for String {
    fn from(value: TierSelector) -> Self {
        value.token().to_string()
    }
}

/// A game account offered for sale, as stored in the listings collection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub level: u32,
    pub tier: Tier,
    #[serde(default)]
    pub uc_amount: u64,
    #[serde(default)]
    pub skins_count: u64,
    #[serde(default)]
    pub gun_skins_count: u64,
    #[serde(default)]
    pub emotes_count: u64,
    pub price: f64,
    #[serde(default)]
    pub image_url: Option<String>,
    pub status: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// The record written to the inquiries collection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inquiry {
    pub account_id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    #[serde(default)]
    pub message: String,
}

impl Inquiry {
    pub fn for_listing(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::{Listing, STATUS_AVAILABLE, Tier};

    pub fn listing(id: &str, tier: Tier, price: f64, featured: bool) -> Listing {
        Listing {
            id: id.to_string(),
            title: format!("{tier} account {id}"),
            description: String::new(),
            level: 60,
            tier,
            uc_amount: 1200,
            skins_count: 14,
            gun_skins_count: 6,
            emotes_count: 9,
            price,
            image_url: None,
            status: STATUS_AVAILABLE.to_string(),
            featured,
            created_at: None,
            updated_at: None,
        }
    }
}
