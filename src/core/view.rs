#![forbid(unsafe_code)]

use serde::Serialize;

use crate::core::catalog::{CatalogState, Partition};
use crate::core::model::{Inquiry, Listing, Tier, TierSelector};
use crate::core::session::{InquirySession, SubmitPhase};

pub const LOADING_MESSAGE: &str = "Loading accounts...";
pub const EMPTY_MESSAGE: &str = "No accounts found for this tier.";
pub const FEATURED_HEADING: &str = "Featured Accounts";
pub const REGULAR_HEADING: &str = "More Accounts";
pub const SUBMITTED_TITLE: &str = "Inquiry Submitted!";
pub const SUBMITTED_MESSAGE: &str = "We'll contact you shortly to complete your purchase.";

#[derive(Clone, Debug, Serialize)]
pub struct TierChip {
    pub token: TierSelector,
    pub label: &'static str,
    pub active: bool,
}

pub fn tier_bar(selected: TierSelector) -> Vec<TierChip> {
    TierSelector::choices()
        .map(|choice| TierChip {
            token: choice,
            label: match choice {
                TierSelector::All => "All Tiers",
                TierSelector::Only(tier) => tier.as_str(),
            },
            active: choice == selected,
        })
        .collect()
}

#[derive(Clone, Debug, Serialize)]
pub struct ListingCard {
    pub id: String,
    pub title: String,
    pub description: String,
    pub tier: Tier,
    pub level: u32,
    pub uc_amount: u64,
    pub skins_count: u64,
    pub gun_skins_count: u64,
    pub emotes_count: u64,
    pub price: f64,
    pub price_label: String,
    pub image_url: Option<String>,
    pub featured: bool,
}

impl From<&Listing> for ListingCard {
    fn from(listing: &Listing) -> Self {
        Self {
            id: listing.id.clone(),
            title: listing.title.clone(),
            description: listing.description.clone(),
            tier: listing.tier,
            level: listing.level,
            uc_amount: listing.uc_amount,
            skins_count: listing.skins_count,
            gun_skins_count: listing.gun_skins_count,
            emotes_count: listing.emotes_count,
            price: listing.price,
            price_label: format_price(listing.price),
            image_url: listing.image_url.clone(),
            featured: listing.featured,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Featured,
    Regular,
}

#[derive(Clone, Debug, Serialize)]
pub struct Section {
    pub kind: SectionKind,
    pub heading: Option<&'static str>,
    pub cards: Vec<ListingCard>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CatalogBody {
    Loading { message: &'static str },
    Empty { message: &'static str },
    Listings { sections: Vec<Section> },
}

#[derive(Clone, Debug, Serialize)]
pub struct CatalogPage {
    pub selected: TierSelector,
    pub tiers: Vec<TierChip>,
    pub total: usize,
    pub shown: usize,
    pub body: CatalogBody,
}

/// Builds the visible sections. An empty featured group renders nothing, and
/// the regular group only gets a heading when featured cards sit above it.
pub fn sections(partition: &Partition) -> Vec<Section> {
    let mut out = Vec::with_capacity(2);
    let has_featured = !partition.featured.is_empty();
    if has_featured {
        out.push(Section {
            kind: SectionKind::Featured,
            heading: Some(FEATURED_HEADING),
            cards: partition.featured.iter().map(ListingCard::from).collect(),
        });
    }
    if !partition.regular.is_empty() {
        out.push(Section {
            kind: SectionKind::Regular,
            heading: has_featured.then_some(REGULAR_HEADING),
            cards: partition.regular.iter().map(ListingCard::from).collect(),
        });
    }
    out
}

pub fn catalog_body(loading: bool, partition: &Partition) -> CatalogBody {
    if loading {
        return CatalogBody::Loading {
            message: LOADING_MESSAGE,
        };
    }
    if partition.featured.is_empty() && partition.regular.is_empty() {
        return CatalogBody::Empty {
            message: EMPTY_MESSAGE,
        };
    }
    CatalogBody::Listings {
        sections: sections(partition),
    }
}

pub fn catalog_page(state: &CatalogState) -> CatalogPage {
    let partition = state.partition();
    CatalogPage {
        selected: state.selector(),
        tiers: tier_bar(state.selector()),
        total: state.listings().len(),
        shown: state.filtered().len(),
        body: catalog_body(state.loading(), &partition),
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct InquiryView {
    pub session_id: String,
    pub listing: ListingCard,
    pub draft: Inquiry,
    pub phase: SubmitPhase,
    pub submitting: bool,
    pub submitted: bool,
    pub submit_label: &'static str,
    pub notice: Option<String>,
    pub title: Option<&'static str>,
    pub message: Option<&'static str>,
}

impl From<&InquirySession> for InquiryView {
    fn from(session: &InquirySession) -> Self {
        let submitted = session.submitted();
        Self {
            session_id: session.id.clone(),
            listing: ListingCard::from(&session.listing),
            draft: session.draft.clone(),
            phase: session.phase,
            submitting: session.submitting(),
            submitted,
            submit_label: if session.submitting() {
                "Submitting..."
            } else {
                "Submit Inquiry"
            },
            notice: session.notice.clone(),
            title: submitted.then_some(SUBMITTED_TITLE),
            message: submitted.then_some(SUBMITTED_MESSAGE),
        }
    }
}

/// Rupee amount with comma digit grouping; fractions only when present.
pub fn format_price(price: f64) -> String {
    let cents = (price.max(0.0) * 100.0).round() as u64;
    let grouped = group_en_in(&(cents / 100).to_string());
    let frac = cents % 100;

    match frac {
        0 => format!("₹{grouped}"),
        f if f % 10 == 0 => format!("₹{grouped}.{}", f / 10),
        f => format!("₹{grouped}.{f:02}"),
    }
}

/// Indian digit grouping: the last three digits, then pairs (`1,23,456`).
fn group_en_in(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut out = String::with_capacity(digits.len() + digits.len() / 2);
    for (i, ch) in head.chars().enumerate() {
        if i > 0 && (head.len() - i) % 2 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.push(',');
    out.push_str(tail);
    out
}
