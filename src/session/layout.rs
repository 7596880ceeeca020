//! Presentation values derived from poster state. Everything here is a pure
//! function of its arguments so the preview card can be recomputed on every
//! edit without touching the store.

use crate::models::donation::Donation;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Sum of all loaded donation amounts. Order of the list does not matter.
pub fn total_raised(donations: &[Donation]) -> Decimal {
    donations.iter().map(|donation| donation.amount).sum()
}

/// Effective fundraising goal from the free-form target string. Currency
/// symbols and thousands separators are stripped before parsing; an absent,
/// unparsable or non-positive goal collapses to 1 so progress math never
/// divides by zero.
pub fn goal_amount(total_amount: &str) -> Decimal {
    let digits: String = total_amount
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    match digits.parse::<Decimal>() {
        Ok(value) if value > Decimal::ZERO => value,
        _ => Decimal::ONE,
    }
}

/// Progress toward the goal as a percentage, capped at 100.
pub fn progress_percent(raised: Decimal, goal: Decimal) -> f64 {
    let goal = if goal > Decimal::ZERO { goal } else { Decimal::ONE };
    let ratio = (raised / goal).to_f64().unwrap_or(0.0);
    (ratio * 100.0).min(100.0)
}

/// Discrete size tiers for the patient name headline. Longer names step down
/// so arbitrary input stays inside the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NameScale {
    Display,
    Medium,
    Compact,
}

impl NameScale {
    pub fn css(self) -> &'static str {
        match self {
            NameScale::Display => "clamp(1.8rem, 6vw, 2.6rem)",
            NameScale::Medium => "clamp(1.2rem, 4vw, 1.8rem)",
            NameScale::Compact => "clamp(1rem, 2.5vw, 1.2rem)",
        }
    }
}

pub fn name_scale(name: &str) -> NameScale {
    match name.chars().count() {
        len if len > 35 => NameScale::Compact,
        len if len > 25 => NameScale::Medium,
        _ => NameScale::Display,
    }
}

/// Five size tiers for the story text, largest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StoryScale {
    Lg,
    Md,
    Sm,
    Xs,
    Xxs,
}

impl StoryScale {
    pub fn css(self) -> &'static str {
        match self {
            StoryScale::Lg => "1.05rem",
            StoryScale::Md => "0.95rem",
            StoryScale::Sm => "0.85rem",
            StoryScale::Xs => "0.75rem",
            StoryScale::Xxs => "0.65rem",
        }
    }
}

pub fn story_scale(text: &str) -> StoryScale {
    match text.chars().count() {
        len if len > 1000 => StoryScale::Xxs,
        len if len > 700 => StoryScale::Xs,
        len if len > 400 => StoryScale::Sm,
        len if len > 200 => StoryScale::Md,
        _ => StoryScale::Lg,
    }
}
