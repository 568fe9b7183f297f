use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

/// Customer attached to a checkout attempt.
///
/// Used only to pre-fill the mobile-payment phone number and to tag the
/// resulting order; checkout never mutates the customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub loyalty_points: u32,
}

impl Customer {
    pub fn tier(&self) -> LoyaltyTier {
        LoyaltyTier::from_points(self.loyalty_points)
    }
}

/// Loyalty tier, a pure step function of accumulated points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum LoyaltyTier {
    Regular,
    Silver,
    Gold,
    #[strum(serialize = "VIP")]
    #[serde(rename = "VIP")]
    Vip,
}

impl LoyaltyTier {
    pub fn from_points(points: u32) -> Self {
        match points {
            0..=99 => LoyaltyTier::Regular,
            100..=499 => LoyaltyTier::Silver,
            500..=999 => LoyaltyTier::Gold,
            _ => LoyaltyTier::Vip,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries() {
        assert_eq!(LoyaltyTier::from_points(0), LoyaltyTier::Regular);
        assert_eq!(LoyaltyTier::from_points(99), LoyaltyTier::Regular);
        assert_eq!(LoyaltyTier::from_points(100), LoyaltyTier::Silver);
        assert_eq!(LoyaltyTier::from_points(499), LoyaltyTier::Silver);
        assert_eq!(LoyaltyTier::from_points(500), LoyaltyTier::Gold);
        assert_eq!(LoyaltyTier::from_points(999), LoyaltyTier::Gold);
        assert_eq!(LoyaltyTier::from_points(1000), LoyaltyTier::Vip);
        assert_eq!(LoyaltyTier::from_points(u32::MAX), LoyaltyTier::Vip);
    }

    #[test]
    fn vip_display() {
        assert_eq!(LoyaltyTier::Vip.to_string(), "VIP");
    }
}
