//! Investors and the vehicle units they fund.

use crate::domain::primitives::text_enum;
use crate::domain::{Decimal, InvestorId, UnitId};
use serde::{Deserialize, Serialize};

text_enum!(
    /// Availability of a unit.
    UnitStatus, "unit status" {
        Available => "AVAILABLE",
        Sold => "SOLD",
        Maintenance => "MAINTENANCE",
    }
);

/// A funding party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Investor {
    pub id: InvestorId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Investor's default share of positive net margin, in percent.
    pub profit_share_percentage: Decimal,
}

impl Investor {
    /// The manager's default share: the complement of the investor's.
    pub fn manager_share_percentage(&self) -> Decimal {
        Decimal::hundred() - self.profit_share_percentage
    }
}

/// A vehicle being flipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: UnitId,
    pub investor_id: InvestorId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plate_number: Option<String>,
    pub status: UnitStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_manager_share_is_complement() {
        let investor = Investor {
            id: InvestorId::new(),
            name: "Budi".to_string(),
            phone: None,
            email: None,
            profit_share_percentage: Decimal::from(40),
        };
        assert_eq!(investor.manager_share_percentage(), Decimal::from(60));
    }

    #[test]
    fn test_unit_status_labels() {
        assert_eq!(UnitStatus::Available.as_str(), "AVAILABLE");
        assert_eq!(UnitStatus::from_str("SOLD").unwrap(), UnitStatus::Sold);
        assert!(UnitStatus::from_str("sold").is_err());
    }
}
