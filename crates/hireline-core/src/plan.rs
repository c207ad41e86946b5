//! Subscription plan types.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Who a subscription plan is sold to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanAudience {
    Employee,
    Employer,
}

impl PlanAudience {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanAudience::Employee => "employee",
            PlanAudience::Employer => "employer",
        }
    }
}

impl std::str::FromStr for PlanAudience {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "employee" => Ok(PlanAudience::Employee),
            "employer" => Ok(PlanAudience::Employer),
            other => Err(Error::InvalidInput(format!("unknown plan audience: {}", other))),
        }
    }
}

/// Validate the pricing fields of a plan before it is written.
pub fn validate_pricing(price_cents: i64, currency: &str, duration_days: i32) -> Result<()> {
    if price_cents < 0 {
        return Err(Error::InvalidInput(
            "price_cents must not be negative".to_string(),
        ));
    }
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(Error::InvalidInput(format!(
            "currency must be a three letter ISO code, got '{}'",
            currency
        )));
    }
    if duration_days <= 0 {
        return Err(Error::InvalidInput(
            "duration_days must be positive".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audience_round_trip_through_str() {
        assert_eq!("employer".parse::<PlanAudience>().unwrap(), PlanAudience::Employer);
        assert!("recruiter".parse::<PlanAudience>().is_err());
    }

    #[test]
    fn test_validate_pricing() {
        assert!(validate_pricing(0, "USD", 30).is_ok());
        assert!(validate_pricing(-1, "USD", 30).is_err());
        assert!(validate_pricing(100, "usd", 30).is_err());
        assert!(validate_pricing(100, "EURO", 30).is_err());
        assert!(validate_pricing(100, "INR", 0).is_err());
    }
}
