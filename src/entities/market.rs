// 📈 Market trend reference data (static, regional)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketTrendPoint {
    pub month: String,
    pub avg_price: f64,
    pub inventory: u32,
    pub sold_count: u32,
    pub days_on_market: u32,
}

impl MarketTrendPoint {
    fn new(month: &str, avg_price: f64, inventory: u32, sold_count: u32, days_on_market: u32) -> Self {
        MarketTrendPoint {
            month: month.to_string(),
            avg_price,
            inventory,
            sold_count,
            days_on_market,
        }
    }

    /// Months of supply at the current sales pace.
    pub fn months_of_supply(&self) -> f64 {
        if self.sold_count == 0 {
            0.0
        } else {
            self.inventory as f64 / self.sold_count as f64
        }
    }
}

pub fn market_trends() -> Vec<MarketTrendPoint> {
    vec![
        MarketTrendPoint::new("Feb 2025", 440_000.0, 7200, 1800, 42),
        MarketTrendPoint::new("Mar 2025", 445_000.0, 7800, 1950, 40),
        MarketTrendPoint::new("Apr 2025", 448_000.0, 8200, 2100, 38),
        MarketTrendPoint::new("May 2025", 442_000.0, 8900, 1750, 41),
        MarketTrendPoint::new("Jun 2025", 437_000.0, 9390, 1600, 45),
        MarketTrendPoint::new("Jul 2025", 430_000.0, 4819, 788, 48),
        MarketTrendPoint::new("Aug 2025", 430_000.0, 4117, 750, 43),
    ]
}

/// Percent change of the average price from the first to the last month.
pub fn price_change_percent(points: &[MarketTrendPoint]) -> f64 {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) if first.avg_price > 0.0 => {
            (last.avg_price - first.avg_price) / first.avg_price * 100.0
        }
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trend_table() {
        let trends = market_trends();
        assert_eq!(trends.len(), 7);
        assert_eq!(trends[0].month, "Feb 2025");
        assert_eq!(trends[6].days_on_market, 43);
    }

    #[test]
    fn test_price_change_and_supply() {
        let trends = market_trends();
        let change = price_change_percent(&trends);
        assert!((change - (-2.2727)).abs() < 0.001);

        assert!((trends[0].months_of_supply() - 4.0).abs() < f64::EPSILON);
        assert_eq!(price_change_percent(&[]), 0.0);
    }
}
