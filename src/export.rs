// 📤 Exports - comparables CSV, JSON report bundle, plain-text CMA report

use crate::calc::{PropertyMetrics, RepairRoi};
use crate::entities::{ComparableListing, Condition, PropertyRecord};
use crate::validation::{format_thousands, round_half_up};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const CSV_HEADER: [&str; 10] = [
    "Address",
    "Status",
    "List Price",
    "Sold Price",
    "Beds",
    "Baths",
    "Sq Ft",
    "Price/Sq Ft",
    "Days on Market",
    "Condition",
];

pub const REPORT_TITLE: &str = "CMA Dashboard - CMA Report";
const RECOMMENDATIONS_LINE: &str = "Based on market analysis and property condition";

// ============================================================================
// CSV
// ============================================================================

/// All comparables, subject included, one row each.
pub fn comparables_csv(comparables: &[ComparableListing]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(CSV_HEADER)?;

    for c in comparables {
        wtr.write_record([
            c.address.clone(),
            c.status.as_str().to_string(),
            c.list_price.to_string(),
            c.sold_price.map(|p| p.to_string()).unwrap_or_default(),
            c.beds.to_string(),
            c.baths.to_string(),
            c.sqft.to_string(),
            c.price_per_sqft.to_string(),
            c.days_on_market.to_string(),
            c.condition.as_str().to_string(),
        ])?;
    }

    let bytes = wtr.into_inner().context("Failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output was not UTF-8")
}

pub fn write_comparables_csv(path: &Path, comparables: &[ComparableListing]) -> Result<()> {
    let csv = comparables_csv(comparables)?;
    fs::write(path, csv).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), rows = comparables.len(), "comparables exported");
    Ok(())
}

// ============================================================================
// REPORT BUNDLE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportProperty {
    pub address: String,
    pub list_price: f64,
    pub sqft: f64,
    pub condition: Condition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetrics {
    pub estimated_value: f64,
    pub avg_price_per_sqft: f64,
    pub appreciation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRepairs {
    pub total_investment: f64,
    pub total_value_added: f64,
    #[serde(rename = "netROI")]
    pub net_roi: f64,
    pub time_reduction: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportBundle {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub property: ReportProperty,
    pub metrics: ReportMetrics,
    pub repairs: ReportRepairs,
    pub comparables: Vec<ComparableListing>,
    pub recommendations: String,
}

impl ReportBundle {
    pub fn build(
        property: &PropertyRecord,
        metrics: &PropertyMetrics,
        roi: &RepairRoi,
        comparables: &[ComparableListing],
        generated_at: DateTime<Utc>,
    ) -> Self {
        ReportBundle {
            title: REPORT_TITLE.to_string(),
            generated_at,
            property: ReportProperty {
                address: property.address.clone(),
                list_price: property.list_price,
                sqft: property.sqft,
                condition: property.condition,
            },
            metrics: ReportMetrics {
                estimated_value: metrics.estimated_value,
                avg_price_per_sqft: metrics.avg_price_per_sqft,
                appreciation: metrics.appreciation_percent,
            },
            repairs: ReportRepairs {
                total_investment: roi.total_investment,
                total_value_added: roi.value_added,
                net_roi: roi.net_roi,
                time_reduction: roi.time_reduction_days,
            },
            comparables: comparables.iter().filter(|c| !c.is_subject()).cloned().collect(),
            recommendations: RECOMMENDATIONS_LINE.to_string(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize report")
    }

    /// Plain-text CMA report.
    pub fn to_text(&self) -> String {
        format!(
            "CMA Report\n\nProperty: {}\nGenerated: {}\n\nEstimated Value: ${}\nList Price: ${}\n",
            self.property.address,
            self.generated_at.format("%Y-%m-%d"),
            format_thousands(round_half_up(self.metrics.estimated_value) as i64),
            format_thousands(round_half_up(self.property.list_price) as i64),
        )
    }

    /// `CMA_Report_<date>.<ext>`
    pub fn file_name(&self, extension: &str) -> String {
        format!("CMA_Report_{}.{}", self.generated_at.format("%Y-%m-%d"), extension)
    }

    /// Write the JSON bundle and the text report side by side into `dir`.
    pub fn write_to_dir(&self, dir: &Path) -> Result<(PathBuf, PathBuf)> {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

        let json_path = dir.join(self.file_name("json"));
        fs::write(&json_path, self.to_json()?)
            .with_context(|| format!("Failed to write {}", json_path.display()))?;

        let text_path = dir.join(self.file_name("txt"));
        fs::write(&text_path, self.to_text())
            .with_context(|| format!("Failed to write {}", text_path.display()))?;

        info!(json = %json_path.display(), text = %text_path.display(), "report exported");
        Ok((json_path, text_path))
    }
}
