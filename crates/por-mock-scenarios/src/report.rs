//! ---
//! por_section: "02-scenario-engine"
//! por_subsection: "module"
//! por_type: "source"
//! por_scope: "code"
//! por_description: "Reserve report data model and payload builders."
//! por_version: "v0.1.0"
//! por_owner: "tbd"
//! ---
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ScenarioError;

/// Largest `size` accepted by [`sized_report`], in KiB.
pub const MAX_SIZED_KIB: u64 = 64 * 1024;

/// Bytes the `padding` member adds on top of its filler: `,"padding":""`.
pub const PADDING_FIELD_OVERHEAD: usize = 13;

const PADDING_FILL: char = 'x';

/// Backing state of a whole report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BackingStatus {
    FullyBacked,
    UnderBacked,
    Error,
}

/// One asset's supply against the reserves held for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveAsset {
    pub asset_id: String,
    pub name: String,
    /// Decimal string with two fractional digits.
    pub total_supply: String,
    /// Decimal string with two fractional digits.
    pub total_reserves: String,
    /// `total_reserves / total_supply`.
    pub reserve_ratio: f64,
    pub unit: String,
    pub last_updated: String,
}

impl ReserveAsset {
    fn new(asset_id: &str, name: &str, supply: f64, reserves: f64, unit: &str, now: &str) -> Self {
        Self {
            asset_id: asset_id.to_owned(),
            name: name.to_owned(),
            total_supply: format!("{supply:.2}"),
            total_reserves: format!("{reserves:.2}"),
            reserve_ratio: reserves / supply,
            unit: unit.to_owned(),
            last_updated: now.to_owned(),
        }
    }
}

/// Document served by the reserves endpoint.
///
/// Field order is part of the wire format: `padding` is always emitted last,
/// which [`PADDING_FIELD_OVERHEAD`] relies on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReserveReport {
    pub timestamp: String,
    pub assets: Vec<ReserveAsset>,
    pub status: BackingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<String>,
}

impl ReserveReport {
    fn new(timestamp: String, assets: Vec<ReserveAsset>, status: BackingStatus) -> Self {
        Self {
            timestamp,
            assets,
            status,
            padding: None,
        }
    }

    /// Compact JSON encoding, identical to what goes on the wire.
    pub fn to_json(&self) -> Result<Vec<u8>, ScenarioError> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Current UTC time as an ISO-8601 string with millisecond precision.
pub fn iso_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Three fully backed assets: two crypto, one fiat-pegged.
pub fn normal_report() -> ReserveReport {
    let now = iso_now();
    let assets = vec![
        ReserveAsset::new("wbtc", "Wrapped Bitcoin", 15_000.0, 15_750.0, "BTC", &now),
        ReserveAsset::new("weth", "Wrapped Ether", 250_000.0, 262_500.0, "ETH", &now),
        ReserveAsset::new("usdx", "USDX Stablecoin", 50_000_000.0, 51_000_000.0, "USD", &now),
    ];
    ReserveReport::new(now, assets, BackingStatus::FullyBacked)
}

/// Two assets each holding 90% of their supply in reserve.
pub fn underbacked_report() -> ReserveReport {
    let now = iso_now();
    let assets = vec![
        ReserveAsset::new("wbtc", "Wrapped Bitcoin", 10_000.0, 9_000.0, "BTC", &now),
        ReserveAsset::new("usdx", "USDX Stablecoin", 1_000_000.0, 900_000.0, "USD", &now),
    ];
    ReserveReport::new(now, assets, BackingStatus::UnderBacked)
}

/// One asset whose reserves (and therefore ratio) are negative.
pub fn negative_report() -> ReserveReport {
    let now = iso_now();
    let assets = vec![ReserveAsset::new(
        "usdx",
        "USDX Stablecoin",
        1_000_000.0,
        -50_000.0,
        "USD",
        &now,
    )];
    ReserveReport::new(now, assets, BackingStatus::Error)
}

fn minimal_report() -> ReserveReport {
    let now = iso_now();
    let assets = vec![ReserveAsset::new(
        "wbtc",
        "Wrapped Bitcoin",
        15_000.0,
        15_750.0,
        "BTC",
        &now,
    )];
    ReserveReport::new(now, assets, BackingStatus::FullyBacked)
}

/// A minimal report padded to at least `target_kib` KiB once encoded.
///
/// The filler length is measured against the report *before* the `padding`
/// member exists, so the encoded size is `target_kib * 1024 +
/// PADDING_FIELD_OVERHEAD` whenever the bare report is smaller than the
/// target.
pub fn sized_report(target_kib: u64) -> Result<ReserveReport, ScenarioError> {
    if target_kib > MAX_SIZED_KIB {
        return Err(ScenarioError::SizeOutOfRange {
            requested: target_kib,
            max: MAX_SIZED_KIB,
        });
    }
    let mut report = minimal_report();
    let base_len = report.to_json()?.len();
    let target = target_kib as usize * 1024;
    let filler = target.saturating_sub(base_len);
    report.padding = Some(std::iter::repeat(PADDING_FILL).take(filler).collect());
    Ok(report)
}
