use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// -----------------------------------------------
// WIRE FORMAT (option-chain-indices endpoint)
// -----------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionChain {
    pub records: Records,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Records {
    pub timestamp: String,

    #[serde(rename = "underlyingValue")]
    pub underlying_value: f64,

    pub data: Vec<OptionData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionData {
    #[serde(rename = "strikePrice")]
    pub strike_price: f64,

    #[serde(rename = "CE")]
    pub call: Option<OptionDetail>,

    #[serde(rename = "PE")]
    pub put: Option<OptionDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionDetail {
    #[serde(rename = "openInterest")]
    pub open_interest: f64,

    #[serde(rename = "changeinOpenInterest")]
    pub change_in_oi: f64,
}

// -----------------------------------------------
// DOMAIN SNAPSHOT
// -----------------------------------------------

/// Open-interest figures for one strike.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StrikeOi {
    pub call_oi: f64,
    pub put_oi: f64,
    pub call_oi_change: f64,
    pub put_oi_change: f64,
}

/// One tick's capture of the chain: spot price plus per-strike OI figures
/// keyed on the integer strike grid. Immutable once built.
#[derive(Debug, Clone)]
pub struct OptionChainSnapshot {
    pub spot: f64,
    pub timestamp: String,
    pub strikes: BTreeMap<i64, StrikeOi>,
}

impl OptionChain {
    /// Collapse the raw records onto the strike grid. A missing CE or PE leg
    /// leaves that side at zero; the feed lists one entry per strike+expiry,
    /// so later entries for the same strike overwrite earlier ones.
    pub fn to_snapshot(&self) -> OptionChainSnapshot {
        let mut strikes: BTreeMap<i64, StrikeOi> = BTreeMap::new();

        for item in &self.records.data {
            let slot = strikes.entry(item.strike_price.round() as i64).or_default();

            if let Some(ce) = &item.call {
                slot.call_oi = ce.open_interest;
                slot.call_oi_change = ce.change_in_oi;
            }
            if let Some(pe) = &item.put {
                slot.put_oi = pe.open_interest;
                slot.put_oi_change = pe.change_in_oi;
            }
        }

        OptionChainSnapshot {
            spot: self.records.underlying_value,
            timestamp: self.records.timestamp.clone(),
            strikes,
        }
    }
}
