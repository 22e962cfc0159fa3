use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::TrackerError;
use crate::models::OptionChainSnapshot;

/// Fraction of the strike gap beyond resistance (below support) at which the
/// breakout buy levels sit.
pub const BUY_LEVEL_GAP_FRACTION: f64 = 0.4;

/// Directional read of the spot against the derived levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Bias {
    Bullish,
    Bearish,
    Range,
}

impl std::fmt::Display for Bias {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Bias::Bullish => write!(f, "BULLISH"),
            Bias::Bearish => write!(f, "BEARISH"),
            Bias::Range => write!(f, "RANGE / NO TRADE"),
        }
    }
}

/// One strike of the analysis window. Real-change fields stay zero until
/// [`track_oi_deltas`] fills them from the previous tick's state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StrikeRow {
    pub strike: i64,
    pub call_oi: f64,
    pub put_oi: f64,
    pub call_oi_change: f64,
    pub put_oi_change: f64,
    pub call_oi_real_change: f64,
    pub put_oi_real_change: f64,
}

/// Levels derived from one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub atm_strike: i64,
    pub support_strike: i64,
    pub resistance_strike: i64,
    pub call_buy_level: f64,
    pub put_buy_level: f64,
    pub bias: Bias,
}

/// Derive ATM, support/resistance, buy levels and bias from one snapshot.
///
/// Pure and deterministic. Strikes missing from the snapshot contribute
/// zeros; the only error conditions are a malformed spot or configuration.
pub fn analyze(
    snapshot: &OptionChainSnapshot,
    gap: i64,
    range: i64,
) -> Result<AnalysisResult, TrackerError> {
    validate(snapshot.spot, gap, range)?;

    let atm = atm_strike(snapshot.spot, gap);
    let rows = collect_window(snapshot, atm, gap, range);

    let support = support_strike(&rows, atm);
    let resistance = resistance_strike(&rows, atm);

    Ok(AnalysisResult {
        atm_strike: atm,
        support_strike: support,
        resistance_strike: resistance,
        call_buy_level: resistance as f64 + BUY_LEVEL_GAP_FRACTION * gap as f64,
        put_buy_level: support as f64 - BUY_LEVEL_GAP_FRACTION * gap as f64,
        bias: classify_bias(snapshot.spot, support, resistance),
    })
}

fn validate(spot: f64, gap: i64, range: i64) -> Result<(), TrackerError> {
    if !spot.is_finite() || spot <= 0.0 {
        return Err(TrackerError::InvalidSnapshot(format!(
            "spot price {} is not a finite positive number",
            spot
        )));
    }
    if gap <= 0 {
        return Err(TrackerError::InvalidSnapshot(format!(
            "strike gap {} must be positive",
            gap
        )));
    }
    if range < 1 {
        return Err(TrackerError::InvalidSnapshot(format!(
            "strike range {} must be at least 1",
            range
        )));
    }
    Ok(())
}

/// Nearest grid strike to the spot. `f64::round` rounds half away from zero,
/// so a spot exactly between two strikes resolves to the upper one.
pub fn atm_strike(spot: f64, gap: i64) -> i64 {
    (spot / gap as f64).round() as i64 * gap
}

/// The `2*range + 1` strikes `atm ± k*gap`, ascending. Strikes absent from
/// the snapshot yield all-zero rows rather than an error.
pub fn collect_window(
    snapshot: &OptionChainSnapshot,
    atm: i64,
    gap: i64,
    range: i64,
) -> Vec<StrikeRow> {
    (-range..=range)
        .map(|k| {
            let strike = atm + k * gap;
            let oi = snapshot.strikes.get(&strike).copied().unwrap_or_default();

            StrikeRow {
                strike,
                call_oi: oi.call_oi,
                put_oi: oi.put_oi,
                call_oi_change: oi.call_oi_change,
                put_oi_change: oi.put_oi_change,
                call_oi_real_change: 0.0,
                put_oi_real_change: 0.0,
            }
        })
        .collect()
}

/// Strike at or below ATM with the largest put-side OI change.
/// Rows are ascending, so replacing on `>=` leaves the strike nearest ATM
/// when two strikes tie.
fn support_strike(rows: &[StrikeRow], atm: i64) -> i64 {
    let mut best: Option<(i64, f64)> = None;

    for row in rows.iter().filter(|r| r.strike <= atm) {
        match best {
            Some((_, change)) if row.put_oi_change < change => {}
            _ => best = Some((row.strike, row.put_oi_change)),
        }
    }

    best.map(|(strike, _)| strike).unwrap_or(atm)
}

/// Strike at or above ATM with the largest call-side OI change.
/// Rows are ascending, so keeping the first maximum (`>` to replace) leaves
/// the strike nearest ATM when two strikes tie.
fn resistance_strike(rows: &[StrikeRow], atm: i64) -> i64 {
    let mut best: Option<(i64, f64)> = None;

    for row in rows.iter().filter(|r| r.strike >= atm) {
        match best {
            Some((_, change)) if row.call_oi_change <= change => {}
            _ => best = Some((row.strike, row.call_oi_change)),
        }
    }

    best.map(|(strike, _)| strike).unwrap_or(atm)
}

/// Bias is judged against the spot itself, not the buy levels.
fn classify_bias(spot: f64, support: i64, resistance: i64) -> Bias {
    if spot > resistance as f64 {
        Bias::Bullish
    } else if spot < support as f64 {
        Bias::Bearish
    } else {
        Bias::Range
    }
}

// -----------------------------------------------
// TICK-OVER-TICK OI DELTA
// -----------------------------------------------

/// Last-seen call/put OI for one strike.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OiPair {
    pub call_oi: f64,
    pub put_oi: f64,
}

/// Last-seen OI per window strike, owned by the caller and threaded through
/// each tick. Starts empty at process start.
pub type OiByStrike = BTreeMap<i64, OiPair>;

/// Fill each row's real-change fields from the previous tick's OI and return
/// the state for the next tick. A strike with no previous entry (first tick,
/// or the window shifted onto it) reports zero real change.
pub fn track_oi_deltas(previous: &OiByStrike, rows: &[StrikeRow]) -> (OiByStrike, Vec<StrikeRow>) {
    let mut next = OiByStrike::new();

    let updated = rows
        .iter()
        .map(|row| {
            let mut row = *row;

            if let Some(prev) = previous.get(&row.strike) {
                row.call_oi_real_change = row.call_oi - prev.call_oi;
                row.put_oi_real_change = row.put_oi - prev.put_oi;
            }

            next.insert(
                row.strike,
                OiPair {
                    call_oi: row.call_oi,
                    put_oi: row.put_oi,
                },
            );

            row
        })
        .collect();

    (next, updated)
}
