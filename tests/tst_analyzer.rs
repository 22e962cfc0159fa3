use nse_oi_tracker::analyzer::{self, Bias, OiByStrike};
use nse_oi_tracker::models::OptionChain;

#[cfg(test)]
mod tests {
    use super::*;

    /// Chain JSON the way the indices endpoint serves it.
    fn sample_chain() -> OptionChain {
        serde_json::from_value(serde_json::json!({
            "records": {
                "timestamp": "06-Aug-2026 10:15:00",
                "underlyingValue": 19450.0,
                "data": [
                    {
                        "strikePrice": 19350.0,
                        "CE": { "openInterest": 1000.0, "changeinOpenInterest": 100.0 },
                        "PE": { "openInterest": 4000.0, "changeinOpenInterest": 400.0 }
                    },
                    {
                        "strikePrice": 19400.0,
                        "CE": { "openInterest": 1500.0, "changeinOpenInterest": 150.0 },
                        "PE": { "openInterest": 9000.0, "changeinOpenInterest": 900.0 }
                    },
                    {
                        "strikePrice": 19450.0,
                        "CE": { "openInterest": 2000.0, "changeinOpenInterest": 200.0 },
                        "PE": { "openInterest": 3000.0, "changeinOpenInterest": 300.0 }
                    },
                    {
                        "strikePrice": 19500.0,
                        "CE": { "openInterest": 9500.0, "changeinOpenInterest": 950.0 },
                        "PE": { "openInterest": 1000.0, "changeinOpenInterest": 100.0 }
                    },
                    {
                        "strikePrice": 19550.0,
                        "CE": { "openInterest": 5000.0, "changeinOpenInterest": 500.0 },
                        "PE": { "openInterest": 500.0, "changeinOpenInterest": 50.0 }
                    }
                ]
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_levels_from_wire_chain() {
        let snapshot = sample_chain().to_snapshot();
        let result = analyzer::analyze(&snapshot, 50, 2).unwrap();

        assert_eq!(result.atm_strike, 19450);
        assert_eq!(result.support_strike, 19400);
        assert_eq!(result.resistance_strike, 19500);
        assert_eq!(result.call_buy_level, 19520.0);
        assert_eq!(result.put_buy_level, 19380.0);
        assert_eq!(result.bias, Bias::Range);
    }

    #[test]
    fn test_unchanged_snapshot_gives_unchanged_result() {
        let snapshot = sample_chain().to_snapshot();

        let first = analyzer::analyze(&snapshot, 50, 2).unwrap();
        let second = analyzer::analyze(&snapshot, 50, 2).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_oi_state_threads_across_ticks() {
        let snapshot = sample_chain().to_snapshot();
        let atm = analyzer::atm_strike(snapshot.spot, 50);
        let rows = analyzer::collect_window(&snapshot, atm, 50, 2);

        let (state, rows) = analyzer::track_oi_deltas(&OiByStrike::new(), &rows);
        assert!(rows.iter().all(|r| r.call_oi_real_change == 0.0));

        // second tick with CE OI up 250 lots at the resistance strike
        let mut chain = sample_chain();
        for item in &mut chain.records.data {
            if item.strike_price == 19500.0 {
                item.call.as_mut().unwrap().open_interest += 250.0;
            }
        }
        let rows = analyzer::collect_window(&chain.to_snapshot(), atm, 50, 2);
        let (_, rows) = analyzer::track_oi_deltas(&state, &rows);

        let moved = rows.iter().find(|r| r.strike == 19500).unwrap();
        assert_eq!(moved.call_oi_real_change, 250.0);
        assert_eq!(moved.put_oi_real_change, 0.0);
    }

    #[test]
    fn test_window_strikes_missing_from_feed() {
        // feed only knows the ATM strike; the rest of the window defaults
        let chain: OptionChain = serde_json::from_value(serde_json::json!({
            "records": {
                "timestamp": "06-Aug-2026 10:15:00",
                "underlyingValue": 19462.4,
                "data": [
                    {
                        "strikePrice": 19450.0,
                        "CE": { "openInterest": 100.0, "changeinOpenInterest": 10.0 },
                        "PE": { "openInterest": 100.0, "changeinOpenInterest": 10.0 }
                    }
                ]
            }
        }))
        .unwrap();

        let result = analyzer::analyze(&chain.to_snapshot(), 50, 4).unwrap();
        assert_eq!(result.atm_strike, 19450);
        assert_eq!(result.support_strike, 19450);
        assert_eq!(result.resistance_strike, 19450);
        // both levels collapse onto ATM and the spot sits above them
        assert_eq!(result.bias, Bias::Bullish);
    }
}
