use colored::Colorize;
use notify_rust::Notification;
use serde::Serialize;

use crate::analyzer::{AnalysisResult, Bias, StrikeRow};
use crate::config::Settings;
use crate::error::TrackerError;

/// Everything a sink needs for one tick.
#[derive(Debug, Clone, Serialize)]
pub struct TickReport {
    pub timestamp: String,
    pub symbol: String,
    pub spot: f64,
    pub analysis: AnalysisResult,
    pub rows: Vec<StrikeRow>,
}

impl TickReport {
    /// One-line summary used by the notification sink.
    pub fn summary_line(&self) -> String {
        format!(
            "Spot: {} | Bias: {} | Support: {} | Resistance: {}",
            self.spot,
            self.analysis.bias,
            self.analysis.support_strike,
            self.analysis.resistance_strike
        )
    }
}

/// One emit surface for the tick report. A failing sink is logged by the
/// driver and must not affect the other sinks or the next tick.
pub trait LevelSink {
    fn name(&self) -> &'static str;
    fn emit(&mut self, report: &TickReport) -> Result<(), TrackerError>;
}

/// The full sink set for live mode.
pub fn default_sinks(settings: &Settings) -> Vec<Box<dyn LevelSink>> {
    vec![
        Box::new(ConsoleSink),
        Box::new(NotificationSink),
        Box::new(SpreadsheetSink::new(settings.spreadsheet_file.clone())),
        Box::new(PineScriptSink::new(settings.pine_file.clone())),
    ]
}

// -----------------------------------------------
// CONSOLE
// -----------------------------------------------

pub struct ConsoleSink;

impl LevelSink for ConsoleSink {
    fn name(&self) -> &'static str {
        "console"
    }

    fn emit(&mut self, report: &TickReport) -> Result<(), TrackerError> {
        let a = &report.analysis;

        println!(
            "{}",
            format!("======== {} OPTION CHAIN ========", report.symbol).blue()
        );
        println!("Time: {}", report.timestamp);
        println!("Spot: {}", report.spot);
        println!("ATM: {}", a.atm_strike);
        println!(
            "Support: {}  Resistance: {}",
            a.support_strike.to_string().green(),
            a.resistance_strike.to_string().red()
        );
        println!("CALL Buy Level: {:.2}", a.call_buy_level);
        println!("PUT Buy Level: {:.2}", a.put_buy_level);

        let bias = match a.bias {
            Bias::Bullish => a.bias.to_string().green().bold(),
            Bias::Bearish => a.bias.to_string().red().bold(),
            Bias::Range => a.bias.to_string().yellow(),
        };
        println!("Bias: {}", bias);

        println!(
            "{:>8} {:>10} {:>10} {:>10} {:>10} {:>12} {:>12}",
            "Strike", "CE_OI", "PE_OI", "CE_Chg", "PE_Chg", "CE_Real", "PE_Real"
        );
        for row in &report.rows {
            println!(
                "{:>8} {:>10} {:>10} {:>10} {:>10} {:>12} {:>12}",
                row.strike,
                row.call_oi,
                row.put_oi,
                row.call_oi_change,
                row.put_oi_change,
                row.call_oi_real_change,
                row.put_oi_real_change
            );
        }
        println!("{}", "=".repeat(35).blue());

        Ok(())
    }
}

// -----------------------------------------------
// DESKTOP NOTIFICATION
// -----------------------------------------------

pub struct NotificationSink;

impl LevelSink for NotificationSink {
    fn name(&self) -> &'static str {
        "notification"
    }

    fn emit(&mut self, report: &TickReport) -> Result<(), TrackerError> {
        Notification::new()
            .summary(&format!("{} OI Summary", report.symbol))
            .body(&report.summary_line())
            .show()?;

        Ok(())
    }
}

// -----------------------------------------------
// SPREADSHEET (CSV)
// -----------------------------------------------

/// Writes the per-strike window plus a summary section, replacing the file
/// wholesale each tick.
pub struct SpreadsheetSink {
    path: String,
}

impl SpreadsheetSink {
    pub fn new(path: String) -> Self {
        Self { path }
    }
}

impl LevelSink for SpreadsheetSink {
    fn name(&self) -> &'static str {
        "spreadsheet"
    }

    fn emit(&mut self, report: &TickReport) -> Result<(), TrackerError> {
        let data = render_csv(report)?;
        std::fs::write(&self.path, data)?;
        Ok(())
    }
}

pub fn render_csv(report: &TickReport) -> Result<Vec<u8>, TrackerError> {
    let a = &report.analysis;
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(vec![]);

    wtr.write_record([
        "Strike",
        "CE_OI",
        "PE_OI",
        "CE_Change",
        "PE_Change",
        "CE_RealChange",
        "PE_RealChange",
    ])?;
    for row in &report.rows {
        wtr.write_record(&[
            row.strike.to_string(),
            row.call_oi.to_string(),
            row.put_oi.to_string(),
            row.call_oi_change.to_string(),
            row.put_oi_change.to_string(),
            row.call_oi_real_change.to_string(),
            row.put_oi_real_change.to_string(),
        ])?;
    }

    // blank line between the strike table and the summary section
    wtr.write_record([""])?;

    wtr.write_record([
        "Time",
        "Spot",
        "ATM",
        "Support",
        "Resistance",
        "CALL_Buy_Level",
        "PUT_Buy_Level",
        "Bias",
    ])?;
    wtr.write_record(&[
        report.timestamp.clone(),
        report.spot.to_string(),
        a.atm_strike.to_string(),
        a.support_strike.to_string(),
        a.resistance_strike.to_string(),
        format!("{:.2}", a.call_buy_level),
        format!("{:.2}", a.put_buy_level),
        a.bias.to_string(),
    ])?;

    wtr.flush()?;
    wtr.into_inner()
        .map_err(|e| TrackerError::SinkWrite(e.to_string()))
}

// -----------------------------------------------
// PINE SCRIPT
// -----------------------------------------------

/// Regenerates the charting-tool script with the five levels embedded as
/// literals. Full overwrite each tick.
pub struct PineScriptSink {
    path: String,
}

impl PineScriptSink {
    pub fn new(path: String) -> Self {
        Self { path }
    }
}

impl LevelSink for PineScriptSink {
    fn name(&self) -> &'static str {
        "pine-script"
    }

    fn emit(&mut self, report: &TickReport) -> Result<(), TrackerError> {
        let script = render_pine(&report.symbol, &report.analysis);
        std::fs::write(&self.path, script)?;
        Ok(())
    }
}

pub fn render_pine(symbol: &str, a: &AnalysisResult) -> String {
    format!(
        r#"//@version=6
indicator("{symbol} OI Signal Tracker (AUTO)", overlay=true)

// ===== AUTO GENERATED LEVELS =====
atm        = input.int({atm}, "ATM Strike")
support    = input.int({support}, "Support")
resistance = input.int({resistance}, "Resistance")
callLevel  = input.float({call_level:.2}, "CALL Buy Level")
putLevel   = input.float({put_level:.2}, "PUT Buy Level")

spot = hl2

// ===== BIAS LOGIC =====
bias =
     spot > resistance ? "BULLISH" :
     spot < support    ? "BEARISH" :
                          "RANGE / NO TRADE"

// ===== LEVEL PLOTS =====
plot(support, title="Support", color=color.green, linewidth=2)
plot(resistance, title="Resistance", color=color.red, linewidth=2)
plot(callLevel, title="CALL Level", color=color.blue, linewidth=2)
plot(putLevel, title="PUT Level", color=color.orange, linewidth=2)

// ===== BACKGROUND TREND =====
bgcolor(
     bias == "BULLISH" ? color.new(color.green, 85) :
     bias == "BEARISH" ? color.new(color.red, 85) :
                         na
)

// ===== SINGLE LIVE LABEL =====
var label biasLabel = na

if barstate.islast
    label.delete(biasLabel)

    biasLabel := label.new(
        bar_index,
        spot,
        bias,
        style = label.style_label_down,
        color = color.yellow,
        textcolor = color.black
    )
"#,
        symbol = symbol,
        atm = a.atm_strike,
        support = a.support_strike,
        resistance = a.resistance_strike,
        call_level = a.call_buy_level,
        put_level = a.put_buy_level,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> TickReport {
        TickReport {
            timestamp: "10:15:00".to_string(),
            symbol: "NIFTY".to_string(),
            spot: 19450.0,
            analysis: AnalysisResult {
                atm_strike: 19450,
                support_strike: 19400,
                resistance_strike: 19500,
                call_buy_level: 19520.0,
                put_buy_level: 19380.0,
                bias: Bias::Range,
            },
            rows: vec![
                StrikeRow {
                    strike: 19400,
                    call_oi: 150.0,
                    put_oi: 900.0,
                    call_oi_change: 15.0,
                    put_oi_change: 90.0,
                    call_oi_real_change: 5.0,
                    put_oi_real_change: -3.0,
                },
                StrikeRow {
                    strike: 19450,
                    call_oi: 200.0,
                    put_oi: 300.0,
                    call_oi_change: 20.0,
                    put_oi_change: 30.0,
                    call_oi_real_change: 0.0,
                    put_oi_real_change: 0.0,
                },
            ],
        }
    }

    #[test]
    fn test_render_pine_embeds_levels() {
        let report = report();
        let pine = render_pine(&report.symbol, &report.analysis);

        assert!(pine.contains(r#"indicator("NIFTY OI Signal Tracker (AUTO)", overlay=true)"#));
        assert!(pine.contains(r#"input.int(19450, "ATM Strike")"#));
        assert!(pine.contains(r#"input.int(19400, "Support")"#));
        assert!(pine.contains(r#"input.int(19500, "Resistance")"#));
        assert!(pine.contains(r#"input.float(19520.00, "CALL Buy Level")"#));
        assert!(pine.contains(r#"input.float(19380.00, "PUT Buy Level")"#));
    }

    #[test]
    fn test_render_csv_has_table_and_summary() {
        let data = render_csv(&report()).unwrap();
        let text = String::from_utf8(data).unwrap();

        assert!(text.starts_with(
            "Strike,CE_OI,PE_OI,CE_Change,PE_Change,CE_RealChange,PE_RealChange"
        ));
        assert!(text.contains("19400,150,900,15,90,5,-3"));
        assert!(text.contains("Time,Spot,ATM,Support,Resistance,CALL_Buy_Level,PUT_Buy_Level,Bias"));
        assert!(text.contains("10:15:00,19450,19450,19400,19500,19520.00,19380.00,RANGE / NO TRADE"));
    }

    #[test]
    fn test_summary_line() {
        assert_eq!(
            report().summary_line(),
            "Spot: 19450 | Bias: RANGE / NO TRADE | Support: 19400 | Resistance: 19500"
        );
    }
}
