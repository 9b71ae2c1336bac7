//! Post-run aggregation reports (§4.8): summary, per-player, per-machine.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::SinkResult;
use crate::record::SessionRecord;

#[derive(Debug, Clone, Default)]
struct Accumulator {
    session_count: u64,
    total_bet: f64,
    total_win: f64,
    total_profit: f64,
    total_duration: f64,
    max_win: f64,
    worst_profit: f64,
    free_spins_triggered: u64,
    total_spins: u64,
}

impl Accumulator {
    fn add(&mut self, record: &SessionRecord) {
        self.session_count += 1;
        self.total_bet += record.total_bet;
        self.total_win += record.total_win;
        self.total_profit += record.total_profit;
        self.total_duration += record.session_duration;
        self.max_win = self.max_win.max(record.max_win);
        if self.session_count == 1 {
            self.worst_profit = record.total_profit;
        } else {
            self.worst_profit = self.worst_profit.min(record.total_profit);
        }
        self.free_spins_triggered += record.free_spins_triggered as u64;
        self.total_spins += record.total_spins;
    }

    fn rtp(&self) -> f64 {
        if self.total_bet > 0.0 {
            self.total_win / self.total_bet
        } else {
            0.0
        }
    }

    fn average_rtp(&self, session_count: u64) -> f64 {
        if session_count > 0 {
            self.rtp()
        } else {
            0.0
        }
    }

    fn average_duration(&self) -> f64 {
        if self.session_count > 0 {
            self.total_duration / self.session_count as f64
        } else {
            0.0
        }
    }

    fn free_spin_trigger_rate(&self) -> f64 {
        if self.total_spins > 0 {
            self.free_spins_triggered as f64 / self.total_spins as f64
        } else {
            0.0
        }
    }
}

/// Read every session record back from `session_stats_path` and write
/// `summary.txt`, `player_report.csv`, `machine_report.csv` under
/// `reports_dir` (§4.8, §6).
pub fn generate_reports(session_stats_path: &Path, reports_dir: &Path) -> SinkResult<()> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(session_stats_path)?;

    let mut overall = Accumulator::default();
    let mut by_player: BTreeMap<String, Accumulator> = BTreeMap::new();
    let mut by_machine: BTreeMap<String, Accumulator> = BTreeMap::new();

    for row in reader.records() {
        let row = row?;
        let Some(record) = SessionRecord::from_row(&row) else {
            continue;
        };
        overall.add(&record);
        by_player.entry(record.player_id.clone()).or_default().add(&record);
        by_machine.entry(record.machine_id.clone()).or_default().add(&record);
    }

    write_summary(reports_dir, &overall)?;
    write_player_report(reports_dir, &by_player)?;
    write_machine_report(reports_dir, &by_machine)?;
    Ok(())
}

fn write_summary(reports_dir: &Path, overall: &Accumulator) -> SinkResult<()> {
    let mut file = File::create(reports_dir.join("summary.txt"))?;
    writeln!(file, "sessions: {}", overall.session_count)?;
    writeln!(file, "total_bet: {:.6}", overall.total_bet)?;
    writeln!(file, "total_win: {:.6}", overall.total_win)?;
    writeln!(file, "total_profit: {:.6}", overall.total_profit)?;
    writeln!(file, "rtp: {:.6}", overall.rtp())?;
    writeln!(file, "average_session_duration: {:.6}", overall.average_duration())?;
    Ok(())
}

fn write_player_report(reports_dir: &Path, by_player: &BTreeMap<String, Accumulator>) -> SinkResult<()> {
    let mut writer = csv::Writer::from_path(reports_dir.join("player_report.csv"))?;
    writer.write_record([
        "player_id",
        "session_count",
        "total_bet",
        "total_win",
        "total_profit",
        "average_rtp",
        "max_win",
        "worst_profit",
    ])?;
    for (player_id, acc) in by_player {
        writer.write_record([
            player_id.clone(),
            acc.session_count.to_string(),
            format!("{:.6}", acc.total_bet),
            format!("{:.6}", acc.total_win),
            format!("{:.6}", acc.total_profit),
            format!("{:.6}", acc.average_rtp(acc.session_count)),
            format!("{:.6}", acc.max_win),
            format!("{:.6}", acc.worst_profit),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_machine_report(reports_dir: &Path, by_machine: &BTreeMap<String, Accumulator>) -> SinkResult<()> {
    let mut writer = csv::Writer::from_path(reports_dir.join("machine_report.csv"))?;
    writer.write_record([
        "machine_id",
        "session_count",
        "total_bet",
        "total_win",
        "average_rtp",
        "free_spin_trigger_rate",
        "average_session_duration",
    ])?;
    for (machine_id, acc) in by_machine {
        writer.write_record([
            machine_id.clone(),
            acc.session_count.to_string(),
            format!("{:.6}", acc.total_bet),
            format!("{:.6}", acc.total_win),
            format!("{:.6}", acc.average_rtp(acc.session_count)),
            format!("{:.6}", acc.free_spin_trigger_rate()),
            format!("{:.6}", acc.average_duration()),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
