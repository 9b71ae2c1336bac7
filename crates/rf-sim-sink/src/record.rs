//! Session and spin record shapes, and their fixed-point CSV rendering
//! (§6 "Filesystem outputs").

/// Render a float with exactly 6 decimal places (§6 "All numeric fields
/// use fixed-point formatting with 6 decimals").
fn fixed6(value: f64) -> String {
    format!("{value:.6}")
}

/// One completed session, published immutably at session end (§3 "Session
/// record").
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub session_id: u64,
    pub player_id: String,
    pub machine_id: String,
    pub total_spins: u64,
    pub total_bet: f64,
    pub total_win: f64,
    pub total_profit: f64,
    pub initial_balance: f64,
    pub final_balance: f64,
    pub session_duration: f64,
    pub free_spins_triggered: u32,
    pub free_spins_played: u32,
    pub max_win: f64,
    pub max_loss_streak: u32,
    pub rtp: f64,
}

impl SessionRecord {
    pub const HEADER: [&'static str; 15] = [
        "session_id",
        "player_id",
        "machine_id",
        "total_spins",
        "total_bet",
        "total_win",
        "total_profit",
        "initial_balance",
        "final_balance",
        "session_duration",
        "free_spins_triggered",
        "free_spins_played",
        "max_win",
        "max_loss_streak",
        "rtp",
    ];

    pub fn to_row(&self) -> [String; 15] {
        [
            self.session_id.to_string(),
            self.player_id.clone(),
            self.machine_id.clone(),
            self.total_spins.to_string(),
            fixed6(self.total_bet),
            fixed6(self.total_win),
            fixed6(self.total_profit),
            fixed6(self.initial_balance),
            fixed6(self.final_balance),
            fixed6(self.session_duration),
            self.free_spins_triggered.to_string(),
            self.free_spins_played.to_string(),
            fixed6(self.max_win),
            self.max_loss_streak.to_string(),
            fixed6(self.rtp),
        ]
    }

    pub fn from_row(row: &csv::StringRecord) -> Option<Self> {
        Some(Self {
            session_id: row.get(0)?.parse().ok()?,
            player_id: row.get(1)?.to_string(),
            machine_id: row.get(2)?.to_string(),
            total_spins: row.get(3)?.parse().ok()?,
            total_bet: row.get(4)?.parse().ok()?,
            total_win: row.get(5)?.parse().ok()?,
            total_profit: row.get(6)?.parse().ok()?,
            initial_balance: row.get(7)?.parse().ok()?,
            final_balance: row.get(8)?.parse().ok()?,
            session_duration: row.get(9)?.parse().ok()?,
            free_spins_triggered: row.get(10)?.parse().ok()?,
            free_spins_played: row.get(11)?.parse().ok()?,
            max_win: row.get(12)?.parse().ok()?,
            max_loss_streak: row.get(13)?.parse().ok()?,
            rtp: row.get(14)?.parse().ok()?,
        })
    }
}

/// Per-spin tuple, materialized only when raw recording is enabled
/// (§3 "Spin record").
#[derive(Debug, Clone)]
pub struct SpinRecord {
    pub session_id: u64,
    pub spin_number: u32,
    pub bet_amount: f64,
    pub win_amount: f64,
    pub profit: f64,
    pub trigger_free_spins: bool,
    pub free_spins_remaining: u32,
    pub in_free_spins: bool,
    pub timestamp: f64,
    /// Comma-joined symbol list, quoted by the CSV writer.
    pub grid: String,
}

impl SpinRecord {
    pub const HEADER: [&'static str; 10] = [
        "session_id",
        "spin_number",
        "bet_amount",
        "win_amount",
        "profit",
        "trigger_free_spins",
        "free_spins_remaining",
        "in_free_spins",
        "timestamp",
        "grid",
    ];

    pub fn to_row(&self) -> [String; 10] {
        [
            self.session_id.to_string(),
            self.spin_number.to_string(),
            fixed6(self.bet_amount),
            fixed6(self.win_amount),
            fixed6(self.profit),
            self.trigger_free_spins.to_string(),
            self.free_spins_remaining.to_string(),
            self.in_free_spins.to_string(),
            fixed6(self.timestamp),
            self.grid.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed6_always_renders_six_decimals() {
        assert_eq!(fixed6(5.0), "5.000000");
        assert_eq!(fixed6(0.1 + 0.2), "0.300000");
    }

    #[test]
    fn session_row_round_trips_through_csv_strings() {
        let record = SessionRecord {
            session_id: 42,
            player_id: "p1".to_string(),
            machine_id: "m1".to_string(),
            total_spins: 10,
            total_bet: 10.0,
            total_win: 50.0,
            total_profit: 40.0,
            initial_balance: 100.0,
            final_balance: 140.0,
            session_duration: 12.5,
            free_spins_triggered: 1,
            free_spins_played: 10,
            max_win: 25.0,
            max_loss_streak: 3,
            rtp: 5.0,
        };
        let row = record.to_row();
        let parsed = csv::StringRecord::from(row.to_vec());
        let round_tripped = SessionRecord::from_row(&parsed).unwrap();
        assert_eq!(round_tripped.session_id, record.session_id);
        assert_eq!(round_tripped.total_win, record.total_win);
        assert_eq!(round_tripped.rtp, record.rtp);
    }
}
