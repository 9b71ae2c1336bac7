//! Session controller (§4.4): the per-session loop that alternates
//! observation -> decision -> spin resolution until a termination
//! condition fires, then publishes one `SessionRecord` and its raw
//! `SpinRecord`s.

use std::time::{Duration, Instant};

use rand_chacha::rand_core::RngCore;
use rf_players::{Player, SessionObservation, SpinSummary};
use rf_sim_sink::{SessionRecord, SpinRecord};
use rf_slot_lab::SlotMachine;

/// Caps the session controller enforces independent of what the player
/// itself decides (§4.4 step 3, §7 "session exceeds configured caps").
#[derive(Debug, Clone, Copy)]
pub struct SessionCaps {
    pub max_spins: u32,
    pub max_wall_seconds: f64,
    pub max_logical_seconds: f64,
}

impl Default for SessionCaps {
    fn default() -> Self {
        Self {
            max_spins: 10_000,
            max_wall_seconds: f64::INFINITY,
            max_logical_seconds: f64::INFINITY,
        }
    }
}

/// Recent-spin history kept for the observation window, newest first,
/// capped at 10 entries (§4.4 step 1).
const HISTORY_LEN: usize = 10;

pub struct SessionOutcome {
    pub record: SessionRecord,
    pub spin_records: Vec<SpinRecord>,
}

/// Run one session to completion.
///
/// The player's think-time delay is an actual wall-clock sleep (§5
/// "Suspension") bounded by `max_wall_seconds`; `logical_clock` separately
/// accumulates the same delays plus one simulated second per spin and is
/// what `max_logical_seconds` bounds (§4.4 step 3, step 6).
#[allow(clippy::too_many_arguments)]
pub fn run_session(
    session_id: u64,
    player_id: &str,
    machine_id: &str,
    player: &mut Player,
    machine: &SlotMachine,
    available_bets: &[f64],
    caps: SessionCaps,
    record_spins: bool,
    rng: &mut dyn RngCore,
) -> SessionOutcome {
    let initial_balance = player.balance();
    let mut history: Vec<SpinSummary> = Vec::with_capacity(HISTORY_LEN);
    let mut spin_records = Vec::new();

    let mut total_bet = 0.0_f64;
    let mut total_win = 0.0_f64;
    let mut spins_taken = 0u32;
    let mut free_spins_triggered = 0u32;
    let mut free_spins_played = 0u32;
    let mut max_win = 0.0_f64;
    let mut loss_streak = 0u32;
    let mut win_streak = 0u32;
    let mut max_loss_streak = 0u32;
    let mut logical_clock = 0.0_f64;
    let mut in_free_spins = false;
    let mut free_spins_remaining = 0u32;
    let wall_start = Instant::now();

    loop {
        if spins_taken >= caps.max_spins
            || logical_clock >= caps.max_logical_seconds
            || wall_start.elapsed().as_secs_f64() >= caps.max_wall_seconds
        {
            break;
        }

        let cumulative_profit = player.balance() - initial_balance;
        let observation = SessionObservation {
            balance: player.balance(),
            cumulative_profit,
            current_win_streak: win_streak,
            current_loss_streak: loss_streak,
            recent_spins: &history,
            available_bets,
            in_free_spins,
            free_spins_remaining,
        };

        let decision = player.decide(&observation, rng);
        if !decision.continue_playing || decision.bet <= 0.0 {
            break;
        }
        if decision.bet > player.balance() || !available_bets.contains(&decision.bet) {
            break;
        }

        if decision.delay_seconds > 0.0 {
            std::thread::sleep(Duration::from_secs_f64(decision.delay_seconds));
        }

        let balance_before = player.balance();
        player.set_balance(balance_before - decision.bet);

        let outcome = machine.spin(decision.bet, in_free_spins, free_spins_remaining, rng);
        player.set_balance(player.balance() + outcome.win);

        let profit = outcome.win - decision.bet;
        player.record_spin(decision.bet, profit, balance_before, decision.delay_seconds);

        total_bet += decision.bet;
        total_win += outcome.win;
        max_win = max_win.max(outcome.win);
        if profit > 0.0 {
            win_streak += 1;
            loss_streak = 0;
        } else if profit < 0.0 {
            loss_streak += 1;
            win_streak = 0;
            max_loss_streak = max_loss_streak.max(loss_streak);
        }

        if outcome.trigger_free_spins {
            free_spins_triggered += 1;
            in_free_spins = true;
            free_spins_remaining = machine.config().free_spins_count;
        } else if in_free_spins {
            free_spins_played += 1;
            free_spins_remaining = outcome.free_spins_remaining_after;
            if free_spins_remaining == 0 {
                in_free_spins = false;
            }
        }

        spins_taken += 1;
        logical_clock += decision.delay_seconds + 1.0;

        if record_spins {
            spin_records.push(SpinRecord {
                session_id,
                spin_number: spins_taken,
                bet_amount: decision.bet,
                win_amount: outcome.win,
                profit,
                trigger_free_spins: outcome.trigger_free_spins,
                free_spins_remaining,
                in_free_spins,
                timestamp: logical_clock,
                grid: format_grid(&outcome.grid.cells),
            });
        }

        history.insert(
            0,
            SpinSummary {
                bet: decision.bet,
                win: outcome.win,
                profit,
                in_free_spins,
            },
        );
        history.truncate(HISTORY_LEN);
    }

    let final_balance = player.balance();
    let total_profit = final_balance - initial_balance;
    let record = SessionRecord {
        session_id,
        player_id: player_id.to_string(),
        machine_id: machine_id.to_string(),
        total_spins: spins_taken as u64,
        total_bet,
        total_win,
        total_profit,
        initial_balance,
        final_balance,
        session_duration: logical_clock,
        free_spins_triggered,
        free_spins_played,
        max_win,
        max_loss_streak,
        rtp: if total_bet > 0.0 { total_win / total_bet } else { 0.0 },
    };

    SessionOutcome { record, spin_records }
}

fn format_grid(cells: &[u32]) -> String {
    cells
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rf_players::{BalanceDistribution, PlayerProfile, RandomPlayer};
    use rf_slot_lab::{BetTable, MachineConfig, PayTable, Payline, ReelSet, ReelStrip, SymbolSet};
    use std::collections::{BTreeMap, HashMap};

    fn zero_pay_machine() -> SlotMachine {
        let mut reel_sets = BTreeMap::new();
        reel_sets.insert("normal".to_string(), ReelSet::new(vec![ReelStrip::new(vec![1, 2])]));
        SlotMachine::new(MachineConfig {
            id: "m1".to_string(),
            reel_sets,
            paylines: vec![Payline::straight(0, 1)],
            paytable: PayTable { payouts: HashMap::new() },
            bet_table: BetTable { by_currency: BTreeMap::new() },
            symbols: SymbolSet { normal: vec![1, 2], wild: vec![], scatter: 9 },
            window_size: 1,
            active_lines: 1,
            free_spins_count: 10,
            free_spins_multiplier: 1.0,
        })
    }

    /// Scenario 6 (§8) replayed at the session-controller level: a
    /// zero-paying machine, balance 10, bet 1 -> exhausts in 10 spins.
    #[test]
    fn session_exhausts_balance_against_zero_pay_machine() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let profile = PlayerProfile {
            id: "p1".to_string(),
            currency: "USD".to_string(),
            model_version: "random".to_string(),
            balance_distribution: BalanceDistribution { mu: 10.0, sigma: 0.0, min: 10.0, max: 10.0 },
            config: serde_json::json!({}),
        };
        let mut player = Player::Random(RandomPlayer::new(profile, &mut rng));
        let machine = zero_pay_machine();
        let bets = [1.0];

        let outcome = run_session(
            1,
            "p1",
            "m1",
            &mut player,
            &machine,
            &bets,
            SessionCaps::default(),
            true,
            &mut rng,
        );

        assert_eq!(outcome.record.total_spins, 10);
        assert_eq!(outcome.record.final_balance, 0.0);
        assert_eq!(outcome.record.total_profit, -10.0);
        assert_eq!(outcome.record.total_bet, 10.0);
        assert_eq!(outcome.spin_records.len(), 10);
    }

    #[test]
    fn session_invariants_hold() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let profile = PlayerProfile {
            id: "p2".to_string(),
            currency: "USD".to_string(),
            model_version: "random".to_string(),
            balance_distribution: BalanceDistribution { mu: 50.0, sigma: 0.0, min: 50.0, max: 50.0 },
            config: serde_json::json!({}),
        };
        let mut player = Player::Random(RandomPlayer::new(profile, &mut rng));
        let machine = zero_pay_machine();
        let bets = [1.0, 5.0];

        let outcome = run_session(
            2,
            "p2",
            "m1",
            &mut player,
            &machine,
            &bets,
            SessionCaps::default(),
            false,
            &mut rng,
        );

        let record = outcome.record;
        assert_eq!(record.final_balance, record.initial_balance + record.total_profit);
        assert!((record.total_profit - (record.total_win - record.total_bet)).abs() < 1e-9);
        assert!(outcome.spin_records.is_empty());
    }

    #[test]
    fn max_spins_cap_terminates_even_without_player_stop() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let profile = PlayerProfile {
            id: "p3".to_string(),
            currency: "USD".to_string(),
            model_version: "random".to_string(),
            balance_distribution: BalanceDistribution { mu: 1_000_000.0, sigma: 0.0, min: 1_000_000.0, max: 1_000_000.0 },
            config: serde_json::json!({}),
        };
        let mut player = Player::Random(RandomPlayer::new(profile, &mut rng));
        let machine = zero_pay_machine();
        let bets = [1.0];

        let caps = SessionCaps {
            max_spins: 5,
            max_wall_seconds: f64::INFINITY,
            max_logical_seconds: f64::INFINITY,
        };
        let outcome = run_session(3, "p3", "m1", &mut player, &machine, &bets, caps, false, &mut rng);
        assert_eq!(outcome.record.total_spins, 5);
    }
}
