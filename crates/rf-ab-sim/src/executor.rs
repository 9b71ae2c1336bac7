//! Work-stealing simulation executor (§4.7).
//!
//! Each worker owns a `crossbeam_deque::Worker` (LIFO pop from its own
//! back), a per-worker `InstancePool`, and a `SimRng` stream seeded once at
//! startup. Idle workers steal from the front of others' deques and, on a
//! full miss, sleep on a shared condvar for ~5ms rather than spinning.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_deque::{Injector, Steal, Stealer, Worker as Deque};
use log::{error, warn};
use parking_lot::{Condvar, Mutex};
use rf_core::seed_worker_rng;
use rf_sim_sink::ResultSink;

use crate::catalog::{MachineCatalog, PlayerCatalog};
use crate::error::ExecutorResult;
use crate::pool::InstancePool;
use crate::session::{run_session, SessionCaps};
use crate::task::SessionTask;

const STEAL_WAIT: Duration = Duration::from_millis(5);

/// Wakes sleeping workers when new work is submitted or the run is shutting
/// down, instead of having them busy-spin on an empty deque.
#[derive(Default)]
struct Signal {
    mutex: Mutex<()>,
    condvar: Condvar,
}

impl Signal {
    fn wait_briefly(&self) {
        let mut guard = self.mutex.lock();
        self.condvar.wait_for(&mut guard, STEAL_WAIT);
    }

    fn wake_all(&self) {
        self.condvar.notify_all();
    }
}

pub struct ExecutorConfig {
    pub worker_count: usize,
    pub base_seed: u64,
    pub pool_capacity: usize,
    pub record_spins: bool,
    pub session_caps: SessionCaps,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            worker_count: num_cpus::get().max(1),
            base_seed: 0,
            pool_capacity: crate::pool::DEFAULT_POOL_CAPACITY,
            record_spins: false,
            session_caps: SessionCaps::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunStats {
    pub completed: u64,
    pub failed: u64,
}

/// Runs every `SessionTask` to completion across a fixed pool of worker
/// threads, publishing session (and optionally raw spin) records through
/// `sink` as they finish.
pub struct SimulationExecutor {
    config: ExecutorConfig,
}

impl SimulationExecutor {
    pub fn new(config: ExecutorConfig) -> Self {
        Self { config }
    }

    pub fn run(
        &self,
        tasks: Vec<SessionTask>,
        machines: Arc<MachineCatalog>,
        players: Arc<PlayerCatalog>,
        sink: Arc<ResultSink>,
    ) -> ExecutorResult<RunStats> {
        let injector = Arc::new(Injector::new());
        for task in tasks {
            injector.push(task);
        }

        let worker_count = self.config.worker_count.max(1);
        let deques: Vec<Deque<SessionTask>> = (0..worker_count).map(|_| Deque::new_lifo()).collect();
        let stealers: Arc<Vec<Stealer<SessionTask>>> =
            Arc::new(deques.iter().map(Deque::stealer).collect());

        let signal = Arc::new(Signal::default());
        // All tasks are enumerated up front and nothing is submitted after
        // this point, so a worker can exit as soon as it observes every
        // deque and the injector simultaneously empty.
        let shutdown = Arc::new(AtomicBool::new(true));
        let completed = Arc::new(AtomicU64::new(0));
        let failed = Arc::new(AtomicU64::new(0));

        let handles: Vec<_> = deques
            .into_iter()
            .enumerate()
            .map(|(worker_id, local)| {
                let injector = Arc::clone(&injector);
                let stealers = Arc::clone(&stealers);
                let signal = Arc::clone(&signal);
                let shutdown = Arc::clone(&shutdown);
                let completed = Arc::clone(&completed);
                let failed = Arc::clone(&failed);
                let machines = Arc::clone(&machines);
                let players = Arc::clone(&players);
                let sink = Arc::clone(&sink);
                let base_seed = self.config.base_seed;
                let pool_capacity = self.config.pool_capacity;
                let record_spins = self.config.record_spins;
                let session_caps = self.config.session_caps;

                thread::Builder::new()
                    .name(format!("rf-ab-sim-worker-{worker_id}"))
                    .spawn(move || {
                        worker_loop(
                            worker_id,
                            local,
                            &injector,
                            &stealers,
                            &signal,
                            &shutdown,
                            &completed,
                            &failed,
                            &machines,
                            &players,
                            &sink,
                            base_seed,
                            pool_capacity,
                            record_spins,
                            session_caps,
                        );
                    })
                    .expect("failed to spawn worker thread")
            })
            .collect();

        signal.wake_all();
        for handle in handles {
            if handle.join().is_err() {
                error!("a worker thread panicked outside its task boundary");
            }
        }

        Ok(RunStats {
            completed: completed.load(Ordering::SeqCst),
            failed: failed.load(Ordering::SeqCst),
        })
    }
}

#[allow(clippy::too_many_arguments)]
fn worker_loop(
    worker_id: usize,
    local: Deque<SessionTask>,
    injector: &Injector<SessionTask>,
    stealers: &[Stealer<SessionTask>],
    signal: &Signal,
    shutdown: &AtomicBool,
    completed: &AtomicU64,
    failed: &AtomicU64,
    machines: &MachineCatalog,
    players: &PlayerCatalog,
    sink: &ResultSink,
    base_seed: u64,
    pool_capacity: usize,
    record_spins: bool,
    session_caps: SessionCaps,
) {
    let mut rng = seed_worker_rng(base_seed, worker_id);
    let mut pool = InstancePool::new(pool_capacity);

    loop {
        match find_task(&local, injector, stealers) {
            Some(task) => {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    process_task(&task, &mut pool, machines, players, &mut rng, record_spins, session_caps)
                }));

                match outcome {
                    Ok(Ok(session_outcome)) => {
                        if let Err(err) = publish(sink, session_outcome) {
                            warn!("failed to publish session {}: {err}", task.session_id);
                            failed.fetch_add(1, Ordering::SeqCst);
                        } else {
                            completed.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                    Ok(Err(err)) => {
                        warn!("session {} failed to build instances: {err}", task.session_id);
                        failed.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(_) => {
                        // Panic unwound through the closure: the borrowed
                        // player/machine never reached the pool-return step
                        // and were dropped with the stack (§4.9).
                        error!("session {} panicked and was discarded", task.session_id);
                        failed.fetch_add(1, Ordering::SeqCst);
                    }
                }
            }
            None => {
                if shutdown.load(Ordering::SeqCst) && local.is_empty() {
                    break;
                }
                signal.wait_briefly();
            }
        }
    }
}

fn find_task(
    local: &Deque<SessionTask>,
    injector: &Injector<SessionTask>,
    stealers: &[Stealer<SessionTask>],
) -> Option<SessionTask> {
    if let Some(task) = local.pop() {
        return Some(task);
    }
    loop {
        match injector.steal_batch_and_pop(local) {
            Steal::Success(task) => return Some(task),
            Steal::Retry => continue,
            Steal::Empty => break,
        }
    }
    for stealer in stealers {
        loop {
            match stealer.steal() {
                Steal::Success(task) => return Some(task),
                Steal::Retry => continue,
                Steal::Empty => break,
            }
        }
    }
    None
}

struct BuiltSession {
    outcome: crate::session::SessionOutcome,
}

fn process_task(
    task: &SessionTask,
    pool: &mut InstancePool,
    machines: &MachineCatalog,
    players: &PlayerCatalog,
    rng: &mut dyn rand_chacha::rand_core::RngCore,
    record_spins: bool,
    session_caps: SessionCaps,
) -> ExecutorResult<BuiltSession> {
    let fingerprint = task.fingerprint();
    let machine = pool.borrow_machine(&fingerprint, machines)?;
    let mut player = pool.borrow_player(&fingerprint, players, rng)?;

    let entry = players.entry(&task.player_version, &task.player_cluster)?;
    let available_bets = machine
        .config()
        .bet_table
        .bets_for(&entry.profile.currency)
        .to_vec();

    let outcome = run_session(
        task.session_id.0,
        entry.profile.id.as_str(),
        task.machine_id.as_str(),
        &mut player,
        &machine,
        &available_bets,
        session_caps,
        record_spins,
        rng,
    );

    pool.return_player(fingerprint.clone(), player, rng);
    pool.return_machine(fingerprint, machine);

    Ok(BuiltSession { outcome })
}

fn publish(sink: &ResultSink, built: BuiltSession) -> ExecutorResult<()> {
    sink.publish_session(built.outcome.record)?;
    for spin in built.outcome.spin_records {
        sink.publish_spin(spin)?;
    }
    Ok(())
}
