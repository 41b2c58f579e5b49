//! Live flow — residents come home, lights flicker, residents leave.
//!
//! A single control loop owns the occupancy table. On every (jittered) tick
//! it moves one idle unit into an *activation*: each of the unit's windows
//! runs its own randomized on/off program, and once every program has played
//! out the windows go dark and the unit becomes idle again. Entering a unit
//! also lights the stairwell landings for `service_ttl`.
//!
//! ```text
//!   tick ──► pick idle unit ──► entered ──► landing task (on, re-arm ttl)
//!                 │
//!                 └──► activation ──► window task × N ──► all off ──► release
//! ```

mod occupancy;

use occupancy::Occupancy;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::mpsc;
use tokio::task::{self, JoinError, JoinSet};
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;

use khrushchevka_domain::building::BuildingMap;
use khrushchevka_domain::error::KhrushchevkaError;
use khrushchevka_domain::light::{LightAddress, LightKind};
use khrushchevka_domain::schedule::{WindowSchedule, jitter};

use crate::flow::{BoxFuture, Flow, FlowResult, StopSignal};
use crate::ports::LightsController;

/// Relative jitter applied to the delay between two activations.
pub const ACTIVATION_FLUCTUATION: f64 = 0.4;

/// Lower bound on the delay between two ticks of the scheduler.
pub const MIN_ACTIVATION_DELAY: Duration = Duration::from_millis(1);

/// Tuning knobs of the live flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveOptions {
    /// Mean delay between two activations.
    pub max_delay: Duration,
    /// How long a unit stays occupied.
    pub flat_ttl: Duration,
    /// How long landing lights stay on after the last entry.
    pub service_ttl: Duration,
    /// Number of on/off periods per window program.
    pub max_changes: u32,
    /// Fixed RNG seed, for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for LiveOptions {
    fn default() -> Self {
        Self {
            max_delay: Duration::from_secs(5),
            flat_ttl: Duration::from_secs(120),
            service_ttl: Duration::from_secs(10),
            max_changes: 4,
            seed: None,
        }
    }
}

/// Occupancy simulation over the whole building.
pub struct LiveFlow<L> {
    lights: Arc<L>,
    building: Arc<BuildingMap>,
    options: LiveOptions,
    signal: StopSignal,
}

impl<L: LightsController + 'static> LiveFlow<L> {
    pub const NAME: &'static str = "live";

    #[must_use]
    pub fn new(lights: Arc<L>, building: Arc<BuildingMap>, options: LiveOptions) -> Self {
        Self {
            lights,
            building,
            options,
            signal: StopSignal::default(),
        }
    }

    async fn run(&self, done: CancellationToken) -> FlowResult {
        self.lights.reset()?;
        for entrance in self.building.addresses_of_kind(LightKind::ServiceEntrance) {
            self.lights.set(entrance, true)?;
        }

        let rng = match self.options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let (entered, entered_rx) = mpsc::unbounded_channel();
        let landing = tokio::spawn(landing_lights(
            Arc::clone(&self.lights),
            self.building.addresses_of_kind(LightKind::ServiceNoManLand),
            self.options.service_ttl,
            entered_rx,
            done.clone(),
        ));

        let mut scheduler = Scheduler {
            flow: self,
            done: done.clone(),
            rng,
            occupancy: Occupancy::new(self.building.units()),
            entered,
            activations: JoinSet::new(),
            running: HashMap::new(),
        };
        tracing::info!(
            units = scheduler.occupancy.unit_count(),
            max_delay = ?self.options.max_delay,
            flat_ttl = ?self.options.flat_ttl,
            "live flow started"
        );

        let timer = sleep(Duration::ZERO);
        tokio::pin!(timer);
        loop {
            tokio::select! {
                biased;
                () = done.cancelled() => break,
                () = &mut timer => {
                    scheduler.tick();
                    timer.as_mut().reset(Instant::now() + scheduler.next_delay());
                }
                Some(joined) = scheduler.activations.join_next_with_id() => {
                    scheduler.release(joined);
                }
            }
        }

        scheduler.shutdown().await;
        if let Err(err) = landing.await {
            tracing::warn!(%err, "landing light task failed");
        }
        tracing::info!("live flow stopped");
        Ok(())
    }
}

impl<L: LightsController + 'static> Flow for LiveFlow<L> {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn start(self: Arc<Self>, shutdown: &CancellationToken) -> BoxFuture<FlowResult> {
        let done = self.signal.arm(shutdown);
        Box::pin(async move { self.run(done).await })
    }

    fn stop(&self) {
        if self.signal.trigger() {
            tracing::info!(flow = Self::NAME, "stop requested");
        }
    }
}

/// State of the control loop for one run.
struct Scheduler<'a, L> {
    flow: &'a LiveFlow<L>,
    done: CancellationToken,
    rng: StdRng,
    occupancy: Occupancy,
    entered: mpsc::UnboundedSender<()>,
    activations: JoinSet<u32>,
    running: HashMap<task::Id, u32>,
}

impl<L: LightsController + 'static> Scheduler<'_, L> {
    fn tick(&mut self) {
        let Some(unit) = self.occupancy.pick(&mut self.rng) else {
            tracing::trace!("every unit is occupied");
            return;
        };
        // the landing task only goes away on cancellation
        let _ = self.entered.send(());

        let options = &self.flow.options;
        let programs: Vec<(LightAddress, WindowSchedule)> = self
            .flow
            .building
            .windows_of(unit)
            .into_iter()
            .map(|addr| {
                let schedule =
                    WindowSchedule::generate(&mut self.rng, options.flat_ttl, options.max_changes);
                tracing::debug!(unit, window = %addr, %schedule, "window program");
                (addr, schedule)
            })
            .collect();

        tracing::debug!(
            unit,
            windows = programs.len(),
            active = self.occupancy.active_count(),
            "unit activated"
        );
        let handle = self.activations.spawn(activate(
            Arc::clone(&self.flow.lights),
            unit,
            programs,
            self.done.clone(),
        ));
        self.running.insert(handle.id(), unit);
    }

    fn next_delay(&mut self) -> Duration {
        jitter(
            &mut self.rng,
            self.flow.options.max_delay,
            ACTIVATION_FLUCTUATION,
        )
        .max(MIN_ACTIVATION_DELAY)
    }

    fn release(&mut self, joined: Result<(task::Id, u32), JoinError>) {
        let id = match joined {
            Ok((id, unit)) => {
                tracing::debug!(unit, "unit released");
                id
            }
            Err(err) => {
                tracing::warn!(%err, "unit activation failed");
                err.id()
            }
        };
        if let Some(unit) = self.running.remove(&id) {
            self.occupancy.release(unit);
        }
    }

    async fn shutdown(mut self) {
        drop(self.entered);
        while let Some(joined) = self.activations.join_next().await {
            if let Err(err) = joined {
                tracing::warn!(%err, "unit activation failed");
            }
        }
        self.running.clear();
    }
}

/// Keep the landing lights on while units keep being entered.
///
/// Each message on `entered` switches every landing on and pushes the
/// switch-off deadline to `ttl` from now.
async fn landing_lights<L: LightsController>(
    lights: Arc<L>,
    landings: Vec<LightAddress>,
    ttl: Duration,
    mut entered: mpsc::UnboundedReceiver<()>,
    done: CancellationToken,
) {
    let timer = sleep(Duration::ZERO);
    tokio::pin!(timer);
    let mut lit = false;

    loop {
        tokio::select! {
            biased;
            () = done.cancelled() => return,
            signal = entered.recv() => {
                if signal.is_none() {
                    return;
                }
                if let Err(err) = switch_all(&*lights, &landings, true) {
                    tracing::warn!(%err, "landing lights stopped");
                    return;
                }
                lit = true;
                timer.as_mut().reset(Instant::now() + ttl);
            }
            () = &mut timer, if lit => {
                lit = false;
                if let Err(err) = switch_all(&*lights, &landings, false) {
                    tracing::warn!(%err, "landing lights stopped");
                    return;
                }
            }
        }
    }
}

fn switch_all<L: LightsController + ?Sized>(
    lights: &L,
    addrs: &[LightAddress],
    is_on: bool,
) -> Result<(), KhrushchevkaError> {
    for &addr in addrs {
        lights.set(addr, is_on)?;
    }
    Ok(())
}

/// Play every window program of `unit` concurrently.
///
/// Once all programs are through, the unit's windows are switched off.
/// A cancelled activation leaves its windows as they are.
async fn activate<L: LightsController + 'static>(
    lights: Arc<L>,
    unit: u32,
    programs: Vec<(LightAddress, WindowSchedule)>,
    done: CancellationToken,
) -> u32 {
    let windows: Vec<LightAddress> = programs.iter().map(|(addr, _)| *addr).collect();

    let mut set = JoinSet::new();
    for (addr, schedule) in programs {
        set.spawn(run_window(Arc::clone(&lights), addr, schedule, done.clone()));
    }
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::warn!(unit, %err, "window program stopped"),
            Err(err) => tracing::warn!(unit, %err, "window task failed"),
        }
    }

    if !done.is_cancelled() {
        for addr in windows {
            if let Err(err) = lights.set(addr, false) {
                tracing::warn!(unit, window = %addr, %err, "failed to switch window off");
            }
        }
    }
    unit
}

/// Apply each period of `schedule` to one window, in order.
async fn run_window<L: LightsController>(
    lights: Arc<L>,
    addr: LightAddress,
    schedule: WindowSchedule,
    done: CancellationToken,
) -> Result<(), KhrushchevkaError> {
    for period in schedule {
        if done.is_cancelled() {
            break;
        }
        lights.set(addr, period.is_on)?;
        tracing::trace!(window = %addr, is_on = period.is_on, "window switched");
        tokio::select! {
            biased;
            () = done.cancelled() => return Ok(()),
            () = sleep(period.duration) => {}
        }
    }
    Ok(())
}
