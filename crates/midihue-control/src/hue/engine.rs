use std::future::Future;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{info, trace, warn};

use super::stream::{SecureDatagramChannel, StreamingSession};
use crate::effect::EffectEngine;
use crate::light::LightSet;
use crate::midi::EventSource;
use crate::{error::ControlError, Result};

/// Nominal tick interval (~100Hz)
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(10);

/// What one tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    pub events: usize,
    pub writes: usize,
    pub frame_sent: bool,
}

/// Drives the control loop: poll input, apply effects, stream one frame.
///
/// All mutable state lives here and is only touched from the tick.
pub struct EntertainmentEngine<S, C> {
    source: S,
    effects: EffectEngine,
    lights: LightSet,
    session: StreamingSession<C>,
}

impl<S: EventSource, C: SecureDatagramChannel> EntertainmentEngine<S, C> {
    pub fn new(
        source: S,
        effects: EffectEngine,
        lights: LightSet,
        session: StreamingSession<C>,
    ) -> Self {
        Self {
            source,
            effects,
            lights,
            session,
        }
    }

    pub fn lights(&self) -> &LightSet {
        &self.lights
    }

    pub fn session(&self) -> &StreamingSession<C> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut StreamingSession<C> {
        &mut self.session
    }

    /// Run a single tick.
    ///
    /// A lost datagram is logged and the tick still succeeds; sending on a
    /// session that is not connected is an error.
    pub fn tick(&mut self) -> Result<TickReport> {
        let events = self.source.poll_pending();
        let writes = self.effects.process(&events, &mut self.lights);
        let frame = self.lights.snapshot();

        let frame_sent = match self.session.send(&frame) {
            Ok(()) => true,
            Err(ControlError::Io(e)) => {
                warn!("Dropped stream frame: {}", e);
                false
            }
            Err(e) => return Err(e),
        };

        if !events.is_empty() {
            trace!("Tick: {} events, {} writes", events.len(), writes.len());
        }

        Ok(TickReport {
            events: events.len(),
            writes: writes.len(),
            frame_sent,
        })
    }

    /// Tick every `interval` until `shutdown` resolves. Ticks that overrun
    /// push the schedule back instead of bursting to catch up.
    pub async fn run<F>(&mut self, interval: Duration, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!("--- Entering tick loop ({:?}) ---", interval);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Tick loop stopped");
                    return Ok(());
                }
                _ = ticker.tick() => {
                    self.tick()?;
                }
            }
        }
    }
}
