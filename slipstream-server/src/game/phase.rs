use std::time::Instant;

use slipstream_core::projection::Phase;
use slipstream_core::ParticipantID;

use crate::timer::TimerHandle;

// Server-side phase state. Clients only ever see the flattened Phase from
// the projection; the payloads here are authoritative bookkeeping.
pub enum GamePhase {
    // Players are still taking grid slots; nothing is simulated yet
    Lobby,
    // Everyone is on the grid and the 3-2-1 ticker is running; controls
    // stay locked until it reaches zero
    Countdown(CountdownState),
    // Cars are enabled and checkpoint triggers count
    Racing(RacingState),
    // A winner has been declared; cars are rolling to a stop and rematch
    // votes are open
    Finished(FinishedState),
    // Every participant voted to go again; transient stop on the way back
    // to the countdown
    RematchPending,
    // The session is over; whoever is left goes back to the waiting pool
    Exited,
}

pub struct CountdownState {
    pub seconds_remaining: u64,
    pub tick_timer: TimerHandle,
}

pub struct RacingState {
    // the race clock starts here; checkpoint timestamps are measured from it
    pub started_at: Instant,
}

pub struct FinishedState {
    pub winner: ParticipantID,
    pub decel_timer: Option<TimerHandle>,
}

impl GamePhase {
    pub fn as_client_phase(&self) -> Phase {
        match self {
            GamePhase::Lobby => Phase::Lobby,
            GamePhase::Countdown(_) => Phase::Countdown,
            GamePhase::Racing(_) => Phase::Racing,
            GamePhase::Finished(_) => Phase::Finished,
            GamePhase::RematchPending => Phase::RematchPending,
            GamePhase::Exited => Phase::Exited,
        }
    }
}
