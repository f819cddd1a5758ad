use serde::{Deserialize, Serialize};

use crate::lap_info::{LapInformation, Placement};

// The discrete stage of a match's lifecycle as clients see it; the server
// keeps richer per-phase bookkeeping and mirrors only this out
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Lobby,
    Countdown,
    Racing,
    Finished,
    RematchPending,
    Exited,
}

// One-way snapshot of the per-player mirrored fields; how it reaches the
// client is the transport layer's problem, the core only defines the fields
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct StateProjection {
    pub phase: Phase,
    pub lap_information: LapInformation,
    pub placement: Placement,
}
