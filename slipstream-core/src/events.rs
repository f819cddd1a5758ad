use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::entity_location::EntityLocation;
use crate::lap_info::{CheckpointID, LapNumber, Placement};
use crate::projection::Phase;
use crate::ParticipantID;

// Everything the physics/engine layer can feed into the authoritative core
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub enum ServerBoundEvent {
    // During the race
    CheckpointTrigger {
        player: ParticipantID,
        checkpoint: CheckpointID,
    }, // a car's collision volume entered a checkpoint zone
    FinishLineCrossed { player: ParticipantID }, // tracks with a finish object separate from the checkpoints
    ResetRequest { player: ParticipantID }, // the owner invoking the misorder reset affordance

    // After the race
    RematchVote { player: ParticipantID },
    ExitRequest { player: ParticipantID },

    // Any time
    Disconnect { player: ParticipantID },
}

// One-way notifications mirrored out to the presentation/transport layer;
// delivery and framing are not the core's concern
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum ClientBoundUpdate {
    PhaseChanged(Phase),
    CountdownTick { seconds_remaining: u64 }, // 0 is the "Start!" moment
    CarsEnabled(bool),
    CarsStopped, // the post-race deceleration window has elapsed

    RaceWon {
        winner: ParticipantID,
        #[serde(with = "serde_millis")]
        race_time: Duration,
    },
    LapUpdate {
        player: ParticipantID,
        lap: LapNumber,
    }, // what lap are you now on?
    PlacementUpdate {
        player: ParticipantID,
        placement: Placement,
    }, // what place in the race are you now at?
    MisorderWarning {
        player: ParticipantID,
        expected_checkpoint: CheckpointID,
    }, // wrong checkpoint, reset required

    CarReset {
        player: ParticipantID,
        location: EntityLocation,
    }, // manual reset teleport target
    CarPlaced {
        player: ParticipantID,
        location: EntityLocation,
    }, // starting grid placement

    InfoText {
        player: ParticipantID,
        text: String,
    }, // per-recipient banner text ("Winner!", "Loser!")
}
