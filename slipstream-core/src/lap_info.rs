use serde::{Deserialize, Serialize};

pub type LapNumber = u8;
pub type CheckpointID = u64;
pub type Placement = u8;

// The slice of a car's progress that clients get to see; the authoritative
// counters live on the server and only this projection is mirrored out
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct LapInformation {
    pub lap: LapNumber,
    pub last_checkpoint: CheckpointID,
    pub checkpoints_passed: u32,
}

impl LapInformation {
    pub fn new() -> Self {
        LapInformation {
            lap: 0,
            last_checkpoint: 0,
            checkpoints_passed: 0,
        }
    }
}
