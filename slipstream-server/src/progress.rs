use std::time::Duration;

use slipstream_core::lap_info::{CheckpointID, LapInformation, LapNumber, Placement};
use slipstream_core::track::Checkpoint;
use slipstream_core::GLOBAL_CONFIG;

// What a single checkpoint trigger did to a car's progress
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassOutcome {
    // The car advanced to this checkpoint. lap_completed is set when it was
    // the finish line, race_won when that lap was the last one required.
    Advanced {
        lap_completed: bool,
        race_won: bool,
    },
    // A checkpoint further along the track than the one expected next;
    // progress is untouched and the manual reset affordance is armed
    Misorder { expected: CheckpointID },
    // Re-entry into an already-passed checkpoint, or any trigger after the
    // car finished its race
    Ignored,
}

#[derive(Clone, Copy, Debug)]
pub struct CarProgress {
    last_checkpoint: CheckpointID,
    checkpoints_passed: u32,
    last_pass_timestamp: Duration,
    laps_completed: LapNumber,
    race_completed: bool,
    placement: Placement,
    reset_armed: bool,
}

impl CarProgress {
    pub fn new() -> Self {
        CarProgress {
            last_checkpoint: 0,
            checkpoints_passed: 0,
            last_pass_timestamp: Duration::ZERO,
            laps_completed: 0,
            race_completed: false,
            placement: 0,
            reset_armed: false,
        }
    }

    // Apply one checkpoint trigger. `now` is the race clock, measured from
    // the moment the countdown ended.
    pub fn pass_checkpoint(&mut self, checkpoint: &Checkpoint, now: Duration) -> PassOutcome {
        if self.race_completed {
            return PassOutcome::Ignored;
        }

        // only advance if the car is coming from the checkpoint before this one
        let expected = self.last_checkpoint + 1;
        if checkpoint.id == expected {
            self.last_checkpoint = checkpoint.id;
            self.checkpoints_passed += 1;
            self.last_pass_timestamp = now;
            self.reset_armed = false;

            let mut lap_completed = false;
            let mut race_won = false;
            if checkpoint.is_finish_line {
                self.last_checkpoint = 0;
                self.laps_completed += 1;
                lap_completed = true;

                if self.laps_completed >= GLOBAL_CONFIG.laps_to_complete {
                    self.race_completed = true;
                    race_won = true;
                }
            }

            PassOutcome::Advanced {
                lap_completed,
                race_won,
            }
        } else if checkpoint.id > expected {
            self.reset_armed = true;
            PassOutcome::Misorder { expected }
        } else {
            PassOutcome::Ignored
        }
    }

    // Consume the one-shot manual reset armed by a misorder; returns the
    // checkpoint the car should be teleported back to
    pub fn take_reset_target(&mut self) -> Option<CheckpointID> {
        if self.reset_armed {
            self.reset_armed = false;
            Some(self.last_checkpoint + 1)
        } else {
            None
        }
    }

    // Used by an explicit finish object on tracks that have one; the car is
    // done regardless of its checkpoint count
    pub fn force_complete(&mut self) {
        self.race_completed = true;
    }

    pub fn reset(&mut self) {
        *self = CarProgress::new();
    }

    pub fn checkpoints_passed(&self) -> u32 {
        self.checkpoints_passed
    }

    pub fn last_pass_timestamp(&self) -> Duration {
        self.last_pass_timestamp
    }

    pub fn laps_completed(&self) -> LapNumber {
        self.laps_completed
    }

    pub fn race_completed(&self) -> bool {
        self.race_completed
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn set_placement(&mut self, placement: Placement) {
        self.placement = placement;
    }

    pub fn lap_information(&self) -> LapInformation {
        LapInformation {
            lap: self.laps_completed,
            last_checkpoint: self.last_checkpoint,
            checkpoints_passed: self.checkpoints_passed,
        }
    }
}
