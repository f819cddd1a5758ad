use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entity_location::EntityLocation;
use crate::lap_info::CheckpointID;

// Checkpoints are loaded once at track load and never mutated; every session
// running on the same track shares one ledger for reads.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub id: CheckpointID,
    pub is_finish_line: bool,
    // where a car gets placed when its owner invokes a manual reset back to
    // this checkpoint
    pub reset_location: EntityLocation,
}

impl Checkpoint {
    pub fn new(id: CheckpointID, is_finish_line: bool, reset_location: EntityLocation) -> Self {
        Checkpoint {
            id,
            is_finish_line,
            reset_location,
        }
    }
}

#[derive(Debug, Error)]
pub enum TrackError {
    #[error("could not read track file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse track file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("track has no checkpoints")]
    NoCheckpoints,
    #[error("track has no starting grid slots")]
    NoStartingGrid,
    #[error("checkpoint ids must be contiguous from 1, found {found} at index {index}")]
    NonContiguous { index: usize, found: CheckpointID },
    #[error("the last checkpoint, and only the last, must be the finish line")]
    MisplacedFinishLine,
}

// On-disk shape of a track; checked into a Track by Track::new so a loaded
// file can't bypass the ledger invariants
#[derive(Deserialize)]
struct TrackFile {
    name: String,
    checkpoints: Vec<Checkpoint>,
    starting_grid: Vec<EntityLocation>,
}

#[derive(Clone, Debug)]
pub struct Track {
    pub name: String,
    checkpoints: Vec<Checkpoint>,
    starting_grid: Vec<EntityLocation>,
}

impl Track {
    pub fn new(
        name: String,
        checkpoints: Vec<Checkpoint>,
        starting_grid: Vec<EntityLocation>,
    ) -> Result<Track, TrackError> {
        if checkpoints.is_empty() {
            return Err(TrackError::NoCheckpoints);
        }
        if starting_grid.is_empty() {
            return Err(TrackError::NoStartingGrid);
        }

        for (index, checkpoint) in checkpoints.iter().enumerate() {
            if checkpoint.id != index as CheckpointID + 1 {
                return Err(TrackError::NonContiguous {
                    index,
                    found: checkpoint.id,
                });
            }
            // a lap ends at the last checkpoint and nowhere else
            if checkpoint.is_finish_line != (index == checkpoints.len() - 1) {
                return Err(TrackError::MisplacedFinishLine);
            }
        }

        Ok(Track {
            name,
            checkpoints,
            starting_grid,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Track, TrackError> {
        let raw = fs::read_to_string(path)?;
        let file: TrackFile = serde_json::from_str(&raw)?;
        let track = Track::new(file.name, file.checkpoints, file.starting_grid)?;
        info!(
            "loaded track {} ({} checkpoints, {} grid slots)",
            track.name,
            track.checkpoint_count(),
            track.starting_grid.len()
        );
        Ok(track)
    }

    // lookup miss means a mis-built track or a bogus trigger, not something
    // a running session recovers from
    pub fn checkpoint(&self, id: CheckpointID) -> Option<&Checkpoint> {
        self.checkpoints.get(id.checked_sub(1)? as usize)
    }

    pub fn finish_line(&self) -> &Checkpoint {
        &self.checkpoints[self.checkpoints.len() - 1]
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    pub fn checkpoint_count(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn starting_grid(&self) -> &[EntityLocation] {
        &self.starting_grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    fn gate(id: CheckpointID, is_finish_line: bool) -> Checkpoint {
        Checkpoint::new(
            id,
            is_finish_line,
            EntityLocation::new(DVec3::new(id as f64 * 10.0, 0.0, 0.0), DVec3::X),
        )
    }

    fn grid() -> Vec<EntityLocation> {
        vec![EntityLocation::origin(), EntityLocation::origin()]
    }

    #[test]
    fn test_valid_track() {
        let track = Track::new(
            "ring".to_string(),
            vec![gate(1, false), gate(2, false), gate(3, true)],
            grid(),
        )
        .unwrap();

        assert_eq!(track.checkpoint_count(), 3);
        assert_eq!(track.checkpoint(2).unwrap().id, 2);
        assert!(track.finish_line().is_finish_line);
        assert_eq!(track.finish_line().id, 3);
    }

    #[test]
    fn test_lookup_miss() {
        let track = Track::new("ring".to_string(), vec![gate(1, true)], grid()).unwrap();

        assert!(track.checkpoint(0).is_none());
        assert!(track.checkpoint(2).is_none());
    }

    #[test]
    fn test_empty_track_rejected() {
        assert!(matches!(
            Track::new("void".to_string(), Vec::new(), grid()),
            Err(TrackError::NoCheckpoints)
        ));
    }

    #[test]
    fn test_gap_in_ids_rejected() {
        let result = Track::new(
            "gappy".to_string(),
            vec![gate(1, false), gate(3, true)],
            grid(),
        );

        assert!(matches!(
            result,
            Err(TrackError::NonContiguous { index: 1, found: 3 })
        ));
    }

    #[test]
    fn test_finish_line_must_be_last() {
        let result = Track::new(
            "backwards".to_string(),
            vec![gate(1, true), gate(2, false)],
            grid(),
        );

        assert!(matches!(result, Err(TrackError::MisplacedFinishLine)));
    }
}
