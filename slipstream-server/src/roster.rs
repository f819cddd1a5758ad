use log::info;
use thiserror::Error;

use slipstream_core::entity_location::EntityLocation;
use slipstream_core::ParticipantID;

use crate::progress::CarProgress;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RosterError {
    #[error("participant {0} is already registered")]
    AlreadyRegistered(ParticipantID),
    #[error("every starting grid slot is taken")]
    MatchFull,
    #[error("the match has already started")]
    AlreadyStarted,
    #[error("participant {0} is not part of this match")]
    Unknown(ParticipantID),
}

#[derive(Debug)]
pub struct RosterEntry {
    pub id: ParticipantID,
    pub start_location: EntityLocation,
    pub progress: CarProgress,
    pub connected: bool,
}

// Registration order doubles as starting-grid order and as the final
// tie-break for rankings, so entries live in a Vec rather than a map.
pub struct Roster {
    entries: Vec<RosterEntry>,
    grid: Vec<EntityLocation>,
}

impl Roster {
    pub fn new(grid: Vec<EntityLocation>) -> Roster {
        Roster {
            entries: Vec::new(),
            grid,
        }
    }

    pub fn capacity(&self) -> usize {
        self.grid.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.grid.len()
    }

    pub fn contains(&self, id: ParticipantID) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    // a participant takes the next free grid slot; the same identity can
    // never hold two cars
    pub fn register(&mut self, id: ParticipantID) -> Result<&RosterEntry, RosterError> {
        if self.contains(id) {
            return Err(RosterError::AlreadyRegistered(id));
        }
        if self.is_full() {
            return Err(RosterError::MatchFull);
        }

        let start_location = self.grid[self.entries.len()];
        self.entries.push(RosterEntry {
            id,
            start_location,
            progress: CarProgress::new(),
            connected: true,
        });
        info!("registered {} on grid slot {}", id, self.entries.len() - 1);

        Ok(&self.entries[self.entries.len() - 1])
    }

    pub fn unregister(&mut self, id: ParticipantID) -> Result<RosterEntry, RosterError> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.id == id)
            .ok_or(RosterError::Unknown(id))?;

        Ok(self.entries.remove(index))
    }

    pub fn entry(&self, id: ParticipantID) -> Option<&RosterEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn entry_mut(&mut self, id: ParticipantID) -> Option<&mut RosterEntry> {
        self.entries.iter_mut().find(|entry| entry.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RosterEntry> {
        self.entries.iter()
    }

    pub fn mark_disconnected(&mut self, id: ParticipantID) -> bool {
        match self.entry_mut(id) {
            Some(entry) => {
                entry.connected = false;
                true
            }
            None => false,
        }
    }

    pub fn connected_ids(&self) -> Vec<ParticipantID> {
        self.entries
            .iter()
            .filter(|entry| entry.connected)
            .map(|entry| entry.id)
            .collect()
    }

    // wipe every car's progress ahead of a rematch
    pub fn reset_all(&mut self) {
        for entry in &mut self.entries {
            entry.progress.reset();
        }
    }

    // empty the roster, handing back whoever is left
    pub fn drain(&mut self) -> Vec<RosterEntry> {
        self.entries.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;
    use slipstream_core::Uuid;

    fn two_slot_roster() -> Roster {
        Roster::new(vec![
            EntityLocation::new(DVec3::new(-4.0, 0.0, 0.0), DVec3::X),
            EntityLocation::new(DVec3::new(4.0, 0.0, 0.0), DVec3::X),
        ])
    }

    #[test]
    fn test_registration_assigns_grid_slots_in_order() {
        let mut roster = two_slot_roster();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        let slot_a = roster.register(a).unwrap().start_location;
        let slot_b = roster.register(b).unwrap().start_location;

        assert_eq!(slot_a.position, DVec3::new(-4.0, 0.0, 0.0));
        assert_eq!(slot_b.position, DVec3::new(4.0, 0.0, 0.0));
        assert!(roster.is_full());
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut roster = two_slot_roster();
        let a = Uuid::new_v4();
        roster.register(a).unwrap();

        assert_eq!(
            roster.register(a).unwrap_err(),
            RosterError::AlreadyRegistered(a)
        );
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_full_roster_rejects_registration() {
        let mut roster = two_slot_roster();
        roster.register(Uuid::new_v4()).unwrap();
        roster.register(Uuid::new_v4()).unwrap();

        assert_eq!(
            roster.register(Uuid::new_v4()).unwrap_err(),
            RosterError::MatchFull
        );
    }

    #[test]
    fn test_unregister_unknown_participant() {
        let mut roster = two_slot_roster();
        let ghost = Uuid::new_v4();

        assert_eq!(roster.unregister(ghost).unwrap_err(), RosterError::Unknown(ghost));
    }

    #[test]
    fn test_unregister_removes_entry() {
        let mut roster = two_slot_roster();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        roster.register(a).unwrap();
        roster.register(b).unwrap();

        let removed = roster.unregister(a).unwrap();

        assert_eq!(removed.id, a);
        assert!(!roster.contains(a));
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_connected_ids_skip_disconnected() {
        let mut roster = two_slot_roster();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        roster.register(a).unwrap();
        roster.register(b).unwrap();

        assert!(roster.mark_disconnected(a));

        assert_eq!(roster.connected_ids(), vec![b]);
    }

    #[test]
    fn test_reset_all_wipes_progress() {
        use slipstream_core::track::Checkpoint;
        use std::time::Duration;

        let mut roster = two_slot_roster();
        let a = Uuid::new_v4();
        roster.register(a).unwrap();
        roster
            .entry_mut(a)
            .unwrap()
            .progress
            .pass_checkpoint(
                &Checkpoint::new(1, false, EntityLocation::origin()),
                Duration::from_secs(1),
            );

        roster.reset_all();

        assert_eq!(roster.entry(a).unwrap().progress.checkpoints_passed(), 0);
    }
}
