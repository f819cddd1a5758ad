use std::time::Instant;

use log::{debug, info, warn};

use slipstream_core::events::ClientBoundUpdate;
use slipstream_core::projection::Phase;
use slipstream_core::ParticipantID;

use super::{GamePhase, MatchServer};

impl MatchServer {
    // Rematch confirmation is symmetric: the match only restarts once every
    // participant still in the session has voted. Votes outside the
    // finished phase are stale remote calls and get dropped.
    pub(super) fn process_rematch_vote(&mut self, player: ParticipantID, now: Instant) {
        if !matches!(self.phase, GamePhase::Finished(_)) {
            debug!("dropping rematch vote from {} outside finished", player);
            return;
        }
        if !self.roster.contains(player) {
            warn!("rematch vote from unknown participant {}", player);
            return;
        }
        if !self.rematch_votes.insert(player) {
            debug!("duplicate rematch vote from {}", player);
            return;
        }

        let voters = self.roster.connected_ids();
        info!(
            "{} voted for a rematch ({}/{})",
            player,
            self.rematch_votes.len(),
            voters.len()
        );

        if voters.iter().all(|id| self.rematch_votes.contains(id)) {
            self.restart_match(now);
        }
    }

    // Everyone said yes: back to the grid, wipe the counters, run the
    // countdown again on the same session
    fn restart_match(&mut self, now: Instant) {
        info!("all participants voted for a rematch");

        self.phase = GamePhase::RematchPending;
        self.push_update(ClientBoundUpdate::PhaseChanged(Phase::RematchPending));

        self.rematch_votes.clear();
        self.roster.reset_all();

        let grid: Vec<_> = self
            .roster
            .iter()
            .map(|entry| (entry.id, entry.start_location))
            .collect();
        for (player, location) in grid {
            self.push_update(ClientBoundUpdate::CarPlaced { player, location });
        }

        self.start_countdown(now);
    }
}
