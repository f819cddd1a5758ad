use std::collections::HashSet;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use slipstream_core::events::{ClientBoundUpdate, ServerBoundEvent};
use slipstream_core::lap_info::CheckpointID;
use slipstream_core::projection::{Phase, StateProjection};
use slipstream_core::track::Track;
use slipstream_core::{ParticipantID, GLOBAL_CONFIG};

use crate::progress::PassOutcome;
use crate::roster::{Roster, RosterError};
use crate::standings;
use crate::timer::TimerService;

use self::phase::*;

mod phase;
mod rematch;

// Which scheduled wakeup fired
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerKind {
    CountdownTick,
    DecelerationDone,
}

// The authoritative owner of one match. All mutation happens here, on the
// server; clients only ever receive the updates queued in `outgoing`.
pub struct MatchServer {
    track: Track,
    roster: Roster,
    timers: TimerService<TimerKind>,
    phase: GamePhase,
    rematch_votes: HashSet<ParticipantID>,
    outgoing: Vec<ClientBoundUpdate>,
    released: Vec<ParticipantID>,
}

impl MatchServer {
    pub fn new(track: Track) -> MatchServer {
        let slots = GLOBAL_CONFIG.player_amount.min(track.starting_grid().len());
        if slots < GLOBAL_CONFIG.player_amount {
            warn!(
                "track {} has {} grid slots, capping the match at that",
                track.name, slots
            );
        }
        let grid = track.starting_grid()[..slots].to_vec();

        MatchServer {
            track,
            roster: Roster::new(grid),
            timers: TimerService::new(),
            phase: GamePhase::Lobby,
            rematch_votes: HashSet::new(),
            outgoing: Vec::new(),
            released: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase.as_client_phase()
    }

    pub fn capacity(&self) -> usize {
        self.roster.capacity()
    }

    // A participant takes a grid slot; once the last expected one arrives
    // the countdown begins
    pub fn register_player(
        &mut self,
        player: ParticipantID,
        now: Instant,
    ) -> Result<(), RosterError> {
        if !matches!(self.phase, GamePhase::Lobby) {
            debug!("dropping registration of {} after match start", player);
            return Err(RosterError::AlreadyStarted);
        }

        let location = self.roster.register(player)?.start_location;
        self.push_update(ClientBoundUpdate::CarPlaced { player, location });

        if self.roster.is_full() {
            info!("all {} participants registered", self.roster.len());
            self.start_countdown(now);
        }
        Ok(())
    }

    // Apply one event from the engine/transport layer. Events are processed
    // strictly in arrival order; anything that doesn't fit the current phase
    // is a stale or duplicate remote call and gets dropped, not failed.
    pub fn handle_event(&mut self, event: ServerBoundEvent, now: Instant) {
        match event {
            ServerBoundEvent::CheckpointTrigger { player, checkpoint } => {
                self.process_checkpoint_trigger(player, checkpoint, now)
            }
            ServerBoundEvent::FinishLineCrossed { player } => {
                self.process_finish_object(player, now)
            }
            ServerBoundEvent::ResetRequest { player } => self.process_reset_request(player),
            ServerBoundEvent::RematchVote { player } => self.process_rematch_vote(player, now),
            ServerBoundEvent::ExitRequest { player } => self.end_match(player, false),
            ServerBoundEvent::Disconnect { player } => self.end_match(player, true),
        }
    }

    // Fire whatever timers are due; called once per server tick
    pub fn tick(&mut self, now: Instant) {
        for kind in self.timers.fire_due(now) {
            match kind {
                TimerKind::CountdownTick => self.advance_countdown(now),
                TimerKind::DecelerationDone => self.finish_deceleration(),
            }
        }
    }

    // Updates queued for the transport layer, in emission order
    pub fn drain_outgoing(&mut self) -> Vec<ClientBoundUpdate> {
        std::mem::take(&mut self.outgoing)
    }

    // Participants handed back to the external waiting pool
    pub fn drain_released(&mut self) -> Vec<ParticipantID> {
        std::mem::take(&mut self.released)
    }

    pub fn projection_for(&self, player: ParticipantID) -> Option<StateProjection> {
        self.roster.entry(player).map(|entry| StateProjection {
            phase: self.phase.as_client_phase(),
            lap_information: entry.progress.lap_information(),
            placement: entry.progress.placement(),
        })
    }

    fn push_update(&mut self, update: ClientBoundUpdate) {
        self.outgoing.push(update);
    }

    fn start_countdown(&mut self, now: Instant) {
        // a re-entry (rematch) may still have the deceleration stop pending
        self.timers.cancel_all();

        let seconds_remaining = GLOBAL_CONFIG.countdown_seconds;
        let tick_timer = self
            .timers
            .schedule(TimerKind::CountdownTick, now + Duration::from_secs(1));
        self.phase = GamePhase::Countdown(CountdownState {
            seconds_remaining,
            tick_timer,
        });
        self.push_update(ClientBoundUpdate::PhaseChanged(Phase::Countdown));
        self.push_update(ClientBoundUpdate::CountdownTick { seconds_remaining });
    }

    fn advance_countdown(&mut self, now: Instant) {
        let seconds_remaining = match &mut self.phase {
            GamePhase::Countdown(state) => {
                state.seconds_remaining = state.seconds_remaining.saturating_sub(1);
                state.seconds_remaining
            }
            // a stale wakeup after the countdown was torn down
            _ => return,
        };

        if seconds_remaining > 0 {
            let tick_timer = self
                .timers
                .schedule(TimerKind::CountdownTick, now + Duration::from_secs(1));
            if let GamePhase::Countdown(state) = &mut self.phase {
                state.tick_timer = tick_timer;
            }
            self.push_update(ClientBoundUpdate::CountdownTick { seconds_remaining });
        } else {
            self.push_update(ClientBoundUpdate::CountdownTick {
                seconds_remaining: 0,
            });
            self.phase = GamePhase::Racing(RacingState { started_at: now });
            self.push_update(ClientBoundUpdate::PhaseChanged(Phase::Racing));
            self.push_update(ClientBoundUpdate::CarsEnabled(true));
            info!("race started");
        }
    }

    fn process_checkpoint_trigger(
        &mut self,
        player: ParticipantID,
        checkpoint_id: CheckpointID,
        now: Instant,
    ) {
        let race_clock = match &self.phase {
            GamePhase::Racing(state) => now.saturating_duration_since(state.started_at),
            _ => {
                debug!("dropping checkpoint trigger for {} outside racing", player);
                return;
            }
        };

        let checkpoint = match self.track.checkpoint(checkpoint_id) {
            Some(checkpoint) => *checkpoint,
            None => {
                warn!(
                    "checkpoint {} is not on track {}",
                    checkpoint_id, self.track.name
                );
                return;
            }
        };

        let (outcome, laps) = match self.roster.entry_mut(player) {
            Some(entry) => (
                entry.progress.pass_checkpoint(&checkpoint, race_clock),
                entry.progress.laps_completed(),
            ),
            None => {
                warn!("checkpoint trigger for unknown participant {}", player);
                return;
            }
        };

        match outcome {
            PassOutcome::Advanced {
                lap_completed,
                race_won,
            } => {
                if lap_completed {
                    self.push_update(ClientBoundUpdate::LapUpdate { player, lap: laps });
                }
                self.recompute_placements();
                if race_won {
                    self.declare_winner(player, race_clock, now);
                }
            }
            PassOutcome::Misorder { expected } => {
                warn!(
                    "{} hit checkpoint {} while expecting {}",
                    player, checkpoint_id, expected
                );
                self.push_update(ClientBoundUpdate::MisorderWarning {
                    player,
                    expected_checkpoint: expected,
                });
            }
            PassOutcome::Ignored => {}
        }
    }

    // Tracks with an explicit finish object end the race on contact,
    // whatever the checkpoint counters say
    fn process_finish_object(&mut self, player: ParticipantID, now: Instant) {
        let race_clock = match &self.phase {
            GamePhase::Racing(state) => now.saturating_duration_since(state.started_at),
            _ => {
                debug!("dropping finish-line crossing for {} outside racing", player);
                return;
            }
        };

        match self.roster.entry_mut(player) {
            Some(entry) => entry.progress.force_complete(),
            None => {
                warn!("finish-line crossing for unknown participant {}", player);
                return;
            }
        }

        self.declare_winner(player, race_clock, now);
    }

    fn process_reset_request(&mut self, player: ParticipantID) {
        if !matches!(self.phase, GamePhase::Racing(_)) {
            debug!("dropping reset request from {} outside racing", player);
            return;
        }

        let target = match self.roster.entry_mut(player) {
            Some(entry) => entry.progress.take_reset_target(),
            None => {
                warn!("reset request from unknown participant {}", player);
                return;
            }
        };
        let target = match target {
            Some(target) => target,
            None => {
                debug!("reset request from {} without an armed reset", player);
                return;
            }
        };

        let location = match self.track.checkpoint(target) {
            Some(checkpoint) => checkpoint.reset_location,
            None => {
                warn!("reset target {} is not on track {}", target, self.track.name);
                return;
            }
        };
        info!("teleporting {} back to checkpoint {}", player, target);
        self.push_update(ClientBoundUpdate::CarReset { player, location });
    }

    fn recompute_placements(&mut self) {
        let placements = {
            let progress: Vec<_> = self
                .roster
                .iter()
                .map(|entry| (entry.id, &entry.progress))
                .collect();
            standings::recompute(&progress)
        };

        let mut changed = Vec::new();
        for (id, placement) in placements {
            if let Some(entry) = self.roster.entry_mut(id) {
                if entry.progress.placement() != placement {
                    entry.progress.set_placement(placement);
                    changed.push((id, placement));
                }
            }
        }
        for (player, placement) in changed {
            self.push_update(ClientBoundUpdate::PlacementUpdate { player, placement });
        }
    }

    // First race-won signal wins; the phase flips to Finished so anything
    // arriving later is dropped at the phase gate
    fn declare_winner(&mut self, winner: ParticipantID, race_time: Duration, now: Instant) {
        info!("{} won the race after {:?}", winner, race_time);

        self.timers.cancel_all();
        let decel_timer = self.timers.schedule(
            TimerKind::DecelerationDone,
            now + Duration::from_millis(GLOBAL_CONFIG.deceleration_ms),
        );
        self.phase = GamePhase::Finished(FinishedState {
            winner,
            decel_timer: Some(decel_timer),
        });

        self.push_update(ClientBoundUpdate::PhaseChanged(Phase::Finished));
        self.push_update(ClientBoundUpdate::CarsEnabled(false));
        self.push_update(ClientBoundUpdate::RaceWon { winner, race_time });

        let banners: Vec<_> = self
            .roster
            .iter()
            .map(|entry| {
                let text = if entry.id == winner { "Winner!" } else { "Loser!" };
                (entry.id, text.to_string())
            })
            .collect();
        for (player, text) in banners {
            self.push_update(ClientBoundUpdate::InfoText { player, text });
        }
    }

    // Cars keep rolling for a moment after the flag; once the window
    // elapses the presentation layer zeroes them out
    fn finish_deceleration(&mut self) {
        let winner = match &mut self.phase {
            GamePhase::Finished(state) if state.decel_timer.is_some() => {
                state.decel_timer = None;
                state.winner
            }
            // stale wakeup; the session moved on before the cars stopped
            _ => return,
        };
        debug!("deceleration window over; {} holds the podium", winner);
        self.push_update(ClientBoundUpdate::CarsStopped);
    }

    // An exit request or a disconnect ends the session for everyone; the
    // remainder goes back to the external waiting pool exactly once
    fn end_match(&mut self, leaver: ParticipantID, disconnected: bool) {
        if matches!(self.phase, GamePhase::Exited) {
            debug!("dropping exit/disconnect for an already-ended session");
            return;
        }

        if disconnected {
            // keep the entry around so the drain below can tell the leaver
            // apart from the participants owed a trip back to the pool
            if !self.roster.mark_disconnected(leaver) {
                warn!("disconnect for unknown participant {}", leaver);
                return;
            }
            info!("{} disconnected from the match", leaver);
        } else {
            match self.roster.unregister(leaver) {
                Ok(_) => info!("{} left the match", leaver),
                Err(e) => {
                    warn!("{}", e);
                    return;
                }
            }
        }

        // pending wakeups and votes must not outlive the session
        match &self.phase {
            GamePhase::Countdown(state) => {
                self.timers.cancel(state.tick_timer);
            }
            GamePhase::Finished(state) => {
                if let Some(handle) = state.decel_timer {
                    self.timers.cancel(handle);
                }
            }
            _ => {}
        }
        self.rematch_votes.clear();
        self.phase = GamePhase::Exited;
        self.push_update(ClientBoundUpdate::PhaseChanged(Phase::Exited));

        for entry in self.roster.drain() {
            if entry.connected {
                self.released.push(entry.id);
            }
        }
    }
}
