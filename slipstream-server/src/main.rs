use std::thread;
use std::time::{Duration, Instant};

use glam::DVec3;
use log::{info, warn};
use rand::Rng;

use slipstream_core::entity_location::EntityLocation;
use slipstream_core::events::{ClientBoundUpdate, ServerBoundEvent};
use slipstream_core::lap_info::CheckpointID;
use slipstream_core::projection::Phase;
use slipstream_core::track::{Checkpoint, Track};
use slipstream_core::{ParticipantID, Uuid, GLOBAL_CONFIG};

mod game;
mod progress;
mod roster;
mod standings;
mod timer;

use game::MatchServer;

fn main() {
    env_logger::init();

    let track = Track::load(&GLOBAL_CONFIG.track_file).unwrap_or_else(|e| {
        warn!(
            "could not load {} ({}), falling back to the exhibition track",
            GLOBAL_CONFIG.track_file, e
        );
        exhibition_track()
    });
    info!(
        "running an exhibition match on {} ({} checkpoints)",
        track.name,
        track.checkpoint_count()
    );

    let checkpoint_count = track.checkpoint_count() as CheckpointID;
    let mut server = MatchServer::new(track);

    let players: Vec<ParticipantID> = (0..server.capacity()).map(|_| Uuid::new_v4()).collect();
    for &player in &players {
        if let Err(e) = server.register_player(player, Instant::now()) {
            warn!("{}", e);
        }
    }

    // each simulated car knows which gate it is hunting next, the way the
    // physics layer would
    let mut next_checkpoint: Vec<CheckpointID> = vec![1; players.len()];
    let mut rng = rand::thread_rng();
    let tick_duration = Duration::from_millis(GLOBAL_CONFIG.server_tick_ms);

    loop {
        let start_time = Instant::now();
        server.tick(start_time);

        if server.phase() == Phase::Racing {
            for (i, &player) in players.iter().enumerate() {
                // faster grid slots reach their next gate a little more often
                let pace = 0.03 + 0.01 * (players.len() - i) as f64;
                if rng.gen_bool(pace) {
                    server.handle_event(
                        ServerBoundEvent::CheckpointTrigger {
                            player,
                            checkpoint: next_checkpoint[i],
                        },
                        Instant::now(),
                    );
                    next_checkpoint[i] = if next_checkpoint[i] == checkpoint_count {
                        1
                    } else {
                        next_checkpoint[i] + 1
                    };
                }
            }
        }

        for update in server.drain_outgoing() {
            info!("update: {:?}", update);
            if update == ClientBoundUpdate::CarsStopped {
                // the podium is settled; wind the exhibition down
                for &player in &players {
                    if let Some(projection) = server.projection_for(player) {
                        info!(
                            "final standings for {}: place {} after {} laps",
                            player, projection.placement, projection.lap_information.lap
                        );
                    }
                }
                server.handle_event(
                    ServerBoundEvent::ExitRequest { player: players[0] },
                    Instant::now(),
                );
            }
        }

        for player in server.drain_released() {
            info!("{} returned to the waiting pool", player);
        }

        if server.phase() == Phase::Exited {
            break;
        }

        // wait out the rest of the server tick
        thread::sleep(tick_duration.saturating_sub(start_time.elapsed()));
    }
}

// a five-gate ring used when no track file is configured
fn exhibition_track() -> Track {
    let gate = |id: CheckpointID, is_finish_line, x: f64, z: f64| {
        Checkpoint::new(
            id,
            is_finish_line,
            EntityLocation::new(DVec3::new(x, 0.0, z), DVec3::X),
        )
    };
    Track::new(
        "exhibition ring".to_string(),
        vec![
            gate(1, false, 40.0, 0.0),
            gate(2, false, 40.0, 40.0),
            gate(3, false, 0.0, 60.0),
            gate(4, false, -40.0, 40.0),
            gate(5, true, 0.0, 0.0),
        ],
        vec![
            EntityLocation::new(DVec3::new(-4.0, 0.0, -8.0), DVec3::X),
            EntityLocation::new(DVec3::new(4.0, 0.0, -8.0), DVec3::X),
            EntityLocation::new(DVec3::new(-4.0, 0.0, -16.0), DVec3::X),
            EntityLocation::new(DVec3::new(4.0, 0.0, -16.0), DVec3::X),
        ],
    )
    .expect("the built-in track is well-formed")
}
