use slipstream_core::lap_info::Placement;
use slipstream_core::ParticipantID;

use crate::progress::CarProgress;

// Recompute the total ordering after a car passes a checkpoint. Cars that
// are done racing rank ahead of cars still going; among the rest, more
// checkpoints passed ranks ahead and equal counts go to whoever reached
// that count first. The sort is stable, so an exact tie keeps the caller's
// (registration) order.
pub fn recompute(progress: &[(ParticipantID, &CarProgress)]) -> Vec<(ParticipantID, Placement)> {
    let mut order = progress.to_vec();
    order.sort_by(|(_, a), (_, b)| {
        b.race_completed()
            .cmp(&a.race_completed())
            .then(b.checkpoints_passed().cmp(&a.checkpoints_passed()))
            .then(a.last_pass_timestamp().cmp(&b.last_pass_timestamp()))
    });

    order
        .iter()
        .enumerate()
        .map(|(index, (id, _))| (*id, index as Placement + 1))
        .collect()
}
