pub mod entity_location;
pub mod events;
pub mod lap_info;
pub mod projection;
pub mod track;
mod settings;

pub use settings::GLOBAL_CONFIG;
pub use uuid::Uuid;

pub type ParticipantID = Uuid;
