use config::{Config, ConfigError, File};
use lazy_static::lazy_static;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct Settings {
    pub laps_to_complete: u8,
    pub countdown_seconds: u64,
    pub deceleration_ms: u64,
    pub player_amount: usize,
    pub server_tick_ms: u64,
    pub track_file: String,
}

impl Settings {
    fn new() -> Result<Settings, ConfigError> {
        let config = Config::builder()
            .set_default("laps_to_complete", 2)?
            .set_default("countdown_seconds", 3)?
            .set_default("deceleration_ms", 1500)?
            .set_default("player_amount", 2)?
            .set_default("server_tick_ms", 30)?
            .set_default("track_file", "track.json")?
            .add_source(File::with_name("config.yaml").required(false))
            .build()?;

        config.try_deserialize()
    }
}

lazy_static! {
    pub static ref GLOBAL_CONFIG: Settings = Settings::new().expect("failed to read config file");
}
