use crate::browser;
use crate::engine::Point;
use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

pub const SETTINGS_PATH: &str = "settings.json";

/// Tunables for a session, every field can be overridden from
/// `settings.json` and anything missing keeps its default
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub assets: AssetSettings,
    pub bird: BirdSettings,
    pub obstacles: ObstacleSettings,
    pub background: BackgroundSettings,
    pub hud: HudSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetSettings {
    pub bird: String,
    pub background: String,
    pub obstacle: String,
}

impl Default for AssetSettings {
    fn default() -> Self {
        AssetSettings {
            bird: "Fighter.png".to_string(),
            background: "background.jpg".to_string(),
            obstacle: "pillar.png".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BirdSettings {
    pub x: f64,
    pub width: f64,
    pub height: f64,
    // per frame, positive is down because the canvas origin is top left
    pub gravity: f64,
    pub flap_impulse: f64,
}

impl Default for BirdSettings {
    fn default() -> Self {
        BirdSettings {
            x: 200.0,
            width: 100.0,
            height: 100.0,
            gravity: 0.4,
            flap_impulse: -8.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObstacleSettings {
    pub width: f64,
    pub min_height: f64,
    pub max_height: f64,
    pub speed: f64,
    pub spawn_interval_ms: f64,
}

impl Default for ObstacleSettings {
    fn default() -> Self {
        ObstacleSettings {
            width: 150.0,
            min_height: 50.0,
            max_height: 250.0,
            speed: 5.0,
            spawn_interval_ms: 1500.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BackgroundSettings {
    pub speed: f64,
}

impl Default for BackgroundSettings {
    fn default() -> Self {
        BackgroundSettings { speed: -1.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HudSettings {
    pub color: String,
    pub score_font: String,
    pub score_x: f64,
    pub score_y: f64,
    pub game_over_font: String,
    // the game over text starts this far left of the canvas center
    pub game_over_offset: f64,
}

impl HudSettings {
    pub fn score_position(&self) -> Point {
        Point {
            x: self.score_x,
            y: self.score_y,
        }
    }
}

impl Default for HudSettings {
    fn default() -> Self {
        HudSettings {
            color: "#000".to_string(),
            score_font: "24px Arial".to_string(),
            score_x: 20.0,
            score_y: 40.0,
            game_over_font: "48px Arial".to_string(),
            game_over_offset: 120.0,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        let bird = &self.bird;
        let obstacles = &self.obstacles;
        let numbers = [
            bird.x,
            bird.width,
            bird.height,
            bird.gravity,
            bird.flap_impulse,
            obstacles.width,
            obstacles.min_height,
            obstacles.max_height,
            obstacles.speed,
            obstacles.spawn_interval_ms,
            self.background.speed,
        ];
        ensure!(
            numbers.iter().all(|n| n.is_finite()),
            "settings must only contain finite numbers"
        );
        ensure!(
            bird.width > 0.0 && bird.height > 0.0,
            "bird size must be positive, got {}x{}",
            bird.width,
            bird.height
        );
        ensure!(
            obstacles.width > 0.0 && obstacles.min_height > 0.0,
            "obstacle size must be positive"
        );
        ensure!(
            obstacles.min_height <= obstacles.max_height,
            "obstacle min_height {} is above max_height {}",
            obstacles.min_height,
            obstacles.max_height
        );
        ensure!(
            obstacles.spawn_interval_ms >= 0.0,
            "spawn interval cannot be negative"
        );
        // obstacles only score once they leave through the left edge
        ensure!(
            obstacles.speed > 0.0,
            "obstacle speed must be positive, got {}",
            obstacles.speed
        );
        // the wrap only triggers while scrolling left
        ensure!(
            self.background.speed < 0.0,
            "background speed must be negative, got {}",
            self.background.speed
        );
        Ok(())
    }
}

/// Fetch `settings.json`, falling back to the defaults when it is absent
/// or unusable
pub async fn load() -> Settings {
    match browser::fetch_json::<Settings>(SETTINGS_PATH).await {
        Ok(settings) => match settings.validate() {
            Ok(()) => {
                log!("Loaded settings from {}", SETTINGS_PATH);
                settings
            }
            Err(err) => {
                error!("Ignoring {} : {:#}", SETTINGS_PATH, err);
                Settings::default()
            }
        },
        Err(err) => {
            log!("Using default settings ({:#})", err);
            Settings::default()
        }
    }
}
