//! Compiled-in parameters of the scene.

// Window
pub const SCR_WIDTH: u32 = 1586 / 2;
pub const SCR_HEIGHT: u32 = 1186 / 2;
pub const WINDOW_TITLE: &str = "Snowing";

// Assets
pub const BACKGROUND_TEXTURE_PATH: &str = "textures/background.png";
pub const SNOW_TEXTURE_PATH: &str = "textures/snow.png";
/// File name fragment that marks the image needing synthesized alpha.
pub const SNOW_TEXTURE_MARKER: &str = "snow";
pub const WHITE_THRESHOLD: u8 = 245;

// Population
pub const MAX_SNOWFLAKES: usize = 100;
pub const INITIAL_MAX_SNOWFLAKES: usize = 20;
pub const SNOWFLAKE_INCREASE_RATE: usize = 10;
pub const SNOWFLAKE_INCREASE_INTERVAL: f64 = 1.0;

// Physics
pub const GRAVITY: f32 = -0.98 * 2.0;
pub const AIR_RESISTANCE: f32 = 0.98;
pub const WIND_STRENGTH: f32 = 0.01;
pub const SPAWN_HEIGHT: f32 = 1.1;
pub const BOUNDS: f32 = 1.1;
/// Half-width of the horizontal band fresh flakes are scattered over.
pub const SPAWN_SPREAD: f32 = 1.5;

// Rendering
pub const SNOW_ALPHA: f32 = 1.0;
