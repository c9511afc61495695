pub mod debug;
pub mod hud;
pub mod overlay;

pub use debug::DebugStats;
pub use hud::{Banner, DamageFlash, HudSnapshot, ScreenState, UiActions};
pub use overlay::UiOverlay;
