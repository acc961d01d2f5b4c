pub mod eval;
pub mod game;
pub mod learn;
pub mod model;

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "parlor"
    }

    pub const fn tagline() -> &'static str {
        "Card-table learners"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
