pub mod analyze;
pub mod misc;
pub mod serve;
pub mod settings;

pub use analyze::analyze_repo;
pub use misc::{display_banner, generate_completions};
pub use serve::serve;
pub use settings::show_config;
