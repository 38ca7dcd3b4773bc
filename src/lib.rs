pub mod bisim;
pub mod domains;
pub mod error;
pub mod kripke;
pub mod language;
pub mod logic;
pub mod search;
pub mod util;

pub use error::Error;
pub use error::Result;

/// index aliases shared across the crate
pub type Atom = usize;
pub type Agent = usize;
pub type World = usize;
pub type Event = usize;
pub type LabelId = usize;
pub type StateId = usize;
pub type Depth = usize;

/// depth assigned to worlds no path from the designated set reaches
pub const UNREACHABLE: Depth = usize::MAX;

/// label id reserved for "not yet interned"
pub const NULL_LABEL: LabelId = 0;

/// does a world at distance `depth` from the designated set still have
/// refinement budget left at stratum `h` of a depth-`k` refinement?
pub(crate) fn within_budget(k: Depth, h: Depth, depth: Depth) -> bool {
    depth.saturating_add(h) < k
}

/// initialize logging to terminal and a timestamped file under logs/
#[cfg(feature = "cli")]
pub fn init() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}
