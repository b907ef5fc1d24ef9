pub mod callbacks;
pub mod compile;
pub mod epoch_stats;
pub mod fit;
pub mod train_config;

pub use compile::{CompileOptions, Compiled, Metric};
pub use epoch_stats::{EpochStats, History};
pub use fit::fit;
pub use train_config::FitConfig;
