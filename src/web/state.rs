use crate::services::lifecycle::SlugLifecycles;
use crate::services::patterns::PopulatePatterns;
use crate::{Config, Database};

pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub lifecycles: SlugLifecycles,
    pub patterns: PopulatePatterns,
}

impl AppState {
    pub fn new(config: Config, db: Database) -> Self {
        let lifecycles = SlugLifecycles::register(&config.schema);
        let patterns = PopulatePatterns::from_config(&config);

        Self {
            config,
            db,
            lifecycles,
            patterns,
        }
    }
}
