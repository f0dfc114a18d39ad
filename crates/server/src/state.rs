use crate::{completion::CompletionWorkflow, config::Config, db::Database, delivery, locks::ClassLocks};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub completion: CompletionWorkflow<Database>,
    pub class_locks: Arc<ClassLocks>,
}

impl AppState {
    pub fn new(db: Database, config: &Config) -> Self {
        let channel = delivery::from_config(config);
        let completion = CompletionWorkflow::new(db.clone(), channel, config.notifications.policy);
        let class_locks = Arc::new(ClassLocks::new(config.notifications.serialize_per_class));

        Self {
            db,
            completion,
            class_locks,
        }
    }
}
