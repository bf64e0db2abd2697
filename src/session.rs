use crate::config::Config;
use crate::error::Result;
use crate::hooks::{Hook, Hooks};
use crate::model::Project;
use crate::storage::Storage;

/// Everything a flow needs: the loaded project, the user's config, where to
/// save, and which hooks to run. Passed by reference into every flow.
pub struct Session {
    pub project: Project,
    pub config: Config,
    storage: Box<dyn Storage>,
    hooks: Hooks,
}

impl Session {
    pub fn new(project: Project, config: Config, storage: Box<dyn Storage>, hooks: Hooks) -> Self {
        Self {
            project,
            config,
            storage,
            hooks,
        }
    }

    /// Load the project through `storage` and wrap it in a session.
    pub fn open(config: Config, storage: Box<dyn Storage>, hooks: Hooks) -> Result<Self> {
        let project = storage.load()?;
        Ok(Self::new(project, config, storage, hooks))
    }

    pub fn reporter(&self) -> String {
        self.config.reporter()
    }

    /// Synchronous save after a mutation. On failure the changed flags stay
    /// set, so the next save picks the mutation up again.
    pub fn save(&mut self) -> Result<()> {
        self.storage.save(&self.project).inspect_err(|e| {
            tracing::error!("save failed: {}", e);
        })
    }

    /// Teardown save: writes only when some issue is still marked changed.
    /// Returns whether a save happened.
    pub fn save_if_changed(&mut self) -> Result<bool> {
        if !self.project.has_changes() {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    pub(crate) fn run_hook(&self, hook: Hook, issue_name: &str) {
        self.hooks.run(hook, &[issue_name]);
    }
}
