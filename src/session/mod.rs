use crate::common::config::ConfigOptions;
use crate::common::utils::canonicalize;
use crate::dataframe::DataFrame;
use crate::expr::logical_plan::builder::LogicalPlanBuilder;
use crate::storage::Table;
use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Clone)]
pub struct SessionContext {
    session_id: String,
    session_start_time: DateTime<Utc>,
    state: Arc<RwLock<SessionState>>,
}

#[derive(Clone)]
pub struct SessionState {
    session_id: String,
    tables: HashMap<String, Arc<dyn Table>>,
    config: ConfigOptions,
}

impl SessionState {
    pub fn new(config: ConfigOptions) -> Self {
        let session_id = Uuid::new_v4().to_string();
        Self {
            session_id,
            tables: HashMap::new(),
            config,
        }
    }
    pub fn config(&self) -> &ConfigOptions {
        &self.config
    }
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
    /// look up a table, the name is canonicalized first
    pub fn table(&self, name: &str) -> Option<Arc<dyn Table>> {
        self.tables.get(&canonicalize(name)).cloned()
    }
}

impl SessionContext {
    pub fn new() -> Self {
        Self::new_with_config(ConfigOptions::new())
    }

    pub fn new_with_config(config: ConfigOptions) -> Self {
        let state = SessionState::new(config);
        info!(session_id = state.session_id.as_str(), "session created");
        Self {
            session_id: state.session_id.clone(),
            session_start_time: Utc::now(),
            state: Arc::new(RwLock::new(state)),
        }
    }

    pub fn session_start_time(&self) -> DateTime<Utc> {
        self.session_start_time
    }

    pub fn session_id(&self) -> String {
        self.session_id.clone()
    }

    /// a snapshot of the current options
    pub fn config(&self) -> ConfigOptions {
        self.state.read().config.clone()
    }

    pub fn set_config(&self, key: &str, value: &str) -> Result<()> {
        self.state.write().config.set(key, value)?;
        info!(key, value, "config updated");
        Ok(())
    }

    /// register a table under its canonical name, returning the table it replaced
    pub fn register_table(
        &self,
        name: impl AsRef<str>,
        table: Arc<dyn Table>,
    ) -> Result<Option<Arc<dyn Table>>> {
        let name = canonicalize(name.as_ref());
        info!(table = name.as_str(), "register table");
        Ok(self.state.write().tables.insert(name, table))
    }

    pub fn deregister_table(&self, name: impl AsRef<str>) -> Option<Arc<dyn Table>> {
        self.state.write().tables.remove(&canonicalize(name.as_ref()))
    }

    pub fn table_names(&self) -> Vec<String> {
        let mut names = self.state.read().tables.keys().cloned().collect::<Vec<_>>();
        names.sort();
        names
    }

    /// a dataframe scanning the registered table
    pub fn table(&self, name: impl AsRef<str>) -> Result<DataFrame> {
        let name = canonicalize(name.as_ref());
        let source = self
            .state
            .read()
            .tables
            .get(&name)
            .cloned()
            .ok_or_else(|| anyhow!("table {name} not found"))?;
        let plan = LogicalPlanBuilder::scan(name, source)?.build()?;
        Ok(DataFrame::new(self.state.clone(), plan))
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}
