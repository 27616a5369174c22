//! Test doubles for [`Migration`], [`ExecutionContext`] and [`ContextSource`].
//!
//! Useful wherever a real database is unavailable or irrelevant: the runner's
//! unit tests drive these instead of PostgreSQL.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::{ContextSource, ExecutionContext, Migration, SqlRow, SqlValue, StatementError};

/// Shared, ordered log of `"<name>:up"` / `"<name>:down"` invocations.
pub type CallJournal = Arc<Mutex<Vec<String>>>;

/// Behaviour injected into `MockMigration` at construction time.
pub enum MockBehaviour {
    /// Both directions succeed.
    Succeed,
    /// `up` fails with the given message.
    FailUp(String),
    /// `down` fails with the given message.
    FailDown(String),
}

/// A migration that records every call it receives.
pub struct MockMigration {
    /// Label written to the journal.
    pub name: String,
    pub behaviour: MockBehaviour,
    /// All invocations across every mock sharing this journal (in call order).
    pub journal: CallJournal,
}

impl MockMigration {
    /// A mock whose `up` and `down` always succeed.
    pub fn succeeding(name: impl Into<String>, journal: &CallJournal) -> Self {
        Self {
            name: name.into(),
            behaviour: MockBehaviour::Succeed,
            journal: Arc::clone(journal),
        }
    }

    /// A mock whose `up` always fails.
    pub fn failing_up(name: impl Into<String>, msg: impl Into<String>, journal: &CallJournal) -> Self {
        Self {
            name: name.into(),
            behaviour: MockBehaviour::FailUp(msg.into()),
            journal: Arc::clone(journal),
        }
    }

    /// A mock whose `down` always fails.
    pub fn failing_down(
        name: impl Into<String>,
        msg: impl Into<String>,
        journal: &CallJournal,
    ) -> Self {
        Self {
            name: name.into(),
            behaviour: MockBehaviour::FailDown(msg.into()),
            journal: Arc::clone(journal),
        }
    }

    fn record(&self, direction: &str) {
        self.journal
            .lock()
            .unwrap()
            .push(format!("{}:{direction}", self.name));
    }
}

#[async_trait]
impl Migration for MockMigration {
    async fn up(&self, ctx: &mut dyn ExecutionContext) -> Result<(), StatementError> {
        self.record("up");
        ctx.batch(&format!("-- up {}", self.name)).await?;
        match &self.behaviour {
            MockBehaviour::FailUp(msg) => Err(StatementError::Failed(msg.clone())),
            _ => Ok(()),
        }
    }

    async fn down(&self, ctx: &mut dyn ExecutionContext) -> Result<(), StatementError> {
        self.record("down");
        ctx.batch(&format!("-- down {}", self.name)).await?;
        match &self.behaviour {
            MockBehaviour::FailDown(msg) => Err(StatementError::Failed(msg.clone())),
            _ => Ok(()),
        }
    }
}

/// A context that records statements and scripts instead of running them.
#[derive(Default, Clone)]
pub struct MockContext {
    statements: Arc<Mutex<Vec<(String, Vec<SqlValue>)>>>,
    scripts: Arc<Mutex<Vec<String>>>,
}

impl MockContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Statements passed to `execute`, with their parameters.
    pub fn statements(&self) -> Vec<(String, Vec<SqlValue>)> {
        self.statements.lock().unwrap().clone()
    }

    /// Scripts passed to `batch`.
    pub fn scripts(&self) -> Vec<String> {
        self.scripts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExecutionContext for MockContext {
    async fn execute(
        &mut self,
        statement: &str,
        params: &[SqlValue],
    ) -> Result<Vec<SqlRow>, StatementError> {
        self.statements
            .lock()
            .unwrap()
            .push((statement.to_owned(), params.to_vec()));
        Ok(Vec::new())
    }

    async fn batch(&mut self, script: &str) -> Result<(), StatementError> {
        self.scripts.lock().unwrap().push(script.to_owned());
        Ok(())
    }
}

/// A source that hands out clones of one recording [`MockContext`], or
/// refuses every acquisition when built with [`MockSource::unavailable`].
#[derive(Default)]
pub struct MockSource {
    context: MockContext,
    unavailable: bool,
    acquired: Mutex<usize>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A source whose pool is down.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// The context every acquisition shares; inspect it after a run.
    pub fn context(&self) -> &MockContext {
        &self.context
    }

    /// Number of successful acquisitions.
    pub fn acquire_count(&self) -> usize {
        *self.acquired.lock().unwrap()
    }
}

#[async_trait]
impl ContextSource for MockSource {
    async fn acquire(&self) -> Result<Box<dyn ExecutionContext>, StatementError> {
        if self.unavailable {
            return Err(StatementError::Connection("mock pool is unavailable".into()));
        }
        *self.acquired.lock().unwrap() += 1;
        Ok(Box::new(self.context.clone()))
    }
}
