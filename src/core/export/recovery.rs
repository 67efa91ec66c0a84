//! Recovery from fatal errors
//!
//! The list is reloaded from its root view, the traversal session starts
//! over and the window is bounded once before work resumes. A reload that
//! fails is retried with a linear backoff; each attempt counts as one
//! recovery against the consecutive bound.

use crate::adapters::surface::AutomationSurface;
use crate::config::ExporterConfig;
use crate::core::cursor::TraversalSession;
use crate::core::window::EvictionManager;
use crate::domain::{ExporterError, GlobalIndex, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;

/// Backoff stops growing after this many failed reloads
const MAX_BACKOFF_STEPS: u32 = 6;

/// Reloads the list after a fatal error
#[derive(Clone)]
pub struct ListRecovery {
    surface: Arc<dyn AutomationSurface>,
    eviction: EvictionManager,
    root_url: String,
    delay: Duration,
    max_consecutive: Option<u32>,
    shutdown: Option<watch::Receiver<bool>>,
}

impl ListRecovery {
    pub fn new(
        surface: Arc<dyn AutomationSurface>,
        eviction: EvictionManager,
        root_url: impl Into<String>,
        delay: Duration,
    ) -> Self {
        Self {
            surface,
            eviction,
            root_url: root_url.into(),
            delay,
            max_consecutive: None,
            shutdown: None,
        }
    }

    pub fn from_config(
        surface: Arc<dyn AutomationSurface>,
        eviction: EvictionManager,
        config: &ExporterConfig,
    ) -> Self {
        let recovery = Self::new(
            surface,
            eviction,
            config.list.root_url.clone(),
            config.recovery.delay(),
        );
        match config.recovery.max_consecutive {
            Some(max) => recovery.with_max_consecutive(max),
            None => recovery,
        }
    }

    /// Give up once more than `max` recoveries happen without a confirmed
    /// batch in between
    pub fn with_max_consecutive(mut self, max: u32) -> Self {
        self.max_consecutive = Some(max);
        self
    }

    /// Stop retrying reloads once the signal is raised
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Reload the list and reset `session`, keeping `resume` and everything
    /// after it materialized
    ///
    /// `consecutive` counts recoveries since the last confirmed work; every
    /// reload attempt increments it. Callers reset it to zero on progress.
    ///
    /// # Errors
    ///
    /// Returns [`ExporterError::Fatal`] once the consecutive bound is exceeded
    /// and [`ExporterError::Interrupted`] when the shutdown signal is raised
    /// between attempts. A failed eviction afterwards is only logged.
    pub async fn recover(
        &self,
        session: &mut TraversalSession,
        resume: GlobalIndex,
        consecutive: &mut u32,
    ) -> Result<()> {
        let mut attempt = 0u32;

        loop {
            if self.interrupted() {
                return Err(ExporterError::Interrupted(
                    "shutdown requested during recovery".to_string(),
                ));
            }

            *consecutive += 1;
            if let Some(max) = self.max_consecutive {
                if *consecutive > max {
                    return Err(ExporterError::Fatal(format!(
                        "Giving up after {max} consecutive recoveries"
                    )));
                }
            }

            attempt += 1;
            let delay = self.delay * attempt.min(MAX_BACKOFF_STEPS);
            tracing::warn!(
                attempt = attempt,
                delay_secs = delay.as_secs(),
                url = %self.root_url,
                "Recovering: reloading list"
            );
            sleep(delay).await;

            match self.surface.navigate(&self.root_url).await {
                Ok(()) => break,
                Err(e) => {
                    tracing::warn!(attempt = attempt, error = %e, "Recovery reload failed");
                }
            }
        }

        session.reset();

        if let Err(e) = self.eviction.evict_before(session, resume).await {
            tracing::warn!(error = %e, "Post-recovery eviction failed");
        }
        Ok(())
    }

    fn interrupted(&self) -> bool {
        self.shutdown.as_ref().is_some_and(|rx| *rx.borrow())
    }
}
