//! Outbound calls: the identity exchange and the generation call.

use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::errors::AppError;

pub mod generation;
pub mod iam;

pub use generation::GenerationClient;
pub use iam::IamClient;

/// Everything a session needs to reach watsonx.ai. Shared by all sessions.
pub struct Upstream {
    pub iam: IamClient,
    pub generation: GenerationClient,
    api_key: Option<String>,
    clock: Arc<dyn Clock>,
}

impl Upstream {
    pub fn new(iam: IamClient, generation: GenerationClient, api_key: Option<String>) -> Self {
        Self {
            iam,
            generation,
            api_key,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn from_config(cfg: &Config) -> Result<Self, AppError> {
        Ok(Self::new(
            IamClient::new(&cfg.iam_url)?,
            GenerationClient::new(cfg.base_url.clone(), &cfg.model_id, &cfg.api_version)?,
            cfg.api_key.clone(),
        ))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }
}
