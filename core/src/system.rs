//! System configuration and sensor maintenance under `/system` and
//! `/firebase/admin`.
//!
//! A missing configuration is a normal state: `parse_get` turns the 404 into
//! `ConfigState::Uninitialized` so the settings screen can offer
//! `build_initialize` instead of an error alert.

use chrono::NaiveDateTime;
use tracing::info;

use crate::client::ApiClient;
use crate::clock::format_local_datetime;
use crate::confirm::{Confirmation, DestructiveAction};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{EnableSimulation, SystemConfig, UpdateSystemConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigState {
    Configured(SystemConfig),
    /// No configuration exists yet; initialize before first use.
    Uninitialized,
}

impl ConfigState {
    pub fn config(&self) -> Option<&SystemConfig> {
        match self {
            ConfigState::Configured(config) => Some(config),
            ConfigState::Uninitialized => None,
        }
    }
}

pub struct ConfigService<'a> {
    client: &'a ApiClient,
}

impl<'a> ConfigService<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub fn build_get(&self) -> HttpRequest {
        self.client.get("/system/config", &[])
    }

    /// Creates the singleton with server defaults. Only valid while
    /// `parse_get` reports `Uninitialized`.
    pub fn build_initialize(&self) -> HttpRequest {
        self.client.post_empty("/system/config/initialize")
    }

    pub fn build_update(&self, patch: &UpdateSystemConfig) -> Result<HttpRequest, ApiError> {
        self.client
            .send_json(HttpMethod::Put, "/system/config", patch)
    }

    /// Turns simulation on and sets the clock override in one call.
    pub fn build_enable_simulation(
        &self,
        simulated: NaiveDateTime,
    ) -> Result<HttpRequest, ApiError> {
        let body = EnableSimulation {
            simulation_mode: true,
            simulated_date_time: format_local_datetime(simulated),
        };
        self.client
            .send_json(HttpMethod::Post, "/system/config/simulation/enable", &body)
    }

    /// Turns simulation off and clears the override in one call.
    pub fn build_disable_simulation(&self) -> HttpRequest {
        self.client.post_empty("/system/config/simulation/disable")
    }

    pub fn build_diagnose(&self) -> HttpRequest {
        self.client.get("/firebase/admin/diagnose", &[])
    }

    pub fn build_clear_command(&self, confirmation: Confirmation) -> Result<HttpRequest, ApiError> {
        if !confirmation.covers(DestructiveAction::ClearCommand) {
            return Err(ApiError::Unconfirmed(DestructiveAction::ClearCommand));
        }
        Ok(self.client.post_empty("/firebase/admin/command/clear"))
    }

    /// Irreversible: wipes every fingerprint template on the sensor.
    pub fn build_format_sensor(&self, confirmation: Confirmation) -> Result<HttpRequest, ApiError> {
        if !confirmation.covers(DestructiveAction::FormatSensor) {
            return Err(ApiError::Unconfirmed(DestructiveAction::FormatSensor));
        }
        Ok(self.client.post_empty("/firebase/admin/command/format"))
    }

    pub fn parse_get(&self, response: HttpResponse) -> Result<ConfigState, ApiError> {
        match self.client.parse_data(response) {
            Ok(config) => Ok(ConfigState::Configured(config)),
            Err(ApiError::NotFound { .. }) => {
                info!("system configuration not initialized");
                Ok(ConfigState::Uninitialized)
            }
            Err(e) => Err(e),
        }
    }

    /// Parser for initialize, update and both simulation toggles.
    pub fn parse_config(&self, response: HttpResponse) -> Result<SystemConfig, ApiError> {
        self.client.parse_data(response)
    }

    /// Maintenance responses have no fixed schema; the whole body is
    /// returned.
    pub fn parse_maintenance(&self, response: HttpResponse) -> Result<serde_json::Value, ApiError> {
        self.client.parse_raw(response)
    }
}
