//! Worker registry operations under `/workers`.
//!
//! Pairing of builders and parsers:
//!
//! | builder | parser |
//! |---|---|
//! | `build_list` | `parse_workers` |
//! | `build_get`, `build_create`, `build_update`, `build_activate`, `build_deactivate`, `build_grant_access`, `build_revoke_access`, `build_assign_fingerprint`, `build_assign_rfid`, `build_remove_rfid` | `parse_worker` |
//! | `build_delete` | `parse_deleted` |
//! | `build_unassigned_tags` | `parse_tags` |

use std::time::Duration;

use crate::client::ApiClient;
use crate::confirm::{Confirmation, DestructiveAction};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{AssignFingerprint, AssignRfid, CreateWorker, UpdateWorker, Worker};
use crate::validation::{validate_fingerprint_slot, ValidationErrors};

pub struct WorkerService<'a> {
    client: &'a ApiClient,
}

impl<'a> WorkerService<'a> {
    /// How long the backend waits for a finger on the sensor while a create
    /// request is in flight. The UI keeps a waiting state for at least this
    /// long; the request itself cannot be cancelled.
    pub const ENROLLMENT_WAIT: Duration = Duration::from_secs(40);

    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub fn build_list(&self) -> HttpRequest {
        self.client.get("/workers", &[])
    }

    pub fn build_get(&self, id: i64) -> HttpRequest {
        self.client.get(&format!("/workers/{id}"), &[])
    }

    /// Validates, then sanitizes, then serializes. Invalid input never
    /// becomes a request.
    pub fn build_create(&self, input: &CreateWorker) -> Result<HttpRequest, ApiError> {
        input.validate()?;
        self.client
            .send_json(HttpMethod::Post, "/workers", &input.sanitized())
    }

    /// Sends only the keys set on `input`.
    pub fn build_update(&self, id: i64, input: &UpdateWorker) -> Result<HttpRequest, ApiError> {
        input.validate()?;
        self.client
            .send_json(HttpMethod::Put, &format!("/workers/{id}"), &input.sanitized())
    }

    pub fn build_delete(&self, id: i64, confirmation: Confirmation) -> Result<HttpRequest, ApiError> {
        if !confirmation.covers(DestructiveAction::DeleteWorker) {
            return Err(ApiError::Unconfirmed(DestructiveAction::DeleteWorker));
        }
        Ok(self.client.delete(&format!("/workers/{id}"), &[]))
    }

    pub fn build_activate(&self, id: i64) -> HttpRequest {
        self.client.post_empty(&format!("/workers/{id}/activate"))
    }

    pub fn build_deactivate(&self, id: i64) -> HttpRequest {
        self.client.post_empty(&format!("/workers/{id}/deactivate"))
    }

    pub fn build_grant_access(&self, id: i64) -> HttpRequest {
        self.client.post_empty(&format!("/workers/{id}/grant-access"))
    }

    pub fn build_revoke_access(&self, id: i64) -> HttpRequest {
        self.client.post_empty(&format!("/workers/{id}/revoke-access"))
    }

    /// Bind a sensor slot directly, for when automatic enrollment failed.
    /// Slots above `MAX_FINGERPRINT_SLOT` are rejected before sending.
    pub fn build_assign_fingerprint(
        &self,
        id: i64,
        fingerprint_id: u16,
    ) -> Result<HttpRequest, ApiError> {
        validate_fingerprint_slot(fingerprint_id)
            .map_err(|e| ApiError::Validation(ValidationErrors(vec![e])))?;
        self.client.send_json(
            HttpMethod::Post,
            &format!("/workers/{id}/fingerprint"),
            &AssignFingerprint { fingerprint_id },
        )
    }

    /// Tags scanned but not bound to anyone. Re-issue to refresh; there is
    /// no push channel.
    pub fn build_unassigned_tags(&self) -> HttpRequest {
        self.client.get("/workers/rfid/unassigned", &[])
    }

    pub fn build_assign_rfid(&self, worker_id: i64, tag: &str) -> Result<HttpRequest, ApiError> {
        self.client.send_json(
            HttpMethod::Post,
            &format!("/workers/{worker_id}/rfid-tags"),
            &AssignRfid {
                rfid_tag: tag.to_string(),
            },
        )
    }

    /// Body-less DELETE; the tag travels as the `rfidTag` query parameter.
    pub fn build_remove_rfid(&self, worker_id: i64, tag: &str) -> HttpRequest {
        self.client.delete(
            &format!("/workers/{worker_id}/rfid-tags"),
            &[("rfidTag", tag.to_string())],
        )
    }

    pub fn parse_workers(&self, response: HttpResponse) -> Result<Vec<Worker>, ApiError> {
        self.client.parse_data(response)
    }

    pub fn parse_worker(&self, response: HttpResponse) -> Result<Worker, ApiError> {
        self.client.parse_data(response)
    }

    pub fn parse_deleted(&self, response: HttpResponse) -> Result<(), ApiError> {
        self.client.parse_empty(response)
    }

    pub fn parse_tags(&self, response: HttpResponse) -> Result<Vec<String>, ApiError> {
        self.client.parse_data(response)
    }
}
