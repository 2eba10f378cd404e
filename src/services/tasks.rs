// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cloud Tasks service for scheduled reminder callbacks.
//!
//! Cloud Tasks delivers a POST to one of our `/tasks/*` endpoints at an
//! absolute schedule time. The queue retries failed deliveries on its
//! own; nothing here retries.
//!
//! Uses the official google-cloud-tasks-v2 SDK.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Payload delivered to the daily pill reminder endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendPillReminderPayload {
    pub user_id: String,
}

/// Payload delivered to the blister-end reminder endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendBlisterReminderPayload {
    pub user_id: String,
    /// Date the reminder was computed for, `yyyy-MM-dd`
    pub reminder_date: String,
}

/// A task captured instead of queued, for assertions (test builds only).
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct RecordedTask {
    pub endpoint: String,
    pub body: serde_json::Value,
    pub schedule_time: Option<DateTime<Utc>>,
}

/// Cloud Tasks client wrapper.
pub struct TasksService {
    project_id: String,
    location: String,
    queue_name: String,
    /// Mock: capture tasks instead of queueing them (test builds only).
    #[cfg(test)]
    recorder: std::sync::Mutex<Option<Vec<RecordedTask>>>,
}

impl TasksService {
    pub fn new(project_id: &str, region: &str) -> Self {
        Self {
            project_id: project_id.to_string(),
            location: region.to_string(),
            queue_name: crate::config::REMINDER_QUEUE_NAME.to_string(),
            #[cfg(test)]
            recorder: std::sync::Mutex::new(None),
        }
    }

    /// Create a service that records tasks instead of contacting Cloud
    /// Tasks (test builds only).
    #[cfg(test)]
    pub fn recording(project_id: &str, region: &str) -> Self {
        let service = Self::new(project_id, region);
        *service.recorder.lock().unwrap() = Some(Vec::new());
        service
    }

    /// Tasks captured so far (test builds only).
    #[cfg(test)]
    pub fn recorded(&self) -> Vec<RecordedTask> {
        self.recorder
            .lock()
            .unwrap()
            .as_ref()
            .cloned()
            .unwrap_or_default()
    }

    /// Queue the daily pill reminder callback at `fire_at`.
    pub async fn queue_pill_reminder(
        &self,
        service_url: &str,
        payload: SendPillReminderPayload,
        fire_at: DateTime<Utc>,
    ) -> Result<()> {
        self.queue_task(
            service_url,
            "/tasks/send-pill-reminder",
            &payload,
            Some(fire_at),
        )
        .await
    }

    /// Queue the one-shot blister-end reminder callback at `fire_at`.
    pub async fn queue_blister_reminder(
        &self,
        service_url: &str,
        payload: SendBlisterReminderPayload,
        fire_at: DateTime<Utc>,
    ) -> Result<()> {
        tracing::info!(
            user_id = %payload.user_id,
            reminder_date = %payload.reminder_date,
            "Queuing blister-end reminder task"
        );
        self.queue_task(
            service_url,
            "/tasks/send-blister-reminder",
            &payload,
            Some(fire_at),
        )
        .await
    }

    /// Generic task queuing helper.
    async fn queue_task<T: Serialize>(
        &self,
        service_url: &str,
        endpoint: &str,
        payload: &T,
        fire_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        #[cfg(test)]
        {
            let mut guard = self.recorder.lock().unwrap();
            if let Some(recorded) = guard.as_mut() {
                recorded.push(RecordedTask {
                    endpoint: endpoint.to_string(),
                    body: serde_json::to_value(payload)
                        .map_err(|e| AppError::Internal(anyhow::anyhow!("JSON error: {}", e)))?,
                    schedule_time: fire_at,
                });
                return Ok(());
            }
        }

        use google_cloud_tasks_v2::client::CloudTasks;
        use google_cloud_tasks_v2::model::{HttpRequest, OidcToken, Task};

        let client = CloudTasks::builder()
            .build()
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Cloud Tasks client error: {}", e)))?;

        let queue_path = format!(
            "projects/{}/locations/{}/queues/{}",
            self.project_id, self.location, self.queue_name
        );

        let body = serde_json::to_vec(payload)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("JSON error: {}", e)))?;

        let http_request = HttpRequest::default()
            .set_url(format!("{}{}", service_url, endpoint))
            .set_http_method("POST")
            .set_body(axum::body::Bytes::from(body))
            .set_headers(std::collections::HashMap::from([(
                "Content-Type".to_string(),
                "application/json".to_string(),
            )]))
            .set_oidc_token(
                OidcToken::default()
                    .set_service_account_email(format!(
                        "pill-tracker-api@{}.iam.gserviceaccount.com",
                        self.project_id
                    ))
                    .set_audience(service_url.to_string()),
            );

        let mut task = Task::default().set_http_request(http_request);
        if let Some(at) = fire_at {
            task = task.set_schedule_time(google_cloud_wkt::Timestamp::clamp(
                at.timestamp(),
                at.timestamp_subsec_nanos() as i32,
            ));
        }

        let _response = client
            .create_task()
            .set_parent(queue_path)
            .set_task(task)
            .send()
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Cloud Tasks create error: {}", e)))?;

        Ok(())
    }
}
