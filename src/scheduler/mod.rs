// src/scheduler/mod.rs
//! Deferred sends.
//!
//! The scheduler is an explicit object owned by the hosting process; there is
//! no module-level registry. Scheduling is acknowledged immediately; delivery
//! happens later on a one-shot timer, and a delivery failure after the fact
//! is logged but not reported back to the original caller.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::sender::MessageSender;

/// Acknowledgment of scheduling, not of delivery.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduledSend {
    pub id: Uuid,
    pub phone_number: String,
    pub message: String,
    pub scheduled_time: DateTime<Utc>,
}

pub struct SendScheduler {
    sender: Arc<dyn MessageSender>,
    registry: Arc<Mutex<HashMap<Uuid, ScheduledSend>>>,
}

impl SendScheduler {
    pub fn new(sender: Arc<dyn MessageSender>) -> Self {
        Self {
            sender,
            registry: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Register a one-shot deferred send. The only hard failure is a
    /// `scheduled_time` already in the past; nothing is registered in that
    /// case. Re-submitting the same parameters creates an independent timer.
    pub async fn schedule(
        &self,
        phone_number: &str,
        message: &str,
        scheduled_time: DateTime<Utc>,
    ) -> CoreResult<ScheduledSend> {
        let delay = (scheduled_time - Utc::now())
            .to_std()
            .map_err(|_| CoreError::InvalidSchedule)?;

        let entry = ScheduledSend {
            id: Uuid::new_v4(),
            phone_number: phone_number.to_string(),
            message: message.to_string(),
            scheduled_time,
        };
        self.registry.lock().await.insert(entry.id, entry.clone());

        let sender = Arc::clone(&self.sender);
        let registry = Arc::clone(&self.registry);
        let fired = entry.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match sender.send(&fired.phone_number, &fired.message).await {
                Ok(_) => {
                    registry.lock().await.remove(&fired.id);
                    info!("Scheduled message {} sent to {}", fired.id, fired.phone_number);
                }
                Err(e) => {
                    // A failed fire leaves its registry entry in place.
                    error!("Failed to send scheduled message {}: {e}", fired.id);
                }
            }
        });

        Ok(entry)
    }

    /// Snapshot of entries that have not successfully fired yet.
    pub async fn scheduled(&self) -> Vec<ScheduledSend> {
        self.registry.lock().await.values().cloned().collect()
    }
}
