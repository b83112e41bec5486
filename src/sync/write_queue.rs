// ABOUTME: Bounded retry queue that applies ledger writes to the remote store
// ABOUTME: Keyed by entry id so a newer write supersedes a queued one; never rolls back locally
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness

//! # Remote Write Queue
//!
//! Ledger mutations call [`RemoteWriteQueue::enqueue`] synchronously and move
//! on. A background worker (or an explicit [`RemoteWriteQueue::flush`])
//! applies queued writes. A failing write is retried on later passes until
//! `max_attempts`, then dropped and logged as `RemoteWriteFailed`.
//!
//! Flush passes never overlap: writes to one record reach the store in the
//! order they were enqueued. The day fetch used by sync takes the same gate,
//! so it sees exactly the writes the store has not accepted yet.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use pritness_core::models::{MealEntry, Profile, WaterLog, WodEntry};
use tokio::sync::{Mutex as AsyncMutex, Notify};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info};
use uuid::Uuid;

use super::{RemoteDayBatch, RemoteSyncAdapter};
use crate::config::WriteQueueConfig;
use crate::errors::AppResult;
use crate::logging::AppLogger;

/// Identity of the remote record a write targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteKey {
    /// Meal row
    Meal(Uuid),
    /// Water log row
    Water(Uuid),
    /// Workout row
    Wod(Uuid),
    /// Profile row
    Profile(Uuid),
}

/// One pending remote write
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Insert or replace a meal
    UpsertMeal {
        /// Owning profile
        profile_id: Uuid,
        /// Row contents
        meal: MealEntry,
    },
    /// Delete a meal
    DeleteMeal {
        /// Meal id
        id: Uuid,
    },
    /// Insert a water log
    InsertWater {
        /// Owning profile
        profile_id: Uuid,
        /// Row contents
        log: WaterLog,
    },
    /// Insert or replace a workout
    UpsertWod {
        /// Owning profile
        profile_id: Uuid,
        /// Row contents
        wod: WodEntry,
    },
    /// Delete a workout
    DeleteWod {
        /// Workout id
        id: Uuid,
    },
    /// Insert or replace a profile
    SaveProfile {
        /// Profile contents
        profile: Box<Profile>,
    },
}

impl WriteOp {
    /// Record this write targets
    #[must_use]
    pub fn key(&self) -> WriteKey {
        match self {
            Self::UpsertMeal { meal, .. } => WriteKey::Meal(meal.id),
            Self::DeleteMeal { id } => WriteKey::Meal(*id),
            Self::InsertWater { log, .. } => WriteKey::Water(log.id),
            Self::UpsertWod { wod, .. } => WriteKey::Wod(wod.id),
            Self::DeleteWod { id } => WriteKey::Wod(*id),
            Self::SaveProfile { profile } => WriteKey::Profile(profile.id()),
        }
    }

    /// Operation name for logs
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::UpsertMeal { .. } => "upsert_meal",
            Self::DeleteMeal { .. } => "delete_meal",
            Self::InsertWater { .. } => "insert_water_log",
            Self::UpsertWod { .. } => "upsert_wod",
            Self::DeleteWod { .. } => "delete_wod",
            Self::SaveProfile { .. } => "save_profile",
        }
    }

    fn entry_id(&self) -> Uuid {
        match self.key() {
            WriteKey::Meal(id) | WriteKey::Water(id) | WriteKey::Wod(id) | WriteKey::Profile(id) => {
                id
            }
        }
    }

    async fn apply(&self, adapter: &dyn RemoteSyncAdapter) -> AppResult<()> {
        match self {
            Self::UpsertMeal { profile_id, meal } => adapter.insert_meal(*profile_id, meal).await,
            Self::DeleteMeal { id } => adapter.delete_meal(*id).await,
            Self::InsertWater { profile_id, log } => {
                adapter.insert_water_log(*profile_id, log).await
            }
            Self::UpsertWod { profile_id, wod } => adapter.insert_wod(*profile_id, wod).await,
            Self::DeleteWod { id } => adapter.delete_wod(*id).await,
            Self::SaveProfile { profile } => adapter.save_profile(profile).await,
        }
    }
}

#[derive(Debug)]
struct PendingWrite {
    op: WriteOp,
    attempts: u32,
}

/// Outcome of one flush pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Writes the store accepted
    pub applied: usize,
    /// Failed writes kept for another pass
    pub requeued: usize,
    /// Failed writes dropped after the last attempt
    pub abandoned: usize,
}

/// Retry queue in front of a [`RemoteSyncAdapter`]
pub struct RemoteWriteQueue {
    adapter: Arc<dyn RemoteSyncAdapter>,
    config: WriteQueueConfig,
    pending: Mutex<VecDeque<PendingWrite>>,
    flush_gate: AsyncMutex<()>,
    notify: Notify,
    closed: AtomicBool,
    abandoned: AtomicUsize,
}

impl RemoteWriteQueue {
    /// Create an empty queue
    #[must_use]
    pub fn new(adapter: Arc<dyn RemoteSyncAdapter>, config: WriteQueueConfig) -> Self {
        Self {
            adapter,
            config,
            pending: Mutex::new(VecDeque::new()),
            flush_gate: AsyncMutex::new(()),
            notify: Notify::new(),
            closed: AtomicBool::new(false),
            abandoned: AtomicUsize::new(0),
        }
    }

    /// Adapter writes are applied through
    #[must_use]
    pub fn adapter(&self) -> &Arc<dyn RemoteSyncAdapter> {
        &self.adapter
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<PendingWrite>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a write; a queued write for the same record is replaced
    pub fn enqueue(&self, op: WriteOp) {
        let key = op.key();
        {
            let mut pending = self.lock();
            let before = pending.len();
            pending.retain(|p| p.op.key() != key);
            if pending.len() != before {
                debug!(operation = op.label(), "Superseded queued write");
            }
            pending.push_back(PendingWrite { op, attempts: 0 });
        }
        self.notify.notify_one();
    }

    /// Number of writes waiting
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.lock().len()
    }

    /// True when nothing is waiting
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copies of the queued writes, oldest first
    #[must_use]
    pub fn pending_ops(&self) -> Vec<WriteOp> {
        self.lock().iter().map(|p| p.op.clone()).collect()
    }

    /// Writes dropped after exhausting their attempts
    #[must_use]
    pub fn abandoned_count(&self) -> usize {
        self.abandoned.load(Ordering::SeqCst)
    }

    /// Apply every queued write once
    ///
    /// Waits for a pass already running elsewhere to finish first.
    pub async fn flush(&self) -> FlushReport {
        let _pass = self.flush_gate.lock().await;
        let batch: Vec<PendingWrite> = self.lock().drain(..).collect();
        let mut report = FlushReport::default();
        let mut retry = Vec::new();

        for mut write in batch {
            write.attempts += 1;
            let entry_id = write.op.entry_id().to_string();
            match write.op.apply(self.adapter.as_ref()).await {
                Ok(()) => {
                    AppLogger::log_remote_write(write.op.label(), &entry_id, write.attempts, true);
                    report.applied += 1;
                }
                Err(error) if write.attempts >= self.config.max_attempts => {
                    AppLogger::log_remote_write_abandoned(
                        write.op.label(),
                        &entry_id,
                        write.attempts,
                        &error.to_string(),
                    );
                    self.abandoned.fetch_add(1, Ordering::SeqCst);
                    report.abandoned += 1;
                }
                Err(_) => {
                    AppLogger::log_remote_write(write.op.label(), &entry_id, write.attempts, false);
                    retry.push(write);
                }
            }
        }

        let mut pending = self.lock();
        for write in retry.into_iter().rev() {
            let key = write.op.key();
            // A write enqueued during the pass is newer
            if pending.iter().any(|p| p.op.key() == key) {
                continue;
            }
            pending.push_front(write);
            report.requeued += 1;
        }
        report
    }

    /// Remote day with the still-queued writes laid over it
    ///
    /// # Errors
    ///
    /// Returns `RemoteReadFailed` when any of the reads fails.
    pub async fn fetch_day_with_pending(
        &self,
        profile_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<RemoteDayBatch> {
        let _pass = self.flush_gate.lock().await;
        let mut batch = self.adapter.fetch_day(profile_id, date).await?;
        let pending = self.pending_ops();
        if !pending.is_empty() {
            debug!(pending = pending.len(), %date, "Overlaying queued writes on remote day");
            batch.apply_pending(&pending, profile_id, date);
        }
        Ok(batch)
    }

    /// Stop the worker after it drains what it can
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    /// Run flush passes whenever writes arrive
    ///
    /// Consecutive passes that leave failed writes behind wait with
    /// exponential backoff.
    #[must_use]
    pub fn spawn_worker(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut failed_passes = 0_u32;
            loop {
                if self.is_idle() {
                    if self.closed.load(Ordering::SeqCst) {
                        break;
                    }
                    self.notify.notified().await;
                    continue;
                }

                let report = self.flush().await;
                if report.requeued == 0 {
                    failed_passes = 0;
                    continue;
                }
                if self.closed.load(Ordering::SeqCst) {
                    break;
                }
                failed_passes = failed_passes.saturating_add(1);
                sleep(self.config.backoff(failed_passes)).await;
            }
            info!(pending = self.pending_len(), "Remote write worker stopped");
        })
    }
}
