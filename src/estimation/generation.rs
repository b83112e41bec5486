// ABOUTME: Generation counters that discard estimation results superseded by a newer request
// ABOUTME: begin() issues a ticket per slot, settle() keeps a result only for the latest ticket
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness

use dashmap::DashMap;
use tracing::debug;

use crate::errors::AppResult;

/// Kind of in-flight estimation a result belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EstimationSlot {
    /// Free-text meal estimate
    MealText,
    /// Photo analysis
    Image,
    /// Workout description estimate
    Workout,
    /// Meal suggestions
    Suggestions,
    /// Assistant reply
    Chat,
    /// Independent estimate of the daily targets
    Targets,
}

/// Ticket returned by [`RequestGenerations::begin`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct GenerationTicket {
    slot: EstimationSlot,
    generation: u64,
}

impl GenerationTicket {
    /// Slot the ticket was issued for
    #[must_use]
    pub const fn slot(&self) -> EstimationSlot {
        self.slot
    }
}

/// Latest issued generation per slot
#[derive(Debug, Default)]
pub struct RequestGenerations {
    latest: DashMap<EstimationSlot, u64>,
}

impl RequestGenerations {
    /// No requests issued yet
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request, superseding any earlier one in `slot`
    pub fn begin(&self, slot: EstimationSlot) -> GenerationTicket {
        let mut entry = self.latest.entry(slot).or_insert(0);
        *entry += 1;
        GenerationTicket {
            slot,
            generation: *entry,
        }
    }

    /// True while no newer request was started for the ticket's slot
    #[must_use]
    pub fn is_current(&self, ticket: GenerationTicket) -> bool {
        self.latest
            .get(&ticket.slot)
            .is_some_and(|latest| *latest == ticket.generation)
    }

    /// Keep `value` only when `ticket` is still the latest for its slot
    pub fn accept<T>(&self, ticket: GenerationTicket, value: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(value)
        } else {
            debug!(slot = ?ticket.slot, "Discarding superseded estimation result");
            None
        }
    }

    /// Resolve a finished request: stale results, failures included, become `Ok(None)`
    ///
    /// # Errors
    ///
    /// Returns the request's own error when `ticket` is still current.
    pub fn settle<T>(&self, ticket: GenerationTicket, result: AppResult<T>) -> AppResult<Option<T>> {
        if self.is_current(ticket) {
            return result.map(Some);
        }
        match result {
            Ok(_) => debug!(slot = ?ticket.slot, "Discarding superseded estimation result"),
            Err(error) => {
                debug!(slot = ?ticket.slot, error = %error, "Discarding superseded estimation failure");
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{AppError, ErrorCode};

    #[test]
    fn test_newer_ticket_supersedes_older() {
        let generations = RequestGenerations::new();
        let first = generations.begin(EstimationSlot::MealText);
        let second = generations.begin(EstimationSlot::MealText);

        assert_eq!(generations.accept(first, 1), None);
        assert_eq!(generations.accept(second, 2), Some(2));
    }

    #[test]
    fn test_stale_failure_is_discarded() {
        let generations = RequestGenerations::new();
        let stale = generations.begin(EstimationSlot::Chat);
        let current = generations.begin(EstimationSlot::Chat);

        let failed: AppResult<u32> = Err(AppError::estimation_failed("groq", "timeout"));
        assert_eq!(generations.settle(stale, failed).unwrap(), None);

        let failed: AppResult<u32> = Err(AppError::estimation_failed("groq", "timeout"));
        assert_eq!(
            generations.settle(current, failed).unwrap_err().code,
            ErrorCode::EstimationFailed
        );
        assert_eq!(generations.settle(current, Ok(7)).unwrap(), Some(7));
    }

    #[test]
    fn test_slots_are_independent() {
        let generations = RequestGenerations::new();
        let meal = generations.begin(EstimationSlot::MealText);
        let _chat = generations.begin(EstimationSlot::Chat);

        assert!(generations.is_current(meal));
    }
}
