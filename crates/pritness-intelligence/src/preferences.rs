// ABOUTME: Liked and disliked food labels used to steer meal suggestions
// ABOUTME: Two mutually exclusive FIFO-capped lists, oldest label evicted first
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness

use std::collections::VecDeque;

use pritness_core::constants::tracking::MAX_FOOD_PREFERENCES;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// User feedback on a suggested meal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Feedback {
    /// Thumbs up
    Like,
    /// Thumbs down
    Dislike,
}

/// Liked and disliked food labels
///
/// A label lives in at most one list. Re-rating an already-present label does
/// not move it; each list keeps at most [`MAX_FOOD_PREFERENCES`] labels.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FoodPreferences {
    liked: VecDeque<String>,
    disliked: VecDeque<String>,
}

impl FoodPreferences {
    /// Record feedback for `label`
    pub fn record(&mut self, label: &str, feedback: Feedback) {
        let label = label.trim();
        if label.is_empty() {
            return;
        }
        let (target, other) = match feedback {
            Feedback::Like => (&mut self.liked, &mut self.disliked),
            Feedback::Dislike => (&mut self.disliked, &mut self.liked),
        };
        other.retain(|existing| existing != label);
        if target.iter().any(|existing| existing == label) {
            return;
        }
        target.push_back(label.to_owned());
        while target.len() > MAX_FOOD_PREFERENCES {
            if let Some(evicted) = target.pop_front() {
                debug!(label = %evicted, "Oldest food preference evicted");
            }
        }
    }

    /// Mark `label` as liked
    pub fn like(&mut self, label: &str) {
        self.record(label, Feedback::Like);
    }

    /// Mark `label` as disliked
    pub fn dislike(&mut self, label: &str) {
        self.record(label, Feedback::Dislike);
    }

    /// Liked labels, oldest first
    pub fn liked(&self) -> impl Iterator<Item = &str> {
        self.liked.iter().map(String::as_str)
    }

    /// Disliked labels, oldest first
    pub fn disliked(&self) -> impl Iterator<Item = &str> {
        self.disliked.iter().map(String::as_str)
    }

    /// Disliked labels as owned strings
    #[must_use]
    pub fn disliked_foods(&self) -> Vec<String> {
        self.disliked.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_moves_label_out_of_disliked() {
        let mut prefs = FoodPreferences::default();
        prefs.dislike("Tuna salad");
        prefs.like("Tuna salad");
        assert_eq!(prefs.liked().collect::<Vec<_>>(), vec!["Tuna salad"]);
        assert_eq!(prefs.disliked().count(), 0);
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let mut prefs = FoodPreferences::default();
        for i in 0..=MAX_FOOD_PREFERENCES {
            prefs.dislike(&format!("meal {i}"));
        }
        let disliked = prefs.disliked_foods();
        assert_eq!(disliked.len(), MAX_FOOD_PREFERENCES);
        assert_eq!(disliked[0], "meal 1");
        assert_eq!(disliked[MAX_FOOD_PREFERENCES - 1], format!("meal {MAX_FOOD_PREFERENCES}"));
    }

    #[test]
    fn test_duplicate_is_not_reinserted() {
        let mut prefs = FoodPreferences::default();
        prefs.like("Oats");
        prefs.like("Eggs");
        prefs.like("Oats");
        assert_eq!(prefs.liked().collect::<Vec<_>>(), vec!["Oats", "Eggs"]);
    }
}
