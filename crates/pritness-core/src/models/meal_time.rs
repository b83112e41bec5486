// ABOUTME: Hour-of-day meal classification shared by logging and recommendations
// ABOUTME: MealTimeBucket thresholds and the MealType assigned to logged meals
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness

use serde::{Deserialize, Serialize};

/// Type of meal recorded on an entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    /// Breakfast meal
    Breakfast,
    /// Lunch meal
    Lunch,
    /// Dinner meal
    Dinner,
    /// Snack between meals
    Snack,
}

impl MealType {
    /// Stored identifier
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Snack => "snack",
        }
    }

    /// Parse meal type from string, defaulting to snack
    #[must_use]
    pub fn from_str_lossy(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "breakfast" => Self::Breakfast,
            "lunch" => Self::Lunch,
            "dinner" => Self::Dinner,
            _ => Self::Snack,
        }
    }

    /// Meal type auto-assigned to a meal logged at local `hour`
    #[must_use]
    pub const fn for_hour(hour: u32) -> Self {
        MealTimeBucket::from_hour(hour).meal_type()
    }
}

/// Time-of-day bucket
///
/// `hour < 11` morning, `11..=14` midday, `15..=19` afternoon, `>= 20` evening.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MealTimeBucket {
    /// Before 11:00
    Morning,
    /// 11:00 to 14:59
    Midday,
    /// 15:00 to 19:59
    Afternoon,
    /// From 20:00
    Evening,
}

impl MealTimeBucket {
    /// Bucket for a local hour (0-23)
    #[must_use]
    pub const fn from_hour(hour: u32) -> Self {
        match hour {
            0..=10 => Self::Morning,
            11..=14 => Self::Midday,
            15..=19 => Self::Afternoon,
            _ => Self::Evening,
        }
    }

    /// Meal type recorded for meals logged in this bucket
    #[must_use]
    pub const fn meal_type(self) -> MealType {
        match self {
            Self::Morning => MealType::Breakfast,
            Self::Midday => MealType::Lunch,
            Self::Afternoon => MealType::Dinner,
            Self::Evening => MealType::Snack,
        }
    }

    /// Label used when shaping recommendation prompts
    #[must_use]
    pub const fn prompt_label(self) -> &'static str {
        match self {
            Self::Morning => "breakfast",
            Self::Midday => "lunch",
            Self::Afternoon => "afternoon snack or early dinner",
            Self::Evening => "dinner",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(MealTimeBucket::from_hour(10), MealTimeBucket::Morning);
        assert_eq!(MealTimeBucket::from_hour(11), MealTimeBucket::Midday);
        assert_eq!(MealTimeBucket::from_hour(14), MealTimeBucket::Midday);
        assert_eq!(MealTimeBucket::from_hour(15), MealTimeBucket::Afternoon);
        assert_eq!(MealTimeBucket::from_hour(19), MealTimeBucket::Afternoon);
        assert_eq!(MealTimeBucket::from_hour(20), MealTimeBucket::Evening);
    }

    #[test]
    fn test_meal_type_for_hour() {
        assert_eq!(MealType::for_hour(9), MealType::Breakfast);
        assert_eq!(MealType::for_hour(12), MealType::Lunch);
        assert_eq!(MealType::for_hour(17), MealType::Dinner);
        assert_eq!(MealType::for_hour(22), MealType::Snack);
    }
}
