// ABOUTME: Intelligence module re-exports for pure derivation algorithms
// ABOUTME: Contains the goal engine that turns biometrics into daily targets

/// BMR and daily target derivation
pub mod goal_engine;

pub use goal_engine::{
    compute_bmr, compute_targets, derive_targets, BiometricInput, Goal, GoalSplit,
    NutritionTargets, Sex, TargetCrossCheck,
};
