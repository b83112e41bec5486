// ABOUTME: Pritness CLI - diagnostics for the goal engine and the estimation gateway
// ABOUTME: Derives targets, shows meal-time buckets and runs meal or workout estimates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness
//!
//! Usage:
//! ```bash
//! # Daily targets for biometrics and a goal
//! pritness-cli targets --weight 80 --height 180 --age 30 --sex male --goal lose_weight
//!
//! # Same, cross-checked by the configured estimator
//! pritness-cli targets --weight 80 --height 180 --age 30 --sex male --cross-check
//!
//! # Meal-time bucket for every hour of the day
//! pritness-cli bucket
//!
//! # Estimate a meal description with the configured providers
//! pritness-cli estimate-meal "two eggs and a slice of toast"
//!
//! # Classify and estimate a photo
//! pritness-cli estimate-meal --image lunch.jpg
//!
//! # Estimate a workout
//! pritness-cli estimate-workout "5 rounds: 10 burpees, 15 kettlebell swings" --weight 72
//! ```

mod commands;
mod helpers;

use clap::{Parser, Subcommand};
use pritness::config::AppConfig;
use pritness::errors::AppResult;
use pritness::logging::LoggingConfig;
use tracing::info;

type Result<T> = AppResult<T>;

#[derive(Parser)]
#[command(
    name = "pritness-cli",
    about = "Pritness diagnostics CLI",
    long_about = "Command-line diagnostics for the Pritness goal engine and nutrition estimation gateway."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Derive BMR and daily targets
    Targets {
        /// Body weight in kilograms
        #[arg(long)]
        weight: f64,

        /// Height in centimetres
        #[arg(long)]
        height: f64,

        /// Age in years
        #[arg(long)]
        age: u32,

        /// Sex used by the BMR formula (male or female)
        #[arg(long, default_value = "female")]
        sex: String,

        /// Goal (lose_weight, gain_muscle, define_muscle)
        #[arg(long, default_value = "define_muscle")]
        goal: String,

        /// Compare with targets proposed by the configured estimator
        #[arg(long)]
        cross_check: bool,
    },

    /// Show the meal-time bucket for an hour (all hours when omitted)
    Bucket {
        /// Local hour, 0-23
        hour: Option<u32>,
    },

    /// Estimate a meal from text or a photo
    EstimateMeal {
        /// What was eaten
        description: Option<String>,

        /// Photo to classify instead of text
        #[arg(long)]
        image: Option<String>,
    },

    /// Estimate calories burned by a workout
    EstimateWorkout {
        /// Workout description
        description: String,

        /// Body weight in kilograms (defaults to 70)
        #[arg(long)]
        weight: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    if cli.verbose {
        "debug".clone_into(&mut logging.level);
    }
    if let Err(e) = logging.init() {
        eprintln!("Logging initialization failed: {e}");
    }

    info!("Pritness CLI");

    match cli.command {
        Command::Targets {
            weight,
            height,
            age,
            sex,
            goal,
            cross_check,
        } => commands::targets::targets(weight, height, age, &sex, &goal, cross_check).await,
        Command::Bucket { hour } => commands::targets::bucket(hour),
        Command::EstimateMeal { description, image } => {
            let config = AppConfig::from_env()?;
            commands::estimate::meal(&config, description, image).await
        }
        Command::EstimateWorkout {
            description,
            weight,
        } => {
            let config = AppConfig::from_env()?;
            commands::estimate::workout(&config, &description, weight).await
        }
    }
}
