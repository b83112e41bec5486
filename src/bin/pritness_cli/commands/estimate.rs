// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness
// ABOUTME: Estimation gateway diagnostics against the configured providers
// ABOUTME: Estimates a meal from text or a photo, or a workout from a description

use std::path::Path;

use pritness::config::AppConfig;
use pritness::errors::{AppError, AppResult};
use pritness::estimation::{LlmEstimationGateway, NutritionEstimationGateway};
use pritness::llm::ImageAttachment;
use tokio::fs;
use tracing::info;

use crate::helpers::display::{display_image, display_nutrition, display_workout};

fn gateway(config: &AppConfig) -> AppResult<LlmEstimationGateway> {
    let gateway = LlmEstimationGateway::from_config(config)?;
    let names: Vec<&str> = gateway.providers().iter().map(|p| p.name()).collect();
    info!(providers = ?names, "Estimation gateway ready");
    Ok(gateway)
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}

/// Estimate a meal description or a photo
pub async fn meal(config: &AppConfig, description: Option<String>, image: Option<String>) -> AppResult<()> {
    let gateway = gateway(config)?;
    if let Some(path) = image {
        let path = Path::new(&path);
        let bytes = fs::read(path)
            .await
            .map_err(|e| AppError::invalid_input(format!("cannot read {}: {e}", path.display())))?;
        let attachment = ImageAttachment::from_bytes(&bytes, mime_for(path));
        let estimate = gateway.estimate_from_image(&attachment).await?;
        display_image(&estimate);
        return Ok(());
    }

    let description = description
        .ok_or_else(|| AppError::invalid_input("give a meal description or --image"))?;
    let estimate = gateway.estimate_from_text(&description).await?;
    display_nutrition(&estimate);
    Ok(())
}

/// Estimate a workout description
pub async fn workout(config: &AppConfig, description: &str, weight_kg: Option<f64>) -> AppResult<()> {
    let gateway = gateway(config)?;
    let estimate = gateway
        .estimate_workout_from_text(description, weight_kg)
        .await?;
    display_workout(&estimate);
    Ok(())
}
