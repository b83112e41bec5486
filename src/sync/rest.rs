// ABOUTME: PostgREST remote sync adapter for the hosted backend-as-a-service store
// ABOUTME: Upserts with merge-duplicates, eq filters per profile and date, client-side sums
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness

//! # REST Sync Adapter
//!
//! Talks to the `PostgREST` endpoint under `{url}/rest/v1/`. Requests carry
//! the project API key in `apikey` and the user's access token (or the API
//! key when signed out) as a bearer token, so row-level security applies.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use pritness_core::models::{MealEntry, MealTotals, Profile, WaterLog, WodEntry};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use url::Url;
use uuid::Uuid;

use super::rows::{MealRow, ProfileRow, WaterLogRow, WodRow};
use super::RemoteSyncAdapter;
use crate::config::RemoteStoreConfig;
use crate::errors::{AppError, AppResult};

const MEALS: &str = "meals";
const WATER_LOGS: &str = "water_logs";
const WODS: &str = "wods";
const PROFILES: &str = "profiles";

/// Request timeout for store calls
const REQUEST_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Deserialize)]
struct MacroRow {
    calories: u32,
    protein: u32,
    #[serde(default)]
    carbs: u32,
    #[serde(default)]
    fat: u32,
}

#[derive(Debug, Deserialize)]
struct AmountRow {
    amount_ml: u32,
}

/// `PostgREST` client implementing [`RemoteSyncAdapter`]
#[derive(Clone)]
pub struct RestSyncAdapter {
    client: Client,
    rest_base: Url,
    api_key: String,
    access_token: Option<String>,
}

impl RestSyncAdapter {
    /// Create an adapter for the configured project
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for an unparseable URL, or an internal error if
    /// the HTTP client cannot be built.
    pub fn new(config: &RemoteStoreConfig) -> AppResult<Self> {
        let root = format!("{}/rest/v1/", config.url.trim_end_matches('/'));
        let rest_base = Url::parse(&root)
            .map_err(|e| AppError::config(format!("Invalid remote store URL {root}: {e}")))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            rest_base,
            api_key: config.api_key.clone(),
            access_token: config.access_token.clone(),
        })
    }

    /// Use a fresh user access token for subsequent calls
    pub fn set_access_token(&mut self, token: Option<String>) {
        self.access_token = token;
    }

    fn table_url(&self, table: &str, query: &[(&str, String)]) -> AppResult<Url> {
        let mut url = self
            .rest_base
            .join(table)
            .map_err(|e| AppError::internal(format!("Invalid table path {table}: {e}")))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.api_key);
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {bearer}"))
    }

    async fn upsert<T: Serialize + Sync>(&self, table: &str, row: &T) -> AppResult<()> {
        let url = self.table_url(table, &[("on_conflict", "id".to_owned())])?;
        let response = self
            .request(Method::POST, url)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(row)
            .send()
            .await
            .map_err(|e| AppError::remote_write_failed(format!("{table}: {e}")))?;
        Self::check_write(table, response).await
    }

    async fn delete_by_id(&self, table: &str, id: Uuid) -> AppResult<()> {
        let url = self.table_url(table, &[("id", format!("eq.{id}"))])?;
        let response = self
            .request(Method::DELETE, url)
            .send()
            .await
            .map_err(|e| AppError::remote_write_failed(format!("{table}: {e}")))?;
        Self::check_write(table, response).await
    }

    async fn check_write(table: &str, response: Response) -> AppResult<()> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        warn!(table, %status, "Remote write rejected");
        Err(AppError::remote_write_failed(format!(
            "{table} ({status}): {}",
            body.chars().take(200).collect::<String>()
        )))
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> AppResult<Vec<T>> {
        let url = self.table_url(table, query)?;
        debug!(table, "Remote select");
        let response = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(|e| AppError::remote_read_failed(format!("{table}: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::remote_read_failed(format!("{table}: {e}")))?;
        if !status.is_success() {
            return Err(AppError::remote_read_failed(format!(
                "{table} ({status}): {}",
                body.chars().take(200).collect::<String>()
            )));
        }
        serde_json::from_str(&body)
            .map_err(|e| AppError::remote_read_failed(format!("{table}: malformed rows: {e}")))
    }

    fn day_filter(profile_id: Uuid, date: NaiveDate) -> [(&'static str, String); 2] {
        [
            ("user_id", format!("eq.{profile_id}")),
            ("date", format!("eq.{date}")),
        ]
    }
}

#[async_trait]
impl RemoteSyncAdapter for RestSyncAdapter {
    fn name(&self) -> &'static str {
        "postgrest"
    }

    #[instrument(skip(self, meal), fields(meal.id = %meal.id))]
    async fn insert_meal(&self, profile_id: Uuid, meal: &MealEntry) -> AppResult<()> {
        self.upsert(MEALS, &MealRow::from_entry(profile_id, meal))
            .await
    }

    async fn insert_water_log(&self, profile_id: Uuid, log: &WaterLog) -> AppResult<()> {
        self.upsert(WATER_LOGS, &WaterLogRow::from_log(profile_id, log))
            .await
    }

    async fn insert_wod(&self, profile_id: Uuid, wod: &WodEntry) -> AppResult<()> {
        self.upsert(WODS, &WodRow::from_entry(profile_id, wod)).await
    }

    async fn delete_meal(&self, id: Uuid) -> AppResult<()> {
        self.delete_by_id(MEALS, id).await
    }

    async fn delete_wod(&self, id: Uuid) -> AppResult<()> {
        self.delete_by_id(WODS, id).await
    }

    async fn fetch_today_meal_totals(
        &self,
        profile_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<MealTotals> {
        let [user, day] = Self::day_filter(profile_id, date);
        let rows: Vec<MacroRow> = self
            .select(
                MEALS,
                &[("select", "calories,protein,carbs,fat".to_owned()), user, day],
            )
            .await?;
        Ok(rows.iter().fold(MealTotals::default(), |acc, row| MealTotals {
            calories: acc.calories.saturating_add(row.calories),
            protein_g: acc.protein_g.saturating_add(row.protein),
            carbs_g: acc.carbs_g.saturating_add(row.carbs),
            fat_g: acc.fat_g.saturating_add(row.fat),
        }))
    }

    async fn fetch_today_meals(
        &self,
        profile_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Vec<MealEntry>> {
        let [user, day] = Self::day_filter(profile_id, date);
        let rows: Vec<MealRow> = self
            .select(
                MEALS,
                &[
                    ("select", "*".to_owned()),
                    user,
                    day,
                    ("order", "created_at.desc".to_owned()),
                ],
            )
            .await?;
        Ok(rows.into_iter().map(MealEntry::from).collect())
    }

    async fn fetch_today_water_ml(&self, profile_id: Uuid, date: NaiveDate) -> AppResult<u32> {
        let [user, day] = Self::day_filter(profile_id, date);
        let rows: Vec<AmountRow> = self
            .select(WATER_LOGS, &[("select", "amount_ml".to_owned()), user, day])
            .await?;
        Ok(rows
            .iter()
            .fold(0_u32, |acc, row| acc.saturating_add(row.amount_ml)))
    }

    async fn fetch_all_wods(&self, profile_id: Uuid) -> AppResult<Vec<WodEntry>> {
        let rows: Vec<WodRow> = self
            .select(
                WODS,
                &[
                    ("select", "*".to_owned()),
                    ("user_id", format!("eq.{profile_id}")),
                    ("order", "date.desc".to_owned()),
                ],
            )
            .await?;
        Ok(rows.into_iter().map(WodEntry::from).collect())
    }

    async fn fetch_profile(&self, auth_id: &str) -> AppResult<Option<Profile>> {
        let rows: Vec<ProfileRow> = self
            .select(
                PROFILES,
                &[
                    ("select", "*".to_owned()),
                    ("auth_id", format!("eq.{auth_id}")),
                    ("limit", "1".to_owned()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next().map(Profile::from))
    }

    async fn save_profile(&self, profile: &Profile) -> AppResult<()> {
        self.upsert(PROFILES, &ProfileRow::from(profile)).await
    }
}
