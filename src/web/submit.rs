use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use poise::serenity_prelude::GuildId;
use serde_json::Value;
use tracing::{error, info, warn};

use super::{payload::parse_snowflake, ApiError, AppState, StatusBody, SubmissionPayload};
use crate::{
    settings::{GuildConfig, SettingsStore},
    summary::Card,
};

/// `POST /submit`: posts the form answers to the guild's summary channel.
pub async fn submit(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<StatusBody>, ApiError> {
    let Json(body) = body.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let payload = SubmissionPayload::from_json(body)?;

    deliver_submission(&state, &payload).await?;

    Ok(Json(StatusBody::ok()))
}

/// Sends the summary card, then tries to grant the configured role.
///
/// Once the card is sent, nothing that goes wrong with the role turns the
/// submission into a failure.
#[tracing::instrument(skip_all, fields(guild_id))]
pub async fn deliver_submission(
    state: &AppState,
    payload: &SubmissionPayload,
) -> Result<(), ApiError> {
    let (guild_id, config) = route_submission(&state.settings, payload).await?;
    tracing::Span::current().record("guild_id", guild_id.get());

    let channel_id = config.summary_channel.ok_or_else(|| {
        ApiError::BadRequest("No summary channel is configured for this server".to_string())
    })?;

    match state.gateway.channel_exists(channel_id).await {
        Ok(true) => {}
        Ok(false) => {
            warn!("Summary channel {channel_id} does not exist");
            return Err(ApiError::NotFound("Summary channel not found".to_string()));
        }
        Err(err) => {
            warn!("Could not fetch summary channel {channel_id}: {err:#}");
            return Err(ApiError::NotFound("Summary channel not found".to_string()));
        }
    }

    let card = Card::submission(&config, payload.fields());
    state
        .gateway
        .send_card(channel_id, &card)
        .await
        .with_context(|| format!("Could not send the summary to channel {channel_id}"))?;
    info!("Posted a submission summary to channel {channel_id}");

    let user = payload.user();
    match state
        .granter
        .grant(guild_id, config.role_to_grant.as_ref(), user.as_ref())
        .await
    {
        Ok(outcome) => info!("Role grant finished: {outcome}"),
        Err(err) => error!("Could not grant the role to {user:?}: {err:#}"),
    }

    Ok(())
}

/// Picks the guild a submission belongs to.
///
/// `guild_id` wins, then `server_id` as a linked id, then `server_id` as a
/// guild id. Only guilds that have settings are eligible.
pub async fn route_submission(
    settings: &SettingsStore,
    payload: &SubmissionPayload,
) -> Result<(GuildId, GuildConfig), ApiError> {
    if let Some(guild_id) = payload.guild_id() {
        if settings.contains(guild_id).await {
            return Ok((guild_id, settings.get(guild_id).await));
        }
    }

    if let Some(server_id) = payload.server_id() {
        if let Some(found) = settings.find_by_external_id(server_id).await {
            return Ok(found);
        }

        if let Some(guild_id) = parse_snowflake(server_id).map(GuildId::new) {
            if settings.contains(guild_id).await {
                return Ok((guild_id, settings.get(guild_id).await));
            }
        }
    }

    if payload.guild_id().is_none() && payload.server_id().is_none() {
        return Err(ApiError::BadRequest(
            "The submission has no guild_id or server_id".to_string(),
        ));
    }

    Err(ApiError::BadRequest("Server not found".to_string()))
}
