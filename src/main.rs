#![forbid(unsafe_code)]

mod commands;
mod discord;
mod poise_error_handler;
mod roles;
mod settings;
mod summary;
mod web;

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
    process::exit,
    sync::Arc,
};

use discord::{GuildGateway, SerenityGateway};
use poise::{serenity_prelude::*, Framework};
use poise_error_handler::handle_error;
use roles::RoleGranter;
use serde::Deserialize;
use settings::SettingsStore;
use tokio::{select, signal, sync::Notify};
use tracing::{error, info, info_span, warn, Instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use web::{AllowedOrigins, AppState};

#[derive(Deserialize)]
struct AppConfig {
    discord_bot_token: String,
    #[serde(default = "default_settings_path")]
    settings_path: PathBuf,
    #[serde(default = "default_http_bind")]
    http_bind: IpAddr,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default)]
    allowed_origins: Vec<String>,
    #[serde(default = "default_member_search_limit")]
    member_search_limit: u64,
    register_commands_globally: Option<bool>,
    register_commands_in_guilds: Option<Vec<u64>>,
}

fn default_settings_path() -> PathBuf {
    PathBuf::from("config.json")
}

fn default_http_bind() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    10000
}

fn default_member_search_limit() -> u64 {
    100
}

pub struct BotState {
    pub settings: Arc<SettingsStore>,
    pub gateway: Arc<dyn GuildGateway>,
    pub granter: Arc<RoleGranter>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = dotenvy::dotenv() {
        warn!("Could not load config from .env file: {err}");
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(
                    "form_summary_bot=info"
                        .parse()
                        .expect("Hard-coded default directive should be correct"),
                )
                .from_env_lossy(),
        )
        .init();

    let app_config = match envy::from_env::<AppConfig>() {
        Ok(config) => config,
        Err(err) => {
            error!("Could not load app config: {err}");
            exit(255);
        }
    };

    let origins = match AllowedOrigins::new(&app_config.allowed_origins) {
        Ok(origins) => Arc::new(origins),
        Err(err) => {
            error!("Invalid ALLOWED_ORIGINS: {err}");
            exit(255);
        }
    };

    let settings = Arc::new(SettingsStore::load(app_config.settings_path.clone()).await);
    info!("Using settings file {}", settings.path().display());
    let member_search_limit = app_config.member_search_limit;
    let bot_settings = settings.clone();

    let framework = Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            on_error: |error| Box::pin(handle_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(
                async move {
                    info!("Logged in as {}", ready.user.name);
                    let commands = &framework.options().commands;

                    if let Some(true) = app_config.register_commands_globally {
                        info!("Registering commands globally");
                        poise::builtins::register_globally(ctx, commands).await?;
                    }

                    if let Some(guilds) = app_config.register_commands_in_guilds {
                        for guild in guilds.iter().map(|g| GuildId::new(*g)) {
                            let guild_name = ctx
                                .http()
                                .get_guild(guild)
                                .await
                                .map(|g| g.name)
                                .unwrap_or("???".to_string());

                            info!("Registering commands in guild {guild} ({guild_name})");

                            poise::builtins::register_in_guild(ctx, commands, guild).await?;
                        }
                    }

                    let gateway: Arc<dyn GuildGateway> =
                        Arc::new(SerenityGateway::new(ctx.http.clone()));

                    Ok(BotState {
                        settings: bot_settings,
                        granter: Arc::new(RoleGranter::new(gateway.clone(), member_search_limit)),
                        gateway,
                    })
                }
                .instrument(info_span!("bot_setup")),
            )
        })
        .build();

    let intents = GatewayIntents::GUILDS | GatewayIntents::GUILD_MEMBERS;
    let mut client = match ClientBuilder::new(app_config.discord_bot_token, intents)
        .framework(framework)
        .await
    {
        Ok(client) => client,
        Err(err) => {
            error!("Failed to create the client: {err}");
            exit(255);
        }
    };

    let gateway: Arc<dyn GuildGateway> = Arc::new(SerenityGateway::new(client.http.clone()));
    let web_state = AppState {
        settings,
        granter: Arc::new(RoleGranter::new(gateway.clone(), member_search_limit)),
        gateway,
        origins,
    };

    let shutdown_notify = Arc::new(Notify::new());
    let address = SocketAddr::new(app_config.http_bind, app_config.port);
    let mut web_task = tokio::spawn(web::serve(web_state, address, shutdown_notify.clone()));
    let shard_manager = client.shard_manager.clone();

    select! {
        _ = signal::ctrl_c() => {
            info!("Ctrl-C received, shutting down");
            shutdown_notify.notify_waiters();
            shard_manager.shutdown_all().await;
            if let Err(err) = web_task.await {
                error!("Web API task failed: {err}");
            }
        },

        result = client.start() => {
            if let Err(err) = result {
                error!("Failed to start the client: {err}");
            }
            shutdown_notify.notify_waiters();
        },

        result = &mut web_task => {
            match result {
                Ok(Ok(())) => info!("Web API exited"),
                Ok(Err(err)) => error!("Web API failed: {err:#}"),
                Err(err) => error!("Web API task failed: {err}"),
            }
            shard_manager.shutdown_all().await;
        },
    };
}
