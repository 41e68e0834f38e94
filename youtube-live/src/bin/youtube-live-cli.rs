use clap::{Parser, Subcommand};
use eyre::{Context, OptionExt};
use oauth2::basic::BasicTokenResponse;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio_stream::StreamExt;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use youtube_live::launcher::{LaunchEvent, LauncherConfig, LiveLauncher};
use youtube_live::oauth::{OAuthManager, OAuthTokenProvider};
use youtube_live::timestamp;
use youtube_live::token::{StaticToken, TokenProvider};
use youtube_live::youtube_api::{
    BroadcastFilter, BroadcastPrivacyStatus, BroadcastStatus, ClientConfig, IngestionType,
    LiveBroadcast, LiveBroadcastInsert, LiveBroadcastUpdate, LiveStream, LiveStreamInsert,
    LiveStreamUpdate, YouTubeClient,
};

/// Manage YouTube live broadcasts and streams, and take broadcasts live.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Developer API key sent as the `key` query parameter.
    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Use this access token as-is instead of the tokens file.
    #[arg(long, env = "YOUTUBE_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Stored OAuth tokens; refreshed tokens are written back here.
    #[arg(long, env = "YOUTUBE_TOKENS", default_value = "tokens.json")]
    tokens: PathBuf,

    #[arg(long, env = "YOUTUBE_CLIENT_ID")]
    client_id: Option<String>,

    #[arg(long, env = "YOUTUBE_CLIENT_SECRET", hide_env_values = true)]
    client_secret: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(subcommand)]
    Broadcasts(BroadcastCommand),
    #[command(subcommand)]
    Streams(StreamCommand),
    /// Poll a bound broadcast and transition it until it is live.
    Launch {
        broadcast_id: String,
        stream_id: String,
        /// Seconds between status checks.
        #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
        poll_interval: u64,
        /// Keep polling after the broadcast is live, until interrupted.
        #[arg(long)]
        keep_polling: bool,
    },
}

#[derive(Debug, Subcommand)]
enum BroadcastCommand {
    List {
        /// One of all, active, completed, upcoming.
        #[arg(long, default_value = "all")]
        status: BroadcastFilter,
    },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Scheduled start (RFC 3339); defaults to now.
        #[arg(long)]
        start: Option<jiff::Timestamp>,
        #[arg(long, default_value = "private")]
        privacy: BroadcastPrivacyStatus,
        /// Complete the broadcast when the encoder stops.
        #[arg(long)]
        auto_stop: bool,
    },
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        start: Option<jiff::Timestamp>,
        #[arg(long)]
        privacy: Option<BroadcastPrivacyStatus>,
    },
    Delete {
        id: String,
    },
    Bind {
        id: String,
        stream_id: String,
    },
    Transition {
        id: String,
        /// One of testing, live, complete.
        status: BroadcastStatus,
    },
}

#[derive(Debug, Subcommand)]
enum StreamCommand {
    List,
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// Fixed format such as 1080p; variable resolution when omitted.
        #[arg(long)]
        format: Option<String>,
        #[arg(long, default_value = "rtmp")]
        ingestion: IngestionType,
    },
    Update {
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        format: String,
        #[arg(long, default_value = "rtmp")]
        ingestion: IngestionType,
    },
    Delete {
        id: String,
    },
}

/// Either a token from the command line or stored OAuth tokens.
#[derive(Debug)]
enum Tokens {
    Static(StaticToken),
    OAuth(OAuthTokenProvider),
}

impl TokenProvider for Tokens {
    async fn access_token(&self) -> eyre::Result<Option<String>> {
        match self {
            Self::Static(token) => token.access_token().await,
            Self::OAuth(provider) => provider.access_token().await,
        }
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    let args = Args::parse();
    let tokens = load_tokens(&args).await?;

    let yt = YouTubeClient::new(
        tokens,
        ClientConfig {
            api_key: args.api_key.clone(),
            ..ClientConfig::default()
        },
        reqwest::Client::new(),
    );

    let result = run(&yt, args.command).await;

    // save refreshed tokens even if the command failed
    if let Tokens::OAuth(provider) = yt.token_provider() {
        let json = serde_json::to_string(&[provider.token().await])
            .context("serialize refreshed tokens")?;
        tokio::fs::write(&args.tokens, json)
            .await
            .with_context(|| format!("write tokens to {}", args.tokens.display()))?;
        tracing::debug!(path = %args.tokens.display(), "saved tokens");
    }

    result
}

async fn load_tokens(args: &Args) -> eyre::Result<Tokens> {
    if let Some(token) = &args.access_token {
        return Ok(Tokens::Static(StaticToken::new(token.clone())));
    }

    let stored = tokio::fs::read_to_string(&args.tokens)
        .await
        .with_context(|| format!("read tokens from {}", args.tokens.display()))?;
    let tokens: Vec<BasicTokenResponse> =
        serde_json::from_str(&stored).context("parse stored YouTube tokens")?;
    let token = tokens
        .into_iter()
        .next()
        .ok_or_eyre("tokens file holds no tokens")?;

    let client_id = args
        .client_id
        .as_deref()
        .ok_or_eyre("--client-id is needed to refresh stored tokens")?;
    let client_secret = args
        .client_secret
        .as_deref()
        .ok_or_eyre("--client-secret is needed to refresh stored tokens")?;
    let oauth_manager = OAuthManager::new(client_id, client_secret)?;

    Ok(Tokens::OAuth(OAuthTokenProvider::stored(token, oauth_manager)))
}

async fn run(yt: &YouTubeClient<Tokens>, command: Command) -> eyre::Result<()> {
    match command {
        Command::Broadcasts(command) => broadcasts(yt, command).await,
        Command::Streams(command) => streams(yt, command).await,
        Command::Launch {
            broadcast_id,
            stream_id,
            poll_interval,
            keep_polling,
        } => {
            launch(
                yt,
                &broadcast_id,
                &stream_id,
                LauncherConfig {
                    poll_interval: Duration::from_secs(poll_interval),
                    stop_when_live: !keep_polling,
                },
            )
            .await
        }
    }
}

async fn broadcasts(yt: &YouTubeClient<Tokens>, command: BroadcastCommand) -> eyre::Result<()> {
    match command {
        BroadcastCommand::List { status } => {
            let broadcasts = yt.live_broadcasts(status);
            let mut broadcasts = std::pin::pin!(broadcasts);
            while let Some(broadcast) = broadcasts.next().await {
                let broadcast = broadcast.context("fetch broadcast")?;
                print_broadcast(&broadcast);
            }
        }
        BroadcastCommand::Create {
            title,
            description,
            start,
            privacy,
            auto_stop,
        } => {
            let start = start.unwrap_or_else(jiff::Timestamp::now);
            let mut insert = LiveBroadcastInsert::new(title, description, start).privacy(privacy);
            if auto_stop {
                insert = insert.enable_auto_stop(true);
            }
            let broadcast = yt
                .insert_live_broadcast(&insert)
                .await
                .context("create broadcast")?;
            print_broadcast(&broadcast);
        }
        BroadcastCommand::Update {
            id,
            title,
            description,
            start,
            privacy,
        } => {
            let current = yt
                .get_live_broadcast(&id)
                .await
                .context("fetch broadcast to update")?;
            let mut update = LiveBroadcastUpdate::from(&current);
            if let Some(title) = title {
                update = update.title(title);
            }
            if let Some(description) = description {
                update = update.description(description);
            }
            if let Some(start) = start {
                update = update.scheduled_start_time(start);
            }
            if let Some(privacy) = privacy {
                update = update.privacy(privacy);
            }
            let broadcast = yt
                .update_live_broadcast(&update)
                .await
                .context("update broadcast")?;
            print_broadcast(&broadcast);
        }
        BroadcastCommand::Delete { id } => {
            yt.delete_live_broadcast(&id)
                .await
                .context("delete broadcast")?;
            eprintln!("deleted broadcast {id}");
        }
        BroadcastCommand::Bind { id, stream_id } => {
            let broadcast = yt
                .bind_live_broadcast(&id, &stream_id)
                .await
                .context("bind broadcast to stream")?;
            print_broadcast(&broadcast);
        }
        BroadcastCommand::Transition { id, status } => {
            let broadcast = yt
                .transition_live_broadcast(&id, status)
                .await
                .with_context(|| format!("transition broadcast to {status}"))?;
            print_broadcast(&broadcast);
        }
    }
    Ok(())
}

async fn streams(yt: &YouTubeClient<Tokens>, command: StreamCommand) -> eyre::Result<()> {
    match command {
        StreamCommand::List => {
            let streams = yt.live_streams();
            let mut streams = std::pin::pin!(streams);
            while let Some(stream) = streams.next().await {
                let stream = stream.context("fetch stream")?;
                print_stream(&stream);
            }
        }
        StreamCommand::Create {
            title,
            description,
            format,
            ingestion,
        } => {
            let mut insert = LiveStreamInsert::new(title).ingestion_type(ingestion);
            if let Some(description) = description {
                insert = insert.description(description);
            }
            if let Some(format) = format {
                insert = insert.format(format);
            }
            let stream = yt
                .insert_live_stream(&insert)
                .await
                .context("create stream")?;
            print_stream(&stream);
            if let Some(info) = stream.cdn.and_then(|cdn| cdn.ingestion_info) {
                println!("  ingest: {}", info.ingestion_address);
                println!("  key:    {}", info.stream_name);
            }
        }
        StreamCommand::Update {
            id,
            title,
            format,
            ingestion,
        } => {
            let update = LiveStreamUpdate::new(id, title, format, ingestion);
            let stream = yt
                .update_live_stream(&update)
                .await
                .context("update stream")?;
            print_stream(&stream);
        }
        StreamCommand::Delete { id } => {
            yt.delete_live_stream(&id).await.context("delete stream")?;
            eprintln!("deleted stream {id}");
        }
    }
    Ok(())
}

async fn launch(
    yt: &YouTubeClient<Tokens>,
    broadcast_id: &str,
    stream_id: &str,
    config: LauncherConfig,
) -> eyre::Result<()> {
    let broadcast = yt
        .get_live_broadcast(broadcast_id)
        .await
        .context("fetch broadcast to launch")?;
    let stream = yt
        .get_live_stream(stream_id)
        .await
        .context("fetch stream to launch")?;

    let bound = broadcast
        .content_details
        .as_ref()
        .and_then(|details| details.bound_stream_id.as_deref());
    if bound != Some(stream_id) {
        tracing::warn!(
            broadcast = %broadcast.id,
            bound_stream = ?bound,
            "broadcast is not bound to the given stream; bind it first"
        );
    }

    let stop_when_live = config.stop_when_live;
    let mut launcher = LiveLauncher::new(yt.clone(), config);
    let mut events = launcher.subscribe();
    launcher.launch(broadcast, stream).await;

    let ctrl_c = tokio::signal::ctrl_c();
    let mut ctrl_c = std::pin::pin!(ctrl_c);
    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                tracing::info!("interrupted");
                break;
            }
            event = events.recv() => match event {
                Ok(LaunchEvent::EnteredLive) => {
                    println!("{broadcast_id} is live");
                    if stop_when_live {
                        break;
                    }
                }
                Ok(LaunchEvent::StatusChanged(snapshot)) => println!("{snapshot}"),
                Ok(LaunchEvent::Error(message)) => eprintln!("error: {message}"),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "fell behind on launcher events");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    launcher.stop().await;
    Ok(())
}

fn print_broadcast(broadcast: &LiveBroadcast) {
    let start = broadcast
        .snippet
        .scheduled_start_time
        .map(timestamp::format_local)
        .unwrap_or_default();
    println!(
        "{}  {:<12} {:<9} {:<25} {}",
        broadcast.id,
        broadcast.status.life_cycle_status.as_str(),
        broadcast.status.privacy_status.to_string(),
        start,
        broadcast.snippet.title
    );
}

fn print_stream(stream: &LiveStream) {
    let status = stream
        .stream_status()
        .map(|status| status.to_string())
        .unwrap_or_else(|| "-".to_string());
    let ingestion = stream
        .cdn
        .as_ref()
        .map(|cdn| cdn.ingestion_type.to_string())
        .unwrap_or_default();
    println!(
        "{}  {:<9} {:<7} {:<6} {}",
        stream.id,
        status,
        stream.health_status().to_string(),
        ingestion,
        stream.snippet.title
    );
}
