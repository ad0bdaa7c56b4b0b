//! reelgen CLI - Issue API tokens and wait for video tasks

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use reelgen_auth::{Claims, Header, Token, TokenPolicy, TokenSigner};
use reelgen_client::{ClientConfig, CredentialCache, HttpStatusCheck};
use reelgen_core::{CancelHandle, PollOutcome, TaskId, TaskPoller, TaskResult};
use tracing_subscriber::EnvFilter;

/// reelgen - Video generation API client
#[derive(Parser)]
#[command(name = "reelgen", version, about)]
struct Cli {
    /// Output JSON instead of human-readable text
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Issue a bearer token from REELGEN_ACCESS_KEY and REELGEN_SECRET_KEY
    Token {
        /// Issuer claim (defaults to the access key)
        #[arg(long)]
        issuer: Option<String>,

        /// Token lifetime in seconds
        #[arg(long, default_value_t = TokenPolicy::DEFAULT_VALIDITY_SECONDS)]
        validity: i64,
    },

    /// Decode a token's header and claims (the signature is not checked)
    Inspect {
        /// Encoded token
        token: String,
    },

    /// Poll a task until it finishes
    Wait {
        /// Task ID
        task_id: String,

        /// Maximum number of status checks
        #[arg(long)]
        max_attempts: Option<u32>,

        /// Delay between status checks, in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = run(cli).await;

    if let Err(e) = &result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Commands::Token { issuer, validity } => cmd_token(&cli, issuer.clone(), *validity),
        Commands::Inspect { token } => cmd_inspect(&cli, token),
        Commands::Wait {
            task_id,
            max_attempts,
            interval_ms,
        } => cmd_wait(&cli, TaskId::new(task_id.as_str()), *max_attempts, *interval_ms).await,
    }
}

fn load_config() -> Result<ClientConfig> {
    ClientConfig::from_env().context("Failed to load client configuration")
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

// ============================================================================
// Commands
// ============================================================================

fn cmd_token(cli: &Cli, issuer: Option<String>, validity: i64) -> Result<()> {
    if validity <= 0 {
        bail!("--validity must be positive");
    }

    let config = load_config()?;
    let issuer = issuer.unwrap_or_else(|| config.access_key.clone());
    let signer = TokenSigner::new(TokenPolicy {
        validity_seconds: validity,
        ..TokenPolicy::default()
    });

    let token = signer.issue(config.secret_key.expose(), &issuer, now());
    tracing::debug!(issuer = %issuer, validity, "Issued token");

    if cli.json {
        let (header, claims) = token.decode().context("Failed to decode issued token")?;
        println!(
            "{}",
            serde_json::to_string(&token_to_json(&token, &header, &claims))?
        );
    } else {
        // Token alone on stdout (script-friendly)
        println!("{token}");
    }

    Ok(())
}

fn cmd_inspect(cli: &Cli, raw: &str) -> Result<()> {
    let token = Token::parse(raw.trim()).context("Invalid token")?;
    let (header, claims) = token.decode().context("Invalid token")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string(&token_to_json(&token, &header, &claims))?
        );
        return Ok(());
    }

    let now = now();
    println!("Algorithm: {}", header.alg);
    println!("Type: {}", header.typ);
    println!("Issuer: {}", claims.iss);
    println!("Not Before: {}", format_timestamp(claims.nbf));
    println!("Expires: {}", format_timestamp(claims.exp));
    println!("Status: {}", validity_str(&claims, now));

    Ok(())
}

async fn cmd_wait(
    cli: &Cli,
    task_id: TaskId,
    max_attempts: Option<u32>,
    interval_ms: Option<u64>,
) -> Result<()> {
    let mut config = load_config()?;
    if let Some(max_attempts) = max_attempts {
        config.poll = config.poll.with_max_attempts(max_attempts);
    }
    if let Some(interval_ms) = interval_ms {
        config.poll = config.poll.with_interval(Duration::from_millis(interval_ms));
    }

    let now = now();
    let mut credentials = CredentialCache::from_config(&config);
    let bearer = credentials.bearer(now).clone();
    if let Some(expires_at) = credentials.expires_at() {
        let remaining = Duration::from_secs(expires_at.saturating_sub(now).max(0).unsigned_abs());
        if config.poll.ceiling() > remaining {
            tracing::warn!(
                ceiling_secs = config.poll.ceiling().as_secs(),
                token_secs = remaining.as_secs(),
                "Poll budget outlasts the bearer token"
            );
        }
    }

    let cancel = CancelHandle::new();
    let check = HttpStatusCheck::from_config(&config).context("Failed to set up HTTP client")?;
    let poller = TaskPoller::new(check, config.poll).with_cancel(cancel.signal());

    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received SIGINT (Ctrl+C), cancelling poll");
            cancel.cancel();
        }
    });

    eprintln!(
        "Waiting for task {task_id} (up to {} checks, every {} ms)...",
        config.poll.max_attempts,
        config.poll.interval.as_millis()
    );

    let outcome = poller.poll(&task_id, bearer.as_str()).await;
    signal_task.abort();

    match outcome.context("Status request failed")? {
        PollOutcome::Succeeded(result) => print_result(cli, &task_id, &result),
        PollOutcome::Failed(failure) => bail!("Task {task_id} failed: {failure}"),
        PollOutcome::TimedOut { attempts } => {
            bail!("Task {task_id} still running after {attempts} checks")
        }
        PollOutcome::Cancelled { attempts } => {
            bail!("Cancelled after {attempts} checks")
        }
        PollOutcome::Continue => bail!("Poll ended without an outcome"),
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn print_result(cli: &Cli, task_id: &TaskId, result: &TaskResult) -> Result<()> {
    if cli.json {
        println!("{}", serde_json::to_string(result.as_json())?);
        return Ok(());
    }

    let videos = result.videos().context("Unexpected task result")?;
    eprintln!("Task {task_id} succeeded ({} video(s))", videos.len());
    for video in &videos {
        // URLs alone on stdout (script-friendly)
        println!("{}", video.url);
        if let Some(seconds) = video.duration_seconds() {
            eprintln!("  {} ({seconds:.1}s)", video.id);
        }
    }

    Ok(())
}

fn validity_str(claims: &Claims, now: i64) -> &'static str {
    if claims.is_current(now) {
        "valid"
    } else if now < claims.nbf {
        "not yet valid"
    } else {
        "expired"
    }
}

fn format_timestamp(secs: i64) -> String {
    use chrono::{TimeZone, Utc};
    Utc.timestamp_opt(secs, 0)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "invalid".to_string())
}

fn token_to_json(token: &Token, header: &Header, claims: &Claims) -> serde_json::Value {
    serde_json::json!({
        "token": token.as_str(),
        "header": header,
        "claims": claims,
    })
}
