//! Automation Global CLI — entry point.
//!
//! A thin harness around the completion service, backed by the in-memory
//! store (the production backend plugs in Postgres instead).
//!
//! # Commands
//!
//! - `autoglobal complete PROMPT [-m MODEL] [-o ORG]` — run one completion
//! - `autoglobal providers` — list vendors and their availability
//! - `autoglobal quota ORG [--plan PLAN]` — show the monthly allowance
//! - `autoglobal usage ORG [--period PERIOD]` — show usage stats
//! - `autoglobal init` — write a default config file
//! - `autoglobal status` — show configuration

use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

use autoglobal_ai::CompletionService;
use autoglobal_core::config::{get_config_path, load_config, save_config, Config};
use autoglobal_core::plans::{SubscriptionPlan, UNLIMITED};
use autoglobal_core::storage::MemoryStore;
use autoglobal_core::types::{CompletionRequest, Organization, Period};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Automation Global — AI completion and usage accounting
#[derive(Parser)]
#[command(name = "autoglobal", version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true, default_value_t = false)]
    logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one completion through the dispatcher
    Complete {
        /// The prompt to send
        prompt: String,

        /// Explicit model (claude-family names route to Anthropic)
        #[arg(short, long)]
        model: Option<String>,

        /// Organization the request is billed to
        #[arg(short, long, default_value = "demo-org")]
        org: String,

        /// System prompt
        #[arg(long)]
        system: Option<String>,

        /// Max tokens to generate
        #[arg(long)]
        max_tokens: Option<u32>,

        /// Sampling temperature
        #[arg(long)]
        temperature: Option<f64>,
    },

    /// List AI vendors and whether they are configured
    Providers,

    /// Show the monthly AI-request allowance for an organization
    Quota {
        /// Organization id
        org: String,

        /// Subscription plan to seed the demo organization with
        #[arg(long, default_value = "starter")]
        plan: String,
    },

    /// Show usage stats for an organization
    Usage {
        /// Organization id
        org: String,

        /// Reporting window: today, week, or month
        #[arg(long, default_value = "month")]
        period: String,
    },

    /// Write a default config file to edit API keys into
    Init,

    /// Show configuration and provider status
    Status,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.logs);

    let config = load_config(None);

    match cli.command {
        Commands::Complete {
            prompt,
            model,
            org,
            system,
            max_tokens,
            temperature,
        } => cmd_complete(&config, prompt, model, org, system, max_tokens, temperature).await,
        Commands::Providers => cmd_providers(&config),
        Commands::Quota { org, plan } => cmd_quota(&config, &org, &plan).await,
        Commands::Usage { org, period } => cmd_usage(&config, &org, &period).await,
        Commands::Init => cmd_init(),
        Commands::Status => cmd_status(&config),
    }
}

fn init_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();
}

/// Build a service over a fresh in-memory store seeded with one demo
/// organization.
fn demo_service(
    config: &Config,
    org_id: &str,
    plan: SubscriptionPlan,
) -> (CompletionService, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    store.upsert_organization(Organization {
        id: org_id.to_string(),
        name: org_id.to_string(),
        subscription_plan: plan,
    });
    let service = CompletionService::from_config(config, store.clone());
    (service, store)
}

// ─────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
async fn cmd_complete(
    config: &Config,
    prompt: String,
    model: Option<String>,
    org: String,
    system: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f64>,
) -> Result<()> {
    let (service, _store) = demo_service(config, &org, SubscriptionPlan::Starter);

    let quota = service.check_quota(&org).await?;
    if !quota.within_quota {
        return Err(anyhow!("organization {} is over its monthly AI quota", org));
    }

    let request = CompletionRequest {
        user_id: None,
        model,
        max_tokens,
        temperature,
        system_prompt: system,
        ..CompletionRequest::new(org, prompt)
    };

    let response = service.generate_completion(&request).await?;

    println!("{}", response.content);
    println!();
    println!(
        "{}",
        format!(
            "[{} / {} | {} tokens | ${:.4} | {} ms]",
            response.provider.display_name(),
            response.model,
            response.tokens,
            response.cost,
            response.duration_ms
        )
        .dimmed()
    );

    Ok(())
}

fn cmd_providers(config: &Config) -> Result<()> {
    let service = CompletionService::from_config(config, Arc::new(MemoryStore::new()));

    println!("{}", "AI providers".bold());
    for info in service.available_providers() {
        let marker = if info.is_available {
            "✓".green()
        } else {
            "✗".red()
        };
        let note = if info.is_available {
            "configured"
        } else {
            "no API key"
        };
        println!("  {} {:<10} {}", marker, info.name, note.dimmed());
    }
    Ok(())
}

async fn cmd_quota(config: &Config, org: &str, plan: &str) -> Result<()> {
    let plan: SubscriptionPlan = plan.parse().map_err(|e: String| anyhow!(e))?;
    let (service, _store) = demo_service(config, org, plan);

    let quota = service.check_quota(org).await?;

    println!("{} ({} plan)", org.bold(), plan);
    if quota.limit == UNLIMITED {
        println!("  AI requests: {}", "unlimited".green());
    } else {
        let status = if quota.within_quota {
            "within quota".green()
        } else {
            "over quota".red()
        };
        println!(
            "  AI requests: {} of {} remaining ({})",
            quota.remaining, quota.limit, status
        );
    }
    Ok(())
}

async fn cmd_usage(config: &Config, org: &str, period: &str) -> Result<()> {
    let period: Period = period.parse().map_err(|e: String| anyhow!(e))?;
    let (service, _store) = demo_service(config, org, SubscriptionPlan::Starter);

    let stats = service.usage_stats(org, period).await?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

fn cmd_init() -> Result<()> {
    let path = get_config_path();
    if path.exists() {
        println!("Config already exists at {}", path.display());
        return Ok(());
    }

    save_config(&Config::default(), None)?;
    println!("{} Wrote default config to {}", "✓".green(), path.display());
    println!(
        "  Edit it (or set OPENAI_API_KEY / ANTHROPIC_API_KEY) to enable providers."
    );
    Ok(())
}

fn cmd_status(config: &Config) -> Result<()> {
    println!("{}", "Automation Global AI".bold());
    println!();
    println!("  Default OpenAI model:    {}", config.ai.default_openai_model);
    println!(
        "  Default Anthropic model: {}",
        config.ai.default_anthropic_model
    );
    println!("  Max tokens:              {}", config.ai.max_tokens);
    println!("  Temperature:             {}", config.ai.temperature);
    println!("  Request timeout:         {}s", config.ai.timeout_secs);
    println!("  Load balancing:          {:?}", config.ai.load_balancing);
    println!();

    cmd_providers(config)
}
