//! EduManage CLI — command-line client for the EduManage billing API.
//!
//! Set EDUMANAGE_API_KEY and EDUMANAGE_API_URL (or API_URL). Uses X-API-Key
//! auth.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;

use edumanage_cli::init_tracing;
use edumanage_client::{
    ApiClient, ConfigCache, EntitlementStore, FileConfigCache, LockoutGate, NoCache,
    UpgradeWorkflow,
};
use edumanage_core::models::{PaymentPhase, Plan, PLAN_CATALOG};
use edumanage_core::{billing, ClientConfig, Feature};

#[derive(Parser)]
#[command(name = "edumanage", about = "EduManage subscription CLI")]
struct Cli {
    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show school identity, plan, status, and lock state
    Status,
    /// List gated features and whether the current plan enables them
    Features,
    /// List the plan catalog with prices and the amount due from here
    Plans,
    /// Purchase or upgrade to a plan via mobile-money push
    Upgrade {
        /// Target plan: basic, standard, or enterprise
        #[arg(long)]
        plan: String,
        /// Mobile-money phone number to push the payment prompt to
        #[arg(long)]
        phone: String,
    },
    /// Force a tenant-config reload and report the lock state
    Recheck,
}

#[derive(Serialize)]
struct StatusReport {
    school_name: String,
    school_code: Option<String>,
    plan: Option<Plan>,
    status: Option<String>,
    locked: bool,
    trial_days_remaining: i64,
}

#[derive(Serialize)]
struct FeatureReport {
    feature: &'static str,
    enabled: bool,
}

#[derive(Serialize)]
struct PlanReport {
    plan: Plan,
    name: &'static str,
    monthly_amount: i64,
    due_from_here: i64,
    prorated: bool,
    current: bool,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = ClientConfig::from_env();
    let api = Arc::new(ApiClient::from_env_with_timeout(Duration::from_secs(
        config.request_timeout_secs,
    ))?);
    let cache: Arc<dyn ConfigCache> = match &config.cache_path {
        Some(path) => Arc::new(FileConfigCache::new(path.clone())),
        None => Arc::new(NoCache),
    };

    let store = EntitlementStore::new(api.clone(), cache);
    store.load().await;

    match cli.command {
        Commands::Status => {
            let tenant = store.config();
            let report = StatusReport {
                school_name: tenant.school_name.clone(),
                school_code: tenant.school_code.clone(),
                plan: tenant.subscription.as_ref().map(|s| s.plan),
                status: tenant
                    .subscription
                    .as_ref()
                    .map(|s| format!("{:?}", s.status).to_lowercase()),
                locked: store.is_locked(),
                trial_days_remaining: store.trial_days_remaining(),
            };
            if cli.json {
                print_json(&report)?;
            } else {
                println!("School:  {}", report.school_name);
                if let Some(code) = &report.school_code {
                    println!("Code:    {}", code);
                }
                match (&report.plan, &report.status) {
                    (Some(plan), Some(status)) => {
                        println!("Plan:    {} ({})", plan.display_name(), status)
                    }
                    _ => println!("Plan:    none"),
                }
                println!("Locked:  {}", report.locked);
                if report.trial_days_remaining > 0 {
                    println!("Trial:   {} day(s) remaining", report.trial_days_remaining);
                }
            }
        }
        Commands::Features => {
            let reports: Vec<FeatureReport> = Feature::all()
                .map(|feature| FeatureReport {
                    feature: feature.name(),
                    enabled: store.has_feature(feature),
                })
                .collect();
            if cli.json {
                print_json(&reports)?;
            } else {
                for report in reports {
                    let mark = if report.enabled { "on " } else { "off" };
                    println!("{}  {}", mark, report.feature);
                }
            }
        }
        Commands::Plans => {
            let tenant = store.config();
            let subscription = tenant.subscription.as_ref();
            let reports: Vec<PlanReport> = PLAN_CATALOG
                .iter()
                .map(|entry| PlanReport {
                    plan: entry.plan,
                    name: entry.name,
                    monthly_amount: entry.monthly_amount,
                    due_from_here: billing::due_amount(subscription, entry.plan),
                    prorated: billing::prorated(subscription, entry.plan),
                    current: subscription.map(|s| s.plan == entry.plan).unwrap_or(false),
                })
                .collect();
            if cli.json {
                print_json(&reports)?;
            } else {
                for report in reports {
                    let marker = if report.current { "*" } else { " " };
                    let banner = if report.prorated { " (pro-rated)" } else { "" };
                    println!(
                        "{} {:<11} {:>5}/mo   due from here: {}{}",
                        marker, report.name, report.monthly_amount, report.due_from_here, banner
                    );
                }
            }
        }
        Commands::Upgrade { plan, phone } => {
            let target: Plan = plan.parse()?;
            let workflow = UpgradeWorkflow::new(api.clone(), store.clone(), &config);

            let quote = workflow.quote(target);
            if quote.prorated {
                println!(
                    "Upgrading to {}: {} due (pro-rated difference)",
                    target.display_name(),
                    quote.amount
                );
            } else {
                println!("Purchasing {}: {} due", target.display_name(), quote.amount);
            }

            let mut phases = workflow.subscribe();
            workflow.submit(target, &phone).await?;

            loop {
                let phase = phases.borrow_and_update().clone();
                match phase {
                    PaymentPhase::Idle => {}
                    PaymentPhase::Processing => println!("Contacting payment gateway..."),
                    PaymentPhase::Waiting { reference } => println!(
                        "Payment prompt sent (reference {}). Approve it on your phone; waiting for confirmation...",
                        reference
                    ),
                    PaymentPhase::Success => {
                        println!("Payment confirmed. Entitlements refreshed.");
                        return Ok(());
                    }
                    PaymentPhase::Error { message } => {
                        anyhow::bail!("Payment failed: {}", message);
                    }
                }
                if phases.changed().await.is_err() {
                    break;
                }
            }
        }
        Commands::Recheck => {
            let gate = LockoutGate::new(store.clone());
            let locked = gate.recheck().await;
            if cli.json {
                print_json(&serde_json::json!({ "locked": locked }))?;
            } else if locked {
                if let Some(notice) = gate.notice() {
                    println!("{}: {}", notice.headline, notice.message);
                } else {
                    println!("Account is locked.");
                }
            } else {
                println!("Account is unlocked.");
            }
        }
    }

    Ok(())
}
