use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use finsight_core::domain::history::Period;
use finsight_core::domain::preference::{
    PreferenceVector, RiskBehavior, RiskTolerance, TimeHorizon,
};
use finsight_core::pipeline::Pipeline;
use finsight_core::prefs;

#[derive(Debug, Parser)]
#[command(name = "finsight")]
struct Args {
    /// The question to analyze.
    query_text: String,

    /// Stock ticker symbol.
    #[arg(long, default_value = "AAPL")]
    ticker: String,

    /// Lookback window for the price history.
    #[arg(long, value_enum, default_value_t = Period::OneYear)]
    period: Period,

    #[arg(long, value_enum, default_value_t = RiskTolerance::Medium)]
    risk: RiskTolerance,

    #[arg(long, value_enum, default_value_t = TimeHorizon::Long)]
    horizon: TimeHorizon,

    #[arg(long, value_enum, default_value_t = RiskBehavior::Averse)]
    behavior: RiskBehavior,

    /// Skip rule retrieval even when an index is configured.
    #[arg(long)]
    no_rules: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = finsight_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let preferences = PreferenceVector {
        risk_tolerance: args.risk,
        time_horizon: args.horizon,
        risk_behavior: args.behavior,
    };

    let pipeline = Pipeline::from_settings(&settings)?;

    tracing::info!(ticker = %args.ticker, period = %args.period, "running analysis");

    println!("{}", prefs::profile_summary(preferences));

    let outcome = pipeline
        .analyze(
            &args.query_text,
            &args.ticker,
            preferences,
            !args.no_rules,
            args.period,
        )
        .await;

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            return Err(err);
        }
    };

    let rule = "=".repeat(80);
    println!("\n{rule}");
    println!("DSS ANALYSIS RESPONSE (backend: {}):", outcome.backend);
    println!("{rule}");
    println!("{}", outcome.response);
    println!("\n{rule}");
    println!("SOURCES:");
    println!("{rule}");
    for source in &outcome.sources {
        println!("  - {source}");
    }
    println!("{rule}\n");

    Ok(())
}

fn init_sentry(settings: &finsight_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
