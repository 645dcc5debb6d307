use clap::{Parser, Subcommand};
use serde::Serialize;

use trackmate::app::tools;
use trackmate::utils::logger;
use trackmate::{
    Assistant, ClientConfig, CliConfig, DiagnosisResult, InquiryDraft, PackageReport, Result,
    SweetTrackerClient,
};

#[derive(Debug, Parser)]
#[command(name = "trackmate", version, about = "Korean parcel tracking assistant")]
struct Cli {
    #[command(flatten)]
    config: CliConfig,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Extract tracking-number candidates from free-form text
    Parse {
        /// Text to scan, e.g. a pasted shipping notification
        text: String,
    },
    /// Track one package and show its status, history and arrival estimate
    Track {
        tracking_number: String,
        /// Carrier name, alias or numeric code; auto-detected when omitted
        #[arg(long)]
        carrier: Option<String>,
    },
    /// Track several packages at once (up to 10)
    Packages {
        #[arg(required = true)]
        tracking_numbers: Vec<String>,
    },
    /// Estimate when a package will arrive
    Predict {
        tracking_number: String,
        #[arg(long)]
        carrier: Option<String>,
    },
    /// Diagnose a delayed or stuck delivery
    Diagnose {
        tracking_number: String,
        #[arg(long)]
        carrier: Option<String>,
    },
    /// Draft an inquiry message to the carrier or the seller
    Inquiry {
        tracking_number: String,
        #[arg(long)]
        carrier: Option<String>,
        /// Who the message is for: "courier" or "seller"
        #[arg(long, default_value = "courier")]
        recipient: String,
    },
}

fn emit<T: Serialize>(value: &T, json: bool, render: impl Fn(&T) -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", render(value));
    }
    Ok(())
}

fn render_candidates(candidates: &Vec<trackmate::Candidate>) -> String {
    if candidates.is_empty() {
        return "No tracking numbers found.".to_string();
    }
    let mut out = String::new();
    for candidate in candidates {
        let carrier = candidate
            .courier
            .map(|c| format!("{} ({})", c.name_en, c.name))
            .unwrap_or_else(|| "carrier unknown".to_string());
        out.push_str(&format!(
            "📦 {}  {}\n   found in: \"{}\"\n",
            candidate.tracking_number, carrier, candidate.raw_text
        ));
    }
    out.trim_end().to_string()
}

fn render_report(report: &PackageReport) -> String {
    let mut out = format!(
        "📦 {} {}\n   Status: {} ({})\n   Progress: {}%\n",
        report.record.carrier_name,
        report.record.tracking_number,
        report.status.plain,
        report.status.original,
        report.progress_percent,
    );
    if let Some(item) = &report.record.item_name {
        out.push_str(&format!("   Item: {}\n", item));
    }
    if !report.record.events.is_empty() {
        out.push_str("   History:\n");
        for event in &report.record.events {
            out.push_str(&format!(
                "     {}  {}  {}\n",
                event.raw_time, event.status, event.location
            ));
        }
    }
    out.push_str(&format!(
        "   Arrival: {} (confidence: {})",
        report.arrival.summary, report.arrival.confidence
    ));
    out
}

fn render_batch(batch: &tools::BatchReport) -> String {
    let mut out = String::new();
    for lookup in &batch.lookups {
        match &lookup.outcome {
            tools::LookupOutcome::Success { report } => {
                out.push_str(&format!(
                    "📦 {}  {} — {} ({}%)\n",
                    lookup.tracking_number,
                    report.record.carrier_name,
                    report.status.short,
                    report.progress_percent
                ));
            }
            tools::LookupOutcome::NotFound { message }
            | tools::LookupOutcome::CourierUnknown { message }
            | tools::LookupOutcome::Upstream { message } => {
                out.push_str(&format!("❌ {}  {}\n", lookup.tracking_number, message));
            }
        }
    }
    let s = &batch.summary;
    out.push_str(&format!(
        "\n{} total: {} delivered, {} arriving today, {} in transit, {} with issues, {} failed",
        s.total, s.delivered, s.arriving_today, s.in_transit, s.issues, s.failed
    ));
    out
}

fn render_estimate(estimate: &trackmate::ArrivalEstimate) -> String {
    let mut out = format!(
        "🕐 {} (confidence: {})\n",
        estimate.summary, estimate.confidence
    );
    for line in &estimate.basis {
        out.push_str(&format!("   - {}\n", line));
    }
    out.trim_end().to_string()
}

fn render_diagnosis(diagnosis: &DiagnosisResult) -> String {
    let mut out = format!("Severity: {:?}\n", diagnosis.severity);
    if let Some(location) = &diagnosis.last_location {
        out.push_str(&format!(
            "Last seen: {} ({} day(s) ago)\n",
            location, diagnosis.dwell_days
        ));
    }
    out.push_str("Probable causes:\n");
    for cause in &diagnosis.probable_causes {
        out.push_str(&format!(
            "   {:>3}%  {}\n",
            cause.confidence_percent, cause.cause
        ));
    }
    out.push_str(&format!("Recommended: {}", diagnosis.recommended_action));
    if let Some(contact) = &diagnosis.contact {
        out.push_str(&format!(
            "\nContact: {} {} ({})",
            contact.carrier_name, contact.phone, contact.website
        ));
    }
    out
}

fn render_draft(draft: &InquiryDraft) -> String {
    format!("Subject: {}\n\n{}", draft.subject, draft.body)
}

fn assistant(config: &CliConfig) -> Result<Assistant<SweetTrackerClient>> {
    let client_config = ClientConfig::from_cli(config)?;
    let client = SweetTrackerClient::new(&client_config)?;
    Ok(Assistant::new(client, config.load_policy()?))
}

async fn run(cli: Cli) -> Result<()> {
    let json = cli.config.json;
    match cli.command {
        Command::Parse { text } => {
            let candidates = tools::extract_tracking(&text);
            emit(&candidates, json, render_candidates)
        }
        Command::Track {
            tracking_number,
            carrier,
        } => {
            let report = assistant(&cli.config)?
                .track_package(&tracking_number, carrier.as_deref())
                .await?;
            emit(&report, json, render_report)
        }
        Command::Packages { tracking_numbers } => {
            let batch = assistant(&cli.config)?.track_many(&tracking_numbers).await?;
            emit(&batch, json, render_batch)
        }
        Command::Predict {
            tracking_number,
            carrier,
        } => {
            let estimate = assistant(&cli.config)?
                .predict_arrival(&tracking_number, carrier.as_deref())
                .await?;
            emit(&estimate, json, render_estimate)
        }
        Command::Diagnose {
            tracking_number,
            carrier,
        } => {
            let diagnosis = assistant(&cli.config)?
                .diagnose_problem(&tracking_number, carrier.as_deref())
                .await?;
            emit(&diagnosis, json, render_diagnosis)
        }
        Command::Inquiry {
            tracking_number,
            carrier,
            recipient,
        } => {
            let draft = assistant(&cli.config)?
                .draft_inquiry(&tracking_number, carrier.as_deref(), &recipient)
                .await?;
            emit(&draft, json, render_draft)
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logger::init_cli_logger(cli.config.verbose);

    if cli.config.verbose {
        tracing::debug!("CLI config: {:?}", cli.config);
    }

    if let Err(e) = run(cli).await {
        tracing::error!("command failed: {}", e);
        eprintln!("❌ {}", e);
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }
}
