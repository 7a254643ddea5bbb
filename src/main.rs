use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use medvoice::{
    commands::{FinishedAnswer, FormCommand, VoiceCommand},
    reminder::today_summary,
    services::{Clock, ReminderRepository, SystemClock},
    store::{FileReminderRepository, SettingsStore},
    AssistantReply, FormAssistant, MedicationDraft,
};

#[derive(Parser)]
#[command(name = "medvoice", about = "Parse dictated medication reminders")]
struct Cli {
    /// Settings file (JSON). Defaults apply when it does not exist.
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Turn dictated text into a reminder draft, printed as JSON.
    Parse {
        text: Vec<String>,
        /// Resolve relative dates against this day instead of today.
        #[arg(long)]
        today: Option<NaiveDate>,
        /// Append the reminder to this JSON file when every field is present.
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Read out the doses due today from a reminders file.
    Today { reminders: PathBuf },
    /// Show how an utterance is read as a command and as a yes/no answer.
    Vocab { text: Vec<String> },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("medvoice=info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();
    let settings = match &cli.settings {
        Some(path) => SettingsStore::new(path.clone()).load()?,
        None => Default::default(),
    };

    match cli.command {
        Command::Parse { text, today, save } => {
            let today = today.unwrap_or_else(|| SystemClock.today());
            let assistant = FormAssistant::new(settings.required_fields);
            let mut draft = MedicationDraft::default();
            let outcome = assistant.fill_from_text(&mut draft, &text.join(" "), today);
            let reply = match assistant.reply(&outcome) {
                AssistantReply::Complete(prompt) => prompt,
                AssistantReply::Ask { prompt, .. } => prompt,
            };
            let report = serde_json::json!({
                "draft": draft,
                "success": outcome.success,
                "missing": outcome.missing,
                "reply": reply,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed rendering draft")?
            );

            if let Some(path) = save {
                if outcome.success {
                    FileReminderRepository::new(path.clone()).save(&draft)?;
                    tracing::info!(path = %path.display(), "reminder saved");
                } else {
                    tracing::warn!(missing = ?outcome.missing, "draft incomplete, not saved");
                }
            }
        }
        Command::Today { reminders } => {
            let stored = FileReminderRepository::new(reminders).reminders()?;
            println!("{}", today_summary(&stored, &SystemClock.now()));
        }
        Command::Vocab { text } => {
            let text = text.join(" ");
            println!("command: {:?}", VoiceCommand::parse(&text));
            println!("form command: {:?}", FormCommand::parse(&text));
            println!("finished answer: {:?}", FinishedAnswer::classify(&text));
        }
    }
    Ok(())
}
