//! Edition forms CLI
//!
//! Checks catalog records (JSON files) against the rules of the client's
//! book, login and register forms.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use edition_forms::config::FormsConfig;
use edition_forms::{FormData, FormKind, Locale};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "edition-forms", version, about = "Validate catalog records")]
struct Cli {
    /// Language of validation messages (en, fr); defaults to the config value
    #[arg(long, global = true)]
    locale: Option<Locale>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run every rule of a form against a JSON record
    Validate {
        #[arg(long, value_enum)]
        form: FormKind,
        /// JSON object of field values
        #[arg(long)]
        input: PathBuf,
        /// Print errors as a JSON object instead of lines
        #[arg(long)]
        json: bool,
    },
    /// List each field's rules in evaluation order
    Describe {
        #[arg(long, value_enum)]
        form: FormKind,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = FormsConfig::load()?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let locale = cli.locale.unwrap_or_else(|| config.locale());

    match cli.command {
        Command::Validate { form, input, json } => {
            if !validate(form, &input, json, locale)? {
                std::process::exit(1);
            }
        }
        Command::Describe { form } => describe(form, locale),
    }

    Ok(())
}

fn validate(kind: FormKind, input: &Path, json: bool, locale: Locale) -> Result<bool> {
    let content =
        fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;
    let data: FormData = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a flat JSON object of field values", input.display()))?;

    let form = kind.build(locale);
    form.set_form_data(data);
    let valid = form.validate_all();
    tracing::info!(?kind, valid, "Validated record");

    let errors = form.errors();
    if json {
        println!("{}", serde_json::to_string_pretty(&errors)?);
    } else if valid {
        println!("ok");
    } else {
        for field in form.rules().fields() {
            if let Some(message) = errors.get(field) {
                println!("{field}: {message}");
            }
        }
    }

    Ok(valid)
}

fn describe(kind: FormKind, locale: Locale) {
    let (_, rules) = kind.definition(locale);
    for (field, rules) in rules.iter() {
        let names: Vec<String> = rules.iter().map(ToString::to_string).collect();
        println!("{field}: {}", names.join(", "));
    }
}
