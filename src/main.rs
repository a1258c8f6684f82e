mod ai;
mod config;
mod engine;
mod mail;
mod store;

use anyhow::{Context, Result};
use std::env;
use std::io::Read;
use std::path::Path;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::ai::{OpenRouterClient, prompts};
use crate::config::Config;
use crate::mail::{Draft, loader};
use crate::store::Store;

fn setup_logging() {
    use std::fs::OpenOptions;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("debug,mailsift=debug"));

    // Try to create a log file in the config directory
    let log_file = Config::config_dir()
        .ok()
        .map(|dir| dir.join("mailsift.log"))
        .and_then(|path| {
            OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&path)
                .ok()
        });

    if let Some(file) = log_file {
        // Log to file
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::sync::Mutex::new(file))
                    .with_ansi(false),
            )
            .init();
    } else {
        // Fallback to stderr if file logging fails
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_usage() {
    eprintln!(
        r#"mailsift - Prompt-driven email triage assistant

Usage: mailsift <command> [args]

Commands:
    setup                             Create config and seed built-in prompt templates
    load <path>                       Bulk-load an inbox JSON file
    emails                            List loaded emails
    prompt set <name> [file]          Save a prompt template (reads stdin without a file)
    prompts                           List prompt templates
    process <email_id> [prompt...]    Run prompt templates against an email
                                      (default: categorization_prompt action_item_prompt)
    results <email_id>                Show stored results for an email
    ask <email_id> <question> [name]  Ad-hoc query against an email (template picked
                                      from the question when no name is given)
    draft <email_id> [file]           Save a reply draft (reads stdin without a file)
    drafts                            List saved drafts
    help                              Show this help message

Configuration file: ~/.config/mailsift/config.toml
API key: set MAILSIFT_API_KEY or [ai] api_key in the config.
"#
    );
}

async fn run_setup() -> Result<()> {
    let config_path = Config::config_path()?;

    let config = if config_path.exists() {
        println!("Configuration already exists at {}", config_path.display());
        Config::load()?
    } else {
        let config = Config::default();
        config.save()?;
        println!("Wrote default configuration to {}", config_path.display());
        config
    };

    config.ensure_dirs()?;
    let store = Store::open(&config.db_path()?).await?;
    let seeded = engine::seed_builtin_prompts(&store).await?;
    println!("Seeded {seeded} built-in prompt template(s).");

    if config.ai.resolve_api_key().is_none() {
        println!(
            "\nNo API key configured. Set MAILSIFT_API_KEY or add it to {}:",
            config_path.display()
        );
        println!("  [ai]\n  api_key = \"sk-or-...\"");
    }

    Ok(())
}

async fn open_store(config: &Config) -> Result<Store> {
    config.ensure_dirs()?;
    Store::open(&config.db_path()?).await
}

fn build_model(config: &Config) -> Result<OpenRouterClient> {
    let api_key = config.ai.resolve_api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured.\n\
             Set the MAILSIFT_API_KEY environment variable or add [ai] api_key\n\
             to the config file, then try again."
        )
    })?;
    Ok(OpenRouterClient::new(&config.ai, api_key))
}

/// Read template/draft text from a file argument, or stdin when absent.
fn read_text_arg(file: Option<&String>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {path}")),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read from stdin")?;
            Ok(text)
        }
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run_command(config: Config, args: &[String]) -> Result<()> {
    match args.first().map(|s| s.as_str()) {
        Some("load") => {
            let path = args.get(1).context("Usage: mailsift load <path>")?;
            let emails = loader::read_inbox(Path::new(path))?;
            let store = open_store(&config).await?;
            store.insert_emails(&emails).await?;
            println!("Loaded {} email(s).", emails.len());
            Ok(())
        }

        Some("emails") => {
            let store = open_store(&config).await?;
            let emails = store.list_emails().await?;
            if emails.is_empty() {
                println!("No emails loaded. Run 'mailsift load <path>' first.");
                return Ok(());
            }
            for email in &emails {
                println!(
                    "{}  {}  {}  {}",
                    email.id, email.timestamp, email.from_addr, email.subject
                );
            }
            Ok(())
        }

        Some("prompt") => {
            match args.get(1).map(|s| s.as_str()) {
                Some("set") => {
                    let name = args.get(2).context("Usage: mailsift prompt set <name> [file]")?;
                    let content = read_text_arg(args.get(3))?;
                    let store = open_store(&config).await?;
                    store.upsert_prompt(name, &content).await?;
                    println!("Saved prompt template '{name}'.");
                    Ok(())
                }
                _ => {
                    anyhow::bail!("Usage: mailsift prompt set <name> [file]");
                }
            }
        }

        Some("prompts") => {
            let store = open_store(&config).await?;
            let templates = store.list_prompts().await?;
            if templates.is_empty() {
                println!("No prompt templates. Run 'mailsift setup' to seed the built-ins.");
                return Ok(());
            }
            for template in &templates {
                let preview: String = template.content.chars().take(60).collect();
                println!("{}  {}", template.name, preview.replace('\n', " "));
            }
            Ok(())
        }

        Some("process") => {
            let email_id = args
                .get(1)
                .context("Usage: mailsift process <email_id> [prompt...]")?;
            let prompt_names: Vec<String> = if args.len() > 2 {
                args[2..].to_vec()
            } else {
                // The demo's default run: categorize and extract action items
                vec![
                    "categorization_prompt".to_string(),
                    "action_item_prompt".to_string(),
                ]
            };

            let store = open_store(&config).await?;
            let model = build_model(&config)?;
            let results = engine::process_email(&store, &model, email_id, &prompt_names).await?;
            print_json(&results)
        }

        Some("results") => {
            let email_id = args.get(1).context("Usage: mailsift results <email_id>")?;
            let store = open_store(&config).await?;
            match store.get_results(email_id).await? {
                Some(results) => print_json(&results),
                None => {
                    println!("{{}}");
                    Ok(())
                }
            }
        }

        Some("ask") => {
            let email_id = args
                .get(1)
                .context("Usage: mailsift ask <email_id> <question> [template]")?;
            let question = args
                .get(2)
                .context("Usage: mailsift ask <email_id> <question> [template]")?;
            let template_name = args
                .get(3)
                .map(|s| s.as_str())
                .unwrap_or_else(|| prompts::template_for_query(question));

            let store = open_store(&config).await?;
            let model = build_model(&config)?;
            let outcome = engine::ask(&store, &model, email_id, template_name, question).await?;
            print_json(&outcome.into_value())
        }

        Some("draft") => {
            let email_id = args.get(1).context("Usage: mailsift draft <email_id> [file]")?;
            let reply = read_text_arg(args.get(2))?;

            let store = open_store(&config).await?;
            store
                .get_email(email_id)
                .await?
                .with_context(|| format!("email not found: {email_id}"))?;

            let draft = Draft::new(email_id, reply);
            store.put_draft(&draft).await?;
            println!("Saved draft '{}' (not sent).", draft.id);
            Ok(())
        }

        Some("drafts") => {
            let store = open_store(&config).await?;
            let drafts = store.list_drafts().await?;
            if drafts.is_empty() {
                println!("No drafts saved.");
                return Ok(());
            }
            for draft in &drafts {
                let preview: String = draft.reply.chars().take(60).collect();
                println!(
                    "{}  (email {})  {}",
                    draft.id,
                    draft.email_id,
                    preview.replace('\n', " ")
                );
            }
            Ok(())
        }

        _ => unreachable!("dispatch covers all commands"),
    }
}

const COMMANDS: &[&str] = &[
    "load", "emails", "prompt", "prompts", "process", "results", "ask", "draft", "drafts",
];

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        None | Some("help") | Some("--help") | Some("-h") => {
            print_usage();
            Ok(())
        }
        Some("setup") => run_setup().await,
        Some(cmd) if COMMANDS.contains(&cmd) => {
            setup_logging();
            let config = Config::load()?;
            run_command(config, &args[1..]).await
        }
        Some(cmd) => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            std::process::exit(1);
        }
    }
}
