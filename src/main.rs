use clap::{Parser, Subcommand};
use notepilot::auth::{AuthAction, AuthGate, Credentials, FirebaseIdentity};
use notepilot::backend::create_backend;
use notepilot::config::Config;
use notepilot::models::SummaryFormat;
use notepilot::presentation::{copy_summary, save_summary, ConsoleView, SummaryView, SystemClipboard};
use notepilot::selector::FileSelector;
use notepilot::types::{AppError, Notice};
use notepilot::utils::{init_logger, LogTarget};
use notepilot::workflow::{SummaryWorkflow, WorkflowSlot};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "notepilot", version, about = "Turn lecture PDFs into study notes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload a PDF and print its summary
    Summarize {
        file: PathBuf,

        /// cheat-sheet (1) or detailed (2); defaults to NOTEPILOT_SUMMARY_FORMAT
        #[arg(long, short)]
        format: Option<SummaryFormat>,

        /// Also save the summary; a directory or file path, default StudyMaterial.txt
        #[arg(long, num_args = 0..=1, default_missing_value = "")]
        save: Option<PathBuf>,

        /// Copy the summary to the clipboard
        #[arg(long)]
        copy: bool,
    },
    /// Interactive terminal interface
    Tui,
    /// Create an account with the identity provider
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long, env = "NOTEPILOT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Log in with the identity provider
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "NOTEPILOT_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    let target = match cli.command {
        Command::Tui => LogTarget::File,
        _ => LogTarget::Stderr,
    };
    let _guard = init_logger(target, &config.output.log_dir)?;
    info!(backend = %config.backend.base_url, contract = %config.backend.contract, "Configuration loaded");

    match cli.command {
        Command::Summarize { file, format, save, copy } => {
            summarize(config, file, format, save, copy).await
        }
        Command::Tui => {
            notepilot::tui::run(config).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Signup { email, password } => {
            authenticate(&config, AuthAction::SignUp, Credentials::new(email, password)).await
        }
        Command::Login { email, password } => {
            authenticate(&config, AuthAction::LogIn, Credentials::new(email, password)).await
        }
    }
}

async fn summarize(
    config: Config,
    file: PathBuf,
    format: Option<SummaryFormat>,
    save: Option<PathBuf>,
    copy: bool,
) -> anyhow::Result<ExitCode> {
    let mut view = ConsoleView::new(std::io::stdout());

    let mut selector = FileSelector::new();
    if let Err(e) = selector.browse(&file) {
        view.notify(&Notice::from_error(&e));
        return Ok(ExitCode::FAILURE);
    }
    if let Some(status) = selector.status() {
        view.notify(status);
    }

    let backend = create_backend(&config.backend)?;
    let (tx, mut rx) = mpsc::channel(32);
    let workflow = SummaryWorkflow::from_config(backend, &config.backend)
        .with_format(format.unwrap_or(config.backend.format))
        .with_events(tx);

    let mut slot = WorkflowSlot::new();
    let ticket = slot.begin();

    let cancel = ticket.token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling workflow");
            cancel.cancel();
        }
    });

    let run = workflow.start(&mut selector, &ticket);
    tokio::pin!(run);

    // Render progress while the workflow runs
    let result = loop {
        tokio::select! {
            Some(update) = rx.recv() => view.apply_event(&update.event),
            result = &mut run => break result,
        }
    };
    while let Ok(update) = rx.try_recv() {
        view.apply_event(&update.event);
    }
    slot.finish(ticket.run_id);

    let artifact = match result {
        Ok(artifact) => artifact,
        Err(AppError::Cancelled) => {
            view.notify(&Notice::from_error(&AppError::Cancelled));
            return Ok(ExitCode::from(130));
        }
        Err(_) => return Ok(ExitCode::FAILURE),
    };

    if copy {
        let copied = SystemClipboard::new().and_then(|mut clipboard| copy_summary(&mut clipboard, &artifact));
        match copied {
            Ok(notice) => view.notify(&notice),
            Err(e) => view.notify(&Notice::from_error(&e)),
        }
    }

    if let Some(target) = save {
        let target = (!target.as_os_str().is_empty()).then_some(target);
        match save_summary(&artifact, target.as_deref(), &config.output.save_dir).await {
            Ok(path) => view.notify(&Notice::success(format!("Saved to {}", path.display()))),
            Err(e) => {
                view.notify(&Notice::from_error(&e));
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn authenticate(
    config: &Config,
    action: AuthAction,
    credentials: Credentials,
) -> anyhow::Result<ExitCode> {
    let provider = FirebaseIdentity::from_config(&config.identity)
        .ok_or_else(|| anyhow::anyhow!("FIREBASE_API_KEY is not set; sign-in is disabled"))?;
    let gate = AuthGate::new(Arc::new(provider));

    let outcome = gate.attempt(action, &credentials).await;
    let mut view = ConsoleView::new(std::io::stdout());
    view.notify(&outcome.notice);

    Ok(if outcome.succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
