//! `driftly` command line front-end.

mod terminal;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use console::Term;
use tracing::{debug, info};

use driftly_client::{LoginOutcome, StudioClient};
use driftly_models::{mask_secret, JobId, VideoDuration, VideoStyle};
use driftly_studio::logging::init_tracing;
use driftly_studio::{
    AuthManager, CredentialStore, Dashboard, GenerationWorkflow, ImageSelection, JobOutcome,
    ProgressSink, PromptPreview, ScheduleDraft, ScheduleManager, SetupForm, StudioConfig,
    StudioError, VideoDraft,
};

use crate::terminal::{confirm, print_preview, TerminalProgress};

#[derive(Parser)]
#[command(name = "driftly")]
#[command(about = "Driftly - AI video generation from the terminal")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Service URL (overrides DRIFTLY_SERVICE_URL)
    #[arg(long, global = true)]
    url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Store API keys and publishing settings
    Setup {
        #[arg(long, env = "GROK_API_KEY", hide_env_values = true)]
        grok_key: Option<String>,

        #[arg(long, env = "FAL_API_KEY", hide_env_values = true)]
        fal_key: Option<String>,

        /// Google Sheets spreadsheet id used for scheduling
        #[arg(long)]
        spreadsheet_id: Option<String>,

        /// Upload finished videos to YouTube
        #[arg(long)]
        youtube: bool,

        /// Stop uploading finished videos to YouTube
        #[arg(long, conflicts_with = "youtube")]
        no_youtube: bool,

        /// Path to the YouTube OAuth client secrets JSON
        #[arg(long)]
        youtube_secrets: Option<PathBuf>,
    },

    /// Generate a script, review it and render the video
    Generate {
        topic: String,

        #[command(flatten)]
        options: VideoOptions,

        /// Submit and print the job id without waiting
        #[arg(long)]
        no_wait: bool,
    },

    /// Follow a submitted job until it finishes
    Status { job_id: String },

    /// Schedule a generation for later
    Schedule {
        topic: String,

        /// Local date, YYYY-MM-DD
        #[arg(long)]
        date: String,

        /// Local time, HH:MM
        #[arg(long)]
        time: String,

        #[command(flatten)]
        options: VideoOptions,
    },

    /// List scheduled generations
    Scheduled,

    /// Cancel a scheduled generation
    Cancel { id: String },

    /// Remove cancelled entries from the schedule
    ClearCancelled,

    /// Show recently generated videos
    Recent {
        /// Print HTML list items instead of text
        #[arg(long)]
        html: bool,
    },

    /// Show usage counters
    Stats,

    /// Suggest a topic
    Idea,

    /// Log in to a password protected service
    Login {
        /// Prompted for without echo when not given
        #[arg(long, env = "DRIFTLY_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    Logout,

    /// Show whether this session is logged in
    AuthStatus,
}

#[derive(clap::Args)]
struct VideoOptions {
    /// Length in seconds, a multiple of 8
    #[arg(short, long, default_value = "8")]
    duration: u32,

    /// cinematic, realistic, dramatic, vibrant or moody
    #[arg(short, long, default_value = "cinematic")]
    style: String,

    /// Reference images (png, jpg, jpeg, gif, webp)
    #[arg(short, long = "image")]
    images: Vec<PathBuf>,

    /// Replace the generated prompt with the contents of this file
    #[arg(long)]
    prompt_file: Option<PathBuf>,

    /// Accept the generated script without asking
    #[arg(short, long)]
    yes: bool,
}

impl VideoOptions {
    fn duration(&self) -> Result<VideoDuration> {
        Ok(VideoDuration::new(self.duration)?)
    }

    fn style(&self) -> Result<VideoStyle> {
        Ok(self.style.parse::<VideoStyle>()?)
    }

    async fn images(&self) -> Result<ImageSelection> {
        let mut images = ImageSelection::new();
        images.add_paths(self.images.as_slice()).await?;
        Ok(images)
    }

    /// The prompt to submit, or `None` to keep the previewed one.
    ///
    /// Fails when the user declines the preview.
    async fn review(&self, preview: &PromptPreview) -> Result<Option<String>> {
        print_preview(preview);

        if let Some(path) = &self.prompt_file {
            let prompt = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read prompt file {}", path.display()))?;
            return Ok(Some(prompt.trim().to_string()));
        }

        if self.yes || confirm("Use this script?")? {
            Ok(None)
        } else {
            bail!("Cancelled")
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // rustls needs a process-wide crypto provider; a second install is a no-op
    let _ = rustls::crypto::ring::default_provider().install_default();

    dotenvy::dotenv().ok();
    init_tracing("driftly=info");

    let cli = Cli::parse();

    let mut config = StudioConfig::from_env();
    if let Some(url) = cli.url {
        config.service_url = url;
    }
    debug!(?config, "Loaded config");

    let client = Arc::new(StudioClient::new(config.client_config())?);
    let mut store = CredentialStore::open(&config.credentials_path)?;

    let result = run(cli.command, &config, client, &mut store).await;
    if let Err(err) = &result {
        let unreachable = err
            .downcast_ref::<StudioError>()
            .is_some_and(StudioError::is_retryable);
        if unreachable {
            eprintln!(
                "The studio service at {} did not answer. Check that it is running and try again.",
                config.service_url
            );
        }
    }
    result
}

async fn run(
    command: Commands,
    config: &StudioConfig,
    client: Arc<StudioClient>,
    store: &mut CredentialStore,
) -> Result<()> {
    match command {
        Commands::Setup {
            grok_key,
            fal_key,
            spreadsheet_id,
            youtube,
            no_youtube,
            youtube_secrets,
        } => {
            let mut form = store.setup_form();
            if let Some(key) = grok_key {
                form.grok_api_key = key;
            }
            if let Some(key) = fal_key {
                form.fal_api_key = key;
            }
            if let Some(id) = spreadsheet_id {
                form.spreadsheet_id = id;
            }
            if let Some(path) = youtube_secrets {
                form.youtube_client_secrets = tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?;
            }
            if let Some(enabled) = youtube_override(youtube, no_youtube) {
                form.use_youtube = enabled;
            }

            save_setup(store, &form)?;
            println!("Settings saved to {}", config.credentials_path.display());
        }

        Commands::Generate {
            topic,
            options,
            no_wait,
        } => {
            let credentials = store.snapshot();
            let sink: Arc<dyn ProgressSink> = Arc::new(TerminalProgress::new());
            let mut workflow = GenerationWorkflow::new(client, sink, config.poll_config());

            let draft = VideoDraft {
                topic,
                duration: options.duration()?,
                style: options.style()?,
                images: options.images().await?.to_vec(),
            };

            let preview = workflow.request_script(draft, &credentials).await?;
            let prompt = options.review(preview).await?;

            let job_id = workflow.submit(prompt).await?;
            if no_wait {
                println!("Submitted job {}", job_id);
                return Ok(());
            }
            info!(job_id = %job_id, "Waiting for job");
            report_outcome(workflow.poll().await?)?;
        }

        Commands::Status { job_id } => {
            let sink: Arc<dyn ProgressSink> = Arc::new(TerminalProgress::new());
            let mut workflow = GenerationWorkflow::new(client, sink, config.poll_config());
            report_outcome(workflow.track(JobId::from_string(job_id)).await?)?;
        }

        Commands::Schedule {
            topic,
            date,
            time,
            options,
        } => {
            let credentials = store.snapshot();
            let mut schedules =
                ScheduleManager::new(client, Arc::new(TerminalProgress::new()));

            let draft = ScheduleDraft {
                topic,
                date,
                time,
                duration: options.duration()?,
                style: options.style()?,
                images: options.images().await?.to_vec(),
            };

            let preview = schedules.preview(draft, &credentials, Utc::now()).await?;
            let prompt = options.review(preview).await?;

            let confirmation = schedules.confirm(prompt).await?;
            println!("Video scheduled for {}", confirmation.display_time());
            if let Some(id) = confirmation.id {
                println!("Schedule id: {}", id);
            }
        }

        Commands::Scheduled => {
            let credentials = store.snapshot();
            if credentials.spreadsheet_id.is_none() {
                println!("Configure a spreadsheet with `driftly setup --spreadsheet-id` to use scheduling.");
                return Ok(());
            }

            let schedules = ScheduleManager::new(client, Arc::new(TerminalProgress::new()));
            let views = schedules.list(&credentials, Utc::now()).await?;
            if views.is_empty() {
                println!("No scheduled videos");
            }
            for view in views {
                let entry = &view.entry;
                let when = match view.scheduled_at {
                    Some(at) => at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M").to_string(),
                    None => entry.scheduled_time.clone(),
                };
                let marker = if view.is_today {
                    " (today)"
                } else if view.is_past {
                    " (past)"
                } else {
                    ""
                };
                println!(
                    "{:<8} {:<16}{:<8} {:<10} {:>3}s {:<10} {}",
                    entry.id, when, marker, entry.status.as_str(), entry.duration, entry.style, entry.topic
                );
            }
        }

        Commands::Cancel { id } => {
            let schedules = ScheduleManager::new(client, Arc::new(TerminalProgress::new()));
            schedules
                .cancel(&id)
                .await
                .context("Failed to cancel scheduled video")?;
            println!("Cancelled {}", id);
        }

        Commands::ClearCancelled => {
            let schedules = ScheduleManager::new(client, Arc::new(TerminalProgress::new()));
            let (_, message) = schedules.clear_cancelled().await?;
            println!("{}", message);
        }

        Commands::Recent { html } => {
            let videos = Dashboard::new(client).recent_videos(Utc::now()).await?;
            if videos.is_empty() {
                println!("No videos yet");
            }
            for video in videos {
                if html {
                    println!("{}", video.to_html());
                } else {
                    println!(
                        "{} | {} | {} | {}",
                        video.title,
                        video.topic,
                        video.age,
                        video.url.as_deref().unwrap_or("Local Only")
                    );
                }
            }
        }

        Commands::Stats => match Dashboard::new(client).stats().await {
            Some(stats) => {
                println!("Total videos: {}", stats.total);
                println!("Total views:  {}", stats.views);
                println!("Today:        {}", stats.today);
                if let Some(visitors) = stats.visitors {
                    println!("Visitors:     {}", visitors);
                }
            }
            None => println!("Stats unavailable"),
        },

        Commands::Idea => {
            let idea = Dashboard::new(client)
                .random_idea(&store.snapshot())
                .await?;
            println!("{}", idea);
        }

        Commands::Login { password } => {
            let password = match password {
                Some(password) => password,
                None => read_password()?,
            };
            match AuthManager::new(client).login(&password).await? {
                LoginOutcome::LoggedIn => println!("Logged in"),
                LoginOutcome::PasswordCreated { env_var } => {
                    println!("Password created. Add this line to your .env file:");
                    println!("{}", env_var);
                }
            }
        }

        Commands::Logout => {
            AuthManager::new(client).logout().await?;
            println!("Logged out");
        }

        Commands::AuthStatus => {
            let status = AuthManager::new(client).status().await?;
            println!("Password set:  {}", status.password_set);
            println!("Authenticated: {}", status.authenticated);
            if status.login_required() {
                println!("Run `driftly login` to continue.");
            }
        }
    }

    Ok(())
}

fn save_setup(store: &mut CredentialStore, form: &SetupForm) -> Result<()> {
    if store.has_api_keys() && store.has_unsaved_changes(form) {
        info!("Replacing stored API keys");
    }
    store.save_setup(form)?;
    println!("Grok API key: {}", mask_secret(&form.grok_api_key));
    println!("FAL API key:  {}", mask_secret(&form.fal_api_key));
    Ok(())
}

/// Explicit YouTube flag, `None` to keep the stored choice.
fn youtube_override(youtube: bool, no_youtube: bool) -> Option<bool> {
    match (youtube, no_youtube) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

fn read_password() -> Result<String> {
    let term = Term::stderr();
    term.write_str("Password: ")?;
    Ok(term.read_secure_line()?)
}

fn report_outcome(outcome: JobOutcome) -> Result<()> {
    match outcome {
        JobOutcome::Completed(job) => {
            println!("{}", job.display_title());
            println!("{}", job.destination_message());
            if let Some(url) = &job.video_url {
                println!("{}", url);
            }
            Ok(())
        }
        JobOutcome::Failed(job) => bail!("Video generation failed: {}", job.error_message()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_flags(args: &[&str]) -> (bool, bool) {
        let cli = Cli::try_parse_from(args.iter().copied()).unwrap();
        match cli.command {
            Commands::Setup {
                youtube,
                no_youtube,
                ..
            } => (youtube, no_youtube),
            _ => panic!("expected setup"),
        }
    }

    #[test]
    fn test_setup_keeps_stored_youtube_choice_without_flags() {
        let (youtube, no_youtube) = setup_flags(&["driftly", "setup", "--spreadsheet-id", "sheet-1"]);
        assert_eq!(youtube_override(youtube, no_youtube), None);
    }

    #[test]
    fn test_setup_youtube_flags() {
        let (youtube, no_youtube) = setup_flags(&["driftly", "setup", "--youtube"]);
        assert_eq!(youtube_override(youtube, no_youtube), Some(true));

        let (youtube, no_youtube) = setup_flags(&["driftly", "setup", "--no-youtube"]);
        assert_eq!(youtube_override(youtube, no_youtube), Some(false));

        assert!(Cli::try_parse_from(["driftly", "setup", "--youtube", "--no-youtube"]).is_err());
    }

    #[test]
    fn test_login_password_flag_skips_prompt() {
        let cli = Cli::try_parse_from(["driftly", "login", "--password", "hunter2"]).unwrap();
        match cli.command {
            Commands::Login { password } => assert_eq!(password.as_deref(), Some("hunter2")),
            _ => panic!("expected login"),
        }
    }
}
