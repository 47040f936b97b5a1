//! readlist CLI - file links for later reading as GitHub issues

mod server;

use clap::{Parser, Subcommand};
use readlist::{Credentials, GitHubTracker, LinkSaver, RepoRef, SavedLink, DEFAULT_API_BASE};
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// readlist - save a link's metadata as a GitHub issue
#[derive(Parser, Debug)]
#[command(name = "readlist")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Custom User-Agent for page fetches
    #[arg(long, global = true, env = "READLIST_USER_AGENT")]
    user_agent: Option<String>,

    /// GitHub API base URL
    #[arg(long, global = true, env = "GITHUB_API_URL", default_value = DEFAULT_API_BASE)]
    api_url: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch a URL and file it as an issue
    Add {
        /// URL to save
        url: String,

        /// GitHub token used to create the issue
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: String,

        /// Repository owner; taken from --repository when omitted
        #[arg(long, env = "GITHUB_REPOSITORY_OWNER")]
        owner: Option<String>,

        /// Repository as "owner/repo" (a bare name is accepted with --owner)
        #[arg(long, env = "GITHUB_REPOSITORY")]
        repository: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the webhook server, authenticating as a GitHub App installation
    Serve {
        /// Port to listen on
        #[arg(long, env = "PORT", default_value_t = 8080)]
        port: u16,

        /// GitHub App ID
        #[arg(long, env = "APP_ID")]
        app_id: u64,

        /// GitHub App installation ID
        #[arg(long, env = "APP_INSTALLATION_ID")]
        installation_id: u64,

        /// GitHub App private key (PEM)
        #[arg(long, env = "APP_PRIVATE_KEY", hide_env_values = true)]
        private_key: String,

        /// Repository owner
        #[arg(long, env = "GITHUB_OWNER")]
        owner: String,

        /// Repository name
        #[arg(long, env = "GITHUB_REPO")]
        repo: String,
    },
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    let builder = match cli.user_agent {
        Some(ua) => LinkSaver::builder().user_agent(ua),
        None => LinkSaver::builder(),
    };

    match cli.command {
        Commands::Add {
            url,
            token,
            owner,
            repository,
            json,
        } => {
            let repo = resolve_repo(owner.as_deref(), &repository).unwrap_or_else(|e| fail(e));
            let tracker = GitHubTracker::with_api_base(Credentials::token(token), cli.api_url)
                .unwrap_or_else(|e| fail(e));
            debug!(api = tracker.api_base(), repo = %repo, "Filing issue");
            let saver = builder.build(Arc::new(tracker), repo);
            run_add(&saver, &url, json).await;
        }
        Commands::Serve {
            port,
            app_id,
            installation_id,
            private_key,
            owner,
            repo,
        } => {
            let credentials = Credentials::app(app_id, installation_id, private_key.as_bytes())
                .unwrap_or_else(|e| fail(e));
            let tracker = GitHubTracker::with_api_base(credentials, cli.api_url)
                .unwrap_or_else(|e| fail(e));
            info!(api = tracker.api_base(), app_id, installation_id, "Using GitHub App");
            let saver = builder.build(Arc::new(tracker), RepoRef::new(owner, repo));
            if let Err(e) = server::run(port, saver).await {
                fail(e);
            }
        }
    }
}

/// Target repository from `--owner` and `--repository`
///
/// With an owner, the `owner/` prefix is stripped from the repository;
/// without one, the repository must be a full "owner/repo" name.
fn resolve_repo(owner: Option<&str>, repository: &str) -> Result<RepoRef, String> {
    match owner {
        Some(owner) if !owner.is_empty() => Ok(RepoRef::from_env_pair(owner, repository)),
        _ => repository.parse(),
    }
}

/// Log to stderr so stdout carries only command output
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("readlist=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run_add(saver: &LinkSaver, url: &str, json: bool) {
    let saved = saver.save(url).await.unwrap_or_else(|e| fail(e));

    if json {
        let output = serde_json::to_string_pretty(&saved).unwrap_or_else(|e| fail(e));
        writeln_safe(&output);
    } else {
        writeln_safe(&format_saved_link(&saved));
    }
}

/// Plain output: title, type, site name, outline, then the issue URL
fn format_saved_link(saved: &SavedLink) -> String {
    let meta = &saved.metadata;
    [
        meta.title.as_str(),
        meta.kind.as_str(),
        meta.site_name.as_str(),
        meta.outline.as_str(),
        saved.issue_url.as_str(),
    ]
    .join("\n")
}

fn fail(err: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", err);
    std::process::exit(1);
}

/// Write to stdout, exit silently on broken pipe
fn writeln_safe(s: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", s) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        eprintln!("Error writing to stdout: {}", e);
        std::process::exit(1);
    }
}
