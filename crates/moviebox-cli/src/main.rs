use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::eyre;
use commands::{auth, movies, reviews};
use moviebox_client::{ApiError, AuthError, Moviebox, ViewError};
use moviebox_config::{Config, PathManager, SessionFile};
use moviebox_models::{CatalogFilter, ListMembership};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "moviebox")]
#[command(about = "Moviebox - browse, rate, and review movies")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// API base URL (overrides config and MOVIEBOX_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and log in
    Register {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        username: Option<String>,
    },
    /// Log in with email and password
    Login {
        #[arg(long)]
        email: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show who is logged in
    Whoami,
    /// List movies
    #[command(long_about = "List the catalog. Logged-in users also see their ratings and lists, and can show only their watchlist or favorites.")]
    Movies {
        /// Which list to show: all, watchlist, or favorite
        #[arg(long, default_value = "all")]
        list: CatalogFilter,
    },
    /// Show one movie with its reviews and summary
    Show { title: String },
    /// Rate a movie from 1 to 10
    Rate {
        title: String,
        /// Values outside 1..=10 are clamped
        #[arg(allow_negative_numbers = true)]
        rating: i32,
    },
    /// Put a movie on your watchlist or favorites, or take it off
    List {
        title: String,
        /// watchlist, favorite, or none
        membership: ListMembership,
    },
    /// Manage your own review of a movie
    Review {
        #[command(subcommand)]
        cmd: ReviewCommands,
    },
    /// List all reviews of a movie
    Reviews { title: String },
    /// Like a review, or unlike it if already liked
    Like { title: String, review_id: String },
    /// Show the generated summary of a movie's reviews
    Summary { title: String },
}

#[derive(Subcommand)]
enum ReviewCommands {
    /// Show your review
    Get { title: String },
    /// Write or replace your review
    Save {
        title: String,
        /// Review text (prompted for if omitted)
        #[arg(long)]
        text: Option<String>,
    },
    /// Delete your review
    Delete {
        title: String,
        /// Skip the confirmation prompt
        #[arg(short, long, action = ArgAction::SetTrue)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let paths = PathManager::default();
    let mut config = Config::load(&paths.config_file()).map_err(|e| eyre!("Failed to load config: {}", e))?;
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
        config.validate().map_err(|e| eyre!("{}", e))?;
    }
    paths
        .ensure_directories()
        .map_err(|e| eyre!("Failed to create {}: {}", paths.config_dir().display(), e))?;

    let log_file = config.logging.file.then(|| paths.log_file());
    logging::init_logging(cli.verbose, cli.quiet, &config.logging, log_file.as_deref())
        .map_err(|e| eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);
    let client = Moviebox::from_config(&config, SessionFile::new(paths.session_file()))?;
    tracing::debug!("Using API at {}", client.base_url());

    let listener = spawn_auth_error_listener(client.session().auth_errors(), cli.output, cli.quiet);
    let result = run(cli.command, &client, &output).await;

    // Dropping the last client closes the channel and lets the listener drain.
    drop(client);
    if let Err(e) = listener.await {
        tracing::warn!("Auth error listener failed: {}", e);
    }

    match result {
        Err(e) if is_session_expiry(&e) => std::process::exit(1),
        other => other,
    }
}

async fn run(command: Commands, client: &Moviebox, output: &output::Output) -> color_eyre::Result<()> {
    match command {
        Commands::Register { email, username } => auth::run_register(client, email, username, output).await,
        Commands::Login { email } => auth::run_login(client, email, output).await,
        Commands::Logout => auth::run_logout(client, output),
        Commands::Whoami => auth::run_whoami(client, output),
        Commands::Movies { list } => movies::run_movies(client, list, output).await,
        Commands::Show { title } => movies::run_show(client, &title, output).await,
        Commands::Rate { title, rating } => movies::run_rate(client, &title, rating, output).await,
        Commands::List { title, membership } => movies::run_list(client, &title, membership, output).await,
        Commands::Review { cmd } => match cmd {
            ReviewCommands::Get { title } => reviews::run_review_get(client, &title, output).await,
            ReviewCommands::Save { title, text } => reviews::run_review_save(client, &title, text, output).await,
            ReviewCommands::Delete { title, yes } => reviews::run_review_delete(client, &title, yes, output).await,
        },
        Commands::Reviews { title } => reviews::run_reviews(client, &title, output).await,
        Commands::Like { title, review_id } => reviews::run_like(client, &title, &review_id, output).await,
        Commands::Summary { title } => reviews::run_summary(client, &title, output).await,
    }
}

/// Tell the user, once per rejected credential, that they need to log in again.
fn spawn_auth_error_listener(
    mut errors: broadcast::Receiver<AuthError>,
    format: output::OutputFormat,
    quiet: bool,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let notice = output::Output::new(format, quiet);
        loop {
            match errors.recv().await {
                Ok(AuthError) => notice.error("Session expired, please log in again"),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    })
}

/// The listener has already reported these.
fn is_session_expiry(report: &color_eyre::Report) -> bool {
    let expired = |e: &ApiError| matches!(e, ApiError::AuthenticationExpired);
    report.downcast_ref::<ApiError>().is_some_and(expired)
        || matches!(report.downcast_ref::<ViewError>(), Some(ViewError::Api(e)) if expired(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_list_and_negative_rating() {
        let cli = Cli::parse_from(["moviebox", "list", "Inception", "favorite"]);
        assert!(matches!(
            cli.command,
            Commands::List { membership: ListMembership::Favorite, .. }
        ));

        let cli = Cli::parse_from(["moviebox", "rate", "Inception", "-3"]);
        assert!(matches!(cli.command, Commands::Rate { rating: -3, .. }));

        let cli = Cli::parse_from(["moviebox", "movies", "--list", "watchlist", "--output", "json"]);
        assert!(matches!(cli.command, Commands::Movies { list: CatalogFilter::Watchlist }));
        assert_eq!(cli.output, output::OutputFormat::Json);
    }
}
