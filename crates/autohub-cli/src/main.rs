use anyhow::Result;
use autohub_cli::OutputFormat;
use autohub_cli::commands::{self, run::RunArgs};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "autohub")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Drive a real browser through Google, Facebook and Shopee tasks",
    long_about = "Automation Hub runs one browser automation task at a time: a Google search, \
                  a Facebook login or post, a Shopee product scrape, or a custom script. \
                  Results are kept in a local data store that can be filtered and exported to CSV."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "pretty")]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Search Google and collect result links
    Search {
        /// Search keyword
        #[arg(value_name = "KEYWORD")]
        keyword: String,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Scrape Shopee product listings
    Scrape {
        /// Product keyword
        #[arg(value_name = "KEYWORD")]
        keyword: String,

        /// Number of result pages to walk
        #[arg(long, default_value_t = 1)]
        pages: u32,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Log in to Facebook
    Login {
        /// Account email or phone number
        #[arg(long, env = "AUTOHUB_EMAIL")]
        email: String,

        /// Account password
        #[arg(long, env = "AUTOHUB_PASSWORD", hide_env_values = true)]
        password: String,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Publish a Facebook post
    Post {
        /// Text of the post
        #[arg(long)]
        content: String,

        /// Image to attach (repeatable)
        #[arg(long = "image", value_name = "FILE")]
        images: Vec<PathBuf>,

        /// Log in with this email first instead of relying on the saved profile
        #[arg(long, env = "AUTOHUB_EMAIL", requires = "password")]
        email: Option<String>,

        /// Password for --email
        #[arg(long, env = "AUTOHUB_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Manage and run custom automation scripts
    Script {
        #[command(subcommand)]
        command: ScriptCommands,
    },

    /// Inspect and export collected results
    Data {
        #[command(subcommand)]
        command: DataCommands,
    },

    /// View and change persisted settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },

    /// Show which browser binary would be used
    Browser {
        /// Check this browser path instead of the configured one
        #[arg(long, env = "AUTOHUB_BROWSER_PATH")]
        browser_path: Option<PathBuf>,
    },

    /// Manage persistent browser profiles
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    /// Generate shell completion scripts
    #[command(
        long_about = "Generate shell completion scripts for autohub.\n\n\
        SUPPORTED SHELLS:\n  bash, zsh, fish, powershell, elvish\n\n\
        INSTALLATION:\n  \
        bash: autohub completion --shell bash >> ~/.bashrc\n  \
        zsh:  autohub completion --shell zsh > ~/.zfunc/_autohub\n  \
        fish: autohub completion --shell fish > ~/.config/fish/completions/autohub.fish"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(long, value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ScriptCommands {
    /// Run a stored script by name, or a script file by path
    Run {
        #[arg(value_name = "NAME|FILE")]
        script: String,

        #[command(flatten)]
        run: RunArgs,
    },

    /// List stored scripts
    List,

    /// Print a stored script
    Show {
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Create a starter script that opens a page and collects its links
    New {
        #[arg(value_name = "NAME")]
        name: String,

        /// Page the script opens first
        #[arg(long, default_value = "https://example.com")]
        url: String,

        /// Overwrite an existing script
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum DataCommands {
    /// List collected results
    List {
        /// Case-insensitive keyword matched against every column
        #[arg(long)]
        filter: Option<String>,

        /// Show only the most recent N rows
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Export results to a CSV file
    Export {
        #[arg(value_name = "FILE")]
        output: PathBuf,

        /// Only export rows matching this keyword
        #[arg(long)]
        filter: Option<String>,
    },

    /// Append rows from a previously exported CSV file
    Import {
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Delete all collected results
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Show every setting and its value
    List,

    /// Print one setting
    Get {
        #[arg(value_name = "KEY")]
        key: String,
    },

    /// Change one setting
    Set {
        #[arg(value_name = "KEY")]
        key: String,

        #[arg(value_name = "VALUE")]
        value: String,
    },

    /// Reset one setting to its default
    Unset {
        #[arg(value_name = "KEY")]
        key: String,
    },

    /// Print the settings file location
    Path,
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// List all available profiles
    List,

    /// Delete a profile
    Delete {
        #[arg(value_name = "NAME")]
        name: String,

        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    init_logging(cli.verbose);
    tracing::debug!("Output format: {}", cli.format.as_str());

    let format = cli.format;
    let success = match cli.command {
        Commands::Search { keyword, run } => commands::run::search(keyword, &run, format)?,
        Commands::Scrape {
            keyword,
            pages,
            run,
        } => commands::run::scrape(keyword, pages, &run, format)?,
        Commands::Login {
            email,
            password,
            run,
        } => commands::run::login(email, password, &run, format)?,
        Commands::Post {
            content,
            images,
            email,
            password,
            run,
        } => commands::run::post(content, images, email.zip(password), &run, format)?,
        Commands::Script { command } => match command {
            ScriptCommands::Run { script, run } => commands::script::run(&script, &run, format)?,
            ScriptCommands::List => unit(commands::script::list(format))?,
            ScriptCommands::Show { name } => unit(commands::script::show(&name))?,
            ScriptCommands::New { name, url, force } => {
                unit(commands::script::new(&name, &url, force))?
            }
        },
        Commands::Data { command } => match command {
            DataCommands::List { filter, limit } => {
                unit(commands::data::list(filter.as_deref(), limit, format))?
            }
            DataCommands::Export { output, filter } => {
                unit(commands::data::export(&output, filter.as_deref()))?
            }
            DataCommands::Import { input } => unit(commands::data::import(&input))?,
            DataCommands::Clear { force } => unit(commands::data::clear(force))?,
        },
        Commands::Settings { command } => match command {
            SettingsCommands::List => unit(commands::settings::list(format))?,
            SettingsCommands::Get { key } => unit(commands::settings::get(&key))?,
            SettingsCommands::Set { key, value } => unit(commands::settings::set(&key, &value))?,
            SettingsCommands::Unset { key } => unit(commands::settings::unset(&key))?,
            SettingsCommands::Path => unit(commands::settings::path())?,
        },
        Commands::Browser { browser_path } => unit(commands::browser::execute(browser_path))?,
        Commands::Profile { command } => match command {
            ProfileCommands::List => unit(commands::profile::list(format))?,
            ProfileCommands::Delete { name, force } => {
                unit(commands::profile::delete(&name, force))?
            }
        },
        Commands::Completion { shell } => {
            unit(commands::completion::execute(shell, &mut Cli::command()))?
        }
    };

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Commands without a pass/fail outcome succeed unless they error
fn unit(result: Result<()>) -> Result<bool> {
    result.map(|()| true)
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new(
            "autohub=debug,autohub_cli=debug,autohub_core=debug,autohub_browser=debug,autohub_runner=debug",
        )
    } else {
        EnvFilter::new("autohub=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
