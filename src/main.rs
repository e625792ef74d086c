use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use rtvi_console::config::{BASE_URL_ENV, validate_base_url};
use rtvi_console::{
    AppContext, Catalog, HttpClientFactory, SessionBootstrapper, Settings, View, compile_full,
    default_request_data,
};

/// RTVI Console - configure and drive a real-time voice AI session
#[derive(Parser)]
#[command(name = "rtvi-console", version, about)]
struct Cli {
    /// Session endpoint prefix, e.g. http://localhost:7860/api
    ///
    /// Defaults to the config file, then "/api". Connecting needs an absolute
    /// http(s) URL; the relative default only works behind a proxy.
    #[arg(long, env = BASE_URL_ENV)]
    base_url: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the startup service map and configuration
    Show,
    /// Print the compiled configuration for a character and language
    Compose {
        /// Character preset index
        #[arg(short, long, default_value = "0")]
        character: usize,
        /// Language index (0 keeps the character's voice and prompt)
        #[arg(short, long, default_value = "0")]
        language: usize,
    },
    /// Interactive session shell reading commands from stdin
    Run {
        /// Connect the session after bootstrap
        #[arg(long)]
        connect: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn,rtvi_console=info",
        1 => "info,rtvi_console=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let catalog = Catalog::builtin();

    match cli.command {
        Command::Show => {
            let data = default_request_data(catalog);
            println!("{}", serde_json::to_string_pretty(&data)?);
            Ok(())
        }
        Command::Compose {
            character,
            language,
        } => {
            anyhow::ensure!(
                character < catalog.characters().len(),
                "character index {character} out of range"
            );
            anyhow::ensure!(
                language < catalog.languages().len(),
                "language index {language} out of range"
            );
            let blocks = compile_full(catalog, character, language);
            println!("{}", serde_json::to_string_pretty(&blocks)?);
            Ok(())
        }
        Command::Run { connect } => {
            let base_url = cli
                .base_url
                .unwrap_or_else(|| Settings::load().base_url);
            run_shell(catalog, base_url, connect).await
        }
    }
}

async fn run_shell(catalog: &Catalog, base_url: String, connect: bool) -> anyhow::Result<()> {
    if let Err(e) = validate_base_url(&base_url) {
        tracing::warn!(error = %e, "session will not be able to connect");
    }

    let bootstrapper = SessionBootstrapper::new(HttpClientFactory, catalog, base_url);
    let mut app = AppContext::new(catalog, bootstrapper);

    print_view(&app.render());
    app.mount()?;
    print_view(&app.render());

    if connect {
        if let Err(e) = app.connect().await {
            tracing::warn!(error = %e, "session did not connect, continuing offline");
        }
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "quit" | "exit") {
            break;
        }

        if let Err(e) = handle_line(&mut app, line).await {
            eprintln!("error: {e}");
        }
    }

    Ok(())
}

async fn handle_line(
    app: &mut AppContext<'_, HttpClientFactory>,
    line: &str,
) -> anyhow::Result<()> {
    let (cmd, arg) = line.split_once(' ').unwrap_or((line, ""));
    let arg = arg.trim();

    match cmd {
        "character" => app.select_character(arg.parse()?).await?,
        "language" => app.select_language(arg.parse()?).await?,
        "provider" => app.select_llm_provider(arg).await?,
        "model" => app.select_llm_model(arg).await?,
        "vad" => app.set_vad_stop_secs(arg.parse()?).await?,
        "prompt" => app.edit_prompt(&arg.replace("\\n", "\n")).await?,
        "state" => {}
        "config" => {
            println!("{}", serde_json::to_string_pretty(app.client_params())?);
            return Ok(());
        }
        other => anyhow::bail!(
            "unknown command {other:?} (character, language, provider, model, vad, prompt, state, config, quit)"
        ),
    }

    print_view(&app.render());
    Ok(())
}

fn print_view(view: &View) {
    match view {
        View::Placeholder => println!("[loading session...]"),
        View::Interface(state) => {
            let catalog = Catalog::builtin();
            println!(
                "character: {} | language: {} | llm: {}/{} | vad stop: {}s",
                catalog.character(state.character_index).name,
                catalog.language(state.language_index).label,
                state.llm_provider,
                state.llm_model,
                state.vad_stop_secs,
            );
        }
    }
}
