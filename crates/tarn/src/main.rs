use anyhow::Result;
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::EnvFilter;

mod caps;
mod layout;
mod text;
mod util;

const ENV_LOG: &str = "TARN_LOG";

#[derive(Parser, Debug)]
#[command(name = "tarn")]
#[command(about = "tarn runtime utilities.", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Validate layout manifests emitted by the code generator.
    Layout(layout::LayoutArgs),
    /// Inspect build capability profiles.
    Caps(caps::CapsArgs),
    /// Code-point string utilities.
    Text(text::TextArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn main() -> std::process::ExitCode {
    init_tracing();
    match try_main() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            std::process::ExitCode::from(2)
        }
    }
}

fn try_main() -> Result<std::process::ExitCode> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        anyhow::bail!("missing subcommand (try --help)");
    };

    match command {
        Command::Layout(args) => layout::cmd_layout(args),
        Command::Caps(args) => caps::cmd_caps(args),
        Command::Text(args) => text::cmd_text(args),
    }
}
