use clap::Parser;
use miette::Result;
use partcat::cli::{Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    // Install miette's fancy error handler for diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    // PARTCAT_LOG follows EnvFilter syntax; --verbose wins over it
    let filter = if global.verbose {
        tracing_subscriber::EnvFilter::new("partcat=debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_env("PARTCAT_LOG")
            .unwrap_or_else(|_| "warn".into())
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();

    match cli.command {
        Commands::List(args) => partcat::cli::commands::list::run(args, &global),
        Commands::Options(args) => partcat::cli::commands::options::run(args, &global),
        Commands::Show(args) => partcat::cli::commands::show::run(args, &global),
        Commands::Template => partcat::cli::commands::template::run(),
        Commands::Shell(args) => partcat::cli::commands::shell::run(args, &global),
        Commands::Completions(args) => partcat::cli::commands::completions::run(args),
    }
}
