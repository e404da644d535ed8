use clap::Parser;
use miette::Result;
use itam::cli::commands::{
    auth, collab, cred, equip, export, init, license, maint, report, user,
};
use itam::cli::{Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Reset SIGPIPE so piping into `head` or `grep -q` ends quietly.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
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

    let default_level = if global.verbose { "itam=debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_env("ITAM_LOG")
        .unwrap_or_else(|_| default_level.into());
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();

    match cli.command {
        Commands::Init(args) => init::run(args),
        Commands::Login(args) => auth::run_login(args, &global),
        Commands::Logout => auth::run_logout(&global),
        Commands::Whoami => auth::run_whoami(&global),
        Commands::Unlock(args) => auth::run_unlock(args, &global),
        Commands::Equip(cmd) => equip::run(cmd, &global),
        Commands::Collab(cmd) => collab::run(cmd, &global),
        Commands::License(cmd) => license::run(cmd, &global),
        Commands::Maint(cmd) => maint::run(cmd, &global),
        Commands::Cred(cmd) => cred::run(cmd, &global),
        Commands::User(cmd) => user::run(cmd, &global),
        Commands::Export(args) => export::run(args, &global),
        Commands::Report(cmd) => report::run(cmd, &global),
    }
}
