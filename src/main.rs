use anyhow::Result;
use clap::{Parser, Subcommand};

use entity_audit::cli::{handle_log_command, handle_record_command, LogCommands, RecordArgs};
use entity_audit::config::{AuditPaths, Settings};

#[derive(Parser)]
#[command(
    name = "entity-audit",
    version,
    about = "Record and inspect entity change audits",
    long_about = "entity-audit builds audit entries from before/after JSON snapshots \
                  of an entity and keeps them in an append-only log."
)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an audit entry from entity snapshots
    Record(RecordArgs),

    /// Inspect the audit log
    #[command(subcommand)]
    Log(LogCommands),

    /// Show current configuration and paths
    Config {
        /// Write the current settings to the config file
        #[arg(long)]
        init: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    entity_audit::logging::init(cli.verbose);

    let paths = AuditPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    match cli.command {
        Some(Commands::Record(args)) => {
            handle_record_command(&paths, &settings, args)?;
        }
        Some(Commands::Log(cmd)) => {
            handle_log_command(&paths, &settings, cmd)?;
        }
        Some(Commands::Config { init }) => {
            if init {
                settings.save(&paths)?;
                println!("Settings written to {}", paths.settings_file().display());
                println!();
            }

            println!("entity-audit configuration");
            println!("==========================");
            println!("Base directory: {}", paths.base_dir().display());
            println!("Settings file:  {}", paths.settings_file().display());
            println!("Audit log:      {}", settings.audit_log_path(&paths).display());
            println!();
            println!("Settings:");
            println!("  Schema version:  {}", settings.schema_version);
            match settings.serializer.max_depth {
                Some(depth) => println!("  Max depth:       {}", depth),
                None => println!("  Max depth:       unbounded"),
            }
            println!("  Pretty output:   {}", settings.serializer.pretty);
            println!(
                "  Default user:    {}",
                settings.default_user_id.as_deref().unwrap_or("(none)")
            );
        }
        None => {
            println!("entity-audit - change auditing for tracked entities");
            println!();
            println!("Run 'entity-audit --help' for usage information.");
        }
    }

    Ok(())
}
