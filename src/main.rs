use clap::Parser;
use vaultkeeper::cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init {
            ref username,
            ref question,
        } => vaultkeeper::cli::commands::init::execute(&cli, username.as_deref(), question.as_deref()),
        Commands::Add {
            ref name,
            ref username,
            ref password,
            ref website,
            ref notes,
        } => vaultkeeper::cli::commands::add::execute(
            &cli,
            name,
            username.as_deref(),
            password.as_deref(),
            website.as_deref(),
            notes.as_deref(),
        ),
        Commands::List => vaultkeeper::cli::commands::list::execute(&cli),
        Commands::Show {
            ref name,
            reveal,
            copy,
        } => vaultkeeper::cli::commands::show::execute(&cli, name, reveal, copy),
        Commands::Edit {
            ref name,
            ref rename,
            ref username,
            ref password,
            ref website,
            ref notes,
        } => vaultkeeper::cli::commands::edit::execute(
            &cli,
            name,
            rename.as_deref(),
            username.as_deref(),
            password.as_deref(),
            website.as_deref(),
            notes.as_deref(),
        ),
        Commands::Delete { ref name, force } => {
            vaultkeeper::cli::commands::delete::execute(&cli, name, force)
        }
        Commands::ChangePassword => vaultkeeper::cli::commands::change_password::execute(&cli),
        Commands::ChangeQuestion { ref question } => {
            vaultkeeper::cli::commands::change_question::execute(&cli, question.as_deref())
        }
        Commands::Recover => vaultkeeper::cli::commands::recover::execute(&cli),
        Commands::Question => vaultkeeper::cli::commands::question::execute(&cli),
        Commands::Reset { force } => vaultkeeper::cli::commands::reset::execute(&cli, force),
        #[cfg(feature = "audit-log")]
        Commands::Audit { last, ref since } => {
            vaultkeeper::cli::commands::audit_cmd::execute(&cli, last, since.as_deref())
        }
        Commands::Completions { ref shell } => {
            vaultkeeper::cli::commands::completions::execute(shell)
        }
    };

    if let Err(e) = result {
        vaultkeeper::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
