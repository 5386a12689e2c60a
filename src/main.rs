use clap::Parser;
use slugnote::cli::{
    handle_add, handle_create_user, handle_list, handle_serve, resolve_config, Cli, Commands,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("slugnote=info,tower_http=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let bind = match &cli.command {
        Commands::Serve { bind } => *bind,
        _ => None,
    };
    let result = resolve_config(cli.config, cli.database, bind).and_then(|config| match cli.command {
        Commands::Serve { .. } => handle_serve(config),
        Commands::CreateUser { username, password } => {
            handle_create_user(&config, username, password)
        }
        Commands::Add {
            title,
            author,
            text,
            slug,
            json,
        } => handle_add(&config, title, author, text, slug, json),
        Commands::List { author, json } => handle_list(&config, author, json),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
