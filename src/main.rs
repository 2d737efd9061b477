use clap::Parser;
use inventory_lookup::utils::{logger, validation::Validate};
use inventory_lookup::{
    CliArgs, Console, FileSessionStore, InventoryClient, PasswordInput, StockService,
};
use std::io::IsTerminal;
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let config = match args.resolve_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    if args.json_logs || config.json_logs() {
        logger::init_json_logger(args.verbose, config.log_level());
    } else {
        logger::init_cli_logger(args.verbose, config.log_level());
    }

    tracing::info!("Starting inventory-lookup");
    tracing::debug!("Config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let client = InventoryClient::new(&config.service)?;
    let store = FileSessionStore::new(config.session.token_path());
    tracing::info!(
        "Service {} (session file {})",
        client.base_url(),
        store.path().display()
    );

    let service = StockService::new(client, store, config.stock.clone());
    // Scripted stdin keeps reading passwords as plain lines.
    let password_input = if std::io::stdin().is_terminal() {
        PasswordInput::Masked
    } else {
        PasswordInput::Line
    };
    let mut console = Console::new(&service).with_password_input(password_input);

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    console.run(stdin, &mut stdout).await?;

    tracing::info!("Bye");
    Ok(())
}
