use clap::Parser;
use color_eyre::Result;
use pawlog::cli::{self, Cli, Commands};
use pawlog::models::ShareToken;
use pawlog::tui::app::SharedTarget;
use pawlog::{ApiClient, Config, Profile, Session};

fn main() -> Result<()> {
    // Set up error reporting with color-eyre
    color_eyre::install()?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Determine profile: --dev flag enables dev mode, otherwise use prod
    let profile = if cli.dev { Profile::Dev } else { Profile::Prod };

    // Load configuration with the determined profile
    let config = Config::load_with_profile(profile)?;

    // Missing deployment settings (backend address, OAuth client id) are
    // fatal before any interactive state loads
    config.validate_for_profile(profile)?;

    // Gateway to the backend and the locally cached identity
    let client = ApiClient::new(config.api_base_url.clone())?;
    let mut session = Session::restore_default(profile);

    // Dispatch to appropriate command handler
    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            let app = pawlog::tui::App::new(config, profile, client, session);
            pawlog::tui::run_event_loop(app)?;
        }
        Commands::SignIn { access_token } => {
            cli::handle_sign_in(&access_token, &client, &mut session)?;
        }
        Commands::SignOut => {
            cli::handle_sign_out(&mut session);
        }
        Commands::Pets => {
            cli::handle_pets(&client, &session)?;
        }
        Commands::ShareLog { token } => {
            let target = SharedTarget::Log(ShareToken::new(token));
            let app = pawlog::tui::App::new_shared(config, profile, client, target);
            pawlog::tui::run_event_loop(app)?;
        }
        Commands::ShareRoutine { token } => {
            let target = SharedTarget::Routine(ShareToken::new(token));
            let app = pawlog::tui::App::new_shared(config, profile, client, target);
            pawlog::tui::run_event_loop(app)?;
        }
        Commands::CareSheet { token } => {
            let target = SharedTarget::CareSheet(ShareToken::new(token));
            let app = pawlog::tui::App::new_shared(config, profile, client, target);
            pawlog::tui::run_event_loop(app)?;
        }
    }

    Ok(())
}
