use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::api::{self, ApiClient, ApiError};
use crate::session::{Session, SessionError};

#[derive(Parser)]
#[command(name = "pawlog")]
#[command(about = "PawLog - pet care routines, logs and care-sheet sharing from the terminal")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Use development mode (separate config/identity, local backend default)
    #[arg(long)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch interactive TUI (default if no subcommand)
    Tui,
    /// Sign in with a Google OAuth access token
    SignIn {
        /// OAuth access token obtained from Google (e.g. via the OAuth playground)
        #[arg(long)]
        access_token: String,
    },
    /// Clear the locally cached identity
    SignOut,
    /// List your pets
    Pets,
    /// View a shared log by its token
    ShareLog {
        /// Share token from a pawlog link
        token: String,
    },
    /// View (and complete) a shared routine by its token
    ShareRoutine {
        /// Share token from a pawlog link
        token: String,
    },
    /// View a shared care sheet by its token
    CareSheet {
        /// Share token from a pawlog link
        token: String,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("API error: {0}")]
    ApiError(#[from] ApiError),
    #[error("Sign-in failed: {0}")]
    SessionError(#[from] SessionError),
    #[error("Not signed in. Run `pawlog sign-in --access-token <token>` first.")]
    NotSignedIn,
}

/// Handle the sign-in command
pub fn handle_sign_in(
    access_token: &str,
    client: &ApiClient,
    session: &mut Session,
) -> Result<(), CliError> {
    let identity = session.sign_in_with_access_token(client, access_token)?;
    println!("Signed in as {} <{}>", identity.name, identity.email);
    Ok(())
}

/// Handle the sign-out command
pub fn handle_sign_out(session: &mut Session) {
    session.sign_out();
    println!("Signed out. The cached identity was removed.");
}

/// Handle the pets command
pub fn handle_pets(client: &ApiClient, session: &Session) -> Result<(), CliError> {
    let user_id = session.user_id().ok_or(CliError::NotSignedIn)?;
    let pets = api::pets::get_pets(client, user_id)?;

    if pets.is_empty() {
        println!("No pets yet. Add one from the TUI dashboard.");
        return Ok(());
    }
    for pet in pets {
        println!("{}  {} ({})", pet.id, pet.name, pet.breed_or_species());
    }
    Ok(())
}
