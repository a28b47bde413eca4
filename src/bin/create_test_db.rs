use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;

use paper_trader::{PasswordHash, ValidatedPassword, create_user, initialize_db};

/// A utility for creating a test database for the Paper Trader server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The name of the demo user.
    #[arg(long, default_value = "demo")]
    username: String,

    /// The password of the demo user.
    #[arg(long, default_value = "demo")]
    password: String,
}

/// Create a database with a demo user for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating user {:?}...", args.username);

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked(&args.password),
        PasswordHash::DEFAULT_COST,
    )?;

    let user = create_user(&args.username, password_hash, &conn)?;

    println!("Success! Created user {} with {:.2} in cash.", user.id, user.cash);

    Ok(())
}
