//! Password hashing utility for static-gate
//!
//! Generates Argon2id PHC hashes for `[[auth.users]]` entries in the config
//! file, so extra users never need a plaintext password on disk.
//!
//! Usage:
//!   hash-password
//!   hash-password --username viewer "MySecurePassword123!"

use std::io::{self, BufRead, Write};

use clap::Parser;
use static_gate::security::password::hash_password;

#[derive(Parser)]
#[command(name = "hash-password")]
#[command(about = "Generate an Argon2id hash for a static-gate user", long_about = None)]
struct Cli {
    /// Password to hash. Read from stdin when omitted (keeps it out of the
    /// process list).
    password: Option<String>,

    /// Print a ready-to-paste `[[auth.users]]` entry for this username.
    #[arg(short, long)]
    username: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let password = match cli.password {
        Some(password) => password,
        None => {
            eprint!("Enter password to hash: ");
            io::stderr().flush()?;
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };

    if password.is_empty() {
        return Err("password cannot be empty".into());
    }
    if password.len() < 12 {
        eprintln!("Warning: password is shorter than 12 characters");
    }

    let hash = hash_password(&password)?;

    match cli.username {
        Some(username) => {
            println!("[[auth.users]]");
            println!("username = \"{}\"", username);
            println!("password_hash = \"{}\"", hash);
        }
        None => println!("{}", hash),
    }

    Ok(())
}
