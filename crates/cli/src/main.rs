use clap::{Parser, Subcommand};

use hms_core::repositories::users::NewUser;
use hms_core::repositories::{doctors, users};
use hms_core::{auth, db, validation, AppConfig};
use hms_types::Role;

#[derive(Parser)]
#[command(name = "hms")]
#[command(about = "Hospital management system CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the database schema
    Migrate,
    /// Create an admin account
    CreateAdmin {
        /// Display name
        name: String,
        /// Login email
        email: String,
        /// Plaintext password, hashed before storage
        password: String,
        /// Contact number
        contact_no: String,
    },
    /// List all doctors
    ListDoctors,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let cfg = AppConfig::from_env()?;

    match cli.command {
        Some(Commands::Migrate) => {
            let pool = db::connect(cfg.database_url()).await?;
            db::apply_schema(&pool).await?;
            println!("Schema applied to {}", cfg.database_url());
        }
        Some(Commands::CreateAdmin {
            name,
            email,
            password,
            contact_no,
        }) => {
            let name = match validation::non_blank(&name, "Display name is required") {
                Ok(trimmed) => trimmed,
                Err(err) => {
                    eprintln!("{err}");
                    return Ok(());
                }
            };
            if !validation::is_valid_email(&email) {
                eprintln!("Invalid email format");
                return Ok(());
            }
            if !validation::is_valid_phone(&contact_no) {
                eprintln!("Invalid phone number format");
                return Ok(());
            }
            if !validation::is_strong_password(&password) {
                eprintln!(
                    "Password must be at least 8 characters with uppercase, lowercase, and numbers"
                );
                return Ok(());
            }

            let pool = db::connect(cfg.database_url()).await?;
            db::apply_schema(&pool).await?;
            let password_hash = auth::hash_password(&password, cfg.bcrypt_cost())?;
            let new_user = NewUser {
                name: &name,
                email: &email,
                password_hash: &password_hash,
                role: Role::Admin,
                contact_no: &contact_no,
            };
            match users::create(&pool, &new_user).await {
                Ok(user_id) => println!("Created admin {} (user {})", email, user_id),
                Err(e) => eprintln!("Error creating admin: {}", e),
            }
        }
        Some(Commands::ListDoctors) => {
            let pool = db::connect(cfg.database_url()).await?;
            match doctors::list(&pool).await {
                Ok(doctors) => {
                    if doctors.is_empty() {
                        println!("No doctors found.");
                    } else {
                        for doctor in doctors {
                            println!(
                                "ID: {}, Name: {}, Specialization: {}, Experience: {} yrs",
                                doctor.doctor_id,
                                doctor.name,
                                doctor.specialization,
                                doctor.experience_yrs
                            );
                        }
                    }
                }
                Err(e) => eprintln!("Error listing doctors: {}", e),
            }
        }
        None => {
            println!("Use 'hms --help' for commands");
        }
    }

    Ok(())
}
