use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use schoolportal::cli::seeder::seed_database;
use schoolportal::cli::teachers::{create_teacher, delete_teacher, list_teachers};
use schoolportal::schoolportal_config::{AccountConfig, MediaConfig};
use schoolportal::schoolportal_core::{LocalFileStorage, hash_password};
use schoolportal::schoolportal_db::{PgPool, init_db_pool, run_migrations};
use schoolportal::schoolportal_models::{Email, Subject, TeacherId};

#[derive(Parser)]
#[command(name = "schoolportal-cli")]
#[command(about = "School Portal CLI - Administrative tools for the School Portal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a teacher
    CreateTeacher {
        /// Full name
        #[arg(short = 'n', long)]
        name: String,

        /// Subject code or name (Math, Sci, Eng, Hist)
        #[arg(short = 's', long)]
        subject: Subject,

        /// Email address (must be unique)
        #[arg(short = 'e', long)]
        email: Email,
    },
    /// List all teachers
    ListTeachers,
    /// Delete a teacher together with all of its students
    DeleteTeacher {
        /// Teacher ID
        id: TeacherId,
    },
    /// Seed the database with fake teachers and students
    Seed {
        /// Number of teachers to create
        #[arg(short = 't', long, default_value = "3")]
        teachers: usize,

        /// Number of students per teacher
        #[arg(short = 's', long, default_value = "10")]
        students: usize,
    },
}

fn media_storage() -> LocalFileStorage {
    let media_config = MediaConfig::from_env();
    LocalFileStorage::with_max_size(
        media_config.root,
        media_config.url,
        media_config.max_upload_bytes,
    )
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();
    let pool = init_db_pool().await;

    if let Err(e) = run_migrations(&pool).await {
        eprintln!("❌ Error applying migrations: {}", e);
        std::process::exit(1);
    }

    let result = match cli.command {
        Commands::CreateTeacher {
            name,
            subject,
            email,
        } => handle_create_teacher(&pool, &name, subject, email).await,
        Commands::ListTeachers => handle_list_teachers(&pool).await,
        Commands::DeleteTeacher { id } => handle_delete_teacher(&pool, id).await,
        Commands::Seed { teachers, students } => handle_seed(&pool, teachers, students).await,
    };

    if let Err(e) = result {
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn handle_create_teacher(
    pool: &PgPool,
    name: &str,
    subject: Subject,
    email: Email,
) -> anyhow::Result<()> {
    let teacher = create_teacher(pool, name, subject, email).await?;

    println!("✅ Teacher created successfully!");
    println!("   ID: {}", teacher.id);
    println!("   Name: {}", teacher.name);
    println!("   Subject: {}", teacher.subject);
    println!("   Email: {}", teacher.email);
    Ok(())
}

async fn handle_list_teachers(pool: &PgPool) -> anyhow::Result<()> {
    let teachers = list_teachers(pool).await?;

    if teachers.is_empty() {
        println!("No teachers yet.");
        return Ok(());
    }

    for teacher in teachers {
        println!(
            "{}  {:<30} {:<12} {:<35} joined {}",
            teacher.id, teacher.name, teacher.subject, teacher.email, teacher.joined_date
        );
    }
    Ok(())
}

async fn handle_delete_teacher(pool: &PgPool, id: TeacherId) -> anyhow::Result<()> {
    let (teacher, removed) = delete_teacher(pool, &media_storage(), id).await?;

    println!(
        "✅ Teacher {} ({}) deleted along with {} students",
        teacher.name, id, removed
    );
    Ok(())
}

async fn handle_seed(pool: &PgPool, teachers: usize, students: usize) -> anyhow::Result<()> {
    let password_hash =
        hash_password(&AccountConfig::from_env().default_password).map_err(|e| e.error)?;

    seed_database(pool, &media_storage(), &password_hash, teachers, students).await?;
    Ok(())
}
