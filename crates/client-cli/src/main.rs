use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use shared::{ClassInfo, CompletionOutcome};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;

use api::ApiClient;

#[derive(Parser)]
#[command(name = "lesson-tracker")]
#[command(about = "Track classes, lessons and lesson-quota notifications")]
#[command(version)]
struct Cli {
    /// Server URL (overrides config)
    #[arg(long)]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage classes
    Class {
        #[command(subcommand)]
        action: ClassAction,
    },
    /// Manage the students of a class
    Student {
        #[command(subcommand)]
        action: StudentAction,
    },
    /// Record and list lessons
    Lesson {
        #[command(subcommand)]
        action: LessonAction,
    },
    /// Show the notification history of a class
    Notifications {
        /// Class ID
        class_id: String,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ClassAction {
    /// Create a class
    Add {
        #[arg(long)]
        name: String,
        /// Number of lessons the class must complete
        #[arg(long)]
        total: i64,
        /// Contact phone number for completion notifications
        #[arg(long)]
        phone: String,
    },
    /// List classes with their progress
    List,
    /// Show a single class
    Show { id: String },
}

#[derive(Subcommand)]
enum StudentAction {
    Add {
        class_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: Option<String>,
    },
    List { class_id: String },
    Remove { id: String },
}

#[derive(Subcommand)]
enum LessonAction {
    /// Record a lesson for a class
    Add {
        class_id: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        notes: Option<String>,
        /// Lesson date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    List { class_id: String },
    Remove { id: String },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Set a configuration value
    Set {
        /// Configuration key (server)
        key: String,
        /// Configuration value
        value: String,
    },
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },
    /// Show all configuration
    Show,
    /// Get the config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lesson_tracker=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Commands::Config { action } = cli.command {
        return handle_config_command(action);
    }

    let config = config::Config::load().unwrap_or_default();
    let server = config.server_url(cli.server);
    tracing::debug!("Using server {}", server);
    let api = ApiClient::new(server);

    match cli.command {
        Commands::Class { action } => handle_class_command(&api, action).await,
        Commands::Student { action } => handle_student_command(&api, action).await,
        Commands::Lesson { action } => handle_lesson_command(&api, action).await,
        Commands::Notifications { class_id } => {
            let notifications = api.list_notifications(&class_id).await?;
            if notifications.is_empty() {
                println!("No notifications yet");
            }
            for n in notifications {
                println!("[{}] {} {}", n.status, n.sent_at, n.message);
            }
            Ok(())
        }
        Commands::Config { .. } => Ok(()),
    }
}

fn print_class(class: &ClassInfo) {
    let marker = if class.is_complete() { "✓" } else { " " };
    println!(
        "{} {}  {}  {}/{} lessons ({}%)  {}",
        marker,
        class.id,
        class.name,
        class.completed_lessons,
        class.total_lessons,
        class.progress_percent(),
        class.phone_number
    );
}

async fn handle_class_command(api: &ApiClient, action: ClassAction) -> Result<()> {
    match action {
        ClassAction::Add { name, total, phone } => {
            let class = api.create_class(&name, total, &phone).await?;
            println!("Created class {}", class.id);
            print_class(&class);
        }
        ClassAction::List => {
            let classes = api.list_classes().await?;
            if classes.is_empty() {
                println!("No classes yet");
            }
            for class in &classes {
                print_class(class);
            }
        }
        ClassAction::Show { id } => {
            print_class(&api.get_class(&id).await?);
        }
    }
    Ok(())
}

async fn handle_student_command(api: &ApiClient, action: StudentAction) -> Result<()> {
    match action {
        StudentAction::Add { class_id, name, phone } => {
            let student = api.create_student(&class_id, &name, phone).await?;
            println!("Added student {} ({})", student.name, student.id);
        }
        StudentAction::List { class_id } => {
            for student in api.list_students(&class_id).await? {
                println!(
                    "{}  {}  {}",
                    student.id,
                    student.name,
                    student.phone_number.unwrap_or_default()
                );
            }
        }
        StudentAction::Remove { id } => {
            api.delete_student(&id).await?;
            println!("Removed student {}", id);
        }
    }
    Ok(())
}

async fn handle_lesson_command(api: &ApiClient, action: LessonAction) -> Result<()> {
    match action {
        LessonAction::Add { class_id, subject, notes, date } => {
            let created = api.create_lesson(&class_id, &subject, notes, date).await?;
            println!(
                "Recorded lesson {} on {} ({} lessons so far)",
                created.lesson.id, created.lesson.lesson_date, created.completed_lessons
            );
            match created.outcome {
                CompletionOutcome::Incomplete { remaining } => {
                    println!("{} lessons left until the quota", remaining);
                }
                CompletionOutcome::AlreadyComplete => {
                    println!("Class had already completed its quota");
                }
                CompletionOutcome::Notified { notification } => {
                    println!("Quota reached, notification {}: {}", notification.status, notification.message);
                }
                CompletionOutcome::Failed { error } => {
                    eprintln!("Quota reached but the notification could not be recorded: {}", error);
                }
            }
        }
        LessonAction::List { class_id } => {
            for lesson in api.list_lessons(&class_id).await? {
                println!("{}  {}  {}", lesson.id, lesson.lesson_date, lesson.subject);
                if !lesson.notes.is_empty() {
                    println!("    {}", lesson.notes);
                }
            }
        }
        LessonAction::Remove { id } => {
            let deleted = api.delete_lesson(&id).await?;
            println!("Removed lesson {} ({} lessons left)", id, deleted.completed_lessons);
        }
    }
    Ok(())
}

fn handle_config_command(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Set { key, value } => {
            let mut config = config::Config::load().unwrap_or_default();
            match key.as_str() {
                "server" => config.remote.server = Some(value),
                _ => anyhow::bail!("Unknown config key: {}. Valid keys: server", key),
            }
            config.save()?;
            println!("Configuration saved");
        }
        ConfigAction::Get { key } => {
            let config = config::Config::load()?;
            let value = match key.as_str() {
                "server" => config.remote.server.unwrap_or_default(),
                _ => anyhow::bail!("Unknown config key: {}", key),
            };
            println!("{}", value);
        }
        ConfigAction::Show => {
            let config = config::Config::load()?;
            println!("server: {}", config.server_url(None));
        }
        ConfigAction::Path => {
            let path = config::Config::config_path()?;
            println!("{}", path.display());
        }
    }
    Ok(())
}
