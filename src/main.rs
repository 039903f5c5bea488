//! CLI front end for the task reminder client.

use std::path::PathBuf;

use anyhow::Context;
use chrono::Local;
use clap::{
    Parser,
    Subcommand,
};
use taskbell::{
    core::utils::parse_notification_time,
    logging,
    notify::{
        LocalNotifier,
        SilentNotifier,
    },
    Alert,
    ApiClient,
    App,
    ClientSettings,
    Task,
    TaskForm,
    TaskId,
    UserAction,
};
use tracing::info;

/// Task reminders with live updates and local notifications.
#[derive(Parser)]
#[command(name = "taskbell", version, about)]
struct Cli {
    /// Path to a JSON settings file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Task server address, e.g. http://192.168.1.8:5000.
    #[arg(long)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Keep the task list in sync and fire reminders until Ctrl-C.
    Watch {
        /// Do not open the live update channel.
        #[arg(long)]
        no_live: bool,
    },

    /// Print all tasks, soonest first.
    List,

    /// Print the available task types.
    Types,

    /// Add a task.
    Add {
        #[arg(long)]
        title: String,

        #[arg(long = "type", default_value = "Work")]
        task_type: String,

        /// Reminder message shown in the notification.
        #[arg(long)]
        reminder: String,

        /// When to remind, ISO-8601 (offset optional, local time assumed).
        #[arg(long)]
        at: String,
    },

    /// Describe a task in plain words and let the server fill in the details.
    Enhance {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Delete a task by id.
    Delete { id: TaskId },

    /// Show the effective settings.
    Config {
        /// Write them to the settings file.
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = ClientSettings::load(cli.config.as_deref()).with_api_url(cli.api_url.clone());
    logging::init(&settings.log_filter);

    match cli.command.unwrap_or(Command::Watch { no_live: false }) {
        Command::Watch { no_live } => watch(&settings, settings.live_updates && !no_live).await,
        Command::List => {
            let app = run_once(&settings, None).await?;
            print_tasks(app.tasks());
            Ok(())
        }
        Command::Types => {
            let app = run_once(&settings, None).await?;
            for label in app.task_types().as_slice() {
                println!("{}", label);
            }
            Ok(())
        }
        Command::Add { title, task_type, reminder, at } => {
            let notification_time = parse_notification_time(&at)?;
            let form = TaskForm { title, task_type, reminder_text: reminder, notification_time };
            run_once(&settings, Some(UserAction::AddTask(form))).await?;
            Ok(())
        }
        Command::Enhance { text } => {
            run_once(&settings, Some(UserAction::EnhanceTask(text.join(" ")))).await?;
            Ok(())
        }
        Command::Delete { id } => {
            run_once(&settings, Some(UserAction::DeleteTask(id))).await?;
            Ok(())
        }
        Command::Config { save } => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
            if save {
                let path = settings.save(cli.config.as_deref())?;
                println!("Saved to {}", path.display());
            }
            Ok(())
        }
    }
}

/// Loads state, performs at most one action, waits for it and reports alerts.
async fn run_once(
    settings: &ClientSettings,
    action: Option<UserAction>,
) -> anyhow::Result<App<SilentNotifier>> {
    let api = ApiClient::new(&settings.api_url).context("invalid server address")?;
    // the process exits before any reminder could fire
    let mut app = App::new(api, SilentNotifier);

    app.start(false);
    app.settle().await;

    if let Some(action) = action {
        app.handle_action(action);
        app.settle().await;
    }

    let alerts = app.take_alerts();
    print_alerts(&alerts);
    if alerts.iter().any(Alert::is_error) {
        anyhow::bail!("request failed");
    }
    Ok(app)
}

async fn watch(settings: &ClientSettings, live_updates: bool) -> anyhow::Result<()> {
    let api = ApiClient::new(&settings.api_url).context("invalid server address")?;
    let (notifier, mut delivered) = LocalNotifier::new();
    let mut app = App::new(api, notifier);

    info!(api_url = %settings.api_url, live_updates, "Starting");
    app.start(live_updates);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut shown: Vec<TaskId> = Vec::new();

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            Some(fired) = delivered.recv() => {
                println!("[reminder] {}: {}", fired.title, fired.body);
            }
            event = app.next_event() => match event {
                Some(event) => app.handle_event(event),
                None => break,
            },
        }

        print_alerts(&app.take_alerts());

        let current: Vec<TaskId> = app.tasks().iter().map(|task| task.id.clone()).collect();
        if current != shown {
            print_tasks(app.tasks());
            shown = current;
        }
    }

    app.shutdown().await;
    info!("Stopped");
    Ok(())
}

fn print_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }
    for task in tasks {
        println!(
            "{:>5}  {}  [{}] {} - {}",
            task.id.to_string(),
            task.notification_time.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            task.task_type,
            task.title,
            task.reminder_text
        );
    }
}

fn print_alerts(alerts: &[Alert]) {
    for alert in alerts {
        if alert.is_error() {
            eprintln!("{}", alert);
        } else {
            println!("{}", alert);
        }
    }
}
