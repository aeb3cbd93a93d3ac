use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use itinera::{
    auth::{self, CurrentSession},
    clock::Clock,
    config::ClientConfig,
    models::{
        activity::NewActivity,
        trip::{NewTrip, TripPurpose},
        user::{Credentials, NewAccount},
        RecordId,
    },
    state::AppState,
    views::{
        trips::{TripFilter, TripQuery, TripSummary},
        Notice, NoticeKind, Presentation, ViewState,
    },
};

#[derive(Parser)]
#[command(name = "itinera")]
#[command(about = "Plan trips, budgets and day-by-day activities", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Sign in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show who is signed in
    Whoami,
    /// Trips of the signed-in user
    Trips {
        #[command(subcommand)]
        action: TripAction,
    },
    /// Itinerary of one trip
    Activities {
        #[command(subcommand)]
        action: ActivityAction,
    },
    /// Budget entries of one trip
    Budget { trip: RecordId },
}

#[derive(Subcommand)]
enum TripAction {
    List {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, value_enum, default_value_t = TripFilter::All)]
        filter: TripFilter,
    },
    Show {
        trip: RecordId,
    },
    Create {
        #[arg(long)]
        title: String,
        /// YYYY-MM-DD
        #[arg(long)]
        start: String,
        /// YYYY-MM-DD
        #[arg(long)]
        end: String,
        #[arg(long)]
        location: String,
        #[arg(long)]
        budget: Option<f64>,
        #[arg(long, value_enum)]
        purpose: Option<TripPurpose>,
    },
}

#[derive(Subcommand)]
enum ActivityAction {
    List {
        trip: RecordId,
    },
    Add {
        trip: RecordId,
        /// HH:MM
        #[arg(long)]
        time: String,
        #[arg(long)]
        name: String,
    },
    Remove {
        trip: RecordId,
        id: RecordId,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    let config = ClientConfig::from_env()?;
    let state = AppState::new(config)?;

    match cli.command {
        Commands::Register {
            name,
            email,
            password,
            phone,
        } => {
            let account = NewAccount {
                name,
                email,
                password,
                phone_number: phone,
            };
            auth::register_user(&state, &account)
                .await
                .context("Signup failed")?;
            println!("Account created successfully! You can now log in.");
        }
        Commands::Login { email, password } => {
            let session = auth::login(&state, &Credentials { email, password })
                .await
                .context("Login failed")?;
            println!("Welcome back, {}!", session.display_name);
        }
        Commands::Logout => {
            auth::logout(&state).await?;
            println!("Signed out.");
        }
        Commands::Whoami => match auth::restore(&state).await?.0 {
            Some(session) => println!("{} <{}>", session.display_name, session.email),
            None => println!("Not signed in."),
        },
        Commands::Trips { action } => {
            let session = auth::restore(&state).await?;
            run_trips(&state, session, action).await?;
        }
        Commands::Activities { action } => {
            let session = auth::restore(&state).await?;
            run_activities(&state, session, action).await?;
        }
        Commands::Budget { trip } => {
            let session = auth::restore(&state).await?;
            let view = state.budget_view(session, trip);
            let mounted = view.mount().await;
            render(&view.snapshot(), "No budget entries yet.", |entry| {
                serde_json::to_string(entry.fields()).unwrap_or_default()
            });
            mounted?;
        }
    }

    Ok(())
}

async fn run_trips(state: &AppState, session: CurrentSession, action: TripAction) -> Result<()> {
    match action {
        TripAction::List { search, filter } => {
            let view = state.trips_view(session);
            let mounted = view.mount().await;
            let snapshot = view.snapshot();
            let today = state.clock.today();
            let summary = TripSummary::of(&snapshot.items, today);
            println!(
                "My Trips ({}) - {} upcoming, {} past",
                summary.total, summary.upcoming, summary.past
            );
            let query = TripQuery { search, filter };
            let hits = query.apply(&snapshot.items, today);
            if hits.is_empty() && !snapshot.loading {
                println!("No trips found.");
            }
            for trip in hits {
                let budget = trip
                    .budget
                    .map(|b| format!("  Budget: ${b}"))
                    .unwrap_or_default();
                println!(
                    "[{}] {} - {} ({} to {}){}",
                    trip.trip_id, trip.title, trip.location, trip.start_date, trip.end_date, budget
                );
            }
            print_notice(snapshot.notice.as_ref());
            mounted?;
        }
        TripAction::Show { trip } => {
            let view = state.trip_detail_view(session);
            let loaded = view.load(&trip).await;
            let snapshot = view.snapshot();
            match (snapshot.trip, snapshot.error) {
                (Some(trip), _) => {
                    println!("{} ({})", trip.title, trip.trip_id);
                    println!("  {} - {} nights", trip.location, trip.nights());
                    println!("  {} to {}", trip.start_date, trip.end_date);
                    if let Some(budget) = trip.budget {
                        println!("  Budget: ${budget}");
                    }
                    if let Some(purpose) = trip.description {
                        println!("  Purpose: {purpose}");
                    }
                }
                (None, Some(error)) => println!("Oops! {error}"),
                (None, None) => println!("Trip not found."),
            }
            loaded?;
        }
        TripAction::Create {
            title,
            start,
            end,
            location,
            budget,
            purpose,
        } => {
            let draft = NewTrip {
                title,
                start_date: NewTrip::parse_date(&start)?,
                end_date: NewTrip::parse_date(&end)?,
                location,
                budget,
                description: purpose.map(|p| p.as_str().to_string()),
            };
            let view = state.trips_view(session);
            let result = view.create(draft).await;
            print_notice(view.snapshot().notice.as_ref());
            result?;
        }
    }
    Ok(())
}

async fn run_activities(
    state: &AppState,
    session: CurrentSession,
    action: ActivityAction,
) -> Result<()> {
    match action {
        ActivityAction::List { trip } => {
            let view = state.itinerary_view(session, trip);
            let mounted = view.mount().await;
            render(&view.snapshot(), "No activities planned yet.", |activity| {
                format!("[{}] {}  {}", activity.id, activity.clock_label(), activity.name)
            });
            mounted?;
        }
        ActivityAction::Add { trip, time, name } => {
            let view = state.itinerary_view(session, trip);
            let result = view.create(NewActivity::new(time, name)).await;
            print_notice(view.snapshot().notice.as_ref());
            result?;
        }
        ActivityAction::Remove { trip, id } => {
            let view = state.itinerary_view(session, trip);
            view.mount().await?;
            let result = view.remove(&id).await;
            print_notice(view.snapshot().notice.as_ref());
            result?;
        }
    }
    Ok(())
}

fn render<R>(state: &ViewState<R>, empty: &str, line: impl Fn(&R) -> String) {
    match state.presentation() {
        Presentation::Loading => println!("Loading..."),
        Presentation::Empty => println!("{empty}"),
        Presentation::List(items) => items.iter().for_each(|item| println!("{}", line(item))),
    }
    print_notice(state.notice.as_ref());
}

fn print_notice(notice: Option<&Notice>) {
    match notice {
        Some(Notice {
            kind: NoticeKind::Success,
            message,
        }) => println!("✓ {message}"),
        Some(Notice {
            kind: NoticeKind::Error,
            message,
        }) => eprintln!("✗ {message}"),
        None => {}
    }
}

fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn,itinera=info".into());

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
