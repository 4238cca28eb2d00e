//! Subcommand handlers for the API-backed commands.

use std::io::{self, Write};

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use tracing::warn;
use voluntrack_core::models::{
    Activity, ActivityQuery, ActivityStatus, Credentials, NewActivity, NewUser, ProfileUpdate,
    Registration, RegistrationQuery, RegistrationStatus, Role,
};
use voluntrack_core::router::LOGIN_PATH;
use voluntrack_core::{AppState, Config, Navigation, Notifier, Route};

use crate::utils::{format_datetime, format_hours, format_optional, truncate};

/// Prints gateway notifications to stderr as they happen.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn error(&self, message: &str) {
        eprintln!("Error: {}", message);
    }
}

/// Check the route guard before running a command that maps to `route`.
pub fn ensure_route(state: &AppState, route: Route) -> Result<()> {
    match state.navigate(&route.path()) {
        Navigation::Allow => Ok(()),
        Navigation::Redirect(to) if to == LOGIN_PATH => {
            bail!("{} requires login. Run `voluntrack login`.", route.name())
        }
        Navigation::Redirect(to) => {
            bail!("{} is not available here, continue at {}", route.name(), to)
        }
    }
}

/// Accepts `2026-05-01 09:30`, `2026-05-01T09:30` and either form with seconds.
pub fn parse_datetime(input: &str) -> Result<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%dT%H:%M:%S",
    ];
    let input = input.trim();
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .with_context(|| format!("Invalid date/time '{}', expected YYYY-MM-DD HH:MM", input))
}

fn prompt_line(label: &str, default: Option<&str>) -> Result<String> {
    match default {
        Some(d) => print!("{} [{}]: ", label, d),
        None => print!("{}: ", label),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();
    Ok(match default {
        Some(d) if input.is_empty() => d.to_string(),
        _ => input.to_string(),
    })
}

fn prompt_password() -> Result<String> {
    let password = rpassword::prompt_password("Password: ")?;
    Ok(password)
}

// ============================================================================
// Account
// ============================================================================

pub async fn login(state: &AppState, config: &mut Config, username: Option<String>) -> Result<()> {
    if let Navigation::Redirect(_) = state.navigate(&Route::Login.path()) {
        let name = state
            .auth
            .user()
            .map(|u| u.display_name().to_string())
            .unwrap_or_default();
        println!("Already logged in as {}", name);
        return Ok(());
    }

    let username = match username {
        Some(u) => u,
        None => prompt_line("Username", config.last_username.as_deref())?,
    };
    let password = prompt_password()?;
    if username.is_empty() || password.is_empty() {
        bail!("Username and password required");
    }

    println!("Authenticating...");
    let user = state
        .auth
        .login(&Credentials {
            username: username.clone(),
            password,
        })
        .await?;

    config.last_username = Some(username);
    if let Err(e) = config.save() {
        warn!(error = %e, "Failed to save config");
    }

    println!("Logged in as {} ({})", user.display_name(), user.role);
    Ok(())
}

pub struct SignupArgs {
    pub username: String,
    pub email: String,
    pub real_name: String,
    pub phone: Option<String>,
    pub organizer: bool,
}

pub async fn signup(state: &AppState, args: SignupArgs) -> Result<()> {
    ensure_route(state, Route::Register)?;

    let password = prompt_password()?;
    let confirm = rpassword::prompt_password("Confirm password: ")?;
    if password != confirm {
        bail!("Passwords do not match");
    }

    let user = state
        .auth
        .register(&NewUser {
            username: args.username,
            email: args.email,
            password,
            real_name: args.real_name,
            phone: args.phone,
            role: args.organizer.then_some(Role::Organizer),
        })
        .await?;

    println!("Account '{}' created. Run `voluntrack login` to sign in.", user.username);
    Ok(())
}

pub fn logout(state: &AppState) {
    let was_logged_in = state.auth.token().is_some();
    state.auth.logout();
    if was_logged_in {
        println!("Logged out");
    } else {
        println!("Not logged in");
    }
}

pub async fn profile(state: &AppState, update: ProfileUpdate) -> Result<()> {
    ensure_route(state, Route::Profile)?;

    let user = if update.is_empty() {
        state.auth.user().context("No profile loaded")?
    } else {
        let user = state.auth.update_profile(&update).await?;
        println!("Profile updated\n");
        user
    };

    println!("{}", user.display_name());
    println!("  Username:  {}", user.username);
    println!("  Email:     {}", format_optional(user.email.as_deref(), "-"));
    println!("  Phone:     {}", format_optional(user.phone.as_deref(), "-"));
    println!("  Role:      {}", user.role);
    println!("  Hours:     {}", format_hours(user.volunteer_hours));
    println!("  Joined:    {}", format_datetime(user.created_at));
    Ok(())
}

pub async fn statistics(state: &AppState) -> Result<()> {
    ensure_route(state, Route::Statistics)?;

    let stats = state.auth.fetch_statistics().await?;
    println!("Registrations:     {}", stats.total_registrations);
    println!("Checked in:        {}", stats.checked_in_activities);
    println!("Completed:         {}", stats.completed_activities);
    println!("Cancelled:         {}", stats.cancelled_activities);
    println!("Volunteer hours:   {}", format_hours(stats.volunteer_hours));
    println!("Activities created: {}", stats.created_activities);
    println!("Completion rate:   {:.0}%", stats.completion_rate());
    Ok(())
}

// ============================================================================
// Activities
// ============================================================================

pub fn activity_row(activity: &Activity) -> String {
    format!(
        "{:>5}  {:<32}  {:<20}  {:>7}  {:<10}  {}",
        activity.id,
        truncate(&activity.title, 32),
        truncate(&activity.location, 20),
        format!(
            "{}/{}",
            activity.current_participants, activity.max_participants
        ),
        activity.status.to_string(),
        format_datetime(activity.start_time),
    )
}

fn print_activities(activities: &[Activity]) {
    if activities.is_empty() {
        println!("No activities found");
        return;
    }
    println!(
        "{:>5}  {:<32}  {:<20}  {:>7}  {:<10}  {}",
        "ID", "TITLE", "LOCATION", "SPOTS", "STATUS", "STARTS"
    );
    for activity in activities {
        println!("{}", activity_row(activity));
    }
}

pub async fn list_activities(state: &AppState, query: ActivityQuery) -> Result<()> {
    ensure_route(state, Route::Activities)?;

    let activities = state.activities.fetch_activities(&query).await?;
    print_activities(&activities);

    let pagination = state.activities.pagination();
    println!(
        "\nPage {} of {} ({} activities)",
        pagination.current_page,
        pagination.pages.max(1),
        pagination.total
    );
    if pagination.has_prev() {
        println!("Previous page: --page {}", pagination.current_page - 1);
    }
    if pagination.has_next() {
        println!("Next page: --page {}", pagination.current_page + 1);
    }
    Ok(())
}

pub async fn show_activity(state: &AppState, activity_id: i64) -> Result<()> {
    ensure_route(state, Route::ActivityDetail(activity_id))?;

    let a = state.activities.fetch_activity(activity_id).await?;
    println!("{} (#{})", a.title, a.id);
    println!("  Status:       {}", a.status);
    println!("  Category:     {}", format_optional(a.category.as_deref(), "-"));
    println!("  Location:     {}", a.location);
    println!("  Starts:       {}", format_datetime(a.start_time));
    println!("  Ends:         {}", format_datetime(a.end_time));
    println!(
        "  Participants: {}/{} ({} spots left)",
        a.current_participants,
        a.max_participants,
        a.spots_left()
    );
    println!("  Hours:        {}", format_hours(a.volunteer_hours));
    println!(
        "  Contact:      {} {}",
        format_optional(a.contact_person.as_deref(), "-"),
        format_optional(a.contact_phone.as_deref(), "")
    );
    if let Some(req) = a.requirements.as_deref().filter(|s| !s.is_empty()) {
        println!("  Requirements: {}", req);
    }
    if let Some(desc) = a.description.as_deref().filter(|s| !s.is_empty()) {
        println!("\n{}", desc);
    }
    if !a.accepts_registrations() {
        println!("\nThis activity is not accepting registrations.");
    }
    Ok(())
}

pub struct CreateActivityArgs {
    pub title: String,
    pub description: String,
    pub location: String,
    pub start: String,
    pub end: String,
    pub max_participants: Option<u32>,
    pub category: Option<String>,
    pub hours: Option<f64>,
    pub requirements: Option<String>,
    pub contact_person: Option<String>,
    pub contact_phone: Option<String>,
    pub image_url: Option<String>,
}

impl CreateActivityArgs {
    pub fn into_new_activity(self) -> Result<NewActivity> {
        let start_time = parse_datetime(&self.start)?;
        let end_time = parse_datetime(&self.end)?;
        if end_time <= start_time {
            bail!("End time must be after start time");
        }
        Ok(NewActivity {
            title: self.title,
            description: self.description,
            location: self.location,
            start_time,
            end_time,
            max_participants: self.max_participants,
            category: self.category,
            volunteer_hours: self.hours,
            requirements: self.requirements,
            contact_person: self.contact_person,
            contact_phone: self.contact_phone,
            image_url: self.image_url,
        })
    }
}

pub async fn create_activity(state: &AppState, args: CreateActivityArgs) -> Result<()> {
    ensure_route(state, Route::CreateActivity)?;

    let new_activity = args.into_new_activity()?;
    let created = state.activities.create_activity(&new_activity).await?;
    println!("Created activity #{}: {}", created.id, created.title);
    Ok(())
}

pub async fn my_activities(state: &AppState, page: Option<u32>) -> Result<()> {
    ensure_route(state, Route::MyActivities)?;

    let query = ActivityQuery {
        page,
        ..Default::default()
    };
    let activities = state.activities.fetch_my_activities(&query).await?;
    print_activities(&activities);
    Ok(())
}

// ============================================================================
// Registrations
// ============================================================================

pub fn registration_row(registration: &Registration) -> String {
    let title = registration
        .activity
        .as_ref()
        .map(|a| a.title.as_str())
        .unwrap_or("");
    format!(
        "{:>5}  {:>8}  {:<32}  {:<12}  {}",
        registration.id,
        registration.activity_id,
        truncate(title, 32),
        registration.status.to_string(),
        format_datetime(registration.registration_time),
    )
}

pub async fn my_registrations(
    state: &AppState,
    status: Option<RegistrationStatus>,
    page: Option<u32>,
) -> Result<()> {
    ensure_route(state, Route::MyActivities)?;

    let query = RegistrationQuery {
        page,
        status,
        ..Default::default()
    };
    let registrations = state.activities.fetch_my_registrations(&query).await?;
    if registrations.is_empty() {
        println!("No registrations found");
        return Ok(());
    }
    println!(
        "{:>5}  {:>8}  {:<32}  {:<12}  {}",
        "ID", "ACTIVITY", "TITLE", "STATUS", "REGISTERED"
    );
    for registration in &registrations {
        println!("{}", registration_row(registration));
    }
    Ok(())
}

pub async fn register(state: &AppState, activity_id: i64, notes: Option<String>) -> Result<()> {
    ensure_route(state, Route::MyActivities)?;

    let registration = state
        .activities
        .register_activity(activity_id, notes.as_deref().unwrap_or(""))
        .await?;
    println!(
        "Registered for activity #{} (registration #{})",
        activity_id, registration.id
    );
    Ok(())
}

pub async fn unregister(state: &AppState, activity_id: i64) -> Result<()> {
    ensure_route(state, Route::MyActivities)?;

    let message = state.activities.unregister_activity(activity_id).await?;
    println!("{}", message);
    Ok(())
}

pub async fn check_in(state: &AppState, registration_id: i64) -> Result<()> {
    ensure_route(state, Route::MyActivities)?;

    let registration = state.activities.check_in(registration_id).await?;
    println!(
        "Checked in at {}",
        format_datetime(registration.check_in_time)
    );
    Ok(())
}

pub async fn complete(
    state: &AppState,
    registration_id: i64,
    rating: Option<u8>,
    feedback: Option<String>,
) -> Result<()> {
    ensure_route(state, Route::MyActivities)?;

    let registration = state
        .activities
        .complete_activity(registration_id, rating, feedback.as_deref())
        .await?;
    println!(
        "Registration #{} is now {}",
        registration.id, registration.status
    );
    Ok(())
}

/// Parse a status name as the server spells it.
pub fn parse_activity_status(s: &str) -> std::result::Result<ActivityStatus, String> {
    Ok(ActivityStatus::from(s.trim().to_lowercase()))
}

pub fn parse_registration_status(s: &str) -> std::result::Result<RegistrationStatus, String> {
    match RegistrationStatus::from(s.trim().to_lowercase().replace('-', "_")) {
        RegistrationStatus::Other(other) => Err(format!(
            "unknown status '{}' (expected registered, checked_in, completed or cancelled)",
            other
        )),
        status => Ok(status),
    }
}
