//! Route table and navigation guard.
//!
//! The guard is a pure function of the target path and whether the session
//! is logged in. It never touches the session itself.

/// Where unauthenticated users are sent
pub const LOGIN_PATH: &str = "/login";

/// Where logged-in users are sent from the login/register pages
pub const HOME_PATH: &str = "/home";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Register,
    Activities,
    ActivityDetail(i64),
    MyActivities,
    Profile,
    Statistics,
    CreateActivity,
}

impl Route {
    pub fn name(&self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::Login => "Login",
            Route::Register => "Register",
            Route::Activities => "Activities",
            Route::ActivityDetail(_) => "ActivityDetail",
            Route::MyActivities => "MyActivities",
            Route::Profile => "Profile",
            Route::Statistics => "Statistics",
            Route::CreateActivity => "CreateActivity",
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => HOME_PATH.to_string(),
            Route::Login => LOGIN_PATH.to_string(),
            Route::Register => "/register".to_string(),
            Route::Activities => "/activities".to_string(),
            Route::ActivityDetail(id) => format!("/activities/{}", id),
            Route::MyActivities => "/my-activities".to_string(),
            Route::Profile => "/profile".to_string(),
            Route::Statistics => "/statistics".to_string(),
            Route::CreateActivity => "/create-activity".to_string(),
        }
    }

    pub fn requires_auth(&self) -> bool {
        matches!(
            self,
            Route::MyActivities | Route::Profile | Route::Statistics | Route::CreateActivity
        )
    }

    /// Resolve a path to a route. `/` is an alias for `/home`; query strings
    /// and trailing slashes are ignored.
    pub fn resolve(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');

        match trimmed {
            "" | "/home" => Some(Route::Home),
            "/login" => Some(Route::Login),
            "/register" => Some(Route::Register),
            "/activities" => Some(Route::Activities),
            "/my-activities" => Some(Route::MyActivities),
            "/profile" => Some(Route::Profile),
            "/statistics" => Some(Route::Statistics),
            "/create-activity" => Some(Route::CreateActivity),
            other => other
                .strip_prefix("/activities/")
                .and_then(|id| id.parse::<i64>().ok())
                .map(Route::ActivityDetail),
        }
    }
}

/// Outcome of the navigation guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Allow,
    Redirect(String),
}

/// Guard evaluated before each navigation.
///
/// Paths that match no route are allowed through; rendering a not-found
/// view is the front end's job.
pub fn before_each(path: &str, is_logged_in: bool) -> Navigation {
    let route = Route::resolve(path);

    match route {
        Some(route) if route.requires_auth() && !is_logged_in => {
            Navigation::Redirect(LOGIN_PATH.to_string())
        }
        Some(Route::Login | Route::Register) if is_logged_in => {
            Navigation::Redirect(HOME_PATH.to_string())
        }
        _ => Navigation::Allow,
    }
}
