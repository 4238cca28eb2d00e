use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::api::{ApiClient, ApiResult};
use crate::models::{
    Activity, ActivityQuery, NewActivity, Pagination, Registration, RegistrationQuery,
};

/// Client-side copies of activity data.
///
/// The three activity caches are independent: creating an activity only
/// touches `activities`, and registering or unregistering touches none.
#[derive(Debug, Clone, Default)]
pub struct ActivityCache {
    pub activities: Vec<Activity>,
    pub current_activity: Option<Activity>,
    pub my_registrations: Vec<Registration>,
    pub my_activities: Vec<Activity>,
    pub loading: bool,
    pub pagination: Pagination,
}

/// Sets the loading flag for its lifetime.
struct LoadingGuard<'a> {
    cache: &'a RwLock<ActivityCache>,
}

impl<'a> LoadingGuard<'a> {
    fn start(cache: &'a RwLock<ActivityCache>) -> Self {
        cache.write().unwrap_or_else(|e| e.into_inner()).loading = true;
        Self { cache }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.cache.write().unwrap_or_else(|e| e.into_inner()).loading = false;
    }
}

/// Activity operations. Caches change only after a successful request;
/// a failed request leaves every cache at its last good value.
#[derive(Debug, Clone)]
pub struct ActivityStore {
    api: ApiClient,
    cache: Arc<RwLock<ActivityCache>>,
}

impl ActivityStore {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            cache: Arc::new(RwLock::new(ActivityCache::default())),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, ActivityCache> {
        self.cache.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, ActivityCache> {
        self.cache.write().unwrap_or_else(|e| e.into_inner())
    }

    // ===== List fetches (toggle loading) =====

    /// Replace the activity list and pagination with one page from the server.
    pub async fn fetch_activities(&self, query: &ActivityQuery) -> ApiResult<Vec<Activity>> {
        let _loading = LoadingGuard::start(&self.cache);
        let page = self.api.fetch_activities(query).await?;
        debug!(count = page.items.len(), total = page.pagination.total, "Fetched activities");

        let mut cache = self.write();
        cache.activities = page.items.clone();
        cache.pagination = page.pagination;
        Ok(page.items)
    }

    pub async fn fetch_activity(&self, activity_id: i64) -> ApiResult<Activity> {
        let _loading = LoadingGuard::start(&self.cache);
        let activity = self.api.fetch_activity(activity_id).await?;
        self.write().current_activity = Some(activity.clone());
        Ok(activity)
    }

    pub async fn fetch_my_registrations(
        &self,
        query: &RegistrationQuery,
    ) -> ApiResult<Vec<Registration>> {
        let _loading = LoadingGuard::start(&self.cache);
        let page = self.api.fetch_my_registrations(query).await?;
        self.write().my_registrations = page.items.clone();
        Ok(page.items)
    }

    pub async fn fetch_my_activities(&self, query: &ActivityQuery) -> ApiResult<Vec<Activity>> {
        let _loading = LoadingGuard::start(&self.cache);
        let page = self.api.fetch_my_activities(query).await?;
        self.write().my_activities = page.items.clone();
        Ok(page.items)
    }

    // ===== Mutations =====

    /// Create an activity and put it at the front of the cached list.
    /// Pagination totals are not adjusted.
    pub async fn create_activity(&self, activity: &NewActivity) -> ApiResult<Activity> {
        let created = self.api.create_activity(activity).await?;
        self.write().activities.insert(0, created.clone());
        Ok(created)
    }

    /// Sign up for an activity. Cached lists are not refreshed.
    pub async fn register_activity(&self, activity_id: i64, notes: &str) -> ApiResult<Registration> {
        self.api.register_activity(activity_id, notes).await
    }

    /// Cancel a signup. Cached lists are not refreshed.
    pub async fn unregister_activity(&self, activity_id: i64) -> ApiResult<String> {
        self.api.unregister_activity(activity_id).await
    }

    pub async fn check_in(&self, registration_id: i64) -> ApiResult<Registration> {
        self.api.check_in(registration_id).await
    }

    pub async fn complete_activity(
        &self,
        registration_id: i64,
        rating: Option<u8>,
        feedback: Option<&str>,
    ) -> ApiResult<Registration> {
        self.api
            .complete_activity(registration_id, rating, feedback)
            .await
    }

    /// Swap in a newer copy of a listed activity. Returns false when the
    /// activity is not in the cached list.
    pub fn update_cached_activity(&self, activity: Activity) -> bool {
        let mut cache = self.write();
        match cache.activities.iter_mut().find(|a| a.id == activity.id) {
            Some(slot) => {
                *slot = activity;
                true
            }
            None => false,
        }
    }

    // ===== Getters =====

    pub fn snapshot(&self) -> ActivityCache {
        self.read().clone()
    }

    pub fn activities(&self) -> Vec<Activity> {
        self.read().activities.clone()
    }

    pub fn current_activity(&self) -> Option<Activity> {
        self.read().current_activity.clone()
    }

    pub fn my_registrations(&self) -> Vec<Registration> {
        self.read().my_registrations.clone()
    }

    pub fn my_activities(&self) -> Vec<Activity> {
        self.read().my_activities.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.read().loading
    }

    pub fn pagination(&self) -> Pagination {
        self.read().pagination
    }
}
