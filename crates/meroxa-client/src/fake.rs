//! In-memory [`PlatformClient`] for tests.

use parking_lot::Mutex;

use crate::{Account, ApiError, ClientFuture, Environment, PlatformClient, Resource, User};

/// Serves canned data and records deletions.
#[derive(Debug, Default)]
pub struct FakeClient {
    user: Option<User>,
    accounts: Vec<Account>,
    resource_types: Vec<String>,
    resources: Mutex<Vec<Resource>>,
    environments: Mutex<Vec<Environment>>,
    deleted: Mutex<Vec<String>>,
}

impl FakeClient {
    /// An empty fake; every lookup misses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `get_user` with `user`.
    #[must_use]
    pub fn with_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }

    /// Add an account.
    #[must_use]
    pub fn with_account(mut self, account: Account) -> Self {
        self.accounts.push(account);
        self
    }

    /// Add a resource type.
    #[must_use]
    pub fn with_resource_type(mut self, kind: impl Into<String>) -> Self {
        self.resource_types.push(kind.into());
        self
    }

    /// Add a resource.
    #[must_use]
    pub fn with_resource(self, resource: Resource) -> Self {
        self.resources.lock().push(resource);
        self
    }

    /// Add an environment.
    #[must_use]
    pub fn with_environment(self, environment: Environment) -> Self {
        self.environments.lock().push(environment);
        self
    }

    /// Names passed to the delete calls, in call order.
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().clone()
    }
}

impl PlatformClient for FakeClient {
    fn get_user(&self) -> ClientFuture<'_, User> {
        let user = self.user.clone().ok_or(ApiError::Unauthenticated);
        Box::pin(async move { user })
    }

    fn list_accounts(&self) -> ClientFuture<'_, Vec<Account>> {
        let accounts = self.accounts.clone();
        Box::pin(async move { Ok(accounts) })
    }

    fn list_resources(&self) -> ClientFuture<'_, Vec<Resource>> {
        let resources = self.resources.lock().clone();
        Box::pin(async move { Ok(resources) })
    }

    fn list_resource_types(&self) -> ClientFuture<'_, Vec<String>> {
        let types = self.resource_types.clone();
        Box::pin(async move { Ok(types) })
    }

    fn get_resource_by_name<'a>(&'a self, name: &'a str) -> ClientFuture<'a, Resource> {
        let found = self
            .resources
            .lock()
            .iter()
            .find(|r| r.name == name)
            .cloned()
            .ok_or_else(|| ApiError::not_found(format!("could not find resource \"{name}\"")));
        Box::pin(async move { found })
    }

    fn delete_resource<'a>(&'a self, name_or_id: &'a str) -> ClientFuture<'a, ()> {
        let result = {
            let mut resources = self.resources.lock();
            let before = resources.len();
            resources.retain(|r| r.name != name_or_id && r.id.to_string() != name_or_id);
            if resources.len() == before {
                Err(ApiError::not_found(format!(
                    "could not find resource \"{name_or_id}\""
                )))
            } else {
                self.deleted.lock().push(name_or_id.to_string());
                Ok(())
            }
        };
        Box::pin(async move { result })
    }

    fn list_environments(&self) -> ClientFuture<'_, Vec<Environment>> {
        let environments = self.environments.lock().clone();
        Box::pin(async move { Ok(environments) })
    }

    fn get_environment<'a>(&'a self, name_or_uuid: &'a str) -> ClientFuture<'a, Environment> {
        let found = self
            .environments
            .lock()
            .iter()
            .find(|e| e.name == name_or_uuid || e.uuid == name_or_uuid)
            .cloned()
            .ok_or_else(|| {
                ApiError::not_found(format!("could not find environment \"{name_or_uuid}\""))
            });
        Box::pin(async move { found })
    }

    fn delete_environment<'a>(&'a self, name_or_uuid: &'a str) -> ClientFuture<'a, Environment> {
        let result = {
            let mut environments = self.environments.lock();
            match environments
                .iter()
                .position(|e| e.name == name_or_uuid || e.uuid == name_or_uuid)
            {
                Some(idx) => {
                    let mut env = environments.remove(idx);
                    env.status.state = "deprovisioning".into();
                    self.deleted.lock().push(name_or_uuid.to_string());
                    Ok(env)
                }
                None => Err(ApiError::not_found(format!(
                    "could not find environment \"{name_or_uuid}\""
                ))),
            }
        };
        Box::pin(async move { result })
    }
}
