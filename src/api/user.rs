//
//  harbor-client
//  api/user.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Harbor User API
//!
//! Types and the [`UserClient`] subclient for local Harbor accounts.
//!
//! ## API Endpoints
//!
//! ```text
//! GET/POST       /users
//! GET            /users/search
//! GET/PUT/DELETE /users/{user_id}
//! PUT            /users/{user_id}/password
//! PUT            /users/{user_id}/sysadmin
//! ```
//!
//! ## Notes
//!
//! - Usernames are unique; the user ID is assigned by the server.
//! - Creating a user answers without a body, so [`UserClient::create_user`]
//!   looks the account up by name afterwards.
//! - Some Harbor releases answer `201` where `200` is documented; the
//!   translator treats that as success.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::common::{NameOrId, StatusKind};
use super::options::ListOptions;
use super::transport::{Operation, Response, Transport, TransportError};

/// A Harbor user as returned by the API (`UserResp`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct User {
    /// Server-assigned ID.
    #[serde(default)]
    pub user_id: i64,

    /// Unique login name.
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub realname: Option<String>,

    #[serde(default)]
    pub comment: Option<String>,

    /// Whether the user is a system administrator.
    #[serde(default)]
    pub sysadmin_flag: bool,

    /// Whether admin rights come from the auth backend (LDAP/OIDC group).
    #[serde(default)]
    pub admin_role_in_auth: bool,

    #[serde(default)]
    pub creation_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub update_time: Option<DateTime<Utc>>,
}

/// Request body for creating a user (`UserCreationReq`).
#[derive(Debug, Clone, Serialize)]
pub struct UserCreationRequest {
    pub username: String,
    pub email: String,
    pub realname: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Mutable profile fields (`UserProfile`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Password change request (`PasswordReq`).
///
/// `old_password` may be empty when a system administrator resets
/// another user's password.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
struct SysAdminFlag {
    sysadmin_flag: bool,
}

/// Entry returned by the user search endpoint (`UserSearchRespItem`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSearchResult {
    #[serde(default)]
    pub user_id: i64,
    #[serde(default)]
    pub username: String,
}

/// Errors returned by [`UserClient`].
#[derive(Error, Debug)]
pub enum UserError {
    /// No user with the given name or ID exists.
    #[error("user not found")]
    NotFound,

    /// A required argument was empty; nothing was sent.
    #[error("{0} not provided")]
    NotProvided(&'static str),

    /// A non-positive ID was given, or the server answered for another ID.
    #[error("invalid user id {0}")]
    InvalidId(i64),

    /// The given user's ID differs from the one registered under its name.
    #[error("user id does not match the server record for this username")]
    Mismatch,

    #[error("user already exists")]
    AlreadyExists,

    #[error("invalid user request")]
    BadRequest,

    #[error("unauthorized")]
    Unauthorized,

    #[error("no permission to manage users")]
    NoPermission,

    /// The server has no user with the addressed ID.
    #[error("user id does not exist")]
    IdNotExists,

    #[error("internal server error")]
    InternalError,

    /// A failure the user translator does not recognise.
    #[error(transparent)]
    Transport(TransportError),
}

/// Maps a transport failure onto [`UserError`].
///
/// A `201` is a success in disguise and yields `Ok(())`.
pub fn translate(err: TransportError) -> Result<(), UserError> {
    Err(match StatusKind::of(&err) {
        Some(StatusKind::Created) => return Ok(()),
        Some(StatusKind::BadRequest) => UserError::BadRequest,
        Some(StatusKind::Unauthorized) => UserError::Unauthorized,
        Some(StatusKind::Forbidden) => UserError::NoPermission,
        Some(StatusKind::NotFound) => UserError::IdNotExists,
        Some(StatusKind::Conflict) => UserError::AlreadyExists,
        Some(StatusKind::Internal) => UserError::InternalError,
        None => UserError::Transport(err),
    })
}

/// Subclient for `/users`.
#[derive(Clone)]
pub struct UserClient {
    transport: Arc<dyn Transport>,
    options: ListOptions,
}

impl UserClient {
    pub fn new(transport: Arc<dyn Transport>, options: ListOptions) -> Self {
        Self { transport, options }
    }

    /// Returns a copy of this subclient using different list options.
    #[must_use]
    pub fn with_options(&self, options: ListOptions) -> Self {
        Self::new(self.transport.clone(), options)
    }

    /// Submits an operation. `Ok(None)` means the server answered `201`
    /// where another success code was expected, so no payload is available.
    async fn send(&self, operation: Operation) -> Result<Option<Response>, UserError> {
        match self.transport.submit(operation).await {
            Ok(response) => Ok(Some(response)),
            Err(err) => translate(err).map(|()| None),
        }
    }

    /// Creates a user and returns the server's record of it.
    ///
    /// # Errors
    ///
    /// - [`UserError::NotProvided`] for an empty username or password
    /// - [`UserError::AlreadyExists`] when the username is taken
    /// - any error of [`get_user_by_name`](Self::get_user_by_name) from the
    ///   follow-up lookup; the account stays created in that case
    pub async fn create_user(&self, request: &UserCreationRequest) -> Result<User, UserError> {
        if request.username.is_empty() {
            return Err(UserError::NotProvided("username"));
        }
        if request.password.is_empty() {
            return Err(UserError::NotProvided("password"));
        }

        let operation = Operation::post("/users")
            .json(request)
            .map_err(UserError::Transport)?;
        self.send(operation).await?;

        tracing::debug!("Created user {}", request.username);
        self.get_user_by_name(&request.username).await
    }

    /// Looks a user up by exact username.
    ///
    /// The server filter is fuzzy, so the returned page is scanned for an
    /// exact match.
    pub async fn get_user_by_name(&self, username: &str) -> Result<User, UserError> {
        if username.is_empty() {
            return Err(UserError::NotProvided("username"));
        }

        let options = self.options.lookup().with_query(format!("username=~{username}"));
        let users = self.list_with(&options).await?;

        users
            .into_iter()
            .find(|user| user.username == username)
            .ok_or(UserError::NotFound)
    }

    /// Fetches a user by ID.
    pub async fn get_user_by_id(&self, id: i64) -> Result<User, UserError> {
        if id <= 0 {
            return Err(UserError::InvalidId(id));
        }

        let operation = Operation::get("/users/{user_id}").path_param("user_id", id);
        let response = match self.send(operation).await {
            Ok(Some(response)) => response,
            Ok(None) | Err(UserError::IdNotExists) => return Err(UserError::NotFound),
            Err(err) => return Err(err),
        };

        let user: User = response
            .json_opt()
            .map_err(UserError::Transport)?
            .ok_or(UserError::NotFound)?;

        if user.user_id != id {
            return Err(UserError::InvalidId(id));
        }

        Ok(user)
    }

    /// Lists one page of users using this subclient's options.
    pub async fn list_users(&self) -> Result<Vec<User>, UserError> {
        self.list_with(&self.options).await
    }

    async fn list_with(&self, options: &ListOptions) -> Result<Vec<User>, UserError> {
        let operation = options.apply(Operation::get("/users"));
        match self.send(operation).await? {
            Some(response) => Ok(response
                .json_opt()
                .map_err(UserError::Transport)?
                .unwrap_or_default()),
            None => Ok(Vec::new()),
        }
    }

    /// Searches users by (partial) username.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::NotFound`] when nothing matches.
    pub async fn search_users(&self, username: &str) -> Result<Vec<UserSearchResult>, UserError> {
        if username.is_empty() {
            return Err(UserError::NotProvided("username"));
        }

        let operation = Operation::get("/users/search")
            .query("username", username)
            .query("page", self.options.page)
            .query("page_size", self.options.page_size);

        let results: Vec<UserSearchResult> = match self.send(operation).await? {
            Some(response) => response
                .json_opt()
                .map_err(UserError::Transport)?
                .unwrap_or_default(),
            None => Vec::new(),
        };

        if results.is_empty() {
            return Err(UserError::NotFound);
        }

        Ok(results)
    }

    /// Checks that `user` names an existing account with the same ID.
    async fn verify(&self, user: &User) -> Result<(), UserError> {
        if user.username.is_empty() {
            return Err(UserError::NotProvided("user"));
        }

        let existing = self.get_user_by_name(&user.username).await?;
        if existing.user_id != user.user_id {
            return Err(UserError::Mismatch);
        }

        Ok(())
    }

    /// Updates email, real name and comment.
    pub async fn update_user_profile(
        &self,
        user: &User,
        profile: &UserProfile,
    ) -> Result<(), UserError> {
        self.verify(user).await?;

        let operation = Operation::put("/users/{user_id}")
            .path_param("user_id", user.user_id)
            .json(profile)
            .map_err(UserError::Transport)?;
        self.send(operation).await?;

        Ok(())
    }

    /// Changes a user's password.
    pub async fn update_user_password(
        &self,
        user: &User,
        password: &PasswordRequest,
    ) -> Result<(), UserError> {
        if password.new_password.is_empty() {
            return Err(UserError::NotProvided("new password"));
        }
        self.verify(user).await?;

        let operation = Operation::put("/users/{user_id}/password")
            .path_param("user_id", user.user_id)
            .json(password)
            .map_err(UserError::Transport)?;
        self.send(operation).await?;

        Ok(())
    }

    /// Grants or revokes system administrator rights.
    pub async fn set_user_sysadmin(&self, user: &User, sysadmin: bool) -> Result<(), UserError> {
        self.verify(user).await?;

        let operation = Operation::put("/users/{user_id}/sysadmin")
            .path_param("user_id", user.user_id)
            .json(&SysAdminFlag {
                sysadmin_flag: sysadmin,
            })
            .map_err(UserError::Transport)?;
        self.send(operation).await?;

        Ok(())
    }

    /// Deletes a user after confirming it exists under the same ID.
    pub async fn delete_user(&self, user: &User) -> Result<(), UserError> {
        self.verify(user).await?;

        let operation = Operation::delete("/users/{user_id}").path_param("user_id", user.user_id);
        self.send(operation).await?;

        tracing::debug!("Deleted user {}", user.username);
        Ok(())
    }

    /// Reports whether a user exists. Only "not found" becomes `false`.
    pub async fn user_exists(&self, user: impl Into<NameOrId>) -> Result<bool, UserError> {
        let result = match user.into() {
            NameOrId::Id(id) => self.get_user_by_id(id).await,
            NameOrId::Name(name) => self.get_user_by_name(&name).await,
        };

        match result {
            Ok(_) => Ok(true),
            Err(UserError::NotFound) => Ok(false),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{empty, json, status, FakeTransport};
    use crate::api::transport::Method;
    use serde_json::json as j;

    fn alice(id: i64) -> User {
        User {
            user_id: id,
            username: "alice".into(),
            ..User::default()
        }
    }

    fn creation(username: &str) -> UserCreationRequest {
        UserCreationRequest {
            username: username.into(),
            email: format!("{username}@example.com"),
            realname: username.into(),
            password: "Harbor12345".into(),
            comment: None,
        }
    }

    /// Serves `/users` listings containing alice (ID 5) and alicea (ID 6).
    fn directory() -> std::sync::Arc<FakeTransport> {
        FakeTransport::new(|op| match (op.method, op.path().as_str()) {
            (Method::Get, "/users") => json(
                200,
                j!([{"user_id": 6, "username": "alicea"}, {"user_id": 5, "username": "alice"}]),
            ),
            (Method::Get, "/users/5") => json(200, j!({"user_id": 5, "username": "alice"})),
            (Method::Get, _) => status(404),
            (_, "/users/5") | (_, "/users/5/password") | (_, "/users/5/sysadmin") => empty(200),
            _ => status(500),
        })
    }

    #[tokio::test]
    async fn test_get_by_empty_name_makes_no_call() {
        let fake = FakeTransport::offline();
        let client = UserClient::new(fake.clone(), ListOptions::default());

        let err = client.get_user_by_name("").await.unwrap_err();
        assert!(matches!(err, UserError::NotProvided(_)));
        assert_eq!(fake.count(), 0);
    }

    #[tokio::test]
    async fn test_get_by_non_positive_id_makes_no_call() {
        let fake = FakeTransport::offline();
        let client = UserClient::new(fake.clone(), ListOptions::default());

        for id in [0, -3] {
            let err = client.get_user_by_id(id).await.unwrap_err();
            assert!(matches!(err, UserError::InvalidId(i) if i == id));
        }
        assert_eq!(fake.count(), 0);
    }

    #[tokio::test]
    async fn test_get_by_name_requires_exact_match() {
        let fake = directory();
        let client = UserClient::new(fake.clone(), ListOptions::default());

        let user = client.get_user_by_name("alice").await.unwrap();
        assert_eq!(user.user_id, 5);
        assert_eq!(fake.calls()[0].query_value("q"), Some("username=~alice"));

        let err = client.get_user_by_name("ali").await.unwrap_err();
        assert!(matches!(err, UserError::NotFound));
    }

    #[tokio::test]
    async fn test_get_by_name_ignores_listing_options() {
        let fake = FakeTransport::new(|op| match op.query_value("page") {
            Some("1") => json(200, j!([{"user_id": 5, "username": "alice"}])),
            _ => json(200, j!([])),
        });
        let options = ListOptions::default()
            .with_page(2)
            .with_page_size(25)
            .with_sort("-creation_time")
            .with_query("sysadmin_flag=true");
        let client = UserClient::new(fake.clone(), options);

        assert_eq!(client.get_user_by_name("alice").await.unwrap().user_id, 5);
        assert!(client.user_exists("alice").await.unwrap());

        let op = &fake.calls()[0];
        assert_eq!(op.query_value("page"), Some("1"));
        assert_eq!(op.query_value("page_size"), Some("25"));
        assert_eq!(op.query_value("q"), Some("username=~alice"));
        assert_eq!(op.query_value("sort"), None);

        // Listing still honours the configured page.
        assert!(client.list_users().await.unwrap().is_empty());
        assert_eq!(fake.calls()[2].query_value("page"), Some("2"));
    }

    #[tokio::test]
    async fn test_get_by_id_rejects_foreign_payload() {
        let fake = FakeTransport::new(|_| json(200, j!({"user_id": 9, "username": "mallory"})));
        let client = UserClient::new(fake, ListOptions::default());

        let err = client.get_user_by_id(4).await.unwrap_err();
        assert!(matches!(err, UserError::InvalidId(4)));
    }

    #[tokio::test]
    async fn test_get_by_id_missing_payload_is_not_found() {
        let fake = FakeTransport::new(|_| empty(200));
        let client = UserClient::new(fake, ListOptions::default());

        assert!(matches!(
            client.get_user_by_id(4).await.unwrap_err(),
            UserError::NotFound
        ));
    }

    #[tokio::test]
    async fn test_create_then_fetch_by_name() {
        let fake = FakeTransport::new(|op| match op.method {
            Method::Post => {
                assert_eq!(op.body.as_ref().unwrap()["username"], "bob");
                empty(201)
            }
            _ => json(200, j!([{"user_id": 11, "username": "bob", "email": "bob@example.com"}])),
        });
        let client = UserClient::new(fake.clone(), ListOptions::default());

        let user = client.create_user(&creation("bob")).await.unwrap();
        assert_eq!(user.username, "bob");
        assert_eq!(user.user_id, 11);
        assert_eq!(fake.log(), vec!["POST /users", "GET /users"]);
    }

    #[tokio::test]
    async fn test_create_conflict() {
        let fake = FakeTransport::new(|_| status(409));
        let client = UserClient::new(fake.clone(), ListOptions::default());

        let err = client.create_user(&creation("bob")).await.unwrap_err();
        assert!(matches!(err, UserError::AlreadyExists));
        assert_eq!(fake.count(), 1);
    }

    #[tokio::test]
    async fn test_create_requires_password() {
        let fake = FakeTransport::offline();
        let client = UserClient::new(fake.clone(), ListOptions::default());

        let mut request = creation("bob");
        request.password.clear();
        assert!(matches!(
            client.create_user(&request).await.unwrap_err(),
            UserError::NotProvided("password")
        ));
        assert_eq!(fake.count(), 0);
    }

    #[tokio::test]
    async fn test_update_and_delete_reject_mismatch() {
        let fake = directory();
        let client = UserClient::new(fake.clone(), ListOptions::default());
        let forged = alice(6);

        let err = client
            .update_user_profile(&forged, &UserProfile::default())
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::Mismatch));

        let err = client.delete_user(&forged).await.unwrap_err();
        assert!(matches!(err, UserError::Mismatch));

        assert_eq!(fake.mutations(), 0);
    }

    #[tokio::test]
    async fn test_delete_unknown_user_is_not_found() {
        let fake = directory();
        let client = UserClient::new(fake.clone(), ListOptions::default());
        let ghost = User {
            user_id: 40,
            username: "ghost".into(),
            ..User::default()
        };

        assert!(matches!(
            client.delete_user(&ghost).await.unwrap_err(),
            UserError::NotFound
        ));
        assert_eq!(fake.mutations(), 0);
    }

    #[tokio::test]
    async fn test_update_password() {
        let fake = directory();
        let client = UserClient::new(fake.clone(), ListOptions::default());

        let missing = PasswordRequest::default();
        assert!(matches!(
            client.update_user_password(&alice(5), &missing).await.unwrap_err(),
            UserError::NotProvided(_)
        ));
        assert_eq!(fake.count(), 0);

        let password = PasswordRequest {
            old_password: "old".into(),
            new_password: "N3wPassword".into(),
        };
        client.update_user_password(&alice(5), &password).await.unwrap();
        assert_eq!(fake.log().last().unwrap(), "PUT /users/5/password");
    }

    #[tokio::test]
    async fn test_sysadmin_accepts_created_status() {
        let fake = FakeTransport::new(|op| match op.method {
            Method::Get => json(200, j!([{"user_id": 5, "username": "alice"}])),
            _ => status(201),
        });
        let client = UserClient::new(fake.clone(), ListOptions::default());

        client.set_user_sysadmin(&alice(5), true).await.unwrap();
        let put = fake.calls().pop().unwrap();
        assert_eq!(put.body.unwrap()["sysadmin_flag"], true);
    }

    #[tokio::test]
    async fn test_exists_collapses_not_found() {
        let fake = directory();
        let client = UserClient::new(fake, ListOptions::default());

        assert!(client.user_exists("alice").await.unwrap());
        assert!(!client.user_exists("nobody").await.unwrap());
        assert!(client.user_exists(5_i64).await.unwrap());
        assert!(!client.user_exists(77_i64).await.unwrap());
    }

    #[tokio::test]
    async fn test_exists_propagates_other_errors() {
        let fake = FakeTransport::new(|_| status(403));
        let client = UserClient::new(fake, ListOptions::default());

        assert!(matches!(
            client.user_exists("alice").await.unwrap_err(),
            UserError::NoPermission
        ));
        assert!(matches!(
            client.user_exists(0_i64).await.unwrap_err(),
            UserError::InvalidId(0)
        ));
    }

    #[tokio::test]
    async fn test_search_empty_is_not_found() {
        let fake = FakeTransport::new(|_| json(200, j!([])));
        let client = UserClient::new(fake.clone(), ListOptions::default());

        assert!(matches!(
            client.search_users("zed").await.unwrap_err(),
            UserError::NotFound
        ));
        assert_eq!(fake.calls()[0].query_value("username"), Some("zed"));
    }

    #[tokio::test]
    async fn test_list_empty_is_valid() {
        let fake = FakeTransport::new(|_| json(200, j!([])));
        let client = UserClient::new(fake, ListOptions::default());
        assert!(client.list_users().await.unwrap().is_empty());
    }

    #[test]
    fn test_translate_is_pure() {
        for _ in 0..2 {
            let err = translate(TransportError::from_status(500, "boom")).unwrap_err();
            assert!(matches!(err, UserError::InternalError));
        }
    }

    #[test]
    fn test_translate_table() {
        let kind = |code| translate(TransportError::from_status(code, ""));
        assert!(kind(201).is_ok());
        assert!(matches!(kind(400), Err(UserError::BadRequest)));
        assert!(matches!(kind(401), Err(UserError::Unauthorized)));
        assert!(matches!(kind(403), Err(UserError::NoPermission)));
        assert!(matches!(kind(404), Err(UserError::IdNotExists)));
        assert!(matches!(kind(409), Err(UserError::AlreadyExists)));
        assert!(matches!(
            kind(418),
            Err(UserError::Transport(TransportError::Status { code: 418, .. }))
        ));
    }
}
