//
//  harbor-client
//  auth/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Authentication Module
//!
//! Harbor authenticates API calls with HTTP Basic credentials: a local or
//! LDAP user, a robot account, or an OIDC user with their CLI secret. The
//! credential is supplied once when the client is built and attached to
//! every request.
//!
//! ## Example
//!
//! ```rust
//! use harbor_client::auth::Credential;
//!
//! let credential = Credential::basic("admin", "Harbor12345");
//! assert_eq!(credential.username(), "admin");
//! ```

use std::fmt;

use reqwest::RequestBuilder;

/// HTTP Basic credential for a Harbor account.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    username: String,
    password: String,
}

impl Credential {
    /// Creates a Basic credential.
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// The account name sent with each request.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Adds the `Authorization` header to a request.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use harbor_client::auth::Credential;
    /// use reqwest::Client;
    ///
    /// async fn ping(credential: &Credential) {
    ///     let request = Client::new().get("https://harbor.example.com/api/v2.0/ping");
    ///     let response = credential.apply_to_request(request).send().await;
    /// }
    /// ```
    pub fn apply_to_request(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.username, Some(&self.password))
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
