//! Navigation to the sign-in page after a session expires.
//!
//! The pipeline only knows [`SignInNavigator`]. Locale handling lives in
//! [`LocaleNavigator`], which prefixes the sign-in route with the active
//! locale and hands the resulting path to a [`Router`].

use crate::config::ClientConfig;
use crate::logging::log_info;
use async_trait::async_trait;
use std::sync::{Arc, PoisonError, RwLock};

/// Sends the user to the sign-in page.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SignInNavigator: Send + Sync {
    async fn navigate_to_sign_in(&self);
}

/// Application router.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Router: Send + Sync {
    async fn navigate_by_url(&self, path: String);
}

/// Sign-in navigator that builds `/{locale}/{sign_in_path}`.
pub struct LocaleNavigator {
    router: Arc<dyn Router>,
    locale: RwLock<String>,
    sign_in_path: String,
}

impl LocaleNavigator {
    pub fn new(
        router: Arc<dyn Router>,
        locale: impl Into<String>,
        sign_in_path: impl Into<String>,
    ) -> Self {
        Self {
            router,
            locale: RwLock::new(locale.into()),
            sign_in_path: sign_in_path.into(),
        }
    }

    pub fn from_config(router: Arc<dyn Router>, config: &ClientConfig) -> Self {
        Self::new(router, config.locale.clone(), config.sign_in_path.clone())
    }

    pub fn locale(&self) -> String {
        self.locale
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Switch the locale used for subsequent redirects.
    pub fn set_locale(&self, locale: impl Into<String>) {
        *self.locale.write().unwrap_or_else(PoisonError::into_inner) = locale.into();
    }

    pub fn sign_in_url(&self) -> String {
        format!(
            "/{}/{}",
            self.locale().trim_matches('/'),
            self.sign_in_path.trim_matches('/')
        )
    }
}

#[async_trait]
impl SignInNavigator for LocaleNavigator {
    async fn navigate_to_sign_in(&self) {
        let path = self.sign_in_url();
        log_info!(path = %path, "Session expired, redirecting to sign-in");
        self.router.navigate_by_url(path).await;
    }
}
