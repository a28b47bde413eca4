//! One-shot alert messages that survive a redirect.
//!
//! A handler that redirects after a successful form submission stores the message in an
//! encrypted cookie with [set_flash], and the page that is redirected to shows it once after
//! reading it with [take_flash].

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use maud::{Markup, html};

pub(crate) const COOKIE_FLASH: &str = "flash";

/// Alert messages with their styling.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    Success(String),
    Error(String),
}

impl Alert {
    pub fn into_html(self) -> Markup {
        let (class, message) = match self {
            Alert::Success(message) => ("alert alert-success", message),
            Alert::Error(message) => ("alert alert-error", message),
        };

        html! {
            div class=(class) role="alert" { (message) }
        }
    }
}

/// Store `message` so that it is shown on the next page the user visits.
pub fn set_flash(jar: PrivateCookieJar, message: &str) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_FLASH, message.to_owned()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Remove the stored message from the jar and return it, if any.
pub fn take_flash(jar: PrivateCookieJar) -> (PrivateCookieJar, Option<Alert>) {
    let message = match jar.get(COOKIE_FLASH) {
        Some(cookie) if !cookie.value().is_empty() => cookie.value().to_owned(),
        _ => return (jar, None),
    };

    let jar = jar.remove(Cookie::build(COOKIE_FLASH).path("/"));

    (jar, Some(Alert::Success(message)))
}
