use axum::http::StatusCode;
use axum_extra::extract::cookie::Cookie;
use axum_test::TestResponse;

use crate::alert::COOKIE_FLASH;

#[track_caller]
pub(crate) fn assert_redirect(response: &TestResponse, location: &str) {
    assert_eq!(
        response.status_code(),
        StatusCode::SEE_OTHER,
        "want redirect, got {} with body {}",
        response.status_code(),
        response.text()
    );
    assert_eq!(response.header("location"), location);
}

/// Get the flash cookie set by `response`, the value is still encrypted.
#[track_caller]
pub(crate) fn get_flash_cookie(response: &TestResponse) -> Cookie<'static> {
    response.cookie(COOKIE_FLASH)
}
