//! Server-side session records that map an opaque session ID to a logged-in user.

use std::fmt::Display;

use rusqlite::{Connection, OptionalExtension};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, UserID};

/// An opaque, randomly generated identifier for a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a new random session ID.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap a session ID read from a cookie.
    pub fn new_unchecked(raw_id: &str) -> Self {
        Self(raw_id.to_owned())
    }

    /// The session ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Create the sessions table.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn create_session_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                user_id INTEGER NOT NULL,
                expires_at INTEGER NOT NULL,
                FOREIGN KEY(user_id) REFERENCES users(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Start a new session for `user_id` that is valid until `expires_at`.
///
/// # Errors
/// Returns an error if the user does not exist or there is some other SQL error.
pub fn create_session(
    user_id: UserID,
    expires_at: OffsetDateTime,
    connection: &Connection,
) -> Result<SessionId, Error> {
    let session_id = SessionId::new_random();

    connection.execute(
        "INSERT INTO sessions (id, user_id, expires_at) VALUES (?1, ?2, ?3)",
        (
            session_id.as_str(),
            user_id.as_i64(),
            expires_at.unix_timestamp(),
        ),
    )?;

    Ok(session_id)
}

/// Get the user that owns the session, or `None` if the session does not exist or expired before `now`.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn get_session_user(
    session_id: &SessionId,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<Option<UserID>, Error> {
    let session: Option<(i64, i64)> = connection
        .query_row(
            "SELECT user_id, expires_at FROM sessions WHERE id = ?1",
            (session_id.as_str(),),
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    Ok(session.and_then(|(user_id, expires_at)| {
        (expires_at > now.unix_timestamp()).then_some(UserID::new(user_id))
    }))
}

/// Push back the expiry of a session.
///
/// # Errors
/// Returns [Error::NotFound] if the session does not exist.
pub fn extend_session(
    session_id: &SessionId,
    expires_at: OffsetDateTime,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE sessions SET expires_at = ?1 WHERE id = ?2",
        (expires_at.unix_timestamp(), session_id.as_str()),
    )?;

    match rows_affected {
        0 => Err(Error::NotFound),
        _ => Ok(()),
    }
}

/// Remove a session, deleting a session that does not exist is not an error.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn delete_session(session_id: &SessionId, connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "DELETE FROM sessions WHERE id = ?1",
        (session_id.as_str(),),
    )?;

    Ok(())
}

/// Remove all sessions that expired before `now` and return how many were removed.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn delete_expired_sessions(now: OffsetDateTime, connection: &Connection) -> Result<usize, Error> {
    connection
        .execute(
            "DELETE FROM sessions WHERE expires_at <= ?1",
            (now.unix_timestamp(),),
        )
        .map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::{Duration, OffsetDateTime};

    use crate::{Error, PasswordHash, UserID, create_user, db::initialize};

    use super::{
        SessionId, create_session, delete_expired_sessions, delete_session, extend_session,
        get_session_user,
    };

    fn get_test_connection() -> (Connection, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user("alice", PasswordHash::new_unchecked("hunter2"), &connection)
            .unwrap();

        (connection, user.id)
    }

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(SessionId::new_random(), SessionId::new_random());
    }

    #[test]
    fn live_session_resolves_to_user() {
        let (connection, user_id) = get_test_connection();
        let now = OffsetDateTime::now_utc();
        let session_id = create_session(user_id, now + Duration::minutes(5), &connection).unwrap();

        let got = get_session_user(&session_id, now, &connection).unwrap();

        assert_eq!(got, Some(user_id));
    }

    #[test]
    fn expired_session_resolves_to_none() {
        let (connection, user_id) = get_test_connection();
        let now = OffsetDateTime::now_utc();
        let session_id = create_session(user_id, now - Duration::seconds(1), &connection).unwrap();

        let got = get_session_user(&session_id, now, &connection).unwrap();

        assert_eq!(got, None);
    }

    #[test]
    fn unknown_session_resolves_to_none() {
        let (connection, _) = get_test_connection();

        let got = get_session_user(
            &SessionId::new_unchecked("not-a-session"),
            OffsetDateTime::now_utc(),
            &connection,
        )
        .unwrap();

        assert_eq!(got, None);
    }

    #[test]
    fn session_for_unknown_user_fails() {
        let (connection, _) = get_test_connection();

        let result = create_session(
            UserID::new(42),
            OffsetDateTime::now_utc() + Duration::minutes(5),
            &connection,
        );

        assert!(result.is_err());
    }

    #[test]
    fn extend_session_revives_expiring_session() {
        let (connection, user_id) = get_test_connection();
        let now = OffsetDateTime::now_utc();
        let session_id = create_session(user_id, now + Duration::seconds(10), &connection).unwrap();

        extend_session(&session_id, now + Duration::hours(1), &connection).unwrap();

        let later = now + Duration::minutes(30);
        assert_eq!(
            get_session_user(&session_id, later, &connection).unwrap(),
            Some(user_id)
        );
    }

    #[test]
    fn extend_missing_session_fails() {
        let (connection, _) = get_test_connection();

        let result = extend_session(
            &SessionId::new_unchecked("missing"),
            OffsetDateTime::now_utc(),
            &connection,
        );

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn deleted_session_resolves_to_none() {
        let (connection, user_id) = get_test_connection();
        let now = OffsetDateTime::now_utc();
        let session_id = create_session(user_id, now + Duration::minutes(5), &connection).unwrap();

        delete_session(&session_id, &connection).unwrap();

        assert_eq!(
            get_session_user(&session_id, now, &connection).unwrap(),
            None
        );
    }

    #[test]
    fn delete_expired_sessions_keeps_live_sessions() {
        let (connection, user_id) = get_test_connection();
        let now = OffsetDateTime::now_utc();
        create_session(user_id, now - Duration::minutes(1), &connection).unwrap();
        create_session(user_id, now - Duration::minutes(2), &connection).unwrap();
        let live = create_session(user_id, now + Duration::minutes(5), &connection).unwrap();

        let removed = delete_expired_sessions(now, &connection).unwrap();

        assert_eq!(removed, 2);
        assert_eq!(
            get_session_user(&live, now, &connection).unwrap(),
            Some(user_id)
        );
    }
}
