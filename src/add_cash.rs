//! The page and form handler for depositing simulated cash.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;
use maud::{Markup, html};
use rusqlite::{Connection, TransactionBehavior};
use serde::Deserialize;

use crate::{
    AppState, Error, UserID,
    alert::set_flash,
    db::lock_connection,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        format_currency, page,
    },
    user::{adjust_cash, get_cash},
};

/// The state needed for depositing cash.
#[derive(Debug, Clone)]
pub struct AddCashState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AddCashState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The largest amount that can be deposited at once.
pub const MAX_DEPOSIT: f64 = 1_000_000_000.0;

/// Parse a deposit amount in dollars.
///
/// # Errors
/// Returns [Error::InvalidAmount] unless `raw_amount` is a number greater than zero and at most
/// [MAX_DEPOSIT].
pub fn parse_amount(raw_amount: &str) -> Result<f64, Error> {
    match raw_amount.trim().parse::<f64>() {
        Ok(amount) if amount > 0.0 && amount <= MAX_DEPOSIT => Ok(amount),
        _ => Err(Error::InvalidAmount),
    }
}

/// Add `amount` to the user's cash and return the new balance.
///
/// # Errors
/// Returns [Error::NotFound] if the user does not exist, and [Error::InvalidAmount] if the
/// new balance would not be a finite number.
pub fn deposit_cash(user_id: UserID, amount: f64, connection: &mut Connection) -> Result<f64, Error> {
    let transaction = connection.transaction_with_behavior(TransactionBehavior::Immediate)?;

    if !(get_cash(user_id, &transaction)? + amount).is_finite() {
        return Err(Error::InvalidAmount);
    }

    adjust_cash(user_id, amount, &transaction)?;
    let balance = get_cash(user_id, &transaction)?;

    transaction.commit()?;

    Ok(balance)
}

fn add_cash_form() -> Markup {
    html! {
        div class=(FORM_CONTAINER_STYLE)
        {
            form method="post" action=(endpoints::ADD_CASH) class="form"
            {
                div
                {
                    label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                    input
                        type="number"
                        name="amount"
                        id="amount"
                        placeholder="0.00"
                        min="0.01"
                        step="0.01"
                        class=(FORM_TEXT_INPUT_STYLE)
                        autofocus
                        required;
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Cash" }
            }
        }
    }
}

/// Display the form for depositing cash.
pub async fn get_add_cash_page() -> Response {
    page("Add Cash", endpoints::ADD_CASH, &add_cash_form()).into_response()
}

/// The form data for a deposit.
#[derive(Debug, Deserialize)]
pub struct AddCashForm {
    #[serde(default)]
    pub amount: String,
}

/// Deposit cash into the user's account and redirect to the portfolio.
pub async fn post_add_cash(
    State(state): State<AddCashState>,
    Extension(user_id): Extension<UserID>,
    jar: PrivateCookieJar,
    Form(form): Form<AddCashForm>,
) -> Result<Response, Error> {
    let amount = parse_amount(&form.amount)?;

    let balance = {
        let mut connection = lock_connection(&state.db_connection)?;
        deposit_cash(user_id, amount, &mut connection)?
    };

    tracing::info!("User {user_id} added {amount}, new balance {balance}");

    let message = format!("Added {} to your account!", format_currency(amount));

    Ok((set_flash(jar, &message), Redirect::to(endpoints::ROOT)).into_response())
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use rusqlite::Connection;

    use crate::{
        Error, PasswordHash, QuoteClient, STARTING_CASH, UserID, create_user,
        db::{initialize, lock_connection},
        endpoints,
        test_utils::{
            assert_form_action, assert_form_input, assert_redirect, log_in_test_user,
            must_get_form, parse_response_document, test_server, test_state,
        },
        user::{adjust_cash, get_cash},
    };

    use super::{MAX_DEPOSIT, deposit_cash, parse_amount};

    #[test]
    fn parse_amount_accepts_positive_numbers() {
        assert_eq!(parse_amount("100"), Ok(100.0));
        assert_eq!(parse_amount("0.01"), Ok(0.01));
        assert_eq!(parse_amount("1000000000"), Ok(MAX_DEPOSIT));
    }

    #[test]
    fn parse_amount_rejects_invalid_amounts() {
        for raw in ["", "0", "-5", "abc", "NaN", "inf", "1e300", "1000000000.01"] {
            assert_eq!(parse_amount(raw), Err(Error::InvalidAmount), "input {raw:?}");
        }
    }

    #[test]
    fn deposit_returns_new_balance() {
        let mut connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user("alice", PasswordHash::new_unchecked("hunter2"), &connection)
            .unwrap();

        let balance = deposit_cash(user.id, 250.5, &mut connection).unwrap();

        assert_eq!(balance, STARTING_CASH + 250.5);
    }

    #[test]
    fn deposit_that_overflows_balance_fails() {
        let mut connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user("alice", PasswordHash::new_unchecked("hunter2"), &connection)
            .unwrap();
        adjust_cash(user.id, f64::MAX - STARTING_CASH, &connection).unwrap();

        let result = deposit_cash(user.id, f64::MAX, &mut connection);

        assert_eq!(result, Err(Error::InvalidAmount));
        assert!(get_cash(user.id, &connection).unwrap().is_finite());
    }

    #[test]
    fn deposit_for_missing_user_fails() {
        let mut connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        let result = deposit_cash(UserID::new(3), 1.0, &mut connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[tokio::test]
    async fn add_cash_page_has_form() {
        let state = test_state(QuoteClient::demo());
        let server = test_server(state.clone());
        let (_, cookie) = log_in_test_user(&server, &state).await;

        let response = server.get(endpoints::ADD_CASH).add_cookie(cookie).await;

        response.assert_status_ok();
        let document = parse_response_document(&response);
        let form = must_get_form(&document);
        assert_form_action(&form, endpoints::ADD_CASH);
        assert_form_input(&form, "amount", "number");
    }

    #[tokio::test]
    async fn add_cash_credits_account() {
        let state = test_state(QuoteClient::demo());
        let server = test_server(state.clone());
        let (user_id, cookie) = log_in_test_user(&server, &state).await;

        let response = server
            .post(endpoints::ADD_CASH)
            .add_cookie(cookie)
            .form(&[("amount", "99.99")])
            .await;

        assert_redirect(&response, endpoints::ROOT);
        let connection = lock_connection(&state.db_connection).unwrap();
        assert_eq!(get_cash(user_id, &connection).unwrap(), STARTING_CASH + 99.99);
    }

    #[tokio::test]
    async fn add_cash_rejects_huge_amount() {
        let state = test_state(QuoteClient::demo());
        let server = test_server(state.clone());
        let (user_id, cookie) = log_in_test_user(&server, &state).await;

        let response = server
            .post(endpoints::ADD_CASH)
            .add_cookie(cookie)
            .form(&[("amount", "1e300")])
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
        let connection = lock_connection(&state.db_connection).unwrap();
        assert_eq!(get_cash(user_id, &connection).unwrap(), STARTING_CASH);
    }

    #[tokio::test]
    async fn add_cash_rejects_invalid_amount() {
        let state = test_state(QuoteClient::demo());
        let server = test_server(state.clone());
        let (user_id, cookie) = log_in_test_user(&server, &state).await;

        let response = server
            .post(endpoints::ADD_CASH)
            .add_cookie(cookie)
            .form(&[("amount", "-10")])
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
        let connection = lock_connection(&state.db_connection).unwrap();
        assert_eq!(get_cash(user_id, &connection).unwrap(), STARTING_CASH);
    }
}
