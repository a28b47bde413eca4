//! The endpoint URIs.
//!
//! Pages and the forms that submit to them share a path, the page is served on GET and the form
//! is handled on POST.

/// The portfolio page, the landing page for logged in users.
pub const ROOT: &str = "/";
/// The page for buying shares.
pub const BUY: &str = "/buy";
/// The page for selling shares.
pub const SELL: &str = "/sell";
/// The page listing every trade a user has made.
pub const HISTORY: &str = "/history";
/// The page for looking up the price of a stock.
pub const QUOTE: &str = "/quote";
/// The page for depositing simulated cash.
pub const ADD_CASH: &str = "/add_cash";
/// The log in page.
pub const LOG_IN: &str = "/login";
/// The route that logs out the current user.
pub const LOG_OUT: &str = "/logout";
/// The registration page.
pub const REGISTER: &str = "/register";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";
