//! Shared page layout, style classes and formatting helpers for the maud views.

use std::sync::OnceLock;

use maud::{DOCTYPE, Markup, html};
use numfmt::{Formatter, Precision};

use crate::navigation::NavBar;

// Link styles
pub const LINK_STYLE: &str = "link";

// Button styles
pub const BUTTON_PRIMARY_STYLE: &str = "button button-primary";

// Form styles
pub const FORM_CONTAINER_STYLE: &str = "form-container";
pub const FORM_LABEL_STYLE: &str = "form-label";
pub const FORM_TEXT_INPUT_STYLE: &str = "form-input";

// Table styles
pub const TABLE_STYLE: &str = "table";
pub const TABLE_HEADER_STYLE: &str = "table-header";
pub const TABLE_ROW_STYLE: &str = "table-row";
pub const TABLE_CELL_STYLE: &str = "table-cell";
pub const TABLE_CELL_NUMBER_STYLE: &str = "table-cell table-cell-number";

// Page container
pub const PAGE_CONTAINER_STYLE: &str = "page-container";

/// The skeleton of every page: the document head and the body wrapping `content`.
pub fn base(title: &str, content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Paper Trader" }
                link href="/static/main.css" rel="stylesheet";
            }

            body class="body"
            {
                (content)
            }
        }
    }
}

/// A page for logged in users with the navigation bar above `content`.
pub fn page(title: &str, active_endpoint: &str, content: &Markup) -> Markup {
    let content = html! {
        (NavBar::new(active_endpoint).into_html())

        main class=(PAGE_CONTAINER_STYLE)
        {
            (content)
        }
    };

    base(title, &content)
}

pub fn error_view(title: &str, header: &str, description: &str, fix: &str) -> Markup {
    let content = html!(
        section class="error-section"
        {
            h1 class="error-header" { (header) }

            p class="error-description" { (description) }

            p class="error-fix" { (fix) }

            a href="/" class=(BUTTON_PRIMARY_STYLE) { "Back to Homepage" }
        }
    );

    base(title, &content)
}

pub fn log_in_register(form_title: &str, form: &Markup) -> Markup {
    html! {
        div class=(FORM_CONTAINER_STYLE)
        {
            a href="/" class="brand" { "Paper Trader" }

            div class="card"
            {
                h1 class="card-title" { (form_title) }

                (form)
            }
        }
    }
}

/// A labelled text input that is required to submit the form.
pub fn text_input(
    name: &str,
    label: &str,
    input_type: &str,
    placeholder: &str,
    autofocus: bool,
) -> Markup {
    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }

            input
                type=(input_type)
                name=(name)
                id=(name)
                placeholder=(placeholder)
                class=(FORM_TEXT_INPUT_STYLE)
                autocomplete="off"
                autofocus[autofocus]
                required;
        }
    }
}

pub fn password_input(name: &str, label: &str) -> Markup {
    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }

            input
                type="password"
                name=(name)
                id=(name)
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required;
        }
    }
}

/// An input for a whole, positive number of shares.
pub fn shares_input() -> Markup {
    html! {
        div
        {
            label for="shares" class=(FORM_LABEL_STYLE) { "Shares" }

            input
                type="number"
                name="shares"
                id="shares"
                placeholder="Shares"
                min="1"
                step="1"
                class=(FORM_TEXT_INPUT_STYLE)
                required;
        }
    }
}

/// Format `number` as dollars and cents with thousands separators, e.g. "$1,234.50".
pub fn format_currency(number: f64) -> String {
    static DOLLAR_FMT: OnceLock<Formatter> = OnceLock::new();

    let dollar_fmt = DOLLAR_FMT.get_or_init(|| {
        Formatter::new()
            .separator(',')
            .unwrap_or_default()
            .precision(Precision::Decimals(0))
    });

    let total_cents = (number.abs() * 100.0).round();
    let dollars = (total_cents / 100.0).trunc();
    let cents = (total_cents - dollars * 100.0) as u64;

    // Zero is hardcoded as "0", so it is formatted without numfmt.
    let dollars = if dollars == 0.0 {
        "0".to_owned()
    } else {
        dollar_fmt.fmt_string(dollars)
    };
    let sign = if number < 0.0 && total_cents > 0.0 {
        "-"
    } else {
        ""
    };

    format!("{sign}${dollars}.{cents:02}")
}

/// A styled link for use in a <p> tag.
pub fn link(url: &str, text: &str) -> Markup {
    html! (
        a href=(url) class=(LINK_STYLE) { (text) }
    )
}
