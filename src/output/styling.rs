use std::fmt::Display;

use console::{style, StyledObject};

/// Shorthands over `console::style` used by the card and overview renderers.
pub fn bright(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright()
}

pub fn dim(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).dim()
}

pub fn cyan(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).cyan()
}

pub fn magenta_bold(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).magenta().bold()
}

/// Severity accents for the pipeline summary line.
pub fn passing(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().green()
}

pub fn running(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().yellow()
}

pub fn failing(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().red()
}
