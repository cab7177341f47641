mod cards;
mod overview;
mod styling;
mod tables;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

pub use cards::{print_status_cards, print_watch_footer};
pub use overview::print_overview;
pub use styling::{dim, magenta_bold};

/// Prints the pipewatch banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("🛰  pipewatch"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("GitLab status dashboard for your terminal")
    );
}

/// Spinner shown on stderr while an aggregation is being fetched.
pub fn fetch_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {msg} {spinner}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
