use clap::builder::{
	Styles,
	styling::{AnsiColor, Effects},
};

pub const VERSION: &str = concat!(
	env!("CARGO_PKG_VERSION"),
	"-",
	env!("VERGEN_GIT_SHA"),
	"-",
	env!("VERGEN_CARGO_TARGET_TRIPLE"),
);

/// Terminal styles shared by every Scout binary's `--help` output.
pub fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Yellow.on_default() | Effects::BOLD)
		.usage(AnsiColor::Yellow.on_default() | Effects::BOLD)
		.literal(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Green.on_default())
}
