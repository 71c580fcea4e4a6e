//! Terminal capability probing from environment variables.

use termpix::{Capabilities, ColorLevel};

/// Probe the process environment.
pub fn from_env() -> Capabilities {
    detect(|key| std::env::var(key).ok())
}

/// Probe through `var`, which returns the value of an environment variable.
/// Unset and empty variables are treated alike.
pub fn detect<F>(var: F) -> Capabilities
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| var(key).filter(|v| !v.is_empty());
    let term = get("TERM").unwrap_or_default();
    let term_program = get("TERM_PROGRAM").unwrap_or_default();

    Capabilities {
        color_level: color_level(&get, &term, &term_program),
        sixel: ["xterm", "mlterm", "mintty", "foot", "contour"]
            .iter()
            .any(|t| term.contains(t)),
        kitty: term.contains("kitty") || get("KITTY_WINDOW_ID").is_some(),
        iterm2: term_program == "iTerm.app" || get("ITERM_SESSION_ID").is_some(),
        wezterm: term_program == "WezTerm" || term.contains("wezterm"),
        terminology: get("TERMINOLOGY").is_some(),
    }
}

fn color_level<F>(get: &F, term: &str, term_program: &str) -> ColorLevel
where
    F: Fn(&str) -> Option<String>,
{
    if matches!(get("COLORTERM").as_deref(), Some("truecolor" | "24bit")) {
        return ColorLevel::TrueColor;
    }
    if get("NO_COLOR").is_some() {
        return ColorLevel::NoColor;
    }
    if let Some(force) = get("FORCE_COLOR") {
        return match force.parse::<u8>() {
            Ok(0) => ColorLevel::NoColor,
            Ok(2) => ColorLevel::Color256,
            Ok(3) => ColorLevel::TrueColor,
            _ => ColorLevel::Basic,
        };
    }
    if term.is_empty() || term == "dumb" {
        return ColorLevel::NoColor;
    }

    let lower = term.to_lowercase();
    let truecolor_terms = [
        "xterm-truecolor",
        "xterm-direct",
        "iterm",
        "vte",
        "gnome",
        "konsole",
        "alacritty",
        "kitty",
        "wezterm",
        "rio",
    ];
    if truecolor_terms.iter().any(|t| lower.contains(t)) {
        return ColorLevel::TrueColor;
    }
    if term.contains("256") {
        return ColorLevel::Color256;
    }
    if ["iTerm.app", "Apple_Terminal", "Hyper", "vscode", "Terminus"].contains(&term_program)
        || get("WT_SESSION").is_some()
    {
        return ColorLevel::TrueColor;
    }
    if ["xterm", "screen", "tmux", "rxvt"]
        .iter()
        .any(|p| term.starts_with(p))
    {
        return ColorLevel::Color256;
    }
    ColorLevel::Basic
}
