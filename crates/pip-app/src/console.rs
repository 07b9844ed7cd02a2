//! Line-oriented console driving the simulated browser.

use std::fmt::Write as _;

use pip_common::{Event, TabId, WindowId};
use pip_coordinator::Coordinator;

use crate::host::LocalHost;

pub const HELP: &str = "\
commands:
  click [tab]         toolbar button (defaults to the focused tab)
  shortcut            keyboard toggle command
  activate <tab>      bring a tab to the front and focus its window
  focus <window|none> focus a window, or leave the browser
  close <tab>         close a tab
  navigate <tab>      reload a tab
  play <tab>          click play on the page's largest video
  pause <tab>         pause everything on the page
  gesture <tab>       click somewhere in the page
  native-exit <tab>   close the PiP window with its own button
  state               ownership, hint and badge
  tabs                list tabs
  help                this text
  quit                exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Click(Option<TabId>),
    Shortcut,
    Activate(TabId),
    Focus(Option<WindowId>),
    Close(TabId),
    Navigate(TabId),
    Play(TabId),
    Pause(TabId),
    Gesture(TabId),
    NativeExit(TabId),
    State,
    Tabs,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown command '{0}', try 'help'")]
    UnknownCommand(String),

    #[error("'{command}' needs a {what}")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
    },

    #[error("'{0}' is not a number")]
    BadNumber(String),

    #[error("too many arguments for '{0}'")]
    TooManyArguments(&'static str),
}

/// Whether the console loop keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

// =============================================================================
// PARSING
// =============================================================================

/// Parse one input line. Blank lines and `#` comments yield `None`.
pub fn parse(line: &str) -> Result<Option<Command>, ParseError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let arg = words.next();

    let command = match verb.to_ascii_lowercase().as_str() {
        "click" => Command::Click(arg.map(parse_number).transpose()?.map(TabId)),
        "shortcut" | "toggle" => no_arg("shortcut", arg, Command::Shortcut)?,
        "activate" | "switch" => Command::Activate(tab_arg("activate", arg)?),
        "focus" => match arg {
            Some("none") => Command::Focus(None),
            Some(raw) => Command::Focus(Some(WindowId(parse_number(raw)?))),
            None => {
                return Err(ParseError::MissingArgument {
                    command: "focus",
                    what: "window id or 'none'",
                })
            }
        },
        "close" => Command::Close(tab_arg("close", arg)?),
        "navigate" | "reload" => Command::Navigate(tab_arg("navigate", arg)?),
        "play" => Command::Play(tab_arg("play", arg)?),
        "pause" => Command::Pause(tab_arg("pause", arg)?),
        "gesture" => Command::Gesture(tab_arg("gesture", arg)?),
        "native-exit" => Command::NativeExit(tab_arg("native-exit", arg)?),
        "state" => no_arg("state", arg, Command::State)?,
        "tabs" => no_arg("tabs", arg, Command::Tabs)?,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(ParseError::UnknownCommand(other.to_string())),
    };

    if words.next().is_some() {
        return Err(ParseError::TooManyArguments(command.name()));
    }
    Ok(Some(command))
}

fn parse_number(raw: &str) -> Result<u32, ParseError> {
    raw.parse().map_err(|_| ParseError::BadNumber(raw.to_string()))
}

fn tab_arg(command: &'static str, arg: Option<&str>) -> Result<TabId, ParseError> {
    let raw = arg.ok_or(ParseError::MissingArgument {
        command,
        what: "tab id",
    })?;
    Ok(TabId(parse_number(raw)?))
}

fn no_arg(command: &'static str, arg: Option<&str>, parsed: Command) -> Result<Command, ParseError> {
    match arg {
        Some(_) => Err(ParseError::TooManyArguments(command)),
        None => Ok(parsed),
    }
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Click(_) => "click",
            Command::Shortcut => "shortcut",
            Command::Activate(_) => "activate",
            Command::Focus(_) => "focus",
            Command::Close(_) => "close",
            Command::Navigate(_) => "navigate",
            Command::Play(_) => "play",
            Command::Pause(_) => "pause",
            Command::Gesture(_) => "gesture",
            Command::NativeExit(_) => "native-exit",
            Command::State => "state",
            Command::Tabs => "tabs",
            Command::Help => "help",
            Command::Quit => "quit",
        }
    }
}

// =============================================================================
// EXECUTION
// =============================================================================

/// Run one command against the browser. Host events it causes reach the
/// coordinator through the normal event loop.
pub async fn execute(command: Command, host: &LocalHost, coordinator: &Coordinator) -> Flow {
    let result = match command {
        Command::Click(tab) => {
            host.click(tab);
            Ok(())
        }
        Command::Shortcut => {
            host.shortcut();
            Ok(())
        }
        Command::Activate(tab) => host.activate_tab(tab),
        Command::Focus(window) => host.focus_window(window),
        Command::Close(tab) => host.close_tab(tab),
        Command::Navigate(tab) => host.navigate(tab),
        Command::Play(tab) => host.play(tab).await,
        Command::Pause(tab) => host.pause(tab).map(|stopped| {
            println!("paused {stopped} video(s)");
        }),
        Command::Gesture(tab) => host.gesture(tab),
        Command::NativeExit(tab) => host.native_exit(tab).map(|closed| {
            if !closed {
                println!("{tab} has no PiP window");
            }
        }),
        Command::State => {
            print!("{}", render_state(host, coordinator));
            Ok(())
        }
        Command::Tabs => {
            print!("{}", render_tabs(host));
            Ok(())
        }
        Command::Help => {
            println!("{HELP}");
            Ok(())
        }
        Command::Quit => return Flow::Quit,
    };

    if let Err(e) = result {
        println!("{}: {e}", command.name());
    }
    Flow::Continue
}

fn show(tab: Option<TabId>) -> String {
    tab.map_or_else(|| "none".to_string(), |t| t.to_string())
}

pub fn render_state(host: &LocalHost, coordinator: &Coordinator) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "owner:   {}", show(coordinator.owner()));
    let _ = writeln!(out, "hint:    {}", show(coordinator.hint()));
    let _ = writeln!(out, "focused: {}", show(host.focused()));
    match host.badge() {
        Some(badge) => {
            let _ = writeln!(out, "badge:   {} ({})", badge.text, badge.color);
        }
        None => {
            let _ = writeln!(out, "badge:   none");
        }
    }
    out
}

pub fn render_tabs(host: &LocalHost) -> String {
    let focused = host.focused_window();
    let mut out = String::new();
    for summary in host.summaries() {
        let info = &summary.info;
        let mut flags = Vec::new();
        if info.active {
            flags.push(if Some(info.window) == focused {
                "focused"
            } else {
                "active"
            });
        }
        if summary.playing {
            flags.push("playing");
        }
        if summary.pip.is_some() {
            flags.push("pip");
        }
        if !info.is_scriptable() {
            flags.push("no-agent");
        }
        let _ = writeln!(
            out,
            "{:>7} {:>9}  {} video(s)  {:<40} {}",
            info.id.to_string(),
            info.window.to_string(),
            summary.videos,
            info.url,
            flags.join(",")
        );
    }
    out
}

/// One line per coordinator event.
pub fn describe_event(event: &Event) -> Option<String> {
    let line = match event {
        Event::OwnerChanged { previous, current } => {
            format!("owner {} -> {}", show(*previous), show(*current))
        }
        Event::HintChanged(hint) => format!("last playing tab: {}", show(*hint)),
        Event::ActivationFailed { tab, reason } => format!("PiP failed in {tab}: {reason}"),
        Event::BadgeShown(kind) => format!("badge shown: {kind:?}"),
        Event::BadgeCleared => "badge cleared".to_string(),
        Event::Shutdown | Event::Unknown => return None,
    };
    Some(line)
}
