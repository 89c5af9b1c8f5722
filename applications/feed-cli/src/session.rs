//! Terminal session: typed commands in, feed events out

use crate::error::{CliError, Result};
use fuplay_core::MediaItem;
use fuplay_feed::{FeedCommand, FeedEvent, SeekBarEvent, SlotState};
use std::str::FromStr;

pub const HELP: &str = "\
Commands:
  n, next         focus the next video
  p, prev         focus the previous video
  t, tap          play/pause the focused video
  f N             focus video N (1-based)
  s P             seek the focused video to P percent
  bg, fg          send the screen to the background / foreground
  h, help         show this help
  q, quit         stop playback and exit";

/// One line of user input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Next,
    Previous,
    Toggle,
    Focus(usize),
    Seek(u8),
    Background,
    Foreground,
    Help,
    Quit,
}

impl FromStr for Input {
    type Err = CliError;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default();
        let argument = words.next();

        let number = |what: &str| -> Result<usize> {
            argument
                .ok_or_else(|| CliError::InvalidInput(format!("{command} needs {what}")))?
                .parse()
                .map_err(|_| CliError::InvalidInput(format!("{command} needs {what}")))
        };

        match command {
            "n" | "next" => Ok(Self::Next),
            "p" | "prev" => Ok(Self::Previous),
            "t" | "tap" => Ok(Self::Toggle),
            "f" | "focus" => {
                let n = number("a video number")?;
                if n == 0 {
                    return Err(CliError::InvalidInput("videos are numbered from 1".into()));
                }
                Ok(Self::Focus(n))
            }
            "s" | "seek" => {
                let percent = number("a percentage")?;
                match u8::try_from(percent) {
                    Ok(percent) if percent <= 100 => Ok(Self::Seek(percent)),
                    _ => Err(CliError::InvalidInput(format!("{percent}% is past the end"))),
                }
            }
            "bg" => Ok(Self::Background),
            "fg" => Ok(Self::Foreground),
            "h" | "help" | "?" => Ok(Self::Help),
            "q" | "quit" | "exit" => Ok(Self::Quit),
            other => Err(CliError::InvalidInput(format!("unknown command '{other}'"))),
        }
    }
}

/// Tracks what the user sees and renders events for the terminal
#[derive(Debug)]
pub struct Session {
    items: Vec<MediaItem>,
    focused: Option<usize>,
    last_decile: Option<u8>,
    json: bool,
}

impl Session {
    pub fn new(items: Vec<MediaItem>, json: bool) -> Self {
        Self {
            items,
            focused: None,
            last_decile: None,
            json,
        }
    }

    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    /// Feed commands for one line of input
    pub fn commands(&self, input: Input) -> Result<Vec<FeedCommand>> {
        let commands = match input {
            Input::Next => vec![FeedCommand::Advance],
            Input::Previous => vec![FeedCommand::Retreat],
            Input::Toggle => vec![FeedCommand::TapFocused],
            Input::Focus(n) => {
                if n > self.items.len() {
                    return Err(CliError::InvalidInput(format!(
                        "there are only {} videos",
                        self.items.len()
                    )));
                }
                vec![FeedCommand::Focus(n - 1)]
            }
            Input::Seek(percent) => {
                let index = self
                    .focused
                    .ok_or_else(|| CliError::InvalidInput("nothing is focused".into()))?;
                [
                    SeekBarEvent::StartTracking,
                    SeekBarEvent::Changed {
                        percent,
                        from_user: true,
                    },
                    SeekBarEvent::StopTracking,
                ]
                .into_iter()
                .map(|event| FeedCommand::SeekBar { index, event })
                .collect()
            }
            Input::Background => vec![FeedCommand::Background],
            Input::Foreground => vec![FeedCommand::Foreground],
            Input::Help | Input::Quit => Vec::new(),
        };
        Ok(commands)
    }

    /// Update the view for `event`; returns a line to print, if any
    pub fn observe(&mut self, event: &FeedEvent) -> Option<String> {
        if let FeedEvent::FocusChanged { current, .. } = event {
            self.focused = Some(*current);
            self.last_decile = None;
        }

        if self.json {
            return serde_json::to_string(event).ok();
        }

        match event {
            FeedEvent::FocusChanged { current, .. } => {
                let item = self.items.get(*current)?;
                Some(format!(
                    "[{}/{}] {} ({}) in {}",
                    current + 1,
                    self.items.len(),
                    item.display_name,
                    item.formatted_duration(),
                    item.folder_name
                ))
            }
            FeedEvent::Progress { index, percent } => {
                if Some(*index) != self.focused {
                    return None;
                }
                let decile = percent / 10;
                if self.last_decile == Some(decile) {
                    return None;
                }
                self.last_decile = Some(decile);
                Some(format!("  {}", progress_bar(*percent)))
            }
            FeedEvent::PlaybackError { index, error } => {
                let name = self.name(*index);
                Some(format!("  cannot play {name}: {}", error.reason()))
            }
            FeedEvent::PlayingChanged { index, playing } => {
                if Some(*index) != self.focused {
                    return None;
                }
                let verb = if *playing { "playing" } else { "paused" };
                Some(format!("  {verb}"))
            }
            FeedEvent::StateChanged {
                index: Some(index),
                state: SlotState::Ended,
                ..
            } => Some(format!("  finished {}", self.name(*index))),
            FeedEvent::StateChanged { .. } => None,
        }
    }

    fn name(&self, index: usize) -> &str {
        self.items
            .get(index)
            .map_or("?", |item| item.display_name.as_str())
    }
}

fn progress_bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) / 5;
    format!("[{}{}] {percent:>3}%", "#".repeat(filled), "-".repeat(20 - filled))
}
