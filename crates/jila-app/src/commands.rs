// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Line commands driving the headless runner.
//
//   title <text>      set the Title input
//   message <text>    set the Message input
//   grant             Grant permission
//   error             GetError
//   push              Push Notification
//   open              Open folder
//   first             Get first item from opened folder
//   resize <w> <h>    window resized
//   quit

use crate::app::{AppEvent, UiAction};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Action(UiAction),
    Event(AppEvent),
}

/// Parse one input line. `None` for blank or unrecognised lines.
pub fn parse(line: &str) -> Option<Command> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (word, rest) = match line.trim_start().split_once(' ') {
        Some((word, rest)) => (word, rest),
        None => (line.trim(), ""),
    };

    let command = match word {
        "title" => Command::Action(UiAction::SetTitle(rest.to_owned())),
        "message" => Command::Action(UiAction::SetMessage(rest.to_owned())),
        "grant" => Command::Action(UiAction::GrantPermission),
        "error" => Command::Action(UiAction::GetError),
        "push" => Command::Action(UiAction::PushNotification),
        "open" => Command::Action(UiAction::OpenFolder),
        "first" => Command::Action(UiAction::FirstItem),
        "resize" => {
            let mut dims = rest.split_whitespace().map(str::parse::<u32>);
            match (dims.next(), dims.next(), dims.next()) {
                (Some(Ok(width)), Some(Ok(height)), None) => {
                    Command::Event(AppEvent::Resized { width, height })
                }
                _ => return None,
            }
        }
        "quit" | "exit" => Command::Event(AppEvent::Quit),
        _ => return None,
    };
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_commands_keep_the_rest_of_the_line() {
        assert_eq!(
            parse("title Hello there"),
            Some(Command::Action(UiAction::SetTitle("Hello there".into())))
        );
        assert_eq!(
            parse("message \r\n"),
            Some(Command::Action(UiAction::SetMessage(String::new())))
        );
        assert_eq!(
            parse("title"),
            Some(Command::Action(UiAction::SetTitle(String::new())))
        );
    }

    #[test]
    fn buttons_and_events() {
        assert_eq!(parse("push"), Some(Command::Action(UiAction::PushNotification)));
        assert_eq!(parse("  first  "), Some(Command::Action(UiAction::FirstItem)));
        assert_eq!(
            parse("resize 1280 720"),
            Some(Command::Event(AppEvent::Resized {
                width: 1280,
                height: 720
            }))
        );
        assert_eq!(parse("quit"), Some(Command::Event(AppEvent::Quit)));
    }

    #[test]
    fn rejects_unknown_and_malformed() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("dance"), None);
        assert_eq!(parse("resize 1280"), None);
        assert_eq!(parse("resize wide tall"), None);
        assert_eq!(parse("resize 1 2 3"), None);
    }
}
