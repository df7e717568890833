//! Parsing of the line commands typed at the prompt.
//!
//! Todos can be referred to by their id or by their 1-based position in the
//! list as last displayed.

use thiserror::Error;
use todo_core::{FilterMode, Intent, Priority};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Intent(Intent),
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty command")]
    Empty,

    #[error("unknown command {0:?}, try `help`")]
    Unknown(String),

    #[error("`{command}` needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("no todo at position {0}")]
    BadPosition(usize),

    #[error("unknown priority {0:?}, expected none, first or second")]
    BadPriority(String),

    #[error("unknown filter {0:?}, expected all, active or completed")]
    BadFilter(String),
}

pub const HELP: &str = "\
commands:
  add <text>                 add a todo
  edit <n|id> <text>         change a todo's text
  done <n|id>                toggle completion
  prio <n|id> <none|first|second>
  rm <n|id>                  delete a todo
  user <name>                switch user
  filter <all|active|completed>
  help | quit";

/// Parse one input line. `visible` holds the ids of the displayed todos, in
/// display order.
pub fn parse(line: &str, visible: &[String]) -> Result<Command, ParseError> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let intent = match verb {
        "" => return Err(ParseError::Empty),
        "help" | "?" => return Ok(Command::Help),
        "quit" | "exit" | "q" => return Ok(Command::Quit),
        "add" => Intent::Add {
            contents: required(rest, "add", "some text")?.to_string(),
        },
        "edit" => {
            let (target, contents) = split_target(rest, "edit")?;
            Intent::Edit {
                id: resolve(target, visible)?,
                contents: required(contents, "edit", "the new text")?.to_string(),
            }
        }
        "done" | "toggle" => Intent::Toggle {
            id: resolve(required(rest, "done", "a todo")?, visible)?,
        },
        "rm" | "delete" => Intent::Delete {
            id: resolve(required(rest, "rm", "a todo")?, visible)?,
        },
        "prio" | "priority" => {
            let (target, priority) = split_target(rest, "prio")?;
            Intent::SetPriority {
                id: resolve(target, visible)?,
                priority: parse_priority(required(priority, "prio", "a priority")?)?,
            }
        }
        "user" => Intent::SelectUser {
            name: required(rest, "user", "a user name")?.to_string(),
        },
        "filter" => Intent::SelectFilter {
            mode: parse_filter(required(rest, "filter", "a filter")?)?,
        },
        "all" | "active" | "completed" => Intent::SelectFilter {
            mode: parse_filter(verb)?,
        },
        other => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(Command::Intent(intent))
}

fn required<'a>(value: &'a str, command: &'static str, argument: &'static str) -> Result<&'a str, ParseError> {
    if value.is_empty() {
        Err(ParseError::MissingArgument { command, argument })
    } else {
        Ok(value)
    }
}

fn split_target<'a>(rest: &'a str, command: &'static str) -> Result<(&'a str, &'a str), ParseError> {
    let rest = required(rest, command, "a todo")?;
    Ok(match rest.split_once(char::is_whitespace) {
        Some((target, tail)) => (target, tail.trim()),
        None => (rest, ""),
    })
}

fn resolve(target: &str, visible: &[String]) -> Result<String, ParseError> {
    match target.parse::<usize>() {
        Ok(position) => position
            .checked_sub(1)
            .and_then(|index| visible.get(index))
            .cloned()
            .ok_or(ParseError::BadPosition(position)),
        Err(_) => Ok(target.to_string()),
    }
}

fn parse_priority(raw: &str) -> Result<Priority, ParseError> {
    match raw.to_ascii_lowercase().as_str() {
        "none" | "0" => Ok(Priority::None),
        "first" | "1" => Ok(Priority::First),
        "second" | "2" => Ok(Priority::Second),
        _ => Err(ParseError::BadPriority(raw.to_string())),
    }
}

fn parse_filter(raw: &str) -> Result<FilterMode, ParseError> {
    match raw.to_ascii_lowercase().as_str() {
        "all" => Ok(FilterMode::All),
        "active" => Ok(FilterMode::Active),
        "completed" | "done" => Ok(FilterMode::Completed),
        _ => Err(ParseError::BadFilter(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visible() -> Vec<String> {
        vec!["a1".to_string(), "b2".to_string()]
    }

    fn intent(line: &str) -> Intent {
        match parse(line, &visible()).unwrap() {
            Command::Intent(intent) => intent,
            other => panic!("expected intent, got {other:?}"),
        }
    }

    #[test]
    fn add_keeps_the_whole_text() {
        assert_eq!(
            intent("add  buy oat milk "),
            Intent::Add {
                contents: "buy oat milk".to_string()
            }
        );
    }

    #[test]
    fn positions_resolve_to_displayed_ids() {
        assert_eq!(intent("done 2"), Intent::Toggle { id: "b2".to_string() });
        assert_eq!(intent("rm a1"), Intent::Delete { id: "a1".to_string() });
        assert_eq!(parse("rm 3", &visible()), Err(ParseError::BadPosition(3)));
        assert_eq!(parse("rm 0", &visible()), Err(ParseError::BadPosition(0)));
    }

    #[test]
    fn edit_and_priority_take_a_target_and_value() {
        assert_eq!(
            intent("edit 1 walk the cat"),
            Intent::Edit {
                id: "a1".to_string(),
                contents: "walk the cat".to_string()
            }
        );
        assert_eq!(
            intent("prio 2 first"),
            Intent::SetPriority {
                id: "b2".to_string(),
                priority: Priority::First
            }
        );
        assert!(matches!(parse("prio 2 urgent", &visible()), Err(ParseError::BadPriority(_))));
        assert!(matches!(parse("edit 1", &visible()), Err(ParseError::MissingArgument { .. })));
    }

    #[test]
    fn filters_and_users() {
        assert_eq!(intent("filter completed"), Intent::SelectFilter { mode: FilterMode::Completed });
        assert_eq!(intent("active"), Intent::SelectFilter { mode: FilterMode::Active });
        assert_eq!(intent("user bo"), Intent::SelectUser { name: "bo".to_string() });
        assert!(matches!(parse("filter later", &visible()), Err(ParseError::BadFilter(_))));
    }

    #[test]
    fn control_commands() {
        assert_eq!(parse("  ", &visible()), Err(ParseError::Empty));
        assert_eq!(parse("help", &visible()), Ok(Command::Help));
        assert_eq!(parse("quit", &visible()), Ok(Command::Quit));
        assert!(matches!(parse("dance", &visible()), Err(ParseError::Unknown(_))));
        assert!(matches!(parse("add", &visible()), Err(ParseError::MissingArgument { command: "add", .. })));
    }
}
