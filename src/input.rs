use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

/// Why the kiosk is shutting down. Both end the process successfully.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Exit {
    /// Interrupt or terminate signal, Ctrl-C or `q`.
    Quit,
    /// The cancel key (Esc).
    Cancel,
}

pub trait Input {
    /// Drain pending input without blocking and report the first exit request, if any.
    fn poll_exit(&mut self) -> io::Result<Option<Exit>>;
}

/// `None` is a kiosk without terminal input, which only signals can stop.
impl<I: Input> Input for Option<I> {
    fn poll_exit(&mut self) -> io::Result<Option<Exit>> {
        match self {
            Some(input) => input.poll_exit(),
            None => Ok(None),
        }
    }
}

/// Key input from the controlling terminal, which is kept in raw mode while this exists.
pub struct Keyboard {
    _raw_mode: (),
}

impl Keyboard {
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self { _raw_mode: () })
    }
}

impl Input for Keyboard {
    fn poll_exit(&mut self) -> io::Result<Option<Exit>> {
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if let Some(exit) = exit_for(&key) {
                    return Ok(Some(exit));
                }
            }
        }
        Ok(None)
    }
}

impl Drop for Keyboard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

pub fn exit_for(key: &KeyEvent) -> Option<Exit> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    match key.code {
        KeyCode::Esc => Some(Exit::Cancel),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Exit::Quit),
        KeyCode::Char('q') => Some(Exit::Quit),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use crossterm::event::KeyEventState;
    use test_case::test_case;

    use super::*;

    #[test_case(KeyCode::Esc, KeyModifiers::NONE, Some(Exit::Cancel))]
    #[test_case(KeyCode::Char('c'), KeyModifiers::CONTROL, Some(Exit::Quit))]
    #[test_case(KeyCode::Char('q'), KeyModifiers::NONE, Some(Exit::Quit))]
    #[test_case(KeyCode::Char('c'), KeyModifiers::NONE, None)]
    #[test_case(KeyCode::Enter, KeyModifiers::NONE, None)]
    fn test_exit_keys(code: KeyCode, modifiers: KeyModifiers, expected: Option<Exit>) {
        assert_eq!(exit_for(&KeyEvent::new(code, modifiers)), expected);
    }

    #[test]
    fn test_key_release_is_ignored() {
        let key = KeyEvent {
            code: KeyCode::Esc,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };

        assert_eq!(exit_for(&key), None);
    }

    struct Pressed(Exit);

    impl Input for Pressed {
        fn poll_exit(&mut self) -> io::Result<Option<Exit>> {
            Ok(Some(self.0))
        }
    }

    #[test]
    fn test_absent_input_never_exits() {
        let mut input: Option<Pressed> = None;

        assert_eq!(input.poll_exit().unwrap(), None);
        assert_eq!(input.poll_exit().unwrap(), None);
    }

    #[test]
    fn test_present_input_is_polled() {
        let mut input = Some(Pressed(Exit::Cancel));

        assert_eq!(input.poll_exit().unwrap(), Some(Exit::Cancel));
    }
}
