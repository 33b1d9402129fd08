//! Control socket codes
//!
//! Commands flow from clients to the supervisor, events from the
//! supervisor to clients. Both are a single byte on the wire.

use crate::error::SocketError;

/// Commands accepted by the supervisor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    /// Begin shutting the system down
    Shutdown = 1,
    /// Acknowledge a shutdown event and let it proceed
    ContinueShutdown = 2,
    RestartKubelet = 3,
    RestartCrio = 4,
}

/// Events the supervisor announces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Event {
    Shutdown = 1,
}

impl From<Command> for u8 {
    fn from(command: Command) -> Self {
        command as u8
    }
}

impl TryFrom<u8> for Command {
    type Error = SocketError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Command::Shutdown),
            2 => Ok(Command::ContinueShutdown),
            3 => Ok(Command::RestartKubelet),
            4 => Ok(Command::RestartCrio),
            other => Err(SocketError::UnknownCommand(other)),
        }
    }
}

impl From<Event> for u8 {
    fn from(event: Event) -> Self {
        event as u8
    }
}

impl TryFrom<u8> for Event {
    type Error = SocketError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Event::Shutdown),
            other => Err(SocketError::UnknownEvent(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_codes() {
        assert_eq!(u8::from(Command::Shutdown), 1);
        assert_eq!(u8::from(Command::ContinueShutdown), 2);
        assert_eq!(u8::from(Command::RestartKubelet), 3);
        assert_eq!(u8::from(Command::RestartCrio), 4);

        for code in 1..=4u8 {
            assert_eq!(u8::from(Command::try_from(code).unwrap()), code);
        }
    }

    #[test]
    fn test_unknown_codes() {
        assert!(matches!(Command::try_from(0), Err(SocketError::UnknownCommand(0))));
        assert!(matches!(Command::try_from(5), Err(SocketError::UnknownCommand(5))));
        assert!(matches!(Event::try_from(2), Err(SocketError::UnknownEvent(2))));
    }

    #[test]
    fn test_event_codes() {
        assert_eq!(Event::try_from(1).unwrap(), Event::Shutdown);
        assert_eq!(u8::from(Event::Shutdown), 1);
    }
}
