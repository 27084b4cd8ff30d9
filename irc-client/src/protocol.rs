//! The small slice of the IRC line protocol this client understands.

const PING: &str = "PING";
const PONG: &str = "PONG";
const ERROR: &str = "ERROR";
const EXIT_COMMAND: &str = "exit";

/// Identity sent in the registration handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub nickname: String,
    pub realname: String,
    pub server_host: String,
}

impl Registration {
    /// `USER` then `NICK`, in the order they must be sent.
    pub fn lines(&self) -> [String; 2] {
        [
            format!(
                "USER {} localhost {} :{}",
                self.nickname, self.server_host, self.realname
            ),
            format!("NICK {}", self.nickname),
        ]
    }
}

/// How the reader loop should react to an inbound line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inbound<'a> {
    /// The server reported a fatal error; the session is over.
    Fatal,
    /// Liveness check carrying the token to echo back.
    Ping(&'a str),
    Other,
}

/// Classifies an inbound line.
///
/// `ERROR` is matched anywhere in the line, case-sensitively. `PING` must be
/// a whole whitespace-separated token, so nicknames or text that merely
/// contain the letters are not answered; the reply token is the one right
/// after it. A bare `PING` with no token is treated as ordinary traffic.
pub fn classify(line: &str) -> Inbound<'_> {
    if line.contains(ERROR) {
        return Inbound::Fatal;
    }

    let mut tokens = line.split_whitespace();
    if tokens.by_ref().any(|token| token == PING) {
        if let Some(token) = tokens.next() {
            return Inbound::Ping(token);
        }
    }

    Inbound::Other
}

pub fn pong(token: &str) -> String {
    format!("{PONG} {token}")
}

/// True when operator input asks to leave, in any letter case.
pub fn is_exit_command(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case(EXIT_COMMAND)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_sends_user_before_nick() {
        let registration = Registration {
            nickname: "vb".into(),
            realname: "Playing with Rust IRC".into(),
            server_host: "irc.freenode.net".into(),
        };

        let [user, nick] = registration.lines();
        assert_eq!(
            user,
            "USER vb localhost irc.freenode.net :Playing with Rust IRC"
        );
        assert_eq!(nick, "NICK vb");
    }

    #[test]
    fn ping_token_is_echoed_untouched() {
        for (line, token) in [
            ("PING :server1", ":server1"),
            ("PING 12345", "12345"),
            (":irc.example.net PING :LAG1700000000", ":LAG1700000000"),
            ("PING :tok extra words", ":tok"),
        ] {
            assert_eq!(classify(line), Inbound::Ping(token), "line: {line}");
        }
        assert_eq!(pong(":server1"), "PONG :server1");
    }

    #[test]
    fn ping_inside_a_longer_token_is_not_a_liveness_check() {
        assert_eq!(
            classify(":PINGU!u@host PRIVMSG #rust :hello"),
            Inbound::Other
        );
        assert_eq!(classify(":a!b@c PRIVMSG #rust :xPINGx"), Inbound::Other);
        assert_eq!(classify("PING"), Inbound::Other);
    }

    #[test]
    fn error_is_matched_anywhere_and_case_sensitive() {
        assert_eq!(classify("ERROR :Closing Link"), Inbound::Fatal);
        assert_eq!(
            classify(":a!b@c PRIVMSG #rust :saw an ERROR today"),
            Inbound::Fatal
        );
        assert_eq!(classify("PING :ERROR"), Inbound::Fatal);
        assert_eq!(classify(":a!b@c PRIVMSG #rust :error"), Inbound::Other);
    }

    #[test]
    fn exit_command_ignores_case_and_surrounding_space() {
        for input in ["exit", "EXIT", "Exit", "  exit  ", "eXiT\r"] {
            assert!(is_exit_command(input), "input: {input:?}");
        }
        for input in ["exit now", "quit", "", "/exit"] {
            assert!(!is_exit_command(input), "input: {input:?}");
        }
    }
}
