use clap::{Args, Parser};

use crate::protocol::Registration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub client: ClientArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ClientArgs {
    /// IRC server to connect to.
    #[arg(long, default_value = "irc.freenode.net")]
    pub host: String,

    /// Port of the IRC server.
    #[arg(long, default_value_t = 6667)]
    pub port: u16,

    /// Nickname sent in the USER and NICK registration lines.
    #[arg(long, default_value = "vb")]
    pub nickname: String,

    /// Real name sent in the USER registration line.
    #[arg(long, default_value = "Playing with Rust IRC")]
    pub realname: String,
}

impl ClientArgs {
    pub fn registration(&self) -> Registration {
        Registration {
            nickname: self.nickname.clone(),
            realname: self.realname.clone(),
            server_host: self.host.clone(),
        }
    }
}
