pub mod hash_commands;
pub mod key_commands;
pub mod reply;
pub mod session;
pub mod string_commands;

use std::sync::Arc;

pub use reply::Reply;
pub use session::Session;

use crate::keyspace::{Keyspace, system_now_ms};
use crate::util::ByteSequence;

/// A parsed command frame: uppercase-insensitive name plus raw byte
/// arguments. Wire decoding happens upstream of this layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub args: Vec<ByteSequence>,
}

impl Command {
    pub fn new(name: impl Into<String>, args: Vec<ByteSequence>) -> Self {
        Command {
            name: name.into(),
            args,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    fn accepts(self, n: usize) -> bool {
        match self {
            Arity::Exact(expected) => n == expected,
            Arity::AtLeast(minimum) => n >= minimum,
        }
    }
}

/// Routes parsed commands to their executors and translates every core
/// result or failure into a [`Reply`].
pub struct CommandDispatcher {
    keyspace: Arc<Keyspace>,
    clock: fn() -> i64,
}

impl CommandDispatcher {
    pub fn new(keyspace: Arc<Keyspace>) -> Self {
        CommandDispatcher {
            keyspace,
            clock: system_now_ms,
        }
    }

    /// Injects a clock, so tests can pin "now" for expiration checks.
    pub fn with_clock(keyspace: Arc<Keyspace>, clock: fn() -> i64) -> Self {
        CommandDispatcher { keyspace, clock }
    }

    pub fn keyspace(&self) -> &Arc<Keyspace> {
        &self.keyspace
    }

    pub fn dispatch(&self, session: &mut Session, command: &Command) -> Reply {
        let name = command.name.to_ascii_uppercase();
        let args = command.args.as_slice();

        let arity = match name.as_str() {
            "SCAN" | "DEL" | "EXISTS" | "MGET" => Arity::AtLeast(1),
            "GET" | "STRLEN" | "INCR" | "DECR" | "PTTL" => Arity::Exact(1),
            "SET" | "GETSET" | "APPEND" | "INCRBY" | "DECRBY" | "INCRBYFLOAT" | "PEXPIREAT"
            | "HGET" => Arity::Exact(2),
            "HSET" => Arity::AtLeast(3),
            "HMGET" => Arity::AtLeast(2),
            _ => {
                return Reply::Error(format!("ERR unknown command '{}'", command.name));
            }
        };
        if !arity.accepts(args.len()) {
            return Reply::Error(format!(
                "ERR wrong number of arguments for '{}' command",
                name.to_ascii_lowercase()
            ));
        }

        let keyspace = self.keyspace.as_ref();
        let now_ms = (self.clock)();

        match name.as_str() {
            "SCAN" => key_commands::scan(keyspace, session, args),
            "DEL" => key_commands::del(keyspace, now_ms, args),
            "EXISTS" => key_commands::exists(keyspace, now_ms, args),
            "PEXPIREAT" => key_commands::pexpireat(keyspace, now_ms, args),
            "PTTL" => key_commands::pttl(keyspace, now_ms, args),
            "GET" => string_commands::get(keyspace, now_ms, args),
            "SET" => string_commands::set(keyspace, args),
            "GETSET" => string_commands::getset(keyspace, now_ms, args),
            "STRLEN" => string_commands::strlen(keyspace, now_ms, args),
            "APPEND" => string_commands::append(keyspace, now_ms, args),
            "INCR" => string_commands::incr(keyspace, now_ms, args),
            "INCRBY" => string_commands::incrby(keyspace, now_ms, args),
            "DECR" => string_commands::decr(keyspace, now_ms, args),
            "DECRBY" => string_commands::decrby(keyspace, now_ms, args),
            "INCRBYFLOAT" => string_commands::incrbyfloat(keyspace, now_ms, args),
            "MGET" => string_commands::mget(keyspace, now_ms, args),
            "HSET" => hash_commands::hset(keyspace, now_ms, args),
            "HGET" => hash_commands::hget(keyspace, now_ms, args),
            "HMGET" => hash_commands::hmget(keyspace, now_ms, args),
            _ => Reply::Error(format!("ERR unknown command '{}'", command.name)),
        }
    }
}
