//! TableBrain CLI
//!
//! Runs one command against a store and prints the JSON reply.

use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::Value;
use tablebrain::{AddressSource, Brain, Command, Config, Placement};
use tracing_subscriber::{fmt, EnvFilter};

/// TableBrain CLI
#[derive(Parser, Debug)]
#[command(name = "tablebrain-cli")]
#[command(about = "CLI for the TableBrain data structure store")]
#[command(version)]
struct Args {
    /// Store address (defaults to SQLITE_*_URL / SQLITE_URL / DATABASE_URL)
    #[arg(short, long)]
    url: Option<String>,

    /// Backing table name
    #[arg(short, long)]
    table: Option<String>,

    /// Key namespace prefix
    #[arg(short, long)]
    prefix: Option<String>,

    /// Give up after this many milliseconds (0 waits forever)
    #[arg(long, default_value = "10000")]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

/// Values are parsed as JSON, falling back to a plain string
#[derive(Subcommand, Debug)]
enum Commands {
    /// Check the store is reachable
    Ping,
    /// Get a scalar
    Get { key: String },
    /// Set a scalar
    Set { key: String, value: String },
    /// Delete a key
    Del { key: String },
    /// Increment an integer scalar
    Incrby {
        key: String,
        #[arg(default_value = "1", allow_negative_numbers = true)]
        delta: i64,
    },
    /// Decrement an integer scalar
    Decrby {
        key: String,
        #[arg(default_value = "1", allow_negative_numbers = true)]
        delta: i64,
    },
    /// Prepend to a list
    Lpush { key: String, value: String },
    /// Append to a list
    Rpush { key: String, value: String },
    /// Pop the head of a list
    Lpop { key: String },
    /// Pop the tail of a list
    Rpop { key: String },
    /// List length
    Llen { key: String },
    /// List element by index
    Lindex {
        key: String,
        #[arg(allow_negative_numbers = true)]
        index: i64,
    },
    /// Inclusive slice of a list
    Lrange {
        key: String,
        #[arg(allow_negative_numbers = true)]
        start: i64,
        #[arg(allow_negative_numbers = true)]
        end: i64,
    },
    /// Overwrite a list element by index
    Lset {
        key: String,
        #[arg(allow_negative_numbers = true)]
        index: i64,
        value: String,
    },
    /// Insert next to a pivot element (BEFORE or AFTER)
    Linsert {
        key: String,
        placement: String,
        pivot: String,
        value: String,
    },
    /// Remove every occurrence of a value from a list
    Lrem { key: String, value: String },
    /// Add a set member
    Sadd { key: String, value: String },
    /// Remove a set member
    Srem { key: String, value: String },
    /// Test set membership
    Sismember { key: String, value: String },
    /// Set cardinality
    Scard { key: String },
    /// All set members
    Smembers { key: String },
    /// A random set member
    Srandmember { key: String },
    /// Remove and return a set member
    Spop { key: String },
    /// Set a hash field
    Hset {
        table: String,
        field: String,
        value: String,
    },
    /// Get a hash field
    Hget { table: String, field: String },
    /// Delete a hash field
    Hdel { table: String, field: String },
    /// All fields of a hash
    Hgetall { table: String },
    /// Field names of a hash
    Hkeys { table: String },
    /// Field values of a hash
    Hvals { table: String },
    /// Number of fields in a hash
    Hlen { table: String },
    /// Whether a hash field exists
    Hexists { table: String, field: String },
    /// Increment an integer hash field
    Hincrby {
        table: String,
        field: String,
        #[arg(default_value = "1", allow_negative_numbers = true)]
        delta: i64,
    },
    /// Whether a key exists
    Exists { key: String },
    /// Stored shape of a key
    Type { key: String },
    /// Keys starting with a prefix
    Keys {
        #[arg(default_value = "")]
        prefix: String,
    },
}

impl Commands {
    fn into_command(self) -> tablebrain::Result<Command> {
        Ok(match self {
            Commands::Ping => Command::Ping,
            Commands::Get { key } => Command::Get { key },
            Commands::Set { key, value } => Command::Set {
                key,
                value: parse_value(&value),
            },
            Commands::Del { key } => Command::Del { key },
            Commands::Incrby { key, delta } => Command::IncrBy { key, delta },
            Commands::Decrby { key, delta } => Command::DecrBy { key, delta },
            Commands::Lpush { key, value } => Command::LPush {
                key,
                value: parse_value(&value),
            },
            Commands::Rpush { key, value } => Command::RPush {
                key,
                value: parse_value(&value),
            },
            Commands::Lpop { key } => Command::LPop { key },
            Commands::Rpop { key } => Command::RPop { key },
            Commands::Llen { key } => Command::LLen { key },
            Commands::Lindex { key, index } => Command::LIndex { key, index },
            Commands::Lrange { key, start, end } => Command::LRange { key, start, end },
            Commands::Lset { key, index, value } => Command::LSet {
                key,
                index,
                value: parse_value(&value),
            },
            Commands::Linsert {
                key,
                placement,
                pivot,
                value,
            } => Command::LInsert {
                key,
                placement: placement.parse::<Placement>()?,
                pivot: parse_value(&pivot),
                value: parse_value(&value),
            },
            Commands::Lrem { key, value } => Command::LRem {
                key,
                value: parse_value(&value),
            },
            Commands::Sadd { key, value } => Command::SAdd {
                key,
                value: parse_value(&value),
            },
            Commands::Srem { key, value } => Command::SRem {
                key,
                value: parse_value(&value),
            },
            Commands::Sismember { key, value } => Command::SIsMember {
                key,
                value: parse_value(&value),
            },
            Commands::Scard { key } => Command::SCard { key },
            Commands::Smembers { key } => Command::SMembers { key },
            Commands::Srandmember { key } => Command::SRandMember { key },
            Commands::Spop { key } => Command::SPop { key },
            Commands::Hset {
                table,
                field,
                value,
            } => Command::HSet {
                table,
                field,
                value: parse_value(&value),
            },
            Commands::Hget { table, field } => Command::HGet { table, field },
            Commands::Hdel { table, field } => Command::HDel { table, field },
            Commands::Hgetall { table } => Command::HGetAll { table },
            Commands::Hkeys { table } => Command::HKeys { table },
            Commands::Hvals { table } => Command::HVals { table },
            Commands::Hlen { table } => Command::HLen { table },
            Commands::Hexists { table, field } => Command::HExists { table, field },
            Commands::Hincrby {
                table,
                field,
                delta,
            } => Command::HIncrBy {
                table,
                field,
                delta,
            },
            Commands::Exists { key } => Command::Exists { key },
            Commands::Type { key } => Command::Type { key },
            Commands::Keys { prefix } => Command::Keys { prefix },
        })
    }
}

fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[tokio::main]
async fn main() {
    // Initialize tracing/logging (stderr, so stdout carries only the reply)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tablebrain=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let (mut config, source) = Config::from_env();
    match &source {
        AddressSource::Provider(var) | AddressSource::Generic(var) => {
            tracing::info!("Discovered store from {} environment variable", var)
        }
        AddressSource::Default => tracing::info!("Using default store {}", config.url),
    }

    if let Some(url) = args.url {
        config.url = url;
    }
    if let Some(table) = args.table {
        config.table_name = table;
    }
    if let Some(prefix) = args.prefix {
        config.key_prefix = prefix;
    }

    let command = match args.command.into_command() {
        Ok(command) => command,
        Err(e) => {
            tracing::error!("Invalid command: {}", e);
            process::exit(2);
        }
    };

    let brain = match Brain::open(config) {
        Ok(brain) => brain,
        Err(e) => {
            tracing::error!("Failed to open store: {}", e);
            process::exit(1);
        }
    };

    let reply = if args.timeout_ms == 0 {
        brain.execute(command).await
    } else {
        match tokio::time::timeout(Duration::from_millis(args.timeout_ms), brain.execute(command))
            .await
        {
            Ok(reply) => reply,
            Err(_) => {
                tracing::error!("Timed out after {} ms waiting for the store", args.timeout_ms);
                process::exit(1);
            }
        }
    };

    match reply {
        Ok(value) => println!("{}", value),
        Err(e) => {
            tracing::error!("Command failed: {}", e);
            process::exit(1);
        }
    }

    if let Err(e) = brain.close().await {
        tracing::error!("Failed to close store: {}", e);
        process::exit(1);
    }
}
