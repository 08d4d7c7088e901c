use anyhow::anyhow;
use clap::Parser;
use hoptrace_core::{
    defaults, Destination, HeaderMode, ProbeMatching, MAX_PACKET_SIZE, MIN_PACKET_SIZE,
};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

/// Trace the route to an IPv4 host, one ICMP echo probe per hop
#[derive(Parser, Debug)]
#[command(name = "hoptrace", author, version, about, long_about = None, arg_required_else_help(true))]
pub struct Args {
    /// The IPv4 address to trace
    #[arg(required_unless_present("destination"))]
    pub target: Option<String>,

    /// The IPv4 address to trace
    #[arg(short = 'd', long, conflicts_with = "target")]
    pub destination: Option<String>,

    /// The log level, by name or 0-5 [default: warn]
    #[arg(short = 'v', long, value_parser = parse_log_level)]
    pub verbose: Option<LogLevel>,

    /// The log filter directive, overrides --verbose
    #[arg(long)]
    pub log_filter: Option<String>,

    /// The TTL to start from [default: 2]
    #[arg(long)]
    pub first_ttl: Option<u8>,

    /// The maximum number of TTL hops [default: 31]
    #[arg(long)]
    pub max_ttl: Option<u8>,

    /// The time to wait for a reply to each probe [default: 15s]
    #[arg(long, value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// The longest single wait for incoming data [default: 5s]
    #[arg(long, value_parser = parse_duration)]
    pub poll_slice: Option<Duration>,

    /// The size of each probe, IPv4 header included [default: 64]
    #[arg(long)]
    pub packet_size: Option<u16>,

    /// Let the kernel build the IPv4 header of each probe
    #[arg(long)]
    pub kernel_header: bool,

    /// Accept any echo reply or time exceeded message as the reply to a probe
    #[arg(long)]
    pub lenient: bool,
}

/// The level to log at.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "off" | "0" => Ok(Self::Off),
            "error" | "1" => Ok(Self::Error),
            "warn" | "2" => Ok(Self::Warn),
            "info" | "3" => Ok(Self::Info),
            "debug" | "4" => Ok(Self::Debug),
            "trace" | "5" => Ok(Self::Trace),
            _ => Err(anyhow!(
                "unknown log level '{s}', expected one of off, error, warn, info, debug, trace or 0-5"
            )),
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Off => write!(f, "off"),
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

/// Fully parsed and validated configuration.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct HoptraceConfig {
    pub destination: Destination,
    pub log_filter: String,
    pub first_ttl: u8,
    pub max_ttl: u8,
    pub probe_timeout: Duration,
    pub poll_slice: Duration,
    pub packet_size: u16,
    pub header_mode: HeaderMode,
    pub probe_matching: ProbeMatching,
}

impl TryFrom<Args> for HoptraceConfig {
    type Error = anyhow::Error;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let destination = args
            .destination
            .or(args.target)
            .ok_or_else(|| anyhow!("missing destination"))?;
        let destination = Destination::from_str(&destination)?;
        let log_filter = args.log_filter.unwrap_or_else(|| {
            let level = args.verbose.unwrap_or(LogLevel::Warn);
            format!("hoptrace={level},hoptrace_core={level}")
        });
        let first_ttl = args.first_ttl.unwrap_or(defaults::DEFAULT_FIRST_TTL);
        let max_ttl = args.max_ttl.unwrap_or(defaults::DEFAULT_MAX_TTL);
        let probe_timeout = args.timeout.unwrap_or(defaults::DEFAULT_PROBE_TIMEOUT);
        let poll_slice = args.poll_slice.unwrap_or(defaults::DEFAULT_POLL_SLICE);
        let packet_size = args.packet_size.unwrap_or(defaults::DEFAULT_PACKET_SIZE);
        let header_mode = if args.kernel_header {
            HeaderMode::Kernel
        } else {
            defaults::DEFAULT_HEADER_MODE
        };
        let probe_matching = if args.lenient {
            ProbeMatching::Lenient
        } else {
            defaults::DEFAULT_PROBE_MATCHING
        };
        validate_ttl(first_ttl, max_ttl)?;
        validate_duration("timeout", probe_timeout)?;
        validate_duration("poll-slice", poll_slice)?;
        validate_packet_size(packet_size)?;
        Ok(Self {
            destination,
            log_filter,
            first_ttl,
            max_ttl,
            probe_timeout,
            poll_slice,
            packet_size,
            header_mode,
            probe_matching,
        })
    }
}

fn validate_ttl(first_ttl: u8, max_ttl: u8) -> anyhow::Result<()> {
    if first_ttl == 0 {
        Err(anyhow!("first-ttl ({first_ttl}) must be at least 1"))
    } else if first_ttl > max_ttl {
        Err(anyhow!(
            "first-ttl ({first_ttl}) must be less than or equal to max-ttl ({max_ttl})"
        ))
    } else {
        Ok(())
    }
}

fn validate_duration(name: &str, duration: Duration) -> anyhow::Result<()> {
    if duration.is_zero() {
        Err(anyhow!("{name} must be greater than zero"))
    } else {
        Ok(())
    }
}

fn validate_packet_size(packet_size: u16) -> anyhow::Result<()> {
    if (MIN_PACKET_SIZE..=MAX_PACKET_SIZE).contains(&usize::from(packet_size)) {
        Ok(())
    } else {
        Err(anyhow!(
            "packet-size ({packet_size}) must be between {MIN_PACKET_SIZE} and {MAX_PACKET_SIZE} inclusive"
        ))
    }
}

fn parse_log_level(value: &str) -> anyhow::Result<LogLevel> {
    LogLevel::from_str(value)
}

fn parse_duration(value: &str) -> anyhow::Result<Duration> {
    Ok(humantime::parse_duration(value)?)
}
