use crate::config::HoptraceConfig;
use crate::privilege::Privilege;
use crate::report;
use hoptrace_core::{Builder, Outcome, Tracer};
use tracing::{info, warn};

/// Run the hoptrace application.
///
/// Reaching the destination and exhausting the ttl range are both a
/// successful run.
pub fn run_hoptrace(cfg: &HoptraceConfig) -> anyhow::Result<()> {
    configure_logging(cfg);
    let privilege = Privilege::acquire_privileges()?;
    if !privilege.has_privileges() {
        warn!("missing raw socket privileges, try running as root or with CAP_NET_RAW");
    }
    let tracer = make_tracer(cfg)?;
    println!("{}", report::header(&tracer));
    let trace = tracer.run_with(|event| println!("{}", report::event_line(event)))?;
    match trace.outcome {
        Outcome::Reached => info!(probes = trace.probes_sent, "destination reached"),
        Outcome::Exhausted => info!(probes = trace.probes_sent, "ttl range exhausted"),
    }
    Ok(())
}

fn make_tracer(cfg: &HoptraceConfig) -> anyhow::Result<Tracer> {
    Ok(Builder::new(cfg.destination)
        .first_ttl(cfg.first_ttl)
        .max_ttl(cfg.max_ttl)
        .probe_timeout(cfg.probe_timeout)
        .poll_slice(cfg.poll_slice)
        .packet_size(cfg.packet_size)
        .header_mode(cfg.header_mode)
        .probe_matching(cfg.probe_matching)
        .build()?)
}

fn configure_logging(cfg: &HoptraceConfig) {
    tracing_subscriber::fmt()
        .with_env_filter(&cfg.log_filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
