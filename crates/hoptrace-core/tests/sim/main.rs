//! Traces over a simulated network and clock.

mod clock;
mod network;

use clock::SimClock;
use hoptrace_core::{
    Builder, Destination, Error, Event, HeaderMode, HopResult, Outcome, ProbeMatching, TimeToLive,
    Trace,
};
use network::{Route, SimNetwork};
use std::cell::RefCell;
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::sync::Once;
use std::time::Duration;
use test_case::test_case;

const SOURCE: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 1);
const TARGET: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 99);
const ROUTER_1: Ipv4Addr = Ipv4Addr::new(10, 0, 1, 1);
const ROUTER_2: Ipv4Addr = Ipv4Addr::new(10, 0, 2, 1);
const ROUTER_3: Ipv4Addr = Ipv4Addr::new(10, 0, 3, 1);

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("hoptrace_core=debug")
            .with_test_writer()
            .init();
    });
}

/// Run a trace over `route`, returning the events published and the trace.
fn simulate(
    route: Route,
    trace_id: u16,
    probe_matching: ProbeMatching,
) -> (SimNetwork, SimClock, Vec<Event>, hoptrace_core::Result<Trace>) {
    init_tracing();
    let clock = SimClock::new();
    let mut network = SimNetwork::new(route, clock.clone());
    let tracer = Builder::new(Destination::new(TARGET))
        .source_addr(Some(SOURCE))
        .trace_identifier(trace_id)
        .header_mode(HeaderMode::Included)
        .probe_matching(probe_matching)
        .build()
        .unwrap();
    let events = RefCell::new(vec![]);
    let trace = tracer.run_on(&mut network, &clock, |event| {
        events.borrow_mut().push(*event);
    });
    (network, clock, events.into_inner(), trace)
}

fn three_hop_route() -> Route {
    Route {
        hops: vec![Some(ROUTER_1), Some(ROUTER_2), Some(ROUTER_3)],
        destination_ttl: Some(4),
        ..Route::default()
    }
}

#[test]
fn test_destination_replies_to_first_probe() -> anyhow::Result<()> {
    let route = Route {
        destination_ttl: Some(1),
        ..Route::default()
    };
    let trace_id = rand::random();
    let (network, clock, events, trace) = simulate(route, trace_id, ProbeMatching::Strict);
    let trace = trace?;
    assert_eq!(Outcome::Reached, trace.outcome);
    assert_eq!(1, trace.probes_sent);
    assert_eq!(
        vec![Event::Reached {
            ttl: TimeToLive(2),
            addr: TARGET,
            rtt: Duration::ZERO,
        }],
        events
    );
    assert_eq!(1, network.sent().len());
    let probe = network.sent()[0];
    assert_eq!(2, probe.ttl);
    assert_eq!(trace_id, probe.identifier);
    assert_eq!(1, probe.sequence);
    assert_eq!(64, probe.len);
    assert_eq!(Duration::ZERO, clock.elapsed());
    Ok(())
}

#[test]
fn test_multi_hop() -> anyhow::Result<()> {
    let (network, _, events, trace) = simulate(three_hop_route(), 1234, ProbeMatching::Strict);
    let trace = trace?;
    assert_eq!(Outcome::Reached, trace.outcome);
    assert_eq!(3, trace.probes_sent);
    assert_eq!(
        vec![
            Event::Hop {
                ttl: TimeToLive(2),
                addr: ROUTER_2,
                rtt: Duration::ZERO,
            },
            Event::Hop {
                ttl: TimeToLive(3),
                addr: ROUTER_3,
                rtt: Duration::ZERO,
            },
            Event::Reached {
                ttl: TimeToLive(4),
                addr: TARGET,
                rtt: Duration::ZERO,
            },
        ],
        events
    );
    let ttls: Vec<u8> = network.sent().iter().map(|probe| probe.ttl).collect();
    assert_eq!(vec![2, 3, 4], ttls);
    assert!(network.sent().iter().all(|probe| probe.sequence == 1));
    Ok(())
}

#[test]
fn test_exhausted() -> anyhow::Result<()> {
    let (network, clock, events, trace) =
        simulate(Route::default(), 1234, ProbeMatching::Strict);
    let trace = trace?;
    assert_eq!(Outcome::Exhausted, trace.outcome);
    assert_eq!(30, trace.probes_sent);
    assert_eq!(30, network.sent().len());
    let ttls: Vec<u8> = network.sent().iter().map(|probe| probe.ttl).collect();
    assert_eq!((2..=31).collect::<Vec<u8>>(), ttls);
    assert_eq!(31, events.len());
    assert!(events[..30]
        .iter()
        .all(|event| matches!(event, Event::NoReply { .. })));
    assert_eq!(
        Event::Exhausted {
            destination: Destination::new(TARGET),
            max_ttl: TimeToLive(31),
        },
        events[30]
    );
    assert_eq!(Duration::from_secs(30 * 15), clock.elapsed());
    assert!(trace.hops.iter().all(|hop| hop.responder.is_none()));
    Ok(())
}

#[test]
fn test_silent_router() -> anyhow::Result<()> {
    let route = Route {
        hops: vec![Some(ROUTER_1), None, Some(ROUTER_3)],
        destination_ttl: Some(4),
        ..Route::default()
    };
    let (_, clock, events, trace) = simulate(route, 1234, ProbeMatching::Strict);
    let trace = trace?;
    assert_eq!(Outcome::Reached, trace.outcome);
    assert_eq!(
        Event::NoReply {
            ttl: TimeToLive(2)
        },
        events[0]
    );
    assert_eq!(
        HopResult {
            ttl: TimeToLive(2),
            responder: None,
            rtt: None,
        },
        trace.hops[0]
    );
    assert_eq!(Duration::from_secs(15), clock.elapsed());
    Ok(())
}

#[test]
fn test_round_trip_time() -> anyhow::Result<()> {
    let route = Route {
        latency: Duration::from_millis(20),
        ..three_hop_route()
    };
    let (_, clock, _, trace) = simulate(route, 1234, ProbeMatching::Strict);
    let trace = trace?;
    assert!(trace
        .hops
        .iter()
        .all(|hop| hop.rtt == Some(Duration::from_millis(20))));
    assert_eq!(Duration::from_millis(60), clock.elapsed());
    Ok(())
}

#[test_case(vec![0x45, 0x00]; "truncated")]
#[test_case(vec![0x46, 0x00, 0x00, 0x14, 0, 0, 0, 0, 64, 1, 0, 0, 10, 0, 9, 9, 10, 0, 0, 1]; "header length past end")]
#[test_case(network::echo_reply(TARGET, SOURCE, 4321, 1); "echo reply for another trace")]
#[test_case(network::echo_reply(TARGET, SOURCE, 1234, 2); "echo reply for another sequence")]
#[test_case(network::destination_unreachable(ROUTER_1, SOURCE, &[]); "destination unreachable")]
fn test_noise_is_ignored(noise: Vec<u8>) -> anyhow::Result<()> {
    let route = Route {
        noise: vec![noise],
        ..three_hop_route()
    };
    let (_, _, events, trace) = simulate(route, 1234, ProbeMatching::Strict);
    let trace = trace?;
    assert_eq!(Outcome::Reached, trace.outcome);
    assert_eq!(3, trace.probes_sent);
    assert_eq!(3, events.len());
    Ok(())
}

#[test]
fn test_lenient_matching_accepts_foreign_reply() -> anyhow::Result<()> {
    let route = Route {
        noise: vec![network::echo_reply(TARGET, SOURCE, 4321, 9)],
        ..three_hop_route()
    };
    let (_, _, events, trace) = simulate(route, 1234, ProbeMatching::Lenient);
    let trace = trace?;
    assert_eq!(Outcome::Reached, trace.outcome);
    assert_eq!(1, trace.probes_sent);
    assert_eq!(
        vec![Event::Reached {
            ttl: TimeToLive(2),
            addr: TARGET,
            rtt: Duration::ZERO,
        }],
        events
    );
    Ok(())
}

#[test]
fn test_send_failure_ends_trace() {
    let route = Route {
        fail_send_ttl: Some(3),
        ..three_hop_route()
    };
    let (network, _, events, trace) = simulate(route, 1234, ProbeMatching::Strict);
    assert!(matches!(trace, Err(Error::SendFailed { ttl: 3, .. })));
    assert_eq!(1, network.sent().len());
    assert_eq!(
        vec![Event::Hop {
            ttl: TimeToLive(2),
            addr: ROUTER_2,
            rtt: Duration::ZERO,
        }],
        events
    );
}

#[test_case("not-an-ip")]
#[test_case("")]
#[test_case("256.1.1.1")]
#[test_case("::1")]
fn test_invalid_destination(destination: &str) {
    let res = Destination::from_str(destination);
    assert!(matches!(res, Err(Error::InvalidDestination(s)) if s == destination));
}
