use hoptrace_core::{Event, Tracer};

/// The line printed before the first probe is sent.
pub fn header(tracer: &Tracer) -> String {
    format!(
        "hoptrace to {}, {}..{} hops, {} byte packets",
        tracer.destination(),
        tracer.first_ttl(),
        tracer.max_ttl(),
        tracer.packet_size().0
    )
}

/// The line printed for an event.
pub fn event_line(event: &Event) -> String {
    match event {
        Event::Hop { ttl, addr, .. } => format!(" {ttl}  {addr}"),
        Event::NoReply { ttl } => format!(" {ttl}  no response"),
        Event::Reached { ttl, addr, .. } => format!(" {ttl}  {addr}  destination reached"),
        Event::Exhausted { destination, .. } => {
            format!("no reply from destination {destination}")
        }
    }
}
