/// The smallest probe we build, an `IPv4` header and an `ICMP` echo header.
pub const MIN_PACKET_SIZE: usize = 28;

/// The largest probe we build.
pub const MAX_PACKET_SIZE: usize = 1024;

/// The size of the buffer each incoming datagram is read into.
pub const RECV_BUFFER_SIZE: usize = 1500;

/// The `IPv4` header length in bytes, no options are sent.
pub const IPV4_HEADER_SIZE: usize = 20;
