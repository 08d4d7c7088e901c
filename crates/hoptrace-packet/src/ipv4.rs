use crate::buffer::Buffer;
use crate::error::{Error, Result};
use crate::{fmt_payload, IpProtocol};
use std::fmt::{Debug, Formatter};
use std::net::Ipv4Addr;

const VERSION_OFFSET: usize = 0;
const IHL_OFFSET: usize = 0;
const TOS_OFFSET: usize = 1;
const TOTAL_LENGTH_OFFSET: usize = 2;
const IDENTIFICATION_OFFSET: usize = 4;
const FLAGS_AND_FRAGMENT_OFFSET_OFFSET: usize = 6;
const TIME_TO_LIVE_OFFSET: usize = 8;
const PROTOCOL_OFFSET: usize = 9;
const CHECKSUM_OFFSET: usize = 10;
const SOURCE_OFFSET: usize = 12;
const DESTINATION_OFFSET: usize = 16;

/// The Don't Fragment flag of the flags and fragment offset word.
pub const DONT_FRAGMENT: u16 = 0x4000;

/// Represents an `IPv4` Packet.
///
/// The header length (IHL) is honoured when locating the payload, so headers
/// carrying options are handled.
pub struct Ipv4Packet<'a> {
    buf: Buffer<'a>,
}

impl<'a> Ipv4Packet<'a> {
    pub fn new(packet: &'a mut [u8]) -> Result<Self> {
        Ok(Self {
            buf: Buffer::mutable("Ipv4Packet", Self::minimum_packet_size(), packet)?,
        })
    }

    pub fn new_view(packet: &'a [u8]) -> Result<Self> {
        Ok(Self {
            buf: Buffer::immutable("Ipv4Packet", Self::minimum_packet_size(), packet)?,
        })
    }

    #[must_use]
    pub const fn minimum_packet_size() -> usize {
        20
    }

    #[must_use]
    pub fn get_version(&self) -> u8 {
        (self.buf.read(VERSION_OFFSET) & 0xf0) >> 4
    }

    /// The header length in 32-bit words.
    #[must_use]
    pub fn get_header_length(&self) -> u8 {
        self.buf.read(IHL_OFFSET) & 0xf
    }

    /// The header length in bytes.
    ///
    /// Fails if the IHL field is below the minimum of 5 words or describes a
    /// header which does not fit in the buffer.
    pub fn header_len_bytes(&self) -> Result<usize> {
        let ihl = self.get_header_length();
        let len = usize::from(ihl) * 4;
        if len < Self::minimum_packet_size() || len > self.buf.len() {
            Err(Error::InvalidHeaderLength(ihl, self.buf.len()))
        } else {
            Ok(len)
        }
    }

    #[must_use]
    pub fn get_tos(&self) -> u8 {
        self.buf.read(TOS_OFFSET)
    }

    #[must_use]
    pub fn get_total_length(&self) -> u16 {
        self.buf.get_u16(TOTAL_LENGTH_OFFSET)
    }

    #[must_use]
    pub fn get_identification(&self) -> u16 {
        self.buf.get_u16(IDENTIFICATION_OFFSET)
    }

    #[must_use]
    pub fn get_flags_and_fragment_offset(&self) -> u16 {
        self.buf.get_u16(FLAGS_AND_FRAGMENT_OFFSET_OFFSET)
    }

    #[must_use]
    pub fn get_ttl(&self) -> u8 {
        self.buf.read(TIME_TO_LIVE_OFFSET)
    }

    #[must_use]
    pub fn get_protocol(&self) -> IpProtocol {
        IpProtocol::from(self.buf.read(PROTOCOL_OFFSET))
    }

    #[must_use]
    pub fn get_checksum(&self) -> u16 {
        self.buf.get_u16(CHECKSUM_OFFSET)
    }

    #[must_use]
    pub fn get_source(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.buf.get_bytes::<4>(SOURCE_OFFSET))
    }

    #[must_use]
    pub fn get_destination(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.buf.get_bytes::<4>(DESTINATION_OFFSET))
    }

    pub fn set_version(&mut self, val: u8) {
        *self.buf.write(VERSION_OFFSET) =
            (self.buf.read(VERSION_OFFSET) & 0xf) | ((val & 0xf) << 4);
    }

    pub fn set_header_length(&mut self, val: u8) {
        *self.buf.write(IHL_OFFSET) = (self.buf.read(IHL_OFFSET) & 0xf0) | (val & 0xf);
    }

    pub fn set_tos(&mut self, val: u8) {
        *self.buf.write(TOS_OFFSET) = val;
    }

    pub fn set_total_length(&mut self, val: u16) {
        self.buf.set_u16(TOTAL_LENGTH_OFFSET, val);
    }

    pub fn set_identification(&mut self, val: u16) {
        self.buf.set_u16(IDENTIFICATION_OFFSET, val);
    }

    pub fn set_flags_and_fragment_offset(&mut self, val: u16) {
        self.buf.set_u16(FLAGS_AND_FRAGMENT_OFFSET_OFFSET, val);
    }

    pub fn set_ttl(&mut self, val: u8) {
        *self.buf.write(TIME_TO_LIVE_OFFSET) = val;
    }

    pub fn set_protocol(&mut self, val: IpProtocol) {
        *self.buf.write(PROTOCOL_OFFSET) = val.id();
    }

    pub fn set_checksum(&mut self, val: u16) {
        self.buf.set_u16(CHECKSUM_OFFSET, val);
    }

    pub fn set_source(&mut self, val: Ipv4Addr) {
        self.buf.set_bytes(SOURCE_OFFSET, val.octets());
    }

    pub fn set_destination(&mut self, val: Ipv4Addr) {
        self.buf.set_bytes(DESTINATION_OFFSET, val.octets());
    }

    /// Copy `vals` in after the header, as described by the IHL field.
    pub fn set_payload(&mut self, vals: &[u8]) {
        let offset = self.payload_offset();
        self.buf.as_slice_mut()[offset..offset + vals.len()].copy_from_slice(vals);
    }

    #[must_use]
    pub fn packet(&self) -> &[u8] {
        self.buf.as_slice()
    }

    /// The bytes following the header.
    ///
    /// An IHL which runs past the end of the buffer yields an empty payload.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        let offset = self.payload_offset().min(self.buf.len());
        &self.buf.as_slice()[offset..]
    }

    fn payload_offset(&self) -> usize {
        (usize::from(self.get_header_length()) * 4).max(Self::minimum_packet_size())
    }
}

impl Debug for Ipv4Packet<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ipv4Packet")
            .field("version", &self.get_version())
            .field("header_length", &self.get_header_length())
            .field("tos", &self.get_tos())
            .field("total_length", &self.get_total_length())
            .field("identification", &self.get_identification())
            .field(
                "flags_and_fragment_offset",
                &self.get_flags_and_fragment_offset(),
            )
            .field("ttl", &self.get_ttl())
            .field("protocol", &self.get_protocol())
            .field("checksum", &self.get_checksum())
            .field("source", &self.get_source())
            .field("destination", &self.get_destination())
            .field("payload", &fmt_payload(self.payload()))
            .finish()
    }
}
