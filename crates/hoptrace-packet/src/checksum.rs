//! The Internet checksum (RFC 1071) as used by `IPv4` headers and `ICMP` messages.
//!
//! Words are summed in network byte order, an odd trailing byte is treated as
//! the high byte of a final word, carries are folded back in until none remain
//! and the one's complement of the result is returned.

const IPV4_CHECKSUM_WORD: usize = 5;
const ICMP_CHECKSUM_WORD: usize = 1;

/// Calculate the Internet checksum of `data`.
#[must_use]
pub fn internet_checksum(data: &[u8]) -> u16 {
    finalize_checksum(sum_be_words(data, None))
}

/// Calculate the checksum for an `Ipv4` header.
///
/// The checksum word of the header is skipped.
#[must_use]
pub fn ipv4_header_checksum(data: &[u8]) -> u16 {
    finalize_checksum(sum_be_words(data, Some(IPV4_CHECKSUM_WORD)))
}

/// Calculate the checksum for an `Ipv4` `ICMP` packet.
///
/// The checksum word of the `ICMP` header is skipped so that a packet holding
/// a stale checksum can be checksummed again.
#[must_use]
pub fn icmp_ipv4_checksum(data: &[u8]) -> u16 {
    finalize_checksum(sum_be_words(data, Some(ICMP_CHECKSUM_WORD)))
}

/// Verify a buffer which carries its own checksum.
///
/// A correctly checksummed buffer sums to `0xFFFF`.
#[must_use]
pub fn verify(data: &[u8]) -> bool {
    !data.is_empty() && fold(sum_be_words(data, None)) == 0xFFFF
}

fn sum_be_words(data: &[u8], ignore_word: Option<usize>) -> u64 {
    let mut words = data.chunks_exact(2);
    let mut sum = words
        .by_ref()
        .enumerate()
        .filter(|(i, _)| Some(*i) != ignore_word)
        .map(|(_, word)| u64::from(u16::from_be_bytes([word[0], word[1]])))
        .sum::<u64>();
    if let [last] = words.remainder() {
        if Some(data.len() / 2) != ignore_word {
            sum += u64::from(*last) << 8;
        }
    }
    sum
}

const fn fold(mut sum: u64) -> u16 {
    while sum >> 16 != 0 {
        sum = (sum >> 16) + (sum & 0xFFFF);
    }
    sum as u16
}

const fn finalize_checksum(sum: u64) -> u16 {
    !fold(sum)
}
