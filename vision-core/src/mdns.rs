//! mDNS wire format for a single host record
//!
//! Only what the responder needs: recognising an A (or ANY) question for `<host>.local` and
//! building the authoritative answer carrying the board's address.

use core::net::Ipv4Addr;

pub const MDNS_PORT: u16 = 5353;
pub const MDNS_GROUP: Ipv4Addr = Ipv4Addr::new(224, 0, 0, 251);

/// TTL of the A record
pub const TTL_SECS: u32 = 120;

const HEADER_LEN: usize = 12;
const DOMAIN: &str = "local";
const TYPE_A: u16 = 1;
const TYPE_ANY: u16 = 255;
const CLASS_IN: u16 = 1;
const CACHE_FLUSH: u16 = 0x8000;
const FLAGS_AUTHORITATIVE_ANSWER: u16 = 0x8400;
const MAX_LABEL: usize = 63;
const MAX_POINTER_JUMPS: usize = 8;

fn read_u16(packet: &[u8], at: usize) -> Option<u16> {
    let bytes = packet.get(at..at + 2)?;
    Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}

/// Whether `packet` is a query containing an A or ANY question for `<host>.local`.
pub fn is_query_for(packet: &[u8], host: &str) -> bool {
    if packet.len() < HEADER_LEN || packet[2] & 0x80 != 0 {
        return false;
    }
    let Some(questions) = read_u16(packet, 4) else {
        return false;
    };

    let mut offset = HEADER_LEN;
    for _ in 0..questions {
        let Some((matches, next)) = match_name(packet, offset, host) else {
            return false;
        };
        let (Some(qtype), Some(qclass)) = (read_u16(packet, next), read_u16(packet, next + 2))
        else {
            return false;
        };
        offset = next + 4;

        if matches && matches!(qtype, TYPE_A | TYPE_ANY) && qclass & !CACHE_FLUSH == CLASS_IN {
            return true;
        }
    }
    false
}

/// Compare the name at `start` with `<host>.local`.
///
/// Returns whether it matched and the offset just past the name.
fn match_name(packet: &[u8], start: usize, host: &str) -> Option<(bool, usize)> {
    let expected = [host.as_bytes(), DOMAIN.as_bytes()];
    let mut pos = start;
    let mut end = None;
    let mut jumps = 0;
    let mut label = 0;
    let mut matches = true;

    loop {
        let len = *packet.get(pos)? as usize;
        if len & 0xC0 == 0xC0 {
            let low = *packet.get(pos + 1)? as usize;
            end.get_or_insert(pos + 2);
            jumps += 1;
            if jumps > MAX_POINTER_JUMPS {
                return None;
            }
            pos = ((len & 0x3F) << 8) | low;
            continue;
        }
        if len == 0 {
            return Some((matches && label == expected.len(), end.unwrap_or(pos + 1)));
        }

        let text = packet.get(pos + 1..pos + 1 + len)?;
        matches &= expected
            .get(label)
            .is_some_and(|want| want.eq_ignore_ascii_case(text));
        label += 1;
        pos += 1 + len;
    }
}

/// Write the answer for `<host>.local -> ip` into `buf`.
///
/// Returns the packet length, or `None` when the name is not a valid label or `buf` is too
/// small.
pub fn build_answer(buf: &mut [u8], host: &str, ip: Ipv4Addr) -> Option<usize> {
    if host.is_empty() || host.len() > MAX_LABEL {
        return None;
    }
    let name_len = 1 + host.len() + 1 + DOMAIN.len() + 1;
    let total = HEADER_LEN + name_len + 10 + 4;
    let out = buf.get_mut(..total)?;

    out[..HEADER_LEN].fill(0);
    out[2..4].copy_from_slice(&FLAGS_AUTHORITATIVE_ANSWER.to_be_bytes());
    out[6..8].copy_from_slice(&1u16.to_be_bytes());

    let mut at = HEADER_LEN;
    for label in [host, DOMAIN] {
        out[at] = label.len() as u8;
        out[at + 1..at + 1 + label.len()].copy_from_slice(label.as_bytes());
        at += 1 + label.len();
    }
    out[at] = 0;
    at += 1;

    out[at..at + 2].copy_from_slice(&TYPE_A.to_be_bytes());
    out[at + 2..at + 4].copy_from_slice(&(CACHE_FLUSH | CLASS_IN).to_be_bytes());
    out[at + 4..at + 8].copy_from_slice(&TTL_SECS.to_be_bytes());
    out[at + 8..at + 10].copy_from_slice(&4u16.to_be_bytes());
    out[at + 10..at + 14].copy_from_slice(&ip.octets());

    Some(total)
}
