//! Capture file decoding.
//!
//! Reads classic pcap files and reduces every frame to a [`PacketRecord`]:
//! timestamp, captured length, and the protocol layers found in it. Link
//! layers are unwrapped by hand; network and transport layers are sliced
//! with `etherparse`.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use etherparse::{NetSlice, SlicedPacket, TransportSlice};
use pcap_file::pcap::{PcapReader, RawPcapPacket};
use pcap_file::{DataLink, TsResolution};

use super::types::*;

const ETHERTYPE_IPV4: u16 = 0x0800;
const ETHERTYPE_ARP: u16 = 0x0806;
const ETHERTYPE_VLAN: u16 = 0x8100;
const ETHERTYPE_QINQ: u16 = 0x88a8;
const ETHERTYPE_IPV6: u16 = 0x86dd;

const PPP_IPV4: u16 = 0x0021;
const PPP_IPV6: u16 = 0x0057;

/// LLC/SNAP header preceding the ether type in 802.11 data frames
const LLC_SNAP: [u8; 6] = [0xaa, 0xaa, 0x03, 0x00, 0x00, 0x00];

/// Link-layer framing of a capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkType {
    Ethernet,
    /// Bare IPv4/IPv6 packets
    Raw,
    Ppp,
    LinuxSll,
    /// BSD loopback, 4-byte address family header
    Null,
    Ieee80211,
    Ieee80211Radiotap,
    Unsupported,
}

impl From<DataLink> for LinkType {
    fn from(datalink: DataLink) -> Self {
        match datalink {
            DataLink::ETHERNET => LinkType::Ethernet,
            DataLink::RAW | DataLink::IPV4 | DataLink::IPV6 => LinkType::Raw,
            DataLink::PPP => LinkType::Ppp,
            DataLink::LINUX_SLL => LinkType::LinuxSll,
            DataLink::NULL | DataLink::LOOP => LinkType::Null,
            DataLink::IEEE802_11 => LinkType::Ieee80211,
            DataLink::IEEE802_11_RADIOTAP => LinkType::Ieee80211Radiotap,
            other => {
                log::warn!("Unsupported capture link type {:?}, packets will carry no layer tags", other);
                LinkType::Unsupported
            }
        }
    }
}

/// Decode the protocol layers of one captured frame.
///
/// Frames that end early or cannot be sliced keep whatever outer layers were
/// recognized; this never fails.
pub fn decode_layers(link: LinkType, frame: &[u8]) -> Vec<Protocol> {
    let mut layers = Vec::new();
    match link {
        LinkType::Ethernet => decode_ethernet(frame, &mut layers),
        LinkType::Raw => decode_ip(frame, &mut layers),
        LinkType::Ppp => decode_ppp(frame, &mut layers),
        LinkType::LinuxSll => {
            if let Some(proto) = read_u16_be(frame, 14) {
                decode_ether_type(proto, &frame[16..], &mut layers);
            }
        }
        LinkType::Null => {
            if let Some(payload) = frame.get(4..) {
                decode_ip(payload, &mut layers);
            }
        }
        LinkType::Ieee80211 => decode_ieee80211(frame, &mut layers),
        LinkType::Ieee80211Radiotap => {
            // Radiotap length is little-endian at offset 2
            if let Some(header_len) = read_u16_le(frame, 2) {
                if let Some(payload) = frame.get(header_len as usize..) {
                    decode_ieee80211(payload, &mut layers);
                }
            }
        }
        LinkType::Unsupported => {}
    }
    layers
}

fn read_u16_be(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset + 2)?;
    Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}

fn read_u16_le(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset + 2)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

fn decode_ethernet(frame: &[u8], layers: &mut Vec<Protocol>) {
    let Some(mut ether_type) = read_u16_be(frame, 12) else {
        return;
    };
    layers.push(Protocol::Ethernet);

    let mut offset = 14;
    while ether_type == ETHERTYPE_VLAN || ether_type == ETHERTYPE_QINQ {
        let Some(inner) = read_u16_be(frame, offset + 2) else {
            return;
        };
        ether_type = inner;
        offset += 4;
    }

    decode_ether_type(ether_type, &frame[offset..], layers);
}

fn decode_ether_type(ether_type: u16, payload: &[u8], layers: &mut Vec<Protocol>) {
    match ether_type {
        ETHERTYPE_IPV4 | ETHERTYPE_IPV6 => decode_ip(payload, layers),
        ETHERTYPE_ARP => layers.push(Protocol::Arp),
        _ => {}
    }
}

fn decode_ppp(frame: &[u8], layers: &mut Vec<Protocol>) {
    // Optional HDLC address/control bytes
    let frame = match frame {
        [0xff, 0x03, rest @ ..] => rest,
        _ => frame,
    };
    match read_u16_be(frame, 0) {
        Some(PPP_IPV4) | Some(PPP_IPV6) => decode_ip(&frame[2..], layers),
        _ => {}
    }
}

fn decode_ieee80211(frame: &[u8], layers: &mut Vec<Protocol>) {
    if frame.len() < 24 {
        return;
    }
    layers.push(Protocol::Ieee80211);

    let fc0 = frame[0];
    let fc1 = frame[1];
    let frame_type = (fc0 >> 2) & 0x03;
    let subtype = (fc0 >> 4) & 0x0f;

    // Only data frames that carry a payload and are not encrypted
    if frame_type != 2 || subtype & 0x04 != 0 || fc1 & 0x40 != 0 {
        return;
    }

    let mut header_len = 24;
    if fc1 & 0x03 == 0x03 {
        // Four-address (WDS) frame
        header_len += 6;
    }
    if subtype & 0x08 != 0 {
        // QoS control, plus HT control when the order bit is set
        header_len += 2;
        if fc1 & 0x80 != 0 {
            header_len += 4;
        }
    }

    let Some(body) = frame.get(header_len..) else {
        return;
    };
    if body.len() >= 8 && body[..6] == LLC_SNAP {
        let ether_type = u16::from_be_bytes([body[6], body[7]]);
        decode_ether_type(ether_type, &body[8..], layers);
    }
}

fn decode_ip(packet: &[u8], layers: &mut Vec<Protocol>) {
    match SlicedPacket::from_ip(packet) {
        Ok(sliced) => {
            match &sliced.net {
                Some(NetSlice::Ipv4(_)) => layers.push(Protocol::Ipv4),
                Some(NetSlice::Ipv6(_)) => layers.push(Protocol::Ipv6),
                _ => {}
            }
            match &sliced.transport {
                Some(TransportSlice::Tcp(_)) => layers.push(Protocol::Tcp),
                Some(TransportSlice::Udp(_)) => layers.push(Protocol::Udp),
                Some(TransportSlice::Icmpv4(_)) | Some(TransportSlice::Icmpv6(_)) => layers.push(Protocol::Icmp),
                _ => {}
            }
        }
        Err(_) => {
            // Snapped or damaged packet: the version nibble still identifies the layer
            match packet.first().map(|b| b >> 4) {
                Some(4) => layers.push(Protocol::Ipv4),
                Some(6) => layers.push(Protocol::Ipv6),
                _ => {}
            }
        }
    }
}

/// Seconds since the epoch of a raw record, or a description of why the
/// fractional part is out of range
fn record_timestamp(raw: &RawPcapPacket, resolution: TsResolution) -> Result<f64, String> {
    let (frac_per_sec, name) = match resolution {
        TsResolution::MicroSecond => (1_000_000u32, "microseconds"),
        TsResolution::NanoSecond => (1_000_000_000u32, "nanoseconds"),
    };
    if raw.ts_frac >= frac_per_sec {
        return Err(format!("{} {} out of range", name, raw.ts_frac));
    }
    Ok(raw.ts_sec as f64 + raw.ts_frac as f64 / frac_per_sec as f64)
}

/// Read every packet of a classic pcap file.
///
/// Records are taken as stored: a capture limited by its snapshot length
/// is valid, and each packet counts the bytes actually captured. A damaged
/// file header, an out-of-range timestamp, or a record claiming more
/// captured than on-wire bytes is reported as [`ParseError::Capture`];
/// undecodable frame contents are not errors.
pub fn read_capture_file(path: &Path) -> Result<Vec<PacketRecord>, ParseError> {
    let path_str = path.display().to_string();
    let file = File::open(path).map_err(|source| ParseError::Io {
        path: path_str.clone(),
        source,
    })?;

    let mut reader = PcapReader::new(BufReader::with_capacity(64 * 1024, file)).map_err(|e| ParseError::Capture {
        path: path_str.clone(),
        message: e.to_string(),
    })?;
    let header = reader.header();
    let link = LinkType::from(header.datalink);

    let mut packets = Vec::new();
    while let Some(next_packet) = reader.next_raw_packet() {
        let index = packets.len() + 1;
        let capture_error = |message: String| ParseError::Capture {
            path: path_str.clone(),
            message: format!("packet {}: {}", index, message),
        };

        let raw = next_packet.map_err(|e| capture_error(e.to_string()))?;
        if raw.incl_len > raw.orig_len {
            return Err(capture_error(format!(
                "captured length {} exceeds original length {}",
                raw.incl_len, raw.orig_len
            )));
        }
        let timestamp = record_timestamp(&raw, header.ts_resolution).map_err(capture_error)?;

        let layers = decode_layers(link, &raw.data);
        packets.push(PacketRecord::new(timestamp, raw.data.len() as u64, layers)?);
    }

    log::debug!("Read {} packets from {} ({:?})", packets.len(), path.display(), link);
    Ok(packets)
}
