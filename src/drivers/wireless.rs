//! WiFi link quality and network details.
//!
//! Link quality comes from `/proc/net/wireless`. The info screen also shows
//! the address of the active interface, read through `sysinfo`, and the
//! connected access point as reported by NetworkManager (`nmcli`). A host
//! without NetworkManager simply has no access point details.

use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::process::Command;

use kleine_common::SignalQuality;
use sysinfo::Networks;

use super::WirelessProbe;
use crate::error::SensorError;
use crate::state::NetworkInfo;

/// Header lines before the first interface row.
const HEADER_LINES: usize = 2;

/// `nmcli` terse listing of the visible access points.
const NMCLI_WIFI_ARGS: [&str; 5] = ["-t", "-f", "ACTIVE,SSID,SECURITY,SIGNAL", "dev", "wifi"];

pub struct ProcWireless {
    path: PathBuf,
}

impl ProcWireless {
    pub fn new(path: &Path) -> Self {
        Self { path: path.to_path_buf() }
    }
}

impl WirelessProbe for ProcWireless {
    fn poll_signal(&mut self) -> Result<SignalQuality, SensorError> {
        let text = fs::read_to_string(&self.path)?;
        parse_link_quality(&text).map(|best| best.map_or(SignalQuality::Unknown, SignalQuality::from_link_quality))
    }

    fn poll_network(&mut self) -> Result<NetworkInfo, SensorError> {
        let networks = Networks::new_with_refreshed_list();
        let interfaces: Vec<InterfaceAddress> = networks
            .iter()
            .map(|(name, data)| InterfaceAddress {
                name: name.clone(),
                addresses: data.ip_networks().iter().map(|network| network.addr).collect(),
                mac: (!data.mac_address().is_unspecified()).then(|| data.mac_address().to_string()),
            })
            .collect();

        let mut info = NetworkInfo::default();
        if let Some((interface, ip)) = pick_interface(&interfaces) {
            info.interface = Some(interface.name.clone());
            info.ip = Some(ip.to_string());
            info.mac = interface.mac.clone();
        }

        match Command::new("nmcli").args(NMCLI_WIFI_ARGS).output() {
            Ok(output) if output.status.success() => {
                if let Some(access_point) = parse_active_access_point(&String::from_utf8_lossy(&output.stdout)) {
                    info.ssid = Some(access_point.ssid);
                    info.security = Some(access_point.security);
                    info.signal = access_point.signal;
                }
            }
            Ok(output) => log::debug!(target: "kleine::wifi", "nmcli exited with {}", output.status),
            Err(err) => log::debug!(target: "kleine::wifi", "nmcli not available: {}", err),
        }
        Ok(info)
    }
}

/// One network interface and its addresses.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct InterfaceAddress {
    pub name: String,
    pub addresses: Vec<IpAddr>,
    pub mac: Option<String>,
}

/// The interface to show: wireless ones first, then by name, skipping
/// loopback. Its first IPv4 address wins over IPv6.
pub fn pick_interface(interfaces: &[InterfaceAddress]) -> Option<(&InterfaceAddress, IpAddr)> {
    let mut candidates: Vec<(&InterfaceAddress, IpAddr)> = interfaces
        .iter()
        .filter_map(|interface| {
            let usable = |addr: &&IpAddr| !addr.is_loopback() && !addr.is_unspecified();
            let ip = interface
                .addresses
                .iter()
                .filter(usable)
                .find(|addr| addr.is_ipv4())
                .or_else(|| interface.addresses.iter().find(usable))?;
            Some((interface, *ip))
        })
        .collect();
    candidates.sort_by_key(|(interface, _)| (!interface.name.starts_with("wl"), interface.name.clone()));
    candidates.into_iter().next()
}

/// Access point the host is connected to.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AccessPoint {
    pub ssid: String,
    pub security: String,
    pub signal: Option<u8>,
}

/// The `ACTIVE=yes` row of `nmcli -t -f ACTIVE,SSID,SECURITY,SIGNAL dev wifi`.
pub fn parse_active_access_point(text: &str) -> Option<AccessPoint> {
    text.lines().find_map(|line| {
        let fields = split_terse(line);
        let [active, ssid, security, signal] = fields.as_slice() else {
            return None;
        };
        (active.as_str() == "yes").then(|| AccessPoint {
            ssid: ssid.clone(),
            security: if security.is_empty() { "open".to_string() } else { security.clone() },
            signal: signal.parse().ok(),
        })
    })
}

/// Split an `nmcli -t` row on `:`, honouring `\:` and `\\` escapes.
fn split_terse(line: &str) -> Vec<String> {
    let mut fields = vec![String::new()];
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next()
                    && let Some(field) = fields.last_mut()
                {
                    field.push(escaped);
                }
            }
            ':' => fields.push(String::new()),
            c => {
                if let Some(field) = fields.last_mut() {
                    field.push(c);
                }
            }
        }
    }
    fields
}

/// Best link quality over all listed interfaces, `None` when no interface
/// is listed.
pub fn parse_link_quality(text: &str) -> Result<Option<u8>, SensorError> {
    let mut best: Option<u8> = None;
    for line in text.lines().skip(HEADER_LINES) {
        let mut columns = line.split_whitespace();
        let (Some(_iface), Some(_status), Some(link)) = (columns.next(), columns.next(), columns.next()) else {
            continue;
        };
        let link: f32 = link
            .trim_end_matches('.')
            .parse()
            .map_err(|_| SensorError::Parse(format!("link quality {:?}", link)))?;
        let link = link.clamp(0.0, 100.0) as u8;
        best = Some(best.map_or(link, |b| b.max(link)));
    }
    Ok(best)
}

/// Always reports a good link.
#[derive(Debug, Default)]
pub struct MockWireless;

impl WirelessProbe for MockWireless {
    fn poll_signal(&mut self) -> Result<SignalQuality, SensorError> {
        Ok(SignalQuality::Good)
    }

    fn poll_network(&mut self) -> Result<NetworkInfo, SensorError> {
        Ok(NetworkInfo {
            interface: Some("wlan0".to_string()),
            ip: Some("192.168.1.50".to_string()),
            mac: Some("b8:27:eb:00:00:01".to_string()),
            ssid: Some("kleine".to_string()),
            security: Some("WPA2".to_string()),
            signal: Some(80),
        })
    }
}
