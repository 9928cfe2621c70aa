//! Parsers for command-line tool output
//!
//! All text inference lives here so each known output format has its own tests.

use crate::interface::AdapterState;

/// Extra lines `ping -c N` prints around the N reply lines:
/// header, blank, statistics banner, statistics line, rtt line.
const PING_FRAME_LINES: usize = 5;

/// Why an adapter status line could not be interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterStatusError {
    NoOutput,
    NoFlags(String),
}

impl std::fmt::Display for AdapterStatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdapterStatusError::NoOutput => write!(f, "no output"),
            AdapterStatusError::NoFlags(line) => write!(f, "no interface flags in '{}'", line),
        }
    }
}

/// Infer adapter state from `ifconfig <iface>` output.
///
/// Only the first line is inspected, e.g.
/// `wlan0: flags=4163<UP,BROADCAST,RUNNING,MULTICAST>  mtu 1500`.
/// A leading `UP` or `DOWN` flag decides directly. Otherwise a `DOWN` flag
/// anywhere means down, an `UP` flag anywhere means up, and a flag list with
/// neither (`<BROADCAST,MULTICAST>`) is how ifconfig shows a downed interface.
pub fn adapter_state(lines: &[String]) -> Result<AdapterState, AdapterStatusError> {
    let first = lines.first().ok_or(AdapterStatusError::NoOutput)?;
    let flags = flag_list(first).ok_or_else(|| AdapterStatusError::NoFlags(first.clone()))?;

    match flags.first() {
        Some(&"UP") => return Ok(AdapterState::Up),
        Some(&"DOWN") => return Ok(AdapterState::Down),
        _ => {}
    }

    if flags.contains(&"DOWN") {
        Ok(AdapterState::Down)
    } else if flags.contains(&"UP") {
        Ok(AdapterState::Up)
    } else {
        Ok(AdapterState::Down)
    }
}

fn flag_list(line: &str) -> Option<Vec<&str>> {
    let start = line.find('<')?;
    let end = start + line[start..].find('>')?;
    let inner = &line[start + 1..end];
    if inner.is_empty() {
        return None;
    }
    Some(inner.split(',').map(str::trim).collect())
}

/// Decide whether a `ping -c <count>` run reached its target.
///
/// The output must have exactly `count + 5` lines (9 for four packets) and the
/// statistics line, second to last, must not report zero replies received.
pub fn ping_succeeded(lines: &[String], count: u32) -> bool {
    let expected = count as usize + PING_FRAME_LINES;
    if lines.len() != expected {
        return false;
    }

    match lines.get(lines.len() - 2) {
        Some(stats) => match received_count(stats) {
            Some(received) => received > 0,
            None => !stats.contains("0 received"),
        },
        None => false,
    }
}

/// Reply count from `4 packets transmitted, 3 received, 25% packet loss, ...`
fn received_count(stats: &str) -> Option<u32> {
    stats
        .split(',')
        .find_map(|field| field.trim().strip_suffix(" received"))
        .and_then(|n| n.trim().parse().ok())
}

/// Extract SSIDs from `iwlist <iface> scanning` output.
///
/// Keeps lines carrying `ESSID:`, strips the label and quotes, and drops
/// hidden networks that advertise an empty SSID.
pub fn scan_ssids(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .filter_map(|line| {
            let (_, rest) = line.split_once("ESSID:")?;
            let rest = rest.trim_start_matches('"');
            let ssid = match rest.rfind('"') {
                Some(end) => &rest[..end],
                None => rest.trim_end(),
            };
            if ssid.is_empty() {
                None
            } else {
                Some(ssid.to_string())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_adapter_up_net_tools_2() {
        let out = lines(&[
            "wlan0: flags=4163<UP,BROADCAST,RUNNING,MULTICAST>  mtu 1500",
            "        inet 192.168.254.1  netmask 255.255.255.0  broadcast 192.168.254.255",
        ]);
        assert_eq!(adapter_state(&out), Ok(AdapterState::Up));
    }

    #[test]
    fn test_adapter_down_flag() {
        let out = lines(&["wlan0: flags=4098<DOWN,BROADCAST,MULTICAST>  mtu 1500"]);
        assert_eq!(adapter_state(&out), Ok(AdapterState::Down));
    }

    #[test]
    fn test_adapter_down_without_up_flag() {
        let out = lines(&[
            "wlan0: flags=4098<BROADCAST,MULTICAST>  mtu 1500",
            "        ether 00:00:00:00:00:00  txqueuelen 1000  (Ethernet)",
        ]);
        assert_eq!(adapter_state(&out), Ok(AdapterState::Down));
    }

    #[test]
    fn test_adapter_single_up_flag() {
        let out = lines(&["lo: flags=1<UP>  mtu 65536"]);
        assert_eq!(adapter_state(&out), Ok(AdapterState::Up));
    }

    #[test]
    fn test_adapter_only_first_line_counts() {
        let out = lines(&[
            "wlan0: flags=4098<BROADCAST,MULTICAST>  mtu 1500",
            "        flags=4163<UP,BROADCAST,RUNNING,MULTICAST>",
        ]);
        assert_eq!(adapter_state(&out), Ok(AdapterState::Down));
    }

    #[test]
    fn test_adapter_unknown() {
        assert_eq!(adapter_state(&[]), Err(AdapterStatusError::NoOutput));

        let out = lines(&["wlan0: error fetching interface information: Device not found"]);
        assert!(matches!(adapter_state(&out), Err(AdapterStatusError::NoFlags(_))));

        let out = lines(&["wlan0: flags=0<>  mtu 1500"]);
        assert!(matches!(adapter_state(&out), Err(AdapterStatusError::NoFlags(_))));
    }

    #[test]
    fn test_ping_success() {
        let out = lines(&[
            "PING 1.1.1.1 (1.1.1.1) 56(84) bytes of data.",
            "64 bytes from 1.1.1.1: icmp_seq=1 ttl=57 time=11.2 ms",
            "64 bytes from 1.1.1.1: icmp_seq=2 ttl=57 time=10.9 ms",
            "64 bytes from 1.1.1.1: icmp_seq=3 ttl=57 time=11.0 ms",
            "64 bytes from 1.1.1.1: icmp_seq=4 ttl=57 time=11.4 ms",
            "",
            "--- 1.1.1.1 ping statistics ---",
            "4 packets transmitted, 4 received, 0% packet loss, time 3004ms",
            "rtt min/avg/max/mdev = 10.912/11.125/11.401/0.189 ms",
        ]);
        assert!(ping_succeeded(&out, 4));
    }

    #[test]
    fn test_ping_nine_lines_nothing_received() {
        let out = lines(&[
            "PING 1.1.1.1 (1.1.1.1) 56(84) bytes of data.",
            "From 192.168.1.1 icmp_seq=1 Destination Host Unreachable",
            "From 192.168.1.1 icmp_seq=2 Destination Host Unreachable",
            "From 192.168.1.1 icmp_seq=3 Destination Host Unreachable",
            "From 192.168.1.1 icmp_seq=4 Destination Host Unreachable",
            "",
            "--- 1.1.1.1 ping statistics ---",
            "4 packets transmitted, 0 received, +4 errors, 100% packet loss, time 3060ms",
            "pipe 4",
        ]);
        assert!(!ping_succeeded(&out, 4));
    }

    #[test]
    fn test_ping_short_output() {
        let out = lines(&[
            "PING 1.1.1.1 (1.1.1.1) 56(84) bytes of data.",
            "",
            "--- 1.1.1.1 ping statistics ---",
            "4 packets transmitted, 0 received, 100% packet loss, time 93ms",
        ]);
        assert!(!ping_succeeded(&out, 4));
        assert!(!ping_succeeded(&[], 4));
    }

    #[test]
    fn test_ping_other_counts() {
        let out = lines(&[
            "PING 1.1.1.1 (1.1.1.1) 56(84) bytes of data.",
            "64 bytes from 1.1.1.1: icmp_seq=1 ttl=57 time=11.2 ms",
            "",
            "--- 1.1.1.1 ping statistics ---",
            "1 packets transmitted, 1 received, 0% packet loss, time 0ms",
            "rtt min/avg/max/mdev = 11.200/11.200/11.200/0.000 ms",
        ]);
        assert!(ping_succeeded(&out, 1));
        assert!(!ping_succeeded(&out, 4));
    }

    #[test]
    fn test_ping_ten_packets_all_received() {
        let mut raw = vec!["PING 1.1.1.1 (1.1.1.1) 56(84) bytes of data.".to_string()];
        for seq in 1..=10 {
            raw.push(format!("64 bytes from 1.1.1.1: icmp_seq={} ttl=57 time=11.2 ms", seq));
        }
        raw.push(String::new());
        raw.push("--- 1.1.1.1 ping statistics ---".to_string());
        raw.push("10 packets transmitted, 10 received, 0% packet loss, time 9013ms".to_string());
        raw.push("rtt min/avg/max/mdev = 10.912/11.125/11.401/0.189 ms".to_string());
        assert!(ping_succeeded(&raw, 10));

        let last = raw.len() - 2;
        raw[last] = "10 packets transmitted, 0 received, 100% packet loss, time 9013ms".to_string();
        assert!(!ping_succeeded(&raw, 10));
    }

    #[test]
    fn test_received_count() {
        assert_eq!(received_count("4 packets transmitted, 3 received, 25% packet loss, time 3004ms"), Some(3));
        assert_eq!(received_count("20 packets transmitted, 20 received, 0% packet loss"), Some(20));
        assert_eq!(received_count("4 packets transmitted, 0 received, +4 errors, 100% packet loss"), Some(0));
        assert_eq!(received_count("rtt min/avg/max/mdev = 1/2/3/4 ms"), None);
    }

    #[test]
    fn test_scan_ssids() {
        let out = lines(&[
            "wlan0     Scan completed :",
            "          Cell 01 - Address: 00:11:22:33:44:55",
            "                    ESSID:\"HomeNet\"",
            "          Cell 02 - Address: 66:77:88:99:AA:BB",
            "                    ESSID:\"\"",
            "          Cell 03 - Address: CC:DD:EE:FF:00:11",
            "                    ESSID:\"Cafe \"Free\" WiFi\"",
            "                    Quality=70/70  Signal level=-40 dBm",
        ]);
        assert_eq!(scan_ssids(&out), vec!["HomeNet", "Cafe \"Free\" WiFi"]);
    }

    #[test]
    fn test_scan_no_results() {
        let out = lines(&["wlan0     No scan results"]);
        assert!(scan_ssids(&out).is_empty());
    }
}
