use crate::domain::errors::{DomainError, Result};
use crate::domain::value_objects::{
    DeviceAddress, DeviceInfo, DiscoveredDevice, LISTED_NAME_FALLBACK,
};

/// Substrings in an info block that mark an audio-sink capable device.
/// Free-text matching; keep every capability heuristic here.
const AUDIO_MARKERS: &[&str] = &["Audio Sink", "A2DP", "0000110b-", "Icon: audio-"];

/// Lines the tool prints when a command did not take effect
const FAILURE_MARKERS: &[&str] = &["Failed to", "not available", "org.bluez.Error"];

/// Pairing errors that mean the device is already paired
const ALREADY_PAIRED_MARKERS: &[&str] = &["AlreadyExists", "Already Exists", "already paired"];

/// Parse `devices` output: one `Device <address> <name>` line per device.
/// Other lines are ignored; duplicates keep their first occurrence.
pub fn parse_device_list(output: &str) -> Vec<DiscoveredDevice> {
    let mut devices: Vec<DiscoveredDevice> = Vec::new();

    for line in output.lines() {
        let Some(rest) = device_line(line) else {
            continue;
        };
        let mut parts = rest.splitn(2, char::is_whitespace);
        let Some(Ok(address)) = parts.next().map(DeviceAddress::parse) else {
            continue;
        };
        if devices.iter().any(|d| d.address == address) {
            continue;
        }

        let name = parts
            .next()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(LISTED_NAME_FALLBACK)
            .to_string();

        devices.push(DiscoveredDevice { address, name });
    }

    devices
}

/// Parse an `info <address>` block
pub fn parse_device_info(address: &DeviceAddress, output: &str) -> Result<DeviceInfo> {
    if output.contains("not available") {
        return Err(DomainError::ParseError(format!(
            "device {} not available",
            address
        )));
    }

    let has_header = output.lines().filter_map(device_line).any(|rest| {
        rest.split_whitespace()
            .next()
            .map(|token| token.eq_ignore_ascii_case(address.as_str()))
            .unwrap_or(false)
    });
    if !has_header {
        return Err(DomainError::ParseError(format!(
            "no info block for device {}",
            address
        )));
    }

    let mut info = DeviceInfo {
        address: address.clone(),
        name: None,
        alias: None,
        paired: false,
        trusted: false,
        connected: false,
        is_audio_device: false,
    };

    for line in output.lines().map(str::trim) {
        if let Some(value) = line.strip_prefix("Name:") {
            info.name = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("Alias:") {
            info.alias = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("Paired:") {
            info.paired = is_yes(value);
        } else if let Some(value) = line.strip_prefix("Trusted:") {
            info.trusted = is_yes(value);
        } else if let Some(value) = line.strip_prefix("Connected:") {
            info.connected = is_yes(value);
        }

        if AUDIO_MARKERS.iter().any(|marker| line.contains(marker)) {
            info.is_audio_device = true;
        }
    }

    Ok(info)
}

/// First line reporting that the command did not take effect
pub fn failure_line(output: &str) -> Option<&str> {
    output
        .lines()
        .map(str::trim)
        .find(|line| FAILURE_MARKERS.iter().any(|marker| line.contains(marker)))
}

pub fn reports_already_paired(output: &str) -> bool {
    ALREADY_PAIRED_MARKERS
        .iter()
        .any(|marker| output.contains(marker))
}

/// Strip prompt/`[NEW]`-style prefixes and return what follows `Device `
fn device_line(line: &str) -> Option<&str> {
    let start = line.find("Device ")?;
    let prefix = line[..start].trim();
    if !prefix.is_empty() && !prefix.ends_with(']') && !prefix.ends_with('#') {
        return None;
    }
    Some(line[start + "Device ".len()..].trim())
}

fn is_yes(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("yes")
}
