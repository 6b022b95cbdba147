/// Lines in audio-tool output that mean the command had no effect,
/// even when the tool exits zero
const FAILURE_MARKERS: &[&str] = &["Failure:", "does not exist", "No sink found"];

/// `pacmd` volumes are linear with 65536 as 100%
pub const PACMD_FULL_VOLUME: u32 = 65536;

/// A sink as listed by `pacmd list-sinks`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedSink {
    pub name: String,
    pub is_default: bool,
    pub volume_percent: Option<u8>,
    pub muted: Option<bool>,
}

/// First `NN%` token in a volume line
pub fn parse_volume_percent(output: &str) -> Option<u8> {
    output
        .split(|c: char| c.is_whitespace() || c == '/' || c == ',')
        .filter_map(|token| token.strip_suffix('%'))
        .find_map(|digits| digits.parse::<u16>().ok())
        .map(|percent| percent.min(u8::MAX as u16) as u8)
}

/// `Mute: yes` / `muted: no`
pub fn parse_mute(output: &str) -> Option<bool> {
    output.lines().map(str::trim).find_map(|line| {
        let lower = line.to_ascii_lowercase();
        let value = lower
            .strip_prefix("mute:")
            .or_else(|| lower.strip_prefix("muted:"))?
            .trim()
            .to_string();
        match value.as_str() {
            "yes" => Some(true),
            "no" => Some(false),
            _ => None,
        }
    })
}

/// `Default Sink: x` (`pactl info`) or `Default sink name: x` (`pacmd stat`)
pub fn parse_default_sink(output: &str) -> Option<String> {
    output.lines().map(str::trim).find_map(|line| {
        line.strip_prefix("Default Sink:")
            .or_else(|| line.strip_prefix("Default sink name:"))
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    })
}

/// Split `pacmd list-sinks` output into per-sink records
pub fn parse_pacmd_sinks(output: &str) -> Vec<ListedSink> {
    let mut sinks: Vec<ListedSink> = Vec::new();
    let mut current: Option<ListedSink> = None;

    for raw in output.lines() {
        let line = raw.trim();

        if line.starts_with("index:") || line.starts_with("* index:") {
            if let Some(sink) = current.take() {
                sinks.push(sink);
            }
            current = Some(ListedSink {
                name: String::new(),
                is_default: line.starts_with('*'),
                volume_percent: None,
                muted: None,
            });
            continue;
        }

        let Some(sink) = current.as_mut() else {
            continue;
        };

        if let Some(value) = line.strip_prefix("name:") {
            sink.name = value
                .trim()
                .trim_start_matches('<')
                .trim_end_matches('>')
                .to_string();
        } else if line.starts_with("volume:") && sink.volume_percent.is_none() {
            sink.volume_percent = parse_volume_percent(line);
        } else if line.starts_with("muted:") {
            sink.muted = parse_mute(line);
        }
    }

    if let Some(sink) = current {
        sinks.push(sink);
    }
    sinks
}

pub fn failure_line(output: &str) -> Option<&str> {
    output
        .lines()
        .map(str::trim)
        .find(|line| FAILURE_MARKERS.iter().any(|marker| line.contains(marker)))
}

pub fn percent_to_pacmd_volume(percent: u8) -> u32 {
    u32::from(percent) * PACMD_FULL_VOLUME / 100
}
