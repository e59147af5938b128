use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Status {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Status {
    pub fn name(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Warning => "Warning",
            Status::Critical => "Critical",
            Status::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

pub fn status_from_text(text: Option<&str>, warning_prefixes: &[&str]) -> Status {
    let text = match text {
        Some(t) => t.to_ascii_lowercase(),
        None => return Status::Unknown,
    };
    if text.starts_with("ok") {
        Status::Ok
    } else if text.starts_with("failed") {
        Status::Critical
    } else if warning_prefixes.iter().any(|p| text.starts_with(p)) {
        Status::Warning
    } else {
        Status::Unknown
    }
}

pub fn temperature_status(sensor: &str, current: Option<i64>, max: Option<i64>) -> Status {
    let (current, max) = match (current, max) {
        (Some(current), Some(max)) => (current, max),
        _ => {
            warn!(sensor, "temperature not comparable, no numeric reading or maximum");
            return Status::Unknown;
        }
    };
    if current >= max {
        Status::Critical
    } else if current == max - 1 {
        Status::Warning
    } else {
        Status::Ok
    }
}
