use std::ops::Deref;

use serde::Deserialize;

/// A duration written as whitespace separated parts like `1h 30m` or `750ms`.
///
/// Supported units are `d`, `h`, `m`, `s` and `ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duration(pub std::time::Duration);

impl From<Duration> for std::time::Duration {
    fn from(value: Duration) -> Self {
        value.0
    }
}

impl Deref for Duration {
    type Target = std::time::Duration;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::str::FromStr for Duration {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split_whitespace()
            .try_fold(std::time::Duration::ZERO, |total, part| {
                let split = part
                    .find(|c: char| !c.is_ascii_digit())
                    .ok_or("Missing duration unit")?;
                let (value, unit) = part.split_at(split);
                let value = value.parse::<u64>().map_err(|_| "Invalid duration")?;
                let part = match unit {
                    "ms" => std::time::Duration::from_millis(value),
                    "s" => std::time::Duration::from_secs(value),
                    "m" => std::time::Duration::from_secs(value * 60),
                    "h" => std::time::Duration::from_secs(value * 3600),
                    "d" => std::time::Duration::from_secs(value * 24 * 3600),
                    _ => return Err("Invalid duration unit"),
                };
                Ok(total + part)
            })
            .map(Self)
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration() {
        for (input, expected) in [
            ("13s", Some(13_000)),
            ("42m", Some(42 * 60_000)),
            ("7h", Some(7 * 60 * 60_000)),
            ("20d", Some(20 * 24 * 60 * 60_000)),
            ("750ms", Some(750)),
            ("", Some(0)),
            ("1d 2h 3m 4s", Some((((24 + 2) * 60 + 3) * 60 + 4) * 1000)),
            ("5s 500ms", Some(5500)),
            ("xyz", None),
            ("7dd", None),
            ("12", None),
            ("s", None),
        ] {
            let input = serde_json::Value::String(input.into());
            let output = serde_json::from_value::<Duration>(input)
                .ok()
                .map(|x| x.0.as_millis() as u64);
            assert_eq!(output, expected);
        }
    }
}
