//! Who the bot speaks for, and how it tells time.

use chrono::{DateTime, FixedOffset, Local, Offset, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ZoneOffset {
    Fixed(FixedOffset),
    /// Host zone, resolved per instant so DST transitions are honored.
    System,
}

/// The user's time zone plus the abbreviation shown in replies.
///
/// Without an explicit abbreviation the label is derived from the offset in
/// effect at the formatted instant (`UTC-05:00`, or `UTC` at zero).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalZone {
    offset: ZoneOffset,
    abbreviation: Option<String>,
}

impl LocalZone {
    /// Creates a zone from an offset and its abbreviation (e.g. `EST`).
    pub fn new(offset: FixedOffset, abbreviation: impl Into<String>) -> Self {
        Self::fixed(offset).with_abbreviation(abbreviation)
    }

    /// A fixed offset labelled `UTC±HH:MM`.
    pub fn fixed(offset: FixedOffset) -> Self {
        Self {
            offset: ZoneOffset::Fixed(offset),
            abbreviation: None,
        }
    }

    /// The host's local zone.
    pub fn system() -> Self {
        Self {
            offset: ZoneOffset::System,
            abbreviation: None,
        }
    }

    /// Overrides the label shown after times.
    pub fn with_abbreviation(mut self, abbreviation: impl Into<String>) -> Self {
        self.abbreviation = Some(abbreviation.into());
        self
    }

    /// Parses `Z`, `UTC`, `+05:30`, `-0500` or `-5` into an offset.
    pub fn parse_offset(raw: &str) -> Option<FixedOffset> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
            return FixedOffset::east_opt(0);
        }

        let (sign, rest) = match raw.chars().next()? {
            '+' => (1, &raw[1..]),
            '-' => (-1, &raw[1..]),
            _ => (1, raw),
        };

        let (hours, minutes) = match rest.split_once(':') {
            Some((h, m)) => (h.parse::<i32>().ok()?, m.parse::<i32>().ok()?),
            None if rest.len() == 4 && rest.bytes().all(|b| b.is_ascii_digit()) => {
                (rest[..2].parse().ok()?, rest[2..].parse().ok()?)
            }
            None => (rest.parse().ok()?, 0),
        };
        if !(0..60).contains(&minutes) {
            return None;
        }

        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
    }

    /// `UTC` for a zero offset, `UTC±HH:MM` otherwise.
    pub fn utc_label(offset: FixedOffset) -> String {
        if offset.local_minus_utc() == 0 {
            "UTC".to_string()
        } else {
            format!("UTC{}", offset)
        }
    }

    /// The offset from UTC in effect at `instant`.
    pub fn offset_at(&self, instant: DateTime<Utc>) -> FixedOffset {
        match self.offset {
            ZoneOffset::Fixed(offset) => offset,
            ZoneOffset::System => instant.with_timezone(&Local).offset().fix(),
        }
    }

    /// The label shown after a time at `instant`.
    pub fn abbreviation_at(&self, instant: DateTime<Utc>) -> String {
        match &self.abbreviation {
            Some(abbreviation) => abbreviation.clone(),
            None => Self::utc_label(self.offset_at(instant)),
        }
    }

    /// Formats an instant as `05:30PM EST`.
    pub fn format_time(&self, instant: DateTime<Utc>) -> String {
        format!(
            "{} {}",
            instant.with_timezone(&self.offset_at(instant)).format("%I:%M%p"),
            self.abbreviation_at(instant)
        )
    }
}

impl Default for LocalZone {
    fn default() -> Self {
        Self::system()
    }
}

/// Fixed identity used in every reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    /// Name of the person the bot answers for.
    pub owner_name: String,
    /// Signature every reply ends with (after `- `).
    pub signature: String,
    /// Zone used to render end times.
    pub zone: LocalZone,
}

impl Persona {
    /// Creates a persona.
    pub fn new(owner_name: impl Into<String>, signature: impl Into<String>, zone: LocalZone) -> Self {
        Self {
            owner_name: owner_name.into(),
            signature: signature.into(),
            zone,
        }
    }

    /// The trailing signature, e.g. `- TomasBot`.
    pub fn sign_off(&self) -> String {
        format!("- {}", self.signature)
    }

    /// Appends the sign-off unless `text` already ends with it.
    pub fn ensure_signed(&self, text: &str) -> String {
        let text = text.trim();
        let sign_off = self.sign_off();
        if text.ends_with(&sign_off) {
            text.to_string()
        } else {
            format!("{} {}", text, sign_off)
        }
    }
}

impl Default for Persona {
    fn default() -> Self {
        Self::new("Tomas", "TomasBot", LocalZone::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn est() -> LocalZone {
        LocalZone::new(FixedOffset::west_opt(5 * 3600).unwrap(), "EST")
    }

    #[test]
    fn test_format_time_uses_zone() {
        let end = Utc.with_ymd_and_hms(2024, 1, 15, 22, 30, 0).unwrap();
        assert_eq!(est().format_time(end), "05:30PM EST");
    }

    #[test]
    fn test_parse_offset_variants() {
        assert_eq!(LocalZone::parse_offset("Z"), FixedOffset::east_opt(0));
        assert_eq!(LocalZone::parse_offset("-05:00"), FixedOffset::west_opt(5 * 3600));
        assert_eq!(LocalZone::parse_offset("+0530"), FixedOffset::east_opt(19800));
        assert_eq!(LocalZone::parse_offset("-5"), FixedOffset::west_opt(5 * 3600));
        assert_eq!(LocalZone::parse_offset("+05:75"), None);
        assert_eq!(LocalZone::parse_offset("later"), None);
        assert_eq!(LocalZone::parse_offset(""), None);
    }

    #[test]
    fn test_fixed_zone_labels() {
        let end = Utc.with_ymd_and_hms(2024, 1, 15, 22, 30, 0).unwrap();
        let ist = LocalZone::fixed(FixedOffset::east_opt(19800).unwrap());
        assert_eq!(ist.format_time(end), "04:00AM UTC+05:30");
        assert_eq!(LocalZone::fixed(FixedOffset::east_opt(0).unwrap()).format_time(end), "10:30PM UTC");
    }

    #[test]
    fn test_system_zone_follows_local_offset_per_instant() {
        let zone = LocalZone::system();
        let winter = Utc.with_ymd_and_hms(2027, 1, 15, 22, 30, 0).unwrap();
        let summer = Utc.with_ymd_and_hms(2027, 7, 15, 22, 30, 0).unwrap();

        for instant in [winter, summer] {
            let local = instant.with_timezone(&Local);
            let expected = format!(
                "{} {}",
                local.format("%I:%M%p"),
                LocalZone::utc_label(local.offset().fix())
            );
            assert_eq!(zone.offset_at(instant), local.offset().fix());
            assert_eq!(zone.format_time(instant), expected);
        }
    }

    #[test]
    fn test_system_zone_keeps_explicit_abbreviation() {
        let zone = LocalZone::system().with_abbreviation("ET");
        let summer = Utc.with_ymd_and_hms(2027, 7, 15, 22, 30, 0).unwrap();
        assert_eq!(zone.abbreviation_at(summer), "ET");
        assert!(zone.format_time(summer).ends_with(" ET"));
    }

    #[test]
    fn test_ensure_signed() {
        let persona = Persona::new("Tomas", "TomasBot", est());
        assert_eq!(
            persona.ensure_signed("In a meeting until 3. "),
            "In a meeting until 3. - TomasBot"
        );
        assert_eq!(
            persona.ensure_signed("Back soon! - TomasBot"),
            "Back soon! - TomasBot"
        );
    }
}
