use chrono::Duration;
use sim_core::EventSeverity;

/// Heuristic severity tag from the free-text event-type string the content
/// service returns. Substring matching is fragile by nature; it is isolated
/// here so a structured severity field from the service can replace it
/// without touching call sites.
pub fn tag_from_type(event_type: &str) -> Option<EventSeverity> {
    let t = event_type.to_ascii_lowercase();
    if t.contains("severe") || t.contains("emergency") || t.contains("crisis") {
        Some(EventSeverity::Critical)
    } else if t.contains("outbreak") || t.contains("failure") {
        Some(EventSeverity::High)
    } else {
        None
    }
}

/// How long an event of this severity stays open before expiring.
pub fn expiry_horizon(severity: EventSeverity) -> Duration {
    match severity {
        EventSeverity::Critical => Duration::days(2),
        EventSeverity::High => Duration::days(3),
        EventSeverity::Medium => Duration::days(5),
        EventSeverity::Low => Duration::days(7),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substrings_force_severity() {
        assert_eq!(tag_from_type("severe_drought"), Some(EventSeverity::Critical));
        assert_eq!(tag_from_type("health_emergency"), Some(EventSeverity::Critical));
        assert_eq!(tag_from_type("debt_crisis"), Some(EventSeverity::Critical));
        assert_eq!(tag_from_type("pest_outbreak"), Some(EventSeverity::High));
        assert_eq!(tag_from_type("equipment_failure"), Some(EventSeverity::High));
        assert_eq!(tag_from_type("price_surge"), None);
    }

    #[test]
    fn test_expiry_horizons_by_severity() {
        assert_eq!(expiry_horizon(EventSeverity::Critical), Duration::days(2));
        assert_eq!(expiry_horizon(EventSeverity::High), Duration::days(3));
        assert_eq!(expiry_horizon(EventSeverity::Medium), Duration::days(5));
        assert_eq!(expiry_horizon(EventSeverity::Low), Duration::days(7));
    }
}
