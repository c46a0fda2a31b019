//! Status aggregation and alert wording

use alerting::{AlertRecord, Severity};

use crate::state::{ChannelStatus, OverallStatus, SignalValue, Tier};

/// Combine channel tiers: any Critical wins, then any Warning, else Safe
pub fn aggregate(statuses: &[ChannelStatus]) -> OverallStatus {
    let tier = statuses
        .iter()
        .map(|s| s.tier)
        .max()
        .unwrap_or(Tier::Safe);
    OverallStatus { tier }
}

/// Alert describing a non-safe channel status, if any
pub fn alert_for(status: &ChannelStatus) -> Option<AlertRecord> {
    let severity = match status.tier {
        Tier::Safe => return None,
        Tier::Warning => Severity::Warning,
        Tier::Critical => Severity::Critical,
    };

    let message = match (status.raw_value, status.tier) {
        (SignalValue::Drowsiness(_), Tier::Critical) => {
            "Drowsiness detected! EAR value critically low.".to_string()
        }
        (SignalValue::Drowsiness(_), _) => {
            "Driver appears tired. Consider taking a break.".to_string()
        }
        (SignalValue::Distraction(pose), _) => {
            format!("Driver looking {pose}. Please focus on road.")
        }
        (SignalValue::Phone(_), Tier::Critical) => {
            "Phone usage detected! Please keep hands on wheel.".to_string()
        }
        (SignalValue::Phone(_), _) => "Possible phone usage detected.".to_string(),
        (SignalValue::Audio(level), _) => format!("Loud noise detected: {level:.0} dB"),
    };

    Some(AlertRecord::new(severity, message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Channel, HeadPose};

    fn status(channel: Channel, tier: Tier) -> ChannelStatus {
        ChannelStatus::new(tier, SignalValue::resting(channel))
    }

    #[test]
    fn test_aggregate_is_max_over_all_combinations() {
        for a in Tier::ALL {
            for b in Tier::ALL {
                for c in Tier::ALL {
                    for d in Tier::ALL {
                        let statuses = [
                            status(Channel::Drowsiness, a),
                            status(Channel::Distraction, b),
                            status(Channel::Phone, c),
                            status(Channel::Audio, d),
                        ];
                        let expected = a.max(b).max(c).max(d);
                        assert_eq!(aggregate(&statuses).tier, expected, "{a:?} {b:?} {c:?} {d:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_aggregate_empty_is_safe() {
        assert_eq!(aggregate(&[]).tier, Tier::Safe);
    }

    #[test]
    fn test_no_alert_for_safe() {
        assert!(alert_for(&status(Channel::Phone, Tier::Safe)).is_none());
    }

    #[test]
    fn test_alert_wording() {
        let distracted = ChannelStatus::new(Tier::Warning, SignalValue::Distraction(HeadPose::Down));
        let record = alert_for(&distracted).unwrap();
        assert_eq!(record.severity(), Severity::Warning);
        assert_eq!(record.message(), "Driver looking down. Please focus on road.");

        let loud = ChannelStatus::new(Tier::Critical, SignalValue::Audio(91.0));
        let record = alert_for(&loud).unwrap();
        assert_eq!(record.severity(), Severity::Critical);
        assert_eq!(record.message(), "Loud noise detected: 91 dB");
    }
}
