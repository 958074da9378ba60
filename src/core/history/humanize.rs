use chrono::Duration;

/// Render an elapsed duration the way people say it: "now", "a minute ago",
/// "3 hours ago", "2 years ago". Negative durations read as "from now".
pub fn natural_time(elapsed: Duration) -> String {
    let future = elapsed < Duration::zero();
    let seconds = elapsed.num_seconds().unsigned_abs();

    let phrase = match seconds {
        0 => return "now".to_string(),
        1 => "a second".to_string(),
        2..=59 => format!("{} seconds", seconds),
        60..=119 => "a minute".to_string(),
        120..=3_599 => format!("{} minutes", seconds / 60),
        3_600..=7_199 => "an hour".to_string(),
        7_200..=86_399 => format!("{} hours", seconds / 3_600),
        _ => {
            let days = seconds / 86_400;
            match days {
                1 => "a day".to_string(),
                2..=29 => format!("{} days", days),
                30..=59 => "a month".to_string(),
                60..=364 => format!("{} months", days / 30),
                365..=729 => "a year".to_string(),
                _ => format!("{} years", days / 365),
            }
        }
    };

    if future {
        format!("{} from now", phrase)
    } else {
        format!("{} ago", phrase)
    }
}
