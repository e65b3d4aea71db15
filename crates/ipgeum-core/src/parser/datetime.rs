//! Transaction timestamp extraction

use chrono::NaiveDate;

re!(re_full_datetime, r"([0-9]{4}/[0-9]{2}/[0-9]{2})\s+([0-9]{2}:[0-9]{2}:[0-9]{2})");
re!(re_month_day_time, r"([0-9]{2}/[0-9]{2})[ \[]*([0-9]{2}:[0-9]{2})");
re!(re_month_day, r"([0-9]{2}/[0-9]{2})");
re!(re_time_only, r"([0-9]{2}:[0-9]{2})");

/// Extract the timestamp as it appears in the text.
///
/// Shapes are tried from most to least specific. Messages that carry only a
/// clock time are same-day alerts, so `today` supplies the date.
pub fn extract_datetime(text: &str, today: NaiveDate) -> Option<String> {
    let shapes = [re_full_datetime(), re_month_day_time(), re_month_day()];
    for re in shapes {
        if let Some(caps) = re.captures(text) {
            let date = caps.get(1)?.as_str();
            return Some(match caps.get(2) {
                Some(time) => format!("{} {}", date, time.as_str()),
                None => date.to_string(),
            });
        }
    }

    let time = re_time_only().captures(text)?.get(1)?.as_str();
    Some(format!("{} {}", today.format("%Y/%m/%d"), time))
}
