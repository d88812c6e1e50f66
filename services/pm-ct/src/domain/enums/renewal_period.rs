//! 续签周期枚举

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// 续签周期
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RenewalPeriod {
    #[serde(rename = "1 Month")]
    OneMonth,
    #[serde(rename = "3 Months")]
    ThreeMonths,
    #[serde(rename = "6 Months")]
    SixMonths,
    #[default]
    #[serde(rename = "1 Year")]
    OneYear,
    #[serde(rename = "2 Years")]
    TwoYears,
    #[serde(rename = "3 Years")]
    ThreeYears,
}

impl RenewalPeriod {
    pub fn months(&self) -> u32 {
        match self {
            RenewalPeriod::OneMonth => 1,
            RenewalPeriod::ThreeMonths => 3,
            RenewalPeriod::SixMonths => 6,
            RenewalPeriod::OneYear => 12,
            RenewalPeriod::TwoYears => 24,
            RenewalPeriod::ThreeYears => 36,
        }
    }

    /// 从给定日期顺延一个周期，月末日期会落到目标月份的最后一天
    pub fn add_to(&self, date: NaiveDate) -> Option<NaiveDate> {
        date.checked_add_months(Months::new(self.months()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_add_to() {
        assert_eq!(RenewalPeriod::OneYear.add_to(date(2026, 1, 1)), Some(date(2027, 1, 1)));
        assert_eq!(RenewalPeriod::ThreeMonths.add_to(date(2026, 1, 1)), Some(date(2026, 4, 1)));
        assert_eq!(RenewalPeriod::OneMonth.add_to(date(2026, 1, 31)), Some(date(2026, 2, 28)));
    }

    #[test]
    fn test_serde_names() {
        let period: RenewalPeriod = serde_json::from_str("\"6 Months\"").unwrap();
        assert_eq!(period, RenewalPeriod::SixMonths);
        assert_eq!(serde_json::to_string(&RenewalPeriod::TwoYears).unwrap(), "\"2 Years\"");
    }
}
