//! 货币值对象

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 金额比较容差（0.01）
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// 货币代码
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    pub fn new(code: &str) -> Self {
        Self(code.trim().to_uppercase())
    }

    pub fn cny() -> Self {
        Self("CNY".to_string())
    }

    pub fn usd() -> Self {
        Self("USD".to_string())
    }

    pub fn eur() -> Self {
        Self("EUR".to_string())
    }

    pub fn code(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 金额值对象
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Money {
    pub amount: Decimal,
    pub currency: Currency,
}

impl Money {
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    /// 按汇率折算为目标币种（不做舍入）
    pub fn convert(&self, rate: Decimal, target: Currency) -> Money {
        Money::new(self.amount * rate, target)
    }

    /// 两个金额相差是否在容差之内
    pub fn approx_eq(&self, other: Decimal) -> bool {
        (self.amount - other).abs() <= MONEY_TOLERANCE
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_currency_normalized() {
        assert_eq!(Currency::new(" usd "), Currency::usd());
    }

    #[test]
    fn test_convert_is_exact_product() {
        let value = Money::new(dec!(1000.00), Currency::usd());
        let converted = value.convert(dec!(7.12345), Currency::cny());
        assert_eq!(converted.amount, dec!(7123.45));
        assert_eq!(converted.currency, Currency::cny());
    }

    #[test]
    fn test_approx_eq_tolerance() {
        let value = Money::new(dec!(100.00), Currency::cny());
        assert!(value.approx_eq(dec!(100.01)));
        assert!(!value.approx_eq(dec!(100.02)));
    }

    #[test]
    fn test_money_serializes_amount_as_string() {
        let value = Money::new(dec!(12.50), Currency::eur());
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json["amount"], "12.50");
        assert_eq!(json["currency"], "EUR");
    }
}
