use super::models::{BASE_CURRENCY, QuoteSet};
use std::fmt::Write;

/// Rendered in place of the BTC price when the crypto provider failed.
pub const BTC_PLACEHOLDER: &str = "n/a";

const KZT_FLAG: &str = "🇰🇿";

/// Renders the quote exactly as users and admins receive it.
pub fn format_quote_message(quote: &QuoteSet) -> String {
    let mut message = format!(
        "Today's exchange rates ({}) :\n",
        quote.as_of.format("%Y-%m-%d %H:%M:%S%:z")
    );

    for (currency, rate) in quote.rates.iter() {
        // Writing into a String cannot fail.
        let _ = writeln!(
            message,
            "{} 1 {} = {:.2} {} {}",
            currency.flag(),
            currency,
            rate,
            BASE_CURRENCY,
            KZT_FLAG
        );
    }

    let btc = match quote.btc_usd {
        Some(price) => price.to_string(),
        None => BTC_PLACEHOLDER.to_string(),
    };
    let _ = write!(message, "\n₿ 1 BTC = {} USD 🇺🇸", btc);

    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_quote_set;

    #[test]
    fn test_format_full_quote() {
        let message = format_quote_message(&sample_quote_set(Some(43000.0)));

        assert_eq!(
            message,
            "Today's exchange rates (2023-11-15 03:13:20+05:00) :\n\
             🇺🇸 1 USD = 476.19 KZT 🇰🇿\n\
             🇪🇺 1 EUR = 526.32 KZT 🇰🇿\n\
             🇷🇺 1 RUB = 5.56 KZT 🇰🇿\n\
             \n\
             ₿ 1 BTC = 43000 USD 🇺🇸"
        );
    }

    #[test]
    fn test_format_without_btc_uses_placeholder() {
        let message = format_quote_message(&sample_quote_set(None));

        assert!(message.contains("1 USD = 476.19 KZT"));
        assert!(message.ends_with("₿ 1 BTC = n/a USD 🇺🇸"));
    }

    #[test]
    fn test_format_fractional_btc_price() {
        let message = format_quote_message(&sample_quote_set(Some(43123.45)));
        assert!(message.contains("₿ 1 BTC = 43123.45 USD"));
    }
}
